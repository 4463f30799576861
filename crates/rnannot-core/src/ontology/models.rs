// Ontology data models

use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};

/// Relation type recorded for `is_a` lines.
pub const IS_A: &str = "is_a";

// ============================================================================
// Term
// ============================================================================

/// One ontology concept, as read from a `[Term]` block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermRecord {
    /// Term identifier (e.g., "GO:0008150"), unique within one ontology
    pub id: String,

    /// Display label
    pub name: Option<String>,

    /// Definition text, kept verbatim including any quoting and references
    pub definition: Option<String>,

    /// Synonym lines in file order; duplicates are kept
    pub synonyms: Vec<String>,

    /// Cross-references in file order
    pub xrefs: Vec<String>,

    /// `is_a` and typed `relationship` edges in file order
    pub relationships: Vec<Relationship>,

    /// Every other `key: value` line of the block (last write wins)
    pub properties: BTreeMap<String, String>,
}

impl TermRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Targets of this term's `is_a` edges
    pub fn parents(&self) -> impl Iterator<Item = &str> {
        self.relationships
            .iter()
            .filter(|r| r.relation_type == IS_A)
            .map(|r| r.target_id.as_str())
    }
}

/// A directed edge from the owning term to `target_id`.
///
/// Targets are not checked against the graph; files may reference terms that
/// appear later or not at all.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relationship {
    pub relation_type: String,
    pub target_id: String,
}

impl Relationship {
    pub fn new(relation_type: impl Into<String>, target_id: impl Into<String>) -> Self {
        Self {
            relation_type: relation_type.into(),
            target_id: target_id.into(),
        }
    }

    pub fn is_a(target_id: impl Into<String>) -> Self {
        Self::new(IS_A, target_id)
    }
}

// ============================================================================
// Graph
// ============================================================================

/// All terms of one ontology, keyed by id.
///
/// Terms iterate in the order they first appeared in the source file, which
/// keeps annotation output stable between runs. Re-inserting an existing id
/// replaces the record in place. The graph serializes as a plain list of terms.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Vec<TermRecord>")]
pub struct OntologyGraph {
    terms: Vec<TermRecord>,
    index: HashMap<String, usize>,
}

impl OntologyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a term, returning the record it replaced if the id was taken
    pub fn insert(&mut self, term: TermRecord) -> Option<TermRecord> {
        match self.index.get(&term.id) {
            Some(&slot) => Some(std::mem::replace(&mut self.terms[slot], term)),
            None => {
                self.index.insert(term.id.clone(), self.terms.len());
                self.terms.push(term);
                None
            },
        }
    }

    pub fn get(&self, id: &str) -> Option<&TermRecord> {
        self.index.get(id).map(|&slot| &self.terms[slot])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> impl Iterator<Item = &TermRecord> {
        self.terms.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(|t| t.id.as_str())
    }

    pub fn relationship_count(&self) -> usize {
        self.terms.iter().map(|t| t.relationships.len()).sum()
    }
}

impl From<Vec<TermRecord>> for OntologyGraph {
    fn from(terms: Vec<TermRecord>) -> Self {
        let mut graph = OntologyGraph::new();
        for term in terms {
            graph.insert(term);
        }
        graph
    }
}

impl FromIterator<TermRecord> for OntologyGraph {
    fn from_iter<I: IntoIterator<Item = TermRecord>>(iter: I) -> Self {
        let mut graph = OntologyGraph::new();
        for term in iter {
            graph.insert(term);
        }
        graph
    }
}

impl Serialize for OntologyGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.terms)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn term(id: &str, name: &str) -> TermRecord {
        TermRecord {
            name: Some(name.to_string()),
            ..TermRecord::new(id)
        }
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut graph = OntologyGraph::new();
        assert!(graph.insert(term("SO:1", "first")).is_none());
        assert!(graph.insert(term("SO:2", "second")).is_none());

        let replaced = graph.insert(term("SO:1", "again")).unwrap();
        assert_eq!(replaced.name.as_deref(), Some("first"));
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.ids().collect::<Vec<_>>(), vec!["SO:1", "SO:2"]);
        assert_eq!(graph.get("SO:1").unwrap().name.as_deref(), Some("again"));
    }

    #[test]
    fn test_serde_keeps_order_and_index() {
        let mut child = term("GO:0006955", "immune response");
        child.relationships.push(Relationship::is_a("GO:0008150"));
        child.relationships.push(Relationship::new("part_of", "GO:0002376"));
        let graph: OntologyGraph = vec![term("GO:0008150", "biological_process"), child].into();

        let json = serde_json::to_string(&graph).unwrap();
        assert!(json.starts_with('['));

        let restored: OntologyGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, graph);
        assert!(restored.contains("GO:0006955"));
        assert_eq!(restored.relationship_count(), 2);
        assert_eq!(
            restored.get("GO:0006955").unwrap().parents().collect::<Vec<_>>(),
            vec!["GO:0008150"]
        );
    }
}
