// OBO-style term block parser

use crate::error::Result;
use crate::ontology::models::{OntologyGraph, Relationship, TermRecord};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info, warn};

/// Marker line that opens a term block.
pub const TERM_MARKER: &str = "[Term]";

// ============================================================================
// Parse output
// ============================================================================

/// A term block that reached its boundary without an `id` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedTerm {
    /// 1-based line number of the block's `[Term]` marker
    pub line: usize,
    /// The block's `name`, when it had one
    pub name: Option<String>,
}

impl std::fmt::Display for MalformedTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "term block at line {} ('{}') has no id", self.line, name),
            None => write!(f, "term block at line {} has no id", self.line),
        }
    }
}

#[derive(Debug, Default)]
pub struct ParsedOntology {
    pub graph: OntologyGraph,
    /// Blocks skipped for lacking an id, in file order
    pub malformed: Vec<MalformedTerm>,
}

// ============================================================================
// Parser
// ============================================================================

pub struct OboParser;

impl OboParser {
    /// Parse an ontology file from disk
    pub fn parse_file(path: impl AsRef<Path>) -> Result<ParsedOntology> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let parsed = Self::parse_reader(BufReader::new(file))?;

        info!(
            path = %path.display(),
            terms = parsed.graph.len(),
            relationships = parsed.graph.relationship_count(),
            malformed = parsed.malformed.len(),
            "Parsed ontology file"
        );

        Ok(parsed)
    }

    /// Parse from any buffered line source.
    ///
    /// Only I/O failures (including invalid UTF-8) are errors. Malformed
    /// content is skipped and reported in [`ParsedOntology::malformed`].
    pub fn parse_reader<R: BufRead>(reader: R) -> Result<ParsedOntology> {
        let mut state = ParseState::default();
        for (index, line) in reader.lines().enumerate() {
            state.feed(index + 1, &line?);
        }
        Ok(state.finish())
    }

    /// Parse in-memory content
    pub fn parse_str(content: &str) -> ParsedOntology {
        let mut state = ParseState::default();
        for (index, line) in content.lines().enumerate() {
            state.feed(index + 1, line);
        }
        state.finish()
    }
}

/// Text before the first `!`, trimmed. `GO:0008150 ! biological_process`
/// becomes `GO:0008150`.
fn strip_trailing_comment(value: &str) -> &str {
    value.split('!').next().unwrap_or_default().trim()
}

/// An open `[Term]` block
struct TermBlock {
    start_line: usize,
    id: Option<String>,
    term: TermRecord,
}

impl TermBlock {
    fn new(start_line: usize) -> Self {
        Self {
            start_line,
            id: None,
            term: TermRecord::default(),
        }
    }

    fn apply(&mut self, line_no: usize, key: &str, value: &str) {
        match key {
            "id" => self.id = Some(value.to_string()),
            "name" => self.term.name = Some(value.to_string()),
            "def" => self.term.definition = Some(value.to_string()),
            "synonym" => self.term.synonyms.push(value.to_string()),
            "xref" => self.term.xrefs.push(value.to_string()),
            "is_a" => self
                .term
                .relationships
                .push(Relationship::is_a(strip_trailing_comment(value))),
            "relationship" => match value.split_once(' ') {
                // Format: "part_of GO:0008150 ! biological_process"
                Some((relation_type, rest)) => self
                    .term
                    .relationships
                    .push(Relationship::new(relation_type, strip_trailing_comment(rest))),
                None => {
                    warn!(line = line_no, value = %value, "Relationship line has no target, skipping");
                },
            },
            _ => {
                self.term.properties.insert(key.to_string(), value.to_string());
            },
        }
    }
}

#[derive(Default)]
struct ParseState {
    graph: OntologyGraph,
    malformed: Vec<MalformedTerm>,
    block: Option<TermBlock>,
}

impl ParseState {
    fn feed(&mut self, line_no: usize, raw: &str) {
        let line = raw.trim();

        if line == TERM_MARKER {
            self.close_block();
            self.block = Some(TermBlock::new(line_no));
            return;
        }

        // Any other stanza header ([Typedef], [Instance]) ends the open term so
        // its fields never merge into the term
        if line.starts_with('[') && line.ends_with(']') {
            self.close_block();
            return;
        }

        let Some(block) = self.block.as_mut() else {
            return;
        };
        if line.is_empty() {
            return;
        }

        match line.split_once(':') {
            Some((key, value)) => block.apply(line_no, key, value.trim()),
            None => debug!(line = line_no, "Ignoring term line without a key"),
        }
    }

    fn close_block(&mut self) {
        let Some(block) = self.block.take() else {
            return;
        };

        match block.id {
            Some(id) if !id.is_empty() => {
                let mut term = block.term;
                term.id = id;
                if let Some(previous) = self.graph.insert(term) {
                    debug!(id = %previous.id, line = block.start_line, "Duplicate term id, later block wins");
                }
            },
            _ => {
                let malformed = MalformedTerm {
                    line: block.start_line,
                    name: block.term.name,
                };
                warn!("Skipping malformed term: {}", malformed);
                self.malformed.push(malformed);
            },
        }
    }

    fn finish(mut self) -> ParsedOntology {
        self.close_block();
        ParsedOntology {
            graph: self.graph,
            malformed: self.malformed,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
