// Sequence records and their annotations

use crate::validator::ValidationVerdict;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Column that holds the raw sequence.
pub const SEQUENCE_COLUMN: &str = "sequence";

/// Column carrying the validation verdict in output tables and documents.
pub const VALIDATION_STATUS_COLUMN: &str = "validation_status";

/// Output column holding the matched term ids for `ontology`.
pub fn annotation_column(ontology: &str) -> String {
    format!("{ontology}_annotation")
}

/// Output column holding the confidence for `ontology`.
pub fn confidence_column(ontology: &str) -> String {
    format!("{ontology}_confidence")
}

// ============================================================================
// Annotation result
// ============================================================================

/// Terms of one ontology matched for one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationResult {
    /// Ids of terms that cleared the threshold, in graph order
    pub matched_term_ids: Vec<String>,
    /// Mean score of the matched terms, or 0.0 when nothing matched
    pub confidence: f64,
}

impl AnnotationResult {
    /// Result with no matched terms
    pub fn no_match() -> Self {
        Self {
            matched_term_ids: Vec::new(),
            confidence: 0.0,
        }
    }

    /// Build from the `(term id, score)` pairs that cleared the threshold
    pub fn from_matches(matches: Vec<(String, f64)>) -> Self {
        if matches.is_empty() {
            return Self::no_match();
        }

        let confidence = matches.iter().map(|(_, score)| score).sum::<f64>() / matches.len() as f64;
        Self {
            matched_term_ids: matches.into_iter().map(|(id, _)| id).collect(),
            confidence,
        }
    }

    pub fn is_match(&self) -> bool {
        !self.matched_term_ids.is_empty()
    }
}

// ============================================================================
// Sequence record
// ============================================================================

/// One input row plus whatever later stages attach to it.
///
/// Input columns keep their order and values. Annotations are kept per
/// ontology in the order they were first attached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SequenceRecord {
    columns: Vec<(String, String)>,
    annotations: Vec<(String, AnnotationResult)>,
    validation_status: Option<ValidationVerdict>,
}

impl SequenceRecord {
    pub fn new(columns: Vec<(String, String)>) -> Self {
        Self {
            columns,
            ..Self::default()
        }
    }

    /// Record with only a `sequence` column
    pub fn from_sequence(sequence: impl Into<String>) -> Self {
        Self::new(vec![(SEQUENCE_COLUMN.to_string(), sequence.into())])
    }

    pub fn with_column(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.columns.push((name.into(), value.into()));
        self
    }

    pub fn sequence(&self) -> Option<&str> {
        self.get(SEQUENCE_COLUMN)
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn columns(&self) -> &[(String, String)] {
        &self.columns
    }

    pub fn annotation(&self, ontology: &str) -> Option<&AnnotationResult> {
        self.annotations
            .iter()
            .find(|(name, _)| name == ontology)
            .map(|(_, result)| result)
    }

    pub fn annotations(&self) -> &[(String, AnnotationResult)] {
        &self.annotations
    }

    /// Attach the result for `ontology`, replacing any earlier one
    pub fn set_annotation(&mut self, ontology: impl Into<String>, result: AnnotationResult) {
        let ontology = ontology.into();
        match self.annotations.iter_mut().find(|(name, _)| *name == ontology) {
            Some((_, existing)) => *existing = result,
            None => self.annotations.push((ontology, result)),
        }
    }

    pub fn validation_status(&self) -> Option<ValidationVerdict> {
        self.validation_status
    }

    pub fn set_validation_status(&mut self, verdict: ValidationVerdict) {
        self.validation_status = Some(verdict);
    }

    /// Flatten into a single JSON object for document stores
    pub fn to_document(&self) -> Value {
        let mut doc = Map::new();
        for (name, value) in &self.columns {
            doc.insert(name.clone(), Value::String(value.clone()));
        }
        for (ontology, result) in &self.annotations {
            doc.insert(annotation_column(ontology), json!(result.matched_term_ids));
            doc.insert(confidence_column(ontology), json!(result.confidence));
        }
        if let Some(verdict) = self.validation_status {
            doc.insert(VALIDATION_STATUS_COLUMN.to_string(), json!(verdict.as_str()));
        }
        Value::Object(doc)
    }
}
