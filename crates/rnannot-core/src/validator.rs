//! Rule-based validation of annotated records
//!
//! Each record gets exactly one [`ValidationVerdict`]. Required ontologies are
//! checked in order and the first failing check decides the verdict.

use crate::record::SequenceRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationVerdict {
    Pass,
    MissingRequiredAnnotation,
    LowConfidence,
}

impl ValidationVerdict {
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationVerdict::Pass => "PASS",
            ValidationVerdict::MissingRequiredAnnotation => "MISSING_REQUIRED_ANNOTATION",
            ValidationVerdict::LowConfidence => "LOW_CONFIDENCE",
        }
    }
}

impl fmt::Display for ValidationVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRules {
    /// Ontologies every record must be annotated with, in check order
    pub required_ontologies: Vec<String>,
    /// Lowest acceptable `{ontology}_confidence`
    pub min_confidence: f64,
}

impl ValidationRules {
    pub fn new<I, S>(required_ontologies: I, min_confidence: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required_ontologies: required_ontologies.into_iter().map(Into::into).collect(),
            min_confidence,
        }
    }
}

/// Number of records per verdict
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictCounts {
    pub pass: usize,
    pub missing_required_annotation: usize,
    pub low_confidence: usize,
}

impl VerdictCounts {
    pub fn record(&mut self, verdict: ValidationVerdict) {
        match verdict {
            ValidationVerdict::Pass => self.pass += 1,
            ValidationVerdict::MissingRequiredAnnotation => self.missing_required_annotation += 1,
            ValidationVerdict::LowConfidence => self.low_confidence += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.pass + self.missing_required_annotation + self.low_confidence
    }
}

pub struct Validator {
    rules: ValidationRules,
}

impl Validator {
    pub fn new(rules: ValidationRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    /// Verdict for one record
    pub fn classify(&self, record: &SequenceRecord) -> ValidationVerdict {
        for ontology in &self.rules.required_ontologies {
            let Some(result) = record.annotation(ontology).filter(|r| r.is_match()) else {
                return ValidationVerdict::MissingRequiredAnnotation;
            };
            if result.confidence < self.rules.min_confidence {
                return ValidationVerdict::LowConfidence;
            }
        }
        ValidationVerdict::Pass
    }

    /// Attach a verdict to every record
    pub fn validate(&self, records: &mut [SequenceRecord]) -> VerdictCounts {
        let mut counts = VerdictCounts::default();
        for record in records.iter_mut() {
            let verdict = self.classify(record);
            record.set_validation_status(verdict);
            counts.record(verdict);
        }

        info!(
            records = counts.total(),
            pass = counts.pass,
            missing_required_annotation = counts.missing_required_annotation,
            low_confidence = counts.low_confidence,
            "Validated records"
        );

        counts
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::record::AnnotationResult;

    fn matched(id: &str, confidence: f64) -> AnnotationResult {
        AnnotationResult {
            matched_term_ids: vec![id.to_string()],
            confidence,
        }
    }

    fn validator() -> Validator {
        Validator::new(ValidationRules::new(["GO", "SO"], 0.8))
    }

    #[test]
    fn test_pass_at_threshold() {
        let mut record = SequenceRecord::from_sequence("ACGU");
        record.set_annotation("GO", matched("GO:1", 0.8));
        record.set_annotation("SO", matched("SO:1", 0.95));
        assert_eq!(validator().classify(&record), ValidationVerdict::Pass);
    }

    #[test]
    fn test_first_failing_ontology_wins() {
        let mut record = SequenceRecord::from_sequence("ACGU");
        record.set_annotation("GO", AnnotationResult::no_match());
        record.set_annotation("SO", matched("SO:1", 0.1));
        assert_eq!(validator().classify(&record), ValidationVerdict::MissingRequiredAnnotation);

        let mut record = SequenceRecord::from_sequence("ACGU");
        record.set_annotation("GO", matched("GO:1", 0.5));
        assert_eq!(validator().classify(&record), ValidationVerdict::LowConfidence);
    }

    #[test]
    fn test_absent_annotation_is_missing() {
        let mut record = SequenceRecord::from_sequence("ACGU");
        record.set_annotation("GO", matched("GO:1", 0.9));
        assert_eq!(validator().classify(&record), ValidationVerdict::MissingRequiredAnnotation);
    }

    #[test]
    fn test_validate_attaches_and_counts() {
        let mut passing = SequenceRecord::from_sequence("A");
        passing.set_annotation("GO", matched("GO:1", 0.9));
        passing.set_annotation("SO", matched("SO:1", 0.9));
        let mut records = vec![passing, SequenceRecord::from_sequence("C")];

        let counts = validator().validate(&mut records);
        assert_eq!(counts.pass, 1);
        assert_eq!(counts.missing_required_annotation, 1);
        assert_eq!(counts.total(), 2);
        assert_eq!(records[0].validation_status(), Some(ValidationVerdict::Pass));
        assert_eq!(
            records[1].validation_status(),
            Some(ValidationVerdict::MissingRequiredAnnotation)
        );
    }

    #[test]
    fn test_verdict_wire_names() {
        assert_eq!(
            serde_json::to_string(&ValidationVerdict::MissingRequiredAnnotation).unwrap(),
            "\"MISSING_REQUIRED_ANNOTATION\""
        );
        assert_eq!(ValidationVerdict::LowConfidence.to_string(), "LOW_CONFIDENCE");
    }
}
