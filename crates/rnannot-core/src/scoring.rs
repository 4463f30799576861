//! Confidence scoring strategies
//!
//! Implement [`ScoringStrategy`] to plug a matching heuristic into the
//! annotation engine. Plain closures of type `Fn(&str, &TermRecord) -> f64`
//! work as strategies too.

use crate::ontology::TermRecord;
use anyhow::Result;
use std::collections::HashMap;

/// Maps a (sequence, term) pair to a confidence in `[0.0, 1.0]`
pub trait ScoringStrategy: Send + Sync {
    /// Score `sequence` against `term`
    ///
    /// Must be deterministic for a given pair within one run. An `Err`, or a
    /// value that is NaN or outside `[0.0, 1.0]`, fails the whole batch the
    /// record belongs to.
    fn score(&self, sequence: &str, term: &TermRecord) -> Result<f64>;

    /// Strategy identifier used in log fields
    ///
    /// E.g., "constant", "term_table"
    fn name(&self) -> &str;
}

/// Scores every pair with the same value. The default strategy uses `0.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantScorer {
    value: f64,
}

impl ConstantScorer {
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

impl Default for ConstantScorer {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl ScoringStrategy for ConstantScorer {
    fn score(&self, _sequence: &str, _term: &TermRecord) -> Result<f64> {
        Ok(self.value)
    }

    fn name(&self) -> &str {
        "constant"
    }
}

/// Fixed score per term id, independent of the sequence
#[derive(Debug, Clone, Default)]
pub struct TermScoreTable {
    scores: HashMap<String, f64>,
    fallback: f64,
}

impl TermScoreTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score returned for ids not in the table (0.0 unless set)
    pub fn with_fallback(mut self, fallback: f64) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_score(mut self, term_id: impl Into<String>, score: f64) -> Self {
        self.scores.insert(term_id.into(), score);
        self
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for TermScoreTable {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self {
            scores: iter.into_iter().map(|(id, score)| (id.into(), score)).collect(),
            fallback: 0.0,
        }
    }
}

impl ScoringStrategy for TermScoreTable {
    fn score(&self, _sequence: &str, term: &TermRecord) -> Result<f64> {
        Ok(self.scores.get(&term.id).copied().unwrap_or(self.fallback))
    }

    fn name(&self) -> &str {
        "term_table"
    }
}

impl<F> ScoringStrategy for F
where
    F: Fn(&str, &TermRecord) -> f64 + Send + Sync,
{
    fn score(&self, sequence: &str, term: &TermRecord) -> Result<f64> {
        Ok(self(sequence, term))
    }

    fn name(&self) -> &str {
        "closure"
    }
}
