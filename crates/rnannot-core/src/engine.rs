//! Batched, concurrent annotation
//!
//! Records are split into contiguous batches of at most `batch_size`. Up to
//! `max_workers` batches are scored at once on the blocking thread pool, and
//! the results are put back in batch order before they are returned, so the
//! output order never depends on which batch finished first.
//!
//! A batch that fails (scorer error, out-of-range score, record without a
//! sequence, worker panic) is dropped from the output and reported in
//! [`AnnotationOutcome::failed_batches`]. Sibling batches are unaffected.

use crate::config::EngineConfig;
use crate::error::{AnnotError, Result};
use crate::ontology::{OntologyGraph, OntologyGraphs};
use crate::record::{AnnotationResult, SequenceRecord};
use crate::scoring::ScoringStrategy;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// A batch that was dropped from the output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedBatch {
    /// Zero-based position of the batch in submission order
    pub index: usize,
    /// Records lost with it
    pub record_count: usize,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct AnnotationOutcome {
    /// Records of every surviving batch, in input order
    pub records: Vec<SequenceRecord>,
    pub failed_batches: Vec<FailedBatch>,
    /// Requested ontologies with no loaded graph, with the number of
    /// annotated records that went without them
    pub missing_ontologies: BTreeMap<String, usize>,
}

impl AnnotationOutcome {
    pub fn failed_record_count(&self) -> usize {
        self.failed_batches.iter().map(|b| b.record_count).sum()
    }
}

/// Ontologies a batch scores against, in request order
type ScoringPlan = Arc<Vec<(String, Arc<OntologyGraph>)>>;

pub struct AnnotationEngine {
    config: EngineConfig,
    scorer: Arc<dyn ScoringStrategy>,
}

impl AnnotationEngine {
    pub fn new(config: EngineConfig, scorer: Arc<dyn ScoringStrategy>) -> Self {
        Self { config, scorer }
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Annotate `records` with every ontology in `ontologies`.
    ///
    /// A term matches when its score is at least `min_confidence`. Requested
    /// ontologies missing from `graphs` are skipped and counted; the others
    /// still apply.
    pub async fn annotate(
        &self,
        records: Vec<SequenceRecord>,
        ontologies: &[String],
        graphs: &OntologyGraphs,
        min_confidence: f64,
    ) -> AnnotationOutcome {
        let start = Instant::now();

        let mut plan = Vec::new();
        let mut missing = Vec::new();
        for name in ontologies {
            match graphs.get(name) {
                Some(graph) => plan.push((name.clone(), Arc::clone(graph))),
                None => {
                    warn!(ontology = %name, "Requested ontology is not loaded, skipping it");
                    missing.push(name.clone());
                },
            }
        }
        let plan: ScoringPlan = Arc::new(plan);

        let batches = partition(records, self.config.batch_size.max(1));
        let batch_count = batches.len();
        let workers = self.config.max_workers.max(1);

        info!(
            batches = batch_count,
            workers,
            batch_size = self.config.batch_size,
            ontologies = plan.len(),
            scorer = %self.scorer.name(),
            "Starting annotation"
        );

        let mut results: Vec<(usize, usize, Result<Vec<SequenceRecord>>)> =
            stream::iter(batches.into_iter().enumerate())
                .map(|(index, batch)| {
                    let plan = Arc::clone(&plan);
                    let scorer = Arc::clone(&self.scorer);
                    let record_count = batch.len();

                    async move {
                        let result = tokio::task::spawn_blocking(move || {
                            annotate_batch(index, batch, &plan, scorer.as_ref(), min_confidence)
                        })
                        .await
                        .map_err(|e| AnnotError::batch(index, format!("worker did not finish: {e}")))
                        .and_then(|r| r);
                        (index, record_count, result)
                    }
                })
                .buffer_unordered(workers)
                .collect()
                .await;

        // Merge by submission order, not completion order
        results.sort_by_key(|(index, _, _)| *index);

        let mut outcome = AnnotationOutcome::default();
        for (index, record_count, result) in results {
            match result {
                Ok(batch) => {
                    debug!(batch = index, records = batch.len(), "Batch annotated");
                    outcome.records.extend(batch);
                },
                Err(e) => {
                    error!(batch = index, records = record_count, error = %e, "Batch failed, dropping its records");
                    let message = match e {
                        AnnotError::BatchProcessing { message, .. } => message,
                        other => other.to_string(),
                    };
                    outcome.failed_batches.push(FailedBatch {
                        index,
                        record_count,
                        message,
                    });
                },
            }
        }

        for name in missing {
            outcome.missing_ontologies.insert(name, outcome.records.len());
        }

        info!(
            records = outcome.records.len(),
            failed_batches = outcome.failed_batches.len(),
            failed_records = outcome.failed_record_count(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Annotation finished"
        );

        outcome
    }
}

/// Split into contiguous batches of at most `size` records
fn partition(records: Vec<SequenceRecord>, size: usize) -> Vec<Vec<SequenceRecord>> {
    let mut batches = Vec::with_capacity(records.len().div_ceil(size));
    let mut records = records.into_iter();
    loop {
        let batch: Vec<_> = records.by_ref().take(size).collect();
        if batch.is_empty() {
            break;
        }
        batches.push(batch);
    }
    batches
}

fn annotate_batch(
    index: usize,
    mut batch: Vec<SequenceRecord>,
    plan: &[(String, Arc<OntologyGraph>)],
    scorer: &dyn ScoringStrategy,
    min_confidence: f64,
) -> Result<Vec<SequenceRecord>> {
    for (position, record) in batch.iter_mut().enumerate() {
        let sequence = record
            .sequence()
            .ok_or_else(|| AnnotError::batch(index, format!("record {position} has no sequence column")))?
            .to_string();

        for (ontology, graph) in plan {
            let mut matches = Vec::new();
            for term in graph.terms() {
                let score = scorer.score(&sequence, term).map_err(|e| {
                    AnnotError::batch(index, format!("scoring {} against {} failed: {e:#}", ontology, term.id))
                })?;
                if !(0.0..=1.0).contains(&score) {
                    return Err(AnnotError::batch(
                        index,
                        format!("score {score} for term {} is outside [0, 1]", term.id),
                    ));
                }
                if score >= min_confidence {
                    matches.push((term.id.clone(), score));
                }
            }
            record.set_annotation(ontology.as_str(), AnnotationResult::from_matches(matches));
        }
    }
    Ok(batch)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::ontology::TermRecord;
    use crate::scoring::TermScoreTable;

    fn graphs(name: &str, ids: &[&str]) -> OntologyGraphs {
        let graph: OntologyGraph = ids.iter().map(|id| TermRecord::new(*id)).collect();
        OntologyGraphs::from([(name.to_string(), Arc::new(graph))])
    }

    fn records(n: usize) -> Vec<SequenceRecord> {
        (0..n)
            .map(|i| SequenceRecord::from_sequence("ACGU").with_column("id", i.to_string()))
            .collect()
    }

    fn engine(max_workers: usize, batch_size: usize, scorer: impl ScoringStrategy + 'static) -> AnnotationEngine {
        AnnotationEngine::new(EngineConfig { max_workers, batch_size }, Arc::new(scorer))
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_partition_sizes() {
        let sizes: Vec<_> = partition(records(7), 3).iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![3, 3, 1]);
        assert!(partition(Vec::new(), 3).is_empty());
    }

    #[tokio::test]
    async fn test_threshold_is_inclusive() {
        let scorer: TermScoreTable = [("GO:1", 0.8), ("GO:2", 0.8 - 1e-9)].into_iter().collect();
        let outcome = engine(2, 10, scorer)
            .annotate(records(2), &names(&["GO"]), &graphs("GO", &["GO:1", "GO:2"]), 0.8)
            .await;

        let result = outcome.records[0].annotation("GO").unwrap();
        assert_eq!(result.matched_term_ids, vec!["GO:1"]);
        assert_eq!(result.confidence, 0.8);
    }

    #[tokio::test]
    async fn test_no_match_differs_from_low_match() {
        let graphs = graphs("SO", &["SO:1"]);
        let scorer: TermScoreTable = [("SO:1", 0.05)].into_iter().collect();

        let none = engine(1, 10, scorer.clone())
            .annotate(records(1), &names(&["SO"]), &graphs, 0.8)
            .await;
        let result = none.records[0].annotation("SO").unwrap();
        assert!(result.matched_term_ids.is_empty());
        assert_eq!(result.confidence, 0.0);

        let low = engine(1, 10, scorer)
            .annotate(records(1), &names(&["SO"]), &graphs, 0.0)
            .await;
        let result = low.records[0].annotation("SO").unwrap();
        assert_eq!(result.matched_term_ids, vec!["SO:1"]);
        assert_eq!(result.confidence, 0.05);
    }

    #[tokio::test]
    async fn test_failed_batch_is_dropped() {
        let mut input = records(6);
        input[3] = SequenceRecord::new(vec![("id".to_string(), "no-seq".to_string())]);

        let outcome = engine(3, 2, TermScoreTable::new())
            .annotate(input, &names(&["GO"]), &graphs("GO", &["GO:1"]), 0.5)
            .await;

        let ids: Vec<_> = outcome.records.iter().map(|r| r.get("id").unwrap()).collect();
        assert_eq!(ids, vec!["0", "1", "4", "5"]);
        assert_eq!(outcome.failed_batches.len(), 1);
        assert_eq!(outcome.failed_batches[0].index, 1);
        assert_eq!(outcome.failed_batches[0].record_count, 2);
        assert_eq!(outcome.failed_record_count(), 2);
    }

    #[tokio::test]
    async fn test_out_of_range_score_fails_batch() {
        let scorer = |_: &str, _: &TermRecord| 1.5;
        let outcome = engine(1, 10, scorer)
            .annotate(records(3), &names(&["GO"]), &graphs("GO", &["GO:1"]), 0.5)
            .await;
        assert!(outcome.records.is_empty());
        assert!(outcome.failed_batches[0].message.contains("outside [0, 1]"));
    }

    #[tokio::test]
    async fn test_nan_score_fails_batch() {
        let scorer = |_: &str, _: &TermRecord| f64::NAN;
        let outcome = engine(1, 10, scorer)
            .annotate(records(1), &names(&["GO"]), &graphs("GO", &["GO:1"]), 0.5)
            .await;
        assert_eq!(outcome.failed_batches.len(), 1);
    }

    #[tokio::test]
    async fn test_panicking_scorer_fails_only_its_batch() {
        let scorer = |sequence: &str, _: &TermRecord| {
            if sequence == "boom" {
                panic!("scorer blew up");
            }
            1.0
        };
        let mut input = records(4);
        input[0] = SequenceRecord::from_sequence("boom");

        let outcome = engine(2, 2, scorer)
            .annotate(input, &names(&["GO"]), &graphs("GO", &["GO:1"]), 0.5)
            .await;
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.failed_batches[0].index, 0);
    }

    #[tokio::test]
    async fn test_missing_ontology_skipped_for_that_ontology_only() {
        let scorer: TermScoreTable = [("GO:1", 0.9)].into_iter().collect();
        let outcome = engine(2, 2, scorer)
            .annotate(records(3), &names(&["GO", "SO"]), &graphs("GO", &["GO:1"]), 0.8)
            .await;

        assert_eq!(outcome.records.len(), 3);
        assert_eq!(outcome.missing_ontologies.get("SO"), Some(&3));
        for record in &outcome.records {
            assert!(record.annotation("GO").unwrap().is_match());
            assert!(record.annotation("SO").is_none());
        }
    }
}
