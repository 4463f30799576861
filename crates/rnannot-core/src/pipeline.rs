//! End-to-end annotation runs
//!
//! [`AnnotationPipeline`] wires the ontology cache, the engine, the validator
//! and an optional document store:
//!
//! 1. discover and load ontologies (setup, fatal if none load)
//! 2. read the input table (setup, fatal if unusable)
//! 3. annotate, validate, persist
//! 4. write the output table
//!
//! Failures inside step 3 are contained and reported in [`RunSummary`].

use crate::config::AnnotatorConfig;
use crate::engine::{AnnotationEngine, FailedBatch};
use crate::error::{AnnotError, Result};
use crate::ontology::{discover_ontology_files, CacheStore, OntologyCache, OntologyGraphs, OntologyLoadReport};
use crate::persistence::DocumentStore;
use crate::record::SequenceRecord;
use crate::scoring::ScoringStrategy;
use crate::table::{read_sequence_table, write_annotated_table};
use crate::validator::{ValidationRules, Validator, VerdictCounts};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

/// What happened during one run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Records handed to the engine
    pub total_records: usize,
    /// Records that came back annotated (all surviving batches)
    pub annotated_records: usize,
    pub failed_batches: Vec<FailedBatch>,
    /// Requested ontologies that were not loaded, with affected record counts
    pub missing_ontologies: BTreeMap<String, usize>,
    /// Ontologies that failed to load, with the reason
    pub failed_ontologies: BTreeMap<String, String>,
    pub malformed_terms: BTreeMap<String, usize>,
    pub cache_warnings: usize,
    pub verdicts: VerdictCounts,
    /// Documents written to the store, when one is configured and succeeded
    pub persisted_records: Option<usize>,
    pub persistence_error: Option<String>,
}

impl RunSummary {
    fn started() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            total_records: 0,
            annotated_records: 0,
            failed_batches: Vec::new(),
            missing_ontologies: BTreeMap::new(),
            failed_ontologies: BTreeMap::new(),
            malformed_terms: BTreeMap::new(),
            cache_warnings: 0,
            verdicts: VerdictCounts::default(),
            persisted_records: None,
            persistence_error: None,
        }
    }

    /// True when no unit of work failed
    pub fn is_clean(&self) -> bool {
        self.failed_batches.is_empty()
            && self.missing_ontologies.is_empty()
            && self.failed_ontologies.is_empty()
            && self.persistence_error.is_none()
    }

    fn merge_load_report(&mut self, report: &OntologyLoadReport) {
        self.failed_ontologies
            .extend(report.failures.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.malformed_terms
            .extend(report.malformed_terms.iter().map(|(k, v)| (k.clone(), *v)));
        self.cache_warnings += report.cache_warnings;
    }

    /// Emit the summary as one structured event
    pub fn log(&self) {
        let duration_ms = (self.finished_at - self.started_at).num_milliseconds();
        if self.is_clean() {
            info!(
                total = self.total_records,
                annotated = self.annotated_records,
                pass = self.verdicts.pass,
                missing_required_annotation = self.verdicts.missing_required_annotation,
                low_confidence = self.verdicts.low_confidence,
                duration_ms,
                "Annotation run complete"
            );
        } else {
            warn!(
                total = self.total_records,
                annotated = self.annotated_records,
                failed_batches = self.failed_batches.len(),
                missing_ontologies = ?self.missing_ontologies.keys().collect::<Vec<_>>(),
                failed_ontologies = ?self.failed_ontologies.keys().collect::<Vec<_>>(),
                persistence_error = self.persistence_error.as_deref().unwrap_or("none"),
                pass = self.verdicts.pass,
                missing_required_annotation = self.verdicts.missing_required_annotation,
                low_confidence = self.verdicts.low_confidence,
                duration_ms,
                "Annotation run complete with partial failures"
            );
        }
    }
}

#[derive(Debug)]
pub struct PipelineOutput {
    pub records: Vec<SequenceRecord>,
    pub summary: RunSummary,
}

pub struct AnnotationPipeline {
    config: AnnotatorConfig,
    cache: OntologyCache,
    engine: AnnotationEngine,
    validator: Validator,
    store: Option<Arc<dyn DocumentStore>>,
}

impl AnnotationPipeline {
    pub fn new(config: AnnotatorConfig, cache_store: Arc<dyn CacheStore>, scorer: Arc<dyn ScoringStrategy>) -> Self {
        let cache = OntologyCache::new(cache_store, config.cache_expiry());
        let engine = AnnotationEngine::new(config.engine_config(), scorer);
        let validator = Validator::new(ValidationRules::new(config.ontologies.clone(), config.min_confidence));
        Self {
            config,
            cache,
            engine,
            validator,
            store: None,
        }
    }

    pub fn with_document_store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    /// Load the configured ontologies from `dir`.
    ///
    /// Configured names with no file, and files that fail to load, end up in
    /// the report's failures. Errors only when the directory is unreadable or
    /// nothing loaded.
    pub async fn load_ontologies(&self, dir: &Path) -> Result<OntologyLoadReport> {
        let discovered = discover_ontology_files(dir)?;

        let mut files = Vec::new();
        let mut unavailable = BTreeMap::new();
        for name in &self.config.ontologies {
            match discovered.iter().find(|(found, _)| found == name) {
                Some(entry) => files.push(entry.clone()),
                None => {
                    warn!(ontology = %name, dir = %dir.display(), "No ontology file found");
                    unavailable.insert(name.clone(), format!("no ontology file in {}", dir.display()));
                },
            }
        }

        let mut report = self.cache.load_all(&files).await;
        report.failures.extend(unavailable);

        if report.graphs.is_empty() {
            return Err(AnnotError::NoOntologies(dir.display().to_string()));
        }

        info!(
            loaded = report.graphs.len(),
            failed = report.failures.len(),
            cache = %self.cache.store_name(),
            "Ontologies ready"
        );
        Ok(report)
    }

    /// Annotate, validate and persist in memory
    pub async fn run(&self, records: Vec<SequenceRecord>, graphs: &OntologyGraphs) -> PipelineOutput {
        let mut summary = RunSummary::started();
        summary.total_records = records.len();

        let outcome = self
            .engine
            .annotate(records, &self.config.ontologies, graphs, self.config.min_confidence)
            .await;

        let mut records = outcome.records;
        summary.annotated_records = records.len();
        summary.failed_batches = outcome.failed_batches;
        summary.missing_ontologies = outcome.missing_ontologies;
        summary.verdicts = self.validator.validate(&mut records);

        if let Some(store) = &self.store {
            let documents: Vec<_> = records.iter().map(SequenceRecord::to_document).collect();
            match store.insert_many(&documents).await {
                Ok(count) => {
                    info!(store = %store.name(), records = count, "Persisted annotated records");
                    summary.persisted_records = Some(count);
                },
                Err(e) => {
                    error!(store = %store.name(), error = %e, "Persisting annotated records failed");
                    summary.persistence_error = Some(e.to_string());
                },
            }
        }

        summary.finished_at = Utc::now();
        PipelineOutput { records, summary }
    }

    /// Full run from files: load ontologies, read `input`, annotate, write
    /// `output`
    pub async fn run_files(&self, input: &Path, output: &Path, ontology_dir: &Path) -> Result<RunSummary> {
        let started_at = Utc::now();
        let report = self.load_ontologies(ontology_dir).await?;
        let table = read_sequence_table(input)?;

        let PipelineOutput { records, mut summary } = self.run(table.records, &report.graphs).await;
        summary.started_at = started_at;
        summary.merge_load_report(&report);

        write_annotated_table(output, &table.headers, &records)?;

        summary.finished_at = Utc::now();
        summary.log();
        Ok(summary)
    }
}
