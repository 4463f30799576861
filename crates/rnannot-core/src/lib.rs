//! rnannot Core Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Annotates RNA sequence records with ontology terms:
//!
//! - **Ontology**: `[Term]` block parsing, cache-aside loading, file discovery
//! - **Scoring**: the pluggable sequence/term confidence strategy
//! - **Engine**: batched, bounded-concurrency annotation with ordered merge
//! - **Validator**: first-failing-rule verdict per record
//! - **Table / Persistence**: delimited I/O and document store output
//! - **Pipeline**: all of the above for one run, with a run summary
//!
//! # Example
//!
//! ```no_run
//! use rnannot_core::{AnnotationPipeline, AnnotatorConfig, ConstantScorer, NoopCacheStore};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example() -> rnannot_core::Result<()> {
//! let config = AnnotatorConfig::from_env()?;
//! let pipeline = AnnotationPipeline::new(config, Arc::new(NoopCacheStore), Arc::new(ConstantScorer::default()));
//! let summary = pipeline
//!     .run_files(Path::new("input.csv"), Path::new("output.csv"), Path::new("ontologies"))
//!     .await?;
//! println!("{} records annotated", summary.annotated_records);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod ontology;
pub mod persistence;
pub mod pipeline;
pub mod record;
pub mod scoring;
pub mod table;
pub mod validator;

pub use config::{AnnotatorConfig, EngineConfig};
pub use engine::{AnnotationEngine, AnnotationOutcome, FailedBatch};
pub use error::{AnnotError, Result};
pub use ontology::{
    CacheStore, InMemoryCacheStore, NoopCacheStore, OntologyCache, OntologyGraph, OntologyGraphs, RedisCacheStore,
    TermRecord,
};
pub use persistence::{DocumentStore, PgDocumentStore, UnavailableDocumentStore};
pub use pipeline::{AnnotationPipeline, PipelineOutput, RunSummary};
pub use record::{AnnotationResult, SequenceRecord};
pub use scoring::{ConstantScorer, ScoringStrategy, TermScoreTable};
pub use validator::{ValidationRules, ValidationVerdict, Validator, VerdictCounts};
