//! Annotator configuration
//!
//! Everything tunable about a run lives in [`AnnotatorConfig`]. It is read
//! once, validated, and handed to component constructors; components never
//! look at the environment themselves.

use crate::error::{AnnotError, Result};
use rnannot_common::env::{list_var_or, parse_var_or};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ============================================================================
// Configuration Constants
// ============================================================================

/// Default number of batches processed concurrently.
pub const DEFAULT_MAX_WORKERS: usize = 4;

/// Default maximum number of records per batch.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Default time-to-live of cached ontology graphs, in seconds.
pub const DEFAULT_CACHE_EXPIRY_SECS: u64 = 3600;

/// Default minimum per-term confidence for a match.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.8;

/// Ontologies annotated with and required during validation by default.
pub const DEFAULT_ONTOLOGIES: &[&str] = &["GO", "SO"];

/// Run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatorConfig {
    /// Batches processed concurrently (`MAX_WORKERS`)
    pub max_workers: usize,

    /// Maximum records per batch (`BATCH_SIZE`)
    pub batch_size: usize,

    /// Cache entry lifetime in seconds (`CACHE_EXPIRY`)
    pub cache_expiry_secs: u64,

    /// Score a term must reach to count as a match, and the confidence a
    /// required annotation must reach to pass validation (`MIN_CONFIDENCE`)
    pub min_confidence: f64,

    /// Ontologies to annotate with, in validation order (`ONTOLOGIES`)
    pub ontologies: Vec<String>,
}

/// The slice of configuration an [`crate::engine::AnnotationEngine`] captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub max_workers: usize,
    pub batch_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            batch_size: DEFAULT_BATCH_SIZE,
            cache_expiry_secs: DEFAULT_CACHE_EXPIRY_SECS,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            ontologies: DEFAULT_ONTOLOGIES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl AnnotatorConfig {
    /// Load configuration from the environment (and `.env`, if present)
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = AnnotatorConfig {
            max_workers: parse_var_or("MAX_WORKERS", DEFAULT_MAX_WORKERS)?,
            batch_size: parse_var_or("BATCH_SIZE", DEFAULT_BATCH_SIZE)?,
            cache_expiry_secs: parse_var_or("CACHE_EXPIRY", DEFAULT_CACHE_EXPIRY_SECS)?,
            min_confidence: parse_var_or("MIN_CONFIDENCE", DEFAULT_MIN_CONFIDENCE)?,
            ontologies: list_var_or("ONTOLOGIES", DEFAULT_ONTOLOGIES)?,
        };

        config.validate()?;

        Ok(config)
    }

    pub fn builder() -> AnnotatorConfigBuilder {
        AnnotatorConfigBuilder::default()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_workers == 0 {
            return Err(AnnotError::config("MAX_WORKERS must be greater than 0"));
        }

        if self.batch_size == 0 {
            return Err(AnnotError::config("BATCH_SIZE must be greater than 0"));
        }

        if self.cache_expiry_secs == 0 {
            return Err(AnnotError::config("CACHE_EXPIRY must be greater than 0"));
        }

        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(AnnotError::config(format!(
                "MIN_CONFIDENCE must be within [0, 1], got {}",
                self.min_confidence
            )));
        }

        if self.ontologies.is_empty() {
            return Err(AnnotError::config("ONTOLOGIES must name at least one ontology"));
        }

        Ok(())
    }

    pub fn cache_expiry(&self) -> Duration {
        Duration::from_secs(self.cache_expiry_secs)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            max_workers: self.max_workers,
            batch_size: self.batch_size,
        }
    }
}

/// Builder for AnnotatorConfig
#[derive(Debug, Default)]
pub struct AnnotatorConfigBuilder {
    max_workers: Option<usize>,
    batch_size: Option<usize>,
    cache_expiry_secs: Option<u64>,
    min_confidence: Option<f64>,
    ontologies: Option<Vec<String>>,
}

impl AnnotatorConfigBuilder {
    pub fn max_workers(mut self, workers: usize) -> Self {
        self.max_workers = Some(workers);
        self
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = Some(size);
        self
    }

    pub fn cache_expiry_secs(mut self, secs: u64) -> Self {
        self.cache_expiry_secs = Some(secs);
        self
    }

    pub fn min_confidence(mut self, threshold: f64) -> Self {
        self.min_confidence = Some(threshold);
        self
    }

    pub fn ontologies<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ontologies = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Build and validate
    pub fn build(self) -> Result<AnnotatorConfig> {
        let defaults = AnnotatorConfig::default();
        let config = AnnotatorConfig {
            max_workers: self.max_workers.unwrap_or(defaults.max_workers),
            batch_size: self.batch_size.unwrap_or(defaults.batch_size),
            cache_expiry_secs: self.cache_expiry_secs.unwrap_or(defaults.cache_expiry_secs),
            min_confidence: self.min_confidence.unwrap_or(defaults.min_confidence),
            ontologies: self.ontologies.unwrap_or(defaults.ontologies),
        };
        config.validate()?;
        Ok(config)
    }
}
