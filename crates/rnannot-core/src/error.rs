//! Error types for annotation runs
//!
//! Each variant names the unit it belongs to (an ontology, a batch, a store) so
//! the caller can contain the failure to that unit. Only setup errors such as
//! `Config`, `Table` or an unreadable ontology directory stop a whole run.

use thiserror::Error;

/// Result type alias for rnannot operations
pub type Result<T> = std::result::Result<T, AnnotError>;

#[derive(Error, Debug)]
pub enum AnnotError {
    /// An ontology could not be read or parsed at all
    #[error("Failed to load ontology '{name}': {message}")]
    OntologyLoad { name: String, message: String },

    /// No ontology at all could be loaded for the run
    #[error("No ontologies could be loaded from {0}")]
    NoOntologies(String),

    /// The key-value cache failed a read or write
    #[error("Cache unavailable: {0}")]
    CacheUnavailable(String),

    /// One batch failed while scoring; its records are dropped
    #[error("Batch {index} failed: {message}")]
    BatchProcessing { index: usize, message: String },

    /// The document store rejected a connection or a write
    #[error("Persistence to '{store}' failed: {message}")]
    Persistence { store: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    /// The input or output table is unusable
    #[error("Table error: {0}")]
    Table(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AnnotError {
    pub fn ontology_load(name: impl Into<String>, message: impl ToString) -> Self {
        Self::OntologyLoad {
            name: name.into(),
            message: message.to_string(),
        }
    }

    pub fn cache(message: impl ToString) -> Self {
        Self::CacheUnavailable(message.to_string())
    }

    pub fn batch(index: usize, message: impl ToString) -> Self {
        Self::BatchProcessing {
            index,
            message: message.to_string(),
        }
    }

    pub fn persistence(store: impl Into<String>, message: impl ToString) -> Self {
        Self::Persistence {
            store: store.into(),
            message: message.to_string(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn table(message: impl Into<String>) -> Self {
        Self::Table(message.into())
    }
}

impl From<rnannot_common::CommonError> for AnnotError {
    fn from(err: rnannot_common::CommonError) -> Self {
        AnnotError::Config(err.to_string())
    }
}
