//! Cache-aside loading of ontology graphs
//!
//! `load` checks the cache store first and only parses the source file on a
//! miss, then writes the parsed graph back with the configured expiry. Every
//! cache problem (unreachable store, failed write, undecodable entry) is
//! logged and downgraded to a plain parse. Concurrent loads of one name are
//! not serialized; both may parse and the last cache write wins.

use crate::error::{AnnotError, Result};
use crate::ontology::models::OntologyGraph;
use crate::ontology::parser::OboParser;
use crate::ontology::store::CacheStore;
use futures::future::join_all;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Loaded graphs keyed by ontology name; shared read-only by batch workers.
pub type OntologyGraphs = HashMap<String, Arc<OntologyGraph>>;

/// Cache key for an ontology name
pub fn cache_key(name: &str) -> String {
    format!("ontology:{name}")
}

/// Where a loaded graph came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Cache,
    File,
}

#[derive(Debug, Clone)]
pub struct LoadedOntology {
    pub name: String,
    pub graph: Arc<OntologyGraph>,
    pub source: LoadSource,
    /// Term blocks skipped for lacking an id (always 0 for cache hits)
    pub malformed_terms: usize,
    /// Cache failures met on the way (read, decode or write)
    pub cache_warnings: usize,
}

/// Outcome of loading several ontologies
#[derive(Debug, Default)]
pub struct OntologyLoadReport {
    pub graphs: OntologyGraphs,
    /// Ontologies that could not be loaded, with the reason
    pub failures: BTreeMap<String, String>,
    pub malformed_terms: BTreeMap<String, usize>,
    pub cache_warnings: usize,
}

pub struct OntologyCache {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl OntologyCache {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn store_name(&self) -> &str {
        self.store.name()
    }

    /// Load one ontology, consulting the cache first
    pub async fn load(&self, name: &str, source: &Path) -> Result<LoadedOntology> {
        let key = cache_key(name);
        let mut cache_warnings = 0;

        match self.store.get(&key).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<OntologyGraph>(&bytes) {
                Ok(graph) => {
                    info!(ontology = %name, terms = graph.len(), cache = %self.store.name(), "Loaded ontology from cache");
                    return Ok(LoadedOntology {
                        name: name.to_string(),
                        graph: Arc::new(graph),
                        source: LoadSource::Cache,
                        malformed_terms: 0,
                        cache_warnings,
                    });
                },
                Err(e) => {
                    cache_warnings += 1;
                    warn!(ontology = %name, error = %e, "Cached ontology could not be decoded, parsing source");
                },
            },
            Ok(None) => {},
            Err(e) => {
                cache_warnings += 1;
                warn!(ontology = %name, cache = %self.store.name(), error = %e, "Cache read failed, parsing source");
            },
        }

        let path = source.to_path_buf();
        let parsed = tokio::task::spawn_blocking(move || OboParser::parse_file(&path))
            .await
            .map_err(|e| AnnotError::ontology_load(name, e))?
            .map_err(|e| AnnotError::ontology_load(name, e))?;

        for malformed in &parsed.malformed {
            warn!(ontology = %name, "Malformed term skipped: {}", malformed);
        }

        match serde_json::to_vec(&parsed.graph) {
            Ok(bytes) => {
                if let Err(e) = self.store.set(&key, bytes, self.ttl).await {
                    cache_warnings += 1;
                    warn!(ontology = %name, cache = %self.store.name(), error = %e, "Cache write failed");
                }
            },
            Err(e) => {
                cache_warnings += 1;
                warn!(ontology = %name, error = %e, "Could not serialize ontology for caching");
            },
        }

        info!(
            ontology = %name,
            path = %source.display(),
            terms = parsed.graph.len(),
            malformed = parsed.malformed.len(),
            "Loaded ontology from file"
        );

        Ok(LoadedOntology {
            name: name.to_string(),
            graph: Arc::new(parsed.graph),
            source: LoadSource::File,
            malformed_terms: parsed.malformed.len(),
            cache_warnings,
        })
    }

    /// Load several ontologies concurrently.
    ///
    /// A failed ontology is recorded in the report and left out of `graphs`;
    /// the others still load.
    pub async fn load_all(&self, files: &[(String, PathBuf)]) -> OntologyLoadReport {
        let results = join_all(
            files
                .iter()
                .map(|(name, path)| async move { (name, self.load(name, path).await) }),
        )
        .await;

        let mut report = OntologyLoadReport::default();
        for (name, result) in results {
            match result {
                Ok(loaded) => {
                    report.cache_warnings += loaded.cache_warnings;
                    if loaded.malformed_terms > 0 {
                        report.malformed_terms.insert(name.clone(), loaded.malformed_terms);
                    }
                    report.graphs.insert(name.clone(), loaded.graph);
                },
                Err(e) => {
                    error!(ontology = %name, error = %e, "Failed to load ontology");
                    report.failures.insert(name.clone(), e.to_string());
                },
            }
        }
        report
    }
}
