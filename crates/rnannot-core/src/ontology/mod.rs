//! Ontology loading
//!
//! - [`parser`]: `[Term]` block files into an [`OntologyGraph`]
//! - [`cache`]: cache-aside loading in front of the parser
//! - [`store`] / [`redis_store`]: the key-value stores the cache can use
//! - [`discovery`]: finding ontology files in a directory

pub mod cache;
pub mod discovery;
pub mod models;
pub mod parser;
pub mod redis_store;
pub mod store;

pub use cache::{cache_key, LoadSource, LoadedOntology, OntologyCache, OntologyGraphs, OntologyLoadReport};
pub use discovery::discover_ontology_files;
pub use models::{OntologyGraph, Relationship, TermRecord};
pub use parser::{MalformedTerm, OboParser, ParsedOntology};
pub use redis_store::RedisCacheStore;
pub use store::{CacheStore, InMemoryCacheStore, NoopCacheStore};
