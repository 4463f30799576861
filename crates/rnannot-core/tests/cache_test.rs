//! Cache-aside loading tests

use rnannot_core::ontology::{LoadSource, OntologyCache, OntologyGraph};
use rnannot_core::{CacheStore, InMemoryCacheStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("ontology")
        .join(name)
}

#[tokio::test]
async fn test_warm_cache_skips_source_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sequence_ontology.obo");
    std::fs::copy(fixture("sequence_ontology.obo"), &path).unwrap();

    let cache = OntologyCache::new(Arc::new(InMemoryCacheStore::new()), Duration::from_secs(3600));

    let first = cache.load("SO", &path).await.unwrap();
    assert_eq!(first.source, LoadSource::File);

    // With the source gone, only the cache can satisfy the second load
    std::fs::remove_file(&path).unwrap();

    let second = cache.load("SO", &path).await.unwrap();
    assert_eq!(second.source, LoadSource::Cache);
    assert_eq!(*second.graph, *first.graph);
    assert_eq!(
        second.graph.get("SO:0000253").unwrap().parents().collect::<Vec<_>>(),
        vec!["SO:0000655"]
    );
}

#[tokio::test]
async fn test_expired_entry_reparses() {
    let store = Arc::new(InMemoryCacheStore::new());
    let cache = OntologyCache::new(store.clone(), Duration::from_millis(20));
    let path = fixture("gene_ontology.obo");

    cache.load("GO", &path).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let reloaded = cache.load("GO", &path).await.unwrap();
    assert_eq!(reloaded.source, LoadSource::File);
}

#[tokio::test]
async fn test_entries_are_keyed_by_name() {
    let store = Arc::new(InMemoryCacheStore::new());
    let cache = OntologyCache::new(store.clone(), Duration::from_secs(3600));

    let files = vec![
        ("GO".to_string(), fixture("gene_ontology.obo")),
        ("SO".to_string(), fixture("sequence_ontology.obo")),
    ];
    let report = cache.load_all(&files).await;
    assert!(report.failures.is_empty());
    assert_eq!(store.len().await, 2);

    let bytes = store.get("ontology:GO").await.unwrap().unwrap();
    let cached: OntologyGraph = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(cached, *report.graphs["GO"]);
}
