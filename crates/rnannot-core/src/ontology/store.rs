//! Key-value cache stores
//!
//! The ontology cache only needs `get` and `set` with an expiry. Anything that
//! can do both implements [`CacheStore`]; running without a cache uses
//! [`NoopCacheStore`] rather than an `Option` checked at every call site.

use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Short name used in log fields
    fn name(&self) -> &str;

    /// Fetch the bytes stored under `key`, if present and not expired
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, expiring after `ttl`
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()>;
}

/// Stands in for an absent cache: every read misses, writes are dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCacheStore;

#[async_trait]
impl CacheStore for NoopCacheStore {
    fn name(&self) -> &str {
        "none"
    }

    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> Result<()> {
        Ok(())
    }
}

/// Process-local cache with per-entry expiry
#[derive(Debug, Default)]
pub struct InMemoryCacheStore {
    entries: Mutex<HashMap<String, (Vec<u8>, Instant)>>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .await
            .values()
            .filter(|(_, expires_at)| *expires_at > now)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some((value, expires_at)) if *expires_at > Instant::now() => Ok(Some(value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            },
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        entries.retain(|_, (_, expires_at)| *expires_at > now);
        entries.insert(key.to_string(), (value, now + ttl));
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_always_misses() {
        let store = NoopCacheStore;
        store.set("k", b"v".to_vec(), Duration::from_secs(60)).await.unwrap();
        assert!(store.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_round_trip() {
        let store = InMemoryCacheStore::new();
        assert!(store.get("ontology:GO").await.unwrap().is_none());

        store
            .set("ontology:GO", b"[]".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(store.get("ontology:GO").await.unwrap(), Some(b"[]".to_vec()));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_memory_entries_expire() {
        let store = InMemoryCacheStore::new();
        store
            .set("ontology:SO", b"[]".to_vec(), Duration::from_millis(20))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(store.get("ontology:SO").await.unwrap().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_memory_set_evicts_expired_entries() {
        let store = InMemoryCacheStore::new();
        store
            .set("ontology:GO", b"[]".to_vec(), Duration::from_millis(20))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;

        store
            .set("ontology:SO", b"[]".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();
        let entries = store.entries.lock().await;
        assert_eq!(entries.len(), 1);
        assert!(entries.contains_key("ontology:SO"));
    }
}
