//! Redis-backed cache store

use crate::error::{AnnotError, Result};
use crate::ontology::store::CacheStore;
use async_trait::async_trait;
use redis::AsyncCommands;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// Upper bound for a single Redis round trip.
pub const DEFAULT_REDIS_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Clone)]
pub struct RedisCacheStore {
    client: redis::Client,
    timeout: Duration,
}

impl RedisCacheStore {
    /// Validate `url` and build a client. No connection is opened until the
    /// first `get` or `set`.
    pub fn new(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(AnnotError::cache)?;
        Ok(Self {
            client,
            timeout: DEFAULT_REDIS_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        timeout(self.timeout, self.client.get_multiplexed_async_connection())
            .await
            .map_err(|_| AnnotError::cache("timed out connecting to redis"))?
            .map_err(AnnotError::cache)
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    fn name(&self) -> &str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.connection().await?;
        let value: Option<Vec<u8>> = timeout(self.timeout, conn.get(key))
            .await
            .map_err(|_| AnnotError::cache(format!("timed out reading {key}")))?
            .map_err(AnnotError::cache)?;
        debug!(key = %key, hit = value.is_some(), "Redis get");
        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        let mut conn = self.connection().await?;
        let ttl_secs = ttl.as_secs().max(1);
        let _: () = timeout(self.timeout, conn.set_ex(key, value, ttl_secs))
            .await
            .map_err(|_| AnnotError::cache(format!("timed out writing {key}")))?
            .map_err(AnnotError::cache)?;
        debug!(key = %key, ttl_secs, "Redis set");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_url() {
        assert!(matches!(
            RedisCacheStore::new("not a url"),
            Err(AnnotError::CacheUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_cache_error() {
        // Port 1 on loopback refuses connections.
        let store = RedisCacheStore::new("redis://127.0.0.1:1/")
            .unwrap()
            .with_timeout(Duration::from_millis(500));
        let err = store.get("ontology:GO").await.unwrap_err();
        assert!(matches!(err, AnnotError::CacheUnavailable(_)));
    }
}
