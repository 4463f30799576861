//! Document store persistence
//!
//! Annotated records are flattened to JSON objects and bulk-inserted. A store
//! failure never changes the in-memory result; callers log it and move on.

use crate::error::{AnnotError, Result};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder, Transaction};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

/// Documents per INSERT statement.
pub const DEFAULT_INSERT_CHUNK_SIZE: usize = 500;

/// How long to wait for the first database connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Destination for annotated records
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store identifier used in log fields and errors
    fn name(&self) -> &str;

    /// Insert every document, returning how many were written
    async fn insert_many(&self, documents: &[Value]) -> Result<usize>;
}

/// Postgres table of JSONB documents
pub struct PgDocumentStore {
    pool: PgPool,
    chunk_size: usize,
}

impl PgDocumentStore {
    /// Connect and make sure the `annotations` table exists
    pub async fn connect(uri: &str) -> Result<Self> {
        Self::connect_with_timeout(uri, DEFAULT_CONNECT_TIMEOUT).await
    }

    pub async fn connect_with_timeout(uri: &str, timeout: Duration) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(4)
            .acquire_timeout(timeout)
            .connect(uri)
            .await
            .map_err(|e| AnnotError::persistence("postgres", e))?;

        let store = Self::from_pool(pool);
        store.ensure_schema().await?;

        info!(store = %store.name(), "Document store connected");
        Ok(store)
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool,
            chunk_size: DEFAULT_INSERT_CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS annotations (
                id UUID PRIMARY KEY,
                document JSONB NOT NULL,
                inserted_at TIMESTAMPTZ DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AnnotError::persistence(self.name(), e))?;
        Ok(())
    }

    async fn insert_chunk(&self, tx: &mut Transaction<'_, Postgres>, chunk: &[Value]) -> Result<()> {
        let mut query_builder: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO annotations (id, document) ");

        query_builder.push_values(chunk, |mut b, document| {
            b.push_bind(Uuid::new_v4()).push_bind(document);
        });

        query_builder
            .build()
            .execute(&mut **tx)
            .await
            .map_err(|e| AnnotError::persistence(self.name(), e))?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    fn name(&self) -> &str {
        "postgres"
    }

    /// All chunks go in one transaction; a failed chunk rolls back the rest.
    async fn insert_many(&self, documents: &[Value]) -> Result<usize> {
        if documents.is_empty() {
            return Ok(0);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AnnotError::persistence(self.name(), e))?;

        let total_chunks = documents.len().div_ceil(self.chunk_size);
        for (chunk_idx, chunk) in documents.chunks(self.chunk_size).enumerate() {
            info!(
                store = %self.name(),
                "Inserting documents chunk {} / {} ({} documents)",
                chunk_idx + 1,
                total_chunks,
                chunk.len()
            );
            self.insert_chunk(&mut tx, chunk).await?;
        }

        tx.commit()
            .await
            .map_err(|e| AnnotError::persistence(self.name(), e))?;

        Ok(documents.len())
    }
}

/// Stands in for a store that could not be opened. Every insert reports the
/// original failure, so it lands in the run summary like any write error.
pub struct UnavailableDocumentStore {
    name: String,
    message: String,
}

impl UnavailableDocumentStore {
    pub fn new(name: impl Into<String>, error: impl ToString) -> Self {
        Self {
            name: name.into(),
            message: error.to_string(),
        }
    }
}

#[async_trait]
impl DocumentStore for UnavailableDocumentStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn insert_many(&self, _documents: &[Value]) -> Result<usize> {
        Err(AnnotError::persistence(&self.name, &self.message))
    }
}
