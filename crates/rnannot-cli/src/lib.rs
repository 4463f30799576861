//! rnannot command line
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Annotates a sequence table with ontology terms and writes the annotated,
//! validated table back out. Tuning (`MAX_WORKERS`, `BATCH_SIZE`,
//! `CACHE_EXPIRY`, `MIN_CONFIDENCE`, `ONTOLOGIES`) comes from the environment.

use anyhow::{Context, Result};
use clap::Parser;
use rnannot_core::{
    AnnotationPipeline, AnnotatorConfig, CacheStore, ConstantScorer, NoopCacheStore, PgDocumentStore,
    RedisCacheStore, RunSummary, UnavailableDocumentStore,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

/// rnannot - RNA sequence ontology annotator
#[derive(Parser, Debug)]
#[command(name = "rnannot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input table (CSV with a `sequence` column)
    #[arg(long)]
    pub input: PathBuf,

    /// Where to write the annotated table
    #[arg(long)]
    pub output: PathBuf,

    /// Directory holding the ontology `.obo` files
    #[arg(long)]
    pub ontology_dir: PathBuf,

    /// Redis URL for the ontology cache (parse-only when absent)
    #[arg(long, env = "REDIS_URL")]
    pub cache_url: Option<String>,

    /// Postgres URI for storing annotated records
    #[arg(long, env = "STORE_URI")]
    pub store_uri: Option<String>,
}

/// Run one annotation from parsed arguments
pub async fn run(cli: &Cli) -> Result<RunSummary> {
    let config = AnnotatorConfig::from_env().context("Invalid annotator configuration")?;
    info!(
        max_workers = config.max_workers,
        batch_size = config.batch_size,
        cache_expiry_secs = config.cache_expiry_secs,
        min_confidence = config.min_confidence,
        ontologies = ?config.ontologies,
        "Configuration loaded"
    );

    let cache_store = open_cache(cli.cache_url.as_deref());
    let mut pipeline = AnnotationPipeline::new(config, cache_store, Arc::new(ConstantScorer::default()));

    if let Some(uri) = cli.store_uri.as_deref() {
        pipeline = match PgDocumentStore::connect(uri).await {
            Ok(store) => pipeline.with_document_store(Arc::new(store)),
            Err(e) => {
                error!(error = %e, "Document store unavailable, annotated records will not be persisted");
                pipeline.with_document_store(Arc::new(UnavailableDocumentStore::new("postgres", e)))
            },
        };
    }

    pipeline
        .run_files(&cli.input, &cli.output, &cli.ontology_dir)
        .await
        .with_context(|| format!("Annotation of {} failed", cli.input.display()))
}

fn open_cache(url: Option<&str>) -> Arc<dyn CacheStore> {
    let Some(url) = url else {
        info!("No cache configured, ontologies will be parsed from source");
        return Arc::new(NoopCacheStore);
    };

    match RedisCacheStore::new(url) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!(error = %e, "Cache URL rejected, continuing without a cache");
            Arc::new(NoopCacheStore)
        },
    }
}
