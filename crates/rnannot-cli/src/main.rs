//! rnannot CLI - Main entry point

use clap::Parser;
use rnannot_cli::Cli;
use rnannot_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    // Before clap reads REDIS_URL and STORE_URI
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Console plus a dated file under ./logs; environment variables take precedence
    let log_config = LogConfig::builder()
        .level(LogLevel::Info)
        .output(LogOutput::Both)
        .log_dir("logs")
        .log_file_prefix("rnannot")
        .build();
    let log_config = log_config.clone().merge_env().unwrap_or(log_config);

    // The CLI still works without logging
    let guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Warning: logging disabled: {:#}", e);
            None
        },
    };

    match rnannot_cli::run(&cli).await {
        Ok(summary) => {
            println!(
                "Annotated {} of {} records ({} failed batches) -> {}",
                summary.annotated_records,
                summary.total_records,
                summary.failed_batches.len(),
                cli.output.display()
            );
        },
        Err(e) => {
            error!(error = %e, "Run failed");
            eprintln!("Error: {:#}", e);
            drop(guard);
            process::exit(1);
        },
    }
}
