//! Build automation tasks for rnannot
//!
//! - `generate-cli-docs`: render the CLI reference from the clap definitions

use anyhow::Context;
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation tasks for rnannot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Generate the CLI reference in Markdown
    GenerateCliDocs {
        /// Output directory for generated documentation
        #[arg(short, long, default_value = "docs")]
        output_dir: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::GenerateCliDocs { output_dir } => generate_cli_docs(&output_dir)?,
    }

    Ok(())
}

fn generate_cli_docs(output_dir: &Path) -> anyhow::Result<()> {
    println!("Generating CLI documentation...");

    let markdown = clap_markdown::help_markdown::<rnannot_cli::Cli>();

    let content = format!(
        r#"# rnannot CLI Reference

Generated from the CLI source code on {}.

## Overview

`rnannot` reads a CSV table with a `sequence` column, annotates every row with
terms from the ontologies in `--ontology-dir`, validates the annotations and
writes the augmented table to `--output`.

```bash
rnannot --input sequences.csv --output annotated.csv --ontology-dir ontologies/
```

Ontology files are `.obo` files. `gene_ontology.obo` is loaded as `GO`,
`sequence_ontology.obo` as `SO`, and any other file under its file stem.

## Commands

{}

## Environment Variables

| Variable | Default | Meaning |
|----------|---------|---------|
| `MAX_WORKERS` | `4` | Batches annotated concurrently |
| `BATCH_SIZE` | `1000` | Records per batch |
| `CACHE_EXPIRY` | `3600` | Seconds a cached ontology stays valid |
| `MIN_CONFIDENCE` | `0.8` | Score a term needs to match, and the confidence validation requires |
| `ONTOLOGIES` | `GO,SO` | Ontologies to annotate with, in validation order |
| `REDIS_URL` | unset | Same as `--cache-url` |
| `STORE_URI` | unset | Same as `--store-uri` |
| `LOG_LEVEL` | `info` | `trace`, `debug`, `info`, `warn` or `error` |
| `LOG_OUTPUT` | `both` | `console`, `file` or `both` |
| `LOG_FORMAT` | `text` | `text` or `json` |
| `LOG_DIR` | `logs` | Directory for rotated log files |

## Output Columns

For every ontology `X` the output gains `X_annotation` (matched term ids
joined with `;`) and `X_confidence` (mean score of the matches, `0` when
nothing matched), followed by a single `validation_status` column holding
`PASS`, `MISSING_REQUIRED_ANNOTATION` or `LOW_CONFIDENCE`.

## Exit Status

- `0`: the run completed, possibly with failed batches or ontologies (see the log)
- `1`: setup failed (invalid configuration, unreadable ontology directory or input table, no ontology loaded, output not writable)

---

*This file is generated. To update it, run `cargo xtask generate-cli-docs`.*
"#,
        chrono::Utc::now().format("%Y-%m-%d"),
        markdown
    );

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let file_path = output_dir.join("cli-reference.md");
    fs::write(&file_path, content).with_context(|| format!("Failed to write {}", file_path.display()))?;

    println!("Generated CLI documentation at: {}", file_path.display());

    Ok(())
}
