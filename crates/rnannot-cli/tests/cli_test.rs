//! End-to-end tests for the rnannot binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

fn core_fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("rnannot-core")
        .join("tests")
        .join("fixtures")
}

/// Binary with console-only logging and no external services
fn rnannot() -> Command {
    let mut cmd = Command::cargo_bin("rnannot").unwrap();
    cmd.env("LOG_OUTPUT", "console")
        .env("LOG_LEVEL", "warn")
        .env_remove("REDIS_URL")
        .env_remove("STORE_URI")
        .env_remove("MAX_WORKERS")
        .env_remove("BATCH_SIZE")
        .env_remove("MIN_CONFIDENCE")
        .env_remove("ONTOLOGIES");
    cmd
}

#[test]
fn test_help_lists_all_flags() {
    rnannot()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--input"))
        .stdout(predicate::str::contains("--output"))
        .stdout(predicate::str::contains("--ontology-dir"))
        .stdout(predicate::str::contains("--cache-url"))
        .stdout(predicate::str::contains("--store-uri"));
}

#[test]
fn test_run_writes_annotated_table() {
    let out = tempfile::tempdir().unwrap();
    let output = out.path().join("annotated.csv");

    rnannot()
        .arg("--input")
        .arg(core_fixtures().join("tables").join("sequences.csv"))
        .arg("--output")
        .arg(&output)
        .arg("--ontology-dir")
        .arg(core_fixtures().join("ontology"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Annotated 3 of 3 records"));

    let written = std::fs::read_to_string(&output).unwrap();
    let mut lines = written.lines();
    assert_eq!(
        lines.next().unwrap(),
        "id,sequence,source,GO_annotation,GO_confidence,SO_annotation,SO_confidence,validation_status"
    );
    // The default scorer matches nothing
    assert_eq!(
        lines.next().unwrap(),
        "r1,AUGGCUACGUAGC,lab-a,,0,,0,MISSING_REQUIRED_ANNOTATION"
    );
}

#[test]
fn test_unreadable_ontology_dir_exits_with_failure() {
    let out = tempfile::tempdir().unwrap();

    rnannot()
        .arg("--input")
        .arg(core_fixtures().join("tables").join("sequences.csv"))
        .arg("--output")
        .arg(out.path().join("annotated.csv"))
        .arg("--ontology-dir")
        .arg(out.path().join("missing"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Cannot read ontology directory"));
}

#[test]
fn test_invalid_configuration_exits_with_failure() {
    let out = tempfile::tempdir().unwrap();

    rnannot()
        .env("MAX_WORKERS", "many")
        .arg("--input")
        .arg(core_fixtures().join("tables").join("sequences.csv"))
        .arg("--output")
        .arg(out.path().join("annotated.csv"))
        .arg("--ontology-dir")
        .arg(core_fixtures().join("ontology"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid annotator configuration"));
}

#[test]
fn test_unreachable_cache_still_completes() {
    let out = tempfile::tempdir().unwrap();

    rnannot()
        .env("REDIS_URL", "redis://127.0.0.1:1/")
        .arg("--input")
        .arg(core_fixtures().join("tables").join("sequences.csv"))
        .arg("--output")
        .arg(out.path().join("annotated.csv"))
        .arg("--ontology-dir")
        .arg(core_fixtures().join("ontology"))
        .assert()
        .success();
}

#[test]
fn test_dotenv_file_supplies_cache_url() {
    let work = tempfile::tempdir().unwrap();
    std::fs::write(work.path().join(".env"), "REDIS_URL=not-a-url\n").unwrap();

    rnannot()
        .current_dir(work.path())
        .arg("--input")
        .arg(core_fixtures().join("tables").join("sequences.csv"))
        .arg("--output")
        .arg(work.path().join("annotated.csv"))
        .arg("--ontology-dir")
        .arg(core_fixtures().join("ontology"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Cache URL rejected"));
}
