//! Delimited table input and output
//!
//! Input needs a header row with a `sequence` column. Output repeats the input
//! columns, then a `{ontology}_annotation` / `{ontology}_confidence` pair per
//! ontology, then `validation_status`.

use crate::error::{AnnotError, Result};
use crate::record::{
    annotation_column, confidence_column, SequenceRecord, SEQUENCE_COLUMN, VALIDATION_STATUS_COLUMN,
};
use std::path::Path;
use tracing::info;

/// Separator between matched term ids in one annotation cell.
pub const TERM_ID_SEPARATOR: &str = ";";

/// Rows of an input table plus its header, in file order
#[derive(Debug, Clone, Default)]
pub struct SequenceTable {
    pub headers: Vec<String>,
    pub records: Vec<SequenceRecord>,
}

/// Read an input table. A missing `sequence` column is an error.
pub fn read_sequence_table(path: &Path) -> Result<SequenceTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| AnnotError::table(format!("Cannot open {}: {}", path.display(), e)))?;

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if !headers.iter().any(|h| h == SEQUENCE_COLUMN) {
        return Err(AnnotError::table(format!(
            "{} has no '{}' column (found: {})",
            path.display(),
            SEQUENCE_COLUMN,
            headers.join(", ")
        )));
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let columns = headers
            .iter()
            .cloned()
            .zip(row.iter().map(str::to_string))
            .collect();
        records.push(SequenceRecord::new(columns));
    }

    info!(path = %path.display(), records = records.len(), columns = headers.len(), "Read input table");

    Ok(SequenceTable { headers, records })
}

/// Output header: `headers`, any other input columns seen on records, the
/// annotation pairs in first-seen ontology order, and `validation_status` if
/// any record has one.
pub fn output_headers(headers: &[String], records: &[SequenceRecord]) -> Vec<String> {
    let mut columns: Vec<String> = headers.to_vec();
    let mut ontologies: Vec<&str> = Vec::new();
    let mut has_status = false;

    for record in records {
        for (name, _) in record.columns() {
            if !columns.contains(name) {
                columns.push(name.clone());
            }
        }
        for (ontology, _) in record.annotations() {
            if !ontologies.contains(&ontology.as_str()) {
                ontologies.push(ontology);
            }
        }
        has_status |= record.validation_status().is_some();
    }

    for ontology in ontologies {
        columns.push(annotation_column(ontology));
        columns.push(confidence_column(ontology));
    }
    if has_status {
        columns.push(VALIDATION_STATUS_COLUMN.to_string());
    }
    columns
}

/// Write annotated records. Cells a record has no value for are left empty.
pub fn write_annotated_table(path: &Path, headers: &[String], records: &[SequenceRecord]) -> Result<()> {
    let columns = output_headers(headers, records);
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AnnotError::table(format!("Cannot create {}: {}", path.display(), e)))?;

    writer.write_record(&columns)?;
    for record in records {
        let row: Vec<String> = columns.iter().map(|column| cell(record, column)).collect();
        writer.write_record(&row)?;
    }
    writer.flush()?;

    info!(path = %path.display(), records = records.len(), columns = columns.len(), "Wrote annotated table");
    Ok(())
}

fn cell(record: &SequenceRecord, column: &str) -> String {
    if let Some(value) = record.get(column) {
        return value.to_string();
    }
    if column == VALIDATION_STATUS_COLUMN {
        return record
            .validation_status()
            .map(|v| v.as_str().to_string())
            .unwrap_or_default();
    }
    for (ontology, result) in record.annotations() {
        if column == annotation_column(ontology) {
            return result.matched_term_ids.join(TERM_ID_SEPARATOR);
        }
        if column == confidence_column(ontology) {
            return result.confidence.to_string();
        }
    }
    String::new()
}
