// Ontology file discovery

use crate::error::{AnnotError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Extension of ontology source files.
pub const ONTOLOGY_EXTENSION: &str = "obo";

/// File names that map to a conventional ontology name instead of their stem.
pub const WELL_KNOWN_FILES: &[(&str, &str)] = &[
    ("gene_ontology.obo", "GO"),
    ("sequence_ontology.obo", "SO"),
];

/// Ontology name for a file name, if it is an ontology source at all
pub fn ontology_name(file_name: &str) -> Option<String> {
    if let Some((_, name)) = WELL_KNOWN_FILES.iter().find(|(file, _)| *file == file_name) {
        return Some(name.to_string());
    }

    let path = Path::new(file_name);
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext == ONTOLOGY_EXTENSION => path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        _ => None,
    }
}

/// List the ontology files of `dir` as `(name, path)` pairs sorted by name.
///
/// An unreadable directory is an error. Subdirectories and files without the
/// `.obo` extension are ignored.
pub fn discover_ontology_files(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        AnnotError::config(format!("Cannot read ontology directory {}: {}", dir.display(), e))
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        match ontology_name(file_name) {
            Some(name) => {
                debug!(ontology = %name, path = %path.display(), "Found ontology file");
                files.push((name, path));
            },
            None => debug!(path = %path.display(), "Skipping non-ontology file"),
        }
    }

    files.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    info!(dir = %dir.display(), count = files.len(), "Discovered ontology files");

    Ok(files)
}
