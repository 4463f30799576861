//! Ontology parser tests against fixture files

use rnannot_core::ontology::{MalformedTerm, OboParser, Relationship};
use std::path::PathBuf;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

#[test]
fn test_parse_gene_ontology_fixture() {
    let parsed = OboParser::parse_file(fixture_path().join("ontology").join("gene_ontology.obo"))
        .expect("Failed to parse GO fixture");

    assert!(parsed.malformed.is_empty());
    assert_eq!(parsed.graph.ids().collect::<Vec<_>>(), vec!["GO:0003723", "GO:0006396"]);

    let binding = parsed.graph.get("GO:0003723").unwrap();
    assert_eq!(binding.name.as_deref(), Some("RNA binding"));
    assert_eq!(
        binding.synonyms,
        vec!["\"base pairing with RNA\" NARROW []", "\"poly(A) RNA binding\" NARROW []"]
    );
    assert_eq!(binding.xrefs, vec!["Reactome:R-HSA-203927"]);
    assert_eq!(binding.parents().collect::<Vec<_>>(), vec!["GO:0003676"]);

    let processing = parsed.graph.get("GO:0006396").unwrap();
    assert_eq!(
        processing.relationships,
        vec![
            Relationship::is_a("GO:0016070"),
            Relationship::new("part_of", "GO:0010467"),
        ]
    );
    // The [Typedef] stanza closes the last term and is not a term itself
    assert!(!parsed.graph.contains("part_of"));
    assert!(!processing.properties.contains_key("is_transitive"));
}

#[test]
fn test_malformed_block_does_not_truncate_file() {
    let parsed = OboParser::parse_file(fixture_path().join("malformed.obo")).expect("Failed to parse fixture");

    assert_eq!(parsed.graph.ids().collect::<Vec<_>>(), vec!["SO:0000001", "SO:0000002"]);
    assert_eq!(
        parsed.malformed,
        vec![MalformedTerm {
            line: 7,
            name: Some("orphan block".to_string()),
        }]
    );

    // Repeated synonyms are kept
    let structure = parsed.graph.get("SO:0000002").unwrap();
    assert_eq!(structure.synonyms.len(), 2);
}

#[test]
fn test_missing_file_is_io_error() {
    let result = OboParser::parse_file(fixture_path().join("does_not_exist.obo"));
    assert!(matches!(result, Err(rnannot_core::AnnotError::Io(_))));
}
