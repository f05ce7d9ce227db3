//! Common test helpers shared across the integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use marc2skos::concept::Concept;
use marc2skos::{marcxml, process_records, DefaultScheme, ProcessOptions, Vocabularies};

/// Path of a file in `tests/data`.
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// The bundled vocabulary table.
pub fn vocabularies() -> Vocabularies {
    Vocabularies::bundled().expect("bundled vocabularies load")
}

/// The bundled table with every record minted from `template`.
pub fn vocabularies_with_uri(template: &str) -> Vocabularies {
    vocabularies()
        .with_default_scheme(DefaultScheme {
            generic: Some(template.to_string()),
            ..DefaultScheme::default()
        })
        .expect("valid template")
}

/// Every option that adds content switched on.
pub fn full_options() -> ProcessOptions {
    ProcessOptions::new()
        .with_altlabels(true)
        .with_notes(true)
        .with_components(true)
}

/// Process a MARCXML string.
pub fn process_xml(xml: &str, vocabularies: &Vocabularies, options: &ProcessOptions) -> Vec<Concept> {
    let records = marcxml::parse_str(xml).expect("well-formed MARCXML");
    process_records(records, vocabularies, options)
}

/// Process a fixture file.
pub fn process_fixture(name: &str, options: &ProcessOptions) -> Vec<Concept> {
    let records = marcxml::read_file(fixture(name)).expect("fixture is readable");
    process_records(records, &vocabularies(), options)
}

/// Find a concept by URI.
pub fn concept<'a>(concepts: &'a [Concept], uri: &str) -> &'a Concept {
    concepts
        .iter()
        .find(|c| c.uri == uri)
        .unwrap_or_else(|| panic!("no concept <{uri}>"))
}
