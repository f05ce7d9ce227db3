//! SKOS output for decoded concepts.
//!
//! Each [`Concept`] becomes a `skos:Concept` resource. The graph can be
//! written as Turtle, N-Triples, RDF/XML or JSON-LD through oxrdfio, or the
//! concepts themselves as newline-delimited JSON.
//!
//! # Examples
//!
//! ```
//! use marc2skos::concept::Concept;
//! use marc2skos::skos::{concepts_to_graph, OutputFormat};
//!
//! let concept = Concept {
//!     uri: "http://dewey.info/class/152/e23/".to_string(),
//!     scheme_uris: vec!["http://dewey.info/scheme/edition/e23/".to_string()],
//!     notation: Some("152".to_string()),
//!     pref_label: Some("Sansing".to_string()),
//!     lang: "nb".to_string(),
//!     ..Concept::default()
//! };
//! let graph = concepts_to_graph(&[concept]);
//! let nt = graph.serialize(OutputFormat::NTriples).unwrap();
//! assert!(nt.contains("\"Sansing\"@nb"));
//! ```

mod format;
pub mod namespaces;
mod rdf;

pub use format::OutputFormat;
pub use rdf::{RdfGraph, RdfNode, RdfTriple};

use crate::concept::{Concept, Relation};
use crate::error::{MarcError, Result};
use std::io::Write;

/// Add the triples describing `concept` to `graph`.
pub fn add_concept(graph: &mut RdfGraph, concept: &Concept) {
    let subject = RdfNode::uri(&concept.uri);
    let lang = concept.lang.as_str();

    graph.add(
        subject.clone(),
        namespaces::rdf_type(),
        RdfNode::uri(namespaces::skos("Concept")),
    );

    let scheme_property = if concept.is_top_concept {
        namespaces::skos("topConceptOf")
    } else {
        namespaces::skos("inScheme")
    };
    for scheme_uri in &concept.scheme_uris {
        graph.add(subject.clone(), scheme_property.clone(), RdfNode::uri(scheme_uri));
    }

    if let Some(created) = concept.created {
        graph.add(
            subject.clone(),
            namespaces::dcterms("created"),
            RdfNode::xsd_literal(created.format("%Y-%m-%d").to_string(), "date"),
        );
    }
    if let Some(modified) = concept.modified {
        graph.add(
            subject.clone(),
            namespaces::dcterms("modified"),
            RdfNode::xsd_literal(modified.format("%Y-%m-%d").to_string(), "date"),
        );
    }

    if let Some(notation) = concept.display_notation() {
        graph.add(subject.clone(), namespaces::skos("notation"), RdfNode::literal(notation));
    }
    if let Some(control_number) = concept.control_number.as_deref() {
        graph.add(
            subject.clone(),
            namespaces::dcterms("identifier"),
            RdfNode::literal(control_number),
        );
    }

    if let Some(label) = concept.pref_label.as_deref() {
        graph.add(
            subject.clone(),
            namespaces::skos("prefLabel"),
            RdfNode::literal_with_lang(label, lang),
        );
    }
    for label in &concept.alt_labels {
        graph.add(
            subject.clone(),
            namespaces::skos("altLabel"),
            RdfNode::literal_with_lang(label, lang),
        );
    }

    for relation in &concept.relations {
        let predicate = match &relation.relation {
            Relation::Custom(uri) => uri.clone(),
            other => other.skos_name().map(namespaces::skos).unwrap_or_default(),
        };
        graph.add(subject.clone(), predicate, RdfNode::uri(&relation.uri));
    }

    for (property, notes) in concept.notes.iter() {
        for note in notes {
            graph.add(
                subject.clone(),
                namespaces::skos(property),
                RdfNode::literal_with_lang(note, lang),
            );
        }
    }

    if concept.deprecated {
        graph.add(
            subject.clone(),
            format!("{}deprecated", namespaces::OWL),
            RdfNode::xsd_literal("true", "boolean"),
        );
    }

    add_component_list(graph, &subject, concept);

    for (key, values) in &concept.web_dewey_extras {
        for value in values {
            graph.add(
                subject.clone(),
                format!("{}{key}", namespaces::WD),
                RdfNode::literal_with_lang(value, lang),
            );
        }
    }
}

/// `mads:componentList` as an RDF collection of component URIs.
fn add_component_list(graph: &mut RdfGraph, subject: &RdfNode, concept: &Concept) {
    let uris: Vec<&str> = concept
        .components
        .iter()
        .filter_map(|c| c.uri.as_deref())
        .collect();
    if uris.is_empty() {
        return;
    }

    let first = format!("{}first", namespaces::RDF);
    let rest = format!("{}rest", namespaces::RDF);

    let mut node = graph.new_blank_node();
    graph.add(subject.clone(), format!("{}componentList", namespaces::MADS), node.clone());
    for (i, uri) in uris.iter().enumerate() {
        if i > 0 {
            let next = graph.new_blank_node();
            graph.add(node, rest.clone(), next.clone());
            node = next;
        }
        graph.add(node.clone(), first.clone(), RdfNode::uri(*uri));
    }
    graph.add(node, rest, RdfNode::uri(format!("{}nil", namespaces::RDF)));
}

/// Build a graph from a set of concepts.
#[must_use]
pub fn concepts_to_graph(concepts: &[Concept]) -> RdfGraph {
    let mut graph = RdfGraph::new();
    for concept in concepts {
        add_concept(&mut graph, concept);
    }
    graph
}

/// Write concepts in the given format.
///
/// # Errors
///
/// Returns an error if a URI is not a valid IRI or writing fails.
pub fn write_concepts<W: Write>(mut writer: W, concepts: &[Concept], format: OutputFormat) -> Result<()> {
    if format.is_rdf() {
        return concepts_to_graph(concepts).serialize_to_writer(writer, format);
    }
    for concept in concepts {
        serde_json::to_writer(&mut writer, concept).map_err(|e| MarcError::IoError(e.into()))?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}
