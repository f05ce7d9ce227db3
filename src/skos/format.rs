//! Output formats.

use std::fmt;

/// Output format for a set of concepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Turtle (text/turtle), with prefixes bound
    #[default]
    Turtle,
    /// N-Triples (application/n-triples), one triple per line
    #[value(name = "ntriples")]
    NTriples,
    /// RDF/XML (application/rdf+xml)
    #[value(name = "rdfxml")]
    RdfXml,
    /// JSON-LD (application/ld+json)
    #[value(name = "jsonld")]
    JsonLd,
    /// One JSON object per concept and line, not RDF
    Ndjson,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Turtle => write!(f, "Turtle"),
            Self::NTriples => write!(f, "N-Triples"),
            Self::RdfXml => write!(f, "RDF/XML"),
            Self::JsonLd => write!(f, "JSON-LD"),
            Self::Ndjson => write!(f, "NDJSON"),
        }
    }
}

impl OutputFormat {
    /// Whether the format is an RDF serialization.
    #[must_use]
    pub const fn is_rdf(&self) -> bool {
        !matches!(self, Self::Ndjson)
    }
}
