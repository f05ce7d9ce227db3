//! In-memory RDF graph and serialization via oxrdfio.

use std::io::{Read, Write};

use oxrdf::{BlankNode, Literal, NamedNode, NamedOrBlankNode, Quad, Term, Triple};
use oxrdfio::{JsonLdProfileSet, RdfFormat as OxRdfFormat, RdfParser, RdfSerializer};

use crate::error::{MarcError, Result};

use super::format::OutputFormat;
use super::namespaces;

/// A single RDF triple (subject, predicate, object).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RdfTriple {
    /// The subject of the triple.
    pub subject: RdfNode,
    /// The predicate (property) of the triple.
    pub predicate: String,
    /// The object of the triple.
    pub object: RdfNode,
}

impl RdfTriple {
    /// Creates a new RDF triple.
    #[must_use]
    pub fn new(subject: RdfNode, predicate: impl Into<String>, object: RdfNode) -> Self {
        Self {
            subject,
            predicate: predicate.into(),
            object,
        }
    }
}

/// An RDF node (subject or object in a triple).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RdfNode {
    /// A named node (IRI/URI).
    Uri(String),
    /// A blank node with a local identifier.
    BlankNode(String),
    /// A literal value with optional language tag or datatype.
    Literal {
        /// The literal value.
        value: String,
        /// Optional language tag (e.g., "nb", "en").
        language: Option<String>,
        /// Optional datatype URI.
        datatype: Option<String>,
    },
}

impl RdfNode {
    /// Creates a new URI node.
    #[must_use]
    pub fn uri(uri: impl Into<String>) -> Self {
        Self::Uri(uri.into())
    }

    /// Creates a new blank node.
    #[must_use]
    pub fn blank(id: impl Into<String>) -> Self {
        Self::BlankNode(id.into())
    }

    /// Creates a new plain literal.
    #[must_use]
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal {
            value: value.into(),
            language: None,
            datatype: None,
        }
    }

    /// Creates a new literal with a language tag.
    #[must_use]
    pub fn literal_with_lang(value: impl Into<String>, lang: impl Into<String>) -> Self {
        Self::Literal {
            value: value.into(),
            language: Some(lang.into()),
            datatype: None,
        }
    }

    /// Creates a new literal with an XML Schema datatype (`date`, `boolean`, ...).
    #[must_use]
    pub fn xsd_literal(value: impl Into<String>, xsd_type: &str) -> Self {
        Self::Literal {
            value: value.into(),
            language: None,
            datatype: Some(format!("{}{xsd_type}", namespaces::XSD)),
        }
    }

    /// Returns true if this is a URI node.
    #[must_use]
    pub const fn is_uri(&self) -> bool {
        matches!(self, Self::Uri(_))
    }

    /// Returns true if this is a blank node.
    #[must_use]
    pub const fn is_blank(&self) -> bool {
        matches!(self, Self::BlankNode(_))
    }

    /// Returns true if this is a literal.
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(self, Self::Literal { .. })
    }
}

/// An RDF graph containing triples in insertion order.
#[derive(Debug, Clone, Default)]
pub struct RdfGraph {
    triples: Vec<RdfTriple>,
    blank_node_counter: usize,
}

impl RdfGraph {
    /// Creates a new empty RDF graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a triple to the graph.
    pub fn add_triple(&mut self, triple: RdfTriple) {
        self.triples.push(triple);
    }

    /// Adds a triple from components.
    pub fn add(&mut self, subject: RdfNode, predicate: impl Into<String>, object: RdfNode) {
        self.add_triple(RdfTriple::new(subject, predicate, object));
    }

    /// Generates a new unique blank node.
    pub fn new_blank_node(&mut self) -> RdfNode {
        self.blank_node_counter += 1;
        RdfNode::blank(format!("b{}", self.blank_node_counter))
    }

    /// Returns the number of triples in the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Returns true if the graph is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Returns an iterator over the triples.
    pub fn triples(&self) -> impl Iterator<Item = &RdfTriple> {
        self.triples.iter()
    }

    /// Objects of all triples with the given subject URI and predicate.
    pub fn objects<'a>(
        &'a self,
        subject: &'a str,
        predicate: &'a str,
    ) -> impl Iterator<Item = &'a RdfNode> + 'a {
        self.triples
            .iter()
            .filter(move |t| {
                t.predicate == predicate && matches!(&t.subject, RdfNode::Uri(uri) if uri == subject)
            })
            .map(|t| &t.object)
    }

    /// Serializes the graph to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if the format is not an RDF format or serialization
    /// fails.
    pub fn serialize(&self, format: OutputFormat) -> Result<String> {
        let mut output = Vec::new();
        self.serialize_to_writer(&mut output, format)?;
        String::from_utf8(output).map_err(|e| MarcError::ParseError(e.to_string()))
    }

    /// Serializes the graph to a writer in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if the format is not an RDF format, a node is not a
    /// valid IRI, or writing fails.
    pub fn serialize_to_writer<W: Write>(&self, writer: W, format: OutputFormat) -> Result<()> {
        let mut serializer = RdfSerializer::from_format(to_oxrdf_format(format)?);
        for (name, iri) in namespaces::PREFIXES {
            serializer = serializer
                .with_prefix(*name, *iri)
                .map_err(|e| MarcError::ParseError(format!("Invalid prefix IRI: {e}")))?;
        }
        let mut serializer = serializer.for_writer(writer);

        for triple in &self.triples {
            let ox_triple = to_oxrdf_triple(triple)?;
            serializer
                .serialize_triple(&ox_triple)
                .map_err(|e| MarcError::IoError(std::io::Error::other(e.to_string())))?;
        }

        serializer
            .finish()
            .map_err(|e| MarcError::IoError(std::io::Error::other(e.to_string())))?;

        Ok(())
    }

    /// Parses an RDF graph from a reader in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails.
    pub fn parse_from_reader<R: Read>(reader: R, format: OutputFormat) -> Result<Self> {
        let parser = RdfParser::from_format(to_oxrdf_format(format)?).for_reader(reader);

        let mut graph = Self::new();
        for result in parser {
            let quad = result.map_err(|e| MarcError::ParseError(e.to_string()))?;
            graph.add_triple(from_oxrdf_quad(&quad)?);
        }

        Ok(graph)
    }

    /// Parses an RDF graph from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails.
    pub fn parse(input: &str, format: OutputFormat) -> Result<Self> {
        Self::parse_from_reader(input.as_bytes(), format)
    }
}

fn to_oxrdf_format(format: OutputFormat) -> Result<OxRdfFormat> {
    Ok(match format {
        OutputFormat::Turtle => OxRdfFormat::Turtle,
        OutputFormat::NTriples => OxRdfFormat::NTriples,
        OutputFormat::RdfXml => OxRdfFormat::RdfXml,
        OutputFormat::JsonLd => OxRdfFormat::JsonLd {
            profile: JsonLdProfileSet::default(),
        },
        OutputFormat::Ndjson => {
            return Err(MarcError::Config(format!("{format} is not an RDF format")));
        },
    })
}

fn to_oxrdf_subject(node: &RdfNode) -> Result<NamedOrBlankNode> {
    match node {
        RdfNode::Uri(uri) => Ok(NamedOrBlankNode::NamedNode(
            NamedNode::new(uri).map_err(|e| MarcError::ParseError(format!("Invalid URI <{uri}>: {e}")))?,
        )),
        RdfNode::BlankNode(id) => Ok(NamedOrBlankNode::BlankNode(
            BlankNode::new(id)
                .map_err(|e| MarcError::ParseError(format!("Invalid blank node ID: {e}")))?,
        )),
        RdfNode::Literal { .. } => Err(MarcError::ParseError(
            "Literals cannot be triple subjects".into(),
        )),
    }
}

fn to_oxrdf_triple(triple: &RdfTriple) -> Result<Triple> {
    let subject = to_oxrdf_subject(&triple.subject)?;

    let predicate = NamedNode::new(&triple.predicate)
        .map_err(|e| MarcError::ParseError(format!("Invalid predicate URI: {e}")))?;

    let object = match &triple.object {
        RdfNode::Literal {
            value,
            language,
            datatype,
        } => {
            let lit = if let Some(lang) = language {
                Literal::new_language_tagged_literal(value, lang)
                    .map_err(|e| MarcError::ParseError(format!("Invalid language tag: {e}")))?
            } else if let Some(dt) = datatype {
                let dt_node = NamedNode::new(dt)
                    .map_err(|e| MarcError::ParseError(format!("Invalid datatype URI: {e}")))?;
                Literal::new_typed_literal(value, dt_node)
            } else {
                Literal::new_simple_literal(value)
            };
            Term::Literal(lit)
        },
        node => match to_oxrdf_subject(node)? {
            NamedOrBlankNode::NamedNode(n) => Term::NamedNode(n),
            NamedOrBlankNode::BlankNode(b) => Term::BlankNode(b),
        },
    };

    Ok(Triple::new(subject, predicate, object))
}

fn from_oxrdf_quad(quad: &Quad) -> Result<RdfTriple> {
    let subject = match &quad.subject {
        NamedOrBlankNode::NamedNode(n) => RdfNode::Uri(n.as_str().to_string()),
        NamedOrBlankNode::BlankNode(b) => RdfNode::BlankNode(b.as_str().to_string()),
        #[allow(unreachable_patterns)]
        _ => {
            return Err(MarcError::ParseError("Unsupported subject type".into()));
        },
    };

    let predicate = quad.predicate.as_str().to_string();

    let object = match &quad.object {
        Term::NamedNode(n) => RdfNode::Uri(n.as_str().to_string()),
        Term::BlankNode(b) => RdfNode::BlankNode(b.as_str().to_string()),
        Term::Literal(lit) => RdfNode::Literal {
            value: lit.value().to_string(),
            language: lit.language().map(String::from),
            datatype: (!lit.is_plain()).then(|| lit.datatype().as_str().to_string()),
        },
        #[allow(unreachable_patterns)]
        _ => {
            return Err(MarcError::ParseError("Unsupported object type".into()));
        },
    };

    Ok(RdfTriple::new(subject, predicate, object))
}
