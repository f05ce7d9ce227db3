//! Namespaces used in SKOS output.

/// SKOS core.
pub const SKOS: &str = "http://www.w3.org/2004/02/skos/core#";

/// DCMI metadata terms.
pub const DCTERMS: &str = "http://purl.org/dc/terms/";

/// OWL.
pub const OWL: &str = "http://www.w3.org/2002/07/owl#";

/// RDF namespace.
pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

/// XML Schema datatypes.
pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";

/// MADS/RDF (Metadata Authority Description Schema).
pub const MADS: &str = "http://www.loc.gov/mads/rdf/v1#";

/// WebDewey terms for the extra 680 captions.
pub const WD: &str = "http://data.ub.uio.no/webdewey-terms#";

/// Prefixes bound in Turtle and RDF/XML output.
pub const PREFIXES: &[(&str, &str)] = &[
    ("rdf", RDF),
    ("skos", SKOS),
    ("dcterms", DCTERMS),
    ("owl", OWL),
    ("xsd", XSD),
    ("mads", MADS),
    ("wd", WD),
];

/// `rdf:type`
#[must_use]
pub fn rdf_type() -> String {
    format!("{RDF}type")
}

/// A term in the SKOS namespace.
#[must_use]
pub fn skos(local_name: &str) -> String {
    format!("{SKOS}{local_name}")
}

/// A term in the DCMI terms namespace.
#[must_use]
pub fn dcterms(local_name: &str) -> String {
    format!("{DCTERMS}{local_name}")
}
