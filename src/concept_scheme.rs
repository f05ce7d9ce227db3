//! Concept schemes and URI resolution.
//!
//! A [`ConceptScheme`] holds one [`UriTemplate`] per [`UriRole`] and turns
//! record attributes into URIs:
//!
//! - `edition` is always available, reduced to its digits (`23no` -> `23`)
//! - scheme URIs never carry a control number (it is rendered empty)
//! - a parenthesized organization prefix is removed from control numbers
//!   (`(OCoLC)fst00012345` -> `fst00012345`)
//! - spaces in the notation (`object`) become hyphens
//! - any whitespace left in the URI is replaced with the scheme's
//!   whitespace character (default `-`)
//!
//! Resolution is pure: the same inputs always give the same URI.

use crate::error::{MarcError, Result};
use crate::uri_template::UriTemplate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

lazy_static! {
    static ref RE_ORG_PREFIX: Regex = Regex::new(r"^\(.+\)(.+)$").unwrap();
}

/// Default replacement for whitespace in URIs.
pub const DEFAULT_WHITESPACE: &str = "-";

/// Kind of vocabulary a scheme code names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemeKind {
    /// Classification scheme (MARC21 Classification records)
    Classification,
    /// Subject heading vocabulary (MARC21 Authority records)
    Subject,
}

/// The kind of URI being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UriRole {
    /// URI of a single concept
    Concept,
    /// URI of the concept scheme itself
    Scheme,
    /// URI of a table within a classification scheme
    Table,
}

impl fmt::Display for UriRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UriRole::Concept => "concept",
            UriRole::Scheme => "scheme",
            UriRole::Table => "table",
        })
    }
}

/// URI templates and settings of one scheme, as written in the vocabulary
/// configuration.
///
/// `base_uri` supplies every role that is not given explicitly. Without
/// either, the role is unavailable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemeOptions {
    /// Template used for all roles unless overridden
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_uri: Option<String>,
    /// Concept URI template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concept: Option<String>,
    /// Scheme URI template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    /// Table URI template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    /// Replacement for whitespace in URIs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whitespace: Option<String>,
}

impl SchemeOptions {
    /// Options with a single template for every role.
    #[must_use]
    pub fn with_base_uri(base_uri: impl Into<String>) -> Self {
        SchemeOptions {
            base_uri: Some(base_uri.into()),
            ..SchemeOptions::default()
        }
    }

    fn template_for(&self, role: UriRole) -> Option<&str> {
        let explicit = match role {
            UriRole::Concept => self.concept.as_deref(),
            UriRole::Scheme => self.scheme.as_deref(),
            UriRole::Table => self.table.as_deref(),
        };
        explicit.or(self.base_uri.as_deref())
    }
}

/// Record attributes available to URI templates.
///
/// `edition` is supplied by the scheme and does not need to be set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UriParams {
    /// `collection` (`class`, `table`, `scheme`)
    pub collection: Option<String>,
    /// `object`: notation, table number or `edition`
    pub object: Option<String>,
    /// `control_number`: record identifier
    pub control_number: Option<String>,
}

impl UriParams {
    /// Empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `collection`.
    #[must_use]
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }

    /// Set `object`.
    #[must_use]
    pub fn with_object(mut self, object: impl Into<String>) -> Self {
        self.object = Some(object.into());
        self
    }

    /// Set `control_number` (ignored when `None`).
    #[must_use]
    pub fn with_control_number(mut self, control_number: Option<&str>) -> Self {
        self.control_number = control_number.map(str::to_string);
        self
    }
}

/// A classification scheme or subject vocabulary able to mint URIs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptScheme {
    code: Option<String>,
    kind: Option<SchemeKind>,
    edition: Option<String>,
    options: SchemeOptions,
    templates: HashMap<UriRole, UriTemplate>,
    whitespace: String,
}

impl ConceptScheme {
    /// Build a scheme from its configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::Template`] if one of the templates is invalid.
    pub fn new(
        kind: Option<SchemeKind>,
        code: Option<&str>,
        options: SchemeOptions,
    ) -> Result<Self> {
        let mut templates = HashMap::new();
        for role in [UriRole::Concept, UriRole::Scheme, UriRole::Table] {
            if let Some(template) = options.template_for(role) {
                templates.insert(role, UriTemplate::parse(template)?);
            }
        }
        let whitespace = options
            .whitespace
            .clone()
            .filter(|ws| !ws.is_empty())
            .unwrap_or_else(|| DEFAULT_WHITESPACE.to_string());

        Ok(ConceptScheme {
            code: code.map(str::to_string),
            kind,
            edition: None,
            options,
            templates,
            whitespace,
        })
    }

    /// A copy of this scheme for a specific edition.
    #[must_use]
    pub fn with_edition(&self, edition: Option<&str>) -> Self {
        ConceptScheme {
            edition: edition.map(str::to_string),
            ..self.clone()
        }
    }

    /// Scheme code (`ddc`, `humord`, ...), `None` for a scheme given by
    /// templates only.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Kind of vocabulary.
    #[must_use]
    pub fn kind(&self) -> Option<SchemeKind> {
        self.kind
    }

    /// Raw edition string (`23no`).
    #[must_use]
    pub fn edition(&self) -> Option<&str> {
        self.edition.as_deref()
    }

    /// Edition reduced to its digits (`23no` -> `23`), empty if unknown.
    #[must_use]
    pub fn edition_numeric(&self) -> String {
        self.edition
            .as_deref()
            .unwrap_or_default()
            .chars()
            .filter(char::is_ascii_digit)
            .collect()
    }

    /// Configuration the scheme was built from.
    #[must_use]
    pub fn options(&self) -> &SchemeOptions {
        &self.options
    }

    /// Whether a template exists for `role`.
    #[must_use]
    pub fn has_role(&self, role: UriRole) -> bool {
        self.templates.contains_key(&role)
    }

    /// Resolve a URI.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::UnknownScheme`] if the scheme has no template for
    /// `role`, and [`MarcError::Template`] if the template refers to a
    /// parameter that is not available.
    ///
    /// # Examples
    ///
    /// ```
    /// use marc2skos::concept_scheme::{ConceptScheme, SchemeKind, SchemeOptions, UriParams, UriRole};
    ///
    /// let ddc = ConceptScheme::new(
    ///     Some(SchemeKind::Classification),
    ///     Some("ddc"),
    ///     SchemeOptions::with_base_uri("http://dewey.info/{collection}/{object}/e{edition}/"),
    /// )
    /// .unwrap()
    /// .with_edition(Some("23no"));
    ///
    /// let params = UriParams::new().with_collection("class").with_object("152");
    /// assert_eq!(
    ///     ddc.uri(UriRole::Concept, &params).unwrap(),
    ///     "http://dewey.info/class/152/e23/"
    /// );
    /// ```
    pub fn uri(&self, role: UriRole, params: &UriParams) -> Result<String> {
        let template = self
            .templates
            .get(&role)
            .ok_or_else(|| MarcError::unknown_scheme(self.code.as_deref()))?;

        let edition = self.edition_numeric();
        let control_number = match role {
            UriRole::Scheme => Some(String::new()),
            _ => params
                .control_number
                .as_deref()
                .map(strip_organization_prefix),
        };
        let object = params.object.as_deref().map(|o| o.replace(' ', "-"));

        let mut values: HashMap<&str, &str> = HashMap::new();
        values.insert("edition", &edition);
        if let Some(collection) = params.collection.as_deref() {
            values.insert("collection", collection);
        }
        if let Some(object) = object.as_deref() {
            values.insert("object", object);
        }
        if let Some(control_number) = control_number.as_deref() {
            values.insert("control_number", control_number);
        }

        let uri = template.render(&values)?;
        Ok(uri
            .split(char::is_whitespace)
            .collect::<Vec<_>>()
            .join(&self.whitespace))
    }

    /// Resolve a concept URI for a notation in the `class` collection.
    ///
    /// # Errors
    ///
    /// See [`ConceptScheme::uri`].
    pub fn class_uri(&self, notation: &str) -> Result<String> {
        self.uri(
            UriRole::Concept,
            &UriParams::new()
                .with_collection("class")
                .with_object(notation),
        )
    }
}

impl fmt::Display for ConceptScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = self.code.as_deref().unwrap_or("(custom)");
        match &self.edition {
            Some(edition) => write!(f, "{code} ({edition} ed.)"),
            None => f.write_str(code),
        }
    }
}

/// Remove a leading `(ORG)` prefix from a control number.
#[must_use]
pub fn strip_organization_prefix(control_number: &str) -> String {
    RE_ORG_PREFIX.replace(control_number, "$1").to_string()
}
