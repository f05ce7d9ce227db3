//! Registry of known concept schemes.
//!
//! The registry maps scheme codes to [`ConceptScheme`]s. It is built once
//! (from the bundled table, a user file, or both merged) and only read
//! afterwards, so it can be shared freely between threads.
//!
//! # Configuration format
//!
//! ```yaml
//! classification_schemes:
//!   ddc:
//!     base_uri: 'http://dewey.info/{collection}/{object}/e{edition}/'
//! subject_schemes:
//!   humord: 'http://data.ub.uio.no/humord/c{control_number[4:]}'
//! ```
//!
//! A bare string is shorthand for `base_uri`.

use crate::concept_scheme::{ConceptScheme, SchemeKind, SchemeOptions};
use crate::error::{MarcError, Result};
use crate::leader::RecordKind;
use crate::record::Record;
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

/// The vocabulary table shipped with the crate.
pub const BUNDLED_VOCABULARIES: &str = include_str!("vocabularies.yml");

/// Source marker meaning "no vocabulary specified" (008/11, 7XX ind2 4).
const NOT_SPECIFIED: &str = "n";

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SchemeEntry {
    BaseUri(String),
    Options(SchemeOptions),
}

impl From<SchemeEntry> for SchemeOptions {
    fn from(entry: SchemeEntry) -> Self {
        match entry {
            SchemeEntry::BaseUri(uri) => SchemeOptions::with_base_uri(uri),
            SchemeEntry::Options(options) => options,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct VocabularyFile {
    #[serde(default)]
    classification_schemes: IndexMap<String, SchemeEntry>,
    #[serde(default)]
    subject_schemes: IndexMap<String, SchemeEntry>,
}

/// Templates given on the command line for all records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultScheme {
    /// Template for all roles (`--uri`)
    pub generic: Option<String>,
    /// Concept template
    pub concept: Option<String>,
    /// Scheme template, or the code of a known scheme (`--scheme`)
    pub scheme: Option<String>,
    /// Whitespace replacement (`--whitespace`)
    pub whitespace: Option<String>,
}

impl DefaultScheme {
    /// Whether no template was given.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.generic.is_none() && self.concept.is_none() && self.scheme.is_none()
    }
}

/// Read-only registry of concept schemes.
#[derive(Debug, Clone, Default)]
pub struct Vocabularies {
    entries: IndexMap<String, ConceptScheme>,
    default_scheme: Option<ConceptScheme>,
}

impl Vocabularies {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The bundled vocabulary table.
    ///
    /// # Errors
    ///
    /// Returns an error only if the bundled table is broken.
    pub fn bundled() -> Result<Self> {
        Self::from_yaml_str(BUNDLED_VOCABULARIES)
    }

    /// Parse a vocabulary table.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::Config`] for malformed YAML and
    /// [`MarcError::Template`] for invalid templates.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let file: VocabularyFile = serde_yaml::from_str(yaml)
            .map_err(|e| MarcError::Config(format!("Invalid vocabulary table: {e}")))?;

        let mut entries = IndexMap::new();
        let groups = [
            (SchemeKind::Classification, file.classification_schemes),
            (SchemeKind::Subject, file.subject_schemes),
        ];
        for (kind, schemes) in groups {
            for (code, entry) in schemes {
                let scheme = ConceptScheme::new(Some(kind), Some(&code), entry.into())?;
                entries.insert(code, scheme);
            }
        }
        Ok(Vocabularies {
            entries,
            default_scheme: None,
        })
    }

    /// Load a vocabulary table from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            MarcError::Config(format!("Cannot read vocabulary table {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Overlay `other` on this registry; entries of `other` win.
    #[must_use]
    pub fn merge(mut self, other: Vocabularies) -> Self {
        self.entries.extend(other.entries);
        if other.default_scheme.is_some() {
            self.default_scheme = other.default_scheme;
        }
        self
    }

    /// Use one scheme for every record, overriding what records declare.
    ///
    /// If `scheme` names a known scheme code, that scheme is used as is.
    /// An empty [`DefaultScheme`] clears the override.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::Template`] for invalid templates.
    pub fn with_default_scheme(mut self, default: DefaultScheme) -> Result<Self> {
        if default.is_empty() {
            self.default_scheme = None;
            return Ok(self);
        }
        let known = default
            .scheme
            .as_deref()
            .and_then(|code| self.entries.get(code))
            .cloned();
        self.default_scheme = match known {
            Some(scheme) => Some(scheme),
            None => Some(ConceptScheme::new(
                None,
                None,
                SchemeOptions {
                    base_uri: default.generic,
                    concept: default.concept,
                    scheme: default.scheme,
                    table: None,
                    whitespace: default.whitespace,
                },
            )?),
        };
        Ok(self)
    }

    /// The scheme override, if any.
    #[must_use]
    pub fn default_scheme(&self) -> Option<&ConceptScheme> {
        self.default_scheme.as_ref()
    }

    /// Number of known schemes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no scheme is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the known schemes in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = &ConceptScheme> {
        self.entries.values()
    }

    /// Known schemes of one kind.
    pub fn of_kind(&self, kind: SchemeKind) -> impl Iterator<Item = &ConceptScheme> {
        self.iter().filter(move |scheme| scheme.kind() == Some(kind))
    }

    /// Look up a scheme, optionally for a specific edition.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::UnknownScheme`] if the code is unknown or is the
    /// "not specified" code `n`.
    ///
    /// # Examples
    ///
    /// ```
    /// use marc2skos::Vocabularies;
    ///
    /// let vocabularies = Vocabularies::bundled().unwrap();
    /// let ddc = vocabularies.get("ddc", Some("23no")).unwrap();
    /// assert_eq!(ddc.class_uri("152").unwrap(), "http://dewey.info/class/152/e23/");
    /// assert!(vocabularies.get("udc", None).is_err());
    /// ```
    pub fn get(&self, code: &str, edition: Option<&str>) -> Result<ConceptScheme> {
        if code == NOT_SPECIFIED {
            return Err(MarcError::unknown_scheme(None));
        }
        let scheme = self
            .entries
            .get(code)
            .ok_or_else(|| MarcError::unknown_scheme(Some(code)))?;
        Ok(match edition {
            Some(_) => scheme.with_edition(edition),
            None => scheme.clone(),
        })
    }

    /// The scheme a record belongs to.
    ///
    /// The default scheme wins when set (classification records still pass
    /// their 084 `$c` edition to it). Otherwise authority records name their
    /// vocabulary in 008/11 (`z`: see 040 `$f`) and classification records in
    /// 084 `$a` with the edition in `$c`.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::UnknownScheme`] (with the record's 001 attached)
    /// if no known scheme can be found.
    pub fn get_from_record(&self, record: &Record) -> Result<ConceptScheme> {
        self.scheme_for(record)
            .map_err(|e| e.with_control_number(record.control_number()))
    }

    fn scheme_for(&self, record: &Record) -> Result<ConceptScheme> {
        let kind = record.leader.kind();
        let edition = match kind {
            RecordKind::Classification => record.subfield_text("084", 'c'),
            _ => None,
        };

        if let Some(default) = &self.default_scheme {
            return Ok(match edition {
                Some(_) => default.with_edition(edition),
                None => default.clone(),
            });
        }

        match kind {
            RecordKind::Authority => {
                let code = record
                    .get_control_field("008")
                    .and_then(|value| value.chars().nth(11))
                    .and_then(|code| match code {
                        'z' => record.subfield_text("040", 'f').map(str::to_string),
                        code => Some(code.to_string()),
                    })
                    .filter(|code| !code.trim().is_empty());
                match code {
                    Some(code) => self.get(&code, None),
                    None => Err(MarcError::unknown_scheme(None)),
                }
            },
            RecordKind::Classification => match record.subfield_text("084", 'a') {
                Some(code) if !code.is_empty() => self.get(code, edition),
                _ => Err(MarcError::unknown_scheme(None)),
            },
            RecordKind::Other(_) => Err(MarcError::unknown_scheme(None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concept_scheme::{UriParams, UriRole};
    use crate::leader::Leader;
    use crate::record::Field;

    fn authority(field_008: &str) -> Record {
        Record::builder(Leader {
            record_type: 'z',
            ..Leader::default()
        })
        .control_field_str("001", "HUME00123")
        .control_field_str("008", field_008)
        .build()
    }

    #[test]
    fn test_bundled_table_loads() {
        let vocabularies = Vocabularies::bundled().unwrap();
        assert!(vocabularies.len() > 10);
        assert!(vocabularies
            .of_kind(SchemeKind::Classification)
            .any(|s| s.code() == Some("ddc")));
        assert!(vocabularies
            .of_kind(SchemeKind::Subject)
            .all(|s| s.code() != Some("ddc")));
    }

    #[test]
    fn test_unknown_and_unspecified_codes() {
        let vocabularies = Vocabularies::bundled().unwrap();
        let err = vocabularies.get("nope", None).unwrap_err();
        assert!(err.to_string().contains("\"nope\""));
        let err = vocabularies.get("n", None).unwrap_err();
        assert!(err.to_string().starts_with("Could not find"));
    }

    #[test]
    fn test_string_entry_is_base_uri() {
        let vocabularies =
            Vocabularies::from_yaml_str("subject_schemes:\n  x: 'http://x/{control_number}'\n")
                .unwrap();
        let scheme = vocabularies.get("x", None).unwrap();
        assert_eq!(scheme.uri(UriRole::Scheme, &UriParams::new()).unwrap(), "http://x/");
        assert_eq!(scheme.kind(), Some(SchemeKind::Subject));
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let err = Vocabularies::from_yaml_str("other_schemes: {}").unwrap_err();
        assert!(matches!(err, MarcError::Config(_)));
    }

    #[test]
    fn test_merge_overrides() {
        let user = Vocabularies::from_yaml_str(
            "classification_schemes:\n  ddc: 'http://example.org/ddc/{object}'\n",
        )
        .unwrap();
        let vocabularies = Vocabularies::bundled().unwrap().merge(user);
        let ddc = vocabularies.get("ddc", None).unwrap();
        assert_eq!(ddc.class_uri("152").unwrap(), "http://example.org/ddc/152");
        assert!(vocabularies.get("humord", None).is_ok());
    }

    #[test]
    fn test_authority_scheme_from_008_and_040() {
        let vocabularies = Vocabularies::bundled().unwrap();

        let record = authority("970829nnnnnannnn");
        assert_eq!(vocabularies.get_from_record(&record).unwrap().code(), Some("a"));

        let mut record = authority("970829nnnnnznnnn");
        record.add_field(
            Field::builder("040".into(), ' ', ' ')
                .subfield_str('f', "humord")
                .build(),
        );
        assert_eq!(
            vocabularies.get_from_record(&record).unwrap().code(),
            Some("humord")
        );

        let record = authority("970829nnnnnnnnnn");
        let err = vocabularies.get_from_record(&record).unwrap_err();
        assert!(err.is_unknown_scheme());
        assert_eq!(err.control_number(), Some("HUME00123"));
    }

    #[test]
    fn test_classification_scheme_from_084() {
        let vocabularies = Vocabularies::bundled().unwrap();
        let record = Record::builder(Leader::default())
            .field(
                Field::builder("084".into(), '0', ' ')
                    .subfield_str('a', "ddc")
                    .subfield_str('c', "23no")
                    .build(),
            )
            .build();
        let scheme = vocabularies.get_from_record(&record).unwrap();
        assert_eq!(scheme.edition(), Some("23no"));
    }

    #[test]
    fn test_default_scheme_wins_and_keeps_edition() {
        let vocabularies = Vocabularies::bundled()
            .unwrap()
            .with_default_scheme(DefaultScheme {
                generic: Some("http://test/{object}".into()),
                ..DefaultScheme::default()
            })
            .unwrap();
        let record = Record::builder(Leader::default())
            .field(
                Field::builder("084".into(), '0', ' ')
                    .subfield_str('a', "bkl")
                    .subfield_str('c', "23no")
                    .build(),
            )
            .build();
        let scheme = vocabularies.get_from_record(&record).unwrap();
        assert_eq!(scheme.code(), None);
        assert_eq!(scheme.edition(), Some("23no"));
        assert_eq!(scheme.class_uri("003.5").unwrap(), "http://test/003.5");
    }

    #[test]
    fn test_default_scheme_by_code() {
        let vocabularies = Vocabularies::bundled()
            .unwrap()
            .with_default_scheme(DefaultScheme {
                scheme: Some("ddc".into()),
                ..DefaultScheme::default()
            })
            .unwrap();
        assert_eq!(
            vocabularies.default_scheme().and_then(ConceptScheme::code),
            Some("ddc")
        );

        let cleared = vocabularies.with_default_scheme(DefaultScheme::default()).unwrap();
        assert!(cleared.default_scheme().is_none());
    }
}
