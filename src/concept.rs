//! The SKOS concept built from a single record.
//!
//! [`Concept`] is the output of record assembly: everything the RDF layer
//! needs, already resolved to URIs and plain strings. This module also holds
//! the parsing shared by classification and authority records: control
//! numbers and dates, the cataloguing language, index terms (X00-X62) and
//! mappings to other vocabularies (024, 7XX).

use crate::concept_scheme::{ConceptScheme, UriParams, UriRole};
use crate::error::Result;
use crate::fixed_field::RecordType;
use crate::language::{to_language_tag, DEFAULT_LANGUAGE};
use crate::record::{Field, Record};
use crate::text::heading_label;
use crate::vocabularies::Vocabularies;
use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use tracing::warn;

/// Heading tag suffixes: personal name, corporate name, meeting name,
/// uniform title, named event, chronological term, topical term, geographic
/// name, uncontrolled term, genre/form term, medium of performance.
const HEADING_TAG_SUFFIXES: &[&str] = &[
    "00", "10", "11", "30", "47", "48", "50", "51", "53", "55", "62",
];

/// Whether `value` is an absolute http(s) URI.
#[must_use]
pub fn is_uri(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// A semantic relation from one concept to another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Relation {
    /// `skos:broader`
    Broader,
    /// `skos:narrower`
    Narrower,
    /// `skos:related`
    Related,
    /// `skos:exactMatch`
    ExactMatch,
    /// `skos:closeMatch`
    CloseMatch,
    /// `skos:broadMatch`
    BroadMatch,
    /// `skos:narrowMatch`
    NarrowMatch,
    /// `skos:relatedMatch`
    RelatedMatch,
    /// Any other property, given by its URI
    Custom(String),
}

impl Relation {
    /// Relation named by a 7XX `$4` value: a property URI or one of the
    /// codes `=EQ`, `~EQ`, `BM`, `NM`, `RM`.
    #[must_use]
    pub fn from_relationship_code(code: &str) -> Option<Self> {
        if is_uri(code) {
            return Some(Relation::Custom(code.to_string()));
        }
        match code {
            "=EQ" => Some(Relation::ExactMatch),
            "~EQ" => Some(Relation::CloseMatch),
            "BM" => Some(Relation::BroadMatch),
            "NM" => Some(Relation::NarrowMatch),
            "RM" => Some(Relation::RelatedMatch),
            _ => None,
        }
    }

    /// Local name in the SKOS namespace, `None` for custom properties.
    #[must_use]
    pub fn skos_name(&self) -> Option<&'static str> {
        Some(match self {
            Relation::Broader => "broader",
            Relation::Narrower => "narrower",
            Relation::Related => "related",
            Relation::ExactMatch => "exactMatch",
            Relation::CloseMatch => "closeMatch",
            Relation::BroadMatch => "broadMatch",
            Relation::NarrowMatch => "narrowMatch",
            Relation::RelatedMatch => "relatedMatch",
            Relation::Custom(_) => return None,
        })
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.skos_name(), self) {
            (Some(name), _) => write!(f, "skos:{name}"),
            (None, Relation::Custom(uri)) => write!(f, "<{uri}>"),
            (None, _) => Ok(()),
        }
    }
}

/// A relation with its resolved target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConceptRelation {
    /// Target concept URI
    pub uri: String,
    /// Kind of relation
    pub relation: Relation,
}

/// Notes of a concept, grouped by SKOS note property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notes {
    /// `skos:definition`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub definition: Vec<String>,
    /// `skos:note`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub note: Vec<String>,
    /// `skos:editorialNote`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub editorial_note: Vec<String>,
    /// `skos:scopeNote`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scope_note: Vec<String>,
    /// `skos:historyNote`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub history_note: Vec<String>,
    /// `skos:changeNote`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub change_note: Vec<String>,
    /// `skos:example`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub example: Vec<String>,
}

impl Notes {
    /// Whether there are no notes at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().all(|(_, notes)| notes.is_empty())
    }

    /// Notes paired with the local name of their SKOS property.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &[String])> {
        [
            ("definition", self.definition.as_slice()),
            ("note", self.note.as_slice()),
            ("editorialNote", self.editorial_note.as_slice()),
            ("scopeNote", self.scope_note.as_slice()),
            ("historyNote", self.history_note.as_slice()),
            ("changeNote", self.change_note.as_slice()),
            ("example", self.example.as_slice()),
        ]
        .into_iter()
    }
}

/// A synthesized number component (765).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Component {
    /// Component notation, e.g. `5--931`
    pub notation: String,
    /// Concept URI of the component, when it could be resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

/// A SKOS concept assembled from one classification or authority record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Concept {
    /// Concept URI
    pub uri: String,
    /// Schemes (and tables) the concept belongs to
    pub scheme_uris: Vec<String>,
    /// Classification number (classification records only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notation: Option<String>,
    /// Table number (153 `$z`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    /// Record type from 008/06 (classification records only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_type: Option<RecordType>,
    /// Caption or authorized heading
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pref_label: Option<String>,
    /// Index terms or see-from tracings
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alt_labels: Vec<String>,
    /// Notes by kind
    #[serde(skip_serializing_if = "Notes::is_empty")]
    pub notes: Notes,
    /// Hierarchical, associative and mapping relations
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub relations: Vec<ConceptRelation>,
    /// Synthesized number components, in order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Component>,
    /// WebDewey topic lists (`classHere`, `including`, ...)
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub web_dewey_extras: IndexMap<String, Vec<String>>,
    /// The concept is deprecated
    pub deprecated: bool,
    /// The concept has no broader concept
    pub is_top_concept: bool,
    /// Date entered on file (008/00-05)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<NaiveDate>,
    /// Date of latest transaction (005)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<NaiveDateTime>,
    /// Language tag of labels and notes
    pub lang: String,
    /// Control number (001, 010 or 016)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_number: Option<String>,
    /// Control number identifier (003)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_number_identifier: Option<String>,
}

impl Concept {
    /// A concept with the fields every record kind shares.
    ///
    /// The control number is taken from 001, overridden by 010 `$a`, in turn
    /// overridden by 016 `$a`.
    #[must_use]
    pub fn from_record_header(record: &Record) -> Self {
        let control_number = record
            .subfield_text("016", 'a')
            .or_else(|| record.subfield_text("010", 'a'))
            .or_else(|| record.control_number())
            .map(str::to_string);

        let modified = record.get_control_field("005").and_then(|value| {
            let parsed = NaiveDateTime::parse_from_str(value.trim(), "%Y%m%d%H%M%S%.f");
            if parsed.is_err() {
                warn!(
                    "Record {}: Ignoring invalid date in 005 field: {value}",
                    control_number.as_deref().unwrap_or_default()
                );
            }
            parsed.ok()
        });

        let lang = to_language_tag(
            record
                .subfield_text("040", 'b')
                .filter(|code| !code.trim().is_empty())
                .unwrap_or(DEFAULT_LANGUAGE),
        );

        Concept {
            control_number,
            control_number_identifier: record.get_control_field("003").map(str::to_string),
            modified,
            lang,
            ..Concept::default()
        }
    }

    /// The `skos:notation` literal: table numbers are prefixed with `T`.
    ///
    /// ```
    /// use marc2skos::concept::Concept;
    /// use marc2skos::fixed_field::RecordType;
    ///
    /// let concept = Concept {
    ///     notation: Some("3B--81-89:02".to_string()),
    ///     record_type: Some(RecordType::Table),
    ///     ..Concept::default()
    /// };
    /// assert_eq!(concept.display_notation().as_deref(), Some("T3B--81-89:02"));
    /// ```
    #[must_use]
    pub fn display_notation(&self) -> Option<String> {
        let notation = self.notation.as_deref().filter(|n| !n.is_empty())?;
        Some(match self.record_type {
            Some(RecordType::Table) => format!("T{notation}"),
            _ => notation.to_string(),
        })
    }

    /// Add a relation.
    pub fn relate(&mut self, relation: Relation, uri: impl Into<String>) {
        self.relations.push(ConceptRelation {
            uri: uri.into(),
            relation,
        });
    }

    /// Resolve a concept URI in another vocabulary and add a relation to it.
    ///
    /// Links into vocabularies without a known URI pattern are reported once
    /// and dropped.
    pub fn relate_external(
        &mut self,
        vocabularies: &Vocabularies,
        link: &ExternalLink<'_>,
        relation: Relation,
    ) {
        let code = link.scheme_code.unwrap_or_default();
        let resolved = vocabularies
            .get(code, link.edition)
            .and_then(|scheme| scheme.uri(UriRole::Concept, &link.params));
        self.relate_resolved(resolved, relation, code, link.tag);
    }

    /// Resolve a concept URI in `scheme` and add a relation to it.
    pub fn relate_in_scheme(
        &mut self,
        scheme: &ConceptScheme,
        params: &UriParams,
        relation: Relation,
        tag: &str,
    ) {
        let resolved = scheme.uri(UriRole::Concept, params);
        self.relate_resolved(resolved, relation, scheme.code().unwrap_or_default(), tag);
    }

    fn relate_resolved(&mut self, resolved: Result<String>, relation: Relation, code: &str, tag: &str) {
        match resolved {
            Ok(uri) if !uri.is_empty() => self.relate(relation, uri),
            Ok(_) => {},
            Err(e) if e.is_unknown_scheme() => warn!(
                "Found links to \"{code}\" in field {tag}, but marc2skos doesn't know the URI \
                 pattern of that vocabulary, so no SKOS mappings were generated."
            ),
            Err(e) => warn!(
                "Record {}: Skipping link in field {tag}: {e}",
                self.control_number.as_deref().unwrap_or_default()
            ),
        }
    }
}

/// A link to a concept in another vocabulary, before URI resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalLink<'a> {
    /// Code of the target vocabulary, `None` if the record does not say
    pub scheme_code: Option<&'a str>,
    /// Edition of the target vocabulary
    pub edition: Option<&'a str>,
    /// Template parameters identifying the target concept
    pub params: UriParams,
    /// Tag of the field the link came from
    pub tag: &'a str,
}

/// A heading from one of the X00-X62 fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexTerm<'a> {
    /// Label built from `$a $d $x $y $z $v`
    pub label: String,
    /// The field the term came from
    pub field: &'a Field,
    /// `$0` with any `(ORG)` prefix removed
    pub control_number: Option<String>,
    /// The `ORG` part of a `(ORG)` prefix in `$0`
    pub control_number_identifier: Option<String>,
}

/// Index terms from the heading fields starting with `prefix` (`1`, `4`,
/// `5` or `7`).
///
/// Terms marked as captions (`$9 ess=isCaption`) come first, the rest keep
/// record order.
#[must_use]
pub fn index_terms(record: &Record, prefix: char) -> Vec<IndexTerm<'_>> {
    let (captions, others): (Vec<_>, Vec<_>) = record
        .fields()
        .filter(|field| {
            let mut tag = field.tag.chars();
            tag.next() == Some(prefix) && HEADING_TAG_SUFFIXES.contains(&tag.as_str())
        })
        .map(|field| {
            let (control_number, control_number_identifier) =
                match field.get_subfield('0').map(|v| v.split_once(')')) {
                    Some(Some((org, number))) => (
                        Some(number.to_string()),
                        Some(org.trim_start_matches('(').to_string()),
                    ),
                    Some(None) => (field.get_subfield('0').map(str::to_string), None),
                    None => (None, None),
                };
            IndexTerm {
                label: heading_label(field),
                field,
                control_number,
                control_number_identifier,
            }
        })
        .partition(|term| term.field.ess_codes().contains(&"isCaption"));

    captions.into_iter().chain(others).collect()
}

/// Scheme code implied by the second indicator of a 7XX heading linking
/// entry.
fn linking_entry_scheme(field: &Field) -> Option<&str> {
    match field.indicator2 {
        '0' => Some("a"), // Library of Congress Subject Headings
        '1' => Some("b"), // LC subject headings for children's literature
        '2' => Some("c"), // Medical Subject Headings
        '3' => Some("d"), // National Agricultural Library subject authority file
        '4' => Some("n"), // Source not specified
        '5' => Some("k"), // Canadian Subject Headings
        '6' => Some("v"), // Répertoire de vedettes-matière
        '7' => field.get_subfield('2'),
        _ => None,
    }
}

/// Add mappings from 024 (other standard identifiers) and 7XX (heading
/// linking entries).
pub fn add_mappings(concept: &mut Concept, record: &Record, vocabularies: &Vocabularies) {
    for field in record.fields_by_tag("024") {
        let scheme_code = field.get_subfield('2');
        if scheme_code == Some("uri") {
            continue;
        }
        let Some(number) = field.get_subfield('a') else {
            continue;
        };
        let link = ExternalLink {
            scheme_code,
            edition: None,
            params: UriParams::new().with_control_number(Some(number)),
            tag: "024",
        };
        concept.relate_external(vocabularies, &link, Relation::ExactMatch);
    }

    for term in index_terms(record, '7') {
        let mut relation: Option<Relation> = None;
        for sf in term.field.subfields() {
            match sf.code {
                '4' => relation = Relation::from_relationship_code(&sf.value),
                '0' | '1' => {
                    let rel = relation.get_or_insert(Relation::CloseMatch).clone();
                    if is_uri(&sf.value) {
                        concept.relate(rel, sf.value.clone());
                    } else {
                        let link = ExternalLink {
                            scheme_code: linking_entry_scheme(term.field),
                            edition: None,
                            params: UriParams::new().with_control_number(Some(&sf.value)),
                            tag: &term.field.tag,
                        };
                        concept.relate_external(vocabularies, &link, rel);
                    }
                },
                _ => {},
            }
        }
    }
}
