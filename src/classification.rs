//! Assembly of MARC21 Classification records (leader/06 = `w`).
//!
//! Ties together the 008 decoder, the 153 notation builder and the 765
//! component resolver, and resolves the resulting notations to URIs in the
//! record's classification scheme.
//!
//! # Examples
//!
//! ```
//! use marc2skos::classification::ClassificationRecord;
//! use marc2skos::{marcxml, Vocabularies};
//!
//! let record = marcxml::marcxml_to_record(r#"
//!   <record xmlns="http://www.loc.gov/MARC21/slim">
//!     <leader>00000nw  a2200000n  4500</leader>
//!     <controlfield tag="008">091203aaaaaaaa</controlfield>
//!     <datafield tag="084" ind1="0" ind2=" ">
//!       <subfield code="a">ddc</subfield>
//!       <subfield code="c">23no</subfield>
//!     </datafield>
//!     <datafield tag="153" ind1=" " ind2=" ">
//!       <subfield code="a">152</subfield>
//!       <subfield code="e">152</subfield>
//!       <subfield code="f">158</subfield>
//!       <subfield code="j">Sansing, bevegelse, emosjoner, fysiologiske drifter</subfield>
//!     </datafield>
//!   </record>"#).unwrap();
//!
//! let vocabularies = Vocabularies::bundled().unwrap();
//! let parsed = ClassificationRecord::parse(&record, &vocabularies).unwrap();
//! assert_eq!(parsed.concept.uri, "http://dewey.info/class/152/e23/");
//! assert_eq!(parsed.concept.relations[0].uri, "http://dewey.info/class/152-158/e23/");
//! assert!(parsed.is_public(false));
//! ```

use crate::concept::{add_mappings, index_terms, Component, Concept, Relation};
use crate::concept_scheme::{ConceptScheme, UriParams, UriRole};
use crate::error::{MarcError, Result};
use crate::fixed_field::{decode_008, FixedFields, RecordType};
use crate::notation::{parse_153, NotationParts};
use crate::record::Record;
use crate::synthesis::resolve_components;
use crate::text::{capitalize, stringify, DEFAULT_NOTE_CODES};
use crate::vocabularies::Vocabularies;
use tracing::{debug, warn};

/// Tags whose notes become `skos:editorialNote`: complex see reference
/// (253), complex see-also reference (353), application instruction (683),
/// auxiliary instruction (684, and its non-standard variant 694).
const EDITORIAL_NOTE_TAGS: &[&str] = &["253", "353", "683", "684", "694"];

/// A decoded classification record.
#[derive(Debug, Clone)]
pub struct ClassificationRecord {
    /// The assembled concept
    pub concept: Concept,
    /// Decoded 008 field
    pub fixed_fields: FixedFields,
}

impl ClassificationRecord {
    /// Decode a classification record.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::UnknownScheme`] if no URI pattern is known for
    /// the record's scheme, and [`MarcError::InvalidRecord`] if the record
    /// has no usable 153 field or its concept URI cannot be built.
    pub fn parse(record: &Record, vocabularies: &Vocabularies) -> Result<Self> {
        let scheme = vocabularies.get_from_record(record)?;
        let mut concept = Concept::from_record_header(record);
        let cn = concept.control_number.clone();
        let fixed_fields = decode_008(record.get_control_field("008"));

        let fields_153 = record.get_fields("153").unwrap_or_default();
        let Some(field_153) = fields_153.first() else {
            return Err(MarcError::InvalidRecord {
                message: "153 field is missing".to_string(),
                control_number: cn,
            });
        };
        if fields_153.len() > 1 {
            warn!(
                "Record {}: Found {} 153 fields, using the first one",
                cn.as_deref().unwrap_or_default(),
                fields_153.len()
            );
        }
        let decoded = parse_153(field_153);
        let Some(notation) = decoded.notation.clone() else {
            return Err(MarcError::InvalidRecord {
                message: "153 field has no classification number".to_string(),
                control_number: cn,
            });
        };

        let record_type = fixed_fields.record_type.unwrap_or_else(|| {
            warn!("Record does not have a 008 field, will try to guess type.");
            if decoded.table.is_some() {
                RecordType::Table
            } else {
                RecordType::Schedule
            }
        });

        concept.scheme_uris = scheme_uris(&scheme, record_type, decoded.table.as_deref());
        concept.uri = scheme
            .uri(
                UriRole::Concept,
                &UriParams::new()
                    .with_collection("class")
                    .with_object(notation.as_str())
                    .with_control_number(cn.as_deref()),
            )
            .map_err(|e| match e {
                MarcError::Template(message) => MarcError::InvalidRecord {
                    message,
                    control_number: cn.clone(),
                },
                other => other.with_control_number(cn.as_deref()),
            })?;

        if let Some(parent) = decoded.parent_notation.as_deref() {
            concept.relate_in_scheme(
                &scheme,
                &UriParams::new().with_collection("class").with_object(parent),
                Relation::Broader,
                "153",
            );
        }

        concept.components = resolve_components(record.get_fields("765").unwrap_or_default(), &notation)
            .into_iter()
            .map(|component| {
                let uri = scheme
                    .class_uri(&component)
                    .map_err(|e| debug!("No URI for component {component} of {notation}: {e}"))
                    .ok();
                Component {
                    notation: component,
                    uri,
                }
            })
            .collect();

        concept.notation = Some(notation);
        concept.table = decoded.table;
        concept.record_type = Some(record_type);
        concept.pref_label = decoded.caption;
        concept.is_top_concept = decoded.is_top_concept;
        concept.created = fixed_fields.created;
        concept.deprecated = fixed_fields.deprecated;

        add_notes(&mut concept, record);

        concept.alt_labels = index_terms(record, '7')
            .into_iter()
            .map(|term| term.label)
            .collect();
        add_mappings(&mut concept, record, vocabularies);

        Ok(ClassificationRecord {
            concept,
            fixed_fields,
        })
    }

    /// Whether the record should be published.
    ///
    /// Only displayable schedule and table records are published, and add
    /// table numbers only on request.
    #[must_use]
    pub fn is_public(&self, include_add_table_numbers: bool) -> bool {
        let notation = self.concept.notation.as_deref().unwrap_or_default();
        if !self.fixed_fields.display {
            debug!("{notation} is not intended for display");
            return false;
        }
        match self.concept.record_type {
            Some(record_type) if record_type.is_publishable() => {},
            Some(record_type) => {
                debug!("{notation} is a type {record_type}");
                return false;
            },
            None => return false,
        }
        if NotationParts::parse(notation).is_add_table_number() && !include_add_table_numbers {
            debug!("{notation} is an add table number");
            return false;
        }
        true
    }
}

/// Table and scheme URIs of a concept. Roles the scheme cannot resolve are
/// left out.
fn scheme_uris(scheme: &ConceptScheme, record_type: RecordType, table: Option<&str>) -> Vec<String> {
    let mut requests = Vec::with_capacity(2);
    if record_type == RecordType::Table {
        requests.push((
            UriRole::Table,
            UriParams::new()
                .with_collection("table")
                .with_object(table.unwrap_or_default()),
        ));
    }
    let object = if scheme.edition().is_some() { "edition" } else { "" };
    requests.push((
        UriRole::Scheme,
        UriParams::new().with_collection("scheme").with_object(object),
    ));

    requests
        .into_iter()
        .filter_map(|(role, params)| match scheme.uri(role, &params) {
            Ok(uri) if !uri.is_empty() => Some(uri),
            Ok(_) => None,
            Err(e) => {
                debug!("No {role} URI in {scheme}: {e}");
                None
            },
        })
        .collect()
}

fn add_notes(concept: &mut Concept, record: &Record) {
    for field in record.fields() {
        let tag = field.tag.as_str();
        if EDITORIAL_NOTE_TAGS.contains(&tag) {
            concept
                .notes
                .editorial_note
                .push(stringify(field, DEFAULT_NOTE_CODES));
        } else if tag == "685" {
            concept
                .notes
                .history_note
                .push(stringify(field, DEFAULT_NOTE_CODES));
        } else if tag == "680" {
            let ess = field.ess_codes();
            if ess.contains(&"ndf") {
                concept.notes.definition.push(stringify(field, DEFAULT_NOTE_CODES));
                continue;
            }
            concept.notes.scope_note.push(stringify(field, DEFAULT_NOTE_CODES));

            let key = [
                ("nvn", "variantName"),
                ("nch", "classHere"),
                ("nin", "including"),
                ("nph", "formerName"),
            ]
            .into_iter()
            .find_map(|(code, key)| ess.contains(&code).then_some(key));
            if let Some(key) = key {
                concept
                    .web_dewey_extras
                    .entry(key.to_string())
                    .or_default()
                    .extend(field.subfields_by_code('t').map(capitalize));
            }
        }
    }
}
