//! MARC record structures.
//!
//! This module provides the read-only view of a single record that the
//! decoders work on:
//! - [`Record`]: leader, control fields and data fields
//! - [`Field`]: variable data fields (010+)
//! - [`Subfield`]: coded data elements within fields, in document order
//!
//! # Examples
//!
//! ```
//! use marc2skos::{Field, Leader, Record};
//!
//! let record = Record::builder(Leader::default())
//!     .control_field_str("001", "ocd00146759")
//!     .field(
//!         Field::builder("153".to_string(), ' ', ' ')
//!             .subfield_str('a', "543.17")
//!             .subfield_str('e', "543.1")
//!             .build(),
//!     )
//!     .build();
//!
//! assert_eq!(record.subfield_text("153", 'e'), Some("543.1"));
//! ```

use crate::leader::Leader;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A MARC record
///
/// Fields are grouped by tag in the order the tags were first seen; the
/// occurrences of one tag keep their document order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Record leader (24 characters)
    pub leader: Leader,
    /// Control fields (000-009) - tag -> value, preserves insertion order
    pub control_fields: IndexMap<String, String>,
    /// Data fields (010+) - tag -> fields, preserves insertion order
    pub fields: IndexMap<String, Vec<Field>>,
}

/// A data field in a MARC record (fields 010 and higher)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field tag (3 digits)
    pub tag: String,
    /// First indicator
    pub indicator1: char,
    /// Second indicator
    pub indicator2: char,
    /// Subfields (stored in `SmallVec` to avoid allocation for typical fields with 4 or fewer subfields)
    pub subfields: SmallVec<[Subfield; 4]>,
}

/// A subfield within a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subfield {
    /// Subfield code (single character)
    pub code: char,
    /// Subfield value
    pub value: String,
}

impl Record {
    /// Create a new MARC record with the given leader
    #[must_use]
    pub fn new(leader: Leader) -> Self {
        Record {
            leader,
            control_fields: IndexMap::new(),
            fields: IndexMap::new(),
        }
    }

    /// Create a builder for fluently constructing records
    #[must_use]
    pub fn builder(leader: Leader) -> RecordBuilder {
        RecordBuilder {
            record: Record::new(leader),
        }
    }

    /// Add a control field (000-009)
    pub fn add_control_field(&mut self, tag: String, value: String) {
        self.control_fields.insert(tag, value);
    }

    /// Add a control field using string slices
    pub fn add_control_field_str(&mut self, tag: &str, value: &str) {
        self.add_control_field(tag.to_string(), value.to_string());
    }

    /// Get a control field value
    #[must_use]
    pub fn get_control_field(&self, tag: &str) -> Option<&str> {
        self.control_fields.get(tag).map(String::as_str)
    }

    /// Add a data field
    pub fn add_field(&mut self, field: Field) {
        self.fields
            .entry(field.tag.clone())
            .or_default()
            .push(field);
    }

    /// Get all fields with a given tag
    #[must_use]
    pub fn get_fields(&self, tag: &str) -> Option<&[Field]> {
        self.fields.get(tag).map(Vec::as_slice)
    }

    /// Get first field with a given tag
    #[must_use]
    pub fn get_field(&self, tag: &str) -> Option<&Field> {
        self.fields.get(tag).and_then(|v| v.first())
    }

    /// Iterate over all fields in tag order
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values().flat_map(|v| v.iter())
    }

    /// Iterate over fields matching a specific tag
    pub fn fields_by_tag(&self, tag: &str) -> impl Iterator<Item = &Field> {
        self.fields.get(tag).map(|v| v.iter()).into_iter().flatten()
    }

    /// First value of subfield `code` in the first `tag` field that has one.
    #[must_use]
    pub fn subfield_text(&self, tag: &str, code: char) -> Option<&str> {
        self.fields_by_tag(tag).find_map(|f| f.get_subfield(code))
    }

    /// The raw 001 control number.
    #[must_use]
    pub fn control_number(&self) -> Option<&str> {
        self.get_control_field("001")
    }
}

/// Builder for fluently constructing records
#[derive(Debug)]
pub struct RecordBuilder {
    record: Record,
}

impl RecordBuilder {
    /// Add a control field to the record being built
    #[must_use]
    pub fn control_field(mut self, tag: String, value: String) -> Self {
        self.record.add_control_field(tag, value);
        self
    }

    /// Add a control field using string slices
    #[must_use]
    pub fn control_field_str(mut self, tag: &str, value: &str) -> Self {
        self.record.add_control_field_str(tag, value);
        self
    }

    /// Add a data field to the record being built
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.record.add_field(field);
        self
    }

    /// Build the record
    #[must_use]
    pub fn build(self) -> Record {
        self.record
    }
}

impl Field {
    /// Create a new data field
    #[must_use]
    pub fn new(tag: String, indicator1: char, indicator2: char) -> Self {
        Field {
            tag,
            indicator1,
            indicator2,
            subfields: SmallVec::new(),
        }
    }

    /// Create a builder for constructing fields fluently
    ///
    /// # Examples
    ///
    /// ```
    /// use marc2skos::Field;
    ///
    /// let field = Field::builder("153".to_string(), ' ', ' ')
    ///     .subfield('a', "003.5".to_string())
    ///     .subfield('j', "Theory of communication and control".to_string())
    ///     .build();
    /// assert_eq!(field.get_subfield('a'), Some("003.5"));
    /// ```
    #[must_use]
    pub fn builder(tag: String, indicator1: char, indicator2: char) -> FieldBuilder {
        FieldBuilder {
            field: Field::new(tag, indicator1, indicator2),
        }
    }

    /// Add a subfield
    pub fn add_subfield(&mut self, code: char, value: String) {
        self.subfields.push(Subfield { code, value });
    }

    /// Add a subfield using a string slice
    pub fn add_subfield_str(&mut self, code: char, value: &str) {
        self.add_subfield(code, value.to_string());
    }

    /// Get first value for a subfield code
    #[must_use]
    pub fn get_subfield(&self, code: char) -> Option<&str> {
        self.subfields
            .iter()
            .find(|sf| sf.code == code)
            .map(|sf| sf.value.as_str())
    }

    /// Iterate over all subfields
    pub fn subfields(&self) -> impl Iterator<Item = &Subfield> {
        self.subfields.iter()
    }

    /// Iterate over subfields with a specific code
    pub fn subfields_by_code(&self, code: char) -> impl Iterator<Item = &str> {
        self.subfields
            .iter()
            .filter(move |sf| sf.code == code)
            .map(|sf| sf.value.as_str())
    }

    /// Whether the field has at least one subfield with `code`.
    #[must_use]
    pub fn has_subfield(&self, code: char) -> bool {
        self.subfields.iter().any(|sf| sf.code == code)
    }

    /// Local "ess" codes carried in `$9 ess=...` subfields (OCLC convention).
    ///
    /// ```
    /// use marc2skos::Field;
    ///
    /// let field = Field::builder("680".to_string(), '1', ' ')
    ///     .subfield_str('t', "Addisjon")
    ///     .subfield_str('9', "ess=nch")
    ///     .subfield_str('9', "ps=PE")
    ///     .build();
    /// assert_eq!(field.ess_codes(), vec!["nch"]);
    /// ```
    #[must_use]
    pub fn ess_codes(&self) -> Vec<&str> {
        self.subfields_by_code('9')
            .filter_map(|value| value.strip_prefix("ess="))
            .collect()
    }
}

/// Builder for fluently constructing fields
#[derive(Debug)]
pub struct FieldBuilder {
    field: Field,
}

impl FieldBuilder {
    /// Add a subfield to the field being built
    #[must_use]
    pub fn subfield(mut self, code: char, value: String) -> Self {
        self.field.add_subfield(code, value);
        self
    }

    /// Add a subfield using a string slice
    #[must_use]
    pub fn subfield_str(mut self, code: char, value: &str) -> Self {
        self.field.add_subfield_str(code, value);
        self
    }

    /// Build the field
    #[must_use]
    pub fn build(self) -> Field {
        self.field
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_retrieve_fields() {
        let mut record = Record::new(Leader::default());
        record.add_control_field("001".to_string(), "12345".to_string());

        let mut field = Field::new("153".to_string(), ' ', ' ');
        field.add_subfield('a', "152".to_string());
        record.add_field(field);

        assert_eq!(record.control_number(), Some("12345"));
        assert_eq!(record.get_fields("153").map(<[Field]>::len), Some(1));
        assert_eq!(record.subfield_text("153", 'a'), Some("152"));
        assert_eq!(record.subfield_text("153", 'e'), None);
    }

    #[test]
    fn test_multiple_fields_same_tag_keep_order() {
        let mut record = Record::new(Leader::default());
        for i in 0..3 {
            let mut field = Field::new("765".to_string(), ' ', '0');
            field.add_subfield('b', format!("{i}"));
            record.add_field(field);
        }

        let values: Vec<_> = record
            .fields_by_tag("765")
            .filter_map(|f| f.get_subfield('b'))
            .collect();
        assert_eq!(values, vec!["0", "1", "2"]);
    }

    #[test]
    fn test_subfield_values() {
        let field = Field::builder("153".into(), ' ', ' ')
            .subfield_str('h', "Generalities")
            .subfield_str('h', "Systems")
            .build();
        assert_eq!(
            field.subfields_by_code('h').collect::<Vec<_>>(),
            vec!["Generalities", "Systems"]
        );
        assert!(field.has_subfield('h'));
        assert!(!field.has_subfield('a'));
        assert!(field.ess_codes().is_empty());
    }
}
