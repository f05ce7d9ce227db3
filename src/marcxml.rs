//! MARCXML deserialization of classification and authority records.
//!
//! Input is standard MARCXML as defined by the Library of Congress
//! (<https://www.loc.gov/standards/marcxml/>): either a single `<record>` or a
//! `<collection>` of records. Default-namespace (`<record xmlns="...">`),
//! prefixed (`<marc:record>`, `<mx:record>`) and un-namespaced documents are
//! all accepted.
//!
//! Subfield text is normalized to Unicode NFC.
//!
//! Records are converted one by one, so a single malformed record (for
//! instance one without a `<leader>`) yields an `Err` item without affecting
//! the records around it.
//!
//! # Examples
//!
//! ```
//! use marc2skos::marcxml;
//!
//! let xml = r#"<collection xmlns="http://www.loc.gov/MARC21/slim">
//!   <record>
//!     <leader>00000nw  a2200000n  4500</leader>
//!     <controlfield tag="001">ocd00146759</controlfield>
//!   </record>
//!   <record>
//!     <controlfield tag="001">broken</controlfield>
//!   </record>
//! </collection>"#;
//!
//! let records = marcxml::parse_str(xml).unwrap();
//! assert_eq!(records.len(), 2);
//! assert!(records[0].is_ok());
//! assert!(records[1].is_err());
//! ```

use crate::error::{MarcError, Result};
use crate::leader::Leader;
use crate::record::{Field, Record};
use flate2::read::GzDecoder;
use lazy_static::lazy_static;
use quick_xml::de::from_str as xml_from_str;
use regex::Regex;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use unicode_normalization::UnicodeNormalization;

/// The MARCXML namespace URI.
pub const MARCXML_NS: &str = "http://www.loc.gov/MARC21/slim";

lazy_static! {
    static ref RE_XMLNS: Regex = Regex::new(r#"\s+xmlns(?::\w+)?="[^"]*""#).unwrap();
    static ref RE_PREFIX: Regex = Regex::new(r"<(/?)(\w+):").unwrap();
    // Processing instructions, including the XML declaration.
    static ref RE_PI: Regex = Regex::new(r"(?s)<\?.*?\?>").unwrap();
    static ref RE_COMMENT: Regex = Regex::new(r"(?s)<!--.*?-->").unwrap();
    static ref RE_ROOT: Regex = Regex::new(r"^\s*(?:<!DOCTYPE[^>]*>\s*)?<(\w+)").unwrap();
}

/// MARCXML record representation.
#[derive(Debug, Deserialize)]
#[serde(rename = "record")]
pub struct MarcxmlRecord {
    /// MARC leader string, missing in malformed records
    #[serde(default)]
    pub leader: Option<String>,
    /// Control fields (tags 001-009)
    #[serde(default)]
    pub controlfield: Vec<MarcxmlControlField>,
    /// Data fields (tags 010+)
    #[serde(default)]
    pub datafield: Vec<MarcxmlDataField>,
}

/// MARCXML control field representation.
#[derive(Debug, Deserialize)]
pub struct MarcxmlControlField {
    /// Field tag as an XML attribute (e.g., "001", "008")
    #[serde(rename = "@tag")]
    pub tag: String,
    /// Control field value (text content)
    #[serde(rename = "$value", default)]
    pub value: String,
}

/// MARCXML data field representation.
#[derive(Debug, Deserialize)]
pub struct MarcxmlDataField {
    /// Field tag as an XML attribute (e.g., "153", "765")
    #[serde(rename = "@tag")]
    pub tag: String,
    /// First indicator as an XML attribute
    #[serde(rename = "@ind1", default)]
    pub ind1: String,
    /// Second indicator as an XML attribute
    #[serde(rename = "@ind2", default)]
    pub ind2: String,
    /// Subfields
    #[serde(default)]
    pub subfield: Vec<MarcxmlSubfield>,
}

/// MARCXML subfield representation.
#[derive(Debug, Deserialize)]
pub struct MarcxmlSubfield {
    /// Subfield code as an XML attribute (e.g., "a", "e", "z")
    #[serde(rename = "@code")]
    pub code: String,
    /// Subfield value (text content)
    #[serde(rename = "$value", default)]
    pub value: String,
}

/// MARCXML collection wrapper for multiple records.
#[derive(Debug, Deserialize)]
#[serde(rename = "collection")]
pub struct MarcxmlCollection {
    /// Records in the collection
    #[serde(default, rename = "record")]
    pub records: Vec<MarcxmlRecord>,
}

/// Remove namespaces, processing instructions and comments.
///
/// Processing instructions embedded in subfield text are dropped and the text
/// around them joined: `<?ddc x?>L<?ddc y?>p-rom` becomes `Lp-rom`.
fn clean_marcxml(xml: &str) -> String {
    let without_pi = RE_PI.replace_all(xml, "");
    let without_comments = RE_COMMENT.replace_all(&without_pi, "");
    let stripped = RE_XMLNS.replace_all(&without_comments, "");
    RE_PREFIX.replace_all(&stripped, "<$1").to_string()
}

/// Parse a MARCXML document held in memory.
///
/// The outer `Result` fails only when the document as a whole cannot be read
/// (broken XML, unexpected root element). Each record is converted
/// separately.
///
/// # Errors
///
/// Returns [`MarcError::ParseError`] if the document is not MARCXML.
pub fn parse_str(xml: &str) -> Result<Vec<Result<Record>>> {
    let cleaned = clean_marcxml(xml);
    let root = RE_ROOT
        .captures(&cleaned)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| MarcError::ParseError("No root element found".to_string()))?;

    let records = match root.as_str() {
        "collection" => {
            let collection: MarcxmlCollection = xml_from_str(&cleaned).map_err(|e| {
                MarcError::ParseError(format!("Failed to parse MARCXML collection: {e}"))
            })?;
            collection.records
        },
        "record" => {
            let record: MarcxmlRecord = xml_from_str(&cleaned)
                .map_err(|e| MarcError::ParseError(format!("Failed to parse MARCXML: {e}")))?;
            vec![record]
        },
        other => {
            return Err(MarcError::ParseError(format!(
                "Expected <collection> or <record>, found <{other}>"
            )))
        },
    };

    Ok(records.into_iter().map(marcxml_record_to_record).collect())
}

/// Read a MARCXML file, decompressing it first if the name ends in `.gz`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not MARCXML.
pub fn read_file(path: impl AsRef<Path>) -> Result<Vec<Result<Record>>> {
    let path = path.as_ref();
    let mut file = File::open(path)?;
    let mut xml = String::new();
    if path.extension().is_some_and(|ext| ext == "gz") {
        GzDecoder::new(file).read_to_string(&mut xml)?;
    } else {
        file.read_to_string(&mut xml)?;
    }
    parse_str(&xml)
}

/// Convert a MARCXML string holding exactly one record.
///
/// # Errors
///
/// Returns an error if the XML is invalid, holds no record or the record is
/// malformed.
pub fn marcxml_to_record(xml: &str) -> Result<Record> {
    parse_str(xml)?
        .into_iter()
        .next()
        .unwrap_or_else(|| Err(MarcError::ParseError("No record found".to_string())))
}

/// Internal helper: convert a deserialized `MarcxmlRecord` into a `Record`.
fn marcxml_record_to_record(xml_record: MarcxmlRecord) -> Result<Record> {
    let control_number = xml_record
        .controlfield
        .iter()
        .find(|cf| cf.tag == "001")
        .map(|cf| cf.value.clone());

    let Some(leader_text) = xml_record.leader else {
        return Err(MarcError::InvalidRecord {
            message: "Record has no leader".to_string(),
            control_number,
        });
    };
    // Text content may come back with its leading blanks trimmed.
    let leader = Leader::from_marcxml(&format!("{leader_text:>24}")).map_err(|e| {
        MarcError::InvalidRecord {
            message: e.to_string(),
            control_number: control_number.clone(),
        }
    })?;
    let mut record = Record::new(leader);

    for cf in xml_record.controlfield {
        record.add_control_field(cf.tag, cf.value);
    }

    for df in xml_record.datafield {
        let ind1 = df.ind1.chars().next().unwrap_or(' ');
        let ind2 = df.ind2.chars().next().unwrap_or(' ');

        let mut field = Field::new(df.tag, ind1, ind2);

        for sf in df.subfield {
            let code = sf.code.chars().next().ok_or_else(|| MarcError::InvalidRecord {
                message: format!("Missing subfield code in field {}", field.tag),
                control_number: control_number.clone(),
            })?;
            field.add_subfield(code, sf.value.nfc().collect());
        }

        record.add_field(field);
    }

    Ok(record)
}
