//! Decoding of the 008 fixed-length data element of classification records.
//!
//! Only a handful of positions are interpreted:
//!
//! | Position | Meaning |
//! |---|---|
//! | 00-05 | Date entered on file (`yymmdd`) |
//! | 06 | Kind of record |
//! | 07 | Type of number |
//! | 08 | Classification validity |
//! | 12 | Synthesized number indication |
//! | 13 | Display controller |
//!
//! Decoding never fails. Unrecognised codes degrade to
//! [`RecordType::Unknown`] (with a warning) or to "not displayable".

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Kind of classification record (008/06).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    /// a - Schedule record
    Schedule,
    /// b - Table record
    Table,
    /// e - External summary record
    ExternalSummary,
    /// i - Internal summary of schedule number
    InternalSummaryOfSchedule,
    /// j - Internal summary of table number
    InternalSummaryOfTable,
    /// m - Manual note record
    ManualNote,
    /// Anything else
    Unknown,
}

/// Type of number (008/07).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberType {
    /// a - Single number
    Single,
    /// b - Defined number span
    Span,
    /// c - Summary number span
    SummarySpan,
    /// Anything else
    Unknown,
}

impl RecordType {
    /// Map the 008/06 code. The undocumented legacy value `1` is a schedule.
    #[must_use]
    pub fn from_code(code: char) -> Self {
        match code {
            'a' | '1' => RecordType::Schedule,
            'b' => RecordType::Table,
            'e' => RecordType::ExternalSummary,
            'i' => RecordType::InternalSummaryOfSchedule,
            'j' => RecordType::InternalSummaryOfTable,
            'm' => RecordType::ManualNote,
            _ => RecordType::Unknown,
        }
    }

    /// Whether records of this type are published as concepts.
    #[must_use]
    pub fn is_publishable(self) -> bool {
        matches!(self, RecordType::Schedule | RecordType::Table)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordType::Schedule => "schedule_record",
            RecordType::Table => "table_record",
            RecordType::ExternalSummary => "external_summary",
            RecordType::InternalSummaryOfSchedule => "internal_summary_of_schedule_number",
            RecordType::InternalSummaryOfTable => "internal_summary_of_table_number",
            RecordType::ManualNote => "manual_note_record",
            RecordType::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

impl NumberType {
    /// Map the 008/07 code.
    #[must_use]
    pub fn from_code(code: char) -> Self {
        match code {
            'a' => NumberType::Single,
            'b' => NumberType::Span,
            'c' => NumberType::SummarySpan,
            _ => NumberType::Unknown,
        }
    }
}

/// Decoded 008 field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedFields {
    /// Date entered on file
    pub created: Option<NaiveDate>,
    /// `None` only when the record has no 008 field
    pub record_type: Option<RecordType>,
    /// `None` only when the record has no 008 field
    pub number_type: Option<NumberType>,
    /// Displayed in standard or extended display
    pub display: bool,
    /// The number was built (synthesized) from other numbers
    pub synthesized: bool,
    /// The number is no longer valid
    pub deprecated: bool,
}

impl Default for FixedFields {
    /// Values used for records without a 008 field.
    fn default() -> Self {
        FixedFields {
            created: None,
            record_type: None,
            number_type: None,
            display: true,
            synthesized: false,
            deprecated: false,
        }
    }
}

/// Parse the `yymmdd` date at the start of a 008 field.
#[must_use]
pub fn parse_created(value: &str) -> Option<NaiveDate> {
    let head: String = value.chars().take(6).collect();
    match NaiveDate::parse_from_str(&head, "%y%m%d") {
        Ok(date) => Some(date),
        Err(_) => {
            warn!("Ignoring invalid date in 008 field: {}", head);
            None
        },
    }
}

/// Decode a 008 control field.
///
/// Positions beyond the end of a short field read as blanks.
///
/// # Examples
///
/// ```
/// use marc2skos::fixed_field::{decode_008, NumberType, RecordType};
///
/// let fields = decode_008(Some("091203abdaaaba"));
/// assert_eq!(fields.record_type, Some(RecordType::Schedule));
/// assert_eq!(fields.number_type, Some(NumberType::Span));
/// assert!(fields.deprecated);
/// assert!(fields.synthesized);
/// assert!(fields.display);
/// ```
#[must_use]
pub fn decode_008(value: Option<&str>) -> FixedFields {
    let Some(value) = value else {
        return FixedFields::default();
    };
    let chars: Vec<char> = value.chars().collect();
    let at = |pos: usize| chars.get(pos).copied().unwrap_or(' ');

    let record_type = RecordType::from_code(at(6));
    if record_type == RecordType::Unknown {
        warn!("Unknown value in 008/6: {}", at(6));
    }

    let display = match at(13) {
        // Standard display, or extended display (shown in search results)
        'a' | 'b' => true,
        // Historical information
        'h' => false,
        _ if at(7) == 'n' => false,
        other => {
            warn!("Unknown value in 008/13: {}", other);
            false
        },
    };

    FixedFields {
        created: parse_created(value),
        record_type: Some(record_type),
        number_type: Some(NumberType::from_code(at(7))),
        display,
        synthesized: at(12) == 'b',
        deprecated: matches!(at(8), 'd' | 'e'),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_single_displayed() {
        let fields = decode_008(Some("091203aaaaaaaa"));
        assert_eq!(fields.created, NaiveDate::from_ymd_opt(2009, 12, 3));
        assert_eq!(fields.record_type, Some(RecordType::Schedule));
        assert_eq!(fields.number_type, Some(NumberType::Single));
        assert!(fields.display);
        assert!(!fields.synthesized);
        assert!(!fields.deprecated);
    }

    #[test]
    fn test_table_record() {
        let fields = decode_008(Some("100414baabaaaa"));
        assert_eq!(fields.record_type, Some(RecordType::Table));
        assert_eq!(fields.created, NaiveDate::from_ymd_opt(2010, 4, 14));
    }

    #[test]
    fn test_historical_not_displayed() {
        let fields = decode_008(Some("091203baaaaaah"));
        assert!(!fields.display);
    }

    #[test]
    fn test_extended_display_is_displayed() {
        let fields = decode_008(Some("091203aaaaaabb"));
        assert!(fields.synthesized);
        assert!(fields.display);
    }

    #[test]
    fn test_other_information_not_displayed() {
        let fields = decode_008(Some("091203anaaaaax"));
        assert_eq!(fields.number_type, Some(NumberType::Unknown));
        assert!(!fields.display);

        let fields = decode_008(Some("091203aaaaaaax"));
        assert!(!fields.display);
    }

    #[test]
    fn test_unknown_and_legacy_record_types() {
        assert_eq!(
            decode_008(Some("0912031aaaaaaa")).record_type,
            Some(RecordType::Schedule)
        );
        assert_eq!(
            decode_008(Some("091203qaaaaaaa")).record_type,
            Some(RecordType::Unknown)
        );
        assert_eq!(
            decode_008(Some("091203maaaaaaa")).record_type,
            Some(RecordType::ManualNote)
        );
    }

    #[test]
    fn test_absent_field_defaults() {
        let fields = decode_008(None);
        assert_eq!(fields, FixedFields::default());
        assert!(fields.display);
        assert!(fields.record_type.is_none());
    }

    #[test]
    fn test_short_field_does_not_panic() {
        let fields = decode_008(Some("0912"));
        assert!(fields.created.is_none());
        assert_eq!(fields.record_type, Some(RecordType::Unknown));
        assert!(!fields.display);
    }

    #[test]
    fn test_record_type_names() {
        assert_eq!(RecordType::Table.to_string(), "table_record");
        assert!(RecordType::Schedule.is_publishable());
        assert!(!RecordType::ExternalSummary.is_publishable());
    }
}
