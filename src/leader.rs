//! MARC record leader parsing.
//!
//! The MARC leader is a 24-character fixed-length field at the start of every
//! MARC record. For this crate two positions matter:
//!
//! - Position 5: Record status (authority records use `d`, `o`, `s`, `x` for
//!   deleted or replaced headings)
//! - Position 6: Type of record (`w` = classification, `z` = authority)
//!
//! # Structure
//!
//! - Positions 0-4: Record length (5 digits)
//! - Position 5: Record status
//! - Position 6: Type of record
//! - Position 7-8: Undefined for classification/authority records
//! - Position 9: Character coding (space = MARC-8, a = UTF-8)
//! - Position 10: Indicator count (usually 2)
//! - Position 11: Subfield code count (usually 2)
//! - Positions 12-16: Base address of data (5 digits)
//! - Positions 17-19: Encoding level, punctuation policy, undefined
//! - Positions 20-23: Entry map (usually "4500")

use crate::error::{MarcError, Result};
use serde::{Deserialize, Serialize};

/// MARC Leader - 24 characters at the start of every MARC record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leader {
    /// Record length (5 digits) - positions 0-4
    pub record_length: u32,
    /// Record status (1 char) - position 5
    pub record_status: char,
    /// Type of record (1 char) - position 6
    pub record_type: char,
    /// Position 7 (undefined for classification/authority)
    pub bibliographic_level: char,
    /// Position 8 (undefined for classification/authority)
    pub control_record_type: char,
    /// Character coding scheme (1 char) - position 9
    pub character_coding: char,
    /// Indicator count (1 digit) - position 10 (usually 2)
    pub indicator_count: u8,
    /// Subfield code count (1 digit) - position 11 (usually 2)
    pub subfield_code_count: u8,
    /// Base address of data (5 digits) - positions 12-16
    pub data_base_address: u32,
    /// Encoding level (1 char) - position 17
    pub encoding_level: char,
    /// Punctuation policy (1 char) - position 18
    pub cataloging_form: char,
    /// Undefined (1 char) - position 19
    pub multipart_level: char,
    /// Entry map (4 chars) - positions 20-23
    pub reserved: String,
}

/// Kind of record named by leader position 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    /// w - MARC21 Classification record
    Classification,
    /// z - MARC21 Authority record
    Authority,
    /// Anything else (bibliographic, holdings, community information...)
    Other(char),
}

impl Default for Leader {
    fn default() -> Self {
        Leader {
            record_length: 0,
            record_status: 'n',
            record_type: 'w',
            bibliographic_level: ' ',
            control_record_type: ' ',
            character_coding: 'a',
            indicator_count: 2,
            subfield_code_count: 2,
            data_base_address: 0,
            encoding_level: 'n',
            cataloging_form: ' ',
            multipart_level: ' ',
            reserved: "4500".to_string(),
        }
    }
}

impl Leader {
    /// Parse a leader from 24 bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are too short or a numeric position is
    /// not numeric.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 24 {
            return Err(MarcError::InvalidLeader(format!(
                "Leader must be at least 24 bytes, got {}",
                bytes.len()
            )));
        }

        let record_length = parse_digits(&bytes[0..5])?;
        let indicator_count = parse_single_digit(bytes[10], 10)?;
        let subfield_code_count = parse_single_digit(bytes[11], 11)?;
        let data_base_address = parse_digits(&bytes[12..17])?;

        Ok(Leader {
            record_length,
            record_status: bytes[5] as char,
            record_type: bytes[6] as char,
            bibliographic_level: bytes[7] as char,
            control_record_type: bytes[8] as char,
            character_coding: bytes[9] as char,
            indicator_count,
            subfield_code_count,
            data_base_address,
            encoding_level: bytes[17] as char,
            cataloging_form: bytes[18] as char,
            multipart_level: bytes[19] as char,
            reserved: String::from_utf8_lossy(&bytes[20..24]).to_string(),
        })
    }

    /// Parse a leader as found in MARCXML `<leader>` elements.
    ///
    /// MARCXML producers routinely leave the length and base address blank
    /// (or fill them with placeholders), so blanks in numeric positions are
    /// read as zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is shorter than 24 bytes or a numeric
    /// position contains something other than digits or blanks.
    pub fn from_marcxml(text: &str) -> Result<Self> {
        let bytes: Vec<u8> = text
            .bytes()
            .enumerate()
            .map(|(i, b)| {
                let numeric = i < 5 || (10..17).contains(&i);
                if numeric && b == b' ' {
                    b'0'
                } else {
                    b
                }
            })
            .collect();
        Self::from_bytes(&bytes)
    }

    /// Kind of record (leader/06).
    #[must_use]
    pub fn kind(&self) -> RecordKind {
        match self.record_type {
            'w' => RecordKind::Classification,
            'z' => RecordKind::Authority,
            other => RecordKind::Other(other),
        }
    }

    /// Whether the record status marks a deleted or replaced heading.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        matches!(self.record_status, 'd' | 'o' | 's' | 'x')
    }
}

fn parse_single_digit(byte: u8, position: usize) -> Result<u8> {
    (byte as char)
        .to_digit(10)
        .and_then(|d| u8::try_from(d).ok())
        .ok_or_else(|| {
            MarcError::InvalidLeader(format!(
                "Invalid digit at position {position}: {}",
                byte as char
            ))
        })
}

/// Parse 5-digit ASCII number from bytes
fn parse_digits(bytes: &[u8]) -> Result<u32> {
    if bytes.len() != 5 {
        return Err(MarcError::InvalidLeader(format!(
            "Expected 5-digit field, got {} bytes",
            bytes.len()
        )));
    }

    let s = String::from_utf8_lossy(bytes);
    s.parse::<u32>()
        .map_err(|_| MarcError::InvalidLeader(format!("Invalid numeric field: '{s}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leader_from_marcxml_classification() {
        let leader = Leader::from_marcxml("00000nw  a2200000n  4500").unwrap();
        assert_eq!(leader.record_length, 0);
        assert_eq!(leader.record_status, 'n');
        assert_eq!(leader.kind(), RecordKind::Classification);
        assert_eq!(leader.character_coding, 'a');
        assert_eq!(leader.indicator_count, 2);
        assert_eq!(leader.encoding_level, 'n');
        assert_eq!(leader.reserved, "4500");
    }

    #[test]
    fn test_leader_from_marcxml_blank_numbers() {
        let leader = Leader::from_marcxml("     cz  a22     n  4500").unwrap();
        assert_eq!(leader.record_length, 0);
        assert_eq!(leader.data_base_address, 0);
        assert_eq!(leader.kind(), RecordKind::Authority);
    }

    #[test]
    fn test_leader_too_short() {
        assert!(Leader::from_marcxml("00000nw  a22").is_err());
        assert!(Leader::from_bytes(b"0123456789012").is_err());
    }

    #[test]
    fn test_leader_invalid_indicator_count() {
        let result = Leader::from_bytes(b"01234567890X20123456DUMMY");
        assert!(result.is_err());
    }

    #[test]
    fn test_other_record_kind() {
        let leader = Leader::from_marcxml("00000cam a2200000 a 4500").unwrap();
        assert_eq!(leader.kind(), RecordKind::Other('a'));
    }

    #[test]
    fn test_deleted_statuses() {
        for status in ['d', 'o', 's', 'x'] {
            let leader = Leader {
                record_status: status,
                ..Leader::default()
            };
            assert!(leader.is_deleted(), "status {status}");
        }
        assert!(!Leader::default().is_deleted());
    }
}
