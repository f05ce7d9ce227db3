//! Synthesized number components (765 fields).
//!
//! A built number records its construction history in repeated 765 fields,
//! most recent step first. Replaying the fields in reverse gives the base
//! number followed by every number whose digits were added to it:
//!
//! | Subfield | Meaning |
//! |---|---|
//! | `$b` | Base number (only the innermost one is kept) |
//! | `$r` | Root number the added digits belong to |
//! | `$z` | Table the next number comes from |
//! | `$s` | Digits added from a schedule or external table |
//! | `$u` | The number resulting from this step |
//!
//! Malformed fields never abort resolution; missing `$s` values are reported
//! and skipped.

use crate::notation::TABLE_SEPARATOR;
use crate::record::Field;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Number of digits before the decimal point in a full class number.
const INTEGER_DIGITS: usize = 3;

/// Where a component came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepKind {
    /// `$b`
    Base,
    /// `$r` + `$s`
    Added,
}

/// One resolved component of a synthesized number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisStep {
    /// Table the number belongs to (`$z`)
    pub table_prefix: Option<String>,
    /// Class number, with the decimal point restored
    pub digits: String,
    /// Subfield(s) the step was read from
    pub kind: StepKind,
}

impl fmt::Display for SynthesisStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(table) = &self.table_prefix {
            write!(f, "{table}{TABLE_SEPARATOR}")?;
        }
        f.write_str(&self.digits)
    }
}

/// Join a root number and added digits into a class number.
///
/// ```
/// use marc2skos::synthesis::join_root;
///
/// assert_eq!(join_root("2", "804"), "280.4");
/// assert_eq!(join_root("9", "31"), "931");
/// ```
#[must_use]
pub fn join_root(root: &str, digits: &str) -> String {
    let number = format!("{root}{digits}");
    match number.char_indices().nth(INTEGER_DIGITS) {
        Some((idx, _)) => format!("{}.{}", &number[..idx], &number[idx..]),
        None => number,
    }
}

/// Per-field replay state. Created fresh for every 765 field.
#[derive(Debug, Default)]
struct FieldReplay {
    table: Option<String>,
    root: String,
    accept_base: bool,
    steps: Vec<SynthesisStep>,
}

impl FieldReplay {
    fn new(accept_base: bool) -> Self {
        FieldReplay {
            accept_base,
            ..FieldReplay::default()
        }
    }

    fn step(mut self, code: char, value: &str, notation: &str) -> Self {
        match code {
            'b' if self.accept_base => {
                self.steps.push(SynthesisStep {
                    table_prefix: self.table.take(),
                    digits: value.to_string(),
                    kind: StepKind::Base,
                });
                self.accept_base = false;
            },
            'r' => self.root = value.to_string(),
            'z' => self.table = Some(value.to_string()),
            's' if value.is_empty() => {
                warn!(
                    "Class {} has blank 765 $s subfield. This should be fixed.",
                    notation
                );
            },
            's' => {
                self.steps.push(SynthesisStep {
                    table_prefix: self.table.take(),
                    digits: join_root(&self.root, value),
                    kind: StepKind::Added,
                });
                self.accept_base = false;
            },
            _ => {},
        }
        self
    }
}

/// Replay the 765 fields of a record (given in record order) into steps.
///
/// `notation` is only used in diagnostics.
#[must_use]
pub fn synthesis_steps(fields: &[Field], notation: &str) -> Vec<SynthesisStep> {
    fields.iter().rev().fold(Vec::new(), |mut steps, field| {
        if !field.has_subfield('u') {
            debug!("Built number without components specified: {}", notation);
        }
        let replay = field
            .subfields()
            .fold(FieldReplay::new(steps.is_empty()), |replay, sf| {
                replay.step(sf.code, &sf.value, notation)
            });
        steps.extend(replay.steps);
        steps
    })
}

/// Component class numbers of a synthesized number, base number first.
///
/// # Examples
///
/// ```
/// use marc2skos::synthesis::resolve_components;
/// use marc2skos::Field;
///
/// let field = Field::builder("765".to_string(), '0', ' ')
///     .subfield_str('b', "306.6")
///     .subfield_str('a', "306.63")
///     .subfield_str('c', "306.69")
///     .subfield_str('r', "2")
///     .subfield_str('s', "804")
///     .subfield_str('u', "306.6804")
///     .build();
///
/// assert_eq!(resolve_components(&[field], "306.6804"), vec!["306.6", "280.4"]);
/// ```
#[must_use]
pub fn resolve_components(fields: &[Field], notation: &str) -> Vec<String> {
    synthesis_steps(fields, notation)
        .iter()
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(subfields: &[(char, &str)]) -> Field {
        subfields
            .iter()
            .fold(Field::builder("765".to_string(), '0', ' '), |b, (code, value)| {
                b.subfield_str(*code, value)
            })
            .build()
    }

    #[test]
    fn test_two_fields_with_table_and_duplicate_marker() {
        let fields = vec![
            field(&[
                ('b', "299.31"),
                ('a', "299.31"),
                ('a', "290"),
                ('w', "290"),
                ('y', "1"),
                ('a', "1"),
                ('c', "9"),
                ('r', "20"),
                ('s', "13"),
                ('u', "299.3113"),
            ]),
            field(&[
                ('b', "299"),
                ('a', "299.1"),
                ('c', "299.4"),
                ('z', "5"),
                ('r', "9"),
                ('s', "31"),
                ('u', "299.31"),
            ]),
        ];

        assert_eq!(
            resolve_components(&fields, "299.3113"),
            vec!["299", "5--931", "201.3"]
        );
    }

    #[test]
    fn test_steps_carry_kind_and_table() {
        let fields = vec![field(&[('b', "299"), ('z', "5"), ('r', "9"), ('s', "31")])];
        let steps = synthesis_steps(&fields, "299.31");
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].kind, StepKind::Base);
        assert_eq!(steps[1].kind, StepKind::Added);
        assert_eq!(steps[1].table_prefix.as_deref(), Some("5"));
        assert_eq!(steps[1].digits, "931");
    }

    #[test]
    fn test_table_prefix_on_base_number() {
        let fields = vec![field(&[('z', "1"), ('b', "09"), ('s', "3")])];
        assert_eq!(resolve_components(&fields, "x"), vec!["1--09", "3"]);
    }

    #[test]
    fn test_blank_digits_are_skipped() {
        let fields = vec![field(&[('b', "306.6"), ('r', "2"), ('s', "")])];
        assert_eq!(resolve_components(&fields, "306.6"), vec!["306.6"]);
    }

    #[test]
    fn test_no_fields() {
        assert!(resolve_components(&[], "152").is_empty());
    }

    #[test]
    fn test_root_does_not_leak_between_fields() {
        let fields = vec![
            field(&[('s', "5")]),
            field(&[('b', "100"), ('r', "12"), ('s', "34")]),
        ];
        assert_eq!(resolve_components(&fields, "x"), vec!["100", "123.4", "5"]);
    }

    #[test]
    fn test_base_after_added_digits_is_ignored() {
        let fields = vec![field(&[('s', "5"), ('b', "100")])];
        assert_eq!(resolve_components(&fields, "x"), vec!["5"]);
    }

    #[test]
    fn test_join_root() {
        assert_eq!(join_root("20", "13"), "201.3");
        assert_eq!(join_root("", "5"), "5");
        assert_eq!(join_root("306", ""), "306");
    }
}
