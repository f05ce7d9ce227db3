//! Classification numbers: decoding of the 153 field and the notation grammar.
//!
//! A notation takes one of these shapes, which compose:
//!
//! - simple: `152`, `003.5`
//! - span: `820.1-828`
//! - table-qualified: `3B--81-89`
//! - add-table-qualified: `811-818:2;4` (add table 2, number 4) or
//!   `3B--81-89:02` (add table 1, written as a bare colon)
//!
//! [`parse_153`] reads the subfields of a 153 field with a small state machine
//! (see [`Mode`] and [`Mode::transition`]). [`NotationParts`] splits a notation
//! back into its components.

use crate::record::Field;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between a table number and the number within the table.
pub const TABLE_SEPARATOR: &str = "--";

/// Decoded 153 field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Decoded153 {
    /// Table the notation belongs to (`$z` before the first `$a`)
    pub table: Option<String>,
    /// Canonical notation, `None` only if the field has no `$a`
    pub notation: Option<String>,
    /// No coded parent and no caption hierarchy (`$h`)
    pub is_top_concept: bool,
    /// Notation of the parent class (`$e`/`$f`)
    pub parent_notation: Option<String>,
    /// Caption (`$j`)
    pub caption: Option<String>,
}

/// Which notation the number-bearing subfields currently contribute to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Building the class's own notation (`$a`, `$c`)
    #[default]
    Notation,
    /// Building the parent notation (`$e`, `$f`)
    Parent,
    /// Past the coded numbers; number subfields are ignored
    Other,
}

/// Effect of one subfield on the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// `$z`: pending table prefix
    SetTable,
    /// `$y`: pending add-table marker
    SetAddTable,
    /// `$a`: start or extend the notation
    Number,
    /// `$c`: end of the notation span
    NumberSpanEnd,
    /// `$e`: start the parent notation
    Parent,
    /// `$f`: end of the parent span
    ParentSpanEnd,
    /// `$j`
    Caption,
    /// `$h`: caption hierarchy, so not a top concept
    CaptionHierarchy,
    /// Anything else
    Ignore,
}

impl Mode {
    /// Transition table of the 153 state machine.
    #[must_use]
    pub fn transition(self, code: char) -> (Action, Mode) {
        match (code, self) {
            ('z', mode) => (Action::SetTable, mode),
            ('y', mode) => (Action::SetAddTable, mode),
            ('j', mode) => (Action::Caption, mode),
            ('h', mode) => (Action::CaptionHierarchy, mode),
            ('a', Mode::Notation) => (Action::Number, Mode::Notation),
            ('c', Mode::Notation) => (Action::NumberSpanEnd, Mode::Notation),
            ('e', Mode::Notation | Mode::Parent) => (Action::Parent, Mode::Parent),
            ('f', Mode::Parent) => (Action::ParentSpanEnd, Mode::Parent),
            _ => (Action::Ignore, Mode::Other),
        }
    }
}

/// Render a `$y` add-table marker: table 1 is a bare colon.
fn add_table_marker(add_table: &str) -> String {
    if add_table == "1" {
        ":".to_string()
    } else {
        format!(":{add_table};")
    }
}

#[derive(Debug, Default)]
struct Builder {
    mode: Mode,
    pending_table: Option<String>,
    pending_add_table: Option<String>,
    decoded: Decoded153,
    has_caption_hierarchy: bool,
}

impl Builder {
    /// Apply the pending prefix to `value`. Returns the text and whether it
    /// extends the current number rather than starting a new one.
    fn take_prefixed(&mut self, value: &str) -> (String, bool, Option<String>) {
        if let Some(table) = self.pending_table.take() {
            self.pending_add_table = None;
            (format!("{table}{TABLE_SEPARATOR}{value}"), false, Some(table))
        } else if let Some(add_table) = self.pending_add_table.take() {
            (format!("{}{value}", add_table_marker(&add_table)), true, None)
        } else {
            (value.to_string(), false, None)
        }
    }

    fn apply(&mut self, code: char, value: &str) {
        let (action, next) = self.mode.transition(code);
        match action {
            Action::SetTable => self.pending_table = Some(value.to_string()),
            Action::SetAddTable => self.pending_add_table = Some(value.to_string()),
            Action::Number => {
                let (text, extends, table) = self.take_prefixed(value);
                match (&mut self.decoded.notation, extends) {
                    (Some(notation), true) => notation.push_str(&text),
                    (notation, _) => {
                        if notation.is_none() {
                            self.decoded.table = table;
                        }
                        *notation = Some(text);
                    },
                }
            },
            Action::NumberSpanEnd => {
                if let Some(notation) = &mut self.decoded.notation {
                    notation.push('-');
                    notation.push_str(value);
                }
            },
            Action::Parent => {
                let (text, _, _) = self.take_prefixed(value);
                self.decoded.parent_notation = Some(text);
            },
            Action::ParentSpanEnd => {
                if let Some(parent) = &mut self.decoded.parent_notation {
                    parent.push('-');
                    parent.push_str(value);
                }
            },
            Action::Caption => self.decoded.caption = Some(value.to_string()),
            Action::CaptionHierarchy => self.has_caption_hierarchy = true,
            Action::Ignore => {},
        }
        self.mode = next;
    }

    fn finish(mut self) -> Decoded153 {
        self.decoded.is_top_concept =
            self.decoded.parent_notation.is_none() && !self.has_caption_hierarchy;
        self.decoded
    }
}

/// Decode an ordered list of `(code, value)` subfields of a 153 field.
///
/// # Examples
///
/// ```
/// use marc2skos::notation::decode_153_subfields;
///
/// let decoded = decode_153_subfields([
///     ('z', "3B"), ('a', "81"), ('c', "89"), ('y', "1"), ('a', "02"),
///     ('z', "3B"), ('e', "81"), ('f', "89"),
/// ]);
/// assert_eq!(decoded.table.as_deref(), Some("3B"));
/// assert_eq!(decoded.notation.as_deref(), Some("3B--81-89:02"));
/// assert_eq!(decoded.parent_notation.as_deref(), Some("3B--81-89"));
/// assert!(!decoded.is_top_concept);
/// ```
pub fn decode_153_subfields<'a, I>(subfields: I) -> Decoded153
where
    I: IntoIterator<Item = (char, &'a str)>,
{
    let mut builder = Builder::default();
    for (code, value) in subfields {
        builder.apply(code, value);
    }
    builder.finish()
}

/// Decode a 153 field.
#[must_use]
pub fn parse_153(field: &Field) -> Decoded153 {
    decode_153_subfields(field.subfields().map(|sf| (sf.code, sf.value.as_str())))
}

/// Add-table part of a notation (`:02` or `:4;1`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddTablePart {
    /// Add table number, `None` for the bare-colon form (add table 1)
    pub table: Option<String>,
    /// Number taken from the add table, possibly a span
    pub number: String,
}

/// A notation split into its components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotationParts {
    /// Table prefix before `--`
    pub table: Option<String>,
    /// First number of the span (or the only number)
    pub start: String,
    /// Last number of a span
    pub end: Option<String>,
    /// Add-table extensions, in order
    pub add_tables: Vec<AddTablePart>,
}

impl NotationParts {
    /// Split a notation on `--`, `:`, `;` and `-`, in that order.
    ///
    /// ```
    /// use marc2skos::notation::NotationParts;
    ///
    /// let parts = NotationParts::parse("820.1-828:4;1");
    /// assert_eq!(parts.start, "820.1");
    /// assert_eq!(parts.end.as_deref(), Some("828"));
    /// assert_eq!(parts.add_tables[0].table.as_deref(), Some("4"));
    /// assert_eq!(parts.to_string(), "820.1-828:4;1");
    /// ```
    #[must_use]
    pub fn parse(notation: &str) -> Self {
        let (table, rest) = match notation.split_once(TABLE_SEPARATOR) {
            Some((table, rest)) => (Some(table.to_string()), rest),
            None => (None, notation),
        };

        let mut segments = rest.split(':');
        let number = segments.next().unwrap_or_default();
        let add_tables = segments
            .map(|segment| match segment.split_once(';') {
                Some((table, number)) => AddTablePart {
                    table: Some(table.to_string()),
                    number: number.to_string(),
                },
                None => AddTablePart {
                    table: None,
                    number: segment.to_string(),
                },
            })
            .collect();

        let (start, end) = match number.split_once('-') {
            Some((start, end)) => (start.to_string(), Some(end.to_string())),
            None => (number.to_string(), None),
        };

        NotationParts {
            table,
            start,
            end,
            add_tables,
        }
    }

    /// Whether the notation is an add-table number.
    #[must_use]
    pub fn is_add_table_number(&self) -> bool {
        !self.add_tables.is_empty()
    }

    /// Whether the notation is a span.
    #[must_use]
    pub fn is_span(&self) -> bool {
        self.end.is_some()
    }
}

impl fmt::Display for NotationParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(table) = &self.table {
            write!(f, "{table}{TABLE_SEPARATOR}")?;
        }
        f.write_str(&self.start)?;
        if let Some(end) = &self.end {
            write!(f, "-{end}")?;
        }
        for part in &self.add_tables {
            match &part.table {
                Some(table) => write!(f, ":{table};{}", part.number)?,
                None => write!(f, ":{}", part.number)?,
            }
        }
        Ok(())
    }
}
