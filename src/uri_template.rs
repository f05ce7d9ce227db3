//! URI template mini-language.
//!
//! Templates are literal text with `{param}` placeholders. A placeholder may
//! slice the parameter by character position and format the result:
//!
//! ```text
//! {object}                 plain substitution
//! {control_number[4:]}     characters 4.. of the value
//! {control_number[3:]:d}   ... read as an integer ("0012" -> "12")
//! {object:05d}             zero-padded to five digits
//! ```
//!
//! A template is parsed once into a list of [`Segment`]s and rendered many
//! times. Formatting is skipped for empty values, so a placeholder that is
//! deliberately blank (as in scheme URIs) never fails numeric conversion.

use crate::error::{MarcError, Result};
use nom::{
    branch::alt,
    bytes::complete::{is_not, take_while1},
    character::complete::{char, digit1, one_of},
    combinator::{all_consuming, map, map_res, opt, recognize},
    multi::many0,
    sequence::{delimited, pair, preceded, separated_pair, tuple},
    IResult,
};
use std::collections::HashMap;
use std::fmt;

/// Conversion applied to a substituted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    /// `d`: integer
    Integer,
    /// `f`: fixed-point number
    Float,
    /// `s`, `!s`, `!r` or no type: string
    Str,
}

/// Parsed format specification (`:05d`, `:.2f`, `!s`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatSpec {
    /// Pad with zeros instead of spaces
    pub zero_pad: bool,
    /// Minimum width
    pub width: Option<usize>,
    /// Digits after the decimal point (floats)
    pub precision: Option<usize>,
    /// Conversion
    pub kind: FormatKind,
}

/// One piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text copied as is
    Literal(String),
    /// `{name[start:end]:spec}`
    Param {
        /// Parameter name
        name: String,
        /// Character range `[start:end]`
        slice: Option<(Option<usize>, Option<usize>)>,
        /// Format specification
        format: Option<FormatSpec>,
    },
}

/// A parsed URI template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriTemplate {
    source: String,
    segments: Vec<Segment>,
}

fn literal(input: &str) -> IResult<&str, Segment> {
    map(is_not("{"), |s: &str| Segment::Literal(s.to_string()))(input)
}

fn number(input: &str) -> IResult<&str, usize> {
    map_res(digit1, str::parse)(input)
}

fn slice(input: &str) -> IResult<&str, (Option<usize>, Option<usize>)> {
    delimited(
        char('['),
        separated_pair(opt(number), char(':'), opt(number)),
        char(']'),
    )(input)
}

fn format_kind(input: &str) -> IResult<&str, FormatKind> {
    map(one_of("dfsr"), |c| match c {
        'd' => FormatKind::Integer,
        'f' => FormatKind::Float,
        _ => FormatKind::Str,
    })(input)
}

fn format_spec(input: &str) -> IResult<&str, FormatSpec> {
    alt((
        // Conversion flag: {param!s}
        map(preceded(char('!'), one_of("sr")), |_| FormatSpec {
            zero_pad: false,
            width: None,
            precision: None,
            kind: FormatKind::Str,
        }),
        map(
            preceded(
                char(':'),
                tuple((
                    opt(char('0')),
                    opt(number),
                    opt(preceded(char('.'), number)),
                    opt(format_kind),
                )),
            ),
            |(zero, width, precision, kind)| FormatSpec {
                zero_pad: zero.is_some(),
                width,
                precision,
                kind: kind.unwrap_or(FormatKind::Str),
            },
        ),
    ))(input)
}

fn param_name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_lowercase() || c == '_')(input)
}

fn placeholder(input: &str) -> IResult<&str, Segment> {
    map(
        delimited(
            char('{'),
            tuple((param_name, opt(slice), opt(format_spec))),
            char('}'),
        ),
        |(name, slice, format)| Segment::Param {
            name: name.to_string(),
            slice,
            format,
        },
    )(input)
}

fn segments(input: &str) -> IResult<&str, Vec<Segment>> {
    all_consuming(many0(alt((placeholder, literal))))(input)
}

/// Recognize a single placeholder, used to report the offending text.
fn broken_placeholder(input: &str) -> IResult<&str, &str> {
    recognize(pair(char('{'), opt(is_not("}"))))(input)
}

impl UriTemplate {
    /// Parse a template.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::Template`] if a `{` does not start a valid
    /// placeholder.
    pub fn parse(template: &str) -> Result<Self> {
        match segments(template) {
            Ok((_, segments)) => Ok(UriTemplate {
                source: template.to_string(),
                segments,
            }),
            Err(_) => {
                let offending = template
                    .find('{')
                    .and_then(|pos| broken_placeholder(&template[pos..]).ok())
                    .map_or(template, |(_, text)| text);
                Err(MarcError::Template(format!(
                    "Invalid placeholder \"{offending}\" in URI template \"{template}\""
                )))
            },
        }
    }

    /// The parsed instruction list.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Names of all parameters the template refers to.
    pub fn params(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Param { name, .. } => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Substitute parameters.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::Template`] if a parameter is missing or a value
    /// cannot be converted as its format specification requires.
    ///
    /// # Examples
    ///
    /// ```
    /// use marc2skos::uri_template::UriTemplate;
    /// use std::collections::HashMap;
    ///
    /// let template = UriTemplate::parse("http://id.worldcat.org/fast/{control_number[3:]:d}").unwrap();
    /// let params = HashMap::from([("control_number", "fst00012345")]);
    /// assert_eq!(template.render(&params).unwrap(), "http://id.worldcat.org/fast/12345");
    /// ```
    pub fn render(&self, params: &HashMap<&str, &str>) -> Result<String> {
        let mut out = String::with_capacity(self.source.len() + 16);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Param {
                    name,
                    slice,
                    format,
                } => {
                    let value = params.get(name.as_str()).ok_or_else(|| {
                        MarcError::Template(format!(
                            "Missing parameter \"{name}\" for URI template \"{}\"",
                            self.source
                        ))
                    })?;
                    let value = match slice {
                        Some((start, end)) => char_slice(value, *start, *end),
                        None => (*value).to_string(),
                    };
                    match format {
                        Some(spec) if !value.is_empty() => {
                            out.push_str(&apply_format(&value, spec)?);
                        },
                        _ => out.push_str(&value),
                    }
                },
            }
        }
        Ok(out)
    }
}

impl fmt::Display for UriTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Slice by character position, clamping out-of-range bounds.
fn char_slice(value: &str, start: Option<usize>, end: Option<usize>) -> String {
    let start = start.unwrap_or(0);
    let chars = value.chars().skip(start);
    match end {
        Some(end) => chars.take(end.saturating_sub(start)).collect(),
        None => chars.collect(),
    }
}

fn pad(text: String, spec: &FormatSpec, numeric: bool) -> String {
    let width = spec.width.unwrap_or(0);
    let len = text.chars().count();
    if len >= width {
        return text;
    }
    let fill = width - len;
    if spec.zero_pad && numeric {
        match text.strip_prefix('-') {
            Some(digits) => format!("-{}{digits}", "0".repeat(fill)),
            None => format!("{}{text}", "0".repeat(fill)),
        }
    } else if numeric {
        format!("{}{text}", " ".repeat(fill))
    } else {
        format!("{text}{}", " ".repeat(fill))
    }
}

fn apply_format(value: &str, spec: &FormatSpec) -> Result<String> {
    match spec.kind {
        FormatKind::Integer => {
            let number: i64 = value.trim().parse().map_err(|_| {
                MarcError::Template(format!("Cannot format \"{value}\" as an integer"))
            })?;
            Ok(pad(number.to_string(), spec, true))
        },
        FormatKind::Float => {
            let number: f64 = value.trim().parse().map_err(|_| {
                MarcError::Template(format!("Cannot format \"{value}\" as a number"))
            })?;
            let precision = spec.precision.unwrap_or(6);
            Ok(pad(format!("{number:.precision$}"), spec, true))
        },
        FormatKind::Str => {
            let text = match spec.precision {
                Some(max) => value.chars().take(max).collect(),
                None => value.to_string(),
            };
            Ok(pad(text, spec, false))
        },
    }
}
