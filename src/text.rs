//! Assembling labels and notes from subfields.

use crate::record::Field;

/// Subfields used for notes unless told otherwise.
pub const DEFAULT_NOTE_CODES: &[char] = &['a', 'c', 'i', 't', 'x'];

/// Subfields that make up a heading.
pub const HEADING_CODES: &[char] = &['a', 'd', 'x', 'y', 'z', 'v'];

/// Characters that attach to the preceding text without a space.
const NO_SPACE_BEFORE: &[char] = &[
    '.', '?', '#', '@', '+', ',', '<', '>', '%', '~', '`', '!', '$', '^', '&', '(', ')', ':', ';',
    ']',
];

/// Join the subfields of a note field into running text.
///
/// `$c` ends a number span and is joined with a hyphen. Other values are
/// separated by a space unless they start with punctuation.
///
/// ```
/// use marc2skos::text::{stringify, DEFAULT_NOTE_CODES};
/// use marc2skos::Field;
///
/// let field = Field::builder("253".to_string(), '0', ' ')
///     .subfield_str('t', "Vitenskap og lærdom")
///     .subfield_str('i', ", se")
///     .subfield_str('a', "001.2")
///     .subfield_str('9', "ess=nse")
///     .build();
/// assert_eq!(stringify(&field, DEFAULT_NOTE_CODES), "Vitenskap og lærdom, se 001.2");
/// ```
#[must_use]
pub fn stringify(field: &Field, codes: &[char]) -> String {
    field
        .subfields()
        .filter(|sf| codes.contains(&sf.code))
        .fold(String::new(), |mut label, sf| {
            if sf.code == 'c' {
                label.push('-');
            } else if !label.is_empty()
                && !sf
                    .value
                    .chars()
                    .next()
                    .is_some_and(|c| NO_SPACE_BEFORE.contains(&c))
            {
                label.push(' ');
            }
            label.push_str(&sf.value);
            label
        })
}

/// Build a heading label from `$a $d $x $y $z $v`.
///
/// Dates (`$d`) go in parentheses unless the text before them ends in a
/// comma or semicolon; subdivisions are joined with `--`.
///
/// ```
/// use marc2skos::text::heading_label;
/// use marc2skos::Field;
///
/// let field = Field::builder("750".to_string(), ' ', '7')
///     .subfield_str('a', "Analytisk kjemi")
///     .subfield_str('x', "organisk kjemi")
///     .build();
/// assert_eq!(heading_label(&field), "Analytisk kjemi--organisk kjemi");
/// ```
#[must_use]
pub fn heading_label(field: &Field) -> String {
    field
        .subfields()
        .filter(|sf| HEADING_CODES.contains(&sf.code))
        .fold(String::new(), |mut label, sf| {
            let (prefix, suffix) = if label.is_empty() {
                ("", "")
            } else if sf.code == 'd' && !label.ends_with([',', ';']) {
                (" (", ")")
            } else if matches!(sf.code, 'x' | 'y' | 'z' | 'v') {
                ("--", "")
            } else {
                (" ", "")
            };
            label.push_str(prefix);
            label.push_str(&sf.value);
            label.push_str(suffix);
            label
        })
}

/// Uppercase the first character and lowercase the rest.
#[must_use]
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(tag: &str, subfields: &[(char, &str)]) -> Field {
        subfields
            .iter()
            .fold(Field::builder(tag.to_string(), ' ', ' '), |b, (code, value)| {
                b.subfield_str(*code, value)
            })
            .build()
    }

    #[test]
    fn test_see_also_note() {
        let f = field(
            "353",
            &[
                ('i', "Se også"),
                ('a', "900"),
                ('i', "for en"),
                ('t', "bred beskrivelse av situasjon og vilkår for intellektuell virksomhet"),
                ('9', "ess=nsa"),
            ],
        );
        assert_eq!(
            stringify(&f, DEFAULT_NOTE_CODES),
            "Se også 900 for en bred beskrivelse av situasjon og vilkår for intellektuell virksomhet"
        );
    }

    #[test]
    fn test_note_with_number_range() {
        let f = field(
            "253",
            &[
                ('i', "Klassifiser"),
                ('t', "andre bestemte internasjonale språk"),
                ('i', "med språket i"),
                ('a', "420"),
                ('c', "490"),
                ('i', ", f.eks."),
                ('t', "latin som et diplomatspråk"),
                ('e', "470"),
                ('i', ","),
                ('t', "swahili som et lingua franca"),
                ('e', "496.392"),
            ],
        );
        assert_eq!(
            stringify(&f, DEFAULT_NOTE_CODES),
            "Klassifiser andre bestemte internasjonale språk med språket i 420-490, f.eks. \
             latin som et diplomatspråk, swahili som et lingua franca"
        );
    }

    #[test]
    fn test_complex_note() {
        let f = field(
            "680",
            &[
                ('i', "Inkluderer:"),
                ('t', "Case-studier"),
                ('i', "[tidligere"),
                ('x', "001.432"),
                ('i', "];"),
                ('t', "utvalgsteknikker"),
                ('i', ";"),
                ('t', "rundspørringer"),
                ('i', ","),
                ('t', "intervjuer"),
            ],
        );
        assert_eq!(
            stringify(&f, DEFAULT_NOTE_CODES),
            "Inkluderer: Case-studier [tidligere 001.432]; utvalgsteknikker; rundspørringer, intervjuer"
        );
    }

    #[test]
    fn test_selected_codes_only() {
        let f = field("678", &[('a', "Født 1900"), ('b', "Død 1980"), ('i', "x")]);
        assert_eq!(stringify(&f, &['a', 'b']), "Født 1900 Død 1980");
        assert_eq!(stringify(&f, &['q']), "");
    }

    #[test]
    fn test_heading_with_dates() {
        let f = field("100", &[('a', "Ibsen, Henrik"), ('d', "1828-1906")]);
        assert_eq!(heading_label(&f), "Ibsen, Henrik (1828-1906)");

        let f = field("100", &[('a', "Ibsen, Henrik,"), ('d', "1828-1906")]);
        assert_eq!(heading_label(&f), "Ibsen, Henrik, 1828-1906");
    }

    #[test]
    fn test_heading_subdivisions() {
        let f = field(
            "150",
            &[('a', "Engelske almanakker"), ('z', "New Zealand"), ('v', "Periodika")],
        );
        assert_eq!(heading_label(&f), "Engelske almanakker--New Zealand--Periodika");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("addisjon"), "Addisjon");
        assert_eq!(capitalize("IBM System"), "Ibm system");
        assert_eq!(capitalize(""), "");
    }
}
