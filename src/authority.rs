//! Assembly of MARC21 Authority records (leader/06 = `z`).
//!
//! Authority records carry no notation; their concept URI is built from the
//! control number in the vocabulary named by 008/11 (or 040 `$f`).

use crate::concept::{add_mappings, index_terms, is_uri, Concept, ExternalLink, Relation};
use crate::concept_scheme::{UriParams, UriRole};
use crate::error::{MarcError, Result};
use crate::fixed_field::parse_created;
use crate::record::{Field, Record};
use crate::text::stringify;
use crate::vocabularies::Vocabularies;
use tracing::debug;

/// Which subfields make up each note field, and which SKOS note it becomes.
#[derive(Debug, Clone, Copy)]
enum NoteKind {
    Editorial,
    Source,
    Definition,
    Note,
    Example,
    Change,
    History,
}

const NOTE_FIELDS: &[(&str, NoteKind, &[char])] = &[
    ("667", NoteKind::Editorial, &['a']),  // Nonpublic general note
    ("670", NoteKind::Source, &['a']),     // Source data found
    ("677", NoteKind::Definition, &['a']), // Definition
    ("678", NoteKind::Note, &['a', 'b']),  // Biographical or historical data
    ("680", NoteKind::Note, &['a', 'i']),  // Public general note
    ("681", NoteKind::Example, &['a', 'i']), // Subject example tracing note
    ("682", NoteKind::Change, &['a', 'i']),  // Deleted heading information
    ("688", NoteKind::History, &['a']),      // Application history note
];

/// Class number of a 065/080/083 field: `$a`, or `$a-$b` for a span.
fn class_number(field: &Field) -> Option<String> {
    let start = field.get_subfield('a')?;
    Some(match field.get_subfield('b') {
        Some(end) => format!("{start}-{end}"),
        None => start.to_string(),
    })
}

/// Decode an authority record.
///
/// # Errors
///
/// Returns [`MarcError::UnknownScheme`] if the record's vocabulary has no
/// known URI pattern, and [`MarcError::InvalidRecord`] if the concept URI
/// cannot be built.
///
/// # Examples
///
/// ```
/// use marc2skos::{authority, marcxml, Vocabularies};
///
/// let record = marcxml::marcxml_to_record(r#"
///   <record xmlns="http://www.loc.gov/MARC21/slim">
///     <leader>00000cz  a2200000n  4500</leader>
///     <controlfield tag="001">HUME00123</controlfield>
///     <controlfield tag="008">970829nnnnnznnnn</controlfield>
///     <datafield tag="040" ind1=" " ind2=" ">
///       <subfield code="b">nob</subfield>
///       <subfield code="f">humord</subfield>
///     </datafield>
///     <datafield tag="150" ind1=" " ind2=" ">
///       <subfield code="a">Fonologi</subfield>
///     </datafield>
///   </record>"#).unwrap();
///
/// let concept = authority::parse(&record, &Vocabularies::bundled().unwrap()).unwrap();
/// assert_eq!(concept.uri, "http://data.ub.uio.no/humord/c00123");
/// assert_eq!(concept.pref_label.as_deref(), Some("Fonologi"));
/// assert_eq!(concept.lang, "nb");
/// ```
pub fn parse(record: &Record, vocabularies: &Vocabularies) -> Result<Concept> {
    let scheme = vocabularies.get_from_record(record)?;
    let mut concept = Concept::from_record_header(record);
    let cn = concept.control_number.clone();

    match scheme.uri(UriRole::Scheme, &UriParams::new()) {
        Ok(uri) if !uri.is_empty() => concept.scheme_uris.push(uri),
        Ok(_) => {},
        Err(e) => debug!("No scheme URI in {scheme}: {e}"),
    }
    concept.uri = scheme
        .uri(
            UriRole::Concept,
            &UriParams::new().with_control_number(cn.as_deref()),
        )
        .map_err(|e| match e {
            MarcError::Template(message) => MarcError::InvalidRecord {
                message,
                control_number: cn.clone(),
            },
            other => other.with_control_number(cn.as_deref()),
        })?;

    concept.deprecated = record.leader.is_deleted();
    concept.created = record
        .get_control_field("008")
        .filter(|value| !value.is_empty())
        .and_then(parse_created);

    let class_links = [
        ("065", None, None),
        ("080", Some("udc"), None),
        ("083", Some("ddc"), Some("class")),
    ];
    for (tag, fixed_code, collection) in class_links {
        let Some(field) = record.get_field(tag) else {
            continue;
        };
        let Some(number) = class_number(field) else {
            continue;
        };
        let mut params = UriParams::new().with_object(number);
        if let Some(collection) = collection {
            params = params.with_collection(collection);
        }
        let link = ExternalLink {
            scheme_code: fixed_code.or_else(|| field.get_subfield('2')),
            // 083 $2 is the DDC edition; 065 $2 is the scheme code itself.
            edition: if tag == "083" { field.get_subfield('2') } else { None },
            params,
            tag,
        };
        concept.relate_external(vocabularies, &link, Relation::ExactMatch);
    }

    if let Some(heading) = index_terms(record, '1').into_iter().last() {
        concept.pref_label = Some(heading.label);
    }
    concept.alt_labels = index_terms(record, '4')
        .into_iter()
        .map(|term| term.label)
        .collect();

    for term in index_terms(record, '5') {
        let Some(target) = term.field.get_subfield('0').filter(|v| !v.is_empty()) else {
            continue;
        };
        let relation = match (term.field.get_subfield('w'), term.field.get_subfield('4')) {
            (Some("g"), _) => Relation::Broader,
            (Some("h"), _) => Relation::Narrower,
            (Some("r"), Some(property)) if is_uri(property) => Relation::Custom(property.to_string()),
            _ => Relation::Related,
        };
        if is_uri(target) {
            concept.relate(relation, target);
        } else {
            concept.relate_in_scheme(
                &scheme,
                &UriParams::new().with_control_number(Some(target)),
                relation,
                &term.field.tag,
            );
        }
    }

    for (tag, kind, codes) in NOTE_FIELDS {
        for field in record.fields_by_tag(tag) {
            let text = stringify(field, codes);
            let notes = &mut concept.notes;
            match kind {
                NoteKind::Editorial => notes.editorial_note.push(text),
                NoteKind::Source => notes.note.push(format!("Source: {text}")),
                NoteKind::Definition => notes.definition.push(text),
                NoteKind::Note => notes.note.push(text),
                NoteKind::Example => notes.example.push(text),
                NoteKind::Change => notes.change_note.push(text),
                NoteKind::History => notes.history_note.push(text),
            }
        }
    }

    add_mappings(&mut concept, record, vocabularies);

    Ok(concept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marcxml::marcxml_to_record;

    const REALFAGSTERMER: &str = r#"<record xmlns="http://www.loc.gov/MARC21/slim">
      <leader>00000nz  a2200000n  4500</leader>
      <controlfield tag="001">REAL004711</controlfield>
      <controlfield tag="003">NO-TrBIB</controlfield>
      <controlfield tag="005">20160113123456.0</controlfield>
      <controlfield tag="008">100118|n|anznnbabn|||||||||a|a|||||d</controlfield>
      <datafield tag="040" ind1=" " ind2=" ">
        <subfield code="a">NO-TrBIB</subfield>
        <subfield code="b">nob</subfield>
        <subfield code="f">noubomn</subfield>
      </datafield>
      <datafield tag="083" ind1="0" ind2="4">
        <subfield code="a">543.17</subfield>
        <subfield code="2">23</subfield>
      </datafield>
      <datafield tag="150" ind1=" " ind2=" ">
        <subfield code="a">Analytisk kjemi</subfield>
      </datafield>
      <datafield tag="450" ind1=" " ind2=" ">
        <subfield code="a">Kjemisk analyse</subfield>
      </datafield>
      <datafield tag="550" ind1=" " ind2=" ">
        <subfield code="w">g</subfield>
        <subfield code="a">Kjemi</subfield>
        <subfield code="0">(NO-TrBIB)REAL000123</subfield>
      </datafield>
      <datafield tag="550" ind1=" " ind2=" ">
        <subfield code="a">Organisk kjemi</subfield>
        <subfield code="0">http://data.ub.uio.no/realfagstermer/c000456</subfield>
      </datafield>
      <datafield tag="550" ind1=" " ind2=" ">
        <subfield code="a">Uten lenke</subfield>
      </datafield>
      <datafield tag="670" ind1=" " ind2=" ">
        <subfield code="a">Store norske leksikon</subfield>
      </datafield>
      <datafield tag="677" ind1=" " ind2=" ">
        <subfield code="a">Kjemisk analyse av stoffer</subfield>
      </datafield>
      <datafield tag="750" ind1=" " ind2="7">
        <subfield code="a">Analytical chemistry</subfield>
        <subfield code="0">sh85022986</subfield>
        <subfield code="2">lcsh</subfield>
      </datafield>
    </record>"#;

    fn parse_xml(xml: &str) -> Result<Concept> {
        parse(&marcxml_to_record(xml).unwrap(), &Vocabularies::bundled().unwrap())
    }

    #[test]
    fn test_uris_and_labels() {
        let concept = parse_xml(REALFAGSTERMER).unwrap();
        assert_eq!(concept.uri, "http://data.ub.uio.no/realfagstermer/c004711");
        assert_eq!(concept.scheme_uris, vec!["http://data.ub.uio.no/realfagstermer/c"]);
        assert_eq!(concept.pref_label.as_deref(), Some("Analytisk kjemi"));
        assert_eq!(concept.alt_labels, vec!["Kjemisk analyse"]);
        assert_eq!(concept.control_number_identifier.as_deref(), Some("NO-TrBIB"));
        assert!(concept.created.is_some());
        assert!(concept.modified.is_some());
        assert!(!concept.deprecated);
    }

    #[test]
    fn test_relations() {
        let concept = parse_xml(REALFAGSTERMER).unwrap();
        let relations: Vec<_> = concept
            .relations
            .iter()
            .map(|r| (r.relation.clone(), r.uri.as_str()))
            .collect();
        assert_eq!(
            relations,
            vec![
                (Relation::ExactMatch, "http://dewey.info/class/543.17/e23/"),
                (Relation::Broader, "http://data.ub.uio.no/realfagstermer/c000123"),
                (Relation::Related, "http://data.ub.uio.no/realfagstermer/c000456"),
                (Relation::CloseMatch, "http://id.loc.gov/authorities/subjects/sh85022986"),
            ]
        );
    }

    #[test]
    fn test_notes() {
        let concept = parse_xml(REALFAGSTERMER).unwrap();
        assert_eq!(concept.notes.note, vec!["Source: Store norske leksikon"]);
        assert_eq!(concept.notes.definition, vec!["Kjemisk analyse av stoffer"]);
    }

    #[test]
    fn test_deleted_record_is_deprecated() {
        let xml = REALFAGSTERMER.replace("00000nz  a2200000n  4500", "00000dz  a2200000n  4500");
        assert!(parse_xml(&xml).unwrap().deprecated);
    }

    #[test]
    fn test_unspecified_vocabulary() {
        let err = parse_xml(
            r#"<record>
              <leader>00000nz  a2200000n  4500</leader>
              <controlfield tag="001">X1</controlfield>
              <controlfield tag="008">970829nnnnnnnnnn</controlfield>
            </record>"#,
        )
        .unwrap_err();
        assert!(err.is_unknown_scheme());
        assert_eq!(err.control_number(), Some("X1"));
    }
}
