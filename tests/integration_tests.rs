//! Integration tests for record conversion

mod common;

use common::{concept, full_options, process_fixture, process_xml, vocabularies, vocabularies_with_uri};
use marc2skos::concept::Relation;
use marc2skos::fixed_field::RecordType;
use marc2skos::{marcxml, process_record, MarcError, ProcessOptions};

#[test]
fn test_fixture_publishes_only_public_records() {
    let concepts = process_fixture("ddc23no.xml", &ProcessOptions::default());
    let uris: Vec<_> = concepts.iter().map(|c| c.uri.as_str()).collect();
    assert_eq!(
        uris,
        vec![
            "http://dewey.info/class/543.17/e23/",
            "http://dewey.info/class/306.6804/e23/",
            "http://dewey.info/class/2--481/e23/",
        ]
    );
}

#[test]
fn test_add_table_numbers_on_request() {
    let options = ProcessOptions::new().with_add_table_numbers(true);
    let concepts = process_fixture("ddc23no.xml", &options);
    let add_table = concept(&concepts, "http://dewey.info/class/811-818:2;4/e23/");
    assert_eq!(add_table.relations.len(), 1);
    assert_eq!(add_table.relations[0].uri, "http://dewey.info/class/811-818/e23/");
    assert_eq!(add_table.relations[0].relation, Relation::Broader);
    // Historical numbers stay hidden
    assert!(!concepts
        .iter()
        .any(|c| c.control_number.as_deref() == Some("ocd00222222")));
}

#[test]
fn test_schedule_record() {
    let concepts = process_fixture("ddc23no.xml", &full_options());
    let c = concept(&concepts, "http://dewey.info/class/543.17/e23/");

    assert_eq!(c.notation.as_deref(), Some("543.17"));
    assert_eq!(c.pref_label.as_deref(), Some("Organisk kjemi"));
    assert_eq!(c.lang, "nb");
    assert_eq!(c.control_number.as_deref(), Some("ocd00146196"));
    assert_eq!(c.control_number_identifier.as_deref(), Some("OCoLC-D"));
    assert_eq!(c.scheme_uris, vec!["http://dewey.info/scheme/edition/e23/"]);
    assert!(!c.is_top_concept);
    assert!(c.modified.is_some());

    assert_eq!(
        c.alt_labels,
        vec![
            "Analytisk kjemi--organisk kjemi",
            "Kjemisk analyse--organisk kjemi",
            "Organisk kjemi--analytisk kjemi",
        ]
    );
    assert_eq!(
        c.notes.editorial_note,
        vec!["Klassifiser analyse av bestemte stoffer i 543.2"]
    );
    assert_eq!(c.notes.scope_note, vec!["Her: analyse av organiske forbindelser"]);
    assert_eq!(
        c.web_dewey_extras.get("classHere"),
        Some(&vec!["Analyse av organiske forbindelser".to_string()])
    );

    let relations: Vec<_> = c.relations.iter().map(|r| (&r.relation, r.uri.as_str())).collect();
    assert_eq!(
        relations,
        vec![
            (&Relation::Broader, "http://dewey.info/class/543.1/e23/"),
            (&Relation::CloseMatch, "http://data.ub.uio.no/ddcri/ddcri00012345"),
        ]
    );
}

#[test]
fn test_components() {
    let concepts = process_fixture("ddc23no.xml", &full_options());
    let c = concept(&concepts, "http://dewey.info/class/306.6804/e23/");
    let components: Vec<_> = c
        .components
        .iter()
        .map(|component| component.uri.as_deref())
        .collect();
    assert_eq!(
        components,
        vec![
            Some("http://dewey.info/class/306.6/e23/"),
            Some("http://dewey.info/class/280.4/e23/"),
        ]
    );

    let without = process_fixture("ddc23no.xml", &ProcessOptions::default());
    assert!(concept(&without, &c.uri).components.is_empty());
}

#[test]
fn test_table_record() {
    let concepts = process_fixture("ddc23no.xml", &ProcessOptions::default());
    let c = concept(&concepts, "http://dewey.info/class/2--481/e23/");
    assert_eq!(c.record_type, Some(RecordType::Table));
    assert_eq!(c.table.as_deref(), Some("2"));
    assert_eq!(c.display_notation().as_deref(), Some("T2--481"));
    assert_eq!(
        c.scheme_uris,
        vec![
            "http://dewey.info/table/2/e23/",
            "http://dewey.info/scheme/edition/e23/"
        ]
    );
    assert_eq!(c.relations[0].uri, "http://dewey.info/class/2--48/e23/");
}

#[test]
fn test_invalid_records_are_reported() {
    let records = marcxml::read_file(common::fixture("ddc23no.xml")).unwrap();
    let errors: Vec<MarcError> = records
        .into_iter()
        .filter_map(|record| {
            record
                .and_then(|r| process_record(&r, &vocabularies(), &ProcessOptions::default()))
                .err()
        })
        .collect();
    let numbers: Vec<_> = errors.iter().map(MarcError::control_number).collect();
    assert_eq!(numbers, vec![Some("ocd00333333"), Some("bib00000001")]);
    assert!(errors
        .iter()
        .all(|e| matches!(e, MarcError::InvalidRecord { .. })));
}

#[test]
fn test_generic_uri_template() {
    let concepts = process_xml(
        r#"<marc:record xmlns:marc="http://www.loc.gov/MARC21/slim">
            <marc:leader>00000nw  a2200000n  4500</marc:leader>
            <marc:datafield tag="153" ind1=" " ind2=" ">
              <marc:subfield code="a">003.5</marc:subfield>
              <marc:subfield code="e">003</marc:subfield>
              <marc:subfield code="h">Generalities</marc:subfield>
              <marc:subfield code="h">Systems</marc:subfield>
              <marc:subfield code="j">Theory of communication and control</marc:subfield>
            </marc:datafield>
          </marc:record>"#,
        &vocabularies_with_uri("http://test/{object}"),
        &ProcessOptions::default(),
    );
    assert_eq!(concepts.len(), 1);
    let c = &concepts[0];
    assert_eq!(c.uri, "http://test/003.5");
    assert_eq!(c.scheme_uris, vec!["http://test/"]);
    assert_eq!(c.relations[0].uri, "http://test/003");
    assert_eq!(c.pref_label.as_deref(), Some("Theory of communication and control"));
    assert_eq!(c.lang, "en");
    assert!(c.control_number.is_none());
    assert!(c.created.is_none());
}

#[test]
fn test_cataloguing_language() {
    let concepts = process_xml(
        r#"<marc:record xmlns:marc="http://www.loc.gov/MARC21/slim">
            <marc:leader>00000nw  a2200000n  4500</marc:leader>
            <marc:datafield tag="040" ind2=" " ind1=" ">
              <marc:subfield code="a">OCLCD</marc:subfield>
              <marc:subfield code="b">nob</marc:subfield>
              <marc:subfield code="c">OCLCD</marc:subfield>
            </marc:datafield>
            <marc:datafield tag="153" ind2=" " ind1=" ">
              <marc:subfield code="a">564.58</marc:subfield>
              <marc:subfield code="e">564.5</marc:subfield>
              <marc:subfield code="j">Decapoda (tiarmede blekkspruter)</marc:subfield>
            </marc:datafield>
          </marc:record>"#,
        &vocabularies_with_uri("http://test/{object}"),
        &ProcessOptions::default(),
    );
    assert_eq!(concepts[0].uri, "http://test/564.58");
    assert_eq!(concepts[0].lang, "nb");
}

#[test]
fn test_authority_fixture() {
    let concepts = process_fixture("authorities.xml", &full_options());
    assert_eq!(concepts.len(), 2);

    let real = concept(&concepts, "http://data.ub.uio.no/realfagstermer/c004711");
    assert_eq!(real.pref_label.as_deref(), Some("Analytisk kjemi"));
    assert_eq!(real.alt_labels, vec!["Kjemisk analyse"]);
    assert_eq!(real.notes.definition, vec!["Kjemisk analyse av stoffer"]);
    let relations: Vec<_> = real.relations.iter().map(|r| (&r.relation, r.uri.as_str())).collect();
    assert_eq!(
        relations,
        vec![
            (&Relation::ExactMatch, "http://dewey.info/class/543.17/e23/"),
            (&Relation::Broader, "http://data.ub.uio.no/realfagstermer/c000123"),
            (&Relation::CloseMatch, "http://id.loc.gov/authorities/subjects/sh85022986"),
        ]
    );

    let humord = concept(&concepts, "http://data.ub.uio.no/humord/c00042");
    assert!(humord.deprecated);
    // udc has no URI pattern, so the 080 link is dropped
    assert!(humord.relations.is_empty());
}

#[test]
fn test_skip_options() {
    let only_authorities = ProcessOptions::new().with_skip_classification(true);
    assert!(process_fixture("ddc23no.xml", &only_authorities).is_empty());
    assert_eq!(process_fixture("authorities.xml", &only_authorities).len(), 2);

    let only_classification = ProcessOptions::new().with_skip_authority(true);
    assert!(process_fixture("authorities.xml", &only_classification).is_empty());
}

#[test]
fn test_gzipped_input() {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    let xml = std::fs::read(common::fixture("authorities.xml")).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("authorities.xml.gz");
    let mut encoder = GzEncoder::new(std::fs::File::create(&path).unwrap(), Compression::default());
    encoder.write_all(&xml).unwrap();
    encoder.finish().unwrap();

    let records = marcxml::read_file(&path).unwrap();
    assert_eq!(records.len(), 3);
}
