//! Command line behavior
#![cfg(feature = "rdf")]

mod common;

use std::process::Command;

fn marc2skos() -> Command {
    Command::new(env!("CARGO_BIN_EXE_marc2skos"))
}

#[test]
fn test_list_schemes() {
    let output = marc2skos().arg("--list-schemes").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("Classification schemes:"));
    assert!(stdout.contains("- ddc"));
    assert!(stdout.contains("Authority vocabularies:"));
    assert!(stdout.contains("- humord"));
}

#[test]
fn test_missing_infile() {
    let output = marc2skos().output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Filename not specified"));
}

#[test]
fn test_turtle_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let outfile = dir.path().join("ddc.ttl");
    let status = marc2skos()
        .arg("--altlabels")
        .arg(common::fixture("ddc23no.xml"))
        .arg(&outfile)
        .status()
        .unwrap();
    assert!(status.success());

    let turtle = std::fs::read_to_string(&outfile).unwrap();
    assert!(turtle.contains("@prefix skos:"));
    assert!(turtle.contains("Organisk kjemi--analytisk kjemi"));
}

#[test]
fn test_ndjson_to_stdout() {
    let output = marc2skos()
        .args(["-o", "ndjson"])
        .arg(common::fixture("authorities.xml"))
        .arg("-")
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let uris: Vec<String> = stdout
        .lines()
        .map(|line| {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            value["uri"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(
        uris,
        vec![
            "http://data.ub.uio.no/realfagstermer/c004711",
            "http://data.ub.uio.no/humord/c00042",
        ]
    );
}

#[test]
fn test_empty_result_warns() {
    let dir = tempfile::tempdir().unwrap();
    let outfile = dir.path().join("none.ttl");
    let output = marc2skos()
        .arg("--skip-authority")
        .arg(common::fixture("authorities.xml"))
        .arg(&outfile)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("RDF result is empty!"));
    assert!(!outfile.exists());
}

#[test]
fn test_generic_uri_option() {
    let output = marc2skos()
        .args(["--uri", "http://example.org/{object}", "--scheme", "http://example.org/"])
        .args(["-o", "ntriples"])
        .arg(common::fixture("ddc23no.xml"))
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("<http://example.org/543.17>"));
    assert!(stdout.contains(
        "<http://example.org/543.17> <http://www.w3.org/2004/02/skos/core#inScheme> <http://example.org/>"
    ));
}
