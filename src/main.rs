use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::ArgAction;
use marc2skos::concept_scheme::SchemeKind;
use marc2skos::skos::{write_concepts, OutputFormat};
use marc2skos::{logging, marcxml, process_records, process_records_parallel};
use marc2skos::{DefaultScheme, ProcessOptions, Vocabularies};
use tracing::{info, warn};

/// Convert MARC21 Classification and Authority records (MARCXML) to SKOS.
#[derive(Debug, clap::Parser)]
#[command(version, about)]
struct Cli {
    /// Input MARCXML file (may be gzipped)
    infile: Option<PathBuf>,

    /// Output file, `-` or absent for stdout
    outfile: Option<PathBuf>,

    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Output format
    #[arg(short, long = "outformat", value_name = "FORMAT", value_enum, default_value_t)]
    outformat: OutputFormat,

    /// URI template for all records, e.g. `http://example.org/{object}`
    #[arg(long = "uri", value_name = "TEMPLATE")]
    base_uri: Option<String>,

    /// Concept scheme for all records: a known scheme code or a URI
    /// template (use {edition} for the edition)
    #[arg(long = "scheme", value_name = "SCHEME")]
    scheme: Option<String>,

    /// Replacement for whitespace in URIs minted from --uri
    #[arg(long, value_name = "CHAR")]
    whitespace: Option<String>,

    /// Additional vocabulary table (YAML), overriding bundled entries
    #[arg(long, value_name = "FILE")]
    vocabularies: Option<PathBuf>,

    /// Include altlabels (from 7XX or 4XX)
    #[arg(long, visible_alias = "indexterms")]
    altlabels: bool,

    /// Include note fields
    #[arg(long)]
    notes: bool,

    /// Include component information from 765
    #[arg(long)]
    components: bool,

    /// Include add table numbers (notations containing a colon)
    #[arg(long)]
    include_add_table_numbers: bool,

    /// Skip classification records
    #[arg(long)]
    skip_classification: bool,

    /// Skip authority records
    #[arg(long)]
    skip_authority: bool,

    /// Process records on all cores
    #[arg(long)]
    parallel: bool,

    /// List known concept schemes and exit
    #[arg(short, long)]
    list_schemes: bool,
}

impl Cli {
    fn run(self) -> anyhow::Result<()> {
        logging::init(self.verbose)?;

        let vocabularies = self.vocabularies()?;

        if self.list_schemes {
            let stdout = io::stdout();
            return list_schemes(&mut stdout.lock(), &vocabularies).context("Failed to write scheme list");
        }

        let Some(infile) = self.infile.as_deref() else {
            bail!("Filename not specified");
        };

        let options = ProcessOptions::new()
            .with_altlabels(self.altlabels)
            .with_notes(self.notes)
            .with_components(self.components)
            .with_add_table_numbers(self.include_add_table_numbers)
            .with_skip_classification(self.skip_classification)
            .with_skip_authority(self.skip_authority);

        info!("Parsing: {}", infile.display());
        let records = marcxml::read_file(infile)
            .with_context(|| format!("Failed to read {}", infile.display()))?;
        let concepts = if self.parallel {
            process_records_parallel(records, &vocabularies, &options)
        } else {
            process_records(records, &vocabularies, &options)
        };

        if concepts.is_empty() {
            warn!("RDF result is empty!");
            return Ok(());
        }

        match self.outfile.as_deref().filter(|path| *path != Path::new("-")) {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                write_concepts(BufWriter::new(file), &concepts, self.outformat)?;
                info!("Wrote {}: {}", self.outformat, path.display());
            },
            None => {
                let stdout = io::stdout();
                write_concepts(BufWriter::new(stdout.lock()), &concepts, self.outformat)?;
            },
        }
        Ok(())
    }

    fn vocabularies(&self) -> anyhow::Result<Vocabularies> {
        let mut vocabularies = Vocabularies::bundled()?;
        if let Some(path) = self.vocabularies.as_deref() {
            let user = Vocabularies::from_path(path)
                .with_context(|| format!("Failed to load vocabularies from {}", path.display()))?;
            vocabularies = vocabularies.merge(user);
        }
        let default = DefaultScheme {
            generic: self.base_uri.clone(),
            scheme: self.scheme.clone(),
            whitespace: self.whitespace.clone(),
            ..DefaultScheme::default()
        };
        Ok(vocabularies.with_default_scheme(default)?)
    }
}

fn list_schemes(out: &mut impl Write, vocabularies: &Vocabularies) -> io::Result<()> {
    writeln!(out, "Classification schemes:")?;
    for scheme in vocabularies.of_kind(SchemeKind::Classification) {
        writeln!(out, "- {scheme}")?;
    }
    writeln!(out, "Authority vocabularies:")?;
    for scheme in vocabularies.of_kind(SchemeKind::Subject) {
        writeln!(out, "- {scheme}")?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    <Cli as clap::Parser>::parse().run()
}
