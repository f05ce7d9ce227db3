//! Record dispatch and batch processing.
//!
//! [`process_record`] routes a record to the classification or authority
//! assembler by leader/06 and applies the [`ProcessOptions`]. The batch
//! functions log and skip records that fail, so one bad record never stops
//! a run.
//!
//! # Examples
//!
//! ```
//! use marc2skos::process::{process_records, ProcessOptions};
//! use marc2skos::{marcxml, Vocabularies};
//!
//! let records = marcxml::parse_str(r#"
//!   <collection xmlns="http://www.loc.gov/MARC21/slim">
//!     <record>
//!       <leader>00000nw  a2200000n  4500</leader>
//!       <controlfield tag="008">091203aaaaaaaa</controlfield>
//!       <datafield tag="084" ind1="0" ind2=" ">
//!         <subfield code="a">ddc</subfield>
//!         <subfield code="c">23no</subfield>
//!       </datafield>
//!       <datafield tag="153" ind1=" " ind2=" ">
//!         <subfield code="a">152</subfield>
//!         <subfield code="j">Sansing</subfield>
//!       </datafield>
//!     </record>
//!     <record>
//!       <leader>00000nam a2200000n  4500</leader>
//!     </record>
//!   </collection>"#).unwrap();
//!
//! let vocabularies = Vocabularies::bundled().unwrap();
//! let concepts = process_records(records, &vocabularies, &ProcessOptions::default());
//! assert_eq!(concepts.len(), 1);
//! assert_eq!(concepts[0].uri, "http://dewey.info/class/152/e23/");
//! ```

use crate::authority;
use crate::classification::ClassificationRecord;
use crate::concept::{Concept, Notes};
use crate::error::{MarcError, Result};
use crate::leader::RecordKind;
use crate::record::Record;
use crate::vocabularies::Vocabularies;
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Records between progress reports.
pub const PROGRESS_INTERVAL: usize = 500;

/// Switches controlling which records are processed and what is kept.
///
/// # Examples
///
/// ```
/// use marc2skos::process::ProcessOptions;
///
/// let options = ProcessOptions::new()
///     .with_altlabels(true)
///     .with_skip_authority(true);
/// assert!(options.include_altlabels);
/// assert!(!options.include_notes);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct ProcessOptions {
    /// Keep index terms (7XX or 4XX) as `skos:altLabel`
    pub include_altlabels: bool,
    /// Keep note fields
    pub include_notes: bool,
    /// Keep synthesized number components from 765
    pub include_components: bool,
    /// Publish add table numbers (notations containing `:`)
    pub include_add_table_numbers: bool,
    /// Skip classification records
    pub skip_classification: bool,
    /// Skip authority records
    pub skip_authority: bool,
}

impl ProcessOptions {
    /// Options with everything optional left out.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep or drop alternative labels.
    #[must_use]
    pub const fn with_altlabels(mut self, enabled: bool) -> Self {
        self.include_altlabels = enabled;
        self
    }

    /// Keep or drop notes.
    #[must_use]
    pub const fn with_notes(mut self, enabled: bool) -> Self {
        self.include_notes = enabled;
        self
    }

    /// Keep or drop components.
    #[must_use]
    pub const fn with_components(mut self, enabled: bool) -> Self {
        self.include_components = enabled;
        self
    }

    /// Publish add table numbers.
    #[must_use]
    pub const fn with_add_table_numbers(mut self, enabled: bool) -> Self {
        self.include_add_table_numbers = enabled;
        self
    }

    /// Skip classification records.
    #[must_use]
    pub const fn with_skip_classification(mut self, enabled: bool) -> Self {
        self.skip_classification = enabled;
        self
    }

    /// Skip authority records.
    #[must_use]
    pub const fn with_skip_authority(mut self, enabled: bool) -> Self {
        self.skip_authority = enabled;
        self
    }

    fn apply(&self, mut concept: Concept) -> Concept {
        if !self.include_altlabels {
            concept.alt_labels.clear();
        }
        if !self.include_notes {
            concept.notes = Notes::default();
        }
        if !self.include_components {
            concept.components.clear();
        }
        concept
    }
}

/// Convert a single record to a concept.
///
/// Returns `Ok(None)` for records skipped by the options and for
/// classification records that are not meant to be published.
///
/// # Errors
///
/// Returns [`MarcError::InvalidRecord`] if the record is neither a
/// classification nor an authority record, or cannot be decoded, and
/// [`MarcError::UnknownScheme`] if its vocabulary is unknown.
pub fn process_record(
    record: &Record,
    vocabularies: &Vocabularies,
    options: &ProcessOptions,
) -> Result<Option<Concept>> {
    let concept = match record.leader.kind() {
        RecordKind::Classification => {
            if options.skip_classification {
                return Ok(None);
            }
            let parsed = ClassificationRecord::parse(record, vocabularies)?;
            if !parsed.is_public(options.include_add_table_numbers) {
                return Ok(None);
            }
            parsed.concept
        },
        RecordKind::Authority => {
            if options.skip_authority {
                return Ok(None);
            }
            authority::parse(record, vocabularies)?
        },
        RecordKind::Other(_) => {
            return Err(MarcError::invalid_record(
                "Record is not a Marc21 Classification or Authority record",
            )
            .with_control_number(record.control_number()));
        },
    };
    Ok(Some(options.apply(concept)))
}

/// Log a failed record and drop it. `n` is the 1-based position in the input.
fn skip_failed(n: usize, outcome: Result<Option<Concept>>) -> Option<Concept> {
    match outcome {
        Ok(concept) => concept,
        Err(e) => {
            let record_id = e
                .control_number()
                .map_or_else(|| format!("#{n}"), str::to_string);
            warn!("Ignoring record {record_id}: {e}");
            None
        },
    }
}

/// Process records in order, logging and skipping the ones that fail.
pub fn process_records<I>(records: I, vocabularies: &Vocabularies, options: &ProcessOptions) -> Vec<Concept>
where
    I: IntoIterator<Item = Result<Record>>,
{
    let started = Instant::now();
    let mut concepts = Vec::new();
    let mut n = 0;
    for record in records {
        n += 1;
        let outcome = record.and_then(|record| process_record(&record, vocabularies, options));
        concepts.extend(skip_failed(n, outcome));
        if n % PROGRESS_INTERVAL == 0 {
            log_progress(n, started);
        }
    }
    debug!("Processed {n} records, kept {}", concepts.len());
    concepts
}

/// Process records on the rayon thread pool.
///
/// Same result as [`process_records`], in input order.
#[must_use]
pub fn process_records_parallel(
    records: Vec<Result<Record>>,
    vocabularies: &Vocabularies,
    options: &ProcessOptions,
) -> Vec<Concept> {
    let started = Instant::now();
    let total = records.len();
    let concepts: Vec<Concept> = records
        .into_par_iter()
        .enumerate()
        .filter_map(|(idx, record)| {
            let outcome = record.and_then(|record| process_record(&record, vocabularies, options));
            skip_failed(idx + 1, outcome)
        })
        .collect();
    if total >= PROGRESS_INTERVAL {
        log_progress(total, started);
    }
    debug!("Processed {total} records, kept {}", concepts.len());
    concepts
}

#[allow(clippy::cast_precision_loss)]
fn log_progress(n: usize, started: Instant) {
    let secs = started.elapsed().as_secs_f64();
    let rate = if secs > 0.0 { n as f64 / secs } else { 0.0 };
    info!("Read {n} records ({rate:.0} recs/sec)");
}
