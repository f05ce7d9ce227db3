#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # marc2skos: MARC21 Classification and Authority records as SKOS
//!
//! Decodes MARC21 Classification records (leader/06 `w`) and Authority
//! records (leader/06 `z`), serialized as MARCXML, into SKOS concepts with
//! URIs minted from per-vocabulary URI templates.
//!
//! ## Quick Start
//!
//! ```
//! use marc2skos::process::{process_records, ProcessOptions};
//! use marc2skos::{marcxml, Vocabularies};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let records = marcxml::parse_str(r#"
//!   <record xmlns="http://www.loc.gov/MARC21/slim">
//!     <leader>00000nw  a2200000n  4500</leader>
//!     <controlfield tag="008">100414bbaaaaaa</controlfield>
//!     <datafield tag="084" ind1="0" ind2=" ">
//!       <subfield code="a">ddc</subfield>
//!       <subfield code="c">23no</subfield>
//!     </datafield>
//!     <datafield tag="153" ind1=" " ind2=" ">
//!       <subfield code="z">3B</subfield>
//!       <subfield code="a">81</subfield>
//!       <subfield code="c">89</subfield>
//!       <subfield code="j">Forfattere</subfield>
//!     </datafield>
//!   </record>"#)?;
//!
//! let vocabularies = Vocabularies::bundled()?;
//! let concepts = process_records(records, &vocabularies, &ProcessOptions::default());
//! assert_eq!(concepts[0].uri, "http://dewey.info/class/3B--81-89/e23/");
//! assert_eq!(concepts[0].display_notation().as_deref(), Some("T3B--81-89"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`marcxml`], [`record`], [`leader`]: reading MARCXML into records
//! - [`fixed_field`]: the 008 field of classification records
//! - [`notation`]: class numbers from the 153 field
//! - [`synthesis`]: components of synthesized numbers (765)
//! - [`uri_template`], [`concept_scheme`], [`vocabularies`]: URI minting
//! - [`classification`], [`authority`]: record assembly into a [`Concept`]
//! - [`process`]: options and batch processing
//! - `skos` (feature `rdf`): RDF output
//! - [`logging`]: duplicate-suppressing log setup

pub mod authority;
pub mod classification;
pub mod concept;
pub mod concept_scheme;
pub mod error;
pub mod fixed_field;
pub mod language;
pub mod leader;
pub mod logging;
pub mod marcxml;
pub mod notation;
pub mod process;
pub mod record;
#[cfg(feature = "rdf")]
pub mod skos;
pub mod synthesis;
pub mod text;
pub mod uri_template;
pub mod vocabularies;

pub use classification::ClassificationRecord;
pub use concept::{Concept, ConceptRelation, Relation};
pub use concept_scheme::{ConceptScheme, UriParams, UriRole};
pub use error::{MarcError, Result};
pub use leader::{Leader, RecordKind};
pub use process::{process_record, process_records, process_records_parallel, ProcessOptions};
pub use record::{Field, FieldBuilder, Record, RecordBuilder, Subfield};
pub use vocabularies::{DefaultScheme, Vocabularies};
