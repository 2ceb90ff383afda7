//! Field extraction from French medical reports.
//! # Overview
//!
//! Zones of a report (the address block, the dateline, the medic and patient blocks, ...) are labeled
//! token by token by external sequence labeling models. medreport turns these label streams back into
//! structure:
//! - A [Pipeline][components::Pipeline] tokenizes text, builds the feature vectors, calls the
//!   [Tagger][tagger::Tagger] and groups the labeled tokens into [Cluster][cluster::Cluster]s.
//! - One parser per entity ([AddressParser][components::address::AddressParser],
//!   [DatelineParser][components::dateline::DatelineParser], [MedicParser][components::medic::MedicParser],
//!   [OrganizationParser][components::organization::OrganizationParser],
//!   [PatientParser][components::patient::PatientParser],
//!   [PersonNameParser][components::person_name::PersonNameParser]) aggregates the clusters into records.
//! - The same parsers write inline XML training data which can be corrected by hand and read back
//!   with the [corpus][components::corpus] reader.
//!
//! # Examples
//!
//! Extract an address, with a tagger replaying known labels:
//!
//! ```
//! use std::sync::Arc;
//! use medreport::{components::address::AddressParser, tagger::ReplayTagger};
//!
//! let tagger = ReplayTagger::new(vec![
//!     "I-<streetnumber>", "I-<streetname>", "<streetname>", "<streetname>", "<streetname>",
//!     "I-<other>", "I-<postcode>", "I-<city>",
//! ]);
//! let parser = AddressParser::new(Arc::new(tagger));
//!
//! let address = parser.process("10 rue de la Paix, 75002 Paris")?.expect("text is not empty");
//! assert_eq!(address.street_name.as_deref(), Some("rue de la Paix"));
//! assert_eq!(address.city.as_deref(), Some("Paris"));
//! # Ok::<(), medreport::Error>(())
//! ```
//!
//! Write training data for a person name:
//!
//! ```
//! use std::sync::Arc;
//! use medreport::{components::person_name::PersonNameParser, tagger::ReplayTagger};
//!
//! let tagger = ReplayTagger::new(vec!["I-<title>", "I-<forename>", "I-<surname>"]);
//! let parser = PersonNameParser::new(Arc::new(tagger));
//!
//! assert_eq!(
//!     parser.training_extraction(&["Dr Jane Smith"])?.as_deref(),
//!     Some("<name><title>Dr</title> <forename>Jane</forename> <surname>Smith</surname></name>\n")
//! );
//! # Ok::<(), medreport::Error>(())
//! ```

use std::io;

use thiserror::Error;

#[macro_use]
pub mod label;
pub mod cluster;
pub mod components;
pub mod config;
pub mod counter;
pub mod features;
pub mod lexicon;
pub mod tagger;
pub mod tokenizer;
pub mod types;
pub mod utils;

pub use components::{FieldParse, FieldParser, Model, Pipeline};

#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),
    /// (De)serialization error. Can have occured during deserialization or during serialization.
    #[error(transparent)]
    Serialization(#[from] bincode::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Tagger(#[from] tagger::Error),
    #[error(transparent)]
    Cluster(#[from] cluster::Error),
    #[error(transparent)]
    Corpus(#[from] components::corpus::Error),
    /// Any failure while extracting fields or writing training data. The cause is the source.
    #[error("An error occured while extracting fields from a medical report.")]
    Processing(#[source] Box<Error>),
}

impl Error {
    /// Wraps the error into [Error::Processing], unless it already is one.
    pub fn processing(error: Error) -> Self {
        match error {
            Error::Processing(_) => error,
            error => Error::Processing(Box::new(error)),
        }
    }
}
