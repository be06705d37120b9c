//! Raw email parsing, corpus labeling and the intermediate CSV handoff.

pub mod corpus;
pub mod dataset;
pub mod normalizer;

use std::{io, path::PathBuf};

use thiserror::Error;

pub use corpus::{label_corpus, read_emails_from_folder};
pub use dataset::{read_records, write_processed, write_records, ProcessedRow};
pub use normalizer::{clean_body, parse_email};

#[derive(Debug, Error)]
pub enum MailError {
    #[error("malformed MIME structure: {0}")]
    Mime(#[from] mailparse::MailParseError),
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to access corpus csv {path}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}
