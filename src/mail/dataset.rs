use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::ParsedEmail;

use super::MailError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedRow {
    #[serde(rename = "Filename")]
    pub filename: String,
    #[serde(rename = "Processed_Body")]
    pub processed_body: String,
}

/// Writes the `Filename,Date,From,To,Subject,Body,Label` corpus file.
pub fn write_records(path: &Path, records: &[ParsedEmail]) -> Result<(), MailError> {
    write_rows(path, records)
}

pub fn write_processed(path: &Path, rows: &[ProcessedRow]) -> Result<(), MailError> {
    write_rows(path, rows)
}

pub fn read_records(path: &Path) -> Result<Vec<ParsedEmail>, MailError> {
    let csv_error = |source| MailError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::Reader::from_path(path).map_err(csv_error)?;
    reader
        .deserialize::<ParsedEmail>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(csv_error)
}

fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), MailError> {
    let csv_error = |source| MailError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(csv_error)?;
    for row in rows {
        writer.serialize(row).map_err(csv_error)?;
    }
    writer.flush().map_err(|source| MailError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}
