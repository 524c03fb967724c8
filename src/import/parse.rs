// src/import/parse.rs
//
// Turns uploaded text into header-keyed rows. Structural problems reject the
// whole file before any row is looked at.

use crate::domain::normalize::RawRow;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq)]
pub enum FileError {
    #[error("No file provided")]
    Missing,
    #[error("Only CSV or Excel files are supported")]
    UnsupportedType,
    #[error("File is empty")]
    Empty,
    #[error("Invalid CSV format. Please check your file structure.")]
    InvalidCsv,
    #[error("No data found in CSV file")]
    NoRows,
    #[error("File contains more than {0} rows")]
    TooManyRows(usize),
}

const ACCEPTED_MIME: &[&str] = &[
    "text/csv",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
];

const ACCEPTED_EXT: &[&str] = &[".csv", ".xls", ".xlsx"];

/// A file passes when either its declared type or its name looks like a spreadsheet.
pub fn check_file_type(content_type: Option<&str>, file_name: &str) -> Result<(), FileError> {
    let mime_ok = content_type
        .and_then(|ct| ct.parse::<mime::Mime>().ok())
        .map(|m| ACCEPTED_MIME.contains(&m.essence_str()))
        .unwrap_or(false);

    let name = file_name.to_ascii_lowercase();
    let ext_ok = ACCEPTED_EXT.iter().any(|ext| name.ends_with(ext));

    if mime_ok || ext_ok {
        Ok(())
    } else {
        Err(FileError::UnsupportedType)
    }
}

/// Parses CSV text with a header line. Cells are trimmed, blank lines skipped,
/// and every record must have as many cells as the header.
pub fn parse_rows(text: &str, max_rows: usize) -> Result<Vec<RawRow>, FileError> {
    let text = text.trim_start_matches('\u{feff}');
    if text.trim().is_empty() {
        return Err(FileError::Empty);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| {
            debug!(error = %e, "csv header rejected");
            FileError::InvalidCsv
        })?
        .clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| {
            debug!(error = %e, "csv record rejected");
            FileError::InvalidCsv
        })?;

        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect();
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(FileError::NoRows);
    }
    if rows.len() > max_rows {
        return Err(FileError::TooManyRows(max_rows));
    }
    Ok(rows)
}
