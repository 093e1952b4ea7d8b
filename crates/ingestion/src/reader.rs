//! Source extract reading.
//!
//! Reads one CSV extract into a named [`RawBatch`]. Finding the extract files
//! is the caller's job; this module only turns bytes into raw records.

use morsel_core::{Error, RawRecord, RecordError, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Columns every extract header must carry. Order does not matter and extra
/// columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 5] = ["product", "quantity", "price", "date", "region"];

/// All rows of one source extract.
#[derive(Debug, Clone, Default)]
pub struct RawBatch {
    /// Batch name used in logs and errors (usually the file name).
    pub name: String,
    /// Rows that decoded into raw records.
    pub records: Vec<RawRecord>,
    /// Rows that could not be decoded at all, with their line numbers.
    pub unreadable: Vec<(u64, RecordError)>,
}

impl RawBatch {
    /// Build a batch from in-memory records.
    pub fn new(name: impl Into<String>, records: Vec<RawRecord>) -> Self {
        Self {
            name: name.into(),
            records,
            unreadable: Vec::new(),
        }
    }

    /// Total rows seen, decodable or not.
    pub fn row_count(&self) -> usize {
        self.records.len() + self.unreadable.len()
    }
}

/// Read one extract from any reader.
///
/// A missing required header column or an I/O failure fails the whole batch.
/// A row with the wrong number of fields is kept as an unreadable row.
pub fn read_batch<R: Read>(name: impl Into<String>, reader: R) -> Result<RawBatch> {
    let name = name.into();
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| Error::batch(&name, e.to_string()))?
        .clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .into_iter()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        return Err(Error::batch(
            &name,
            format!("missing required column(s): {}", missing.join(", ")),
        ));
    }

    let mut batch = RawBatch {
        name,
        ..RawBatch::default()
    };

    for result in reader.records() {
        let row = match result {
            Ok(row) => row,
            Err(e) if e.is_io_error() => return Err(Error::batch(&batch.name, e.to_string())),
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                batch.unreadable.push((line, RecordError::Unreadable(e.to_string())));
                continue;
            }
        };

        let line = row.position().map(|p| p.line()).unwrap_or(0);
        match row.deserialize::<RawRecord>(Some(&headers)) {
            Ok(mut record) => {
                record.line = line;
                batch.records.push(record);
            }
            Err(e) => batch.unreadable.push((line, RecordError::Unreadable(e.to_string()))),
        }
    }

    debug!(
        batch = %batch.name,
        records = batch.records.len(),
        unreadable = batch.unreadable.len(),
        "batch read"
    );
    Ok(batch)
}

/// Read one extract file. The batch is named after the file name.
pub fn read_batch_file(path: impl AsRef<Path>) -> Result<RawBatch> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let file = File::open(path).map_err(|e| Error::batch(&name, e.to_string()))?;
    read_batch(name, file)
}
