//! The canonical dataset and its CSV artifact.
//!
//! This is the only boundary between ingestion and querying: the pipeline
//! writes it once, the aggregator reads it, and nothing downstream ever looks
//! at raw extracts again.

use crate::error::{Error, Result};
use crate::types::LineItem;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::info;

/// Artifact header, in column order.
pub const ARTIFACT_HEADER: [&str; 3] = ["sales", "date", "region"];

/// Date-ordered, immutable collection of line items.
///
/// Cloning shares the underlying slice, so one built dataset can serve any
/// number of concurrent readers.
///
/// Invariant: the sum of all `sales` fits in a [`Decimal`]. Sales are never
/// negative, so every per-date, per-region or per-period sum over the dataset
/// fits too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalDataset {
    items: Arc<[LineItem]>,
    total_sales: Decimal,
}

impl CanonicalDataset {
    /// Build from line items. Items are stably sorted by date, so items on the
    /// same date keep their input order.
    ///
    /// Fails with [`Error::Data`] if the grand total of `sales` overflows.
    pub fn from_items(mut items: Vec<LineItem>) -> Result<Self> {
        let total_sales = items
            .iter()
            .try_fold(Decimal::ZERO, |acc, item| acc.checked_add(item.sales()))
            .ok_or_else(|| {
                Error::data(format!(
                    "total sales over {} line items exceeds the decimal range",
                    items.len()
                ))
            })?;

        items.sort_by_key(|item| item.date());
        Ok(Self {
            items: items.into(),
            total_sales,
        })
    }

    /// Sum of `sales` over every item.
    #[inline]
    pub fn total_sales(&self) -> Decimal {
        self.total_sales
    }

    #[inline]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Write the artifact as CSV (`sales,date,region`).
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
        writer.write_record(ARTIFACT_HEADER)?;
        for item in self.items.iter() {
            writer.serialize(item)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Read an artifact from CSV.
    ///
    /// The header must be exactly `sales,date,region`. Negative sales are
    /// rejected. Date order is restored if the file was edited out of order.
    pub fn read_csv<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(reader);

        let headers = reader.headers()?;
        if headers.iter().ne(ARTIFACT_HEADER) {
            return Err(Error::data(format!(
                "artifact header must be {}, found {}",
                ARTIFACT_HEADER.join(","),
                headers.iter().collect::<Vec<_>>().join(",")
            )));
        }

        let mut items = Vec::new();
        for result in reader.deserialize() {
            let item: LineItem = result?;
            if item.sales().is_sign_negative() && !item.sales().is_zero() {
                return Err(Error::data(format!(
                    "negative sales {} on {} in artifact",
                    item.sales(),
                    item.date()
                )));
            }
            items.push(item);
        }

        Self::from_items(items)
    }

    /// Write the artifact to `path`, replacing any previous build.
    ///
    /// The rows go to a temporary file in the same directory, which is renamed
    /// over `path` only once fully written. A failed save leaves the previous
    /// artifact untouched.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        self.write_csv(tmp.as_file_mut())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        info!(path = %path.display(), rows = self.len(), "canonical artifact written");
        Ok(())
    }

    /// Load the artifact from `path`.
    ///
    /// A missing file is [`Error::MissingArtifact`]; a file with only a header
    /// loads as an empty dataset.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::MissingArtifact {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => return Err(e.into()),
        };
        let dataset = Self::read_csv(file)?;
        info!(path = %path.display(), rows = dataset.len(), "canonical artifact loaded");
        Ok(dataset)
    }
}
