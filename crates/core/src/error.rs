//! Error types for the morsel-sales system.
//!
//! Two layers are kept apart:
//! - [`RecordError`] rejects a single raw record. The pipeline recovers from it
//!   by dropping the record and moving on.
//! - [`Error`] is fatal to the operation that raised it (a pipeline run, an
//!   artifact load, a scope lookup).

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the morsel-sales system.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data error (artifact content that breaks a dataset invariant).
    #[error("Data error: {0}")]
    Data(String),

    /// Every batch was inspected and none produced a line item.
    #[error("No matching data for product {product:?} in batches [{}]", .batches.join(", "))]
    NoMatchingData {
        product: String,
        batches: Vec<String>,
    },

    /// The canonical artifact has not been built yet.
    #[error("Canonical artifact not found at {}", .path.display())]
    MissingArtifact { path: PathBuf },

    /// A source extract could not be read as a batch at all.
    #[error("Batch {batch:?} unreadable: {reason}")]
    Batch { batch: String, reason: String },

    /// Scope value outside the recognized selector set.
    #[error("Unknown scope {0:?} (expected all, north, east, south or west)")]
    UnknownScope(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading/writing error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a data error.
    pub fn data(msg: impl Into<String>) -> Self {
        Error::Data(msg.into())
    }

    /// Create a batch error.
    pub fn batch(batch: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Batch {
            batch: batch.into(),
            reason: reason.into(),
        }
    }
}

/// Why a single raw record was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("malformed price {0:?}")]
    MalformedPrice(String),

    #[error("malformed quantity {0:?}")]
    MalformedQuantity(String),

    #[error("malformed date {0:?}")]
    MalformedDate(String),

    #[error("unknown region {0:?}")]
    UnknownRegion(String),

    /// quantity × price does not fit in a decimal.
    #[error("sales overflow for quantity {quantity} at price {price}")]
    SalesOverflow { quantity: u64, price: String },

    /// The row itself could not be decoded (wrong field count, bad UTF-8).
    #[error("unreadable row: {0}")]
    Unreadable(String),
}

impl RecordError {
    /// Short stable name, used as a counter key in batch reports.
    pub fn kind(&self) -> &'static str {
        match self {
            RecordError::MalformedPrice(_) => "malformed_price",
            RecordError::MalformedQuantity(_) => "malformed_quantity",
            RecordError::MalformedDate(_) => "malformed_date",
            RecordError::UnknownRegion(_) => "unknown_region",
            RecordError::SalesOverflow { .. } => "sales_overflow",
            RecordError::Unreadable(_) => "unreadable",
        }
    }
}
