//! Core types and configuration for the morsel-sales system.
//!
//! This crate provides what every other crate shares:
//! - Record types (raw rows, line items, aggregated points, regions, scopes)
//! - The canonical dataset and its CSV artifact
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod dataset;
pub mod error;
pub mod types;

pub use config::Config;
pub use dataset::CanonicalDataset;
pub use error::{Error, RecordError, Result};
pub use types::*;
