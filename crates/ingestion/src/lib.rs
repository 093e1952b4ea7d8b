//! Data ingestion and normalization for the morsel-sales system.
//!
//! This crate handles:
//! - Source extract reading (CSV into raw batches)
//! - Record normalization (price parsing, sales derivation, product filter)
//! - The batch pipeline that merges everything into the canonical dataset

pub mod normalizer;
pub mod pipeline;
pub mod reader;

pub use normalizer::RecordNormalizer;
pub use pipeline::{BatchReport, PipelineRun, SalesPipeline};
pub use reader::{read_batch, read_batch_file, RawBatch};
