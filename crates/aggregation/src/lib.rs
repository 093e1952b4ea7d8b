//! Aggregation for the morsel-sales system.
//!
//! This crate handles:
//! - Daily grouping of the canonical dataset per scope (all regions or one)
//! - Series summaries (total, peak)
//! - Before/after comparison around a pivot date

pub mod aggregator;
pub mod summary;

pub use aggregator::{aggregate, SalesAggregator};
pub use summary::{PeriodComparison, SeriesSummary};
