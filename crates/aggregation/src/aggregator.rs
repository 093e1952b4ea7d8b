//! Grouping engine.
//!
//! Every query is recomputed from the canonical dataset: no caches, no running
//! totals, no mutation. A single built dataset can be queried from any number
//! of threads at once.

use crate::summary::{PeriodComparison, SeriesSummary};
use chrono::NaiveDate;
use morsel_core::{AggregatedPoint, CanonicalDataset, Config, Result, Scope};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Sum `sales` per date over the items in `scope`, ascending by date.
///
/// A scope with no matching items yields an empty vector. Every per-date sum
/// is bounded by [`CanonicalDataset::total_sales`], which the dataset
/// guarantees fits in a decimal, so the additions cannot overflow.
pub fn aggregate(dataset: &CanonicalDataset, scope: Scope) -> Vec<AggregatedPoint> {
    let mut by_date: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for item in dataset.items().iter().filter(|item| scope.includes(item.region())) {
        *by_date.entry(item.date()).or_insert(Decimal::ZERO) += item.sales();
    }

    by_date
        .into_iter()
        .map(|(date, total_sales)| AggregatedPoint { date, total_sales })
        .collect()
}

/// Read-only query handle over one canonical dataset.
#[derive(Debug, Clone)]
pub struct SalesAggregator {
    dataset: CanonicalDataset,
}

impl SalesAggregator {
    /// Wrap a built dataset.
    pub fn new(dataset: CanonicalDataset) -> Self {
        Self { dataset }
    }

    /// Load the canonical artifact and wrap it.
    ///
    /// Fails with [`morsel_core::Error::MissingArtifact`] if the pipeline has
    /// not produced it yet.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        CanonicalDataset::load(path).map(Self::new)
    }

    /// Load the canonical artifact from the configured path.
    pub fn load_configured(config: &Config) -> Result<Self> {
        Self::load(&config.artifact.path)
    }

    /// The underlying dataset.
    pub fn dataset(&self) -> &CanonicalDataset {
        &self.dataset
    }

    /// Daily sales for `scope`, ascending by date.
    pub fn query(&self, scope: Scope) -> Vec<AggregatedPoint> {
        let points = aggregate(&self.dataset, scope);
        debug!(scope = %scope, items = self.dataset.len(), points = points.len(), "query");
        points
    }

    /// Total, peak and point count of the series for `scope`.
    pub fn summarize(&self, scope: Scope) -> SeriesSummary {
        SeriesSummary::from_points(&self.query(scope))
    }

    /// Sales before `pivot` against sales on or after it, for `scope`.
    pub fn compare_around(&self, scope: Scope, pivot: NaiveDate) -> PeriodComparison {
        PeriodComparison::from_points(&self.query(scope), pivot)
    }

    /// [`SalesAggregator::compare_around`] pivoting on the configured
    /// price-change date.
    pub fn compare_around_price_change(&self, config: &Config, scope: Scope) -> PeriodComparison {
        self.compare_around(scope, config.reporting.price_change_date)
    }
}
