//! Series summaries for the presentation layer.

use chrono::NaiveDate;
use morsel_core::AggregatedPoint;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Shape of one aggregated series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesSummary {
    /// Number of dates in the series.
    pub points: usize,
    /// Sum over the whole series.
    #[serde(with = "rust_decimal::serde::str")]
    pub total: Decimal,
    /// Highest daily total (earliest date wins a tie). `None` for an empty
    /// series, which renders as a flat baseline.
    pub peak: Option<AggregatedPoint>,
}

impl SeriesSummary {
    /// Summarize an aggregated series (as returned by a query).
    pub fn from_points(points: &[AggregatedPoint]) -> Self {
        let mut peak: Option<AggregatedPoint> = None;
        for p in points {
            if peak.map_or(true, |best| p.total_sales > best.total_sales) {
                peak = Some(*p);
            }
        }

        Self {
            points: points.len(),
            total: points.iter().map(|p| p.total_sales).sum(),
            peak,
        }
    }

    /// True for a series with no dates.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points == 0
    }
}

/// Sales split at a pivot date, e.g. a price change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodComparison {
    /// First day of the "after" period.
    pub pivot: NaiveDate,
    /// Sales strictly before the pivot.
    #[serde(with = "rust_decimal::serde::str")]
    pub before: Decimal,
    /// Sales on or after the pivot.
    #[serde(with = "rust_decimal::serde::str")]
    pub after: Decimal,
}

impl PeriodComparison {
    /// Split an aggregated series at `pivot`. The pivot day itself counts as
    /// "after".
    pub fn from_points(points: &[AggregatedPoint], pivot: NaiveDate) -> Self {
        let (before, after) = points.iter().fold((Decimal::ZERO, Decimal::ZERO), |(b, a), p| {
            if p.date < pivot {
                (b + p.total_sales, a)
            } else {
                (b, a + p.total_sales)
            }
        });
        Self { pivot, before, after }
    }

    /// `after - before`; positive when sales went up.
    #[inline]
    pub fn change(&self) -> Decimal {
        self.after - self.before
    }
}
