//! Core data types for the morsel-sales system.

use crate::error::{Error, RecordError};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sales region. The set is closed: extracts only ever carry these four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    North,
    East,
    South,
    West,
}

impl Region {
    /// All regions, in selector order.
    pub const ALL: [Region; 4] = [Region::North, Region::East, Region::South, Region::West];

    /// Lowercase code as it appears in extracts and in the artifact.
    pub fn as_str(self) -> &'static str {
        match self {
            Region::North => "north",
            Region::East => "east",
            Region::South => "south",
            Region::West => "west",
        }
    }

    /// Capitalized display label.
    pub fn label(self) -> &'static str {
        match self {
            Region::North => "North",
            Region::East => "East",
            Region::South => "South",
            Region::West => "West",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = RecordError;

    /// ASCII case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        Region::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(code))
            .ok_or_else(|| RecordError::UnknownRegion(s.to_string()))
    }
}

/// Grouping scope for aggregation queries.
///
/// Its only text form is the selector value, through `Display` and `FromStr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Every region summed together.
    All,
    /// A single region.
    Region(Region),
}

impl Scope {
    /// The five selector values, regions first, `All` last.
    pub const SELECTOR: [Scope; 5] = [
        Scope::Region(Region::North),
        Scope::Region(Region::East),
        Scope::Region(Region::South),
        Scope::Region(Region::West),
        Scope::All,
    ];

    /// Does a line item in `region` belong to this scope?
    #[inline]
    pub fn includes(self, region: Region) -> bool {
        match self {
            Scope::All => true,
            Scope::Region(r) => r == region,
        }
    }

    /// Selector value (`all`, `north`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::All => "all",
            Scope::Region(r) => r.as_str(),
        }
    }

    /// Display label for chart titles.
    pub fn label(self) -> &'static str {
        match self {
            Scope::All => "All Regions",
            Scope::Region(r) => r.label(),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Scope::All);
        }
        s.parse::<Region>()
            .map(Scope::Region)
            .map_err(|_| Error::UnknownScope(s.to_string()))
    }
}

/// One row of a source extract, exactly as read.
///
/// Fields stay textual until the normalizer validates them, so one bad cell
/// rejects one record instead of the whole batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub product: String,
    pub price: String,
    pub quantity: String,
    pub date: String,
    pub region: String,
    /// 1-based line in the source extract (0 when built in memory).
    #[serde(skip)]
    pub line: u64,
}

/// A normalized, product-filtered record with derived sales.
///
/// Fields are private: `sales` can only come from [`LineItem::derive`] or from
/// a validated artifact load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(with = "rust_decimal::serde::str")]
    sales: Decimal,
    date: NaiveDate,
    region: Region,
}

impl LineItem {
    /// Derive a line item as `quantity × unit_price`.
    ///
    /// Returns `None` for a negative price or if the product overflows.
    pub fn derive(quantity: u64, unit_price: Decimal, date: NaiveDate, region: Region) -> Option<Self> {
        if unit_price.is_sign_negative() && !unit_price.is_zero() {
            return None;
        }
        let sales = Decimal::from(quantity).checked_mul(unit_price)?;
        Some(Self { sales, date, region })
    }

    /// Derived sales value (never negative).
    #[inline]
    pub fn sales(&self) -> Decimal {
        self.sales
    }

    #[inline]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    #[inline]
    pub fn region(&self) -> Region {
        self.region
    }
}

/// Total sales for one date within a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedPoint {
    pub date: NaiveDate,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_sales: Decimal,
}
