//! Configuration structures for the morsel-sales system.

use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Product filter and price format.
    pub product: ProductConfig,
    /// Canonical artifact location.
    pub artifact: ArtifactConfig,
    /// Reporting parameters for the presentation layer.
    pub reporting: ReportingConfig,
}

impl Config {
    /// Parse a JSON config. Missing sections and fields fall back to defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config from disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        if self.product.target.is_empty() {
            return Err(Error::config("product.target must not be empty"));
        }
        let symbol = self.product.currency_symbol;
        if symbol.is_ascii_digit() || symbol == '.' || symbol == '-' || symbol.is_whitespace() {
            return Err(Error::config(format!(
                "product.currency_symbol {symbol:?} would be ambiguous inside a price"
            )));
        }
        if self.artifact.path.as_os_str().is_empty() {
            return Err(Error::config("artifact.path must not be empty"));
        }
        Ok(())
    }
}

/// Which product to keep and how its price is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductConfig {
    /// Product name, compared case-sensitively.
    pub target: String,
    /// Currency symbol that may prefix a price.
    pub currency_symbol: char,
}

impl Default for ProductConfig {
    fn default() -> Self {
        Self {
            target: "pink morsel".to_string(),
            currency_symbol: '$',
        }
    }
}

/// Canonical artifact configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    /// Where the pipeline writes and the aggregator reads the dataset.
    pub path: PathBuf,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("pink_morsel_sales.csv"),
        }
    }
}

/// Reporting configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportingConfig {
    /// Date of the price increase marked on the chart and used as the
    /// before/after pivot.
    pub price_change_date: NaiveDate,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            price_change_date: NaiveDate::from_ymd_opt(2021, 1, 15).unwrap_or_default(),
        }
    }
}
