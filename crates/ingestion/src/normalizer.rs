//! Raw record normalization.
//!
//! Turns one [`RawRecord`] into a [`LineItem`]. Records for other products are
//! excluded (`Ok(None)`); that is filtering, not a failure. Records whose
//! fields cannot be parsed are rejected with a [`RecordError`].

use chrono::NaiveDate;
use morsel_core::config::ProductConfig;
use morsel_core::{Config, LineItem, RawRecord, RecordError, Region};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Stateless record normalizer for one target product.
#[derive(Debug, Clone)]
pub struct RecordNormalizer {
    /// Product to keep (case-sensitive).
    target: String,
    /// Currency symbol allowed once in front of a price.
    currency_symbol: char,
}

impl RecordNormalizer {
    /// Create a normalizer from the product section of the configuration.
    pub fn new(product: &ProductConfig) -> Self {
        Self {
            target: product.target.clone(),
            currency_symbol: product.currency_symbol,
        }
    }

    /// Create a normalizer from the full configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.product)
    }

    /// Target product name.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Does this record belong to the target product?
    #[inline]
    pub fn is_target(&self, raw: &RawRecord) -> bool {
        raw.product == self.target
    }

    /// Normalize one record.
    ///
    /// The product filter runs first, so a malformed record for another
    /// product is excluded rather than rejected.
    pub fn normalize(&self, raw: &RawRecord) -> Result<Option<LineItem>, RecordError> {
        if !self.is_target(raw) {
            return Ok(None);
        }

        let price = self.parse_price(&raw.price)?;
        let quantity = parse_quantity(&raw.quantity)?;
        let date = parse_date(&raw.date)?;
        let region = Region::from_str(&raw.region)?;

        LineItem::derive(quantity, price, date, region)
            .map(Some)
            .ok_or_else(|| RecordError::SalesOverflow {
                quantity,
                price: raw.price.clone(),
            })
    }

    /// Parse a price such as `$3.00` into an exact decimal.
    ///
    /// Accepts at most one leading currency symbol followed by an unsigned
    /// decimal (`3`, `3.00`, `0.5`). Signs, exponents, separators and a
    /// repeated symbol are rejected, as is any price the decimal type could
    /// only hold after rounding.
    pub fn parse_price(&self, text: &str) -> Result<Decimal, RecordError> {
        let malformed = || RecordError::MalformedPrice(text.to_string());

        let trimmed = text.trim();
        let number = trimmed.strip_prefix(self.currency_symbol).unwrap_or(trimmed);
        if !is_unsigned_decimal(number) {
            return Err(malformed());
        }
        let price = Decimal::from_str(number).map_err(|_| malformed())?;

        // Parsing rounds away fractional digits that do not fit; the scale
        // then no longer matches the text.
        let frac_digits = number.split_once('.').map_or(0, |(_, frac)| frac.len());
        if price.scale() as usize != frac_digits {
            return Err(malformed());
        }
        Ok(price)
    }
}

/// Parse a non-negative base-10 integer quantity.
pub fn parse_quantity(text: &str) -> Result<u64, RecordError> {
    let trimmed = text.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RecordError::MalformedQuantity(text.to_string()));
    }
    trimmed
        .parse::<u64>()
        .map_err(|_| RecordError::MalformedQuantity(text.to_string()))
}

/// Parse an ISO-8601 calendar date (`YYYY-MM-DD`).
pub fn parse_date(text: &str) -> Result<NaiveDate, RecordError> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map_err(|_| RecordError::MalformedDate(text.to_string()))
}

/// `digits` or `digits.digits`.
fn is_unsigned_decimal(s: &str) -> bool {
    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    match s.split_once('.') {
        Some((int, frac)) => all_digits(int) && all_digits(frac),
        None => all_digits(s),
    }
}
