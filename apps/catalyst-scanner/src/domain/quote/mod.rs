//! Market Data Records
//!
//! Every market field is optional: `None` means "unknown", which is never
//! the same as zero.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::Symbol;

/// Market data for one symbol, as returned by a quote source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRecord {
    /// Symbol the record describes.
    pub symbol: Symbol,
    /// Last trade price.
    pub price: Option<Decimal>,
    /// Previous session close.
    pub previous_close: Option<Decimal>,
    /// Float shares outstanding.
    pub float_shares: Option<u64>,
    /// Listing exchange as reported by the provider.
    pub exchange: Option<String>,
    /// Issuer country as reported by the provider.
    pub country: Option<String>,
    /// When the record was fetched.
    pub fetched_at: DateTime<Utc>,
}

impl QuoteRecord {
    /// Create a record with every market field unknown.
    #[must_use]
    pub fn empty(symbol: Symbol) -> Self {
        Self {
            symbol,
            price: None,
            previous_close: None,
            float_shares: None,
            exchange: None,
            country: None,
            fetched_at: Utc::now(),
        }
    }

    /// Percent change from the previous close.
    ///
    /// Zero when the price or previous close is unknown, or the previous
    /// close is zero.
    #[must_use]
    pub fn percent_change(&self) -> Decimal {
        match (self.price, self.previous_close) {
            (Some(price), Some(prev)) if !prev.is_zero() => {
                (price - prev) / prev * Decimal::ONE_HUNDRED
            }
            _ => Decimal::ZERO,
        }
    }
}
