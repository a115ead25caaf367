//! Gate, eligibility and float-tier configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::eligibility::{
    DEFAULT_BLOCKED_COUNTRIES, DEFAULT_EXCHANGE_PATTERN, DEFAULT_OTC_PATTERN,
    DEFAULT_PRICE_CEILING, UnknownPricePolicy,
};
use crate::domain::float_tier::{FloatThresholds, HighFloatPolicy};

/// Filtering rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiltersConfig {
    /// Catalyst vocabulary; empty admits every item.
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
    /// Recency window in hours.
    #[serde(default = "default_recency_window_hours")]
    pub recency_window_hours: u32,
    /// Maximum admissible price.
    #[serde(default = "default_price_ceiling")]
    pub price_ceiling: Decimal,
    /// Handling of unknown prices.
    #[serde(default)]
    pub unknown_price: UnknownPricePolicy,
    /// Exchange allow-list pattern.
    #[serde(default = "default_exchange_pattern")]
    pub exchange_pattern: String,
    /// OTC/pink pattern, always rejected.
    #[serde(default = "default_otc_pattern")]
    pub otc_pattern: String,
    /// Issuer countries rejected.
    #[serde(default = "default_blocked_countries")]
    pub blocked_countries: Vec<String>,
    /// Float tier boundaries.
    #[serde(default)]
    pub float_thresholds: FloatThresholds,
    /// Handling of high floats.
    #[serde(default)]
    pub high_float: HighFloatPolicy,
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
            recency_window_hours: default_recency_window_hours(),
            price_ceiling: default_price_ceiling(),
            unknown_price: UnknownPricePolicy::default(),
            exchange_pattern: default_exchange_pattern(),
            otc_pattern: default_otc_pattern(),
            blocked_countries: default_blocked_countries(),
            float_thresholds: FloatThresholds::default(),
            high_float: HighFloatPolicy::default(),
        }
    }
}

pub(crate) fn default_keywords() -> Vec<String> {
    [
        "approval",
        "approved",
        "acquisition",
        "acquire",
        "merger",
        "fda",
        "clearance",
        "positive",
        "results",
        "breakthrough",
        "partnership",
        "agreement",
        "contract",
        "award",
        "surge",
        "record",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

pub(crate) const fn default_recency_window_hours() -> u32 {
    24
}

pub(crate) const fn default_price_ceiling() -> Decimal {
    DEFAULT_PRICE_CEILING
}

pub(crate) fn default_exchange_pattern() -> String {
    DEFAULT_EXCHANGE_PATTERN.to_string()
}

pub(crate) fn default_otc_pattern() -> String {
    DEFAULT_OTC_PATTERN.to_string()
}

pub(crate) fn default_blocked_countries() -> Vec<String> {
    DEFAULT_BLOCKED_COUNTRIES.iter().map(ToString::to_string).collect()
}
