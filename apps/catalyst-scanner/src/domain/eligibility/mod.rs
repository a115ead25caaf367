//! Eligibility Rules
//!
//! Applied in a fixed order; the first failing rule drops the item and
//! names the reason:
//!
//! 1. Format (checked before the quote lookup)
//! 2. Price ceiling
//! 3. Exchange allow-list, with OTC/pink markers always rejected
//! 4. Country block-list

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::quote::QuoteRecord;
use crate::domain::shared::Symbol;

/// Default price ceiling in dollars.
pub const DEFAULT_PRICE_CEILING: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

/// Default exchange allow pattern.
pub const DEFAULT_EXCHANGE_PATTERN: &str =
    r"(?i)^(NASDAQ|NYSE|AMEX|NYSE ?AMERICAN|NYSE ?ARCA|NYSE ?MKT|NMS|NGM|NCM|NYQ|ASE|PCX|BATS)";

/// Default OTC/pink-sheet pattern.
pub const DEFAULT_OTC_PATTERN: &str = r"(?i)(OTC|PINK|GREY|EXPERT MARKET)";

/// Default country block-list.
pub const DEFAULT_BLOCKED_COUNTRIES: [&str; 4] = ["China", "CN", "Hong Kong", "HK"];

// =============================================================================
// Policies
// =============================================================================

/// What to do with a candidate whose price is unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownPricePolicy {
    /// Admit and display with an unknown marker.
    #[default]
    Admit,
    /// Drop the item.
    Reject,
}

// =============================================================================
// Rejection
// =============================================================================

/// Reason a candidate failed an eligibility rule.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Symbol carries a listing suffix or is longer than five characters.
    #[error("Symbol format rejected: {symbol}")]
    Format {
        /// Offending symbol.
        symbol: String,
    },

    /// Known price above the configured ceiling.
    #[error("Price {price} above ceiling {ceiling}")]
    PriceAboveCeiling {
        /// Quoted price.
        price: Decimal,
        /// Configured ceiling.
        ceiling: Decimal,
    },

    /// Price unknown and the policy is `reject`.
    #[error("Price unknown")]
    PriceUnknown,

    /// Listed on an OTC or pink-sheet market.
    #[error("OTC listing: {exchange}")]
    OtcListing {
        /// Reported exchange.
        exchange: String,
    },

    /// Exchange known but not on the allow-list.
    #[error("Exchange not allowed: {exchange}")]
    ExchangeNotAllowed {
        /// Reported exchange.
        exchange: String,
    },

    /// Neither the provider nor the headline named an exchange.
    #[error("Exchange unknown")]
    ExchangeUnknown,

    /// Issuer country on the block-list.
    #[error("Blocked country: {country}")]
    BlockedCountry {
        /// Reported country.
        country: String,
    },

    /// Float above the high threshold with the `omit` policy.
    #[error("High float omitted: {float_shares}")]
    HighFloat {
        /// Float shares.
        float_shares: u64,
    },
}

impl Rejection {
    /// Stable label for metrics and logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Format { .. } => "format",
            Self::PriceAboveCeiling { .. } => "price_above_ceiling",
            Self::PriceUnknown => "price_unknown",
            Self::OtcListing { .. } => "otc_listing",
            Self::ExchangeNotAllowed { .. } => "exchange_not_allowed",
            Self::ExchangeUnknown => "exchange_unknown",
            Self::BlockedCountry { .. } => "blocked_country",
            Self::HighFloat { .. } => "high_float",
        }
    }
}

// =============================================================================
// Rules
// =============================================================================

/// Eligibility configuration with compiled patterns.
#[derive(Debug, Clone)]
pub struct EligibilityRules {
    /// Maximum admissible price.
    pub price_ceiling: Decimal,
    /// Handling of unknown prices.
    pub unknown_price: UnknownPricePolicy,
    /// Exchanges admitted.
    pub exchange_allow: Regex,
    /// OTC/pink markers, always rejected.
    pub otc: Regex,
    /// Issuer countries rejected (compared case-insensitively).
    pub blocked_countries: Vec<String>,
}

impl EligibilityRules {
    /// Build rules from raw pattern strings.
    ///
    /// # Errors
    ///
    /// Returns an error if either pattern fails to compile.
    pub fn new(
        price_ceiling: Decimal,
        unknown_price: UnknownPricePolicy,
        exchange_pattern: &str,
        otc_pattern: &str,
        blocked_countries: Vec<String>,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            price_ceiling,
            unknown_price,
            exchange_allow: Regex::new(exchange_pattern)?,
            otc: Regex::new(otc_pattern)?,
            blocked_countries,
        })
    }
}

impl Default for EligibilityRules {
    #[allow(clippy::expect_used)]
    fn default() -> Self {
        Self::new(
            DEFAULT_PRICE_CEILING,
            UnknownPricePolicy::default(),
            DEFAULT_EXCHANGE_PATTERN,
            DEFAULT_OTC_PATTERN,
            DEFAULT_BLOCKED_COUNTRIES.iter().map(ToString::to_string).collect(),
        )
        .expect("default eligibility patterns are valid")
    }
}

// =============================================================================
// Classifier
// =============================================================================

/// Applies eligibility rules to extracted symbols and their quotes.
#[derive(Debug, Clone, Default)]
pub struct EligibilityClassifier {
    rules: EligibilityRules,
}

impl EligibilityClassifier {
    /// Create a classifier.
    #[must_use]
    pub const fn new(rules: EligibilityRules) -> Self {
        Self { rules }
    }

    /// Format rule: no `.` suffix, at most five characters.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::Format`] for foreign or over-long symbols.
    pub fn check_format(&self, symbol: &Symbol) -> Result<(), Rejection> {
        if symbol.is_primary_listing() {
            Ok(())
        } else {
            Err(Rejection::Format {
                symbol: symbol.to_string(),
            })
        }
    }

    /// Price, exchange and country rules, in that order.
    ///
    /// `exchange_hint` is the exchange captured from the headline; it is
    /// used only when the provider reports none.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule.
    pub fn classify(&self, quote: &QuoteRecord, exchange_hint: Option<&str>) -> Result<(), Rejection> {
        self.check_price(quote)?;
        self.check_exchange(quote.exchange.as_deref().or(exchange_hint))?;
        self.check_country(quote.country.as_deref())
    }

    fn check_price(&self, quote: &QuoteRecord) -> Result<(), Rejection> {
        match quote.price {
            Some(price) if price > self.rules.price_ceiling => Err(Rejection::PriceAboveCeiling {
                price,
                ceiling: self.rules.price_ceiling,
            }),
            Some(_) => Ok(()),
            None => match self.rules.unknown_price {
                UnknownPricePolicy::Admit => Ok(()),
                UnknownPricePolicy::Reject => Err(Rejection::PriceUnknown),
            },
        }
    }

    fn check_exchange(&self, exchange: Option<&str>) -> Result<(), Rejection> {
        let Some(exchange) = exchange.map(str::trim).filter(|e| !e.is_empty()) else {
            return Err(Rejection::ExchangeUnknown);
        };

        if self.rules.otc.is_match(exchange) {
            return Err(Rejection::OtcListing {
                exchange: exchange.to_string(),
            });
        }
        if !self.rules.exchange_allow.is_match(exchange) {
            return Err(Rejection::ExchangeNotAllowed {
                exchange: exchange.to_string(),
            });
        }
        Ok(())
    }

    fn check_country(&self, country: Option<&str>) -> Result<(), Rejection> {
        let Some(country) = country.map(str::trim).filter(|c| !c.is_empty()) else {
            return Ok(());
        };

        if self
            .rules
            .blocked_countries
            .iter()
            .any(|blocked| blocked.trim().eq_ignore_ascii_case(country))
        {
            return Err(Rejection::BlockedCountry {
                country: country.to_string(),
            });
        }
        Ok(())
    }
}
