//! Ticker Extraction
//!
//! Pulls a candidate ticker out of a press release using an explicit,
//! ordered list of rules. Rules are evaluated strictly in sequence and the
//! first rule that matches is authoritative; later rules are never consulted
//! and captures are never merged.
//!
//! # Default Rule Order
//!
//! 1. Exchange-qualified form in the title: `(NASDAQ: ACME)`
//! 2. Bare parenthetical form in the title: `(ACME)`
//! 3. Exchange-qualified form in the body
//!
//! Exchange names match case-insensitively; the ticker itself must be
//! uppercase. A captured foreign-listing suffix (`BABA.HK`) is kept so the
//! format rule can reject it downstream instead of silently truncating it.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::domain::shared::Symbol;

/// `(NASDAQ: ACME)`, `(nyse american: XYZ)`, `(Nasdaq:ABC; TSX: ABC)`.
const EXCHANGE_QUALIFIED_PATTERN: &str = r"\(\s*((?i:nasdaq|nyse|amex)(?:\s+(?i:american|arca|mkt))?)\s*:\s*([A-Z]+(?:\.[A-Z]+)?)\b";

/// `(ACME)` with nothing else inside the parentheses.
const BARE_PARENTHETICAL_PATTERN: &str = r"\(([A-Z]{1,5}(?:\.[A-Z]{1,3})?)\)";

#[allow(clippy::expect_used)]
fn exchange_qualified_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(EXCHANGE_QUALIFIED_PATTERN).expect("exchange regex is valid"))
}

#[allow(clippy::expect_used)]
fn bare_parenthetical_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(BARE_PARENTHETICAL_PATTERN).expect("bare regex is valid"))
}

// =============================================================================
// Rules
// =============================================================================

/// A single extraction rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionRule {
    /// `(EXCHANGE: TICKER)` in the headline.
    ExchangeQualifiedTitle,
    /// `(TICKER)` in the headline.
    BareTitle,
    /// `(EXCHANGE: TICKER)` anywhere in the article body.
    ExchangeQualifiedBody,
}

impl ExtractionRule {
    /// The default priority order.
    pub const DEFAULT_ORDER: [Self; 3] = [
        Self::ExchangeQualifiedTitle,
        Self::BareTitle,
        Self::ExchangeQualifiedBody,
    ];

    /// Rule name for logging.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ExchangeQualifiedTitle => "exchange_qualified_title",
            Self::BareTitle => "bare_title",
            Self::ExchangeQualifiedBody => "exchange_qualified_body",
        }
    }

    /// Apply this rule to a title/body pair.
    #[must_use]
    pub fn apply(&self, title: &str, body: &str) -> Option<Extraction> {
        match self {
            Self::ExchangeQualifiedTitle => exchange_qualified(title, *self),
            Self::BareTitle => {
                let caps = bare_parenthetical_regex().captures(title)?;
                Some(Extraction {
                    symbol: Symbol::new(caps.get(1)?.as_str()),
                    exchange_hint: None,
                    rule: *self,
                })
            }
            Self::ExchangeQualifiedBody => exchange_qualified(body, *self),
        }
    }
}

fn exchange_qualified(text: &str, rule: ExtractionRule) -> Option<Extraction> {
    let caps = exchange_qualified_regex().captures(text)?;
    let exchange = caps.get(1)?.as_str();
    let ticker = caps.get(2)?.as_str();

    Some(Extraction {
        symbol: Symbol::new(ticker),
        exchange_hint: Some(normalize_exchange(exchange)),
        rule,
    })
}

fn normalize_exchange(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_uppercase)
        .collect::<Vec<_>>()
        .join(" ")
}

// =============================================================================
// Extractor
// =============================================================================

/// Successful extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Captured ticker.
    pub symbol: Symbol,
    /// Exchange named next to the ticker, when the rule captures one.
    pub exchange_hint: Option<String>,
    /// Rule that produced the capture.
    pub rule: ExtractionRule,
}

/// Ordered list of extraction rules; first match wins.
#[derive(Debug, Clone)]
pub struct TickerExtractor {
    rules: Vec<ExtractionRule>,
}

impl Default for TickerExtractor {
    fn default() -> Self {
        Self {
            rules: ExtractionRule::DEFAULT_ORDER.to_vec(),
        }
    }
}

impl TickerExtractor {
    /// Create an extractor with a custom rule order.
    #[must_use]
    pub const fn with_rules(rules: Vec<ExtractionRule>) -> Self {
        Self { rules }
    }

    /// Extract a ticker from a headline and article body.
    #[must_use]
    pub fn extract(&self, title: &str, body: &str) -> Option<Extraction> {
        self.rules.iter().find_map(|rule| rule.apply(title, body))
    }
}
