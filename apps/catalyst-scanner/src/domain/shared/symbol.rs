//! Symbol value object for ticker identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of a primary-listing ticker.
pub const MAX_TICKER_LEN: usize = 5;

/// A ticker symbol as captured from a press release.
///
/// Examples:
/// - Primary listing: "ACME", "AAPL"
/// - Foreign listing: "BABA.HK" (carries an exchange suffix)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Create a new Symbol.
    ///
    /// The symbol is trimmed and normalized to uppercase.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_uppercase())
    }

    /// Get the symbol string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of characters in the symbol.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    /// Whether the symbol is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the symbol looks like a primary US listing: 1-5 letters, no suffix.
    #[must_use]
    pub fn is_primary_listing(&self) -> bool {
        !self.is_empty()
            && self.len() <= MAX_TICKER_LEN
            && self.0.chars().all(|c| c.is_ascii_uppercase())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
