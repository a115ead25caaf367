//! Keyword and Recency Gates
//!
//! Cheap predicates evaluated before any network call is spent on an item.

use chrono::{DateTime, Duration, Utc};

// =============================================================================
// KeywordGate
// =============================================================================

/// Case-insensitive substring test against a keyword vocabulary.
///
/// Passes if any term occurs anywhere in the text (`"approv"` matches
/// `"approval"`). An empty vocabulary passes every item.
#[derive(Debug, Clone, Default)]
pub struct KeywordGate {
    terms: Vec<String>,
}

impl KeywordGate {
    /// Build a gate from a vocabulary. Blank terms are ignored.
    #[must_use]
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        Self { terms }
    }

    /// Normalized vocabulary.
    #[must_use]
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// First vocabulary term found in the text, if any.
    #[must_use]
    pub fn matched_term(&self, text: &str) -> Option<&str> {
        let haystack = text.to_lowercase();
        self.terms
            .iter()
            .find(|term| haystack.contains(term.as_str()))
            .map(String::as_str)
    }

    /// Whether the text passes the gate.
    #[must_use]
    pub fn passes(&self, text: &str) -> bool {
        self.terms.is_empty() || self.matched_term(text).is_some()
    }
}

// =============================================================================
// RecencyGate
// =============================================================================

/// Publish-time window check.
#[derive(Debug, Clone, Copy)]
pub struct RecencyGate {
    window: Duration,
}

impl RecencyGate {
    /// Create a gate with the given window.
    #[must_use]
    pub const fn new(window: Duration) -> Self {
        Self { window }
    }

    /// Create a gate from a window in hours.
    #[must_use]
    pub fn from_hours(hours: u32) -> Self {
        Self::new(Duration::hours(i64::from(hours)))
    }

    /// Configured window.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Passes when `now - published_at <= window`.
    ///
    /// Unknown publish times fail. Future-dated items (clock skew) pass.
    #[must_use]
    pub fn passes(&self, published_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        published_at.is_some_and(|at| now.signed_duration_since(at) <= self.window)
    }
}
