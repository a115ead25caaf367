//! Feed Item Types
//!
//! A `FeedItem` is one entry of a press-release feed as delivered by the
//! feed source, immutable for the duration of a poll. Publish times that
//! cannot be parsed are carried as `None` ("unknown time") rather than
//! surfacing as an error.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// One raw item from a press-release feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    /// Headline.
    pub title: String,
    /// Body or snippet text supplied by the feed.
    pub snippet: String,
    /// Link to the full article.
    pub link: String,
    /// Publish time, `None` when missing or unparseable.
    pub published_at: Option<DateTime<Utc>>,
}

impl FeedItem {
    /// Create a feed item, parsing the raw publish date leniently.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        snippet: impl Into<String>,
        link: impl Into<String>,
        raw_published_at: Option<&str>,
    ) -> Self {
        Self {
            title: title.into(),
            snippet: snippet.into(),
            link: link.into(),
            published_at: raw_published_at.and_then(parse_published_at),
        }
    }

    /// Headline and snippet joined for keyword matching.
    #[must_use]
    pub fn headline_and_snippet(&self) -> String {
        format!("{} {}", self.title, self.snippet)
    }
}

/// Parse a feed publish date.
///
/// Accepts RFC 2822 (RSS), RFC 3339 (Atom) and `YYYY-MM-DD HH:MM:SS` (UTC).
/// Anything else is an unknown time.
#[must_use]
pub fn parse_published_at(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc))
        })
}
