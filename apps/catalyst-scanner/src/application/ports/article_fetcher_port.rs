//! Article Fetcher Port (Driven Port)
//!
//! Best-effort retrieval of an article's full text. Failures drop only the
//! item being processed.

use async_trait::async_trait;

/// Article fetch error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ArticleError {
    /// Transport failure (connect, timeout, TLS).
    #[error("Article request failed: {message}")]
    Request {
        /// Error details.
        message: String,
    },

    /// Non-success HTTP status.
    #[error("Article returned HTTP {status}")]
    Status {
        /// Status code.
        status: u16,
    },

    /// Response had no usable text.
    #[error("Article body empty")]
    Empty,
}

/// Port for fetching article text.
#[async_trait]
pub trait ArticleFetcherPort: Send + Sync {
    /// Fetch the article at `url` as plain text.
    async fn fetch(&self, url: &str) -> Result<String, ArticleError>;
}
