//! Feed Source Port (Driven Port)
//!
//! Interface for pulling raw items from a press-release feed.

use async_trait::async_trait;

use crate::domain::feed::FeedItem;

/// Feed source error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FeedError {
    /// Transport failure (connect, timeout, TLS).
    #[error("Feed request failed for {url}: {message}")]
    Request {
        /// Feed URL.
        url: String,
        /// Error details.
        message: String,
    },

    /// Non-success HTTP status.
    #[error("Feed {url} returned HTTP {status}")]
    Status {
        /// Feed URL.
        url: String,
        /// Status code.
        status: u16,
    },

    /// Body could not be parsed as a feed.
    #[error("Feed {url} could not be parsed: {message}")]
    Parse {
        /// Feed URL.
        url: String,
        /// Error details.
        message: String,
    },
}

/// Port for pulling feed items.
#[async_trait]
pub trait FeedSourcePort: Send + Sync {
    /// Fetch the items of one feed, in feed order.
    async fn fetch(&self, url: &str) -> Result<Vec<FeedItem>, FeedError>;
}
