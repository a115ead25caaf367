//! Application Ports (Driven)
//!
//! Interfaces the pipeline uses to reach external systems. Each port has a
//! matching error enum; the pipeline turns per-item errors into drops.

mod article_fetcher_port;
mod feed_source_port;
mod quote_source_port;

pub use article_fetcher_port::{ArticleError, ArticleFetcherPort};
pub use feed_source_port::{FeedError, FeedSourcePort};
pub use quote_source_port::{QuoteSourceError, QuoteSourcePort};
