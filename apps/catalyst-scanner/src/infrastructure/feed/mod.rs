//! RSS Feed Source Adapter
//!
//! Pulls an RSS 2.0 feed over HTTP and maps its items to [`FeedItem`]s in
//! feed order. Items without a title or link are skipped; unparseable
//! publish dates become "unknown time".

use async_trait::async_trait;

use crate::application::ports::{FeedError, FeedSourcePort};
use crate::domain::feed::FeedItem;
use crate::infrastructure::article::strip_html;

/// HTTP + `rss` implementation of [`FeedSourcePort`].
#[derive(Debug, Clone)]
pub struct RssFeedSource {
    client: reqwest::Client,
}

impl RssFeedSource {
    /// Create a feed source over a configured client.
    #[must_use]
    pub const fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FeedSourcePort for RssFeedSource {
    async fn fetch(&self, url: &str) -> Result<Vec<FeedItem>, FeedError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FeedError::Request {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(FeedError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let content = response.bytes().await.map_err(|e| FeedError::Request {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let channel = rss::Channel::read_from(&content[..]).map_err(|e| FeedError::Parse {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        Ok(parse_channel(&channel))
    }
}

/// Map channel items to feed items, preserving order.
#[must_use]
pub fn parse_channel(channel: &rss::Channel) -> Vec<FeedItem> {
    channel
        .items()
        .iter()
        .filter_map(|item| {
            let title = item.title()?.trim();
            let link = item.link()?.trim();
            if title.is_empty() || link.is_empty() {
                return None;
            }
            let snippet = strip_html(item.description().unwrap_or_default());
            Some(FeedItem::new(title, snippet, link, item.pub_date()))
        })
        .collect()
}
