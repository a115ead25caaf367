//! Feed source configuration.

use serde::{Deserialize, Serialize};

/// Press-release feeds to poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedsConfig {
    /// Feed URLs, polled in order.
    #[serde(default = "default_urls")]
    pub urls: Vec<String>,
    /// Only the first N items of each feed are considered.
    #[serde(default = "default_max_items_per_feed")]
    pub max_items_per_feed: usize,
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            urls: default_urls(),
            max_items_per_feed: default_max_items_per_feed(),
        }
    }
}

pub(crate) fn default_urls() -> Vec<String> {
    vec!["https://www.globenewswire.com/RssFeed".to_string()]
}

pub(crate) const fn default_max_items_per_feed() -> usize {
    20
}
