//! Outbound HTTP client configuration.

use serde::{Deserialize, Serialize};

/// Settings shared by the feed, article and quote clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpClientConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// User-Agent header.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

pub(crate) const fn default_request_timeout_secs() -> u64 {
    10
}

pub(crate) fn default_user_agent() -> String {
    concat!("catalyst-scanner/", env!("CARGO_PKG_VERSION")).to_string()
}
