//! Market-data provider configuration (Financial Modeling Prep).

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

/// Provider API key. Never printed or serialized.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether the key is blank.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

const REDACTED: &str = "[REDACTED]";

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl Serialize for ApiKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(REDACTED)
    }
}

/// Quote provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// API credential.
    #[serde(default)]
    pub api_key: ApiKey,
    /// Memoize failed lookups for the process lifetime.
    #[serde(default)]
    pub cache_failures: bool,
    /// Deadline for one complete symbol lookup (all endpoints).
    #[serde(default = "default_lookup_timeout_secs")]
    pub lookup_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: ApiKey::default(),
            cache_failures: false,
            lookup_timeout_secs: default_lookup_timeout_secs(),
        }
    }
}

pub(crate) fn default_base_url() -> String {
    "https://financialmodelingprep.com".to_string()
}

pub(crate) const fn default_lookup_timeout_secs() -> u64 {
    15
}
