//! Configuration for the catalyst scanner.
//!
//! YAML file with `${VAR}` / `${VAR:-default}` environment interpolation,
//! per-section defaults and a validation pass.
//!
//! # Usage
//!
//! ```rust,ignore
//! use catalyst_scanner::{load_config, ScannerConfig};
//!
//! // Load from default path (catalyst-scanner.yaml)
//! let config = load_config(None)?;
//!
//! let settings = config.pipeline_settings()?;
//! println!("polling {} feed(s)", settings.feed_urls.len());
//! ```

mod feeds;
mod filters;
mod http;
mod provider;
mod schedule;
mod server;

use std::time::Duration;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use feeds::FeedsConfig;
pub use filters::FiltersConfig;
pub use http::HttpClientConfig;
pub use provider::{ApiKey, ProviderConfig};
pub use schedule::ScheduleConfig;
pub use server::{DisplayConfig, ServerConfig};

use crate::application::services::PipelineSettings;
use crate::domain::eligibility::{EligibilityClassifier, EligibilityRules};
use crate::domain::extraction::TickerExtractor;
use crate::domain::float_tier::FloatTierClassifier;
use crate::domain::gates::{KeywordGate, RecencyGate};
use crate::domain::snapshot::SnapshotAssembler;

/// Default config file path.
pub const DEFAULT_CONFIG_PATH: &str = "catalyst-scanner.yaml";

/// Env var overriding the config file path.
pub const CONFIG_PATH_ENV: &str = "CATALYST_CONFIG";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Press-release feeds.
    #[serde(default)]
    pub feeds: FeedsConfig,
    /// Market-data provider.
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Gates, eligibility and float tiers.
    #[serde(default)]
    pub filters: FiltersConfig,
    /// Scheduler and fan-out.
    #[serde(default)]
    pub schedule: ScheduleConfig,
    /// Outbound HTTP clients.
    #[serde(default)]
    pub http: HttpClientConfig,
    /// Inbound HTTP server.
    #[serde(default)]
    pub server: ServerConfig,
    /// Presentation.
    #[serde(default)]
    pub display: DisplayConfig,
}

impl ScannerConfig {
    /// Period between cycle starts.
    #[must_use]
    pub const fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.schedule.refresh_interval_secs)
    }

    /// Per-request timeout for outbound HTTP.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.http.request_timeout_secs)
    }

    /// Deadline for one complete quote lookup.
    #[must_use]
    pub const fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.provider.lookup_timeout_secs)
    }

    /// Display timezone.
    ///
    /// # Errors
    ///
    /// Returns a validation error for unknown IANA names.
    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.display.timezone.parse::<Tz>().map_err(|e| {
            ConfigError::ValidationError(format!(
                "display.timezone '{}' is not a valid IANA timezone: {e}",
                self.display.timezone
            ))
        })
    }

    /// Build the pipeline's rule objects.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a pattern or the timezone is invalid.
    pub fn pipeline_settings(&self) -> Result<PipelineSettings, ConfigError> {
        let filters = &self.filters;

        let rules = EligibilityRules::new(
            filters.price_ceiling,
            filters.unknown_price,
            &filters.exchange_pattern,
            &filters.otc_pattern,
            filters.blocked_countries.clone(),
        )
        .map_err(|e| ConfigError::ValidationError(format!("invalid filter pattern: {e}")))?;

        Ok(PipelineSettings {
            feed_urls: self.feeds.urls.clone(),
            max_items_per_feed: self.feeds.max_items_per_feed,
            max_concurrency: self.schedule.max_concurrency,
            keyword_gate: KeywordGate::new(&filters.keywords),
            recency_gate: RecencyGate::from_hours(filters.recency_window_hours),
            extractor: TickerExtractor::default(),
            eligibility: EligibilityClassifier::new(rules),
            float_tiers: FloatTierClassifier::new(filters.float_thresholds, filters.high_float),
            assembler: SnapshotAssembler::new(self.timezone()?),
        })
    }
}

// ============================================
// Configuration Loading
// ============================================

/// Resolve the config path: explicit argument, then `CATALYST_CONFIG`, then
/// the default file name.
#[must_use]
pub fn resolve_config_path(arg: Option<String>) -> String {
    arg.or_else(|| std::env::var(CONFIG_PATH_ENV).ok().filter(|p| !p.is_empty()))
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
}

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to `catalyst-scanner.yaml`.
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<ScannerConfig, ConfigError> {
    let path = path.unwrap_or(DEFAULT_CONFIG_PATH);

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<ScannerConfig, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: ScannerConfig = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)]
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |caps: &regex::Captures<'_>| {
        let default_value = caps.get(2).map_or("", |m| m.as_str());
        match caps.get(1).map(|m| std::env::var(m.as_str())) {
            Some(Ok(v)) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

/// Validate configuration values.
fn validate_config(config: &ScannerConfig) -> Result<(), ConfigError> {
    if config.feeds.urls.is_empty() {
        return Err(ConfigError::ValidationError(
            "feeds.urls must list at least one feed".to_string(),
        ));
    }

    if config.feeds.urls.iter().any(|u| reqwest::Url::parse(u).is_err()) {
        return Err(ConfigError::ValidationError(
            "feeds.urls must all be absolute URLs".to_string(),
        ));
    }

    if config.feeds.max_items_per_feed == 0 {
        return Err(ConfigError::ValidationError(
            "feeds.max_items_per_feed must be positive".to_string(),
        ));
    }

    if config.provider.api_key.is_empty() {
        return Err(ConfigError::ValidationError(
            "provider.api_key is required (set FMP_API_KEY)".to_string(),
        ));
    }

    if config.schedule.refresh_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "schedule.refresh_interval_secs must be positive".to_string(),
        ));
    }

    if config.schedule.max_concurrency == 0 {
        return Err(ConfigError::ValidationError(
            "schedule.max_concurrency must be positive".to_string(),
        ));
    }

    if config.http.request_timeout_secs == 0 || config.provider.lookup_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "http.request_timeout_secs and provider.lookup_timeout_secs must be positive"
                .to_string(),
        ));
    }

    if config.filters.price_ceiling.is_sign_negative() {
        return Err(ConfigError::ValidationError(
            "filters.price_ceiling must not be negative".to_string(),
        ));
    }

    if !config.filters.float_thresholds.is_ordered() {
        return Err(ConfigError::ValidationError(
            "filters.float_thresholds must satisfy bright_below < soft_below <= normal_max"
                .to_string(),
        ));
    }

    for (name, pattern) in [
        ("exchange_pattern", &config.filters.exchange_pattern),
        ("otc_pattern", &config.filters.otc_pattern),
    ] {
        if let Err(e) = regex::Regex::new(pattern) {
            return Err(ConfigError::ValidationError(format!(
                "filters.{name} is not a valid regex: {e}"
            )));
        }
    }

    config.timezone()?;

    Ok(())
}
