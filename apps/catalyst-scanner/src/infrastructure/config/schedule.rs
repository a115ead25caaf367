//! Cycle scheduling and concurrency configuration.

use serde::{Deserialize, Serialize};

/// Scheduler and pipeline fan-out settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Seconds between cycle starts.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    /// Items processed concurrently within a cycle.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval_secs(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

pub(crate) const fn default_refresh_interval_secs() -> u64 {
    60
}

pub(crate) const fn default_max_concurrency() -> usize {
    8
}
