//! Prometheus Metrics Module
//!
//! # Metrics Categories
//!
//! - **Cycles**: Cycle outcomes and durations
//! - **Items**: Feed items dropped by stage
//! - **Quotes**: Cache hits, provider calls and failures
//! - **Snapshot**: Published record count
//!
//! Metrics are exposed at `/metrics` on the HTTP server port.

use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

use crate::application::services::CycleOutcome;

// =============================================================================
// Global Metrics Handle
// =============================================================================

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder.
///
/// Safe to call more than once; later calls return the existing handle.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    register_metrics();
    Ok(PROMETHEUS_HANDLE.get_or_init(|| handle).clone())
}

/// Get the Prometheus handle for rendering metrics.
///
/// Returns `None` if metrics have not been initialized.
#[must_use]
pub fn get_metrics_handle() -> Option<PrometheusHandle> {
    PROMETHEUS_HANDLE.get().cloned()
}

// =============================================================================
// Metric Registration
// =============================================================================

fn register_metrics() {
    describe_counter!(
        "catalyst_scanner_cycles_total",
        "Scheduler ticks by outcome (completed, aborted, skipped)"
    );
    describe_histogram!(
        "catalyst_scanner_cycle_duration_seconds",
        "Wall time of completed cycles"
    );

    describe_counter!(
        "catalyst_scanner_items_dropped_total",
        "Feed items dropped by pipeline stage"
    );

    describe_counter!(
        "catalyst_scanner_quote_lookups_total",
        "Quote lookups by outcome (hit, miss, failure)"
    );
    describe_gauge!(
        "catalyst_scanner_quote_cache_entries",
        "Symbols held in the quote cache"
    );

    describe_gauge!(
        "catalyst_scanner_snapshot_records",
        "Records in the currently published snapshot"
    );
}

// =============================================================================
// Metric Recording Functions
// =============================================================================

/// Outcome of one quote lookup through the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    /// Served from the cache without calling the provider.
    Hit,
    /// Provider called and returned a record.
    Miss,
    /// Provider called and failed or timed out.
    Failure,
}

impl LookupOutcome {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
            Self::Failure => "failure",
        }
    }
}

/// Record a scheduler tick outcome.
pub fn record_cycle(outcome: CycleOutcome) {
    counter!(
        "catalyst_scanner_cycles_total",
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

/// Record the duration of a completed cycle.
pub fn record_cycle_duration(duration: Duration) {
    histogram!("catalyst_scanner_cycle_duration_seconds").record(duration.as_secs_f64());
}

/// Record one item dropped at `stage`.
pub fn record_item_dropped(stage: &'static str) {
    counter!(
        "catalyst_scanner_items_dropped_total",
        "stage" => stage
    )
    .increment(1);
}

/// Record a quote lookup.
pub fn record_quote_lookup(outcome: LookupOutcome) {
    counter!(
        "catalyst_scanner_quote_lookups_total",
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

/// Update the quote cache size.
pub fn set_quote_cache_size(entries: f64) {
    gauge!("catalyst_scanner_quote_cache_entries").set(entries);
}

/// Update the published snapshot size.
pub fn set_snapshot_size(records: f64) {
    gauge!("catalyst_scanner_snapshot_records").set(records);
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_outcome_as_str() {
        assert_eq!(LookupOutcome::Hit.as_str(), "hit");
        assert_eq!(LookupOutcome::Miss.as_str(), "miss");
        assert_eq!(LookupOutcome::Failure.as_str(), "failure");
    }

    #[test]
    fn recording_without_recorder_is_noop() {
        record_cycle(CycleOutcome::Skipped);
        record_cycle_duration(Duration::from_millis(5));
        record_item_dropped("stale");
        record_quote_lookup(LookupOutcome::Hit);
        set_quote_cache_size(3.0);
        set_snapshot_size(1.0);
    }
}
