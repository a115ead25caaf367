//! Cycle Scheduler
//!
//! Runs a cycle immediately, then once per period, until cancelled.
//! A tick that fires while the previous cycle still holds the run guard is
//! skipped and logged, never queued.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::pipeline::{CycleError, CycleReport};
use crate::infrastructure::metrics;

/// Something that can run one pipeline cycle.
#[async_trait]
pub trait CycleRunner: Send + Sync + 'static {
    /// Run one cycle to completion.
    async fn run_cycle(&self) -> Result<CycleReport, CycleError>;
}

// =============================================================================
// Status
// =============================================================================

/// How a scheduler tick ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleOutcome {
    /// A snapshot was published.
    Completed,
    /// Every feed failed; the previous snapshot stays published.
    Aborted,
    /// The previous cycle was still running.
    Skipped,
}

impl CycleOutcome {
    /// Label for metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Aborted => "aborted",
            Self::Skipped => "skipped",
        }
    }
}

/// Result of the most recent finished cycle.
#[derive(Debug, Clone, Serialize)]
pub struct LastCycle {
    /// `completed` or `aborted`.
    pub outcome: CycleOutcome,
    /// When the cycle finished.
    pub finished_at: DateTime<Utc>,
    /// Report for completed cycles.
    pub report: Option<CycleReport>,
    /// Error for aborted cycles.
    pub error: Option<String>,
}

/// Shared scheduler status, read by the health endpoint.
#[derive(Debug, Default)]
pub struct CycleStatus {
    last: RwLock<Option<LastCycle>>,
    completed: AtomicU64,
    aborted: AtomicU64,
    skipped: AtomicU64,
}

impl CycleStatus {
    /// Create an empty status.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent finished cycle.
    #[must_use]
    pub fn last(&self) -> Option<LastCycle> {
        self.last.read().clone()
    }

    /// Cycles that published a snapshot.
    #[must_use]
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Cycles aborted before publishing.
    #[must_use]
    pub fn aborted(&self) -> u64 {
        self.aborted.load(Ordering::Relaxed)
    }

    /// Ticks skipped because a cycle was still running.
    #[must_use]
    pub fn skipped(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }

    /// Record a finished cycle.
    pub fn record(&self, result: &Result<CycleReport, CycleError>) {
        let last = match result {
            Ok(report) => {
                self.completed.fetch_add(1, Ordering::Relaxed);
                metrics::record_cycle(CycleOutcome::Completed);
                LastCycle {
                    outcome: CycleOutcome::Completed,
                    finished_at: Utc::now(),
                    report: Some(report.clone()),
                    error: None,
                }
            }
            Err(e) => {
                self.aborted.fetch_add(1, Ordering::Relaxed);
                metrics::record_cycle(CycleOutcome::Aborted);
                LastCycle {
                    outcome: CycleOutcome::Aborted,
                    finished_at: Utc::now(),
                    report: None,
                    error: Some(e.to_string()),
                }
            }
        };
        *self.last.write() = Some(last);
    }

    fn record_skip(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
        metrics::record_cycle(CycleOutcome::Skipped);
    }
}

// =============================================================================
// Scheduler
// =============================================================================

/// Periodic, non-overlapping cycle trigger.
pub struct Scheduler {
    runner: Arc<dyn CycleRunner>,
    period: Duration,
    guard: Arc<Mutex<()>>,
    status: Arc<CycleStatus>,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("period", &self.period)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl Scheduler {
    /// Create a scheduler.
    #[must_use]
    pub fn new(runner: Arc<dyn CycleRunner>, period: Duration, status: Arc<CycleStatus>) -> Self {
        Self {
            runner,
            period,
            guard: Arc::new(Mutex::new(())),
            status,
        }
    }

    /// Shared status.
    #[must_use]
    pub const fn status(&self) -> &Arc<CycleStatus> {
        &self.status
    }

    /// Run until `shutdown` is cancelled.
    ///
    /// The first tick fires immediately. A cycle still in flight at shutdown
    /// is aborted.
    pub async fn run(self, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(period = ?self.period, "Scheduler started");

        let mut in_flight: Option<JoinHandle<()>> = None;
        loop {
            tokio::select! {
                () = shutdown.cancelled() => {
                    tracing::info!("Scheduler stopping");
                    break;
                }
                _ = ticker.tick() => {
                    if let Some(handle) = self.on_tick() {
                        in_flight = Some(handle);
                    }
                }
            }
        }

        if let Some(handle) = in_flight {
            handle.abort();
        }
    }

    fn on_tick(&self) -> Option<JoinHandle<()>> {
        let Ok(permit) = Arc::clone(&self.guard).try_lock_owned() else {
            tracing::warn!("Previous cycle still running, skipping tick");
            self.status.record_skip();
            return None;
        };

        let runner = Arc::clone(&self.runner);
        let status = Arc::clone(&self.status);
        Some(tokio::spawn(async move {
            let _permit = permit;
            let result = runner.run_cycle().await;
            if let Err(e) = &result {
                tracing::error!(error = %e, "Cycle aborted, keeping previous snapshot");
            }
            status.record(&result);
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::atomic::AtomicUsize;
    use uuid::Uuid;

    struct SlowRunner {
        runs: AtomicUsize,
        duration: Duration,
        fail: bool,
    }

    impl SlowRunner {
        fn new(duration: Duration, fail: bool) -> Arc<Self> {
            Arc::new(Self {
                runs: AtomicUsize::new(0),
                duration,
                fail,
            })
        }
    }

    #[async_trait]
    impl CycleRunner for SlowRunner {
        async fn run_cycle(&self) -> Result<CycleReport, CycleError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.duration).await;
            if self.fail {
                return Err(CycleError::NoFeeds);
            }
            Ok(CycleReport {
                cycle_id: Uuid::new_v4(),
                started_at: Utc::now(),
                feeds_failed: 0,
                items_seen: 0,
                survivors: 0,
                drops: BTreeMap::new(),
                duration_ms: 0,
                generation: 1,
            })
        }
    }

    async fn run_for(runner: Arc<SlowRunner>, period: Duration, run_time: Duration) -> Arc<CycleStatus> {
        let status = Arc::new(CycleStatus::new());
        let scheduler = Scheduler::new(runner, period, Arc::clone(&status));
        let shutdown = CancellationToken::new();

        let handle = tokio::spawn(scheduler.run(shutdown.clone()));
        tokio::time::sleep(run_time).await;
        shutdown.cancel();
        handle.await.unwrap();
        status
    }

    #[tokio::test]
    async fn runs_immediately_at_startup() {
        let runner = SlowRunner::new(Duration::ZERO, false);
        let status = run_for(Arc::clone(&runner), Duration::from_secs(3600), Duration::from_millis(100)).await;

        assert_eq!(runner.runs.load(Ordering::SeqCst), 1);
        assert_eq!(status.completed(), 1);
        assert_eq!(status.skipped(), 0);
        assert!(matches!(
            status.last().map(|l| l.outcome),
            Some(CycleOutcome::Completed)
        ));
    }

    #[tokio::test]
    async fn overlapping_ticks_are_skipped() {
        let runner = SlowRunner::new(Duration::from_millis(250), false);
        let status = run_for(Arc::clone(&runner), Duration::from_millis(50), Duration::from_millis(400)).await;

        // Only the first cycle can start before the 400ms mark; a second one
        // may start after it finishes at ~250ms.
        let runs = runner.runs.load(Ordering::SeqCst);
        assert!((1..=2).contains(&runs), "runs = {runs}");
        assert!(status.skipped() >= 3, "skipped = {}", status.skipped());
    }

    #[tokio::test]
    async fn aborted_cycle_is_recorded() {
        let runner = SlowRunner::new(Duration::ZERO, true);
        let status = run_for(runner, Duration::from_secs(3600), Duration::from_millis(100)).await;

        assert_eq!(status.aborted(), 1);
        let last = status.last().unwrap();
        assert!(matches!(last.outcome, CycleOutcome::Aborted));
        assert_eq!(last.error.as_deref(), Some("no feeds configured"));
    }

    #[tokio::test]
    async fn shutdown_stops_periodic_runs() {
        let runner = SlowRunner::new(Duration::ZERO, false);
        let _ = run_for(Arc::clone(&runner), Duration::from_millis(20), Duration::from_millis(100)).await;
        let after_shutdown = runner.runs.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(runner.runs.load(Ordering::SeqCst), after_shutdown);
    }
}
