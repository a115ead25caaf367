//! Snapshot View, Health and Metrics Endpoints
//!
//! # Endpoints
//!
//! - `GET /api/snapshot` - Current published snapshot as JSON
//! - `GET /health` - JSON health status with the last cycle report
//! - `GET /healthz` - Liveness probe (simple OK)
//! - `GET /readyz` - Readiness probe (ready once a snapshot is published)
//! - `GET /metrics` - Prometheus metrics in text format
//!
//! Handlers only read shared state; none of them can trigger or mutate a
//! cycle.

use std::sync::Arc;
use std::time::Instant;

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::application::services::{CycleOutcome, CycleStatus, LastCycle, QuoteCache};
use crate::domain::snapshot::{Snapshot, SnapshotStore};
use crate::infrastructure::metrics::get_metrics_handle;

// =============================================================================
// Health Response Types
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: HealthStatus,
    /// Scanner version.
    pub version: String,
    /// Server uptime in seconds.
    pub uptime_secs: u64,
    /// Current time.
    pub current_time: DateTime<Utc>,
    /// Most recent finished cycle, if any.
    pub last_cycle: Option<LastCycle>,
    /// Cycle counters.
    pub cycles: CycleCounts,
    /// Published snapshot.
    pub snapshot: SnapshotInfo,
    /// Symbols held in the quote cache.
    pub quote_cache_entries: usize,
}

/// Overall health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// The last cycle published a snapshot.
    Healthy,
    /// Serving a stale snapshot, or no cycle has finished yet.
    Degraded,
    /// Cycles are aborting and nothing has ever been published.
    Unhealthy,
}

/// Cycle counters since startup.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CycleCounts {
    /// Cycles that published.
    pub completed: u64,
    /// Cycles aborted before publishing.
    pub aborted: u64,
    /// Ticks skipped while a cycle was running.
    pub skipped: u64,
}

/// Published snapshot summary.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotInfo {
    /// Generation; 0 until the first publish.
    pub generation: u64,
    /// Publish time of this generation.
    pub published_at: DateTime<Utc>,
    /// Record count.
    pub records: usize,
}

// =============================================================================
// Server State
// =============================================================================

/// Shared, read-only state for the HTTP handlers.
#[derive(Debug)]
pub struct HttpState {
    version: String,
    started_at: Instant,
    store: Arc<SnapshotStore>,
    status: Arc<CycleStatus>,
    cache: Arc<QuoteCache>,
}

impl HttpState {
    /// Create handler state.
    #[must_use]
    pub fn new(store: Arc<SnapshotStore>, status: Arc<CycleStatus>, cache: Arc<QuoteCache>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: Instant::now(),
            store,
            status,
            cache,
        }
    }
}

/// Build the router over shared state.
pub fn create_router(state: Arc<HttpState>) -> Router {
    Router::new()
        .route("/api/snapshot", get(snapshot_handler))
        .route("/health", get(health_handler))
        .route("/healthz", get(liveness_handler))
        .route("/readyz", get(readiness_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

// =============================================================================
// HTTP Server
// =============================================================================

/// Snapshot and health HTTP server.
#[derive(Debug)]
pub struct HttpServer {
    bind_address: String,
    port: u16,
    state: Arc<HttpState>,
    cancel: CancellationToken,
}

impl HttpServer {
    /// Create a new server.
    #[must_use]
    pub fn new(
        bind_address: impl Into<String>,
        port: u16,
        state: Arc<HttpState>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            bind_address: bind_address.into(),
            port,
            state,
            cancel,
        }
    }

    /// Run until cancelled.
    ///
    /// # Errors
    ///
    /// Returns `HttpServerError` if binding fails or the server hits a fatal
    /// error while running.
    pub async fn run(self) -> Result<(), HttpServerError> {
        let app = create_router(self.state);

        let addr = format!("{}:{}", self.bind_address, self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| HttpServerError::BindFailed(addr.clone(), e.to_string()))?;

        tracing::info!(addr = %addr, "HTTP server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(self.cancel.cancelled_owned())
            .await
            .map_err(|e| HttpServerError::ServerFailed(e.to_string()))?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

// =============================================================================
// HTTP Handlers
// =============================================================================

async fn snapshot_handler(State(state): State<Arc<HttpState>>) -> Json<Arc<Snapshot>> {
    Json(state.store.load())
}

async fn health_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let response = build_health_response(&state);
    let status_code = match response.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status_code, Json(response))
}

async fn liveness_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn readiness_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    if state.store.load().generation > 0 {
        (StatusCode::OK, "READY")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
    }
}

async fn metrics_handler() -> impl IntoResponse {
    get_metrics_handle().map_or_else(
        || {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                [("content-type", "text/plain")],
                "Metrics not initialized".to_string(),
            )
        },
        |handle| {
            (
                StatusCode::OK,
                [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
                handle.render(),
            )
        },
    )
}

fn build_health_response(state: &HttpState) -> HealthResponse {
    let snapshot = state.store.load();
    let last_cycle = state.status.last();
    let status = determine_health_status(last_cycle.as_ref().map(|l| l.outcome), snapshot.generation);

    HealthResponse {
        status,
        version: state.version.clone(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        current_time: Utc::now(),
        last_cycle,
        cycles: CycleCounts {
            completed: state.status.completed(),
            aborted: state.status.aborted(),
            skipped: state.status.skipped(),
        },
        snapshot: SnapshotInfo {
            generation: snapshot.generation,
            published_at: snapshot.published_at,
            records: snapshot.len(),
        },
        quote_cache_entries: state.cache.len(),
    }
}

const fn determine_health_status(last: Option<CycleOutcome>, generation: u64) -> HealthStatus {
    match (last, generation) {
        (Some(CycleOutcome::Completed), _) => HealthStatus::Healthy,
        (Some(CycleOutcome::Aborted), 0) => HealthStatus::Unhealthy,
        _ => HealthStatus::Degraded,
    }
}

// =============================================================================
// Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, thiserror::Error)]
pub enum HttpServerError {
    /// Failed to bind the listen address.
    #[error("failed to bind to {0}: {1}")]
    BindFailed(String, String),

    /// Server error.
    #[error("server error: {0}")]
    ServerFailed(String),
}

// =============================================================================
// Tests
// =============================================================================
