#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! Catalyst Scanner - Press-Release Momentum Pipeline
//!
//! Polls press-release feeds, pulls ticker mentions out of headlines and
//! article bodies, enriches them with cached market data and publishes a
//! small, ordered snapshot of momentum catalysts.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Pure pipeline rules
//!   - `extraction`: Prioritized ticker extraction rules
//!   - `gates`: Keyword and recency predicates
//!   - `eligibility`: Format, price, exchange and country rules
//!   - `float_tier`: Float-share tier classification
//!   - `snapshot`: Display records, ordering, atomic publication
//!
//! - **Application**: Ports and services
//!   - `ports`: Feed, article and quote source interfaces
//!   - `services`: Market data cache, cycle pipeline, scheduler
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `feed`: RSS feed source
//!   - `article`: Article body fetcher
//!   - `fmp`: Financial Modeling Prep quote source
//!   - `config`: YAML configuration with env interpolation
//!   - `http`: Snapshot view and health endpoints
//!   - `metrics` / `telemetry`: Prometheus counters, tracing and OTLP export
//!
//! # Data Flow
//!
//! ```text
//! Scheduler tick
//!   └─► FeedSource ─► RecencyGate ─► KeywordGate ─► ArticleFetcher
//!         ─► TickerExtractor ─► MarketDataProvider (cached, single-flight)
//!         ─► EligibilityClassifier + FloatTierClassifier
//!         ─► SnapshotAssembler ─► SnapshotStore ◄── GET /api/snapshot
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Pipeline rules with no I/O.
pub mod domain;

/// Application layer - Ports and orchestration services.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::eligibility::{EligibilityClassifier, EligibilityRules, Rejection, UnknownPricePolicy};
pub use domain::extraction::{Extraction, ExtractionRule, TickerExtractor};
pub use domain::feed::FeedItem;
pub use domain::float_tier::{FloatThresholds, FloatTier, FloatTierClassifier, HighFloatPolicy};
pub use domain::gates::{KeywordGate, RecencyGate};
pub use domain::quote::QuoteRecord;
pub use domain::shared::Symbol;
pub use domain::snapshot::{DisplayRecord, Snapshot, SnapshotAssembler, SnapshotStore};

// Application
pub use application::ports::{
    ArticleError, ArticleFetcherPort, FeedError, FeedSourcePort, QuoteSourceError,
    QuoteSourcePort,
};
pub use application::services::{
    CatalystPipeline, CycleError, CycleOutcome, CycleReport, CycleRunner, CycleStatus,
    DropReason, LastCycle, MarketDataProvider, PipelineSettings, QuoteCache, Scheduler,
};

// Infrastructure config
pub use infrastructure::config::{ConfigError, ScannerConfig, load_config, load_config_from_string};

// HTTP server
pub use infrastructure::http::{HttpServer, HttpServerError, HttpState, create_router};

// Metrics
pub use infrastructure::metrics::{get_metrics_handle, init_metrics};

// Telemetry
pub use infrastructure::telemetry::{TelemetryConfig, TelemetryGuard, init as init_telemetry};
