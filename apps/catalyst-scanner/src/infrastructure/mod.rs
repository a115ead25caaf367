//! Infrastructure Layer - Adapters and external integrations.
//!
//! Concrete implementations of the application ports plus the process-level
//! plumbing (configuration, HTTP surface, metrics, telemetry).

/// Article body fetcher and HTML-to-text reduction.
pub mod article;

/// Shared outbound HTTP client.
pub mod client;

/// Configuration loading and validation.
pub mod config;

/// RSS feed source adapter.
pub mod feed;

/// Financial Modeling Prep quote source adapter.
pub mod fmp;

/// Snapshot view, health and metrics endpoints.
pub mod http;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// Logging and OpenTelemetry tracing integration.
pub mod telemetry;
