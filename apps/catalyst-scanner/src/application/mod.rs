//! Application Layer - Ports and orchestration.
//!
//! Ports describe what the pipeline needs from the outside world; services
//! drive the domain rules with data pulled through those ports.

/// Driven ports: feed, article and quote sources.
pub mod ports;

/// Pipeline services: market data cache, cycle pipeline, scheduler.
pub mod services;
