//! Domain Layer - Pipeline rules and value types.
//!
//! Everything here is synchronous and free of I/O. The application layer
//! feeds these rules with data pulled through its ports.

/// Shared value objects (symbols).
pub mod shared;

/// Raw feed items as delivered by a feed source.
pub mod feed;

/// Prioritized ticker extraction.
pub mod extraction;

/// Keyword and recency predicates.
pub mod gates;

/// Market data records and derived values.
pub mod quote;

/// Eligibility rules applied after enrichment.
pub mod eligibility;

/// Float-share tier classification.
pub mod float_tier;

/// Display records, ordering and atomic publication.
pub mod snapshot;
