//! Market Data Provider
//!
//! Memoizing, single-flight front for a [`QuoteSourcePort`].
//!
//! - The first call for a symbol performs the external lookup; concurrent
//!   callers for the same symbol await that same lookup.
//! - Successful results are kept for the lifetime of the process and never
//!   re-queried.
//! - Failed lookups are memoized only when `cache_failures` is set;
//!   otherwise the entry is evicted and the next call retries.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::OnceCell;

use crate::application::ports::QuoteSourcePort;
use crate::domain::quote::QuoteRecord;
use crate::domain::shared::Symbol;
use crate::infrastructure::metrics::{self, LookupOutcome};

/// A settled lookup: `Some` for data, `None` for a memoized failure.
type Settled = Option<Arc<QuoteRecord>>;
type Slot = Arc<OnceCell<Settled>>;

// =============================================================================
// Cache
// =============================================================================

/// Per-symbol quote cache. Entries never expire.
#[derive(Debug, Default)]
pub struct QuoteCache {
    slots: Mutex<HashMap<Symbol, Slot>>,
}

impl QuoteCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Settled entry for a symbol, if any.
    ///
    /// Returns `None` when the symbol was never looked up or its lookup is
    /// still in flight.
    #[must_use]
    pub fn get(&self, symbol: &Symbol) -> Option<Settled> {
        self.slots.lock().get(symbol).and_then(|slot| slot.get().cloned())
    }

    /// Number of entries, including in-flight lookups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }

    fn slot(&self, symbol: &Symbol) -> Slot {
        Arc::clone(self.slots.lock().entry(symbol.clone()).or_default())
    }

    /// Remove the entry only if it is still `slot`.
    fn evict(&self, symbol: &Symbol, slot: &Slot) {
        let mut slots = self.slots.lock();
        if slots.get(symbol).is_some_and(|current| Arc::ptr_eq(current, slot)) {
            slots.remove(symbol);
        }
    }
}

// =============================================================================
// Provider
// =============================================================================

/// Cached market data lookups.
pub struct MarketDataProvider {
    source: Arc<dyn QuoteSourcePort>,
    cache: Arc<QuoteCache>,
    cache_failures: bool,
    lookup_timeout: Duration,
}

impl std::fmt::Debug for MarketDataProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketDataProvider")
            .field("cache_entries", &self.cache.len())
            .field("cache_failures", &self.cache_failures)
            .field("lookup_timeout", &self.lookup_timeout)
            .finish_non_exhaustive()
    }
}

impl MarketDataProvider {
    /// Create a provider over `source`, using an injected cache.
    #[must_use]
    pub fn new(
        source: Arc<dyn QuoteSourcePort>,
        cache: Arc<QuoteCache>,
        cache_failures: bool,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            source,
            cache,
            cache_failures,
            lookup_timeout,
        }
    }

    /// The cache backing this provider.
    #[must_use]
    pub fn cache(&self) -> &Arc<QuoteCache> {
        &self.cache
    }

    /// Market data for `symbol`, or `None` if the lookup failed.
    #[allow(clippy::cast_precision_loss)]
    pub async fn quote(&self, symbol: &Symbol) -> Option<Arc<QuoteRecord>> {
        let slot = self.cache.slot(symbol);

        if let Some(settled) = slot.get() {
            metrics::record_quote_lookup(LookupOutcome::Hit);
            return settled.clone();
        }

        let mut performed = false;
        let settled = slot
            .get_or_init(|| {
                performed = true;
                self.lookup(symbol)
            })
            .await
            .clone();

        if !performed {
            metrics::record_quote_lookup(LookupOutcome::Hit);
        }

        if settled.is_none() && !self.cache_failures {
            self.cache.evict(symbol, &slot);
        }

        metrics::set_quote_cache_size(self.cache.len() as f64);
        settled
    }

    async fn lookup(&self, symbol: &Symbol) -> Settled {
        match tokio::time::timeout(self.lookup_timeout, self.source.lookup(symbol)).await {
            Ok(Ok(record)) => {
                tracing::debug!(symbol = %symbol, price = ?record.price, "Quote fetched");
                metrics::record_quote_lookup(LookupOutcome::Miss);
                Some(Arc::new(record))
            }
            Ok(Err(e)) => {
                tracing::warn!(symbol = %symbol, error = %e, "Quote lookup failed");
                metrics::record_quote_lookup(LookupOutcome::Failure);
                None
            }
            Err(_) => {
                tracing::warn!(
                    symbol = %symbol,
                    timeout = ?self.lookup_timeout,
                    "Quote lookup timed out"
                );
                metrics::record_quote_lookup(LookupOutcome::Failure);
                None
            }
        }
    }
}
