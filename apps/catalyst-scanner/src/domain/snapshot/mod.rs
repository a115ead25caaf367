//! Snapshot Assembly and Publication
//!
//! Survivors of a cycle become [`DisplayRecord`]s, are ordered newest first
//! (ties broken by feed order) and published as one immutable [`Snapshot`].
//!
//! The [`SnapshotStore`] is single-writer, multi-reader. Readers load the
//! current `Arc<Snapshot>` without locking and always observe either the
//! previous or the next complete snapshot, never a partial one.

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::feed::FeedItem;
use crate::domain::float_tier::{FloatTier, format_float};
use crate::domain::quote::QuoteRecord;
use crate::domain::shared::Symbol;

/// Local timestamp format, 24-hour.
pub const LOCAL_TIMESTAMP_FORMAT: &str = "%m/%d/%Y, %H:%M";

/// Marker rendered for unknown prices.
pub const UNKNOWN_MARKER: &str = "N/A";

// =============================================================================
// Records
// =============================================================================

/// One row of the published snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayRecord {
    /// Publish time in the display timezone.
    pub timestamp_local: String,
    /// Ticker.
    pub symbol: Symbol,
    /// Headline.
    pub headline: String,
    /// Article link.
    pub link: String,
    /// Price with two decimals, or `N/A`.
    pub price: String,
    /// Percent change from previous close, two decimals.
    pub percent_change: Decimal,
    /// Float shares, if known.
    pub float_shares: Option<u64>,
    /// Human-readable float.
    pub float_display: String,
    /// Float tier.
    pub tier: FloatTier,
    /// Publish time (UTC), the primary sort key.
    pub published_at: DateTime<Utc>,
    /// Position in the cycle's feed order, the tie-breaker.
    #[serde(skip)]
    pub feed_index: usize,
}

/// Immutable, ordered result of one successful cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// Monotonically increasing publication counter; 0 before the first cycle.
    pub generation: u64,
    /// When this snapshot was published.
    pub published_at: DateTime<Utc>,
    /// Records, newest first.
    pub records: Vec<DisplayRecord>,
}

impl Snapshot {
    /// Empty snapshot served before the first cycle completes.
    #[must_use]
    pub fn initial() -> Self {
        Self {
            generation: 0,
            published_at: Utc::now(),
            records: Vec::new(),
        }
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the snapshot has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// =============================================================================
// Assembler
// =============================================================================

/// Builds display records and orders them for publication.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotAssembler {
    timezone: Tz,
}

impl Default for SnapshotAssembler {
    fn default() -> Self {
        Self::new(chrono_tz::America::Los_Angeles)
    }
}

impl SnapshotAssembler {
    /// Create an assembler rendering local times in `timezone`.
    #[must_use]
    pub const fn new(timezone: Tz) -> Self {
        Self { timezone }
    }

    /// Display timezone.
    #[must_use]
    pub const fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Build the display record for a surviving item.
    #[must_use]
    pub fn display_record(
        &self,
        feed_index: usize,
        item: &FeedItem,
        published_at: DateTime<Utc>,
        quote: &QuoteRecord,
        tier: FloatTier,
    ) -> DisplayRecord {
        DisplayRecord {
            timestamp_local: published_at
                .with_timezone(&self.timezone)
                .format(LOCAL_TIMESTAMP_FORMAT)
                .to_string(),
            symbol: quote.symbol.clone(),
            headline: item.title.clone(),
            link: item.link.clone(),
            price: quote
                .price
                .map_or_else(|| UNKNOWN_MARKER.to_string(), |p| format!("{p:.2}")),
            percent_change: quote.percent_change().round_dp(2),
            float_shares: quote.float_shares,
            float_display: format_float(quote.float_shares),
            tier,
            published_at,
            feed_index,
        }
    }

    /// Order records: publish time descending, then feed order ascending.
    #[must_use]
    pub fn order(mut records: Vec<DisplayRecord>) -> Vec<DisplayRecord> {
        records.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then_with(|| a.feed_index.cmp(&b.feed_index))
        });
        records
    }

    /// Order records and atomically publish them as the next snapshot.
    pub fn publish(&self, store: &SnapshotStore, records: Vec<DisplayRecord>) -> Arc<Snapshot> {
        store.publish(Self::order(records))
    }
}

// =============================================================================
// Store
// =============================================================================

/// Shared holder of the current snapshot.
#[derive(Debug)]
pub struct SnapshotStore {
    current: ArcSwap<Snapshot>,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore {
    /// Create a store holding the initial empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(Snapshot::initial()),
        }
    }

    /// Current snapshot. Never blocks.
    #[must_use]
    pub fn load(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Replace the snapshot wholesale with the next generation.
    ///
    /// Records are published in the order given. Callers must not publish
    /// concurrently.
    pub fn publish(&self, records: Vec<DisplayRecord>) -> Arc<Snapshot> {
        let generation = self.current.load().generation + 1;
        let next = Arc::new(Snapshot {
            generation,
            published_at: Utc::now(),
            records,
        });
        self.current.store(Arc::clone(&next));
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn record(symbol: &str, published_at: DateTime<Utc>, feed_index: usize) -> DisplayRecord {
        let quote = QuoteRecord {
            price: Some(dec!(3.5)),
            previous_close: Some(dec!(3)),
            float_shares: Some(4_000_000),
            ..QuoteRecord::empty(Symbol::new(symbol))
        };
        let item = FeedItem::new(format!("{symbol} news"), "", "https://example.com", None);
        SnapshotAssembler::default().display_record(feed_index, &item, published_at, &quote, FloatTier::Bright)
    }

    #[test]
    fn display_record_formats_fields() {
        let at = Utc.with_ymd_and_hms(2025, 10, 14, 13, 5, 0).unwrap();
        let r = record("ACME", at, 0);

        assert_eq!(r.price, "3.50");
        assert_eq!(r.percent_change, dec!(16.67));
        assert_eq!(r.float_display, "4.00M");
        assert_eq!(r.timestamp_local, "10/14/2025, 06:05");
        assert_eq!(r.tier, FloatTier::Bright);
    }

    #[test]
    fn unknown_price_renders_marker() {
        let quote = QuoteRecord::empty(Symbol::new("ACME"));
        let item = FeedItem::new("ACME", "", "https://example.com", None);
        let r = SnapshotAssembler::default().display_record(0, &item, Utc::now(), &quote, FloatTier::Unknown);

        assert_eq!(r.price, UNKNOWN_MARKER);
        assert_eq!(r.percent_change, Decimal::ZERO);
        assert_eq!(r.float_display, "N/A");
    }

    #[test]
    fn later_item_listed_first() {
        let t1 = Utc::now() - Duration::hours(3);
        let t2 = Utc::now() - Duration::hours(1);
        let ordered = SnapshotAssembler::order(vec![record("OLD", t1, 0), record("NEW", t2, 1)]);

        assert_eq!(ordered[0].symbol.as_str(), "NEW");
        assert_eq!(ordered[1].symbol.as_str(), "OLD");
    }

    #[test]
    fn ties_keep_feed_order() {
        let t = Utc::now();
        let ordered = SnapshotAssembler::order(vec![
            record("CCC", t, 2),
            record("AAA", t, 0),
            record("BBB", t, 1),
        ]);
        let symbols: Vec<_> = ordered.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, ["AAA", "BBB", "CCC"]);
    }

    #[test]
    fn publish_increments_generation() {
        let store = SnapshotStore::new();
        assert_eq!(store.load().generation, 0);
        assert!(store.load().is_empty());

        let first = SnapshotAssembler::default().publish(&store, vec![record("ACME", Utc::now(), 0)]);
        assert_eq!(first.generation, 1);
        assert_eq!(store.load().len(), 1);

        store.publish(Vec::new());
        assert_eq!(store.load().generation, 2);
        assert!(store.load().is_empty());
    }

    #[test]
    fn held_snapshot_is_unaffected_by_publish() {
        let store = SnapshotStore::new();
        store.publish(vec![record("ACME", Utc::now(), 0)]);
        let held = store.load();

        store.publish(Vec::new());
        assert_eq!(held.len(), 1);
        assert_eq!(held.generation, 1);
    }

    #[test]
    fn concurrent_readers_see_complete_snapshots() {
        let store = SnapshotStore::new();
        let now = Utc::now();

        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..2_000 {
                        let snap = store.load();
                        // Generation N is always published with N records.
                        assert_eq!(snap.len() as u64, snap.generation);
                    }
                });
            }
            s.spawn(|| {
                for n in 1..=50_usize {
                    let records = (0..n).map(|i| record("ACME", now, i)).collect();
                    store.publish(records);
                }
            });
        });

        assert_eq!(store.load().generation, 50);
    }
}
