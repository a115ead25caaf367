//! Pipeline Cycle Integration Tests
//!
//! Runs full cycles against in-memory feed, article and quote sources and
//! checks what ends up in the published snapshot.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use rust_decimal_macros::dec;

use catalyst_scanner::{
    ArticleError, ArticleFetcherPort, CatalystPipeline, CycleError, FeedError, FeedItem,
    FeedSourcePort, FloatTier, KeywordGate, MarketDataProvider, PipelineSettings, QuoteCache,
    QuoteRecord, QuoteSourceError, QuoteSourcePort, RecencyGate, SnapshotStore, Symbol,
};

const FEED_A: &str = "https://feeds.test/a";
const FEED_B: &str = "https://feeds.test/b";

// =============================================================================
// Fakes
// =============================================================================

#[derive(Default)]
struct FakeFeeds {
    feeds: Mutex<HashMap<String, Option<Vec<FeedItem>>>>,
}

impl FakeFeeds {
    fn serve(&self, url: &str, items: Vec<FeedItem>) {
        self.feeds.lock().insert(url.to_string(), Some(items));
    }

    fn fail(&self, url: &str) {
        self.feeds.lock().insert(url.to_string(), None);
    }
}

#[async_trait]
impl FeedSourcePort for FakeFeeds {
    async fn fetch(&self, url: &str) -> Result<Vec<FeedItem>, FeedError> {
        match self.feeds.lock().get(url) {
            Some(Some(items)) => Ok(items.clone()),
            _ => Err(FeedError::Status {
                url: url.to_string(),
                status: 503,
            }),
        }
    }
}

#[derive(Default)]
struct FakeArticles {
    bodies: HashMap<String, String>,
}

#[async_trait]
impl ArticleFetcherPort for FakeArticles {
    async fn fetch(&self, url: &str) -> Result<String, ArticleError> {
        self.bodies.get(url).cloned().ok_or(ArticleError::Status { status: 404 })
    }
}

#[derive(Default)]
struct FakeQuotes {
    records: HashMap<Symbol, QuoteRecord>,
    calls: AtomicUsize,
}

impl FakeQuotes {
    fn with(mut self, record: QuoteRecord) -> Self {
        self.records.insert(record.symbol.clone(), record);
        self
    }
}

#[async_trait]
impl QuoteSourcePort for FakeQuotes {
    async fn lookup(&self, symbol: &Symbol) -> Result<QuoteRecord, QuoteSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.records
            .get(symbol)
            .cloned()
            .ok_or_else(|| QuoteSourceError::SymbolNotFound {
                symbol: symbol.to_string(),
            })
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 14, 14, 5, 0).unwrap()
}

fn item(title: &str, link: &str, hours_ago: i64) -> FeedItem {
    let published = now() - chrono::Duration::hours(hours_ago);
    FeedItem::new(title, "", link, Some(published.to_rfc2822().as_str()))
}

fn quote(symbol: &str, price: rust_decimal::Decimal, float: u64) -> QuoteRecord {
    QuoteRecord {
        price: Some(price),
        previous_close: Some(dec!(3.00)),
        float_shares: Some(float),
        exchange: Some("NASDAQ".to_string()),
        country: Some("US".to_string()),
        ..QuoteRecord::empty(Symbol::new(symbol))
    }
}

fn articles(links: &[&str]) -> Arc<FakeArticles> {
    Arc::new(FakeArticles {
        bodies: links
            .iter()
            .map(|l| ((*l).to_string(), "Full press release text.".to_string()))
            .collect(),
    })
}

fn settings(urls: &[&str]) -> PipelineSettings {
    let mut settings = PipelineSettings::for_feeds(urls.iter().map(ToString::to_string).collect());
    settings.keyword_gate = KeywordGate::new(["positive", "acquisition", "approval"]);
    settings.recency_gate = RecencyGate::from_hours(12);
    settings
}

struct Harness {
    pipeline: CatalystPipeline,
    feeds: Arc<FakeFeeds>,
    quotes: Arc<FakeQuotes>,
    store: Arc<SnapshotStore>,
}

fn harness(
    settings: PipelineSettings,
    feeds: FakeFeeds,
    articles: Arc<FakeArticles>,
    quotes: FakeQuotes,
) -> Harness {
    let feeds = Arc::new(feeds);
    let quotes = Arc::new(quotes);
    let store = Arc::new(SnapshotStore::new());
    let market_data = Arc::new(MarketDataProvider::new(
        Arc::clone(&quotes) as Arc<dyn QuoteSourcePort>,
        Arc::new(QuoteCache::new()),
        false,
        Duration::from_secs(5),
    ));
    let pipeline = CatalystPipeline::new(
        settings,
        Arc::clone(&feeds) as Arc<dyn FeedSourcePort>,
        articles,
        market_data,
        Arc::clone(&store),
    );
    Harness {
        pipeline,
        feeds,
        quotes,
        store,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn qualifying_item_is_published() {
    let feeds = FakeFeeds::default();
    feeds.serve(
        FEED_A,
        vec![item(
            "Acme Pharma Announces Positive Phase 3 Results (NASDAQ: ACME)",
            "https://news.test/acme",
            1,
        )],
    );
    let h = harness(
        settings(&[FEED_A]),
        feeds,
        articles(&["https://news.test/acme"]),
        FakeQuotes::default().with(quote("ACME", dec!(3.50), 4_000_000)),
    );

    let report = h.pipeline.run_at(now()).await.unwrap();

    assert_eq!(report.items_seen, 1);
    assert_eq!(report.survivors, 1);
    assert_eq!(report.generation, 1);

    let snapshot = h.store.load();
    assert_eq!(snapshot.generation, 1);
    let record = &snapshot.records[0];
    assert_eq!(record.symbol.as_str(), "ACME");
    assert_eq!(record.price, "3.50");
    assert_eq!(record.percent_change, dec!(16.67));
    assert_eq!(record.tier, FloatTier::Bright);
    assert_eq!(record.float_display, "4.00M");
    assert_eq!(record.timestamp_local, "10/14/2025, 06:05");
}

#[tokio::test]
async fn stale_item_is_dropped() {
    let feeds = FakeFeeds::default();
    feeds.serve(
        FEED_A,
        vec![item(
            "XYZ Corp Completes Acquisition (NYSE: XYZ)",
            "https://news.test/xyz",
            20,
        )],
    );
    let h = harness(
        settings(&[FEED_A]),
        feeds,
        articles(&["https://news.test/xyz"]),
        FakeQuotes::default().with(quote("XYZ", dec!(5), 8_000_000)),
    );

    let report = h.pipeline.run_at(now()).await.unwrap();

    assert_eq!(report.survivors, 0);
    assert_eq!(report.drops.get("stale"), Some(&1));
    assert_eq!(h.quotes.calls.load(Ordering::SeqCst), 0);
    assert!(h.store.load().is_empty());
}

#[tokio::test]
async fn records_ordered_by_recency_then_feed_order() {
    let feeds = FakeFeeds::default();
    feeds.serve(
        FEED_A,
        vec![
            item("Older Positive News (NASDAQ: OLD)", "https://news.test/old", 5),
            item("Tied Positive News (NASDAQ: TIEA)", "https://news.test/tiea", 2),
        ],
    );
    feeds.serve(
        FEED_B,
        vec![
            item("Tied Approval News (NASDAQ: TIEB)", "https://news.test/tieb", 2),
            item("Newest Approval News (NASDAQ: NEW)", "https://news.test/new", 1),
        ],
    );
    let h = harness(
        settings(&[FEED_A, FEED_B]),
        feeds,
        articles(&[
            "https://news.test/old",
            "https://news.test/tiea",
            "https://news.test/tieb",
            "https://news.test/new",
        ]),
        FakeQuotes::default()
            .with(quote("OLD", dec!(2), 1_000_000))
            .with(quote("TIEA", dec!(2), 1_000_000))
            .with(quote("TIEB", dec!(2), 1_000_000))
            .with(quote("NEW", dec!(2), 1_000_000)),
    );

    h.pipeline.run_at(now()).await.unwrap();

    let symbols: Vec<String> = h
        .store
        .load()
        .records
        .iter()
        .map(|r| r.symbol.to_string())
        .collect();
    assert_eq!(symbols, ["NEW", "TIEA", "TIEB", "OLD"]);
}

#[tokio::test]
async fn all_feeds_failing_keeps_previous_snapshot() {
    let feeds = FakeFeeds::default();
    feeds.serve(
        FEED_A,
        vec![item(
            "Acme Pharma Announces Positive Results (NASDAQ: ACME)",
            "https://news.test/acme",
            1,
        )],
    );
    let h = harness(
        settings(&[FEED_A]),
        feeds,
        articles(&["https://news.test/acme"]),
        FakeQuotes::default().with(quote("ACME", dec!(3.50), 4_000_000)),
    );

    h.pipeline.run_at(now()).await.unwrap();
    let before = h.store.load();

    h.feeds.fail(FEED_A);
    let err = h.pipeline.run_at(now()).await.unwrap_err();

    assert!(matches!(err, CycleError::AllFeedsFailed { attempted: 1, .. }));
    let after = h.store.load();
    assert_eq!(after.generation, before.generation);
    assert_eq!(after.records, before.records);
}

#[tokio::test]
async fn partial_feed_failure_still_publishes() {
    let feeds = FakeFeeds::default();
    feeds.fail(FEED_A);
    feeds.serve(
        FEED_B,
        vec![item(
            "Acme Pharma Announces Positive Results (NASDAQ: ACME)",
            "https://news.test/acme",
            1,
        )],
    );
    let h = harness(
        settings(&[FEED_A, FEED_B]),
        feeds,
        articles(&["https://news.test/acme"]),
        FakeQuotes::default().with(quote("ACME", dec!(3.50), 4_000_000)),
    );

    let report = h.pipeline.run_at(now()).await.unwrap();

    assert_eq!(report.feeds_failed, 1);
    assert_eq!(report.survivors, 1);
    assert_eq!(h.store.load().generation, 1);
}

#[tokio::test]
async fn foreign_listing_rejected_before_quote_lookup() {
    let feeds = FakeFeeds::default();
    feeds.serve(
        FEED_A,
        vec![item(
            "Alibaba Announces Acquisition (NYSE: BABA.HK)",
            "https://news.test/baba",
            1,
        )],
    );
    let h = harness(
        settings(&[FEED_A]),
        feeds,
        articles(&["https://news.test/baba"]),
        FakeQuotes::default(),
    );

    let report = h.pipeline.run_at(now()).await.unwrap();

    assert_eq!(report.drops.get("format"), Some(&1));
    assert_eq!(h.quotes.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn repeated_symbol_looked_up_once_per_process() {
    let feeds = FakeFeeds::default();
    feeds.serve(
        FEED_A,
        vec![
            item("Acme Positive Results (NASDAQ: ACME)", "https://news.test/acme1", 1),
            item("Acme Receives Approval (NASDAQ: ACME)", "https://news.test/acme2", 2),
        ],
    );
    let h = harness(
        settings(&[FEED_A]),
        feeds,
        articles(&["https://news.test/acme1", "https://news.test/acme2"]),
        FakeQuotes::default().with(quote("ACME", dec!(3.50), 4_000_000)),
    );

    h.pipeline.run_at(now()).await.unwrap();
    h.pipeline.run_at(now()).await.unwrap();

    assert_eq!(h.quotes.calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.store.load().len(), 2);
}

#[tokio::test]
async fn rule_rejections_are_tallied_by_reason() {
    let otc = QuoteRecord {
        exchange: Some("OTC Markets".to_string()),
        ..quote("PNKY", dec!(1), 1_000_000)
    };
    let high_float = quote("BIGF", dec!(4), 50_000_000);
    let expensive = quote("PRCY", dec!(45), 1_000_000);

    let feeds = FakeFeeds::default();
    feeds.serve(
        FEED_A,
        vec![
            item("Pinky Positive Update (PNKY)", "https://news.test/pnky", 1),
            item("Bigfloat Positive Update (NASDAQ: BIGF)", "https://news.test/bigf", 1),
            item("Pricey Positive Update (NASDAQ: PRCY)", "https://news.test/prcy", 1),
            item("Quiet Quarterly Update (NASDAQ: QUIE)", "https://news.test/quie", 1),
            item("Nobody Positive Update", "https://news.test/none", 1),
        ],
    );
    let h = harness(
        settings(&[FEED_A]),
        feeds,
        articles(&[
            "https://news.test/pnky",
            "https://news.test/bigf",
            "https://news.test/prcy",
            "https://news.test/quie",
            "https://news.test/none",
        ]),
        FakeQuotes::default().with(otc).with(high_float).with(expensive),
    );

    let report = h.pipeline.run_at(now()).await.unwrap();

    assert_eq!(report.survivors, 0);
    assert_eq!(report.drops.get("otc_listing"), Some(&1));
    assert_eq!(report.drops.get("high_float"), Some(&1));
    assert_eq!(report.drops.get("price_above_ceiling"), Some(&1));
    assert_eq!(report.drops.get("no_keyword"), Some(&1));
    assert_eq!(report.drops.get("no_ticker"), Some(&1));
}

#[tokio::test]
async fn per_feed_truncation_applies_before_processing() {
    let feeds = FakeFeeds::default();
    feeds.serve(
        FEED_A,
        (0..5)
            .map(|i| item(&format!("Positive News {i} (NASDAQ: ACME)"), "https://news.test/acme", 1))
            .collect(),
    );
    let mut settings = settings(&[FEED_A]);
    settings.max_items_per_feed = 2;
    let h = harness(
        settings,
        feeds,
        articles(&["https://news.test/acme"]),
        FakeQuotes::default().with(quote("ACME", dec!(3.50), 4_000_000)),
    );

    let report = h.pipeline.run_at(now()).await.unwrap();

    assert_eq!(report.items_seen, 2);
    assert_eq!(report.survivors, 2);
}
