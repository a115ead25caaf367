//! Catalyst Pipeline
//!
//! One cycle: pull every configured feed, push each item through the gates,
//! article fetch, extraction, market data and eligibility rules with bounded
//! parallelism, then order the survivors and publish a new snapshot.
//!
//! Per-item failures become a [`DropReason`] and never abort the cycle. The
//! cycle aborts only when every feed fails, in which case the previous
//! snapshot stays published.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use super::market_data::MarketDataProvider;
use super::scheduler::CycleRunner;
use crate::application::ports::{ArticleFetcherPort, FeedError, FeedSourcePort};
use crate::domain::eligibility::{EligibilityClassifier, Rejection};
use crate::domain::extraction::TickerExtractor;
use crate::domain::feed::FeedItem;
use crate::domain::float_tier::FloatTierClassifier;
use crate::domain::gates::{KeywordGate, RecencyGate};
use crate::domain::snapshot::{DisplayRecord, SnapshotAssembler, SnapshotStore};
use crate::infrastructure::metrics;

// =============================================================================
// Settings
// =============================================================================

/// Rules and limits for a pipeline cycle.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Feed URLs, polled in order.
    pub feed_urls: Vec<String>,
    /// Only the first N items of each feed are considered.
    pub max_items_per_feed: usize,
    /// Items processed concurrently.
    pub max_concurrency: usize,
    /// Keyword vocabulary gate.
    pub keyword_gate: KeywordGate,
    /// Publish-time window gate.
    pub recency_gate: RecencyGate,
    /// Ordered extraction rules.
    pub extractor: TickerExtractor,
    /// Format, price, exchange and country rules.
    pub eligibility: EligibilityClassifier,
    /// Float tiers and high-float policy.
    pub float_tiers: FloatTierClassifier,
    /// Display formatting and ordering.
    pub assembler: SnapshotAssembler,
}

impl PipelineSettings {
    /// Default settings for the given feeds.
    #[must_use]
    pub fn for_feeds(feed_urls: Vec<String>) -> Self {
        Self {
            feed_urls,
            max_items_per_feed: 20,
            max_concurrency: 8,
            keyword_gate: KeywordGate::default(),
            recency_gate: RecencyGate::from_hours(24),
            extractor: TickerExtractor::default(),
            eligibility: EligibilityClassifier::default(),
            float_tiers: FloatTierClassifier::default(),
            assembler: SnapshotAssembler::default(),
        }
    }
}

// =============================================================================
// Outcomes
// =============================================================================

/// Why an item did not make it into the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// Outside the recency window, or publish time unknown.
    Stale,
    /// No vocabulary term in headline or snippet.
    NoKeyword,
    /// Article text could not be fetched.
    ArticleUnavailable,
    /// No extraction rule matched.
    NoTicker,
    /// Market data lookup failed.
    QuoteUnavailable,
    /// An eligibility or float rule rejected the item.
    Ineligible(Rejection),
}

impl DropReason {
    /// Stable label for metrics and reports.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Stale => "stale",
            Self::NoKeyword => "no_keyword",
            Self::ArticleUnavailable => "article_unavailable",
            Self::NoTicker => "no_ticker",
            Self::QuoteUnavailable => "quote_unavailable",
            Self::Ineligible(rejection) => rejection.as_str(),
        }
    }
}

/// Summary of one completed cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// Cycle identifier, also on the cycle span.
    pub cycle_id: Uuid,
    /// When the cycle started.
    pub started_at: DateTime<Utc>,
    /// Feeds that failed (the cycle still completed).
    pub feeds_failed: usize,
    /// Items considered after per-feed truncation.
    pub items_seen: usize,
    /// Items published.
    pub survivors: usize,
    /// Drop counts by reason label.
    pub drops: BTreeMap<&'static str, usize>,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
    /// Generation of the snapshot this cycle published.
    pub generation: u64,
}

/// Cycle-level failure. The previous snapshot stays published.
#[derive(Debug, Error)]
pub enum CycleError {
    /// No feed URLs configured.
    #[error("no feeds configured")]
    NoFeeds,

    /// Every configured feed failed.
    #[error("all {attempted} feed(s) failed; last error: {last_error}")]
    AllFeedsFailed {
        /// Feeds attempted.
        attempted: usize,
        /// Error from the last failing feed.
        last_error: FeedError,
    },
}

// =============================================================================
// Pipeline
// =============================================================================

/// Ingestion, enrichment and filtering pipeline.
pub struct CatalystPipeline {
    settings: PipelineSettings,
    feeds: Arc<dyn FeedSourcePort>,
    articles: Arc<dyn ArticleFetcherPort>,
    market_data: Arc<MarketDataProvider>,
    store: Arc<SnapshotStore>,
}

impl std::fmt::Debug for CatalystPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalystPipeline")
            .field("settings", &self.settings)
            .field("market_data", &self.market_data)
            .finish_non_exhaustive()
    }
}

impl CatalystPipeline {
    /// Wire a pipeline from its collaborators.
    #[must_use]
    pub fn new(
        settings: PipelineSettings,
        feeds: Arc<dyn FeedSourcePort>,
        articles: Arc<dyn ArticleFetcherPort>,
        market_data: Arc<MarketDataProvider>,
        store: Arc<SnapshotStore>,
    ) -> Self {
        Self {
            settings,
            feeds,
            articles,
            market_data,
            store,
        }
    }

    /// Pipeline settings.
    #[must_use]
    pub const fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Snapshot store this pipeline publishes to.
    #[must_use]
    pub const fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    /// Run one cycle against the current time.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError`] when no feed could be pulled.
    pub async fn run_once(&self) -> Result<CycleReport, CycleError> {
        self.run_at(Utc::now()).await
    }

    /// Run one cycle with `now` as the recency reference.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError`] when no feed could be pulled.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<CycleReport, CycleError> {
        let cycle_id = Uuid::new_v4();
        let span = tracing::info_span!("cycle", %cycle_id);
        self.cycle(cycle_id, now).instrument(span).await
    }

    async fn cycle(&self, cycle_id: Uuid, now: DateTime<Utc>) -> Result<CycleReport, CycleError> {
        let started = Instant::now();
        let started_at = Utc::now();

        let (items, feeds_failed) = self.pull_feeds().await?;
        let items_seen = items.len();

        let outcomes: Vec<Result<DisplayRecord, DropReason>> = stream::iter(items)
            .map(|(index, item)| self.process(index, item, now))
            .buffer_unordered(self.settings.max_concurrency.max(1))
            .collect()
            .await;

        let mut records = Vec::with_capacity(outcomes.len());
        let mut drops: BTreeMap<&'static str, usize> = BTreeMap::new();
        for outcome in outcomes {
            match outcome {
                Ok(record) => records.push(record),
                Err(reason) => {
                    metrics::record_item_dropped(reason.as_str());
                    *drops.entry(reason.as_str()).or_default() += 1;
                }
            }
        }

        let survivors = records.len();
        let snapshot = self.settings.assembler.publish(&self.store, records);
        let elapsed = started.elapsed();

        metrics::record_cycle_duration(elapsed);
        #[allow(clippy::cast_precision_loss)]
        let snapshot_size = snapshot.len() as f64;
        metrics::set_snapshot_size(snapshot_size);

        let report = CycleReport {
            cycle_id,
            started_at,
            feeds_failed,
            items_seen,
            survivors,
            drops,
            duration_ms: millis(elapsed),
            generation: snapshot.generation,
        };

        tracing::info!(
            generation = report.generation,
            items_seen,
            survivors,
            feeds_failed,
            duration_ms = report.duration_ms,
            "Snapshot published"
        );

        Ok(report)
    }

    /// Pull all feeds concurrently and concatenate them in configured order.
    ///
    /// Each item is tagged with its position in the concatenated order.
    async fn pull_feeds(&self) -> Result<(Vec<(usize, FeedItem)>, usize), CycleError> {
        let urls = &self.settings.feed_urls;
        if urls.is_empty() {
            return Err(CycleError::NoFeeds);
        }

        let results = futures::future::join_all(urls.iter().map(|url| self.feeds.fetch(url))).await;

        let mut items = Vec::new();
        let mut failed = 0;
        let mut last_error = None;
        for (url, result) in urls.iter().zip(results) {
            match result {
                Ok(feed) => {
                    tracing::debug!(url = %url, items = feed.len(), "Feed pulled");
                    items.extend(feed.into_iter().take(self.settings.max_items_per_feed));
                }
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "Feed pull failed");
                    failed += 1;
                    last_error = Some(e);
                }
            }
        }

        if failed == urls.len()
            && let Some(last_error) = last_error
        {
            return Err(CycleError::AllFeedsFailed {
                attempted: urls.len(),
                last_error,
            });
        }

        Ok((items.into_iter().enumerate().collect(), failed))
    }

    async fn process(
        &self,
        index: usize,
        item: FeedItem,
        now: DateTime<Utc>,
    ) -> Result<DisplayRecord, DropReason> {
        let result = self.evaluate(index, &item, now).await;
        if let Err(reason) = &result {
            tracing::debug!(
                reason = reason.as_str(),
                detail = ?reason,
                headline = %item.title,
                "Item dropped"
            );
        }
        result
    }

    async fn evaluate(
        &self,
        index: usize,
        item: &FeedItem,
        now: DateTime<Utc>,
    ) -> Result<DisplayRecord, DropReason> {
        let settings = &self.settings;

        if !settings.recency_gate.passes(item.published_at, now) {
            return Err(DropReason::Stale);
        }
        let Some(published_at) = item.published_at else {
            return Err(DropReason::Stale);
        };

        if !settings.keyword_gate.passes(&item.headline_and_snippet()) {
            return Err(DropReason::NoKeyword);
        }

        let body = self.articles.fetch(&item.link).await.map_err(|e| {
            tracing::debug!(link = %item.link, error = %e, "Article fetch failed");
            DropReason::ArticleUnavailable
        })?;

        let extraction = settings
            .extractor
            .extract(&item.title, &body)
            .ok_or(DropReason::NoTicker)?;
        tracing::debug!(
            symbol = %extraction.symbol,
            rule = extraction.rule.as_str(),
            "Ticker extracted"
        );

        settings
            .eligibility
            .check_format(&extraction.symbol)
            .map_err(DropReason::Ineligible)?;

        let quote = self
            .market_data
            .quote(&extraction.symbol)
            .await
            .ok_or(DropReason::QuoteUnavailable)?;

        settings
            .eligibility
            .classify(&quote, extraction.exchange_hint.as_deref())
            .map_err(DropReason::Ineligible)?;

        let tier = settings
            .float_tiers
            .classify(quote.float_shares)
            .map_err(DropReason::Ineligible)?;

        Ok(settings
            .assembler
            .display_record(index, item, published_at, &quote, tier))
    }
}

#[async_trait]
impl CycleRunner for CatalystPipeline {
    async fn run_cycle(&self) -> Result<CycleReport, CycleError> {
        self.run_once().await
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
