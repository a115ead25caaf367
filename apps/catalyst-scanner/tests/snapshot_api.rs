//! Snapshot API Integration Tests
//!
//! Drives the router in-process and checks the snapshot view, health and
//! readiness responses as the published snapshot changes.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;
use serde_json::Value;
use tower::ServiceExt;

use catalyst_scanner::{
    CycleError, CycleStatus, FeedError, FeedItem, FloatTier, HttpState, QuoteCache, QuoteRecord,
    SnapshotAssembler, SnapshotStore, Symbol, create_router,
};

struct Fixture {
    store: Arc<SnapshotStore>,
    status: Arc<CycleStatus>,
    router: axum::Router,
}

fn fixture() -> Fixture {
    let store = Arc::new(SnapshotStore::new());
    let status = Arc::new(CycleStatus::new());
    let state = Arc::new(HttpState::new(
        Arc::clone(&store),
        Arc::clone(&status),
        Arc::new(QuoteCache::new()),
    ));
    Fixture {
        store,
        status,
        router: create_router(state),
    }
}

fn publish_acme(store: &SnapshotStore) {
    let published_at = Utc.with_ymd_and_hms(2025, 10, 14, 13, 5, 0).unwrap();
    let item = FeedItem::new(
        "Acme Pharma Announces Positive Results (NASDAQ: ACME)",
        "",
        "https://news.test/acme",
        Some("Tue, 14 Oct 2025 13:05:00 GMT"),
    );
    let quote = QuoteRecord {
        price: Some(dec!(3.5)),
        previous_close: Some(dec!(3)),
        float_shares: Some(4_000_000),
        exchange: Some("NASDAQ".to_string()),
        ..QuoteRecord::empty(Symbol::new("ACME"))
    };
    let assembler = SnapshotAssembler::default();
    let record = assembler.display_record(0, &item, published_at, &quote, FloatTier::Bright);
    assembler.publish(store, vec![record]);
}

async fn get(router: &axum::Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

async fn get_json(router: &axum::Router, uri: &str) -> (StatusCode, Value) {
    let (status, body) = get(router, uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn snapshot_is_empty_before_first_publish() {
    let f = fixture();

    let (status, body) = get_json(&f.router, "/api/snapshot").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["generation"], 0);
    assert_eq!(body["records"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn snapshot_serves_published_records() {
    let f = fixture();
    publish_acme(&f.store);

    let (status, body) = get_json(&f.router, "/api/snapshot").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["generation"], 1);
    let record = &body["records"][0];
    assert_eq!(record["symbol"], "ACME");
    assert_eq!(record["price"], "3.50");
    assert_eq!(record["float_display"], "4.00M");
    assert_eq!(record["tier"], "bright");
    assert_eq!(record["timestamp_local"], "10/14/2025, 06:05");
    assert!(record.get("feed_index").is_none());
}

#[tokio::test]
async fn readiness_follows_first_publish() {
    let f = fixture();

    let (before, _) = get(&f.router, "/readyz").await;
    publish_acme(&f.store);
    let (after, body) = get(&f.router, "/readyz").await;

    assert_eq!(before, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(after, StatusCode::OK);
    assert_eq!(body, b"READY");
}

#[tokio::test]
async fn liveness_always_ok() {
    let f = fixture();
    let (status, body) = get(&f.router, "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
}

#[tokio::test]
async fn health_reports_stale_snapshot_after_aborted_cycle() {
    let f = fixture();
    publish_acme(&f.store);
    f.status.record(&Err(CycleError::AllFeedsFailed {
        attempted: 1,
        last_error: FeedError::Status {
            url: "https://feeds.test/a".to_string(),
            status: 503,
        },
    }));

    let (status, body) = get_json(&f.router, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["last_cycle"]["outcome"], "aborted");
    assert_eq!(body["cycles"]["aborted"], 1);
    assert_eq!(body["snapshot"]["generation"], 1);
    assert_eq!(body["snapshot"]["records"], 1);
}

#[tokio::test]
async fn health_unhealthy_when_nothing_ever_published() {
    let f = fixture();
    f.status.record(&Err(CycleError::NoFeeds));

    let (status, body) = get_json(&f.router, "/health").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let f = fixture();
    let (status, _) = get(&f.router, "/api/refresh").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
