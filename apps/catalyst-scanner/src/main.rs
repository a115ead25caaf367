//! Catalyst Scanner Binary
//!
//! Starts the scheduler and the snapshot/health HTTP server.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin catalyst-scanner -- catalyst-scanner.yaml
//! ```
//!
//! # Environment Variables
//!
//! ## Required
//! - `FMP_API_KEY`: Financial Modeling Prep API key (referenced from the YAML)
//!
//! ## Optional
//! - `CATALYST_CONFIG`: Config file path when no argument is given
//! - `PORT`: HTTP port (when referenced from the YAML)
//! - `OTEL_ENABLED`: Enable OpenTelemetry export (default: false)
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint
//! - `OTEL_SERVICE_NAME`: Service name (default: catalyst-scanner)
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;
use std::time::Duration;

use catalyst_scanner::application::services::{
    CatalystPipeline, CycleStatus, MarketDataProvider, QuoteCache, Scheduler,
};
use catalyst_scanner::infrastructure::article::HttpArticleFetcher;
use catalyst_scanner::infrastructure::client::build_http_client;
use catalyst_scanner::infrastructure::config::resolve_config_path;
use catalyst_scanner::infrastructure::feed::RssFeedSource;
use catalyst_scanner::infrastructure::fmp::FmpQuoteSource;
use catalyst_scanner::infrastructure::telemetry;
use catalyst_scanner::{HttpServer, HttpState, ScannerConfig, SnapshotStore, init_metrics, load_config};
use tokio::signal;
use tokio_util::sync::CancellationToken;

/// Grace period for the HTTP server and scheduler after a shutdown signal.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    load_dotenv();

    let _telemetry_guard = telemetry::init();

    tracing::info!("Starting Catalyst Scanner");

    if let Err(e) = init_metrics() {
        tracing::warn!(error = %e, "Prometheus recorder not installed, /metrics disabled");
    }

    let config_path = resolve_config_path(std::env::args().nth(1));
    let config = load_config(Some(&config_path))?;
    log_config(&config_path, &config);

    let settings = config.pipeline_settings()?;
    let client = build_http_client(config.request_timeout(), &config.http.user_agent)?;

    let cache = Arc::new(QuoteCache::new());
    let quotes = Arc::new(FmpQuoteSource::new(
        client.clone(),
        config.provider.base_url.clone(),
        config.provider.api_key.clone(),
    ));
    let market_data = Arc::new(MarketDataProvider::new(
        quotes,
        Arc::clone(&cache),
        config.provider.cache_failures,
        config.lookup_timeout(),
    ));

    let store = Arc::new(SnapshotStore::new());
    let pipeline = Arc::new(CatalystPipeline::new(
        settings,
        Arc::new(RssFeedSource::new(client.clone())),
        Arc::new(HttpArticleFetcher::new(client)),
        market_data,
        Arc::clone(&store),
    ));

    let status = Arc::new(CycleStatus::new());
    let shutdown_token = CancellationToken::new();

    let scheduler = Scheduler::new(pipeline, config.refresh_interval(), Arc::clone(&status));
    let scheduler_handle = tokio::spawn(scheduler.run(shutdown_token.clone()));

    let http_state = Arc::new(HttpState::new(store, status, cache));
    let http_server = HttpServer::new(
        config.server.bind_address.clone(),
        config.server.port,
        http_state,
        shutdown_token.clone(),
    );
    let server_handle = tokio::spawn(async move {
        if let Err(e) = http_server.run().await {
            tracing::error!(error = %e, "HTTP server error");
        }
    });

    tracing::info!("Catalyst scanner ready");

    await_shutdown(shutdown_token).await;

    let drained = tokio::time::timeout(SHUTDOWN_TIMEOUT, async {
        let _ = scheduler_handle.await;
        let _ = server_handle.await;
    })
    .await;
    if drained.is_err() {
        tracing::warn!(
            timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
            "Shutdown timed out, exiting anyway"
        );
    }

    tracing::info!("Catalyst scanner stopped");
    Ok(())
}

/// Log the parsed configuration.
fn log_config(path: &str, config: &ScannerConfig) {
    tracing::info!(
        path,
        feeds = config.feeds.urls.len(),
        refresh_interval_secs = config.schedule.refresh_interval_secs,
        max_concurrency = config.schedule.max_concurrency,
        port = config.server.port,
        timezone = %config.display.timezone,
        "Configuration loaded"
    );
    tracing::debug!(
        feed_urls = ?config.feeds.urls,
        provider = %config.provider.base_url,
        keywords = config.filters.keywords.len(),
        "Pipeline inputs"
    );
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        for dir in cwd.ancestors().skip(1) {
            let env_path = dir.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
#[allow(clippy::expect_used)]
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    shutdown_token.cancel();
}
