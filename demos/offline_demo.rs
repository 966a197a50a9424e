//! Offline Worker Demo
//!
//! Runs the worker lifecycle against the live network, then replays the
//! same requests through a worker whose network is down to show the
//! cached fallbacks.
//!
//! Usage:
//!   cargo run --example offline_demo
//!
//! Environment variables:
//!   RUST_LOG              - log filter (default: info)
//!   WINERED_ORIGIN        - dashboard origin (default: http://localhost:8080)
//!   WINERED_CACHE_VERSION - cache version stamp (default: v1.0.0)

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use winered_sw::{
    CacheStorage, FetchOutcome, Fetcher, HttpFetcher, LoggingHost, MemoryCacheStorage, Request,
    Response, ServiceWorker, WorkerConfig, WorkerError,
};

struct NetworkDown;

#[async_trait]
impl Fetcher for NetworkDown {
    async fn fetch(&self, request: &Request) -> winered_sw::Result<Response> {
        Err(WorkerError::NetworkError(format!("offline: {}", request.url)))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("=== WineRed Offline Worker Demo ===");

    let config = WorkerConfig::from_env()?;
    let storage = MemoryCacheStorage::new();

    let online = ServiceWorker::new(
        config.clone(),
        Arc::new(storage.clone()),
        Arc::new(HttpFetcher::new()),
        Arc::new(LoggingHost),
        Arc::new(LoggingHost),
    )?;

    let report = online.install().await?;
    info!("Precached {} files", report.precached);
    if let Some(e) = &report.precache_error {
        info!("Precache failed (install continued): {}", e);
    }
    online.activate().await?;

    let requests = vec![
        Request::get("https://fonts.googleapis.com/css2?family=DM+Sans")?,
        Request::get("https://httpbin.org/json")?,
    ];

    info!("\n--- Online ---");
    for request in &requests {
        report_outcome(request, online.handle_fetch(request).await);
    }

    info!("\n--- Offline ---");
    let offline = ServiceWorker::new(
        config,
        Arc::new(storage.clone()),
        Arc::new(NetworkDown),
        Arc::new(LoggingHost),
        Arc::new(LoggingHost),
    )?;
    offline.install().await?;
    offline.activate().await?;

    for request in &requests {
        report_outcome(request, offline.handle_fetch(request).await);
    }

    info!("Caches: {:?}", storage.keys().await);
    info!("{}", storage.stats().await);

    Ok(())
}

fn report_outcome(request: &Request, outcome: FetchOutcome) {
    match outcome {
        FetchOutcome::Respond(response) => info!(
            "{} -> {} ({} bytes)",
            request.url,
            response.status,
            response.body.len()
        ),
        FetchOutcome::Passthrough => info!("{} -> passed through", request.url),
    }
}
