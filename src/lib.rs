//! # WineRed Offline Worker (winered-sw)
//!
//! Request interception and caching for the WineRed dashboard. The worker
//! decides, per request, whether to answer from a local cache or from the
//! network, and keeps its caches seeded and pruned across deployments.
//!
//! ## Routing
//!
//! | Request                                     | Strategy      | Cache   |
//! |---------------------------------------------|---------------|---------|
//! | `/` or any path containing `.html`          | cache-first   | static  |
//! | `fonts.googleapis.com`, `fonts.gstatic.com` | cache-first   | static  |
//! | `api.sheetbest.com`, `sheetdb.io`           | network-first | dynamic |
//! | `dropboxusercontent.com`                    | cache-first   | dynamic |
//! | anything else                               | network-first | dynamic |
//!
//! Only GET requests are intercepted. When neither the network nor any
//! cache can answer, the response is a plain-text 503 `Network error`.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use winered_sw::{
//!     FetchOutcome, HttpFetcher, LoggingHost, MemoryCacheStorage, Request, ServiceWorker,
//!     WorkerConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let worker = ServiceWorker::new(
//!         WorkerConfig::from_env()?,
//!         Arc::new(MemoryCacheStorage::new()),
//!         Arc::new(HttpFetcher::new()),
//!         Arc::new(LoggingHost),
//!         Arc::new(LoggingHost),
//!     )?;
//!
//!     worker.install().await?;
//!     worker.activate().await?;
//!
//!     let request = Request::get("https://api.sheetbest.com/sheets/inventory")?;
//!     if let FetchOutcome::Respond(response) = worker.handle_fetch(&request).await {
//!         println!("{} ({} bytes)", response.status, response.body.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod events;
pub mod http;
pub mod lifecycle;
pub mod network;
pub mod router;
pub mod strategy;
pub mod worker;

// Re-export main types for convenience
pub use cache::{
    Cache, CacheEntry, CacheKind, CacheNames, CacheStats, CacheStorage, MemoryCacheStorage,
};
pub use config::{WorkerConfig, WorkerConfigBuilder};
pub use error::{Result, WorkerError};
pub use events::{
    ClientControl, LoggingHost, NotificationOptions, Notifier, PushPayload, WorkerEvent,
    WorkerMessage,
};
pub use http::{Method, Request, Response};
pub use lifecycle::{InstallReport, LifecycleManager, LifecycleState};
pub use network::{Fetcher, HttpFetcher};
pub use router::{RequestRouter, Route, RouteKind, RouteRules};
pub use strategy::{Strategy, StrategyExecutor};
pub use worker::{EventOutcome, FetchOutcome, ServiceWorker};
