//! Cache-first and network-first request handlers
//!
//! Both strategies read through every cache instance but write only into
//! the cache they are handed. Neither ever returns an error: failures end
//! in the synthesized 503 "Network error" response.

use crate::cache::store::CacheStorage;
use crate::error::Result;
use crate::http::{Request, Response};
use crate::network::Fetcher;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Caching algorithm bound to a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Serve any cached copy; go to the network only on a miss
    CacheFirst,
    /// Go to the network; fall back to a cached copy only if it fails
    NetworkFirst,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::CacheFirst => write!(f, "cache-first"),
            Strategy::NetworkFirst => write!(f, "network-first"),
        }
    }
}

/// Runs strategies against a cache store and a fetcher
#[derive(Clone)]
pub struct StrategyExecutor {
    storage: Arc<dyn CacheStorage>,
    fetcher: Arc<dyn Fetcher>,
}

impl StrategyExecutor {
    pub fn new(storage: Arc<dyn CacheStorage>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self { storage, fetcher }
    }

    pub async fn execute(&self, strategy: Strategy, request: &Request, cache_name: &str) -> Response {
        match strategy {
            Strategy::CacheFirst => self.cache_first(request, cache_name).await,
            Strategy::NetworkFirst => self.network_first(request, cache_name).await,
        }
    }

    /// Serve from any cache instance, else fetch and store into `cache_name`
    ///
    /// No freshness check: a hit is returned as-is without touching the network.
    pub async fn cache_first(&self, request: &Request, cache_name: &str) -> Response {
        match self.try_cache_first(request, cache_name).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Cache first strategy failed for {}: {}", request, e);
                Response::network_error()
            }
        }
    }

    async fn try_cache_first(&self, request: &Request, cache_name: &str) -> Result<Response> {
        if let Some(cached) = self.storage.match_any(request).await {
            debug!("Serving {} from cache", request);
            return Ok(cached);
        }

        let response = self.fetcher.fetch(request).await?;
        if response.ok() {
            self.store(request, &response, cache_name).await;
        }
        Ok(response)
    }

    /// Fetch and store into `cache_name`; on transport failure serve any cached copy
    pub async fn network_first(&self, request: &Request, cache_name: &str) -> Response {
        match self.fetcher.fetch(request).await {
            Ok(response) => {
                if response.ok() {
                    self.store(request, &response, cache_name).await;
                }
                response
            }
            Err(e) => {
                warn!("Network first strategy failed for {}, trying cache: {}", request, e);
                match self.storage.match_any(request).await {
                    Some(cached) => cached,
                    None => Response::network_error(),
                }
            }
        }
    }

    /// Write a copy of a successful response. Failures are logged; the caller
    /// still gets the live response.
    async fn store(&self, request: &Request, response: &Response, cache_name: &str) {
        let result = async {
            let cache = self.storage.open(cache_name).await?;
            cache.put(request.clone(), response.clone()).await
        }
        .await;

        if let Err(e) = result {
            warn!("Failed to store {} in {}: {}", request, cache_name, e);
        }
    }
}
