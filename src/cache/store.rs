//! Named cache instances and the storage that holds them
//!
//! `CacheStorage` and `Cache` describe the host's key/value blob store.
//! `MemoryCacheStorage` is the in-process implementation: every handle
//! shares the storage's lock-protected state, so concurrent in-flight
//! handlers see atomic `put`/`match` operations.

use crate::cache::{entry::CacheEntry, types::CacheStats};
use crate::error::{Result, WorkerError};
use crate::http::{Request, Response};
use crate::network::Fetcher;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// The set of named cache instances
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Open the named cache, creating it if absent
    async fn open(&self, name: &str) -> Result<Arc<dyn Cache>>;

    async fn has(&self, name: &str) -> bool;

    /// Names of every instance, in creation order
    async fn keys(&self) -> Vec<String>;

    /// Delete an instance and all its entries. Returns whether it existed.
    async fn delete(&self, name: &str) -> bool;

    /// Look the request up in every instance, oldest first
    async fn match_any(&self, request: &Request) -> Option<Response>;
}

/// A single named cache instance
#[async_trait]
pub trait Cache: Send + Sync {
    fn name(&self) -> &str;

    async fn match_request(&self, request: &Request) -> Option<Response>;

    /// Store a response; an existing entry for the same request is replaced
    async fn put(&self, request: Request, response: Response) -> Result<()>;

    /// Fetch every request and store the results, or store nothing
    ///
    /// All fetches complete before anything is written. A transport failure
    /// or a non-2xx status for any one of them aborts the whole batch.
    async fn add_all(&self, requests: &[Request], fetcher: &dyn Fetcher) -> Result<()> {
        let responses = fetch_batch(requests, fetcher).await?;
        for (request, response) in requests.iter().cloned().zip(responses) {
            self.put(request, response).await?;
        }
        Ok(())
    }

    /// Requests with a stored entry, in insertion order
    async fn keys(&self) -> Vec<Request>;

    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

async fn fetch_batch(requests: &[Request], fetcher: &dyn Fetcher) -> Result<Vec<Response>> {
    let mut responses = Vec::with_capacity(requests.len());
    for request in requests {
        let response = fetcher.fetch(request).await?;
        if !response.ok() {
            return Err(WorkerError::AddAllFailed {
                url: request.url.to_string(),
                status: response.status,
            });
        }
        responses.push(response);
    }
    Ok(responses)
}

/// In-memory `CacheStorage`
#[derive(Clone, Default)]
pub struct MemoryCacheStorage {
    caches: Arc<RwLock<Vec<Arc<MemoryCache>>>>,
    stats: Arc<RwLock<CacheStats>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn stats(&self) -> CacheStats {
        self.stats.read().await.clone()
    }

    /// Direct typed access to an existing instance
    pub async fn get(&self, name: &str) -> Result<Arc<MemoryCache>> {
        let caches = self.caches.read().await;
        caches
            .iter()
            .find(|c| c.name == name)
            .cloned()
            .ok_or_else(|| WorkerError::CacheNotFound(name.to_string()))
    }

    async fn open_memory(&self, name: &str) -> Arc<MemoryCache> {
        let mut caches = self.caches.write().await;
        if let Some(existing) = caches.iter().find(|c| c.name == name) {
            return existing.clone();
        }

        debug!("Creating cache instance: {}", name);
        let cache = Arc::new(MemoryCache {
            name: name.to_string(),
            inner: RwLock::new(CacheInner::default()),
            stats: self.stats.clone(),
        });
        caches.push(cache.clone());
        cache
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn open(&self, name: &str) -> Result<Arc<dyn Cache>> {
        let cache: Arc<dyn Cache> = self.open_memory(name).await;
        Ok(cache)
    }

    async fn has(&self, name: &str) -> bool {
        self.caches.read().await.iter().any(|c| c.name == name)
    }

    async fn keys(&self) -> Vec<String> {
        self.caches
            .read()
            .await
            .iter()
            .map(|c| c.name.clone())
            .collect()
    }

    async fn delete(&self, name: &str) -> bool {
        let mut caches = self.caches.write().await;
        let before = caches.len();
        caches.retain(|c| c.name != name);
        let deleted = caches.len() < before;
        drop(caches);

        if deleted {
            self.stats.write().await.deletions += 1;
            info!("Deleted cache instance: {}", name);
        }
        deleted
    }

    async fn match_any(&self, request: &Request) -> Option<Response> {
        let caches: Vec<Arc<MemoryCache>> = self.caches.read().await.clone();

        for cache in caches {
            if let Some(response) = cache.lookup(request).await {
                self.stats.write().await.hits += 1;
                debug!("Cache hit in {}: {}", cache.name, request);
                return Some(response);
            }
        }

        self.stats.write().await.misses += 1;
        debug!("Cache miss: {}", request);
        None
    }
}

/// One in-memory cache instance
pub struct MemoryCache {
    name: String,
    inner: RwLock<CacheInner>,
    stats: Arc<RwLock<CacheStats>>,
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<String, CacheEntry>,
    /// Insertion order of keys
    order: Vec<String>,
}

impl CacheInner {
    fn insert(&mut self, entry: CacheEntry) {
        let key = entry.request.cache_key();
        if self.entries.insert(key.clone(), entry).is_none() {
            self.order.push(key);
        }
    }
}

impl MemoryCache {
    async fn lookup(&self, request: &Request) -> Option<Response> {
        let mut inner = self.inner.write().await;
        inner.entries.get_mut(&request.cache_key()).map(|entry| {
            entry.mark_accessed();
            debug!(
                "{} served from {} (age {:?}, {} hits)",
                request,
                self.name,
                entry.age(),
                entry.metadata.access_count
            );
            entry.response.clone()
        })
    }

    /// Full entry for a request, metadata included
    pub async fn entry(&self, request: &Request) -> Option<CacheEntry> {
        self.inner
            .read()
            .await
            .entries
            .get(&request.cache_key())
            .cloned()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    fn name(&self) -> &str {
        &self.name
    }

    async fn match_request(&self, request: &Request) -> Option<Response> {
        let found = self.lookup(request).await;
        let mut stats = self.stats.write().await;
        if found.is_some() {
            stats.hits += 1;
        } else {
            stats.misses += 1;
        }
        found
    }

    async fn put(&self, request: Request, response: Response) -> Result<()> {
        debug!("Storing {} in {}", request, self.name);
        self.inner
            .write()
            .await
            .insert(CacheEntry::new(request, response));
        self.stats.write().await.puts += 1;
        Ok(())
    }

    async fn add_all(&self, requests: &[Request], fetcher: &dyn Fetcher) -> Result<()> {
        let responses = match fetch_batch(requests, fetcher).await {
            Ok(responses) => responses,
            Err(e) => {
                warn!("Batch populate of {} aborted: {}", self.name, e);
                self.stats.write().await.failed_batches += 1;
                return Err(e);
            }
        };

        // Commit under one lock so no reader sees a partial batch
        let mut inner = self.inner.write().await;
        for (request, response) in requests.iter().cloned().zip(responses) {
            inner.insert(CacheEntry::new(request, response));
        }
        drop(inner);

        self.stats.write().await.puts += requests.len() as u64;
        debug!("Stored {} entries in {}", requests.len(), self.name);
        Ok(())
    }

    async fn keys(&self) -> Vec<Request> {
        let inner = self.inner.read().await;
        inner
            .order
            .iter()
            .filter_map(|k| inner.entries.get(k))
            .map(|e| e.request.clone())
            .collect()
    }

    async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }
}
