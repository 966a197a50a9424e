//! Integration tests for routing, caching strategies and the cache lifecycle
//!
//! These tests drive the public API end to end:
//! - Route selection per URL class
//! - Cache-first and network-first behaviour against scripted networks
//! - Install-time seeding and activate-time pruning
//! - Interleaved fetch events sharing one cache store

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use winered_sw::{
    Cache, CacheKind, CacheNames, CacheStorage, FetchOutcome, Fetcher, LoggingHost,
    MemoryCacheStorage, Method, Request, Response, RouteKind, ServiceWorker, Strategy,
    StrategyExecutor, WorkerConfig, WorkerError,
};

// ============================================================================
// Test doubles
// ============================================================================

/// Network whose answers are scripted per URL; unscripted URLs are offline
#[derive(Default)]
struct ScriptedNetwork {
    responses: HashMap<String, u16>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedNetwork {
    fn with(mut self, url: &str, status: u16) -> Self {
        self.responses.insert(url.to_string(), status);
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for ScriptedNetwork {
    async fn fetch(&self, request: &Request) -> winered_sw::Result<Response> {
        let url = request.url.to_string();
        self.calls.lock().unwrap().push(url.clone());
        match self.responses.get(&url) {
            Some(status) => Ok(Response::new(*status, format!("network:{}", url))),
            None => Err(WorkerError::NetworkError(format!("unreachable: {}", url))),
        }
    }
}

/// Network that must never be reached
struct ForbiddenNetwork;

#[async_trait]
impl Fetcher for ForbiddenNetwork {
    async fn fetch(&self, request: &Request) -> winered_sw::Result<Response> {
        panic!("network fetch issued for {}", request);
    }
}

/// Storage wrapper recording every `put`, in order
#[derive(Clone, Default)]
struct RecordingStorage {
    inner: MemoryCacheStorage,
    puts: Arc<Mutex<Vec<(String, Request)>>>,
}

struct RecordingCache {
    inner: Arc<dyn Cache>,
    puts: Arc<Mutex<Vec<(String, Request)>>>,
}

#[async_trait]
impl CacheStorage for RecordingStorage {
    async fn open(&self, name: &str) -> winered_sw::Result<Arc<dyn Cache>> {
        let inner = self.inner.open(name).await?;
        Ok(Arc::new(RecordingCache {
            inner,
            puts: self.puts.clone(),
        }))
    }

    async fn has(&self, name: &str) -> bool {
        self.inner.has(name).await
    }

    async fn keys(&self) -> Vec<String> {
        self.inner.keys().await
    }

    async fn delete(&self, name: &str) -> bool {
        self.inner.delete(name).await
    }

    async fn match_any(&self, request: &Request) -> Option<Response> {
        self.inner.match_any(request).await
    }
}

#[async_trait]
impl Cache for RecordingCache {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn match_request(&self, request: &Request) -> Option<Response> {
        self.inner.match_request(request).await
    }

    async fn put(&self, request: Request, response: Response) -> winered_sw::Result<()> {
        self.puts
            .lock()
            .unwrap()
            .push((self.inner.name().to_string(), request.clone()));
        self.inner.put(request, response).await
    }

    async fn keys(&self) -> Vec<Request> {
        self.inner.keys().await
    }

    async fn len(&self) -> usize {
        self.inner.len().await
    }
}

fn get(url: &str) -> Request {
    Request::get(url).unwrap()
}

async fn active_worker(
    config: WorkerConfig,
    storage: Arc<dyn CacheStorage>,
    fetcher: Arc<dyn Fetcher>,
) -> ServiceWorker {
    let worker = ServiceWorker::new(
        config,
        storage,
        fetcher,
        Arc::new(LoggingHost),
        Arc::new(LoggingHost),
    )
    .unwrap();
    worker.install().await.unwrap();
    worker.activate().await.unwrap();
    worker
}

fn no_precache() -> WorkerConfig {
    WorkerConfig::builder().static_files(Vec::<String>::new()).build()
}

// ============================================================================
// Routing
// ============================================================================

#[tokio::test]
async fn test_pages_route_to_static_cache_first_regardless_of_query() {
    let worker = active_worker(
        no_precache(),
        Arc::new(MemoryCacheStorage::new()),
        Arc::new(ForbiddenNetwork),
    )
    .await;

    for url in [
        "http://localhost:8080/",
        "http://localhost:8080/?v=3",
        "http://localhost:8080/details.html?wine=merlot",
    ] {
        let route = worker.route(&get(url)).unwrap();
        assert_eq!(route.strategy, Strategy::CacheFirst, "{}", url);
        assert_eq!(route.cache, CacheKind::Static, "{}", url);
    }
}

#[tokio::test]
async fn test_font_and_api_routes() {
    let worker = active_worker(
        no_precache(),
        Arc::new(MemoryCacheStorage::new()),
        Arc::new(ForbiddenNetwork),
    )
    .await;

    let font = worker
        .route(&get("https://fonts.gstatic.com/s/fahkwang/v1/NoaO6WfjJ4bqM1m1KAeV-3o.woff2"))
        .unwrap();
    assert_eq!(font.kind, RouteKind::Font);
    assert_eq!((font.strategy, font.cache), (Strategy::CacheFirst, CacheKind::Static));

    for url in ["https://api.sheetbest.com/sheets/1", "https://api.sheetdb.io/data"] {
        let api = worker.route(&get(url)).unwrap();
        assert_eq!((api.strategy, api.cache), (Strategy::NetworkFirst, CacheKind::Dynamic));
    }
}

#[tokio::test]
async fn test_non_get_is_never_handled() {
    let worker = active_worker(
        no_precache(),
        Arc::new(MemoryCacheStorage::new()),
        Arc::new(ForbiddenNetwork),
    )
    .await;

    let url = url::Url::parse("https://api.sheetdb.io/data").unwrap();
    for method in [Method::Post, Method::Put, Method::Patch, Method::Delete] {
        let request = Request::new(method, url.clone());
        assert!(worker.route(&request).is_none());
        // ForbiddenNetwork would panic if a strategy ran
        assert_eq!(worker.handle_fetch(&request).await, FetchOutcome::Passthrough);
    }
}

// ============================================================================
// Strategies
// ============================================================================

#[tokio::test]
async fn test_cache_first_hit_never_touches_network() {
    let storage = MemoryCacheStorage::new();
    let request = get("http://localhost:8080/index.html");
    // Stored in the dynamic cache; lookup is not scoped to the target cache
    let dynamic = storage.open("winered-dynamic-v1.0.0").await.unwrap();
    dynamic
        .put(request.clone(), Response::new(200, "cached page"))
        .await
        .unwrap();

    let worker = active_worker(
        no_precache(),
        Arc::new(storage.clone()),
        Arc::new(ForbiddenNetwork),
    )
    .await;

    let outcome = worker.handle_fetch(&request).await;
    assert_eq!(outcome.response().unwrap().text(), "cached page");

    let entry = storage
        .get("winered-dynamic-v1.0.0")
        .await
        .unwrap()
        .entry(&request)
        .await
        .unwrap();
    assert_eq!(entry.metadata.access_count, 1);

    let stats = storage.stats().await;
    assert_eq!((stats.hits, stats.lookups()), (1, 1));
}

#[tokio::test]
async fn test_network_first_consults_network_before_cache() {
    let network = Arc::new(ScriptedNetwork::default().with("https://api.sheetdb.io/data", 200));
    let storage = MemoryCacheStorage::new();
    let request = get("https://api.sheetdb.io/data");
    let dynamic = storage.open("winered-dynamic-v1.0.0").await.unwrap();
    dynamic
        .put(request.clone(), Response::new(200, "old rows"))
        .await
        .unwrap();

    let worker = active_worker(no_precache(), Arc::new(storage.clone()), network.clone()).await;
    let outcome = worker.handle_fetch(&request).await;

    assert_eq!(
        outcome.response().unwrap().text(),
        "network:https://api.sheetdb.io/data"
    );
    assert_eq!(network.calls(), vec!["https://api.sheetdb.io/data".to_string()]);
}

#[tokio::test]
async fn test_network_first_offline_serves_prior_dynamic_entry() {
    let storage = MemoryCacheStorage::new();
    let request = get("https://api.sheetdb.io/data");
    let dynamic = storage.open("winered-dynamic-v1.0.0").await.unwrap();
    dynamic
        .put(request.clone(), Response::new(200, "prior rows"))
        .await
        .unwrap();

    let network = Arc::new(ScriptedNetwork::default());
    let worker = active_worker(no_precache(), Arc::new(storage), network.clone()).await;

    let outcome = worker.handle_fetch(&request).await;
    let response = outcome.response().unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.text(), "prior rows");
    assert_eq!(network.calls().len(), 1);
}

#[tokio::test]
async fn test_network_first_offline_without_cache_is_503() {
    let worker = active_worker(
        no_precache(),
        Arc::new(MemoryCacheStorage::new()),
        Arc::new(ScriptedNetwork::default()),
    )
    .await;

    let outcome = worker.handle_fetch(&get("https://api.sheetbest.com/sheets/1")).await;
    let response = outcome.response().unwrap();
    assert_eq!(response.status, 503);
    assert_eq!(response.text(), "Network error");
}

#[tokio::test]
async fn test_successful_fetch_puts_exactly_once_into_target_cache() {
    let names = CacheNames::default();
    let page = "http://localhost:8080/details.html";
    let image = "https://dl.dropboxusercontent.com/s/x/bottle.jpg";
    let api = "https://api.sheetbest.com/sheets/1";
    let network = Arc::new(
        ScriptedNetwork::default()
            .with(page, 200)
            .with(image, 200)
            .with(api, 200),
    );
    let storage = RecordingStorage::default();
    let executor = StrategyExecutor::new(Arc::new(storage.clone()), network);

    executor.cache_first(&get(page), &names.static_cache).await;
    executor.cache_first(&get(image), &names.dynamic_cache).await;
    executor.network_first(&get(api), &names.dynamic_cache).await;

    let puts = storage.puts.lock().unwrap().clone();
    assert_eq!(
        puts,
        vec![
            (names.static_cache.clone(), get(page)),
            (names.dynamic_cache.clone(), get(image)),
            (names.dynamic_cache.clone(), get(api)),
        ]
    );
}

#[tokio::test]
async fn test_unsuccessful_fetch_is_not_stored() {
    let url = "http://localhost:8080/missing.html";
    let network = Arc::new(ScriptedNetwork::default().with(url, 404));
    let storage = RecordingStorage::default();
    let executor = StrategyExecutor::new(Arc::new(storage.clone()), network);

    let response = executor.cache_first(&get(url), "winered-static-v1.0.0").await;

    assert_eq!(response.status, 404);
    assert!(storage.puts.lock().unwrap().is_empty());
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn test_install_seeds_static_cache() {
    let network = Arc::new(
        ScriptedNetwork::default()
            .with("http://localhost:8080/", 200)
            .with("http://localhost:8080/index.html", 200),
    );
    let storage = MemoryCacheStorage::new();
    let config = WorkerConfig::builder().static_files(["/", "/index.html"]).build();
    let worker = ServiceWorker::new(
        config,
        Arc::new(storage.clone()),
        network,
        Arc::new(LoggingHost),
        Arc::new(LoggingHost),
    )
    .unwrap();

    let report = worker.install().await.unwrap();
    assert_eq!(report.precached, 2);

    let static_cache = storage.get("winered-static-v1.0.0").await.unwrap();
    assert_eq!(
        static_cache.keys().await,
        vec![get("http://localhost:8080/"), get("http://localhost:8080/index.html")]
    );
}

#[tokio::test]
async fn test_install_is_best_effort() {
    // Second file is offline: batch fails, install still succeeds
    let network = Arc::new(ScriptedNetwork::default().with("http://localhost:8080/", 200));
    let storage = MemoryCacheStorage::new();
    let config = WorkerConfig::builder().static_files(["/", "/index.html"]).build();
    let worker = ServiceWorker::new(
        config,
        Arc::new(storage.clone()),
        network,
        Arc::new(LoggingHost),
        Arc::new(LoggingHost),
    )
    .unwrap();

    let report = worker.install().await.unwrap();
    assert_eq!(report.precached, 0);
    assert!(report.precache_error.is_some());

    // Worker can still activate and serve
    worker.activate().await.unwrap();
    let outcome = worker.handle_fetch(&get("http://localhost:8080/")).await;
    assert_eq!(outcome.response().unwrap().text(), "network:http://localhost:8080/");
}

#[tokio::test]
async fn test_activation_prunes_everything_but_current_names() {
    let storage = MemoryCacheStorage::new();
    for name in [
        "winered-dashboard-v1.0.0",
        "winered-static-v0.9.0",
        "winered-dynamic-v0.9.0",
        "winered-dynamic-v1.0.0",
        "unrelated",
    ] {
        storage.open(name).await.unwrap();
    }

    let worker = ServiceWorker::new(
        no_precache(),
        Arc::new(storage.clone()),
        Arc::new(ForbiddenNetwork),
        Arc::new(LoggingHost),
        Arc::new(LoggingHost),
    )
    .unwrap();
    worker.install().await.unwrap();
    let mut deleted = worker.activate().await.unwrap();
    deleted.sort();

    assert_eq!(
        deleted,
        vec![
            "unrelated".to_string(),
            "winered-dashboard-v1.0.0".to_string(),
            "winered-dynamic-v0.9.0".to_string(),
            "winered-static-v0.9.0".to_string(),
        ]
    );
    let mut remaining = storage.keys().await;
    remaining.sort();
    assert_eq!(
        remaining,
        vec![
            "winered-dynamic-v1.0.0".to_string(),
            "winered-static-v1.0.0".to_string()
        ]
    );
}

#[tokio::test]
async fn test_version_bump_reclaims_previous_deployment() {
    let storage = MemoryCacheStorage::new();
    let network = Arc::new(ScriptedNetwork::default().with("http://localhost:8080/", 200));

    let v1 = WorkerConfig::builder().static_files(["/"]).build();
    active_worker(v1, Arc::new(storage.clone()), network.clone()).await;
    assert!(storage.has("winered-static-v1.0.0").await);

    let v2 = WorkerConfig::builder()
        .static_files(["/"])
        .cache_version("v1.1.0")
        .build();
    active_worker(v2, Arc::new(storage.clone()), network).await;

    let mut remaining = storage.keys().await;
    remaining.sort();
    assert_eq!(remaining, vec!["winered-static-v1.1.0".to_string()]);
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test]
async fn test_interleaved_fetch_events() {
    let urls = [
        "http://localhost:8080/",
        "http://localhost:8080/app.js",
        "https://api.sheetdb.io/data",
        "https://dl.dropboxusercontent.com/s/a/1.jpg",
        "https://dl.dropboxusercontent.com/s/a/2.jpg",
    ];
    let network = urls
        .iter()
        .fold(ScriptedNetwork::default(), |n, url| n.with(url, 200));
    let storage = MemoryCacheStorage::new();
    let worker = Arc::new(
        active_worker(no_precache(), Arc::new(storage.clone()), Arc::new(network)).await,
    );

    let tasks = urls.iter().map(|url| {
        let worker = worker.clone();
        let request = get(url);
        tokio::spawn(async move { worker.handle_fetch(&request).await })
    });
    let outcomes = futures::future::join_all(tasks).await;

    for outcome in outcomes {
        let outcome = outcome.unwrap();
        assert_eq!(outcome.response().unwrap().status, 200);
    }

    let static_cache = storage.get("winered-static-v1.0.0").await.unwrap();
    let dynamic_cache = storage.get("winered-dynamic-v1.0.0").await.unwrap();
    assert_eq!(static_cache.len().await, 1);
    assert_eq!(dynamic_cache.len().await, 4);
}

/// Network whose requests never complete
struct HangingNetwork;

#[async_trait]
impl Fetcher for HangingNetwork {
    async fn fetch(&self, _request: &Request) -> winered_sw::Result<Response> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn test_hung_install_does_not_block_other_events() {
    let config = WorkerConfig::builder().static_files(["/"]).build();
    let worker = Arc::new(
        ServiceWorker::new(
            config,
            Arc::new(MemoryCacheStorage::new()),
            Arc::new(HangingNetwork),
            Arc::new(LoggingHost),
            Arc::new(LoggingHost),
        )
        .unwrap(),
    );

    let installing = {
        let worker = worker.clone();
        tokio::spawn(async move { worker.install().await })
    };
    tokio::task::yield_now().await;

    let limit = std::time::Duration::from_secs(1);
    let request = get("http://localhost:8080/app.js");
    let outcome = tokio::time::timeout(limit, worker.handle_fetch(&request))
        .await
        .expect("fetch blocked behind install");
    assert_eq!(outcome, FetchOutcome::Passthrough);

    let state = tokio::time::timeout(limit, worker.state())
        .await
        .expect("state blocked behind install");
    assert_eq!(state, winered_sw::LifecycleState::Uninstalled);

    let message = tokio::time::timeout(
        limit,
        worker.handle_message(&serde_json::json!({"type": "SKIP_WAITING"})),
    )
    .await
    .expect("message blocked behind install");
    assert!(matches!(message, Err(WorkerError::InvalidTransition { .. })));

    assert!(!installing.is_finished());
    installing.abort();
}
