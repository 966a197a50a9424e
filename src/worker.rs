//! The worker: routes host events to the lifecycle manager, the router and
//! the strategy executor.

use crate::cache::store::CacheStorage;
use crate::config::WorkerConfig;
use crate::error::Result;
use crate::events::{
    ClientControl, NotificationOptions, Notifier, PushPayload, WorkerEvent, WorkerMessage,
    BACKGROUND_SYNC_TAG, DASHBOARD_URL, EXPLORE_ACTION,
};
use crate::http::{Request, Response};
use crate::lifecycle::{InstallReport, LifecycleManager, LifecycleState};
use crate::network::Fetcher;
use crate::router::{RequestRouter, Route};
use crate::strategy::StrategyExecutor;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// How a fetch event was answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The worker produced the response
    Respond(Response),
    /// Not intercepted; the host performs its default network fetch
    Passthrough,
}

impl FetchOutcome {
    pub fn response(&self) -> Option<&Response> {
        match self {
            FetchOutcome::Respond(r) => Some(r),
            FetchOutcome::Passthrough => None,
        }
    }
}

/// Result of dispatching one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Installed(InstallReport),
    /// Names of the caches deleted during activation
    Activated(Vec<String>),
    Fetch(FetchOutcome),
    Handled,
    Ignored,
}

/// Offline caching worker for the dashboard
pub struct ServiceWorker {
    config: WorkerConfig,
    router: RequestRouter,
    executor: StrategyExecutor,
    lifecycle: LifecycleManager,
    notifier: Arc<dyn Notifier>,
    clients: Arc<dyn ClientControl>,
}

impl ServiceWorker {
    /// Build a worker; fails if the configuration is invalid
    pub fn new(
        config: WorkerConfig,
        storage: Arc<dyn CacheStorage>,
        fetcher: Arc<dyn Fetcher>,
        notifier: Arc<dyn Notifier>,
        clients: Arc<dyn ClientControl>,
    ) -> Result<Self> {
        config.validate()?;

        let lifecycle = LifecycleManager::new(
            config.cache_names.clone(),
            config.static_requests()?,
            storage.clone(),
            fetcher.clone(),
        );

        info!(
            "Worker created (static: {}, dynamic: {})",
            config.cache_names.static_cache, config.cache_names.dynamic_cache
        );

        Ok(Self {
            router: RequestRouter::new(config.routes.clone()),
            executor: StrategyExecutor::new(storage, fetcher),
            lifecycle,
            notifier,
            clients,
            config,
        })
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub async fn state(&self) -> LifecycleState {
        self.lifecycle.state().await
    }

    /// Dispatch one host event
    pub async fn handle_event(&self, event: WorkerEvent) -> Result<EventOutcome> {
        match event {
            WorkerEvent::Install => Ok(EventOutcome::Installed(self.install().await?)),
            WorkerEvent::Activate => Ok(EventOutcome::Activated(self.activate().await?)),
            WorkerEvent::Fetch(request) => Ok(EventOutcome::Fetch(self.handle_fetch(&request).await)),
            WorkerEvent::Sync { tag } => Ok(outcome(self.handle_sync(&tag).await)),
            WorkerEvent::Push(data) => Ok(outcome(self.handle_push(data.as_deref()).await?)),
            WorkerEvent::NotificationClick { title, action } => {
                self.handle_notification_click(&title, action.as_deref()).await?;
                Ok(EventOutcome::Handled)
            }
            WorkerEvent::Message(value) => Ok(outcome(self.handle_message(&value).await?)),
        }
    }

    pub async fn install(&self) -> Result<InstallReport> {
        self.lifecycle.install().await
    }

    pub async fn activate(&self) -> Result<Vec<String>> {
        self.lifecycle.activate().await
    }

    /// Routing decision for a request, without serving it
    pub fn route(&self, request: &Request) -> Option<Route> {
        self.router.classify(request)
    }

    /// Serve an intercepted request
    ///
    /// Non-GET requests, and every request before activation, pass through.
    pub async fn handle_fetch(&self, request: &Request) -> FetchOutcome {
        if self.lifecycle.state().await != LifecycleState::Active {
            debug!("Worker not active, passing through {}", request);
            return FetchOutcome::Passthrough;
        }

        let Some(route) = self.router.classify(request) else {
            return FetchOutcome::Passthrough;
        };

        let cache_name = self.config.cache_names.name_for(route.cache);
        let response = self
            .executor
            .execute(route.strategy, request, cache_name)
            .await;
        FetchOutcome::Respond(response)
    }

    /// Returns whether the tag was recognized
    pub async fn handle_sync(&self, tag: &str) -> bool {
        if tag != BACKGROUND_SYNC_TAG {
            debug!("Ignoring sync tag: {}", tag);
            return false;
        }
        self.background_sync().await;
        true
    }

    // Nothing is queued for replay yet, so a sync only reports completion
    async fn background_sync(&self) {
        info!("Background sync completed");
    }

    /// Show a notification for a push body. Returns whether one was shown.
    pub async fn handle_push(&self, data: Option<&str>) -> Result<bool> {
        let Some(raw) = data else {
            debug!("Push without payload");
            return Ok(false);
        };

        let payload = match PushPayload::parse(raw) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Dropping malformed push payload: {}", e);
                return Ok(false);
            }
        };

        let options = NotificationOptions::for_push(&payload);
        self.notifier
            .show_notification(&payload.title, options)
            .await?;
        Ok(true)
    }

    /// Close the clicked notification; the explore action opens the dashboard
    pub async fn handle_notification_click(&self, title: &str, action: Option<&str>) -> Result<()> {
        self.notifier.close_notification(title).await?;

        if action == Some(EXPLORE_ACTION) {
            self.clients.open_window(DASHBOARD_URL).await?;
        }
        Ok(())
    }

    /// Returns whether the message was recognized
    pub async fn handle_message(&self, value: &serde_json::Value) -> Result<bool> {
        match WorkerMessage::from_value(value) {
            Some(WorkerMessage::SkipWaiting) => {
                self.lifecycle.skip_waiting().await?;
                Ok(true)
            }
            None => {
                debug!("Ignoring message: {}", value);
                Ok(false)
            }
        }
    }
}

fn outcome(handled: bool) -> EventOutcome {
    if handled {
        EventOutcome::Handled
    } else {
        EventOutcome::Ignored
    }
}
