//! Install and activate transitions
//!
//! Install seeds the static cache on a best-effort basis; activate deletes
//! every cache instance that does not carry a current name.
//!
//! ```text
//! Uninstalled --install--> Installed (waiting) --activate / skip_waiting--> Active
//! ```

use crate::cache::names::CacheNames;
use crate::cache::store::CacheStorage;
use crate::error::{Result, WorkerError};
use crate::http::Request;
use crate::network::Fetcher;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

/// Where the worker is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Uninstalled,
    /// Installed and waiting to activate
    Installed,
    /// Eligible to intercept fetches
    Active,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleState::Uninstalled => write!(f, "uninstalled"),
            LifecycleState::Installed => write!(f, "installed"),
            LifecycleState::Active => write!(f, "active"),
        }
    }
}

/// Result of an install attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// Entries in the static cache after install
    pub precached: usize,
    /// Why population failed, if it did. Install succeeds regardless.
    pub precache_error: Option<String>,
}

/// Owns creation and destruction of cache instances
pub struct LifecycleManager {
    names: CacheNames,
    static_files: Vec<Request>,
    storage: Arc<dyn CacheStorage>,
    fetcher: Arc<dyn Fetcher>,
    state: RwLock<LifecycleState>,
    /// Serializes install and activate; `state` is only locked to read or commit
    transition: Mutex<()>,
}

impl LifecycleManager {
    pub fn new(
        names: CacheNames,
        static_files: Vec<Request>,
        storage: Arc<dyn CacheStorage>,
        fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        Self {
            names,
            static_files,
            storage,
            fetcher,
            state: RwLock::new(LifecycleState::Uninstalled),
            transition: Mutex::new(()),
        }
    }

    pub async fn state(&self) -> LifecycleState {
        *self.state.read().await
    }

    pub fn cache_names(&self) -> &CacheNames {
        &self.names
    }

    /// Open the static cache and populate it with the precache list in one batch
    ///
    /// A failed batch is logged and swallowed: the worker still installs,
    /// with whatever the static cache held before.
    pub async fn install(&self) -> Result<InstallReport> {
        let _transition = self.transition.lock().await;
        let state = self.state().await;
        if state == LifecycleState::Active {
            return Err(invalid("install", state));
        }

        let cache = self.storage.open(&self.names.static_cache).await?;
        info!("Caching {} static files into {}", self.static_files.len(), cache.name());

        let precache_error = match cache.add_all(&self.static_files, self.fetcher.as_ref()).await {
            Ok(()) => None,
            Err(e) => {
                warn!("Failed to cache static files: {}", e);
                Some(e.to_string())
            }
        };

        *self.state.write().await = LifecycleState::Installed;
        info!("Worker installed, waiting to activate");

        Ok(InstallReport {
            precached: cache.len().await,
            precache_error,
        })
    }

    /// Delete every cache instance whose name is not current
    ///
    /// Returns the deleted names. Re-running on an active worker prunes again.
    pub async fn activate(&self) -> Result<Vec<String>> {
        let _transition = self.transition.lock().await;
        let state = self.state().await;
        if state == LifecycleState::Uninstalled {
            return Err(invalid("activate", state));
        }

        let deleted = self.prune().await;

        *self.state.write().await = LifecycleState::Active;
        info!("Worker active ({} stale caches removed)", deleted.len());
        Ok(deleted)
    }

    /// Activate a waiting worker immediately; no-op once active
    pub async fn skip_waiting(&self) -> Result<Vec<String>> {
        match self.state().await {
            LifecycleState::Installed => {
                info!("Skipping waiting phase");
                self.activate().await
            }
            LifecycleState::Active => Ok(Vec::new()),
            state @ LifecycleState::Uninstalled => Err(invalid("skip waiting", state)),
        }
    }

    async fn prune(&self) -> Vec<String> {
        let mut deleted = Vec::new();
        for name in self.storage.keys().await {
            if self.names.is_current(&name) {
                continue;
            }
            info!("Deleting old cache: {}", name);
            if self.storage.delete(&name).await {
                deleted.push(name);
            }
        }
        deleted
    }
}

fn invalid(action: &str, state: LifecycleState) -> WorkerError {
    WorkerError::InvalidTransition {
        action: action.to_string(),
        state: state.to_string(),
    }
}
