//! Worker configuration
//!
//! Defaults reproduce the deployed dashboard: version-stamped cache names,
//! the precache list and the host rules. Everything is immutable once the
//! worker is built; strategies receive cache names as plain parameters.

use crate::cache::names::{CacheNames, DEFAULT_PREFIX};
use crate::error::{Result, WorkerError};
use crate::http::Request;
use crate::router::RouteRules;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};
use url::Url;

/// Origin relative precache paths are resolved against
pub const DEFAULT_ORIGIN: &str = "http://localhost:8080";

/// Environment variable re-stamping every cache name with a new version
pub const ENV_CACHE_VERSION: &str = "WINERED_CACHE_VERSION";

/// Environment variable overriding the origin
pub const ENV_ORIGIN: &str = "WINERED_ORIGIN";

/// Files cached at install time, in order
pub const STATIC_FILES: &[&str] = &[
    "/",
    "/index.html",
    "/details.html",
    "https://fonts.googleapis.com/css2?family=Fahkwang:wght@400;500;600;700&family=DM+Sans:opsz,wght@9..40,300;9..40,400;9..40,500;9..40,600&display=swap",
    "https://fonts.gstatic.com/s/fahkwang/v1/NoaO6WfjJ4bqM1m1KAeV-3o.woff2",
    "https://fonts.gstatic.com/s/dmsans/v14/ieVc2o3ADXF6cFWN41vPW9a.woff2",
];

/// Configuration for the offline worker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Current cache instance names
    pub cache_names: CacheNames,

    /// Precache list; same-origin paths or absolute URLs. Duplicates are not removed.
    pub static_files: Vec<String>,

    /// Origin the worker serves; parsed by `origin_url`
    pub origin: String,

    /// Host rules for the router
    pub routes: RouteRules,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            cache_names: CacheNames::default(),
            static_files: STATIC_FILES.iter().map(|s| s.to_string()).collect(),
            origin: DEFAULT_ORIGIN.to_string(),
            routes: RouteRules::default(),
        }
    }
}

impl WorkerConfig {
    pub fn builder() -> WorkerConfigBuilder {
        WorkerConfigBuilder::default()
    }

    /// Load defaults, then apply overrides from the environment (and `.env`)
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let mut builder = Self::builder();

        if let Ok(version) = std::env::var(ENV_CACHE_VERSION) {
            debug!("Cache version from environment: {}", version);
            builder = builder.cache_version(&version);
        }

        if let Ok(origin) = std::env::var(ENV_ORIGIN) {
            debug!("Origin from environment: {}", origin);
            builder = builder.origin(origin);
        }

        let config = builder.build();
        config.validate()?;

        info!(
            "Loaded worker config (static: {}, dynamic: {})",
            config.cache_names.static_cache, config.cache_names.dynamic_cache
        );
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let names = &self.cache_names;
        if names.static_cache.is_empty() || names.dynamic_cache.is_empty() {
            return Err(WorkerError::ConfigError(
                "cache names must not be empty".to_string(),
            ));
        }

        if names.static_cache == names.dynamic_cache {
            return Err(WorkerError::ConfigError(
                "static and dynamic caches must have different names".to_string(),
            ));
        }

        if names.is_current(&names.legacy) {
            return Err(WorkerError::ConfigError(
                "legacy cache name collides with a live cache".to_string(),
            ));
        }

        if self.origin_url()?.cannot_be_a_base() {
            return Err(WorkerError::ConfigError(format!(
                "origin {} cannot resolve relative paths",
                self.origin
            )));
        }

        let rules = &self.routes;
        let all_hosts = rules
            .font_hosts
            .iter()
            .chain(&rules.api_hosts)
            .chain(&rules.image_hosts);
        let mut seen = HashSet::new();
        for host in all_hosts {
            if host.trim().is_empty() {
                return Err(WorkerError::ConfigError(
                    "route host patterns must not be empty".to_string(),
                ));
            }
            if !seen.insert(host.as_str()) {
                return Err(WorkerError::ConfigError(format!(
                    "host pattern {} appears in more than one rule",
                    host
                )));
            }
        }

        self.static_requests()?;
        Ok(())
    }

    pub fn origin_url(&self) -> Result<Url> {
        Url::parse(&self.origin).map_err(|e| {
            WorkerError::ConfigError(format!("origin {} is not a valid URL: {}", self.origin, e))
        })
    }

    /// Precache list resolved against the origin
    pub fn static_requests(&self) -> Result<Vec<Request>> {
        let origin = self.origin_url()?;
        self.static_files
            .iter()
            .map(|f| Request::get_relative(&origin, f))
            .collect()
    }
}

/// Builder for worker configuration
#[derive(Debug, Default)]
pub struct WorkerConfigBuilder {
    cache_names: Option<CacheNames>,
    static_files: Option<Vec<String>>,
    origin: Option<String>,
    routes: Option<RouteRules>,
}

impl WorkerConfigBuilder {
    pub fn cache_names(mut self, names: CacheNames) -> Self {
        self.cache_names = Some(names);
        self
    }

    /// Stamp the default cache names with `version`
    pub fn cache_version(mut self, version: &str) -> Self {
        self.cache_names = Some(CacheNames::versioned(DEFAULT_PREFIX, version));
        self
    }

    pub fn static_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.static_files = Some(files.into_iter().map(Into::into).collect());
        self
    }

    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn routes(mut self, routes: RouteRules) -> Self {
        self.routes = Some(routes);
        self
    }

    pub fn build(self) -> WorkerConfig {
        let defaults = WorkerConfig::default();

        WorkerConfig {
            cache_names: self.cache_names.unwrap_or(defaults.cache_names),
            static_files: self.static_files.unwrap_or(defaults.static_files),
            origin: self.origin.unwrap_or(defaults.origin),
            routes: self.routes.unwrap_or(defaults.routes),
        }
    }
}
