//! Version-stamped cache instance names
//!
//! Bumping the version string is how a deployment invalidates the previous
//! caches: the old instances stop matching and are pruned on the next
//! activation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name prefix shared by every cache this worker creates
pub const DEFAULT_PREFIX: &str = "winered";

/// Version stamp of the current deployment
pub const DEFAULT_VERSION: &str = "v1.0.0";

/// Logical cache a route writes into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheKind {
    /// Shell HTML and fonts; changes only on deployment
    Static,
    /// API responses and images fetched at runtime
    Dynamic,
}

impl fmt::Display for CacheKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKind::Static => write!(f, "static"),
            CacheKind::Dynamic => write!(f, "dynamic"),
        }
    }
}

/// The three named caches of one deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheNames {
    /// Generic cache from older deployments; only ever deleted
    pub legacy: String,
    pub static_cache: String,
    pub dynamic_cache: String,
}

impl Default for CacheNames {
    fn default() -> Self {
        Self::versioned(DEFAULT_PREFIX, DEFAULT_VERSION)
    }
}

impl CacheNames {
    /// Stamp all three names with `version`
    ///
    /// `versioned("winered", "v1.0.0")` yields `winered-dashboard-v1.0.0`,
    /// `winered-static-v1.0.0` and `winered-dynamic-v1.0.0`.
    pub fn versioned(prefix: &str, version: &str) -> Self {
        Self {
            legacy: format!("{}-dashboard-{}", prefix, version),
            static_cache: format!("{}-static-{}", prefix, version),
            dynamic_cache: format!("{}-dynamic-{}", prefix, version),
        }
    }

    pub fn name_for(&self, kind: CacheKind) -> &str {
        match kind {
            CacheKind::Static => &self.static_cache,
            CacheKind::Dynamic => &self.dynamic_cache,
        }
    }

    /// Names that survive activation
    pub fn current(&self) -> [&str; 2] {
        [&self.static_cache, &self.dynamic_cache]
    }

    /// Whether `name` is one of the live caches. The legacy name never is.
    pub fn is_current(&self, name: &str) -> bool {
        name == self.static_cache || name == self.dynamic_cache
    }
}
