//! Request classification
//!
//! Each intercepted GET is matched against a fixed, ordered list of rules;
//! the first hit decides the strategy and the cache it writes into.
//! Matching is plain substring work on the URL's path and hostname.

use crate::cache::names::CacheKind;
use crate::http::Request;
use crate::strategy::Strategy;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Hostnames the router recognizes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRules {
    /// Font CSS and font file hosts
    pub font_hosts: Vec<String>,
    /// Spreadsheet-backed data APIs
    pub api_hosts: Vec<String>,
    /// File host serving product images
    pub image_hosts: Vec<String>,
}

impl Default for RouteRules {
    fn default() -> Self {
        Self {
            font_hosts: vec![
                "fonts.googleapis.com".to_string(),
                "fonts.gstatic.com".to_string(),
            ],
            api_hosts: vec!["api.sheetbest.com".to_string(), "sheetdb.io".to_string()],
            image_hosts: vec!["dropboxusercontent.com".to_string()],
        }
    }
}

/// Which rule matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    /// Root path or any `.html` page
    Page,
    Font,
    Api,
    Image,
    /// Nothing else matched
    Fallback,
}

impl fmt::Display for RouteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteKind::Page => write!(f, "page"),
            RouteKind::Font => write!(f, "font"),
            RouteKind::Api => write!(f, "api"),
            RouteKind::Image => write!(f, "image"),
            RouteKind::Fallback => write!(f, "fallback"),
        }
    }
}

/// Routing decision for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub kind: RouteKind,
    pub strategy: Strategy,
    pub cache: CacheKind,
}

impl Route {
    const fn new(kind: RouteKind, strategy: Strategy, cache: CacheKind) -> Self {
        Self {
            kind,
            strategy,
            cache,
        }
    }
}

/// Classifies intercepted requests
#[derive(Debug, Clone, Default)]
pub struct RequestRouter {
    rules: RouteRules,
}

impl RequestRouter {
    pub fn new(rules: RouteRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RouteRules {
        &self.rules
    }

    /// Decide how to serve `request`, or `None` to leave it to the network
    ///
    /// Only GET requests are intercepted.
    pub fn classify(&self, request: &Request) -> Option<Route> {
        if !request.is_get() {
            debug!("Not intercepting {}", request);
            return None;
        }

        let route = self.route_for(request);
        debug!(
            "Routing {} as {} ({} -> {} cache)",
            request.url, route.kind, route.strategy, route.cache
        );
        Some(route)
    }

    fn route_for(&self, request: &Request) -> Route {
        let path = request.url.path();
        let host = request.url.host_str().unwrap_or("");

        if path == "/" || path.contains(".html") {
            Route::new(RouteKind::Page, Strategy::CacheFirst, CacheKind::Static)
        } else if host_matches(host, &self.rules.font_hosts) {
            Route::new(RouteKind::Font, Strategy::CacheFirst, CacheKind::Static)
        } else if host_matches(host, &self.rules.api_hosts) {
            Route::new(RouteKind::Api, Strategy::NetworkFirst, CacheKind::Dynamic)
        } else if host_matches(host, &self.rules.image_hosts) {
            Route::new(RouteKind::Image, Strategy::CacheFirst, CacheKind::Dynamic)
        } else {
            Route::new(RouteKind::Fallback, Strategy::NetworkFirst, CacheKind::Dynamic)
        }
    }
}

fn host_matches(host: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|p| host.contains(p.as_str()))
}
