//! Cached request/response pairs

use crate::http::{Request, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One stored response, keyed by the request that produced it
///
/// There is no expiry: an entry lives until it is overwritten by a later
/// `put` for the same request or its cache instance is deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub request: Request,
    pub response: Response,
    pub metadata: CacheMetadata,
}

/// Bookkeeping attached to an entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMetadata {
    /// When the entry was written
    pub stored_at: DateTime<Utc>,

    /// Last time a lookup returned this entry
    pub accessed_at: DateTime<Utc>,

    /// Number of lookups served
    pub access_count: u64,

    /// Body size in bytes
    pub size_bytes: usize,
}

impl CacheEntry {
    pub fn new(request: Request, response: Response) -> Self {
        let now = Utc::now();
        let size_bytes = response.body.len();

        Self {
            request,
            response,
            metadata: CacheMetadata {
                stored_at: now,
                accessed_at: now,
                access_count: 0,
                size_bytes,
            },
        }
    }

    pub fn mark_accessed(&mut self) {
        self.metadata.accessed_at = Utc::now();
        self.metadata.access_count += 1;
    }

    pub fn age(&self) -> Duration {
        (Utc::now() - self.metadata.stored_at)
            .to_std()
            .unwrap_or(Duration::from_secs(0))
    }
}
