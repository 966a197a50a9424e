//! Counters kept by the cache store

use serde::{Deserialize, Serialize};
use std::fmt;

/// Statistics for cache store activity
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups that returned an entry
    pub hits: u64,

    /// Lookups that found nothing
    pub misses: u64,

    /// Entries written (overwrites included)
    pub puts: u64,

    /// Cache instances deleted
    pub deletions: u64,

    /// Batch populations that failed and wrote nothing
    pub failed_batches: u64,
}

impl CacheStats {
    /// Hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.lookups();
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }

    /// Hits plus misses
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CacheStats {{ hits: {}, misses: {}, hit_rate: {:.2}%, puts: {}, deletions: {} }}",
            self.hits,
            self.misses,
            self.hit_rate(),
            self.puts,
            self.deletions
        )
    }
}
