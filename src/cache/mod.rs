//! # Named Response Caches
//!
//! The worker keeps two live cache instances per deployment, both named
//! with the deployment's version stamp:
//!
//! - **static**: shell pages and fonts, seeded at install time
//! - **dynamic**: API responses and product images, filled while serving
//!
//! A third, legacy generic name is recognized only so activation can delete
//! it. Lookups search every instance; writes go to one named instance.
//!
//! ## Example
//!
//! ```rust
//! use winered_sw::cache::{Cache, CacheNames, CacheStorage, MemoryCacheStorage};
//! use winered_sw::http::{Request, Response};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let names = CacheNames::default();
//! let storage = MemoryCacheStorage::new();
//!
//! let dynamic = storage.open(&names.dynamic_cache).await?;
//! let request = Request::get("https://api.sheetdb.io/data")?;
//! dynamic.put(request.clone(), Response::new(200, "[]")).await?;
//!
//! // Found through the storage-wide lookup
//! assert!(storage.match_any(&request).await.is_some());
//! # Ok(())
//! # }
//! ```

pub mod entry;
pub mod names;
pub mod store;
pub mod types;

pub use entry::{CacheEntry, CacheMetadata};
pub use names::{CacheKind, CacheNames};
pub use store::{Cache, CacheStorage, MemoryCache, MemoryCacheStorage};
pub use types::CacheStats;
