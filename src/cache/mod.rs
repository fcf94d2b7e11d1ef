//! Cache layer
//!
//! In-process caching for the Vitrine service. A single moka-backed
//! implementation sits behind the `CacheLayer` trait; services depend on
//! the trait so tests can observe cache behavior without wiring real TTLs.
//!
//! The AI summary cache is deliberately NOT built on this layer: its
//! staleness window, stats reporting and single-flight coordination live
//! in `services::summary`.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::CacheConfig;

/// Cache layer trait
///
/// Generic methods keep call sites typed; implementations store values as
/// serialized JSON.
#[async_trait]
pub trait CacheLayer: Send + Sync {
    /// Get a value from cache
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>>;

    /// Set a value in cache with TTL
    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<()>;

    /// Delete a value from cache
    async fn delete(&self, key: &str) -> Result<()>;

    /// Delete all values whose key starts with the given prefix
    async fn delete_prefix(&self, prefix: &str) -> Result<()>;

    /// Clear all cache entries
    async fn clear(&self) -> Result<()>;
}

pub use memory::MemoryCache;

/// Create the cache instance from configuration
pub fn create_cache(config: &CacheConfig) -> Arc<MemoryCache> {
    let max_ttl = Duration::from_secs(config.ttl_seconds);
    Arc::new(MemoryCache::with_capacity_and_max_ttl(10_000, max_ttl))
}
