//! In-memory cache implementation using moka
//!
//! Provides a fast, thread-safe in-memory cache. Values are stored as
//! JSON strings so any serializable type can be cached behind one
//! instance. Each entry expires after the TTL it was stored with, capped
//! by the cache-wide maximum configured at build time.

use super::CacheLayer;
use anyhow::{Context, Result};
use async_trait::async_trait;
use moka::{future::Cache, Expiry};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default maximum cache capacity (number of entries)
const DEFAULT_MAX_CAPACITY: u64 = 10_000;

/// Default upper bound for entry TTLs (1 hour)
const DEFAULT_MAX_TTL: Duration = Duration::from_secs(3600);

/// Cache entry wrapper carrying serialized JSON data and its lifetime
#[derive(Clone)]
struct CacheEntry {
    data: Arc<String>,
    ttl: Duration,
}

impl CacheEntry {
    fn new<T: Serialize>(value: &T, ttl: Duration) -> Result<Self> {
        let json = serde_json::to_string(value).context("Failed to serialize cache value")?;
        Ok(Self {
            data: Arc::new(json),
            ttl,
        })
    }

    fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.data).context("Failed to deserialize cache value")
    }
}

/// Expiry policy that reads each entry's stored TTL
struct EntryTtl;

impl Expiry<String, CacheEntry> for EntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &CacheEntry,
        _updated_at: Instant,
        _remaining: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// In-memory cache using moka
pub struct MemoryCache {
    cache: Cache<String, CacheEntry>,
    max_ttl: Duration,
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entry_count", &self.cache.entry_count())
            .field("max_ttl", &self.max_ttl)
            .finish()
    }
}

impl MemoryCache {
    /// Create a new memory cache with default settings
    pub fn new() -> Self {
        Self::with_capacity_and_max_ttl(DEFAULT_MAX_CAPACITY, DEFAULT_MAX_TTL)
    }

    /// Create a new memory cache with custom capacity and TTL ceiling
    pub fn with_capacity_and_max_ttl(max_capacity: u64, max_ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(EntryTtl)
            .build();

        Self { cache, max_ttl }
    }

    /// Get the current number of entries in the cache
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheLayer for MemoryCache {
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>> {
        match self.cache.get(key).await {
            Some(entry) => Ok(Some(entry.deserialize()?)),
            None => Ok(None),
        }
    }

    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<()> {
        let entry = CacheEntry::new(value, ttl.min(self.max_ttl))?;
        self.cache.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.cache.invalidate(key).await;
        Ok(())
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<()> {
        // moka iteration yields (Arc<K>, V)
        let keys_to_delete: Vec<String> = self
            .cache
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| (*key).clone())
            .collect();

        for key in keys_to_delete {
            self.cache.invalidate(&key).await;
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.cache.invalidate_all();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Payload {
        name: String,
        count: u64,
    }

    #[tokio::test]
    async fn test_set_and_get_typed_value() {
        let cache = MemoryCache::new();
        let value = Payload {
            name: "vitrine".to_string(),
            count: 3,
        };

        cache
            .set("payload", &value, Duration::from_secs(60))
            .await
            .unwrap();
        let got: Option<Payload> = cache.get("payload").await.unwrap();
        assert_eq!(got, Some(value));
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let cache = MemoryCache::new();
        let got: Option<String> = cache.get("missing").await.unwrap();
        assert!(got.is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let cache = MemoryCache::new();
        cache
            .set("key", &"value".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        cache.delete("key").await.unwrap();
        let got: Option<String> = cache.get("key").await.unwrap();
        assert!(got.is_none());
    }

    #[tokio::test]
    async fn test_delete_prefix() {
        let cache = MemoryCache::new();
        for key in ["posts:list:1", "posts:list:2", "posts:slug:a"] {
            cache
                .set(key, &"v".to_string(), Duration::from_secs(60))
                .await
                .unwrap();
        }

        cache.delete_prefix("posts:list").await.unwrap();

        let list1: Option<String> = cache.get("posts:list:1").await.unwrap();
        let list2: Option<String> = cache.get("posts:list:2").await.unwrap();
        let slug: Option<String> = cache.get("posts:slug:a").await.unwrap();
        assert!(list1.is_none());
        assert!(list2.is_none());
        assert_eq!(slug, Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = MemoryCache::new();
        cache
            .set("a", &1u32, Duration::from_secs(60))
            .await
            .unwrap();
        cache.clear().await.unwrap();
        let got: Option<u32> = cache.get("a").await.unwrap();
        assert!(got.is_none());
    }

    #[tokio::test]
    async fn test_entry_expires_after_its_own_ttl() {
        let cache = MemoryCache::new();
        cache
            .set("short", &"v".to_string(), Duration::from_millis(50))
            .await
            .unwrap();

        let got: Option<String> = cache.get("short").await.unwrap();
        assert_eq!(got, Some("v".to_string()));

        tokio::time::sleep(Duration::from_millis(200)).await;
        let got: Option<String> = cache.get("short").await.unwrap();
        assert!(got.is_none());
    }

    #[tokio::test]
    async fn test_entry_ttl_is_capped_by_max_ttl() {
        let cache = MemoryCache::with_capacity_and_max_ttl(100, Duration::from_millis(50));
        cache
            .set("long", &"v".to_string(), Duration::from_secs(3600))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;
        let got: Option<String> = cache.get("long").await.unwrap();
        assert!(got.is_none());
    }

    #[tokio::test]
    async fn test_overwrite_value() {
        let cache = MemoryCache::new();
        cache
            .set("k", &"one".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        cache
            .set("k", &"two".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        let got: Option<String> = cache.get("k").await.unwrap();
        assert_eq!(got, Some("two".to_string()));
    }
}
