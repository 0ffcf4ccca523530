//! In-memory cache implementation with TTL expiry.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::Cache;

struct CacheEntry {
    value: String,
    expires_at: Instant,
}

/// Process-local cache backed by a guarded map.
///
/// Expired entries are dropped lazily on read and on overwrite; there is
/// no background sweeper.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            _ => None,
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    async fn delete(&self, key: &str) {
        let mut entries = self.entries.write().await;
        entries.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = MemoryCache::new();
        cache
            .set("key", "value".to_string(), Duration::from_secs(60))
            .await;
        assert_eq!(cache.get("key").await, Some("value".to_string()));
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let cache = MemoryCache::new();
        assert_eq!(cache.get("missing").await, None);
    }

    #[tokio::test]
    async fn test_expired_entry_is_gone() {
        let cache = MemoryCache::new();
        cache
            .set("key", "value".to_string(), Duration::from_millis(10))
            .await;
        tokio::time::sleep(Duration::from_millis(25)).await;
        assert_eq!(cache.get("key").await, None);
    }

    #[tokio::test]
    async fn test_delete() {
        let cache = MemoryCache::new();
        cache
            .set("key", "value".to_string(), Duration::from_secs(60))
            .await;
        cache.delete("key").await;
        assert_eq!(cache.get("key").await, None);
    }

    #[tokio::test]
    async fn test_overwrite_refreshes_value() {
        let cache = MemoryCache::new();
        cache
            .set("key", "one".to_string(), Duration::from_secs(60))
            .await;
        cache
            .set("key", "two".to_string(), Duration::from_secs(60))
            .await;
        assert_eq!(cache.get("key").await, Some("two".to_string()));
    }
}
