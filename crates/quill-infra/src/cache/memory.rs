//! In-memory cache implementation - used when Redis is not configured.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use quill_core::ports::{Cache, CacheError};

struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|exp| now >= exp)
    }
}

/// Process-wide cache over a HashMap guarded by an async RwLock.
///
/// Expired entries are swept on every write, so the map holds at most the
/// keys written within one TTL. Data is lost on process restart.
pub struct InMemoryCache {
    store: RwLock<HashMap<String, CacheEntry>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
        }
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.store.read().await.len()
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        {
            let store = self.store.read().await;
            let entry = store.get(key)?;
            if !entry.is_expired(now) {
                return Some(entry.value.clone());
            }
        }

        // Re-check under the write lock, a fresh value may have landed meanwhile.
        let mut store = self.store.write().await;
        if store.get(key).is_some_and(|entry| entry.is_expired(now)) {
            store.remove(key);
        }
        None
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let now = Instant::now();
        let expires_at = ttl.map(|d| now + d);

        let mut store = self.store.write().await;
        store.retain(|_, entry| !entry.is_expired(now));
        store.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at,
            },
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = InMemoryCache::new();
        cache.set("feed:global:", "page", None).await.unwrap();
        assert_eq!(cache.get("feed:global:").await, Some("page".to_string()));
    }

    #[tokio::test]
    async fn test_set_replaces_value() {
        let cache = InMemoryCache::new();
        cache.set("key1", "old", None).await.unwrap();
        cache.set("key1", "new", None).await.unwrap();
        assert_eq!(cache.get("key1").await, Some("new".to_string()));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_entry_expires() {
        let cache = InMemoryCache::new();
        cache
            .set("short", "value", Some(Duration::from_millis(20)))
            .await
            .unwrap();
        assert!(cache.get("short").await.is_some());

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(cache.get("short").await, None);
    }

    #[tokio::test]
    async fn test_expired_keys_do_not_accumulate() {
        let cache = InMemoryCache::new();
        cache.set("kept", "y", None).await.unwrap();

        for i in 0..1000 {
            let key = format!("feed:global:page=1&x={i}");
            cache.set(&key, "page", Some(Duration::ZERO)).await.unwrap();
        }

        // Only the live entry and the most recent write survive.
        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get("kept").await, Some("y".to_string()));
    }
}
