//! In-memory TTL cache

use super::Cache;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tracing::debug;

/// How often the background sweep removes expired entries
pub const DEFAULT_SWEEP_PERIOD: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// In-memory key/value store with per-entry expiry
///
/// Entries are evicted lazily on access and by a periodic background sweep
/// (see [`MemoryCache::spawn_sweeper`]). Capacity is unbounded; TTL is the
/// only eviction policy. The store is shared across in-flight calls behind
/// an `Arc`, so all mutation goes through the interior lock.
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    default_ttl: Duration,
}

impl MemoryCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_ttl,
        }
    }

    /// Number of live (possibly expired, not yet swept) entries
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Remove every expired entry
    pub fn purge_expired(&self) {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));

        let removed = before - entries.len();
        if removed > 0 {
            debug!("Cache sweep removed {} expired entries", removed);
        }
    }

    /// Start the periodic expiry sweep
    ///
    /// The task holds only a weak reference and exits once the cache is
    /// dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, period: Duration) -> tokio::task::JoinHandle<()> {
        let weak: Weak<MemoryCache> = Arc::downgrade(self);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick fires immediately; skip it
            interval.tick().await;

            loop {
                interval.tick().await;
                match weak.upgrade() {
                    Some(cache) => cache.purge_expired(),
                    None => break,
                }
            }
        })
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Option<Value> {
        let now = Instant::now();

        {
            let entries = self.entries.read();
            match entries.get(key) {
                Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: evict lazily
        self.entries.write().remove(key);
        None
    }

    async fn set(&self, key: &str, value: Value, ttl: Option<u64>) {
        let ttl = ttl.map(Duration::from_secs).unwrap_or(self.default_ttl);
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().insert(key.to_string(), entry);
    }

    async fn delete(&self, key: &str) {
        self.entries.write().remove(key);
    }

    async fn clear(&self) {
        self.entries.write().clear();
    }

    async fn has(&self, key: &str) -> bool {
        let now = Instant::now();
        self.entries
            .read()
            .get(key)
            .map(|entry| !entry.is_expired(now))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cache() -> MemoryCache {
        MemoryCache::new(Duration::from_secs(300))
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let cache = cache();

        cache.set("k", json!({"answer": 42}), None).await;
        assert_eq!(cache.get("k").await, Some(json!({"answer": 42})));
        assert!(cache.has("k").await);
    }

    #[tokio::test]
    async fn test_miss_returns_none() {
        let cache = cache();
        assert!(cache.get("absent").await.is_none());
        assert!(!cache.has("absent").await);
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let cache = MemoryCache::new(Duration::from_millis(10));

        cache.set("k", json!("v"), None).await;
        assert!(cache.has("k").await);

        tokio::time::sleep(Duration::from_millis(25)).await;
        assert!(!cache.has("k").await);
        assert!(cache.get("k").await.is_none());
    }

    #[tokio::test]
    async fn test_explicit_ttl_overrides_default() {
        let cache = MemoryCache::new(Duration::from_secs(300));

        cache.set("short", json!(1), Some(0)).await;
        assert!(cache.get("short").await.is_none());

        cache.set("long", json!(2), Some(60)).await;
        assert_eq!(cache.get("long").await, Some(json!(2)));
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let cache = cache();

        cache.set("a", json!(1), None).await;
        cache.set("b", json!(2), None).await;

        cache.delete("a").await;
        assert!(cache.get("a").await.is_none());
        assert!(cache.get("b").await.is_some());

        cache.clear().await;
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_purge_removes_only_expired() {
        let cache = MemoryCache::new(Duration::from_secs(300));

        cache.set("stale", json!(1), Some(0)).await;
        cache.set("fresh", json!(2), Some(60)).await;
        assert_eq!(cache.len(), 2);

        cache.purge_expired();
        assert_eq!(cache.len(), 1);
        assert!(cache.has("fresh").await);
    }
}
