//! TTL cache
//!
//! Entries live until their TTL expires; there is no eviction-order policy
//! and capacity is unbounded. A disabled-cache configuration substitutes a
//! no-op implementation behind the same trait so callers never branch on
//! cache-enabled state.

mod key;
mod memory;
mod warmer;

pub use key::{employee_key, employee_list_key, health_key, request_key};
pub use memory::{MemoryCache, DEFAULT_SWEEP_PERIOD};
pub use warmer::CacheWarmer;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Key/value store with per-entry expiry and manual invalidation
///
/// Values are opaque JSON. `ttl` is in seconds; `None` applies the store's
/// default.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Option<Value>;

    async fn set(&self, key: &str, value: Value, ttl: Option<u64>);

    async fn delete(&self, key: &str);

    async fn clear(&self);

    async fn has(&self, key: &str) -> bool;
}

/// No-op cache used when caching is disabled
pub struct NoopCache;

#[async_trait]
impl Cache for NoopCache {
    async fn get(&self, _key: &str) -> Option<Value> {
        None
    }

    async fn set(&self, _key: &str, _value: Value, _ttl: Option<u64>) {}

    async fn delete(&self, _key: &str) {}

    async fn clear(&self) {}

    async fn has(&self, _key: &str) -> bool {
        false
    }
}

/// Build the configured cache implementation
///
/// The in-memory store gets its periodic expiry sweep started here, so this
/// must be called from within a tokio runtime. The sweeper stops once the
/// cache is dropped.
pub fn create_cache(enabled: bool, default_ttl_secs: u64) -> Arc<dyn Cache> {
    if enabled {
        let cache = Arc::new(MemoryCache::new(Duration::from_secs(default_ttl_secs)));
        cache.spawn_sweeper(DEFAULT_SWEEP_PERIOD);
        cache
    } else {
        Arc::new(NoopCache)
    }
}
