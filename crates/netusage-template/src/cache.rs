//! Bounded cache of resolved subscriptions
//!
//! Entries are immutable once inserted. Eviction is by capacity (LRU-ish,
//! moka's TinyLFU) and by time-to-live, so a removed subscription can keep
//! resolving from cache for at most `ttl_secs` unless invalidated.

use moka::sync::Cache;
use netusage_common::{SubscriptionId, SubscriptionInfo};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Cache sizing and staleness bound
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum cached subscriptions
    pub capacity: u64,
    /// Seconds an entry may live
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 64,
            ttl_secs: 3600,
        }
    }
}

/// Subscription cache shared by all resolver callers
#[derive(Clone)]
pub struct SubscriptionCache {
    cache: Cache<SubscriptionId, Arc<SubscriptionInfo>>,
}

impl SubscriptionCache {
    /// Create cache from config
    pub fn new(config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.capacity)
            .time_to_live(Duration::from_secs(config.ttl_secs))
            .build();

        Self { cache }
    }

    /// Cached record, if still present
    #[inline]
    pub fn get(&self, id: SubscriptionId) -> Option<Arc<SubscriptionInfo>> {
        self.cache.get(&id)
    }

    /// Whether an entry is present
    #[inline]
    pub fn contains(&self, id: SubscriptionId) -> bool {
        self.cache.contains_key(&id)
    }

    /// Insert record under its own id
    pub fn insert(&self, info: SubscriptionInfo) -> Arc<SubscriptionInfo> {
        let info = Arc::new(info);
        self.cache.insert(info.id, Arc::clone(&info));
        info
    }

    /// Drop one entry
    pub fn invalidate(&self, id: SubscriptionId) {
        self.cache.invalidate(&id);
    }

    /// Drop all entries
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Approximate entry count (flushes pending maintenance first)
    pub fn len(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SubscriptionCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}
