//! TTL-bounded query result cache.
//!
//! Keyed by the BLAKE3 hash of `(filters, page, page_size)`. Expiry is
//! lazy: moka drops an entry when a read finds it past its TTL — there
//! is no background sweeper.

use std::time::Duration;

use moka::sync::Cache;

use crate::hashing::QueryKey;

use super::types::EntityPage;

/// Default result TTL.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Default max cached pages.
pub const DEFAULT_CACHE_CAPACITY: u64 = 10_000;

/// Memoizes query pages for a fixed TTL.
#[derive(Clone)]
pub struct QueryCache {
    entries: Cache<QueryKey, EntityPage>,
    ttl: Duration,
}

impl QueryCache {
    /// Creates a cache with the default capacity and TTL.
    pub fn new() -> Self {
        Self::with_config(DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL)
    }

    /// Creates a cache with an entry capacity (LRU eviction) and TTL.
    pub fn with_config(capacity: u64, ttl: Duration) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
            ttl,
        }
    }

    #[inline]
    pub fn get(&self, key: &QueryKey) -> Option<EntityPage> {
        self.entries.get(key)
    }

    #[inline]
    pub fn put(&self, key: QueryKey, page: EntityPage) {
        self.entries.insert(key, page);
    }

    #[inline]
    pub fn invalidate(&self, key: &QueryKey) {
        self.entries.invalidate(key);
    }

    /// Drops every cached page.
    #[inline]
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    #[inline]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.entries.entry_count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.entry_count() == 0
    }

    /// Runs any pending maintenance tasks in the underlying cache.
    #[inline]
    pub fn run_pending_tasks(&self) {
        self.entries.run_pending_tasks();
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.entries.entry_count())
            .field("ttl", &self.ttl)
            .finish()
    }
}
