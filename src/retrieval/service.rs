//! The cached retrieval service.
//!
//! Query path, in order: TTL cache → single-flight de-duplication →
//! retry-wrapped backing call → snapshot fallback. Explicitly
//! constructed with a lifecycle (`new` → `start` → `stop`) so tests can
//! run isolated instances; nothing here is a module-level singleton.

use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::Shared;
use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::hashing::QueryKey;

use super::cache::{DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL, QueryCache};
use super::error::RetrievalError;
use super::retry::{RetryPolicy, with_retry};
use super::snapshot::SnapshotStore;
use super::source::EntityProvider;
use super::types::{EntityPage, EntityQuery, ServeMode, ServedPage};

/// Default rows per page.
pub const DEFAULT_PAGE_SIZE: u32 = 25;

/// Tuning for one service instance.
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    pub page_size: u32,
    pub cache_capacity: u64,
    pub cache_ttl: Duration,
    pub retry: RetryPolicy,
    /// JSON entity export loaded as the fallback snapshot at start.
    pub snapshot_path: Option<PathBuf>,
    /// Eagerly warm page N+1 after serving page N.
    pub prefetch: bool,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            cache_ttl: DEFAULT_CACHE_TTL,
            retry: RetryPolicy::default(),
            snapshot_path: None,
            prefetch: true,
        }
    }
}

type InflightFetch = Shared<Pin<Box<dyn Future<Output = Result<EntityPage, RetrievalError>> + Send>>>;

/// Serves filter/sort/paginate queries over the scored entity set.
pub struct RetrievalService<P: EntityProvider + 'static> {
    config: RetrievalConfig,
    provider: Arc<P>,
    cache: QueryCache,
    snapshot: SnapshotStore,
    inflight: Arc<Mutex<HashMap<QueryKey, InflightFetch>>>,
}

impl<P: EntityProvider + 'static> Clone for RetrievalService<P> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            provider: Arc::clone(&self.provider),
            cache: self.cache.clone(),
            snapshot: self.snapshot.clone(),
            inflight: Arc::clone(&self.inflight),
        }
    }
}

impl<P: EntityProvider + 'static> RetrievalService<P> {
    pub fn new(config: RetrievalConfig, provider: P) -> Self {
        let cache = QueryCache::with_config(config.cache_capacity, config.cache_ttl);
        Self {
            config,
            provider: Arc::new(provider),
            cache,
            snapshot: SnapshotStore::new(),
            inflight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Uses an existing snapshot handle (shared with a store exporter).
    pub fn with_snapshot(mut self, snapshot: SnapshotStore) -> Self {
        self.snapshot = snapshot;
        self
    }

    /// Loads the fallback snapshot and probes the backing source.
    ///
    /// A missing or unreadable snapshot is tolerated — the service
    /// starts, it just has nothing to degrade to until a refresh.
    pub async fn start(&self) {
        if let Some(path) = self.config.snapshot_path.clone() {
            match self.snapshot.load_from_path(&path).await {
                Ok(count) => info!(entities = count, "retrieval service snapshot ready"),
                Err(e) => warn!(error = %e, "starting without a fallback snapshot"),
            }
        }

        if self.provider.is_ready().await {
            info!("backing source reachable");
        } else {
            warn!("backing source unreachable at start, queries will retry");
        }
    }

    /// Drops cached pages and forgets in-flight bookkeeping.
    pub fn stop(&self) {
        self.cache.clear();
        self.inflight.lock().clear();
        info!("retrieval service stopped");
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn snapshot(&self) -> &SnapshotStore {
        &self.snapshot
    }

    /// Probes the backing source.
    pub async fn backing_ready(&self) -> bool {
        self.provider.is_ready().await
    }

    /// Answers one query page: live, cached, or fallback-degraded —
    /// always the same envelope.
    ///
    /// Errors only with [`RetrievalError::Unavailable`], when the
    /// backing source is exhausted and no snapshot was ever loaded.
    #[instrument(skip(self, query), fields(sort_by = %query.sort_by))]
    pub async fn query(
        &self,
        query: &EntityQuery,
        page: u32,
    ) -> Result<ServedPage, RetrievalError> {
        self.query_page(query, page.max(1), true).await
    }

    async fn query_page(
        &self,
        query: &EntityQuery,
        page: u32,
        allow_prefetch: bool,
    ) -> Result<ServedPage, RetrievalError> {
        let bypass = query.bypasses_cache();
        let key = query.cache_key(page, self.config.page_size);

        if !bypass {
            if let Some(hit) = self.cache.get(&key) {
                debug!("query cache hit");
                if allow_prefetch {
                    self.maybe_prefetch(query, page, hit.total_pages);
                }
                return Ok(ServedPage {
                    mode: ServeMode::Cached,
                    page: hit,
                });
            }
        }

        let fetch = self.join_inflight(key, query, page, bypass);
        let result = fetch.clone().await;
        self.release_inflight(&key, &fetch);

        let page_data = result?;
        let mode = if page_data.stale {
            ServeMode::Fallback
        } else {
            ServeMode::Live
        };
        debug!(mode = %mode, total = page_data.total, "query served");

        if allow_prefetch && !bypass {
            self.maybe_prefetch(query, page, page_data.total_pages);
        }
        Ok(ServedPage {
            page: page_data,
            mode,
        })
    }

    /// Joins an identical in-flight query, or starts the fetch. At most
    /// one backing call runs per key; late callers share its outcome.
    fn join_inflight(
        &self,
        key: QueryKey,
        query: &EntityQuery,
        page: u32,
        bypass: bool,
    ) -> InflightFetch {
        let mut inflight = self.inflight.lock();
        if let Some(existing) = inflight.get(&key) {
            debug!("joining in-flight identical query");
            return existing.clone();
        }
        let fetch = self.make_fetch(key, query.clone(), page, bypass);
        inflight.insert(key, fetch.clone());
        fetch
    }

    /// Removes the in-flight entry if it still refers to this fetch. The
    /// pointer check keeps a finished flight from evicting a newer one
    /// started by another caller after completion.
    fn release_inflight(&self, key: &QueryKey, fetch: &InflightFetch) {
        let mut inflight = self.inflight.lock();
        let is_current = inflight
            .get(key)
            .is_some_and(|current| current.ptr_eq(fetch));
        if is_current {
            inflight.remove(key);
        }
    }

    /// Builds the shared fetch future: retry-wrapped backing call, cache
    /// insert on success, snapshot fallback on exhaustion.
    ///
    /// The cache insert lives inside the shared future so the result is
    /// kept even when every caller abandoned the query before it
    /// resolved.
    fn make_fetch(
        &self,
        key: QueryKey,
        query: EntityQuery,
        page: u32,
        bypass: bool,
    ) -> InflightFetch {
        let provider = Arc::clone(&self.provider);
        let snapshot = self.snapshot.clone();
        let cache = self.cache.clone();
        let retry = self.config.retry;
        let page_size = self.config.page_size;

        let fut = async move {
            match with_retry(retry, || provider.fetch_page(&query, page, page_size)).await {
                Ok(page_data) => {
                    if !bypass {
                        cache.put(key, page_data.clone());
                    }
                    Ok(page_data)
                }
                Err(err) => {
                    warn!(error = %err, "backing source exhausted, degrading to snapshot");
                    if snapshot.is_loaded() {
                        Ok(snapshot.fetch_page(&query, page, page_size))
                    } else {
                        Err(RetrievalError::Unavailable {
                            attempts: retry.max_attempts(),
                            message: err.to_string(),
                        })
                    }
                }
            }
        };

        let boxed: Pin<Box<dyn Future<Output = Result<EntityPage, RetrievalError>> + Send>> =
            Box::pin(fut);
        boxed.shared()
    }

    /// Warms page N+1 in the background after serving page N. A prefetch
    /// superseded by a new filter set simply completes and ages out of
    /// the cache; nothing cancels it.
    fn maybe_prefetch(&self, query: &EntityQuery, page: u32, total_pages: u32) {
        if !self.config.prefetch || page >= total_pages {
            return;
        }
        let service = self.clone();
        let query = query.clone();
        tokio::spawn(async move {
            let next = page + 1;
            let key = query.cache_key(next, service.config.page_size);
            if service.cache.get(&key).is_some() {
                return;
            }
            debug!(page = next, "prefetching next page");
            let fetch = service.join_inflight(key, &query, next, false);
            let result = fetch.clone().await;
            service.release_inflight(&key, &fetch);
            if let Err(e) = result {
                debug!(error = %e, page = next, "prefetch failed");
            }
        });
    }
}

impl<P: EntityProvider + 'static> std::fmt::Debug for RetrievalService<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalService")
            .field("cache", &self.cache)
            .field("snapshot", &self.snapshot)
            .field("inflight", &self.inflight.lock().len())
            .finish_non_exhaustive()
    }
}
