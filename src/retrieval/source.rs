//! Backing data sources for the retrieval service.
//!
//! [`EntityProvider`] is the seam the retry decorator wraps. Production
//! deployments point at a REST backing source ([`HttpEntityProvider`]) or
//! read the score store directly ([`StoreEntityProvider`]); tests script
//! outages with [`MockEntityProvider`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::store::EntityStore;

use super::error::ProviderError;
use super::query::filter_sort_paginate;
use super::types::{EntityPage, EntityQuery};

/// A source of entity pages.
pub trait EntityProvider: Send + Sync {
    /// Returns `true` if the source is reachable.
    fn is_ready(&self) -> impl Future<Output = bool> + Send;

    /// Fetches one page for a query. A failure here is a single-call
    /// failure; retry policy lives with the caller.
    fn fetch_page(
        &self,
        query: &EntityQuery,
        page: u32,
        page_size: u32,
    ) -> impl Future<Output = Result<EntityPage, ProviderError>> + Send;
}

/// REST client for a backing entity API.
#[derive(Debug, Clone)]
pub struct HttpEntityProvider {
    client: reqwest::Client,
    base_url: String,
}

impl HttpEntityProvider {
    /// Creates a client for `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Transport {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn query_params(query: &EntityQuery, page: u32, page_size: u32) -> Vec<(&'static str, String)> {
        let mut params: Vec<(&'static str, String)> = Vec::new();
        if let Some(term) = query.search_term() {
            params.push(("search", term.to_string()));
        }
        if !query.risk_bands.is_empty() {
            let bands: Vec<&str> = query.risk_bands.iter().map(|b| b.as_str()).collect();
            params.push(("risk", bands.join(",")));
        }
        if !query.tags.is_empty() {
            params.push(("tags", query.tags.join(",")));
        }
        if let Some(min) = query.min_score {
            params.push(("minScore", min.to_string()));
        }
        if let Some(max) = query.max_score {
            params.push(("maxScore", max.to_string()));
        }
        params.push(("sortBy", query.sort_by.as_str().to_string()));
        params.push(("sortOrder", query.effective_order().as_str().to_string()));
        params.push(("page", page.to_string()));
        params.push(("pageSize", page_size.to_string()));
        params
    }
}

impl EntityProvider for HttpEntityProvider {
    async fn is_ready(&self) -> bool {
        let url = format!("{}/healthz", self.base_url);
        match self.client.get(&url).send().await {
            Ok(res) => res.status().is_success(),
            Err(_) => false,
        }
    }

    async fn fetch_page(
        &self,
        query: &EntityQuery,
        page: u32,
        page_size: u32,
    ) -> Result<EntityPage, ProviderError> {
        let url = format!("{}/entities", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&Self::query_params(query, page, page_size))
            .send()
            .await
            .map_err(|e| ProviderError::Transport {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
            });
        }

        response
            .json::<EntityPage>()
            .await
            .map_err(|e| ProviderError::Decode {
                message: e.to_string(),
            })
    }
}

/// Provider that reads the score store directly — the read path for
/// single-binary deployments where store and service share a process.
#[derive(Clone)]
pub struct StoreEntityProvider {
    store: Arc<dyn EntityStore>,
}

impl StoreEntityProvider {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }
}

impl std::fmt::Debug for StoreEntityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreEntityProvider").finish_non_exhaustive()
    }
}

impl EntityProvider for StoreEntityProvider {
    async fn is_ready(&self) -> bool {
        self.store.fetch_entities().await.is_ok()
    }

    async fn fetch_page(
        &self,
        query: &EntityQuery,
        page: u32,
        page_size: u32,
    ) -> Result<EntityPage, ProviderError> {
        let entities = self
            .store
            .fetch_entities()
            .await
            .map_err(|e| ProviderError::Transport {
                message: e.to_string(),
            })?;
        Ok(filter_sort_paginate(&entities, query, page, page_size))
    }
}

/// Scriptable provider for tests: serves from an in-memory entity list,
/// fails on demand, counts calls, and can add artificial latency.
#[cfg(any(test, feature = "mock"))]
#[derive(Clone, Default)]
pub struct MockEntityProvider {
    inner: Arc<MockInner>,
}

#[cfg(any(test, feature = "mock"))]
#[derive(Default)]
struct MockInner {
    entities: parking_lot::RwLock<Vec<crate::store::Entity>>,
    fail_remaining: std::sync::atomic::AtomicU32,
    fail_always: std::sync::atomic::AtomicBool,
    latency_ms: std::sync::atomic::AtomicU64,
    calls: std::sync::atomic::AtomicU32,
}

#[cfg(any(test, feature = "mock"))]
impl MockEntityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entities(entities: Vec<crate::store::Entity>) -> Self {
        let mock = Self::default();
        mock.set_entities(entities);
        mock
    }

    pub fn set_entities(&self, entities: Vec<crate::store::Entity>) {
        *self.inner.entities.write() = entities;
    }

    /// The next `n` calls fail with a transport error.
    pub fn fail_times(&self, n: u32) {
        self.inner
            .fail_remaining
            .store(n, std::sync::atomic::Ordering::SeqCst);
    }

    /// Every call fails until switched off.
    pub fn fail_always(&self, on: bool) {
        self.inner
            .fail_always
            .store(on, std::sync::atomic::Ordering::SeqCst);
    }

    /// Adds artificial latency per call (for de-duplication tests).
    pub fn set_latency(&self, latency: Duration) {
        self.inner
            .latency_ms
            .store(latency.as_millis() as u64, std::sync::atomic::Ordering::SeqCst);
    }

    /// Backing calls made so far.
    pub fn calls(&self) -> u32 {
        self.inner.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "mock"))]
impl EntityProvider for MockEntityProvider {
    async fn is_ready(&self) -> bool {
        !self.inner.fail_always.load(std::sync::atomic::Ordering::SeqCst)
    }

    async fn fetch_page(
        &self,
        query: &EntityQuery,
        page: u32,
        page_size: u32,
    ) -> Result<EntityPage, ProviderError> {
        use std::sync::atomic::Ordering;

        self.inner.calls.fetch_add(1, Ordering::SeqCst);

        let latency = self.inner.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        if self.inner.fail_always.load(Ordering::SeqCst) {
            return Err(ProviderError::Transport {
                message: "simulated outage".to_string(),
            });
        }
        let failing = self
            .inner
            .fail_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(ProviderError::Transport {
                message: "simulated outage".to_string(),
            });
        }

        let entities = self.inner.entities.read();
        Ok(filter_sort_paginate(&entities, query, page, page_size))
    }
}
