//! Fallback snapshot: a flat export of the entity set kept locally so the
//! service can keep answering when the backing source is gone.
//!
//! Loaded once at service start; may be refreshed from a live store
//! export while running. Pages served from here are marked stale.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::info;

use crate::store::Entity;

use super::error::SnapshotError;
use super::query::filter_sort_paginate;
use super::types::{EntityPage, EntityQuery};

#[derive(Default)]
struct SnapshotInner {
    entities: RwLock<Vec<Entity>>,
    loaded: AtomicBool,
    loaded_at: RwLock<Option<DateTime<Utc>>>,
}

/// Shared handle to the fallback entity snapshot.
#[derive(Clone, Default)]
pub struct SnapshotStore {
    inner: Arc<SnapshotInner>,
}

impl SnapshotStore {
    /// An empty, unloaded snapshot. Until a load succeeds the service
    /// has nothing to degrade to.
    pub fn new() -> Self {
        Self::default()
    }

    /// A pre-loaded snapshot (tests, embedded exports).
    pub fn from_entities(entities: Vec<Entity>) -> Self {
        let store = Self::default();
        store.refresh(entities);
        store
    }

    /// Loads the JSON entity export at `path`, replacing any previous
    /// contents. Returns the number of entities loaded.
    pub async fn load_from_path(&self, path: &Path) -> Result<usize, SnapshotError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| SnapshotError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let entities: Vec<Entity> =
            serde_json::from_slice(&bytes).map_err(|e| SnapshotError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let count = entities.len();
        self.refresh(entities);
        info!(path = %path.display(), entities = count, "fallback snapshot loaded");
        Ok(count)
    }

    /// Replaces the snapshot contents and marks it loaded.
    pub fn refresh(&self, entities: Vec<Entity>) {
        *self.inner.entities.write() = entities;
        *self.inner.loaded_at.write() = Some(Utc::now());
        self.inner.loaded.store(true, Ordering::Release);
    }

    /// `true` once any load or refresh has succeeded.
    pub fn is_loaded(&self) -> bool {
        self.inner.loaded.load(Ordering::Acquire)
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        *self.inner.loaded_at.read()
    }

    pub fn len(&self) -> usize {
        self.inner.entities.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entities.read().is_empty()
    }

    /// Answers a query in-process from the snapshot. The page is marked
    /// stale: successful, but degraded.
    pub fn fetch_page(&self, query: &EntityQuery, page: u32, page_size: u32) -> EntityPage {
        let entities = self.inner.entities.read();
        let mut result = filter_sort_paginate(&entities, query, page, page_size);
        result.stale = true;
        result
    }
}

impl std::fmt::Debug for SnapshotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotStore")
            .field("loaded", &self.is_loaded())
            .field("entities", &self.len())
            .finish()
    }
}

/// The snapshot is itself a (never-failing) provider, so it can stand in
/// anywhere the live backing source is expected.
impl super::source::EntityProvider for SnapshotStore {
    async fn is_ready(&self) -> bool {
        self.is_loaded()
    }

    async fn fetch_page(
        &self,
        query: &EntityQuery,
        page: u32,
        page_size: u32,
    ) -> Result<EntityPage, super::error::ProviderError> {
        Ok(SnapshotStore::fetch_page(self, query, page, page_size))
    }
}
