//! In-memory row store over the assumed existing key-value/row backend.
//!
//! Rows live in `parking_lot`-guarded maps. Ingestion (out of scope for
//! scoring) is modeled by the seed helpers, which tests and the server
//! binary use to populate entities, documents, and mention rows.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::classify::RiskBand;
use crate::scoring::EntityScore;

use super::error::StoreError;
use super::model::{Document, Entity, ScoringCandidate};

#[derive(Default)]
struct Rows {
    entities: HashMap<Uuid, Entity>,
    documents: HashMap<Uuid, Document>,
    /// entity id → mentioned document ids, in insertion order.
    mentions: HashMap<Uuid, Vec<Uuid>>,
}

/// Concurrency-safe in-memory [`EntityStore`](super::EntityStore).
#[derive(Default)]
pub struct MemoryEntityStore {
    rows: RwLock<Rows>,
}

impl MemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts (or replaces) an entity row and returns its id.
    pub fn insert_entity(&self, entity: Entity) -> Uuid {
        let id = entity.id;
        self.rows.write().entities.insert(id, entity);
        id
    }

    /// Inserts (or replaces) a document row and returns its id.
    pub fn insert_document(&self, document: Document) -> Uuid {
        let id = document.id;
        self.rows.write().documents.insert(id, document);
        id
    }

    /// Associates an entity with a document. Duplicate links are kept
    /// once.
    pub fn link_mention(&self, entity_id: Uuid, document_id: Uuid) {
        let mut rows = self.rows.write();
        let docs = rows.mentions.entry(entity_id).or_default();
        if !docs.contains(&document_id) {
            docs.push(document_id);
        }
    }

    pub fn entity(&self, entity_id: Uuid) -> Option<Entity> {
        self.rows.read().entities.get(&entity_id).cloned()
    }

    pub fn entity_count(&self) -> usize {
        self.rows.read().entities.len()
    }
}

impl std::fmt::Debug for MemoryEntityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rows = self.rows.read();
        f.debug_struct("MemoryEntityStore")
            .field("entities", &rows.entities.len())
            .field("documents", &rows.documents.len())
            .field("mentions", &rows.mentions.len())
            .finish()
    }
}

#[async_trait]
impl super::EntityStore for MemoryEntityStore {
    async fn scoring_candidates(&self) -> Result<Vec<ScoringCandidate>, StoreError> {
        let rows = self.rows.read();
        let mut candidates: Vec<ScoringCandidate> = rows
            .mentions
            .iter()
            .filter(|(_, docs)| !docs.is_empty())
            .filter_map(|(entity_id, _)| rows.entities.get(entity_id))
            .map(|entity| ScoringCandidate {
                entity_id: entity.id,
                full_name: entity.full_name.clone(),
            })
            .collect();
        // Stable batch order keeps runs comparable in logs.
        candidates.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));
        Ok(candidates)
    }

    async fn documents_for(&self, entity_id: Uuid) -> Result<Vec<Document>, StoreError> {
        let rows = self.rows.read();
        if !rows.entities.contains_key(&entity_id) {
            return Err(StoreError::EntityNotFound { entity_id });
        }
        let docs = rows
            .mentions
            .get(&entity_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| rows.documents.get(id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(docs)
    }

    async fn write_score(&self, entity_id: Uuid, score: &EntityScore) -> Result<(), StoreError> {
        let mut rows = self.rows.write();
        let entity = rows
            .entities
            .get_mut(&entity_id)
            .ok_or(StoreError::EntityNotFound { entity_id })?;

        entity.total_score = score.total_score;
        entity.peak_tier = score.peak_tier;
        entity.mention_count = score.mention_count;
        entity.last_scored_at = Some(Utc::now());
        Ok(())
    }

    async fn apply_risk_bands(&self) -> Result<u64, StoreError> {
        let mut rows = self.rows.write();
        let mut visited = 0u64;
        for entity in rows.entities.values_mut() {
            entity.risk_band = RiskBand::from_score(entity.total_score);
            visited += 1;
        }
        Ok(visited)
    }

    async fn fetch_entities(&self) -> Result<Vec<Entity>, StoreError> {
        Ok(self.rows.read().entities.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::EntityStore;

    fn seeded() -> (MemoryEntityStore, Uuid, Uuid) {
        let store = MemoryEntityStore::new();
        let entity_id = store.insert_entity(Entity::new("Jane Doe"));
        let doc_id = store.insert_document(Document::new("memo", "Jane Doe attended"));
        store.link_mention(entity_id, doc_id);
        (store, entity_id, doc_id)
    }

    #[tokio::test]
    async fn test_scoring_candidates_require_a_mention() {
        let (store, entity_id, _) = seeded();
        store.insert_entity(Entity::new("Unmentioned Person"));

        let candidates = store.scoring_candidates().await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].entity_id, entity_id);
    }

    #[tokio::test]
    async fn test_documents_for_unknown_entity_errors() {
        let (store, _, _) = seeded();
        let err = store.documents_for(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, StoreError::EntityNotFound { .. }));
    }

    #[tokio::test]
    async fn test_duplicate_mention_links_kept_once() {
        let (store, entity_id, doc_id) = seeded();
        store.link_mention(entity_id, doc_id);
        store.link_mention(entity_id, doc_id);

        let docs = store.documents_for(entity_id).await.unwrap();
        assert_eq!(docs.len(), 1);
    }

    #[tokio::test]
    async fn test_write_score_is_a_full_overwrite() {
        let (store, entity_id, _) = seeded();

        let first = EntityScore {
            total_score: 120,
            peak_tier: 5,
            mention_count: 3,
        };
        store.write_score(entity_id, &first).await.unwrap();

        let second = EntityScore {
            total_score: 10,
            peak_tier: 2,
            mention_count: 1,
        };
        store.write_score(entity_id, &second).await.unwrap();

        let entity = store.entity(entity_id).unwrap();
        assert_eq!(entity.total_score, 10);
        assert_eq!(entity.peak_tier, 2);
        assert_eq!(entity.mention_count, 1);
        assert!(entity.last_scored_at.is_some());
    }

    #[tokio::test]
    async fn test_write_score_unknown_entity_errors() {
        let (store, _, _) = seeded();
        let err = store
            .write_score(Uuid::new_v4(), &EntityScore::ZERO)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::EntityNotFound { .. }));
    }

    #[tokio::test]
    async fn test_apply_risk_bands_covers_every_entity() {
        let (store, scored_id, _) = seeded();
        let unscored_id = store.insert_entity(Entity::new("Low Person"));

        store
            .write_score(
                scored_id,
                &EntityScore {
                    total_score: 75,
                    peak_tier: 5,
                    mention_count: 2,
                },
            )
            .await
            .unwrap();

        let visited = store.apply_risk_bands().await.unwrap();
        assert_eq!(visited, 2);

        assert_eq!(store.entity(scored_id).unwrap().risk_band, RiskBand::High);
        assert_eq!(store.entity(unscored_id).unwrap().risk_band, RiskBand::Low);
    }

    #[tokio::test]
    async fn test_apply_risk_bands_is_rerunnable() {
        let (store, entity_id, _) = seeded();
        store
            .write_score(
                entity_id,
                &EntityScore {
                    total_score: 25,
                    peak_tier: 3,
                    mention_count: 1,
                },
            )
            .await
            .unwrap();

        store.apply_risk_bands().await.unwrap();
        store.apply_risk_bands().await.unwrap();
        assert_eq!(
            store.entity(entity_id).unwrap().risk_band,
            RiskBand::Medium
        );
    }
}
