//! Entity store: row models, the store seam, and the in-memory row store.
//!
//! The scoring job writes through [`EntityStore`]; the retrieval service
//! only ever reads. Score writes are full overwrites — there is no
//! historical/append model, and both `write_score` and
//! `apply_risk_bands` are safe to re-run.

pub mod error;
pub mod memory;
pub mod model;

pub use error::StoreError;
pub use memory::MemoryEntityStore;
pub use model::{Document, Entity, ScoringCandidate};

use async_trait::async_trait;
use uuid::Uuid;

use crate::scoring::EntityScore;

/// Row-store seam between scoring, classification, and retrieval.
///
/// Object-safe so the pipeline and gateway can hold `Arc<dyn EntityStore>`
/// over whatever backing row store a deployment provides.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Entities with at least one mention — the scoring scope of a batch
    /// run.
    async fn scoring_candidates(&self) -> Result<Vec<ScoringCandidate>, StoreError>;

    /// The documents an entity has a mention row for.
    async fn documents_for(&self, entity_id: Uuid) -> Result<Vec<Document>, StoreError>;

    /// Idempotent upsert of a freshly computed score. Overwrites the
    /// previous score and mention count and stamps `last_scored_at`.
    async fn write_score(&self, entity_id: Uuid, score: &EntityScore) -> Result<(), StoreError>;

    /// Recomputes `risk_band` for every entity from its current
    /// `total_score`. Returns the number of rows visited.
    async fn apply_risk_bands(&self) -> Result<u64, StoreError>;

    /// Every entity row, for the retrieval read path and snapshot
    /// exports.
    async fn fetch_entities(&self) -> Result<Vec<Entity>, StoreError>;
}
