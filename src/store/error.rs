use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
/// Errors returned by entity store operations.
pub enum StoreError {
    /// No entity row with this id.
    #[error("entity not found: {entity_id}")]
    EntityNotFound {
        /// Missing entity id.
        entity_id: Uuid,
    },

    /// The backing row store failed.
    #[error("store backend error: {message}")]
    Backend {
        /// Error message.
        message: String,
    },
}
