use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
/// Errors that abort a whole batch run.
///
/// Per-entity failures are not represented here — they are logged and
/// skipped inside the run.
pub enum PipelineError {
    /// The store failed on a batch-wide operation (candidate listing or
    /// the classification pass).
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
