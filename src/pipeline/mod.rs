//! Batch scoring pipeline: the operator-triggered job that rescores every
//! mentioned entity and then reclassifies the whole table.
//!
//! Phase 1 scores entities in parallel worker tasks bounded by a
//! semaphore; entities are scoring-independent, so the only shared write
//! is the single-row score upsert. Phase 2 (classification) runs strictly
//! after every score write has completed.

pub mod error;


pub use error::PipelineError;

use std::sync::Arc;
use std::time::Instant;

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::{info, instrument, warn};

use crate::dictionary::SeverityDictionary;
use crate::scoring::ScoreAggregator;
use crate::store::EntityStore;

/// Default bound on concurrent entity-scoring tasks.
pub const DEFAULT_SCORING_WORKERS: usize = 8;

/// Outcome of one batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineReport {
    /// Entities scored and written.
    pub scored: u64,
    /// Entities skipped after a per-entity failure.
    pub skipped: u64,
    /// Entities visited by the classification pass.
    pub classified: u64,
    /// Wall-clock duration of the run.
    pub elapsed_ms: u64,
}

/// The two-phase scoring batch job.
pub struct ScoringPipeline {
    store: Arc<dyn EntityStore>,
    aggregator: Arc<ScoreAggregator>,
    workers: usize,
}

impl ScoringPipeline {
    pub fn new(
        store: Arc<dyn EntityStore>,
        dictionary: Arc<SeverityDictionary>,
        workers: usize,
    ) -> Self {
        Self {
            store,
            aggregator: Arc::new(ScoreAggregator::new(dictionary)),
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Runs a full batch: score every entity with ≥1 mention, then
    /// reclassify all entities.
    ///
    /// A failure on one entity (missing row, store write error) is
    /// logged and skipped — it never aborts the batch. Re-running with
    /// unchanged documents and mentions produces identical scores.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<PipelineReport, PipelineError> {
        let started = Instant::now();
        let candidates = self.store.scoring_candidates().await?;
        info!(
            candidates = candidates.len(),
            workers = self.workers,
            "scoring batch started"
        );

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let tasks: Vec<_> = candidates
            .into_iter()
            .map(|candidate| {
                let store = Arc::clone(&self.store);
                let aggregator = Arc::clone(&self.aggregator);
                let semaphore = Arc::clone(&semaphore);
                tokio::spawn(async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .expect("scoring semaphore never closed");

                    let documents = match store.documents_for(candidate.entity_id).await {
                        Ok(docs) => docs,
                        Err(e) => {
                            warn!(entity_id = %candidate.entity_id, error = %e, "skipping entity: document read failed");
                            return false;
                        }
                    };

                    let score = aggregator.score_entity(
                        candidate.entity_id,
                        &candidate.full_name,
                        &documents,
                    );

                    match store.write_score(candidate.entity_id, &score).await {
                        Ok(()) => true,
                        Err(e) => {
                            warn!(entity_id = %candidate.entity_id, error = %e, "skipping entity: score write failed");
                            false
                        }
                    }
                })
            })
            .collect();

        let mut scored = 0u64;
        let mut skipped = 0u64;
        for result in join_all(tasks).await {
            match result {
                Ok(true) => scored += 1,
                Ok(false) => skipped += 1,
                Err(e) => {
                    warn!(error = %e, "scoring task panicked, entity skipped");
                    skipped += 1;
                }
            }
        }

        // Barrier: every score write above has completed before any band
        // is recomputed.
        let classified = self.store.apply_risk_bands().await?;

        let report = PipelineReport {
            scored,
            skipped,
            classified,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        info!(
            scored = report.scored,
            skipped = report.skipped,
            classified = report.classified,
            elapsed_ms = report.elapsed_ms,
            "scoring batch finished"
        );
        Ok(report)
    }
}

impl std::fmt::Debug for ScoringPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoringPipeline")
            .field("workers", &self.workers)
            .finish_non_exhaustive()
    }
}
