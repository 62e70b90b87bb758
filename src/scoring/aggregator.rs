use std::sync::Arc;

use tracing::{debug, instrument};
use uuid::Uuid;

use crate::dictionary::SeverityDictionary;
use crate::matcher::TierMatcher;
use crate::scanner::OccurrenceScanner;
use crate::store::model::Document;

use super::types::EntityScore;

/// Aggregates tier hits across every mentioned document into one
/// [`EntityScore`].
///
/// Scoring one entity reads nothing but its own name and documents, so
/// aggregators can run for many entities in parallel without shared
/// state; the pipeline owns the only write (the store upsert).
#[derive(Debug, Clone)]
pub struct ScoreAggregator {
    scanner: OccurrenceScanner,
    matcher: TierMatcher,
}

impl ScoreAggregator {
    pub fn new(dictionary: Arc<SeverityDictionary>) -> Self {
        Self {
            scanner: OccurrenceScanner::new(),
            matcher: TierMatcher::new(dictionary),
        }
    }

    /// Overrides the scanner (custom window radius).
    pub fn with_scanner(mut self, scanner: OccurrenceScanner) -> Self {
        self.scanner = scanner;
        self
    }

    pub fn matcher(&self) -> &TierMatcher {
        &self.matcher
    }

    /// Scores one entity over its mentioned documents.
    ///
    /// Documents where the name never occurs contribute nothing; an
    /// entity with zero windows scores `(0, 0)`. The same keyword hit in
    /// two overlapping windows counts twice.
    #[instrument(skip(self, documents), fields(%entity_id, documents = documents.len()))]
    pub fn score_entity(
        &self,
        entity_id: Uuid,
        full_name: &str,
        documents: &[Document],
    ) -> EntityScore {
        let mut total_score: u32 = 0;
        let mut peak_tier: u8 = 0;
        let mut mention_count: u32 = 0;

        for document in documents {
            let windows = self
                .scanner
                .scan(entity_id, document.id, full_name, document.body());
            mention_count += windows.len() as u32;

            for window in &windows {
                for hit in self.matcher.match_window(&window.text) {
                    total_score = total_score.saturating_add(hit.weight);
                    peak_tier = peak_tier.max(hit.level);
                }
            }
        }

        debug!(total_score, peak_tier, mention_count, "entity scored");

        EntityScore {
            total_score,
            peak_tier,
            mention_count,
        }
    }
}
