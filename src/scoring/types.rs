use serde::{Deserialize, Serialize};

use crate::classify::RiskBand;

/// Aggregated scoring result for one entity in one batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityScore {
    /// Sum of tier weights over every keyword hit in every window, with
    /// no deduplication across windows.
    pub total_score: u32,
    /// Highest tier level with at least one hit; 0 when nothing matched.
    pub peak_tier: u8,
    /// Name occurrences found by the scanner across all mentioned
    /// documents (one per context window).
    pub mention_count: u32,
}

impl EntityScore {
    /// The all-zero score for entities with no occurrences.
    pub const ZERO: EntityScore = EntityScore {
        total_score: 0,
        peak_tier: 0,
        mention_count: 0,
    };

    /// The band this score classifies into.
    #[inline]
    pub fn band(&self) -> RiskBand {
        RiskBand::from_score(self.total_score)
    }
}

impl Default for EntityScore {
    fn default() -> Self {
        Self::ZERO
    }
}
