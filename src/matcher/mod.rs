//! Tier matcher: reports every (tier, keyword) hit inside a context window.
//!
//! Matching is a case-insensitive substring test per keyword — no
//! tokenizer, no word boundaries. Partial-word matches ("allegations"
//! hitting "allegation") are accepted in exchange for a single fast scan
//! per keyword; do not tighten this to word-boundary matching without
//! flagging the behavior change to consumers of the scores.

use std::sync::Arc;

use crate::dictionary::SeverityDictionary;

/// One keyword hit inside a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierHit {
    pub level: u8,
    pub weight: u32,
    pub keyword: String,
}

/// Matches context windows against a severity dictionary.
///
/// The lowercase keyword table is flattened at construction so the hot
/// path is a single pass over `(level, weight, keyword)` triples.
#[derive(Debug, Clone)]
pub struct TierMatcher {
    dictionary: Arc<SeverityDictionary>,
    table: Vec<(u8, u32, String)>,
}

impl TierMatcher {
    pub fn new(dictionary: Arc<SeverityDictionary>) -> Self {
        let table = dictionary
            .tiers()
            .iter()
            .flat_map(|tier| {
                tier.keywords
                    .iter()
                    .map(|kw| (tier.level, tier.weight, kw.clone()))
            })
            .collect();
        Self { dictionary, table }
    }

    pub fn dictionary(&self) -> &SeverityDictionary {
        &self.dictionary
    }

    /// Returns every hit in `window_text`, across all tiers.
    ///
    /// Tiers are checked independently — a window may hit multiple
    /// keywords in multiple tiers, and every hit is reported.
    pub fn match_window(&self, window_text: &str) -> Vec<TierHit> {
        if window_text.is_empty() {
            return Vec::new();
        }
        let haystack = window_text.to_lowercase();

        self.table
            .iter()
            .filter(|(_, _, keyword)| haystack.contains(keyword.as_str()))
            .map(|(level, weight, keyword)| TierHit {
                level: *level,
                weight: *weight,
                keyword: keyword.clone(),
            })
            .collect()
    }
}
