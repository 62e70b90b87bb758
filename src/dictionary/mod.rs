//! Severity dictionary: five ordered keyword tiers with score weights.
//!
//! The dictionary is immutable configuration. Level 5 is the most severe.
//! Keywords are stored lowercased; matching is substring-based and
//! case-insensitive (see [`crate::matcher`]).

pub mod error;

pub use error::DictionaryError;

use serde::{Deserialize, Serialize};

/// Number of severity tiers in a valid dictionary.
pub const TIER_COUNT: usize = 5;

/// One severity tier: a level in `1..=5`, a keyword set, and the score
/// weight every keyword hit in this tier contributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeverityTier {
    pub level: u8,
    pub weight: u32,
    pub keywords: Vec<String>,
}

impl SeverityTier {
    pub fn new(level: u8, weight: u32, keywords: &[&str]) -> Self {
        Self {
            level,
            weight,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }
}

/// The full five-tier dictionary, ordered by ascending level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeverityDictionary {
    tiers: Vec<SeverityTier>,
}

impl SeverityDictionary {
    /// Builds a dictionary from explicit tiers and validates it.
    pub fn new(mut tiers: Vec<SeverityTier>) -> Result<Self, DictionaryError> {
        tiers.sort_by_key(|t| t.level);
        for tier in &mut tiers {
            for kw in &mut tier.keywords {
                *kw = kw.to_lowercase();
            }
        }
        let dict = Self { tiers };
        dict.validate()?;
        Ok(dict)
    }

    /// Loads a dictionary from a JSON file (an array of tiers).
    pub fn from_path(path: &std::path::Path) -> Result<Self, DictionaryError> {
        let raw = std::fs::read_to_string(path).map_err(|e| DictionaryError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let tiers: Vec<SeverityTier> =
            serde_json::from_str(&raw).map_err(|e| DictionaryError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Self::new(tiers)
    }

    /// Checks level range, uniqueness, ordering, weights, and keywords.
    pub fn validate(&self) -> Result<(), DictionaryError> {
        if self.tiers.len() != TIER_COUNT {
            return Err(DictionaryError::WrongTierCount {
                expected: TIER_COUNT,
                actual: self.tiers.len(),
            });
        }

        for (idx, tier) in self.tiers.iter().enumerate() {
            let expected_level = (idx + 1) as u8;
            if tier.level != expected_level {
                return Err(DictionaryError::InvalidLevel {
                    expected: expected_level,
                    actual: tier.level,
                });
            }
            if tier.weight == 0 {
                return Err(DictionaryError::ZeroWeight { level: tier.level });
            }
            if tier.keywords.is_empty() {
                return Err(DictionaryError::EmptyTier { level: tier.level });
            }
            for kw in &tier.keywords {
                if kw.trim().is_empty() {
                    return Err(DictionaryError::BlankKeyword { level: tier.level });
                }
            }
        }

        Ok(())
    }

    /// Tiers in ascending level order.
    #[inline]
    pub fn tiers(&self) -> &[SeverityTier] {
        &self.tiers
    }

    /// Total keyword count across all tiers.
    pub fn keyword_count(&self) -> usize {
        self.tiers.iter().map(|t| t.keywords.len()).sum()
    }
}

impl Default for SeverityDictionary {
    /// Built-in dictionary for document-archive screening.
    fn default() -> Self {
        Self {
            tiers: vec![
                SeverityTier::new(1, 5, &["mentioned", "contact", "travel", "correspondence"]),
                SeverityTier::new(2, 10, &["associate", "meeting", "payment", "transfer"]),
                SeverityTier::new(
                    3,
                    25,
                    &["investigation", "testimony", "deposition", "interview"],
                ),
                SeverityTier::new(4, 50, &["allegation", "indictment", "lawsuit", "subpoena"]),
                SeverityTier::new(5, 100, &["abuse", "victim", "trafficking", "assault"]),
            ],
        }
    }
}
