use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
/// Errors raised while loading or validating a severity dictionary.
pub enum DictionaryError {
    /// Dictionary file could not be read.
    #[error("failed to read dictionary at '{path}': {message}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Dictionary file was not valid JSON.
    #[error("failed to parse dictionary at '{path}': {message}")]
    Parse {
        /// File path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// A valid dictionary has exactly five tiers.
    #[error("expected {expected} tiers, got {actual}")]
    WrongTierCount {
        /// Required tier count.
        expected: usize,
        /// Actual tier count.
        actual: usize,
    },

    /// Levels must be exactly 1..=5 with no gaps or duplicates.
    #[error("invalid tier level: expected {expected}, got {actual}")]
    InvalidLevel {
        /// Level required at this position.
        expected: u8,
        /// Level found.
        actual: u8,
    },

    /// Tier weights must be positive.
    #[error("tier {level} has zero weight")]
    ZeroWeight {
        /// Offending tier level.
        level: u8,
    },

    /// Every tier needs at least one keyword.
    #[error("tier {level} has no keywords")]
    EmptyTier {
        /// Offending tier level.
        level: u8,
    },

    /// Keywords must be non-blank.
    #[error("tier {level} contains a blank keyword")]
    BlankKeyword {
        /// Offending tier level.
        level: u8,
    },
}
