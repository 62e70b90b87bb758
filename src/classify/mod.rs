//! Risk band classification.
//!
//! A pure mapping from an entity's total score to a coarse band. The
//! thresholds are fixed constants so they can change without touching any
//! matching logic; keep the retrieval sort/filter code reading the same
//! constants.

use serde::{Deserialize, Serialize};

/// Scores at or above this are classified [`RiskBand::High`].
pub const HIGH_RISK_THRESHOLD: u32 = 50;

/// Scores at or above this (and below [`HIGH_RISK_THRESHOLD`]) are
/// classified [`RiskBand::Medium`].
pub const MEDIUM_RISK_THRESHOLD: u32 = 10;

/// Coarse risk classification derived from an entity's total score.
///
/// Never set independently of the score; recompute via [`RiskBand::from_score`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskBand {
    High,
    Medium,
    Low,
}

impl RiskBand {
    /// Classifies a total score against the fixed thresholds.
    #[inline]
    pub fn from_score(total_score: u32) -> Self {
        if total_score >= HIGH_RISK_THRESHOLD {
            RiskBand::High
        } else if total_score >= MEDIUM_RISK_THRESHOLD {
            RiskBand::Medium
        } else {
            RiskBand::Low
        }
    }

    /// Classifies an optional score; a missing score counts as zero.
    #[inline]
    pub fn from_optional_score(total_score: Option<u32>) -> Self {
        Self::from_score(total_score.unwrap_or(0))
    }

    /// Wire/display form of the band.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskBand::High => "HIGH",
            RiskBand::Medium => "MEDIUM",
            RiskBand::Low => "LOW",
        }
    }

    /// Ordering rank for sorting: higher band sorts as greater.
    #[inline]
    pub fn rank(&self) -> u8 {
        match self {
            RiskBand::High => 2,
            RiskBand::Medium => 1,
            RiskBand::Low => 0,
        }
    }
}

impl Default for RiskBand {
    fn default() -> Self {
        RiskBand::Low
    }
}

impl std::fmt::Display for RiskBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RiskBand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "high" => Ok(RiskBand::High),
            "medium" => Ok(RiskBand::Medium),
            "low" => Ok(RiskBand::Low),
            other => Err(format!("unknown risk band: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_boundaries() {
        assert_eq!(RiskBand::from_score(0), RiskBand::Low);
        assert_eq!(RiskBand::from_score(9), RiskBand::Low);
        assert_eq!(RiskBand::from_score(10), RiskBand::Medium);
        assert_eq!(RiskBand::from_score(49), RiskBand::Medium);
        assert_eq!(RiskBand::from_score(50), RiskBand::High);
        assert_eq!(RiskBand::from_score(u32::MAX), RiskBand::High);
    }

    #[test]
    fn test_missing_score_is_low() {
        assert_eq!(RiskBand::from_optional_score(None), RiskBand::Low);
        assert_eq!(RiskBand::from_optional_score(Some(50)), RiskBand::High);
    }

    #[test]
    fn test_rank_ordering() {
        assert!(RiskBand::High.rank() > RiskBand::Medium.rank());
        assert!(RiskBand::Medium.rank() > RiskBand::Low.rank());
    }

    #[test]
    fn test_display_and_parse() {
        assert_eq!(RiskBand::High.to_string(), "HIGH");
        assert_eq!("medium".parse::<RiskBand>().unwrap(), RiskBand::Medium);
        assert_eq!("LOW".parse::<RiskBand>().unwrap(), RiskBand::Low);
        assert!("banana".parse::<RiskBand>().is_err());
    }

    #[test]
    fn test_wire_form() {
        let json = serde_json::to_string(&RiskBand::High).unwrap();
        assert_eq!(json, "\"HIGH\"");
        let band: RiskBand = serde_json::from_str("\"MEDIUM\"").unwrap();
        assert_eq!(band, RiskBand::Medium);
    }
}
