//! Row models for the entity store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::classify::RiskBand;

/// A named entity (person or organization) with its current risk signal.
///
/// `risk_band` is always derived from `total_score`; the store's
/// classification pass recomputes it and nothing else writes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub id: Uuid,
    pub full_name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub total_score: u32,
    #[serde(default)]
    pub peak_tier: u8,
    #[serde(default)]
    pub risk_band: RiskBand,
    #[serde(default)]
    pub mention_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_scored_at: Option<DateTime<Utc>>,
}

impl Entity {
    /// A fresh, unscored entity.
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            full_name: full_name.into(),
            tags: Vec::new(),
            total_score: 0,
            peak_tier: 0,
            risk_band: RiskBand::Low,
            mention_count: 0,
            last_scored_at: None,
        }
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }
}

/// A scanned document. Content may be empty or absent; scoring treats
/// both as an empty body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Document {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            content: Some(content.into()),
        }
    }

    pub fn without_content(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            content: None,
        }
    }

    /// Document body, with absent content read as empty.
    pub fn body(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}

/// The slice of an entity the scoring job needs up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringCandidate {
    pub entity_id: Uuid,
    pub full_name: String,
}
