//! Query model and page envelope for the retrieval service.

use serde::{Deserialize, Serialize};

use crate::classify::RiskBand;
use crate::hashing::{QueryKey, hash_query_page};
use crate::store::Entity;

/// Weight of `mention_count` in the blended score sort.
pub const MENTION_SORT_WEIGHT: f64 = 0.3;

/// Weight of `total_score` in the blended score sort.
pub const SCORE_SORT_WEIGHT: f64 = 0.7;

/// Response header naming which path served a query.
pub const SOURCE_HEADER: &str = "x-dossier-source";

/// Sort dimension for entity queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    Name,
    Mentions,
    /// Blended metric `0.3 × mentions + 0.7 × total score`, so
    /// highly-mentioned entities stay visible even with a lower
    /// per-mention severity.
    #[default]
    Score,
    Risk,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Name => "name",
            SortBy::Mentions => "mentions",
            SortBy::Score => "score",
            SortBy::Risk => "risk",
        }
    }

    /// The order used when the caller doesn't pick one.
    pub fn default_order(&self) -> SortOrder {
        match self {
            SortBy::Name => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }
}

impl std::fmt::Display for SortBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "name" => Ok(SortBy::Name),
            "mentions" => Ok(SortBy::Mentions),
            "score" => Ok(SortBy::Score),
            "risk" => Ok(SortBy::Risk),
            other => Err(format!("unknown sort key: {other}")),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

/// Filter and sort parameters for one entity query.
///
/// All filters are conjunctive; empty membership lists mean "no
/// constraint". Score bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub risk_bands: Vec<RiskBand>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_score: Option<u32>,
    #[serde(default)]
    pub sort_by: SortBy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
}

impl EntityQuery {
    /// The order actually applied: the caller's, or the sort key's
    /// default.
    pub fn effective_order(&self) -> SortOrder {
        self.sort_order.unwrap_or_else(|| self.sort_by.default_order())
    }

    /// The trimmed free-text term, if one is set.
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Free-text searches are always recomputed: an active search
    /// session values freshness over latency.
    pub fn bypasses_cache(&self) -> bool {
        self.search_term().is_some()
    }

    /// Canonical byte form of the filters: membership lists sorted and
    /// deduplicated so equivalent queries share one cache key.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bands: Vec<&str> = self.risk_bands.iter().map(RiskBand::as_str).collect();
        bands.sort_unstable();
        bands.dedup();

        let mut tags: Vec<&str> = self.tags.iter().map(String::as_str).collect();
        tags.sort_unstable();
        tags.dedup();

        let value = serde_json::json!({
            "search": self.search_term(),
            "risk": bands,
            "tags": tags,
            "minScore": self.min_score,
            "maxScore": self.max_score,
            "sortBy": self.sort_by.as_str(),
            "sortOrder": self.effective_order().as_str(),
        });
        value.to_string().into_bytes()
    }

    /// Cache/de-duplication key for this query at a page position.
    pub fn cache_key(&self, page: u32, page_size: u32) -> QueryKey {
        hash_query_page(&self.canonical_bytes(), page, page_size)
    }
}

/// One page of query results.
///
/// The same envelope is returned live, from cache, and from the fallback
/// snapshot; `stale` is the only caller-visible difference, set when the
/// data came from the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityPage {
    pub data: Vec<Entity>,
    pub total: u64,
    pub page: u32,
    pub total_pages: u32,
    pub page_size: u32,
    #[serde(default)]
    pub stale: bool,
}

impl EntityPage {
    /// An empty page (used when a snapshot has no matching rows).
    pub fn empty(page: u32, page_size: u32) -> Self {
        Self {
            data: Vec::new(),
            total: 0,
            total_pages: 0,
            page,
            page_size,
            stale: false,
        }
    }

    pub fn has_next_page(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Which path produced a served page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeMode {
    /// Fresh from the backing source.
    Live,
    /// From the TTL query cache.
    Cached,
    /// From the local snapshot after the backing source was exhausted.
    Fallback,
}

impl ServeMode {
    /// Value for the [`SOURCE_HEADER`] response header.
    pub fn as_header_value(&self) -> &'static str {
        match self {
            ServeMode::Live => "LIVE",
            ServeMode::Cached => "CACHED",
            ServeMode::Fallback => "FALLBACK",
        }
    }

    /// Returns `true` when the data may be stale.
    pub fn is_degraded(&self) -> bool {
        matches!(self, ServeMode::Fallback)
    }
}

impl std::fmt::Display for ServeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_header_value())
    }
}

/// A page plus the path that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ServedPage {
    pub page: EntityPage,
    pub mode: ServeMode,
}
