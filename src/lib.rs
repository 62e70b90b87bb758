//! Dossier library crate (used by the server binary and integration tests).
//!
//! # Public API Surface
//!
//! The exports are organized by module:
//!
//! ## Scoring Engine
//! - [`SeverityDictionary`], [`SeverityTier`] - Tiered keyword configuration
//! - [`OccurrenceScanner`], [`ContextWindow`] - Name occurrence scanning
//! - [`TierMatcher`], [`TierHit`] - Keyword matching inside windows
//! - [`ScoreAggregator`], [`EntityScore`] - Per-entity aggregation
//! - [`RiskBand`] with [`HIGH_RISK_THRESHOLD`] / [`MEDIUM_RISK_THRESHOLD`]
//! - [`ScoringPipeline`], [`PipelineReport`] - The batch job
//!
//! ## Store
//! - [`Entity`], [`Document`] - Row models
//! - [`EntityStore`] - Store seam; [`MemoryEntityStore`] - In-memory rows
//!
//! ## Retrieval
//! - [`RetrievalService`], [`RetrievalConfig`] - The cached read path
//! - [`EntityQuery`], [`EntityPage`], [`ServedPage`], [`ServeMode`]
//! - [`QueryCache`], [`RetryPolicy`], [`SnapshotStore`]
//! - [`EntityProvider`] with [`HttpEntityProvider`] / [`StoreEntityProvider`]
//!
//! ## Configuration
//! - [`Config`], [`ConfigError`] - `DOSSIER_*` environment configuration
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod classify;
pub mod config;
pub mod dictionary;
pub mod gateway;
pub mod hashing;
pub mod matcher;
pub mod pipeline;
pub mod retrieval;
pub mod scanner;
pub mod scoring;
pub mod store;

pub use classify::{HIGH_RISK_THRESHOLD, MEDIUM_RISK_THRESHOLD, RiskBand};
pub use config::{Config, ConfigError};
pub use dictionary::{DictionaryError, SeverityDictionary, SeverityTier};
pub use hashing::{QueryKey, hash_query_bytes, hash_query_page};
pub use matcher::{TierHit, TierMatcher};
pub use pipeline::{PipelineError, PipelineReport, ScoringPipeline};
#[cfg(any(test, feature = "mock"))]
pub use retrieval::MockEntityProvider;
pub use retrieval::{
    EntityPage, EntityProvider, EntityQuery, HttpEntityProvider, ProviderError, QueryCache,
    RetrievalConfig, RetrievalError, RetrievalService, RetryPolicy, SOURCE_HEADER, ServeMode,
    ServedPage, SnapshotError, SnapshotStore, SortBy, SortOrder, StoreEntityProvider,
};
pub use scanner::{CONTEXT_WINDOW_RADIUS, ContextWindow, OccurrenceScanner};
pub use scoring::{EntityScore, ScoreAggregator};
pub use store::{Document, Entity, EntityStore, MemoryEntityStore, StoreError};
