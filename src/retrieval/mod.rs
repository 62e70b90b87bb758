//! Cached retrieval service: filter/sort/paginate queries over the scored
//! entity set, with TTL caching, in-flight de-duplication, retry with
//! exponential backoff, and snapshot fallback.
//!
//! Layering, outermost first: [`RetrievalService`] → [`QueryCache`] →
//! single-flight map → [`retry`] → [`EntityProvider`] → [`SnapshotStore`]
//! fallback. The in-process query engine in [`query`] is the single
//! definition of filter/sort semantics, shared by every provider so a
//! cached read, a live fetch, and a fallback page can never disagree.

pub mod cache;
pub mod error;
pub mod query;
pub mod retry;
pub mod service;
pub mod snapshot;
pub mod source;
pub mod types;

#[cfg(test)]
mod tests;

pub use cache::QueryCache;
pub use error::{ProviderError, RetrievalError, SnapshotError};
pub use query::{blended_score, filter_sort_paginate};
pub use retry::{RetryPolicy, with_retry};
pub use service::{RetrievalConfig, RetrievalService};
pub use snapshot::SnapshotStore;
#[cfg(any(test, feature = "mock"))]
pub use source::MockEntityProvider;
pub use source::{EntityProvider, HttpEntityProvider, StoreEntityProvider};
pub use types::{
    EntityPage, EntityQuery, MENTION_SORT_WEIGHT, SCORE_SORT_WEIGHT, SOURCE_HEADER, ServeMode,
    ServedPage, SortBy, SortOrder,
};
