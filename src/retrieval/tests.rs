use std::time::Duration;

use crate::classify::RiskBand;
use crate::store::Entity;

use super::cache::QueryCache;
use super::query::{blended_score, filter_sort_paginate};
use super::retry::RetryPolicy;
use super::service::{RetrievalConfig, RetrievalService};
use super::snapshot::SnapshotStore;
use super::source::MockEntityProvider;
use super::types::{EntityPage, EntityQuery, ServeMode, SortBy, SortOrder};

fn entity(name: &str, mentions: u32, score: u32) -> Entity {
    let mut e = Entity::new(name);
    e.mention_count = mentions;
    e.total_score = score;
    e.risk_band = RiskBand::from_score(score);
    e
}

fn sample_entities() -> Vec<Entity> {
    vec![
        entity("Alice Archer", 100, 10),
        entity("Bob Breton", 10, 90),
        entity("Carol Chu", 5, 25),
        entity("Dan Drake", 0, 0).with_tags(&["politics"]),
        entity("Erin Estevez", 3, 55).with_tags(&["finance", "politics"]),
    ]
}

// ---- query engine ----

#[test]
fn test_search_filter_is_case_insensitive_substring() {
    let query = EntityQuery {
        search: Some("ARCHER".to_string()),
        ..Default::default()
    };
    let page = filter_sort_paginate(&sample_entities(), &query, 1, 25);
    assert_eq!(page.total, 1);
    assert_eq!(page.data[0].full_name, "Alice Archer");
}

#[test]
fn test_risk_band_membership_filter() {
    let query = EntityQuery {
        risk_bands: vec![RiskBand::High],
        ..Default::default()
    };
    let page = filter_sort_paginate(&sample_entities(), &query, 1, 25);
    let names: Vec<&str> = page.data.iter().map(|e| e.full_name.as_str()).collect();
    assert_eq!(names, vec!["Bob Breton", "Erin Estevez"]);
}

#[test]
fn test_tag_filter_matches_any_listed_tag() {
    let query = EntityQuery {
        tags: vec!["politics".to_string()],
        ..Default::default()
    };
    let page = filter_sort_paginate(&sample_entities(), &query, 1, 25);
    assert_eq!(page.total, 2);
}

#[test]
fn test_score_bounds_are_inclusive() {
    let query = EntityQuery {
        min_score: Some(10),
        max_score: Some(55),
        ..Default::default()
    };
    let page = filter_sort_paginate(&sample_entities(), &query, 1, 25);
    let names: Vec<&str> = page.data.iter().map(|e| e.full_name.as_str()).collect();
    // 10, 25, 55 pass; 0 and 90 are out.
    assert_eq!(page.total, 3);
    assert!(names.contains(&"Alice Archer"));
    assert!(names.contains(&"Erin Estevez"));
}

#[test]
fn test_blended_score_ranks_mentions_and_score() {
    // A: 0.3*100 + 0.7*10 = 37; B: 0.3*10 + 0.7*90 = 66.
    let a = entity("A", 100, 10);
    let b = entity("B", 10, 90);
    assert!((blended_score(&a) - 37.0).abs() < f64::EPSILON);
    assert!((blended_score(&b) - 66.0).abs() < f64::EPSILON);

    let page = filter_sort_paginate(&[a, b], &EntityQuery::default(), 1, 25);
    assert_eq!(page.data[0].full_name, "B");
    assert_eq!(page.data[1].full_name, "A");
}

#[test]
fn test_name_sort_defaults_ascending() {
    let query = EntityQuery {
        sort_by: SortBy::Name,
        ..Default::default()
    };
    let page = filter_sort_paginate(&sample_entities(), &query, 1, 25);
    assert_eq!(page.data[0].full_name, "Alice Archer");
    assert_eq!(page.data[4].full_name, "Erin Estevez");
}

#[test]
fn test_mentions_sort_defaults_descending() {
    let query = EntityQuery {
        sort_by: SortBy::Mentions,
        ..Default::default()
    };
    let page = filter_sort_paginate(&sample_entities(), &query, 1, 25);
    assert_eq!(page.data[0].full_name, "Alice Archer");
    assert_eq!(page.data[4].full_name, "Dan Drake");
}

#[test]
fn test_risk_sort_uses_band_then_raw_score() {
    let query = EntityQuery {
        sort_by: SortBy::Risk,
        ..Default::default()
    };
    let page = filter_sort_paginate(&sample_entities(), &query, 1, 25);
    let names: Vec<&str> = page.data.iter().map(|e| e.full_name.as_str()).collect();
    // HIGH (90, 55), MEDIUM (25, 10), LOW (0).
    assert_eq!(
        names,
        vec![
            "Bob Breton",
            "Erin Estevez",
            "Carol Chu",
            "Alice Archer",
            "Dan Drake"
        ]
    );
}

#[test]
fn test_explicit_sort_order_overrides_default() {
    let query = EntityQuery {
        sort_by: SortBy::Name,
        sort_order: Some(SortOrder::Desc),
        ..Default::default()
    };
    let page = filter_sort_paginate(&sample_entities(), &query, 1, 25);
    assert_eq!(page.data[0].full_name, "Erin Estevez");
}

#[test]
fn test_pagination_math() {
    let query = EntityQuery {
        sort_by: SortBy::Name,
        ..Default::default()
    };
    let entities = sample_entities();

    let page1 = filter_sort_paginate(&entities, &query, 1, 2);
    assert_eq!(page1.total, 5);
    assert_eq!(page1.total_pages, 3);
    assert_eq!(page1.data.len(), 2);
    assert!(page1.has_next_page());

    let page3 = filter_sort_paginate(&entities, &query, 3, 2);
    assert_eq!(page3.data.len(), 1);
    assert!(!page3.has_next_page());

    let beyond = filter_sort_paginate(&entities, &query, 9, 2);
    assert!(beyond.data.is_empty());
    assert_eq!(beyond.total, 5);
}

#[test]
fn test_page_zero_treated_as_first_page() {
    let page = filter_sort_paginate(&sample_entities(), &EntityQuery::default(), 0, 2);
    assert_eq!(page.page, 1);
    assert_eq!(page.data.len(), 2);
}

// ---- cache keys ----

#[test]
fn test_equivalent_queries_share_a_key() {
    let a = EntityQuery {
        risk_bands: vec![RiskBand::High, RiskBand::Low],
        tags: vec!["b".to_string(), "a".to_string()],
        ..Default::default()
    };
    let b = EntityQuery {
        risk_bands: vec![RiskBand::Low, RiskBand::High, RiskBand::High],
        tags: vec!["a".to_string(), "b".to_string()],
        ..Default::default()
    };
    assert_eq!(a.cache_key(1, 25), b.cache_key(1, 25));
    assert_ne!(a.cache_key(1, 25), a.cache_key(2, 25));
    assert_ne!(a.cache_key(1, 25), a.cache_key(1, 50));
}

#[test]
fn test_search_queries_bypass_cache() {
    let mut query = EntityQuery::default();
    assert!(!query.bypasses_cache());
    query.search = Some("  ".to_string());
    assert!(!query.bypasses_cache());
    query.search = Some("doe".to_string());
    assert!(query.bypasses_cache());
}

// ---- query cache ----

#[test]
fn test_cache_put_get_invalidate() {
    let cache = QueryCache::new();
    let key = EntityQuery::default().cache_key(1, 25);
    assert!(cache.get(&key).is_none());

    cache.put(key, EntityPage::empty(1, 25));
    assert!(cache.get(&key).is_some());

    cache.invalidate(&key);
    assert!(cache.get(&key).is_none());
}

#[test]
fn test_cache_expires_after_ttl() {
    let cache = QueryCache::with_config(16, Duration::from_millis(40));
    let key = EntityQuery::default().cache_key(1, 25);
    cache.put(key, EntityPage::empty(1, 25));
    assert!(cache.get(&key).is_some());

    std::thread::sleep(Duration::from_millis(80));
    assert!(cache.get(&key).is_none());
}

// ---- service ----

fn service_config() -> RetrievalConfig {
    RetrievalConfig {
        retry: RetryPolicy::new(3, Duration::from_millis(1)),
        prefetch: false,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_second_identical_query_is_served_from_cache() {
    let provider = MockEntityProvider::with_entities(sample_entities());
    let service = RetrievalService::new(service_config(), provider.clone());

    let query = EntityQuery::default();
    let first = service.query(&query, 1).await.unwrap();
    assert_eq!(first.mode, ServeMode::Live);

    let second = service.query(&query, 1).await.unwrap();
    assert_eq!(second.mode, ServeMode::Cached);
    assert_eq!(second.page, first.page);
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn test_search_queries_always_recompute() {
    let provider = MockEntityProvider::with_entities(sample_entities());
    let service = RetrievalService::new(service_config(), provider.clone());

    let query = EntityQuery {
        search: Some("archer".to_string()),
        ..Default::default()
    };
    let first = service.query(&query, 1).await.unwrap();
    let second = service.query(&query, 1).await.unwrap();
    assert_eq!(first.mode, ServeMode::Live);
    assert_eq!(second.mode, ServeMode::Live);
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn test_exhausted_backing_falls_back_to_snapshot() {
    let provider = MockEntityProvider::new();
    provider.fail_always(true);

    let service = RetrievalService::new(service_config(), provider)
        .with_snapshot(SnapshotStore::from_entities(sample_entities()));

    let served = service.query(&EntityQuery::default(), 1).await.unwrap();
    assert_eq!(served.mode, ServeMode::Fallback);
    assert!(served.page.stale);
    assert_eq!(served.page.total, 5);
}

#[tokio::test]
async fn test_no_snapshot_surfaces_unavailable() {
    let provider = MockEntityProvider::new();
    provider.fail_always(true);
    let service = RetrievalService::new(service_config(), provider);

    let err = service.query(&EntityQuery::default(), 1).await.unwrap_err();
    assert!(err.to_string().contains("no fallback snapshot"));
}

#[tokio::test]
async fn test_backing_recovery_within_retry_budget_stays_live() {
    let provider = MockEntityProvider::with_entities(sample_entities());
    provider.fail_times(2);
    let service = RetrievalService::new(service_config(), provider.clone());

    let served = service.query(&EntityQuery::default(), 1).await.unwrap();
    assert_eq!(served.mode, ServeMode::Live);
    assert_eq!(provider.calls(), 3);
}

#[tokio::test]
async fn test_stale_fallback_pages_are_not_cached() {
    let provider = MockEntityProvider::with_entities(sample_entities());
    provider.fail_times(4);

    let service = RetrievalService::new(service_config(), provider.clone())
        .with_snapshot(SnapshotStore::from_entities(sample_entities()));

    let degraded = service.query(&EntityQuery::default(), 1).await.unwrap();
    assert_eq!(degraded.mode, ServeMode::Fallback);

    // Backing recovered; the stale page must not mask it.
    let recovered = service.query(&EntityQuery::default(), 1).await.unwrap();
    assert_eq!(recovered.mode, ServeMode::Live);
    assert!(!recovered.page.stale);
}

#[tokio::test]
async fn test_stop_clears_cached_pages() {
    let provider = MockEntityProvider::with_entities(sample_entities());
    let service = RetrievalService::new(service_config(), provider.clone());

    service.query(&EntityQuery::default(), 1).await.unwrap();
    service.stop();

    let served = service.query(&EntityQuery::default(), 1).await.unwrap();
    assert_eq!(served.mode, ServeMode::Live);
    assert_eq!(provider.calls(), 2);
}
