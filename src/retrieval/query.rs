//! In-process query engine: the one definition of filter, sort, and
//! pagination semantics over entity rows.
//!
//! Both the snapshot fallback and the store-backed provider run queries
//! through here, so a degraded read and a live recompute rank entities
//! identically (same thresholds, same tie-breaks).

use std::cmp::Ordering;

use crate::store::Entity;

use super::types::{
    EntityPage, EntityQuery, MENTION_SORT_WEIGHT, SCORE_SORT_WEIGHT, SortBy, SortOrder,
};

/// The blended ranking metric behind [`SortBy::Score`].
#[inline]
pub fn blended_score(entity: &Entity) -> f64 {
    MENTION_SORT_WEIGHT * f64::from(entity.mention_count)
        + SCORE_SORT_WEIGHT * f64::from(entity.total_score)
}

/// Applies a query to an entity slice and cuts the requested page.
///
/// `page` is 1-based; out-of-range pages return an empty `data` vector
/// with the real totals so callers can clamp.
pub fn filter_sort_paginate(
    entities: &[Entity],
    query: &EntityQuery,
    page: u32,
    page_size: u32,
) -> EntityPage {
    let mut hits: Vec<&Entity> = entities.iter().filter(|e| matches(e, query)).collect();
    sort_hits(&mut hits, query);

    let page = page.max(1);
    let page_size = page_size.max(1);
    let total = hits.len() as u64;
    let total_pages = total.div_ceil(u64::from(page_size)) as u32;

    let start = (page as usize - 1).saturating_mul(page_size as usize);
    let data: Vec<Entity> = hits
        .into_iter()
        .skip(start)
        .take(page_size as usize)
        .cloned()
        .collect();

    EntityPage {
        data,
        total,
        page,
        total_pages,
        page_size,
        stale: false,
    }
}

fn matches(entity: &Entity, query: &EntityQuery) -> bool {
    if let Some(term) = query.search_term() {
        let term = term.to_lowercase();
        if !entity.full_name.to_lowercase().contains(&term) {
            return false;
        }
    }

    if !query.risk_bands.is_empty() && !query.risk_bands.contains(&entity.risk_band) {
        return false;
    }

    if !query.tags.is_empty() && !query.tags.iter().any(|t| entity.tags.contains(t)) {
        return false;
    }

    if let Some(min) = query.min_score {
        if entity.total_score < min {
            return false;
        }
    }
    if let Some(max) = query.max_score {
        if entity.total_score > max {
            return false;
        }
    }

    true
}

fn sort_hits(hits: &mut [&Entity], query: &EntityQuery) {
    let order = query.effective_order();
    let sort_by = query.sort_by;

    hits.sort_by(|a, b| {
        let primary = match sort_by {
            SortBy::Name => name_key(a).cmp(&name_key(b)),
            SortBy::Mentions => a.mention_count.cmp(&b.mention_count),
            SortBy::Score => blended_score(a)
                .partial_cmp(&blended_score(b))
                .unwrap_or(Ordering::Equal),
            // Band first, raw score inside a band.
            SortBy::Risk => (a.risk_band.rank(), a.total_score)
                .cmp(&(b.risk_band.rank(), b.total_score)),
        };
        let primary = match order {
            SortOrder::Asc => primary,
            SortOrder::Desc => primary.reverse(),
        };
        // Ties always resolve the same way regardless of direction so
        // pagination never shuffles rows between reads.
        primary
            .then_with(|| name_key(a).cmp(&name_key(b)))
            .then_with(|| a.id.cmp(&b.id))
    });
}

fn name_key(entity: &Entity) -> String {
    entity.full_name.to_lowercase()
}
