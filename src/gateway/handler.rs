use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::classify::RiskBand;
use crate::pipeline::PipelineReport;
use crate::retrieval::{EntityProvider, EntityQuery, SOURCE_HEADER, SortBy, SortOrder};

use super::error::GatewayError;
use super::state::HandlerState;

/// Raw query string for `GET /v1/entities`.
///
/// Everything arrives as strings; parsing failures become 400s rather
/// than axum rejections so the error body stays consistent.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityQueryParams {
    pub search: Option<String>,
    /// Comma-separated band list, e.g. `high,medium`.
    pub risk: Option<String>,
    /// Comma-separated tag list.
    pub tags: Option<String>,
    pub min_score: Option<u32>,
    pub max_score: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<u32>,
}

impl EntityQueryParams {
    /// Parses the raw params into a query plus the requested page.
    pub fn into_query(self) -> Result<(EntityQuery, u32), GatewayError> {
        let risk_bands = match &self.risk {
            None => Vec::new(),
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| s.parse::<RiskBand>().map_err(GatewayError::InvalidQuery))
                .collect::<Result<Vec<_>, _>>()?,
        };

        let tags = self
            .tags
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let sort_by = match &self.sort_by {
            None => SortBy::default(),
            Some(raw) => raw.parse::<SortBy>().map_err(GatewayError::InvalidQuery)?,
        };

        let sort_order = self
            .sort_order
            .as_deref()
            .map(|raw| raw.parse::<SortOrder>().map_err(GatewayError::InvalidQuery))
            .transpose()?;

        if let (Some(min), Some(max)) = (self.min_score, self.max_score) {
            if min > max {
                return Err(GatewayError::InvalidQuery(format!(
                    "minScore {min} exceeds maxScore {max}"
                )));
            }
        }

        let query = EntityQuery {
            search: self.search,
            risk_bands,
            tags,
            min_score: self.min_score,
            max_score: self.max_score,
            sort_by,
            sort_order,
        };
        Ok((query, self.page.unwrap_or(1)))
    }
}

/// `GET /v1/entities` — paginated, filtered, sorted entity listing.
///
/// The serving path (live, cached, fallback) is reported in the
/// `x-dossier-source` header; a stale fallback page is still a 200.
#[tracing::instrument(skip(state, params))]
pub async fn list_entities_handler<P>(
    State(state): State<HandlerState<P>>,
    Query(params): Query<EntityQueryParams>,
) -> Result<Response, GatewayError>
where
    P: EntityProvider + 'static,
{
    let (query, page) = params.into_query()?;
    let served = state.service.query(&query, page).await?;
    if served.mode.is_degraded() {
        tracing::warn!("serving stale fallback data");
    }

    let mut headers = HeaderMap::new();
    headers.insert(
        SOURCE_HEADER,
        HeaderValue::from_static(served.mode.as_header_value()),
    );

    Ok((StatusCode::OK, headers, Json(served.page)).into_response())
}

/// `POST /v1/scoring/run` — operator-triggered batch rescore +
/// reclassification of every entity.
#[tracing::instrument(skip(state))]
pub async fn run_scoring_handler<P>(
    State(state): State<HandlerState<P>>,
) -> Result<Json<PipelineReport>, GatewayError>
where
    P: EntityProvider + 'static,
{
    let report = state.pipeline.run().await?;
    Ok(Json(report))
}
