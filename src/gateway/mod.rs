//! HTTP gateway (Axum) over the retrieval service and the scoring batch.
//!
//! This module is primarily used by the `dossier` server binary.

pub mod error;
pub mod handler;
pub mod state;


use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::GatewayError;
pub use handler::{list_entities_handler, run_scoring_handler};
pub use state::HandlerState;

use crate::retrieval::{EntityProvider, SOURCE_HEADER};

pub fn create_router_with_state<P>(state: HandlerState<P>) -> Router
where
    P: EntityProvider + 'static,
{
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/v1/entities", get(list_entities_handler))
        .route("/v1/scoring/run", post(run_scoring_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(serde::Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub components: ComponentStatus,
}

#[derive(serde::Serialize)]
pub struct ComponentStatus {
    pub http: &'static str,
    pub backing: &'static str,
    pub snapshot: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    (StatusCode::OK, Json(HealthResponse { status: "ok" })).into_response()
}

#[tracing::instrument(skip(state))]
pub async fn ready_handler<P>(
    axum::extract::State(state): axum::extract::State<HandlerState<P>>,
) -> Response
where
    P: EntityProvider + 'static,
{
    let backing = if state.service.backing_ready().await {
        "ready"
    } else {
        "unreachable"
    };
    let snapshot = if state.service.snapshot().is_loaded() {
        "loaded"
    } else {
        "empty"
    };

    // Degradable by design: either path alone can answer queries.
    let is_ready = backing == "ready" || snapshot == "loaded";

    let components = ComponentStatus {
        http: "ready",
        backing,
        snapshot,
    };

    let (status_code, status_msg) = if is_ready {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "pending")
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        SOURCE_HEADER,
        HeaderValue::from_str(status_msg).unwrap_or(HeaderValue::from_static("error")),
    );

    (
        status_code,
        headers,
        Json(ReadyResponse {
            status: status_msg,
            components,
        }),
    )
        .into_response()
}
