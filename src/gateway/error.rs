use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::pipeline::PipelineError;
use crate::retrieval::{RetrievalError, SOURCE_HEADER};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("scoring batch failed: {0}")]
    Scoring(#[from] PipelineError),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, source_status) = match &self {
            GatewayError::InvalidQuery(_) => (StatusCode::BAD_REQUEST, "invalid_query"),
            // Both degradation paths are gone; nothing cheaper to offer.
            GatewayError::Retrieval(_) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
            GatewayError::Scoring(_) => (StatusCode::INTERNAL_SERVER_ERROR, "scoring_error"),
        };

        let mut headers = HeaderMap::new();
        headers.insert(
            SOURCE_HEADER,
            HeaderValue::from_str(source_status).unwrap_or(HeaderValue::from_static("error")),
        );

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}
