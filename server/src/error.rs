//! HTTP error mapping
//!
//! Errors raised before a stream starts become JSON bodies. Once an SSE
//! response has been returned, failures travel in-band instead.

use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use sitesmith_pipeline::{ImageSearchError, PipelineError};

pub type BoxError = Box<dyn StdError + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad or missing input (400)
    #[error("{0}")]
    Validation(String),

    /// The photo provider could not serve a direct image query (500)
    #[error("Failed to fetch images")]
    Upstream(#[source] ImageSearchError),

    /// Anything else (500, with a cause chain)
    #[error("{0}")]
    Internal(BoxError),
}

impl ApiError {
    pub fn no_json() -> Self {
        ApiError::Validation("No JSON data received".to_string())
    }

    pub fn internal(err: impl Into<BoxError>) -> Self {
        ApiError::Internal(err.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Validation(e) => ApiError::Validation(e.to_string()),
        }
    }
}

impl From<tokio::sync::AcquireError> for ApiError {
    fn from(err: tokio::sync::AcquireError) -> Self {
        ApiError::internal(err)
    }
}

/// An error and its causes, one per line
pub fn traceback(err: &(dyn StdError + 'static)) -> String {
    let mut lines = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        lines.push(format!("caused by: {}", cause));
        source = cause.source();
    }
    lines.join("\n")
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Validation(message) => json!({ "error": message }),
            ApiError::Upstream(cause) => {
                log::warn!("Image query failed: {}", cause);
                json!({ "error": self.to_string() })
            }
            ApiError::Internal(cause) => {
                let trace = traceback(&**cause);
                log::error!("Request failed: {}", trace);
                json!({ "error": cause.to_string(), "traceback": trace })
            }
        };
        (status, Json(body)).into_response()
    }
}
