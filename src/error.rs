//! Error taxonomy for the classification pipeline, the record stores and the HTTP layer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// A classification provider could not produce candidates.
///
/// Every variant is recovered inside the orchestrator by falling through to the
/// next stage; none of them reach an HTTP caller.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider credentials missing or rejected: {0}")]
    Unauthenticated(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Provider returned status {0}: {1}")]
    Status(u16, String),

    #[error("Malformed provider response: {0}")]
    Malformed(String),

    #[error("Could not read image: {0}")]
    Image(String),
}

/// The nutrition/recipe/product store could not be reached or understood.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store API key not configured")]
    MissingApiKey,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Store returned status {0}: {1}")]
    Status(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No image part in the request")]
    MissingImage,

    #[error("Uploaded file is not a supported image format")]
    UnsupportedFormat,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Record not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Record store unreachable (502)
    #[error("Record store unreachable: {0}")]
    StoreUnreachable(#[from] StoreError),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::MissingImage | UploadError::UnsupportedFormat => {
                ApiError::BadRequest(err.to_string())
            }
            UploadError::Io(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::StoreUnreachable(_) => (StatusCode::BAD_GATEWAY, "STORE_UNREACHABLE"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
