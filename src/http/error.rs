//! Structured API errors.
//!
//! Errors are rendered in the Prometheus HTTP API error format so that
//! clients already speaking that API can parse them:
//!
//! ```json
//! { "status": "error", "errorType": "internal", "error": "tenant not found" }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced to clients by the gateway's own layers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No tenant identity in the request context when one was required.
    #[error("tenant not found")]
    TenantNotFound,

    /// Tenant header present but unusable as a path segment.
    #[error("invalid tenant identifier")]
    InvalidTenant,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::TenantNotFound => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InvalidTenant => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        api_error_response(&self.to_string(), self.status_code())
    }
}

/// Error body as serialized on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub status: String,
    #[serde(rename = "errorType")]
    pub error_type: String,
    pub error: String,
}

/// Builds an error response with the given message and status, logging it.
pub fn api_error_response(message: &str, status: StatusCode) -> Response {
    if status.is_server_error() {
        tracing::error!(status = status.as_u16(), error = message, "API error");
    } else {
        tracing::warn!(status = status.as_u16(), error = message, "API error");
    }

    let body = ApiErrorBody {
        status: "error".to_string(),
        error_type: error_type(status).to_string(),
        error: message.to_string(),
    };
    (status, Json(body)).into_response()
}

/// Maps a status code onto the Prometheus `errorType` vocabulary.
fn error_type(status: StatusCode) -> &'static str {
    match status {
        StatusCode::NOT_FOUND => "not_found",
        StatusCode::UNPROCESSABLE_ENTITY => "execution",
        StatusCode::SERVICE_UNAVAILABLE => "unavailable",
        StatusCode::GATEWAY_TIMEOUT => "timeout",
        s if s.is_server_error() => "internal",
        _ => "bad_data",
    }
}
