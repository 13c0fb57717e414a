//! Error types for the API.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tally_core::SaveError;
use tally_store::StoreError;
use thiserror::Error;

/// Errors returned by request handlers.
///
/// Every variant is rendered as a JSON `{"error": "..."}` body.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed input.
    #[error("{0}")]
    InvalidRequest(String),

    /// Wrong password for an existing user.
    #[error("invalid credentials")]
    AuthenticationFailed,

    /// Unknown user or month.
    #[error("{0}")]
    NotFound(String),

    /// Backing store failure (unreachable, malformed, rejected, conflict).
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn missing(field: &str) -> Self {
        ApiError::InvalidRequest(format!("{field} is required"))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::AuthenticationFailed => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(e) if e.is_conflict() => StatusCode::CONFLICT,
            ApiError::Store(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SaveError> for ApiError {
    fn from(err: SaveError) -> Self {
        match err {
            SaveError::UnknownUser(_) => ApiError::NotFound(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
