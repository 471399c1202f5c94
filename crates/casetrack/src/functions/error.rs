//! Errors returned by server-side functions.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Failure of a function call, one variant per rejection point.
#[derive(Debug, Error)]
pub enum FunctionError {
    /// No user-administration backend is configured.
    #[error("user administration is not configured")]
    NotConfigured,

    /// The `Authorization` header is absent or not a bearer token.
    #[error("missing authorization header")]
    MissingToken,

    /// The bearer token is unknown, expired or belongs to a deactivated user.
    #[error("invalid or expired token")]
    InvalidToken,

    /// The caller is not an admin.
    #[error("only admins can create users")]
    Forbidden,

    /// The request body is unusable.
    #[error("{0}")]
    BadRequest(String),

    /// The backend refused the operation; the message is passed through.
    #[error("{0}")]
    Backend(String),

    /// Resolving the caller failed.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FunctionError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotConfigured | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MissingToken | Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::BadRequest(_) | Self::Backend(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for FunctionError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            Self::Internal(detail) => {
                error!("Function failed: {}", detail);
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
