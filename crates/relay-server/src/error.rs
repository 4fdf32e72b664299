//! Error types for the relay server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use relay_alerts::AlertError;
use relay_notify::NotifyError;
use relay_suppress::StoreError;
use serde::Serialize;
use thiserror::Error;

/// Result type alias for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;

/// Errors that can occur while handling a request.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Malformed body, empty alert list, malformed interaction or custom id.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Missing or invalid interaction signature.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The suppression store failed.
    #[error("suppression store failed: {0}")]
    Store(#[from] StoreError),

    /// A chat provider rejected or did not answer a request.
    #[error("delivery failed: {0}")]
    Delivery(#[from] NotifyError),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Failed to bind to the specified address.
    #[error("failed to bind to {0}: {1}")]
    BindFailed(std::net::SocketAddr, std::io::Error),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<AlertError> for RelayError {
    fn from(err: AlertError) -> Self {
        Self::InvalidRequest(err.to_string())
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl RelayError {
    /// HTTP status and machine-readable kind for this error.
    #[must_use]
    pub const fn status(&self) -> (StatusCode, &'static str) {
        match self {
            Self::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            Self::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "store_error"),
            Self::Delivery(_) => (StatusCode::INTERNAL_SERVER_ERROR, "delivery_failed"),
            Self::Config(_) | Self::BindFailed(_, _) | Self::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status();

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        };

        let json = serde_json::to_string(&body).unwrap_or_else(|_| {
            r#"{"error":"internal_error","message":"failed to serialize error"}"#.to_string()
        });

        (status, [("content-type", "application/json")], json).into_response()
    }
}
