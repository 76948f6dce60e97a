//! Relay error types with HTTP status code mapping.
//!
//! [`BrokerError`] is the central error type for the relay. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::AuthError;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "unauthorized"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                |
/// |-----------|-----------------|----------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request            |
/// | 2000–2999 | Authorization   | 403 Forbidden              |
/// | 3000–3999 | Server          | 500 Internal Server Error  |
/// | 4000–4999 | Transport       | upgrade rejection status   |
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    /// The credential was absent or did not grant the requested role.
    #[error("unauthorized")]
    Unauthorized,

    /// Request validation failed (e.g. malformed publish body).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The credential could not be verified (bad signature, expired,
    /// malformed). Unlike [`BrokerError::Unauthorized`] this is not a
    /// normal denial.
    #[error("credential verification failed: {0}")]
    Verification(#[from] AuthError),

    /// The request could not be upgraded to a WebSocket.
    #[error("websocket upgrade failed: {0}")]
    Upgrade(#[from] WebSocketUpgradeRejection),

    /// Writing a frame to a subscriber failed.
    #[error("transport write failed: {0}")]
    TransportWrite(#[source] axum::Error),
}

impl BrokerError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::Unauthorized => 2001,
            Self::Verification(_) => 3001,
            Self::TransportWrite(_) => 3002,
            Self::Upgrade(_) => 4001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::FORBIDDEN,
            Self::Upgrade(rejection) => rejection.status(),
            Self::Verification(_) | Self::TransportWrite(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for BrokerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
