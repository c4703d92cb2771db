//! Error types for the HTTP service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use kapost_receiver_core::WebhookError;
use tracing::warn;

/// Webhook handler errors with HTTP status code mapping
///
/// Every error is rendered as `{"error": <message>}` with
/// `Content-Type: application/json`.
///
/// - `Rejected`: the receiver refused the request; status and message come
///   from the [`WebhookError`] itself (400, 401, 403, 404 or 405).
/// - `PayloadTooLarge`: `413 Payload Too Large`, decided from `Content-Length`
///   before the body is read.
/// - `PayloadUnreadable`: `400 Bad Request`, the body stream failed or
///   exceeded the size limit while being read.
/// - `Timeout`: `408 Request Timeout`, the body was not received in time.
#[derive(Debug, thiserror::Error)]
pub enum WebhookHandlerError {
    /// Authentication or dispatch rejected the request.
    #[error(transparent)]
    Rejected(#[from] WebhookError),

    /// Declared body size exceeds the configured limit.
    #[error("Payload too large: {size} bytes (max: {max_size} bytes)")]
    PayloadTooLarge { size: u64, max_size: usize },

    /// The body could not be read. `message` is logged, never returned.
    #[error("Unexpected error while reading payload")]
    PayloadUnreadable { message: String },

    /// Reading the body took longer than the configured timeout.
    #[error("Request timeout after {seconds}s")]
    Timeout { seconds: u64 },
}

impl WebhookHandlerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Rejected(e) => {
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::BAD_REQUEST)
            }
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::PayloadUnreadable { .. } => StatusCode::BAD_REQUEST,
            Self::Timeout { .. } => StatusCode::REQUEST_TIMEOUT,
        }
    }
}

impl IntoResponse for WebhookHandlerError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            Self::Rejected(e) => {
                warn!(status = %status, error = %e, "Webhook request rejected");
            }
            Self::PayloadTooLarge { size, max_size } => {
                warn!(
                    payload_size = size,
                    max_size = max_size,
                    "Payload too large"
                );
            }
            Self::PayloadUnreadable { message } => {
                warn!(error = %message, "Failed to read webhook payload");
            }
            Self::Timeout { seconds } => {
                warn!(timeout_seconds = seconds, "Timed out reading webhook payload");
            }
        }

        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

/// Service-level errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Failed to bind to address {address}: {message}")]
    BindFailed { address: String, message: String },

    #[error("Server failed: {message}")]
    ServerFailed { message: String },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for '{field}': {message}")]
    Invalid { field: String, message: String },
}

impl ConfigError {
    pub fn invalid(field: &str, message: &str) -> Self {
        Self::Invalid {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}
