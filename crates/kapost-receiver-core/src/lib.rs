//! # Kapost Receiver Core
//!
//! Authentication and dispatch logic for Kapost App Center webhooks.
//!
//! A webhook call travels through three stages:
//!
//! 1. [`extract`] pulls the routing headers, claimed signature, bearer key and
//!    raw body out of an [`IncomingRequest`](extract::IncomingRequest).
//! 2. [`auth`] recomputes the HMAC-SHA256 signature, checks the bearer key and
//!    parses the action name into an [`Action`](dispatch::Action).
//! 3. [`dispatch`] runs the handler for that action and builds the response.
//!
//! [`WebhookReceiver`](receiver::WebhookReceiver) composes the three stages and
//! always yields exactly one [`ActionResult`].
//!
//! This crate has no HTTP framework dependency; the hosting server converts
//! its own request type into an [`IncomingRequest`](extract::IncomingRequest)
//! and renders the returned [`ActionResult`].

use serde::Serialize;
use serde_json::Value;
use tracing::error;

pub mod auth;
pub mod credentials;
pub mod dispatch;
pub mod extract;
pub mod receiver;

pub use auth::{check_method, compute_signature, constant_time_eq, Authenticator};
pub use credentials::{Credentials, SecretValue};
pub use dispatch::{
    Action, AuthResponse, Capabilities, ContentPublisher, Dispatcher, Publication,
    PublishResponse, StaticPublisher,
};
pub use extract::{IncomingRequest, RequestContext, RequestHeaders};
pub use receiver::WebhookReceiver;

// ============================================================================
// Errors
// ============================================================================

/// Rejection reasons for a webhook request.
///
/// Every variant maps to exactly one HTTP status code and one client-facing
/// message. All of them are terminal: once one is produced no further checks
/// run for the request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WebhookError {
    /// The request used a method other than `POST`.
    #[error("bad request")]
    MethodNotAllowed,

    /// The `X-Kapost-Signature` header was missing or did not match.
    #[error("Invalid signature")]
    InvalidSignature,

    /// The bearer key was missing, the configured key was empty, or they differ.
    #[error("Invalid API Key")]
    InvalidApiKey,

    /// The `X-Kapost-Action` header named an action outside the supported set.
    #[error("Action '{action}' is not supported")]
    UnsupportedAction { action: String },

    /// A republish referenced an external id that is not known.
    #[error("Cannot republish because external id could not be found")]
    ResourceNotFound,
}

impl WebhookError {
    /// HTTP status code returned to the caller for this rejection.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MethodNotAllowed => 400,
            Self::InvalidSignature => 403,
            Self::InvalidApiKey => 401,
            Self::UnsupportedAction { .. } => 405,
            Self::ResourceNotFound => 404,
        }
    }
}

// ============================================================================
// Action result
// ============================================================================

/// Outcome of one webhook request.
///
/// Produced once per request, either by the authenticator on rejection or by
/// the dispatcher. The hosting server turns it into the wire response.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResult {
    /// The action ran; `body` is the JSON object returned to the caller.
    Success { status_code: u16, body: Value },

    /// The request was rejected; `message` is returned as `{"error": message}`.
    Failure { status_code: u16, message: String },
}

impl ActionResult {
    /// Build a `200 OK` result from a serializable response body.
    ///
    /// A body that fails to serialize turns into a `500` failure.
    pub fn success<T: Serialize>(body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(body) => Self::Success {
                status_code: 200,
                body,
            },
            Err(e) => {
                error!(error = %e, "Failed to serialize action response body");
                Self::Failure {
                    status_code: 500,
                    message: "Internal server error".to_string(),
                }
            }
        }
    }

    /// HTTP status code for the response.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Success { status_code, .. } | Self::Failure { status_code, .. } => *status_code,
        }
    }

    /// JSON body for the response.
    pub fn body(&self) -> Value {
        match self {
            Self::Success { body, .. } => body.clone(),
            Self::Failure { message, .. } => serde_json::json!({ "error": message }),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

impl From<WebhookError> for ActionResult {
    fn from(error: WebhookError) -> Self {
        Self::Failure {
            status_code: error.status_code(),
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
