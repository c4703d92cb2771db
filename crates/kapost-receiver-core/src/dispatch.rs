//! Action dispatch.
//!
//! Maps an authenticated [`Action`] to its handler and builds the
//! [`ActionResult`]. The side effects of `publish` and `republish` go through
//! the [`ContentPublisher`] seam.

use crate::auth::constant_time_eq;
use crate::extract::RequestContext;
use crate::{ActionResult, WebhookError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

// ============================================================================
// Action
// ============================================================================

/// The actions the App Center may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Verify the integration and advertise capabilities.
    Auth,

    /// Publish a new piece of content.
    Publish,

    /// Update previously published content.
    Republish,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Auth, Action::Publish, Action::Republish];

    /// Header value naming this action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Publish => "publish",
            Self::Republish => "republish",
        }
    }
}

impl FromStr for Action {
    type Err = WebhookError;

    /// Exact, case-sensitive match against the supported names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| WebhookError::UnsupportedAction {
                action: s.to_string(),
            })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Response bodies
// ============================================================================

/// Features the integration supports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub html: bool,
    pub any_file: bool,
}

/// Body of a successful `auth` action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub capabilities: Capabilities,
}

impl Default for AuthResponse {
    fn default() -> Self {
        Self {
            capabilities: Capabilities {
                html: true,
                any_file: true,
            },
        }
    }
}

/// Where a piece of content ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    pub external_id: String,
    pub published_url: String,
}

/// Body of a successful `publish` or `republish` action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishResponse {
    pub metadata: Publication,
}

// ============================================================================
// Publisher seam
// ============================================================================

/// Performs the side effects of publishing content.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentPublisher: Send + Sync {
    /// Create a new publication for the request.
    async fn publish(&self, context: &RequestContext) -> Result<Publication, WebhookError>;

    /// Update the publication identified by `external_id`.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::ResourceNotFound`] if the id is unknown.
    async fn republish(
        &self,
        external_id: &str,
        context: &RequestContext,
    ) -> Result<Publication, WebhookError>;
}

/// Publisher that knows exactly one publication and performs no I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticPublisher {
    external_id: String,
    published_url: String,
}

impl StaticPublisher {
    pub const DEFAULT_EXTERNAL_ID: &'static str = "abc33";
    pub const DEFAULT_PUBLISHED_URL: &'static str = "https://localhost/php-test";

    pub fn new(external_id: impl Into<String>, published_url: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            published_url: published_url.into(),
        }
    }

    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    /// URL reported after a republish: the publish URL with `-republish` appended.
    pub fn republished_url(&self) -> String {
        format!("{}-republish", self.published_url)
    }
}

impl Default for StaticPublisher {
    fn default() -> Self {
        Self::new(Self::DEFAULT_EXTERNAL_ID, Self::DEFAULT_PUBLISHED_URL)
    }
}

#[async_trait]
impl ContentPublisher for StaticPublisher {
    async fn publish(&self, _context: &RequestContext) -> Result<Publication, WebhookError> {
        Ok(Publication {
            external_id: self.external_id.clone(),
            published_url: self.published_url.clone(),
        })
    }

    async fn republish(
        &self,
        external_id: &str,
        _context: &RequestContext,
    ) -> Result<Publication, WebhookError> {
        if !constant_time_eq(external_id.as_bytes(), self.external_id.as_bytes()) {
            return Err(WebhookError::ResourceNotFound);
        }

        Ok(Publication {
            external_id: self.external_id.clone(),
            published_url: self.republished_url(),
        })
    }
}

// ============================================================================
// Payload helpers
// ============================================================================

/// Parse the body as JSON; invalid JSON yields `None`.
pub fn parse_payload(raw_body: &[u8]) -> Option<Value> {
    serde_json::from_slice(raw_body).ok()
}

/// Read `action.external_id` from a republish payload.
///
/// Only a JSON string is accepted; any other shape is treated as absent.
pub fn republish_target(payload: Option<&Value>) -> Option<&str> {
    payload?.get("action")?.get("external_id")?.as_str()
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Runs the handler for an authenticated action.
#[derive(Clone)]
pub struct Dispatcher {
    publisher: Arc<dyn ContentPublisher>,
}

impl Dispatcher {
    pub fn new(publisher: Arc<dyn ContentPublisher>) -> Self {
        Self { publisher }
    }

    #[instrument(skip(self, context, payload), fields(action = %action))]
    pub async fn dispatch(
        &self,
        action: Action,
        context: &RequestContext,
        payload: Option<&Value>,
    ) -> ActionResult {
        match action {
            // The key has already been checked against the local configuration;
            // no external identity service is consulted.
            Action::Auth => ActionResult::success(&AuthResponse::default()),

            Action::Publish => match self.publisher.publish(context).await {
                Ok(metadata) => {
                    debug!(external_id = %metadata.external_id, "Content published");
                    ActionResult::success(&PublishResponse { metadata })
                }
                Err(e) => e.into(),
            },

            Action::Republish => {
                let Some(external_id) = republish_target(payload) else {
                    warn!("Republish payload carries no external id");
                    return WebhookError::ResourceNotFound.into();
                };

                match self.publisher.republish(external_id, context).await {
                    Ok(metadata) => {
                        debug!(external_id = %metadata.external_id, "Content republished");
                        ActionResult::success(&PublishResponse { metadata })
                    }
                    Err(e) => {
                        warn!(error = %e, "Republish rejected");
                        e.into()
                    }
                }
            }
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
