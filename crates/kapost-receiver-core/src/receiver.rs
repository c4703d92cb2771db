//! The request pipeline.

use crate::auth::{check_method, Authenticator};
use crate::credentials::Credentials;
use crate::dispatch::{parse_payload, ContentPublisher, Dispatcher};
use crate::extract::{IncomingRequest, RequestContext};
use crate::{ActionResult, WebhookError};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Runs one webhook request from receipt to result.
///
/// The request moves through `Received → Extracted → Authenticated →
/// Dispatched`. Any rejection ends processing immediately and becomes the
/// request's single [`ActionResult`].
///
/// The receiver holds no mutable state and can be shared between concurrent
/// requests.
#[derive(Debug, Clone)]
pub struct WebhookReceiver {
    authenticator: Authenticator,
    dispatcher: Dispatcher,
}

impl WebhookReceiver {
    pub fn new(credentials: Arc<Credentials>, publisher: Arc<dyn ContentPublisher>) -> Self {
        Self {
            authenticator: Authenticator::new(credentials),
            dispatcher: Dispatcher::new(publisher),
        }
    }

    /// Process a request and produce its result.
    #[instrument(skip_all, fields(method = %request.method, body_len = request.raw_body.len()))]
    pub async fn handle(&self, request: IncomingRequest) -> ActionResult {
        if let Err(e) = check_method(&request.method) {
            return reject(e);
        }

        let context = RequestContext::from_request(request);

        let action = match self.authenticator.authenticate(&context) {
            Ok(action) => action,
            Err(e) => return reject(e),
        };

        let payload = parse_payload(&context.raw_body);
        let result = self
            .dispatcher
            .dispatch(action, &context, payload.as_ref())
            .await;

        info!(
            platform = %context.platform,
            action = %action,
            status = result.status_code(),
            "Webhook action completed"
        );

        result
    }
}

fn reject(error: WebhookError) -> ActionResult {
    warn!(
        status = error.status_code(),
        error = %error,
        "Webhook request rejected"
    );
    error.into()
}

#[cfg(test)]
#[path = "receiver_tests.rs"]
mod tests;
