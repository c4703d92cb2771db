//! Request authentication.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! | Step | Check | Rejection |
//! |------|-------|-----------|
//! | 1 | Method is `POST` ([`check_method`]) | 400 `bad request` |
//! | 2 | `X-Kapost-Signature` matches the recomputed HMAC | 403 `Invalid signature` |
//! | 3 | Bearer key matches the configured API key | 401 `Invalid API Key` |
//! | 4 | Action is one of the supported [`Action`]s | 405 `Action '<name>' is not supported` |
//!
//! The signature is `sha256=` followed by the lowercase hex HMAC-SHA256 of
//! `platform ++ action ++ body`, keyed with the shared signature secret.
//! Signature and key comparisons are constant-time.

use crate::credentials::Credentials;
use crate::dispatch::Action;
use crate::extract::RequestContext;
use crate::WebhookError;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Prefix of the `X-Kapost-Signature` header value.
pub const SIGNATURE_PREFIX: &str = "sha256=";

type HmacSha256 = Hmac<Sha256>;

/// Reject every method other than `POST`.
pub fn check_method(method: &str) -> Result<(), WebhookError> {
    if method == "POST" {
        Ok(())
    } else {
        Err(WebhookError::MethodNotAllowed)
    }
}

/// Compute the expected `X-Kapost-Signature` value.
///
/// The three inputs are concatenated without a delimiter before hashing.
///
/// # Errors
///
/// Returns [`WebhookError::InvalidSignature`] if `secret` cannot be used as an
/// HMAC key.
pub fn compute_signature(
    secret: &[u8],
    platform: &str,
    action: &str,
    body: &[u8],
) -> Result<String, WebhookError> {
    let mut mac =
        HmacSha256::new_from_slice(secret).map_err(|_| WebhookError::InvalidSignature)?;
    mac.update(platform.as_bytes());
    mac.update(action.as_bytes());
    mac.update(body);

    Ok(format!(
        "{}{}",
        SIGNATURE_PREFIX,
        hex::encode(mac.finalize().into_bytes())
    ))
}

/// Constant-time comparison of two byte strings.
///
/// Uses the `subtle` crate so the running time does not depend on where the
/// inputs first differ. Only the length check short-circuits.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    use subtle::ConstantTimeEq;

    if a.len() != b.len() {
        return false;
    }

    a.ct_eq(b).into()
}

/// Validates signatures and API keys against the process [`Credentials`].
#[derive(Debug, Clone)]
pub struct Authenticator {
    credentials: Arc<Credentials>,
}

impl Authenticator {
    pub fn new(credentials: Arc<Credentials>) -> Self {
        Self { credentials }
    }

    /// Run the signature, API key and action checks in order.
    ///
    /// The method check is not part of this call because it precedes
    /// extraction; see [`check_method`].
    ///
    /// # Returns
    ///
    /// The parsed [`Action`] when every check passes.
    #[instrument(skip_all, fields(platform = %context.platform, action = %context.action))]
    pub fn authenticate(&self, context: &RequestContext) -> Result<Action, WebhookError> {
        self.verify_signature(context)?;
        self.verify_api_key(&context.bearer_key)?;

        let action = context.action.parse::<Action>()?;
        debug!("Request authenticated");
        Ok(action)
    }

    /// Compare the claimed signature with the locally computed one.
    pub fn verify_signature(&self, context: &RequestContext) -> Result<(), WebhookError> {
        if context.claimed_signature.is_empty() {
            warn!("Request carries no signature");
            return Err(WebhookError::InvalidSignature);
        }

        let secret = self.credentials.signature_secret();
        if secret.is_empty() {
            warn!("Signature secret is not configured; rejecting request");
            return Err(WebhookError::InvalidSignature);
        }

        let expected = compute_signature(
            secret.expose_bytes(),
            &context.platform,
            &context.action,
            &context.raw_body,
        )?;

        if constant_time_eq(context.claimed_signature.as_bytes(), expected.as_bytes()) {
            Ok(())
        } else {
            warn!(
                sig_len = context.claimed_signature.len(),
                "Signature does not match"
            );
            Err(WebhookError::InvalidSignature)
        }
    }

    /// Compare the bearer key with the configured API key.
    pub fn verify_api_key(&self, bearer_key: &str) -> Result<(), WebhookError> {
        let api_key = self.credentials.api_key();

        if bearer_key.is_empty() || api_key.is_empty() {
            warn!(
                key_present = !bearer_key.is_empty(),
                key_configured = !api_key.is_empty(),
                "API key missing"
            );
            return Err(WebhookError::InvalidApiKey);
        }

        if constant_time_eq(bearer_key.as_bytes(), api_key.expose_bytes()) {
            Ok(())
        } else {
            warn!("API key does not match");
            Err(WebhookError::InvalidApiKey)
        }
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
