//! Process-wide credentials.
//!
//! [`Credentials`] are built once at startup and handed to the
//! [`Authenticator`](crate::Authenticator). Nothing reads the environment
//! while a request is in flight.

use std::fmt;
use tracing::warn;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Environment variable holding the API key expected in `Authorization`.
pub const API_KEY_VAR: &str = "API_KEY";

/// Environment variable holding the HMAC signature secret.
pub const SIGNATURE_SECRET_VAR: &str = "SIGNATURE_SECRET";

/// Secure container for secret values.
///
/// The value is wiped from memory on drop and never included in Debug output.
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct SecretValue {
    inner: String,
}

impl SecretValue {
    pub fn from_string(value: String) -> Self {
        Self { inner: value }
    }

    /// Get the secret as a string slice (only for immediate use).
    pub fn expose_secret(&self) -> &str {
        &self.inner
    }

    pub fn expose_bytes(&self) -> &[u8] {
        self.inner.as_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretValue")
            .field("length", &self.len())
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// The API key and signature secret shared with the publishing platform.
///
/// Read-only after construction. An empty value is allowed but makes every
/// request fail the corresponding check.
#[derive(Clone, Debug, Default)]
pub struct Credentials {
    api_key: SecretValue,
    signature_secret: SecretValue,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, signature_secret: impl Into<String>) -> Self {
        Self {
            api_key: SecretValue::from_string(api_key.into()),
            signature_secret: SecretValue::from_string(signature_secret.into()),
        }
    }

    /// Load credentials from `API_KEY` and `SIGNATURE_SECRET`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load credentials through an arbitrary variable lookup.
    ///
    /// Missing variables produce empty secrets and a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR).unwrap_or_default();
        let signature_secret = lookup(SIGNATURE_SECRET_VAR).unwrap_or_default();

        if api_key.is_empty() {
            warn!(
                variable = API_KEY_VAR,
                "API key is not configured; every request will be rejected with 401"
            );
        }
        if signature_secret.is_empty() {
            warn!(
                variable = SIGNATURE_SECRET_VAR,
                "Signature secret is not configured; every request will be rejected with 403"
            );
        }

        Self::new(api_key, signature_secret)
    }

    pub fn api_key(&self) -> &SecretValue {
        &self.api_key
    }

    pub fn signature_secret(&self) -> &SecretValue {
        &self.signature_secret
    }

    /// `true` when both values are non-empty, i.e. authentication can succeed.
    pub fn is_complete(&self) -> bool {
        !self.api_key.is_empty() && !self.signature_secret.is_empty()
    }
}

#[cfg(test)]
#[path = "credentials_tests.rs"]
mod tests;
