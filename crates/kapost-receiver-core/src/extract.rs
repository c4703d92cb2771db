//! Request extraction.
//!
//! Converts a received request into the [`RequestContext`] consumed by the
//! authenticator and dispatcher. Missing headers become empty strings so that
//! every later check fails closed.

use bytes::Bytes;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// Header naming the publishing platform.
pub const PLATFORM_HEADER: &str = "x-kapost-platform";

/// Header naming the requested action.
pub const ACTION_HEADER: &str = "x-kapost-action";

/// Header carrying the `sha256=<hex>` request signature.
pub const SIGNATURE_HEADER: &str = "x-kapost-signature";

/// Header carrying the `Bearer <key>` API credential.
pub const AUTHORIZATION_HEADER: &str = "authorization";

// ============================================================================
// Headers
// ============================================================================

/// Case-insensitive header map.
///
/// Names are lower-cased on insertion. When a header is inserted more than
/// once the first value is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestHeaders {
    values: HashMap<String, String>,
}

impl RequestHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header; ignored if a header with the same name is already present.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.values
            .entry(name.to_ascii_lowercase())
            .or_insert_with(|| value.into());
    }

    /// Look up a header by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for RequestHeaders
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.insert(name.as_ref(), value);
        }
        headers
    }
}

// ============================================================================
// Incoming request
// ============================================================================

/// A webhook request as delivered by the hosting server.
#[derive(Debug, Clone)]
pub struct IncomingRequest {
    /// HTTP method, e.g. `POST`.
    pub method: String,

    /// Request headers.
    pub headers: RequestHeaders,

    /// The request body exactly as received.
    pub raw_body: Bytes,
}

impl IncomingRequest {
    pub fn new(method: impl Into<String>, headers: RequestHeaders, raw_body: impl Into<Bytes>) -> Self {
        Self {
            method: method.into(),
            headers,
            raw_body: raw_body.into(),
        }
    }
}

// ============================================================================
// Request context
// ============================================================================

/// Values extracted from a single webhook request.
///
/// Lives for the duration of one request and is never shared.
#[derive(Clone)]
pub struct RequestContext {
    /// Value of `X-Kapost-Platform`, empty if absent.
    pub platform: String,

    /// Value of `X-Kapost-Action`, empty if absent.
    pub action: String,

    /// Value of `X-Kapost-Signature`, empty if absent.
    pub claimed_signature: String,

    /// `Authorization` value with the `Bearer ` prefix removed, empty if absent.
    pub bearer_key: String,

    /// The request body, used for both the signature and the JSON payload.
    pub raw_body: Bytes,
}

impl RequestContext {
    /// Extract the context from a request, taking ownership of its body.
    pub fn from_request(request: IncomingRequest) -> Self {
        let header = |name: &str| request.headers.get(name).unwrap_or_default().to_string();

        let bearer_key = request
            .headers
            .get(AUTHORIZATION_HEADER)
            .map(|value| strip_bearer_prefix(value).to_string())
            .unwrap_or_default();

        Self {
            platform: header(PLATFORM_HEADER),
            action: header(ACTION_HEADER),
            claimed_signature: header(SIGNATURE_HEADER),
            bearer_key,
            raw_body: request.raw_body,
        }
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("platform", &self.platform)
            .field("action", &self.action)
            .field("claimed_signature", &"<REDACTED>")
            .field("bearer_key", &"<REDACTED>")
            .field("body_len", &self.raw_body.len())
            .finish()
    }
}

/// Remove a leading `Bearer` token followed by whitespace.
///
/// The match is case-sensitive and applied once. Values without the prefix
/// are returned unchanged.
pub fn strip_bearer_prefix(value: &str) -> &str {
    static BEARER_PREFIX: OnceLock<Regex> = OnceLock::new();

    let pattern = BEARER_PREFIX.get_or_init(|| {
        Regex::new(r"^Bearer[\t\n\x0B\x0C\r ]+").expect("bearer prefix pattern is valid")
    });

    match pattern.find(value) {
        Some(prefix) => &value[prefix.end()..],
        None => value,
    }
}

#[cfg(test)]
#[path = "extract_tests.rs"]
mod tests;
