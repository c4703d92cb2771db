//! Common test utilities for kapost-receiver integration tests
//!
//! This module provides:
//! - Router builders wired with known credentials
//! - A signed webhook request builder
//! - A helper that sends a request and decodes the JSON response

use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use kapost_receiver_api::{create_router, AppState, ServiceConfig};
use kapost_receiver_core::{compute_signature, Credentials, StaticPublisher, WebhookReceiver};
use std::sync::Arc;
use tower::ServiceExt;

pub const API_KEY: &str = "test-api-key";
pub const SIGNATURE_SECRET: &str = "test-signature-secret";
pub const PLATFORM: &str = "wp";

// ============================================================================
// App builders
// ============================================================================

/// Router with the standard test credentials and default configuration.
pub fn test_app() -> Router {
    test_app_with(Credentials::new(API_KEY, SIGNATURE_SECRET), ServiceConfig::default())
}

#[allow(dead_code)]
pub fn test_app_with_credentials(credentials: Credentials) -> Router {
    test_app_with(credentials, ServiceConfig::default())
}

pub fn test_app_with(credentials: Credentials, config: ServiceConfig) -> Router {
    let receiver = Arc::new(WebhookReceiver::new(
        Arc::new(credentials),
        Arc::new(StaticPublisher::default()),
    ));
    create_router(AppState::new(config, receiver))
}

// ============================================================================
// Request builder
// ============================================================================

/// Builds a webhook request, signed with [`SIGNATURE_SECRET`] unless a
/// signature is set explicitly.
#[derive(Debug, Clone)]
pub struct WebhookRequestBuilder {
    method: String,
    uri: String,
    platform: Option<String>,
    action: Option<String>,
    body: Vec<u8>,
    secret: String,
    signature: Option<String>,
    authorization: Option<String>,
}

#[allow(dead_code)]
impl WebhookRequestBuilder {
    pub fn new(action: &str) -> Self {
        Self {
            method: "POST".to_string(),
            uri: "/".to_string(),
            platform: Some(PLATFORM.to_string()),
            action: Some(action.to_string()),
            body: b"{}".to_vec(),
            secret: SIGNATURE_SECRET.to_string(),
            signature: None,
            authorization: Some(format!("Bearer {API_KEY}")),
        }
    }

    pub fn method(mut self, method: &str) -> Self {
        self.method = method.to_string();
        self
    }

    pub fn uri(mut self, uri: &str) -> Self {
        self.uri = uri.to_string();
        self
    }

    pub fn platform(mut self, platform: Option<&str>) -> Self {
        self.platform = platform.map(str::to_string);
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Secret used to compute the signature header.
    pub fn signing_secret(mut self, secret: &str) -> Self {
        self.secret = secret.to_string();
        self
    }

    /// Send `signature` verbatim instead of a computed one.
    pub fn signature(mut self, signature: &str) -> Self {
        self.signature = Some(signature.to_string());
        self
    }

    /// Set the raw `Authorization` value, or omit the header with `None`.
    pub fn authorization(mut self, value: Option<&str>) -> Self {
        self.authorization = value.map(str::to_string);
        self
    }

    /// The signature a correct client would send for this request.
    pub fn computed_signature(&self) -> String {
        compute_signature(
            self.secret.as_bytes(),
            self.platform.as_deref().unwrap_or(""),
            self.action.as_deref().unwrap_or(""),
            &self.body,
        )
        .unwrap()
    }

    pub fn build(self) -> Request<Body> {
        let signature = self
            .signature
            .clone()
            .unwrap_or_else(|| self.computed_signature());

        let mut builder = Request::builder()
            .method(self.method.as_str())
            .uri(self.uri.as_str())
            .header("X-Kapost-Signature", signature);

        if let Some(platform) = &self.platform {
            builder = builder.header("X-Kapost-Platform", platform.as_str());
        }
        if let Some(action) = &self.action {
            builder = builder.header("X-Kapost-Action", action.as_str());
        }
        if let Some(authorization) = &self.authorization {
            builder = builder.header("Authorization", authorization.as_str());
        }

        builder.body(Body::from(self.body)).unwrap()
    }
}

// ============================================================================
// Response helpers
// ============================================================================

/// Decoded response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

#[allow(dead_code)]
impl TestResponse {
    pub fn error_message(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }

    pub fn content_type(&self) -> &str {
        self.headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }
}

pub async fn send(app: Router, request: Request<Body>) -> TestResponse {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap();

    TestResponse {
        status,
        headers,
        body,
    }
}
