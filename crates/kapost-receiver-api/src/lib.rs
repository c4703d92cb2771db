//! # Kapost Receiver HTTP Service
//!
//! HTTP server exposing the single Kapost App Center webhook endpoint.
//!
//! The handler only performs boundary work: it rejects non-POST methods
//! before touching the body, reads the body once under a size limit and a
//! timeout, and hands the request to the
//! [`WebhookReceiver`](kapost_receiver_core::WebhookReceiver). Authentication
//! and dispatch live in `kapost-receiver-core`.

pub mod config;
pub mod errors;
pub mod responses;

pub use config::{LoggingConfig, PublisherConfig, ServerConfig, ServiceConfig, WebhookConfig};
pub use errors::{ConfigError, ServiceError, WebhookHandlerError};
pub use responses::WebhookReply;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Json, Response},
    routing::any,
    Router,
};
use bytes::Bytes;
use kapost_receiver_core::{check_method, IncomingRequest, RequestHeaders, WebhookReceiver};
use std::{sync::Arc, time::Duration};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument, warn};

const CORRELATION_ID_HEADER: &str = "x-correlation-id";

// ============================================================================
// Application State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration for the service
    pub config: Arc<ServiceConfig>,

    /// Authenticates and dispatches webhook requests
    pub receiver: Arc<WebhookReceiver>,
}

impl AppState {
    pub fn new(config: ServiceConfig, receiver: Arc<WebhookReceiver>) -> Self {
        Self {
            config: Arc::new(config),
            receiver,
        }
    }
}

// ============================================================================
// HTTP Server
// ============================================================================

/// Create the HTTP router.
///
/// The webhook path accepts every method so that the receiver can answer
/// non-POST requests with its own `400` response.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(&state.config.webhook.endpoint_path, any(handle_webhook))
        .fallback(handle_not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(request_logging_middleware))
                .into_inner(),
        )
        .with_state(state)
}

/// Start HTTP server
///
/// Serves until SIGINT or SIGTERM is received, then stops accepting
/// connections and lets in-flight requests finish.
pub async fn start_server(
    config: ServiceConfig,
    receiver: Arc<WebhookReceiver>,
) -> Result<(), ServiceError> {
    config.validate()?;

    let address = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, receiver);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|e| ServiceError::BindFailed {
            address: address.clone(),
            message: e.to_string(),
        })?;

    info!(address = %address, "Starting HTTP server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServiceError::ServerFailed {
            message: e.to_string(),
        })?;

    info!("HTTP server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        },
    }
}

// ============================================================================
// Webhook Handler
// ============================================================================

/// Handle a Kapost App Center webhook request.
///
/// 1. Reject non-POST methods without reading the body.
/// 2. Reject bodies whose declared length exceeds the limit.
/// 3. Read the body once, bounded by size and time.
/// 4. Hand the request to the receiver and render its result.
#[instrument(skip_all, fields(method = %method))]
pub async fn handle_webhook(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Body,
) -> Result<WebhookReply, WebhookHandlerError> {
    check_method(method.as_str())?;

    let server = &state.config.server;

    if let Some(size) = declared_content_length(&headers) {
        if size > server.max_body_size as u64 {
            return Err(WebhookHandlerError::PayloadTooLarge {
                size,
                max_size: server.max_body_size,
            });
        }
    }

    let raw_body = read_body(
        body,
        server.max_body_size,
        Duration::from_secs(server.body_read_timeout_seconds),
    )
    .await?;

    let request = IncomingRequest::new(method.as_str(), to_request_headers(&headers), raw_body);
    let result = state.receiver.handle(request).await;

    Ok(WebhookReply(result))
}

async fn handle_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "not found" })),
    )
        .into_response()
}

/// Read the whole body, bounded by `limit` bytes and `timeout`.
async fn read_body(body: Body, limit: usize, timeout: Duration) -> Result<Bytes, WebhookHandlerError> {
    match tokio::time::timeout(timeout, axum::body::to_bytes(body, limit)).await {
        Ok(Ok(bytes)) => Ok(bytes),
        Ok(Err(e)) => Err(WebhookHandlerError::PayloadUnreadable {
            message: e.to_string(),
        }),
        Err(_) => Err(WebhookHandlerError::Timeout {
            seconds: timeout.as_secs(),
        }),
    }
}

fn declared_content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
}

/// Convert HTTP headers, keeping any value that is valid UTF-8.
///
/// Values that are not UTF-8 are dropped and read as absent later on.
fn to_request_headers(headers: &HeaderMap) -> RequestHeaders {
    headers
        .iter()
        .filter_map(|(name, value)| {
            std::str::from_utf8(value.as_bytes())
                .ok()
                .map(|v| (name.as_str(), v))
        })
        .collect()
}

// ============================================================================
// Middleware
// ============================================================================

/// Request logging middleware with correlation ID tracking
///
/// Reuses the caller's `x-correlation-id` or generates one, echoes it on the
/// response and logs one completion event per request.
async fn request_logging_middleware(
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    let start = std::time::Instant::now();
    let method = request.method().clone();

    let correlation_id = request
        .headers()
        .get(CORRELATION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        response.headers_mut().insert(CORRELATION_ID_HEADER, value);
    }

    let status = response.status();
    let duration_ms = start.elapsed().as_millis() as u64;

    if status.is_server_error() {
        error!(%correlation_id, %method, %status, duration_ms, "Request failed");
    } else if status.is_client_error() {
        warn!(%correlation_id, %method, %status, duration_ms, "Request rejected");
    } else {
        info!(%correlation_id, %method, %status, duration_ms, "Request completed");
    }

    response
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
