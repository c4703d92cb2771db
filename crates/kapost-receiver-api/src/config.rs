//! Configuration types for the HTTP service

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};

/// Service configuration
///
/// Every field carries a default so a partial (or missing) configuration file
/// still yields a usable configuration. Credentials are deliberately absent;
/// they are read from the environment at startup.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Webhook endpoint settings
    pub webhook: WebhookConfig,

    /// Values reported by the static publisher
    pub publisher: PublisherConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    /// Check the configuration for values the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::invalid("server.host", "must not be empty"));
        }

        if self.server.max_body_size == 0 {
            return Err(ConfigError::invalid(
                "server.max_body_size",
                "must be greater than zero",
            ));
        }

        if self.server.body_read_timeout_seconds == 0 {
            return Err(ConfigError::invalid(
                "server.body_read_timeout_seconds",
                "must be greater than zero",
            ));
        }

        if !self.webhook.endpoint_path.starts_with('/') {
            return Err(ConfigError::invalid(
                "webhook.endpoint_path",
                "must start with '/'",
            ));
        }

        if self.publisher.external_id.is_empty() {
            return Err(ConfigError::invalid(
                "publisher.external_id",
                "must not be empty",
            ));
        }

        if self.publisher.published_url.is_empty() {
            return Err(ConfigError::invalid(
                "publisher.published_url",
                "must not be empty",
            ));
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            _ => Err(ConfigError::invalid(
                "logging.level",
                "must be one of trace, debug, info, warn, error",
            )),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Maximum time allowed for reading a request body, in seconds
    pub body_read_timeout_seconds: u64,

    /// Maximum request size in bytes
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            body_read_timeout_seconds: 10,
            max_body_size: 10 * 1024 * 1024, // 10MB
        }
    }
}

/// Webhook endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WebhookConfig {
    /// Path the App Center posts to
    pub endpoint_path: String,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            endpoint_path: "/".to_string(),
        }
    }
}

/// Publication reported for `publish` and accepted for `republish`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PublisherConfig {
    /// The only external id the receiver knows
    pub external_id: String,

    /// URL reported after publishing; republishing appends `-republish`
    pub published_url: String,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            external_id: "abc33".to_string(),
            published_url: "https://localhost/php-test".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Logging level
    pub level: String,

    /// Enable JSON structured logging
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
