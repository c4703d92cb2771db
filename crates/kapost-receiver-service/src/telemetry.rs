//! Logging initialisation.

use kapost_receiver_api::LoggingConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOGGED_TARGETS: [&str; 4] = [
    "kapost_receiver",
    "kapost_receiver_core",
    "kapost_receiver_api",
    "tower_http",
];

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.level)));

    let registry = tracing_subscriber::registry().with(filter);

    if config.json_format {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()?;
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()?;
    }

    Ok(())
}

/// Filter directives enabling `level` for this service's crates.
pub fn default_directives(level: &str) -> String {
    let level = level.to_lowercase();
    LOGGED_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
#[path = "telemetry_tests.rs"]
mod tests;
