//! Layered service configuration loading.
//!
//! Sources, later ones overriding earlier ones:
//!
//! 1. `/etc/kapost-receiver/service.yaml` (optional)
//! 2. `./config/service.yaml` (optional)
//! 3. The file given by `--config` or `KAPOST_RECEIVER_CONFIG` (required when set)
//! 4. Environment variables prefixed `KR__`, e.g. `KR__SERVER__PORT=9090`
//! 5. The `PORT` environment variable, for `server.port` only
//! 6. Command-line flags
//!
//! Every field of [`ServiceConfig`] has a default, so running with no files
//! and no variables is valid. A malformed file or a value that cannot be
//! coerced to its field type is an error.

use crate::cli::Cli;
use anyhow::Context;
use kapost_receiver_api::ServiceConfig;
use std::path::Path;

pub const SYSTEM_CONFIG_FILE: &str = "/etc/kapost-receiver/service";
pub const LOCAL_CONFIG_FILE: &str = "config/service";
pub const CONFIG_ENV_PREFIX: &str = "KR";
pub const PORT_VAR: &str = "PORT";

/// Resolve the service configuration for this process.
pub fn load(cli: &Cli) -> anyhow::Result<ServiceConfig> {
    let mut config = load_layers(
        &[SYSTEM_CONFIG_FILE, LOCAL_CONFIG_FILE],
        cli.config.as_deref(),
    )?;

    apply_port_variable(&mut config, std::env::var(PORT_VAR).ok().as_deref())?;
    apply_cli_overrides(&mut config, cli);

    config
        .validate()
        .context("Service configuration is invalid")?;

    Ok(config)
}

/// Merge the optional YAML `base_files`, the `explicit` file and the `KR__`
/// environment variables into a [`ServiceConfig`].
///
/// Base file names are given without extension. The explicit file's format
/// follows its extension.
pub fn load_layers(base_files: &[&str], explicit: Option<&Path>) -> anyhow::Result<ServiceConfig> {
    let mut builder = config::Config::builder();

    for name in base_files {
        builder = builder.add_source(
            config::File::with_name(name)
                .required(false)
                .format(config::FileFormat::Yaml),
        );
    }

    if let Some(path) = explicit {
        builder = builder.add_source(config::File::from(path).required(true));
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix(CONFIG_ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    settings
        .try_deserialize()
        .context("Could not deserialize service configuration")
}

/// Apply the `PORT` variable. Blank values are ignored.
pub fn apply_port_variable(config: &mut ServiceConfig, value: Option<&str>) -> anyhow::Result<()> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(());
    };

    config.server.port = value
        .parse()
        .with_context(|| format!("{PORT_VAR} must be a port number, got '{value}'"))?;

    Ok(())
}

pub fn apply_cli_overrides(config: &mut ServiceConfig, cli: &Cli) {
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }

    if cli.json_logs {
        config.logging.json_format = true;
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
