//! Command-line arguments for the receiver binary.

use clap::Parser;
use std::path::PathBuf;

/// Kapost receiver - Kapost App Center webhook endpoint
#[derive(Debug, Parser)]
#[command(name = "kapost-receiver")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Receives and authenticates Kapost App Center webhooks")]
#[command(
    long_about = "Serves a single webhook endpoint that verifies Kapost request signatures and API keys \
                  and answers the auth, publish and republish actions. The API key and signature secret \
                  are read from the API_KEY and SIGNATURE_SECRET environment variables."
)]
pub struct Cli {
    /// Configuration file path (YAML, TOML or JSON)
    #[arg(short, long, env = "KAPOST_RECEIVER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Port to bind the HTTP server, overrides every other source
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Logging level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long)]
    pub json_logs: bool,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
