//! # Kapost Receiver Service
//!
//! Binary entry point for the Kapost App Center webhook receiver.
//!
//! This executable:
//! - Parses the command line and loads layered configuration
//! - Initializes logging
//! - Reads `API_KEY` and `SIGNATURE_SECRET` from the environment
//! - Starts the HTTP server from kapost-receiver-api
//!
//! Exit codes: 1 bind failure, 2 server failure, 3 configuration error.

mod cli;
mod settings;
mod telemetry;

use clap::Parser;
use cli::Cli;
use kapost_receiver_api::{start_server, LoggingConfig, ServiceError};
use kapost_receiver_core::{Credentials, StaticPublisher, WebhookReceiver};
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let service_config = match settings::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            if telemetry::init_logging(&LoggingConfig::default()).is_err() {
                eprintln!("Failed to load configuration: {e:#}");
            }
            error!(error = %format!("{e:#}"), "Failed to load configuration; aborting");
            std::process::exit(3);
        }
    };

    if let Err(e) = telemetry::init_logging(&service_config.logging) {
        eprintln!("Failed to initialize logging: {e:#}");
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting Kapost receiver"
    );

    let credentials = Credentials::from_env();
    if !credentials.is_complete() {
        warn!("Credentials are incomplete; affected requests will be rejected");
    }

    let publisher = StaticPublisher::new(
        service_config.publisher.external_id.clone(),
        service_config.publisher.published_url.clone(),
    );
    let receiver = Arc::new(WebhookReceiver::new(
        Arc::new(credentials),
        Arc::new(publisher),
    ));

    info!(
        host = %service_config.server.host,
        port = service_config.server.port,
        endpoint = %service_config.webhook.endpoint_path,
        "Starting HTTP server"
    );

    if let Err(e) = start_server(service_config, receiver).await {
        error!(error = %e, "Server stopped with an error");

        let exit_code = match e {
            ServiceError::BindFailed { .. } => 1,
            ServiceError::ServerFailed { .. } => 2,
            ServiceError::Configuration(_) => 3,
        };

        std::process::exit(exit_code);
    }
}
