//! listprune - reconcile Klaviyo list memberships and delete the leftovers
//!
//! Intended to be re-run until the work queue is empty; every run picks up
//! from the queue the previous one left on disk.

use clap::Parser;
use listprune::commands;
use listprune::config::Config;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const CRATE_TARGETS: [&str; 3] = ["listprune", "listprune_core", "listprune_klaviyo"];

fn init_logging(config: &Config) {
    let level = if config.verbose { "debug" } else { "info" };
    let default_directives = CRATE_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    let (json, pretty) = if config.log_format == "json" {
        (Some(fmt::layer().json()), None)
    } else {
        (None, Some(fmt::layer()))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Parse configuration
    let config = Config::parse();
    init_logging(&config);

    info!(
        "listprune v{} - Klaviyo list reconciliation",
        env!("CARGO_PKG_VERSION")
    );

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return ExitCode::FAILURE;
    }

    if let Err(e) = commands::execute(&config).await {
        error!("{:#}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
