//! # Tactile Relay CLI
//!
//! Command-line entry point.
//!
//! Provides:
//! - Trace replay, synthetic generation, relaying and monitoring
//! - Configuration loading with flag/environment overrides
//! - Ctrl+C / SIGTERM shutdown

mod cli;
mod commands;
mod settings;

use anyhow::Result;
use clap::Parser;
use observability::ObservabilityConfig;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_generate, run_monitor, run_relay, run_stream, run_validate};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_observability(&cli)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Tactile relay starting"
    );

    let result = match &cli.command {
        Commands::Stream(args) => run_stream(args).await,
        Commands::Generate(args) => run_generate(args).await,
        Commands::Relay(args) => run_relay(args).await,
        Commands::Monitor(args) => run_monitor(args).await,
        Commands::Validate(args) => run_validate(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %format!("{e:#}"), "Command failed");
    }

    result
}

/// Initialize tracing and the optional metrics exporter
fn init_observability(cli: &Cli) -> Result<()> {
    let default_log_level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    observability::init_with_config(ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_port: (cli.metrics_port != 0).then_some(cli.metrics_port),
        default_log_level: default_log_level.to_string(),
    })
}
