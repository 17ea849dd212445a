//! Thiessen CLI - Command-line interface
//!
//! This is the command-line adapter for the Thiessen catchment workflow.

mod cli;
mod commands;
mod output;
mod output_types;
mod progress;

use anyhow::Result;
use clap::Parser;
use cli::Cli;

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    commands::execute(cli)?;

    Ok(())
}
