//! Terrasite CLI - Command-line interface
//!
//! Imports terrain boundaries from KML/KMZ archives, computes surface areas,
//! replays drawing sessions and shows the effective configuration.

mod cli;
mod commands;
mod config_loader;
mod output;
mod output_types;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use output::OutputWriter;

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();
    let json = cli.json;

    // Create async runtime
    let runtime = tokio::runtime::Runtime::new()?;

    // Execute the command
    if let Err(e) = runtime.block_on(commands::execute(cli)) {
        OutputWriter::new(json).error(format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
