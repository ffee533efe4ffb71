//! Command implementations

mod area;
mod config;
mod draw;
mod import;

use crate::cli::{Cli, Commands};
use crate::config_loader::load_config;
use crate::output::OutputWriter;
use anyhow::Result;

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let config = load_config(cli.config.as_deref(), cli.overrides)?;
    tracing::debug!(command = ?cli.command, "Executing command");

    match cli.command {
        Commands::Import(args) => import::execute(args, &config, &output).await,
        Commands::Area(args) => area::execute(args, &config, &output),
        Commands::Draw(args) => draw::execute(args, &config, &output),
        Commands::Config => config::execute(&config, &output),
    }
}
