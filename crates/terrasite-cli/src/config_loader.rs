//! Configuration loading for CLI commands

use anyhow::{Context, Result};
use std::path::Path;
use terrasite_core::config::{CliConfigOverrides, LayeredConfig};

use crate::cli::OverrideArgs;

/// Build the layered configuration: defaults, optional file, environment, flags
pub fn load_config(path: Option<&Path>, overrides: OverrideArgs) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults();

    if let Some(path) = path {
        config = config
            .load_from_file(path)
            .with_context(|| format!("Failed to load configuration file {}", path.display()))?;
    }

    let mut config = config.load_from_env();
    config.update_from_cli(to_core_overrides(overrides)?);
    Ok(config)
}

fn to_core_overrides(args: OverrideArgs) -> Result<CliConfigOverrides> {
    if let Some(n) = args.min_drawing_vertices {
        anyhow::ensure!(n >= 3, "--min-drawing-vertices must be at least 3");
    }
    if let Some(n) = args.min_import_vertices {
        anyhow::ensure!(n >= 3, "--min-import-vertices must be at least 3");
    }
    if let Some(m) = args.meters_per_degree {
        anyhow::ensure!(m.is_finite() && m > 0.0, "--meters-per-degree must be positive");
    }

    Ok(CliConfigOverrides {
        min_drawing_vertices: args.min_drawing_vertices,
        min_import_vertices: args.min_import_vertices,
        meters_per_degree: args.meters_per_degree,
        placeholder_prefix: args.placeholder_prefix,
    })
}
