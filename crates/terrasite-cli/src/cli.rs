use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Terrasite - Terrain boundary drawing, import and area tools
#[derive(Parser, Debug)]
#[command(name = "terrasite")]
#[command(about = "Terrain boundary drawing, import and area tools", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// TOML configuration file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: OverrideArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Per-invocation configuration overrides
#[derive(Args, Debug, Default)]
pub struct OverrideArgs {
    /// Minimum vertices before a drawn polygon can be closed
    #[arg(long, global = true, value_name = "N")]
    pub min_drawing_vertices: Option<usize>,

    /// Minimum ring vertices for an imported polygon
    #[arg(long, global = true, value_name = "N")]
    pub min_import_vertices: Option<usize>,

    /// Meters per degree used for area conversion
    #[arg(long, global = true, value_name = "METERS")]
    pub meters_per_degree: Option<f64>,

    /// Name prefix for unnamed imported polygons
    #[arg(long, global = true, value_name = "PREFIX")]
    pub placeholder_prefix: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract terrain candidates from a KML or KMZ file
    Import(ImportArgs),

    /// Compute the surface area of a polygon
    Area(AreaArgs),

    /// Replay a recorded drawing session
    Draw(DrawArgs),

    /// Show effective configuration and where each value came from
    Config,
}

#[derive(Parser, Debug)]
pub struct ImportArgs {
    /// Path to the .kml or .kmz file
    pub path: PathBuf,

    /// Promote the candidate at this position (1-based) to a terrain draft
    #[arg(long, value_name = "N")]
    pub select: Option<usize>,
}

#[derive(Parser, Debug)]
pub struct AreaArgs {
    /// JSON file holding an array of {"lat", "lng"} points
    #[arg(long, value_name = "FILE", conflicts_with = "point")]
    pub file: Option<PathBuf>,

    /// A vertex as LAT,LNG; repeat in ring order
    #[arg(long, value_name = "LAT,LNG", allow_hyphen_values = true)]
    pub point: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct DrawArgs {
    /// JSON file holding an array of pointer events
    pub events: PathBuf,
}
