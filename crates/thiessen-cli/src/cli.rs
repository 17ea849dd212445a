use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Thiessen - Catchment polygons from rain-gauge networks
#[derive(Parser, Debug)]
#[command(name = "thiessen")]
#[command(about = "Catchment polygons from rain-gauge networks", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build catchment polygons from a boundary and a gauge layer
    Run(RunArgs),

    /// Show CRS, geometry type and fields of a shapefile layer
    Inspect(InspectArgs),
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Boundary polygon shapefile (.shp)
    #[arg(long)]
    pub boundary: PathBuf,

    /// Rain-gauge point shapefile (.shp)
    #[arg(long)]
    pub gauges: PathBuf,

    /// Output directory (created if missing)
    #[arg(long, short = 'o', default_value = "thiessen_output")]
    pub output: PathBuf,

    /// Gauge field used as station name in the coordinates table
    #[arg(long, default_value = "Name")]
    pub name_field: String,

    /// Gauge field used as the station identifier
    #[arg(long, default_value = "ID")]
    pub id_field: String,

    /// Also write the vertex-coordinates table
    #[arg(long)]
    pub export_coordinates: bool,

    /// Padding factor for the tessellation clipping box
    #[arg(long, default_value = "2.0")]
    pub padding: f64,
}

#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Path to the shapefile (.shp)
    pub path: PathBuf,
}
