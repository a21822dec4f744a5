//! CLI subcommands.

mod bbox;
mod common;
mod dem;
mod download;

use std::path::PathBuf;

use clap::Subcommand;
use sarstage::geometry::DEFAULT_BUFFER_DEGREES;

use crate::error::CliError;

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Search the catalog, write the footprint overlay and download the products
    Download {
        /// Project configuration file
        config: PathBuf,
    },

    /// Download the elevation tile covering the latest footprint overlay
    Dem {
        /// Project configuration file
        config: PathBuf,
    },

    /// Print the buffered bounding box of an overlay as SNWE
    Bbox {
        /// Overlay (KML) file
        kml: PathBuf,

        /// Latitude buffer in degrees
        #[arg(long, default_value_t = DEFAULT_BUFFER_DEGREES)]
        delta_lat: f64,

        /// Longitude buffer in degrees
        #[arg(long, default_value_t = DEFAULT_BUFFER_DEGREES)]
        delta_lon: f64,
    },
}

/// Run a subcommand.
pub fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Download { config } => download::run(&config),
        Commands::Dem { config } => dem::run(&config),
        Commands::Bbox {
            kml,
            delta_lat,
            delta_lon,
        } => bbox::run(&kml, delta_lat, delta_lon),
    }
}
