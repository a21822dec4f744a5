//! `sarstage dem` - fetch the elevation tile for the latest overlay.

use std::path::Path;
use std::sync::atomic::Ordering;

use console::style;
use sarstage::dem::{DemError, DemOutcome, SardemCommand};
use sarstage::pipeline::{self, PipelineError};

use super::common::{banner, field, flag_on_interrupt, load_config};
use crate::error::CliError;

/// Run the elevation command.
pub fn run(config_path: &Path) -> Result<(), CliError> {
    let config = load_config(config_path)?;

    banner(&format!("Elevation tile for '{}'", config.name));
    field("Data source", config.dem.data_source.description());
    field("Destination", config.dem_dir().display());
    println!();

    let interrupted = flag_on_interrupt()?;
    let result = pipeline::run_dem(&config, &SardemCommand::new());

    let summary = match result {
        Err(PipelineError::Dem(DemError::Interrupted)) => return Err(CliError::Interrupted),
        Err(_) if interrupted.load(Ordering::SeqCst) => return Err(CliError::Interrupted),
        other => other?,
    };

    if let Some(bbox) = summary.bbox {
        field("Bounding box", bbox.to_snwe_string());
    }

    match summary.outcome {
        DemOutcome::AlreadyComplete => {
            println!(
                "{}",
                style("Elevation directory already complete, nothing to do.").green()
            );
        }
        DemOutcome::Created { tile, files } => {
            field("Tile", tile.as_str());
            for file in &files {
                println!("  {}", file.display());
            }
            println!();
            println!("{}", style("Elevation tile ready.").green().bold());
        }
    }
    Ok(())
}
