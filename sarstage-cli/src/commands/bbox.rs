//! `sarstage bbox` - print the buffered bounding box of an overlay.

use std::path::Path;

use sarstage::geometry::BufferDegrees;
use sarstage::overlay::extract_bbox;

use crate::error::CliError;

/// Run the bounding box command.
pub fn run(kml: &Path, delta_lat: f64, delta_lon: f64) -> Result<(), CliError> {
    let bbox = extract_bbox(kml, BufferDegrees::new(delta_lat, delta_lon))?;
    println!("{}", bbox.to_snwe_string());
    Ok(())
}
