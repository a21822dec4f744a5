//! Elevation tile acquisition.
//!
//! Turns a buffered bounding box into one call of an external elevation
//! fetcher. The output directory is guarded so a finished run is never
//! repeated and a crashed one is never trusted.
//!
//! # Flow
//!
//! ```text
//! guard::prepare ──Complete──> AlreadyComplete
//!       │
//!       └─Absent/Incomplete──> align_outward ──> ElevationTileName
//!                                    │
//!                  WorkingDir::enter(dem_dir) + ElevationFetcher::fetch
//!                                    │
//!                           verify <output_name>*
//! ```

mod error;
mod guard;
pub mod sardem;
mod workdir;

pub use error::{DemError, DemResult, FetchError};
pub use guard::{inspect, prepare, GuardState, ELEVATION_PATTERN, MIN_ARTIFACTS};
pub use sardem::SardemCommand;
pub use workdir::WorkingDir;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::info;

use crate::fsutil;
use crate::geometry::{BoundingBox, ElevationTileName};

/// Elevation data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataSource {
    /// Copernicus DEM.
    #[default]
    Copernicus,
    /// NASA DEM.
    Nasa,
}

impl DataSource {
    /// Code passed to the fetcher.
    pub fn code(&self) -> &'static str {
        match self {
            DataSource::Copernicus => "COP",
            DataSource::Nasa => "NASA",
        }
    }

    /// Human-readable name.
    pub fn description(&self) -> &'static str {
        match self {
            DataSource::Copernicus => "Copernicus DEM",
            DataSource::Nasa => "NASA DEM",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for DataSource {
    type Err = DemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "COP" => Ok(DataSource::Copernicus),
            "NASA" => Ok(DataSource::Nasa),
            _ => Err(DemError::UnknownDataSource(s.to_string())),
        }
    }
}

/// One elevation tile request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElevationRequest {
    /// Whole-degree bounds as west, south, east, north.
    pub bbox: [i32; 4],
    pub data_source: DataSource,
    /// Base name of the files to produce.
    pub output_name: String,
    /// Also write companion metadata files.
    pub emit_metadata: bool,
}

/// External elevation tool.
///
/// Implementations write files named `<output_name>*` into the current
/// working directory.
pub trait ElevationFetcher {
    /// Fetch the tile described by `request`.
    fn fetch(&self, request: &ElevationRequest) -> Result<(), FetchError>;
}

/// Result of an acquisition run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DemOutcome {
    /// The directory already held a finished output set.
    AlreadyComplete,
    /// A new tile was fetched.
    Created {
        tile: ElevationTileName,
        /// Output files, sorted.
        files: Vec<PathBuf>,
    },
}

/// Build the request for a buffered bounding box.
pub fn plan_request(bbox: &BoundingBox, data_source: DataSource) -> ElevationRequest {
    let aligned = bbox.align_outward();
    ElevationRequest {
        bbox: aligned.as_wsen(),
        data_source,
        output_name: aligned.tile_name().output_name(),
        emit_metadata: true,
    }
}

/// Acquire the elevation tile covering `bbox` into `dem_dir`.
///
/// `bbox` must already carry its buffer; it is only aligned outward to
/// whole degrees here. The fetcher runs with `dem_dir` as the working
/// directory, which is restored afterwards whatever the outcome.
pub fn acquire_elevation<F>(
    bbox: &BoundingBox,
    dem_dir: &Path,
    data_source: DataSource,
    fetcher: &F,
) -> DemResult<DemOutcome>
where
    F: ElevationFetcher + ?Sized,
{
    if let GuardState::Complete(_) = guard::prepare(dem_dir)? {
        return Ok(DemOutcome::AlreadyComplete);
    }

    let tile = bbox.align_outward().tile_name();
    let request = plan_request(bbox, data_source);

    info!(
        bbox = ?request.bbox,
        tile = %tile,
        output = %request.output_name,
        source = data_source.description(),
        "Fetching elevation tile"
    );

    {
        let _cwd = WorkingDir::enter(dem_dir).map_err(|e| DemError::io(dem_dir, e))?;
        fetcher.fetch(&request)?;
    }

    let pattern = format!("{}*", request.output_name);
    let files =
        fsutil::matching_files(dem_dir, &pattern).map_err(|e| DemError::io(dem_dir, e))?;
    if files.is_empty() {
        return Err(DemError::MissingArtifacts {
            pattern,
            dir: dem_dir.to_path_buf(),
        });
    }

    info!(tile = %tile, files = files.len(), "Elevation tile created");
    Ok(DemOutcome::Created { tile, files })
}
