//! Idempotency guard for the elevation output directory.
//!
//! A directory holding at least [`MIN_ARTIFACTS`] elevation files is a
//! finished run. Anything less is the remains of a crashed run and is
//! removed wholesale; partial output is never reused.

use std::fs;
use std::io;
use std::path::Path;

use tracing::{info, warn};

use super::error::{DemError, DemResult};
use crate::fsutil;

/// File-name pattern of elevation outputs.
pub const ELEVATION_PATTERN: &str = "*dem.wgs84*";

/// Number of matching files that marks a finished run.
pub const MIN_ARTIFACTS: usize = 3;

/// State of an elevation output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// The directory does not exist.
    Absent,
    /// The directory exists with fewer than [`MIN_ARTIFACTS`] outputs.
    Incomplete(usize),
    /// The directory holds a finished output set.
    Complete(usize),
}

/// Classify `dir` without touching it.
pub fn inspect(dir: &Path) -> io::Result<GuardState> {
    if !dir.is_dir() {
        return Ok(GuardState::Absent);
    }
    let count = fsutil::matching_files(dir, ELEVATION_PATTERN)?.len();
    Ok(if count >= MIN_ARTIFACTS {
        GuardState::Complete(count)
    } else {
        GuardState::Incomplete(count)
    })
}

/// Make `dir` ready for a new fetch unless it already holds a finished run.
///
/// An incomplete directory is deleted and recreated; an absent one is
/// created. Returns the state found before any change.
pub fn prepare(dir: &Path) -> DemResult<GuardState> {
    let state = inspect(dir).map_err(|e| DemError::io(dir, e))?;

    match state {
        GuardState::Complete(count) => {
            info!(dir = %dir.display(), artifacts = count, "Elevation products already exist");
            return Ok(state);
        }
        GuardState::Incomplete(count) => {
            warn!(
                dir = %dir.display(),
                artifacts = count,
                "Incomplete elevation directory found, removing and recreating"
            );
            fs::remove_dir_all(dir).map_err(|e| DemError::io(dir, e))?;
        }
        GuardState::Absent => {}
    }

    fs::create_dir_all(dir).map_err(|e| DemError::io(dir, e))?;
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, names: &[&str]) {
        for name in names {
            fs::write(dir.join(name), b"").unwrap();
        }
    }

    #[test]
    fn test_absent_directory_is_created() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("DEM");

        assert_eq!(inspect(&dir).unwrap(), GuardState::Absent);
        assert_eq!(prepare(&dir).unwrap(), GuardState::Absent);
        assert!(dir.is_dir());
    }

    #[test]
    fn test_three_artifacts_are_complete() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("DEM");
        fs::create_dir(&dir).unwrap();
        touch(
            &dir,
            &["elevation.dem.wgs84", "elevation.dem.wgs84.xml", "elevation.dem.wgs84.vrt"],
        );

        assert_eq!(prepare(&dir).unwrap(), GuardState::Complete(3));
        assert_eq!(fsutil::matching_files(&dir, "*").unwrap().len(), 3);
    }

    #[test]
    fn test_two_artifacts_trigger_recreation() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("DEM");
        fs::create_dir(&dir).unwrap();
        touch(&dir, &["elevation.dem.wgs84", "elevation.dem.wgs84.xml", "notes.txt"]);

        assert_eq!(prepare(&dir).unwrap(), GuardState::Incomplete(2));
        assert!(dir.is_dir());
        assert!(fsutil::matching_files(&dir, "*").unwrap().is_empty());
    }

    #[test]
    fn test_empty_directory_is_incomplete() {
        let root = tempfile::tempdir().unwrap();
        assert_eq!(inspect(root.path()).unwrap(), GuardState::Incomplete(0));
    }
}
