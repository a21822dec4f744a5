//! Progress measurement for bulk transfers.
//!
//! Progress is measured from the outside: the destination directory is
//! polled and the sizes of files matching the product pattern are summed.
//! The transfer itself never reports bytes.

use std::io;
use std::path::{Path, PathBuf};

use crate::fsutil;

/// Progress callback invoked with `(bytes_observed, total_expected)`.
pub type ProgressCallback = Box<dyn Fn(u64, u64) + Send + Sync>;

/// Measures bytes on disk for one destination directory.
#[derive(Debug, Clone)]
pub struct DirectoryProbe {
    dir: PathBuf,
    pattern: &'static str,
}

impl DirectoryProbe {
    /// Probe files in `dir` whose names match `pattern`.
    pub fn new(dir: impl Into<PathBuf>, pattern: &'static str) -> Self {
        Self {
            dir: dir.into(),
            pattern,
        }
    }

    /// Directory being probed.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Current total size of the matching files.
    pub fn measure(&self) -> io::Result<u64> {
        fsutil::matching_bytes(&self.dir, self.pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_probe_counts_only_matching_files() {
        let dir = tempfile::tempdir().unwrap();
        let probe = DirectoryProbe::new(dir.path(), "*.zip");
        assert_eq!(probe.measure().unwrap(), 0);

        fs::write(dir.path().join("a.zip"), vec![0u8; 64]).unwrap();
        fs::write(dir.path().join("footprints.kml"), vec![0u8; 1000]).unwrap();
        assert_eq!(probe.measure().unwrap(), 64);

        fs::write(dir.path().join("b.zip"), vec![0u8; 36]).unwrap();
        assert_eq!(probe.measure().unwrap(), 100);
    }

    #[test]
    fn test_probe_tiff_pattern() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("burst.tiff"), vec![0u8; 10]).unwrap();
        fs::write(dir.path().join("scene.zip"), vec![0u8; 20]).unwrap();

        let probe = DirectoryProbe::new(dir.path(), "*.tiff");
        assert_eq!(probe.dir(), dir.path());
        assert_eq!(probe.measure().unwrap(), 10);
    }
}
