//! Small filesystem helpers shared by the pipeline stages.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use glob::Pattern;

/// Regular files directly inside `dir` whose name matches `pattern`.
///
/// The result is sorted by path. A missing directory yields an empty list.
pub fn matching_files(dir: &Path, pattern: &str) -> io::Result<Vec<PathBuf>> {
    let pattern =
        Pattern::new(pattern).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if pattern.matches(&entry.file_name().to_string_lossy()) {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Total size in bytes of the files matching `pattern` inside `dir`.
///
/// Files that disappear between listing and stat are ignored.
pub fn matching_bytes(dir: &Path, pattern: &str) -> io::Result<u64> {
    Ok(matching_files(dir, pattern)?
        .iter()
        .filter_map(|path| fs::metadata(path).ok())
        .map(|meta| meta.len())
        .sum())
}
