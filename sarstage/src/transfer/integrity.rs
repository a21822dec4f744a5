//! Removal of truncated downloads left behind by an interrupted run.

use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, warn};

use crate::catalog::CatalogProduct;

/// Delete every product file in `dir` that is smaller than expected.
///
/// Files at or above their expected size are kept, as are products with no
/// file on disk. Returns the number of files removed.
pub fn remove_incomplete(dir: &Path, products: &[CatalogProduct]) -> io::Result<usize> {
    let mut removed = 0;

    for product in products {
        let path = dir.join(&product.file_name);
        let actual = match fs::metadata(&path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e),
        };

        if actual < product.expected_bytes {
            warn!(
                file = %path.display(),
                actual,
                expected = product.expected_bytes,
                "Removing incomplete download"
            );
            fs::remove_file(&path)?;
            removed += 1;
        } else {
            debug!(file = %path.display(), actual, "Existing download is complete");
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{Geometry, Point};

    fn product(file_name: &str, expected_bytes: u64) -> CatalogProduct {
        CatalogProduct {
            id: file_name.to_string(),
            footprint: Geometry::Point(Point::new(0.0, 0.0)),
            expected_bytes,
            file_name: file_name.to_string(),
            url: String::new(),
        }
    }

    #[test]
    fn test_truncated_file_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.zip"), vec![0u8; 50]).unwrap();

        let removed = remove_incomplete(dir.path(), &[product("a.zip", 100)]).unwrap();
        assert_eq!(removed, 1);
        assert!(!dir.path().join("a.zip").exists());
    }

    #[test]
    fn test_complete_and_oversized_files_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("exact.zip"), vec![0u8; 100]).unwrap();
        fs::write(dir.path().join("large.zip"), vec![0u8; 150]).unwrap();

        let products = [product("exact.zip", 100), product("large.zip", 100)];
        let removed = remove_incomplete(dir.path(), &products).unwrap();
        assert_eq!(removed, 0);
        assert!(dir.path().join("exact.zip").exists());
        assert!(dir.path().join("large.zip").exists());
    }

    #[test]
    fn test_missing_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.zip"), vec![0u8; 10]).unwrap();

        let products = [product("a.zip", 100), product("b.zip", 20)];
        let removed = remove_incomplete(dir.path(), &products).unwrap();
        assert_eq!(removed, 1);
    }

    #[test]
    fn test_unrelated_files_are_untouched() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.zip"), vec![0u8; 1]).unwrap();

        remove_incomplete(dir.path(), &[product("a.zip", 100)]).unwrap();
        assert!(dir.path().join("notes.zip").exists());
    }
}
