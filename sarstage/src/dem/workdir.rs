//! Scoped change of the process working directory.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Changes into a directory and restores the previous one on drop.
///
/// Restoration happens on every exit path, including early returns and
/// unwinding panics. The working directory is process-wide state, so only
/// one guard should be live at a time.
#[derive(Debug)]
pub struct WorkingDir {
    original: PathBuf,
}

impl WorkingDir {
    /// Enter `dir`, remembering the current directory.
    pub fn enter(dir: &Path) -> io::Result<Self> {
        let original = env::current_dir()?;
        env::set_current_dir(dir)?;
        debug!(dir = %dir.display(), "Entered working directory");
        Ok(Self { original })
    }

    /// Directory that will be restored.
    pub fn original(&self) -> &Path {
        &self.original
    }
}

impl Drop for WorkingDir {
    fn drop(&mut self) {
        if let Err(e) = env::set_current_dir(&self.original) {
            warn!(
                dir = %self.original.display(),
                error = %e,
                "Failed to restore working directory"
            );
        }
    }
}

/// Serializes tests that change the process working directory.
#[cfg(test)]
pub(crate) static CWD_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic;

    fn lock() -> std::sync::MutexGuard<'static, ()> {
        CWD_LOCK.lock().unwrap_or_else(|e| e.into_inner())
    }

    #[test]
    fn test_enter_and_restore() {
        let _lock = lock();
        let before = env::current_dir().unwrap();
        let dir = tempfile::tempdir().unwrap();

        {
            let guard = WorkingDir::enter(dir.path()).unwrap();
            assert_eq!(guard.original(), before);
            assert_eq!(
                env::current_dir().unwrap().canonicalize().unwrap(),
                dir.path().canonicalize().unwrap()
            );
        }

        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    fn test_restored_after_panic() {
        let _lock = lock();
        let before = env::current_dir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_path_buf();

        let result = panic::catch_unwind(move || {
            let _guard = WorkingDir::enter(&path).unwrap();
            panic!("fetch blew up");
        });

        assert!(result.is_err());
        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    fn test_enter_missing_directory_fails_without_moving() {
        let _lock = lock();
        let before = env::current_dir().unwrap();
        let dir = tempfile::tempdir().unwrap();

        assert!(WorkingDir::enter(&dir.path().join("missing")).is_err());
        assert_eq!(env::current_dir().unwrap(), before);
    }
}
