//! Advisory lock gate around config file access
//!
//! Locks are path-identified and non-blocking: acquisition either succeeds
//! immediately or fails with [`BootError::Busy`]. There is no retry and no wait.
//! The lock only protects against overlapping local processes.

use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{BootError, Result};

/// Exclusive hold on a lock file
/// The lock is released when the guard is dropped, including during unwinding
#[derive(Debug)]
pub struct LockGuard {
    path: PathBuf,
    file: File,
}

impl LockGuard {
    /// Try to take the lock at `path` without blocking
    ///
    /// The lock file is created if needed; its parent directory must exist.
    /// The file is never removed, so every instance locks the same inode.
    pub fn try_acquire(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| BootError::io(path, e))?;

        if let Err(e) = FileExt::try_lock_exclusive(&file) {
            if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() {
                debug!(path = %path.display(), "Lock is held elsewhere");
                return Err(BootError::Busy {
                    path: path.to_path_buf(),
                });
            }
            return Err(BootError::io(path, e));
        }

        let mut guard = Self {
            path: path.to_path_buf(),
            file,
        };
        // Holder PID is informational only
        if let Err(e) = guard.write_holder_pid() {
            warn!(path = %path.display(), error = %e, "Failed to record lock holder PID");
        }
        debug!(path = %guard.path.display(), "Acquired lock");
        Ok(guard)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_holder_pid(&mut self) -> std::io::Result<()> {
        self.file.set_len(0)?;
        self.file.seek(SeekFrom::Start(0))?;
        writeln!(self.file, "{}", std::process::id())?;
        self.file.flush()
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        // Release failures never mask the guarded operation's result
        match FileExt::unlock(&self.file) {
            Ok(()) => debug!(path = %self.path.display(), "Released lock"),
            Err(e) => warn!(path = %self.path.display(), error = %e, "Cannot unlock"),
        }
    }
}

/// Run `f` while holding the lock at `lock_path`
///
/// `f` runs exactly once when the lock is acquired. The lock is released on
/// every exit path before this returns.
pub fn with_lock<T, F>(lock_path: &Path, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let _guard = LockGuard::try_acquire(lock_path)?;
    f()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};

    #[test]
    fn test_with_lock_runs_closure_once() {
        let tmp = tempfile::tempdir().unwrap();
        let lock = tmp.path().join("app.lock");
        let mut calls = 0;
        let value = with_lock(&lock, || {
            calls += 1;
            Ok(42)
        })
        .unwrap();
        assert_eq!(value, 42);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_held_lock_is_busy() {
        let tmp = tempfile::tempdir().unwrap();
        let lock = tmp.path().join("app.lock");
        let _held = LockGuard::try_acquire(&lock).unwrap();

        let mut ran = false;
        let err = with_lock(&lock, || {
            ran = true;
            Ok(())
        })
        .unwrap_err();
        assert!(err.is_busy());
        assert!(!ran);
    }

    #[test]
    fn test_lock_released_after_closure() {
        let tmp = tempfile::tempdir().unwrap();
        let lock = tmp.path().join("app.lock");
        with_lock(&lock, || Ok(())).unwrap();
        // Lock file stays but is no longer held
        assert!(lock.exists());
        LockGuard::try_acquire(&lock).unwrap();
    }

    #[test]
    fn test_lock_released_after_error() {
        let tmp = tempfile::tempdir().unwrap();
        let lock = tmp.path().join("app.lock");
        let err = with_lock::<(), _>(&lock, || {
            Err(BootError::Configuration("inner failure".into()))
        })
        .unwrap_err();
        assert!(matches!(err, BootError::Configuration(_)));
        LockGuard::try_acquire(&lock).unwrap();
    }

    #[test]
    fn test_lock_released_after_panic() {
        let tmp = tempfile::tempdir().unwrap();
        let lock = tmp.path().join("app.lock");
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let _ = with_lock::<(), _>(&lock, || panic!("boom"));
        }));
        assert!(result.is_err());
        LockGuard::try_acquire(&lock).unwrap();
    }

    #[test]
    fn test_lock_file_records_pid() {
        let tmp = tempfile::tempdir().unwrap();
        let lock = tmp.path().join("app.lock");
        let guard = LockGuard::try_acquire(&lock).unwrap();
        let contents = std::fs::read_to_string(guard.path()).unwrap();
        assert_eq!(contents.trim(), std::process::id().to_string());
    }

    #[test]
    fn test_missing_parent_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let lock = tmp.path().join("missing/app.lock");
        let err = LockGuard::try_acquire(&lock).unwrap_err();
        assert!(matches!(err, BootError::Io { .. }));
    }
}
