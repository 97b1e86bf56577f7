//! Shard leases
//!
//! A `ShardLease` is an advisory claim over one shard file, realized as a
//! sidecar `<shard>.lock` file created with `create_new`. Holding the lease
//! keeps the writer and the reader off the same file at the same time:
//! whichever side fails to claim a shard simply moves on to the next
//! candidate (or skips the file entirely).
//!
//! Locks left behind by a crashed process are swept at store startup;
//! there is exactly one writer process per cache directory.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use crate::path::{is_lock_file, LOCK_SUFFIX};

/// Advisory claim over one shard file
///
/// Released on drop by removing the sidecar lock file.
#[derive(Debug)]
pub struct ShardLease {
    /// The claimed shard file
    path: PathBuf,

    /// The sidecar lock file marking the claim
    lock_path: PathBuf,
}

impl ShardLease {
    /// Try to claim the shard at `path`
    ///
    /// Returns `None` if another holder has the shard claimed or the lock
    /// file cannot be created.
    pub fn claim(path: &Path) -> Option<Self> {
        let lock_path = lock_path_for(path);

        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
        {
            Ok(_) => Some(Self {
                path: path.to_path_buf(),
                lock_path,
            }),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => None,
            Err(e) => {
                tracing::debug!(path = %lock_path.display(), error = %e, "shard claim failed");
                None
            }
        }
    }

    /// Get the claimed shard path
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ShardLease {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.lock_path) {
            tracing::warn!(path = %self.lock_path.display(), error = %e, "failed to release shard lease");
        }
    }
}

/// Lock file path for a shard
fn lock_path_for(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(LOCK_SUFFIX);
    PathBuf::from(os)
}

/// Remove lock files left behind by a previous process
///
/// Returns the number of locks swept.
pub fn sweep_stale_locks(dir: &Path) -> io::Result<usize> {
    let mut swept = 0;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if is_lock_file(&name.to_string_lossy()) {
            fs::remove_file(entry.path())?;
            swept += 1;
        }
    }
    Ok(swept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_claim_and_release() {
        let dir = TempDir::new().unwrap();
        let shard = dir.path().join("events0");

        let lease = ShardLease::claim(&shard).expect("first claim succeeds");
        assert_eq!(lease.path(), shard);
        assert!(dir.path().join("events0.lock").exists());

        drop(lease);
        assert!(!dir.path().join("events0.lock").exists());
    }

    #[test]
    fn test_contended_claim_fails() {
        let dir = TempDir::new().unwrap();
        let shard = dir.path().join("events0");

        let _held = ShardLease::claim(&shard).unwrap();
        assert!(ShardLease::claim(&shard).is_none());
    }

    #[test]
    fn test_claim_available_again_after_release() {
        let dir = TempDir::new().unwrap();
        let shard = dir.path().join("events0");

        drop(ShardLease::claim(&shard).unwrap());
        assert!(ShardLease::claim(&shard).is_some());
    }

    #[test]
    fn test_sweep_stale_locks() {
        let dir = TempDir::new().unwrap();
        std::fs::File::create(dir.path().join("events0.lock")).unwrap();
        std::fs::File::create(dir.path().join("wifi1.lock")).unwrap();
        std::fs::File::create(dir.path().join("events0")).unwrap();

        let swept = sweep_stale_locks(dir.path()).unwrap();
        assert_eq!(swept, 2);
        assert!(dir.path().join("events0").exists());
        assert!(!dir.path().join("events0.lock").exists());
    }
}
