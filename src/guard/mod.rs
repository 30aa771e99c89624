//! Rotation guard — mutual exclusion for the rotation workflow.
//!
//! Two rotations running at once would corrupt every stored credential
//! beyond recovery, so the coordinator takes a guard before touching
//! anything.  The file-backed implementation uses `O_EXCL` creation of
//! a lock file carrying the holder id and an acquisition timestamp;
//! the timestamp lets an operator recognize a lock left behind by a
//! crashed rotation as stale and force-clear it (`rotavault unlock`).

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, RotaVaultError};

/// Observable state of a rotation lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockStatus {
    Free,
    Held {
        holder: String,
        acquired_at: DateTime<Utc>,
        /// True when the lock is older than the configured stale
        /// timeout — likely left behind by a crashed rotation.
        stale: bool,
    },
}

/// Mutual-exclusion contract the coordinator depends on.
pub trait RotationLock {
    /// Non-blocking acquire.  Returns `false` (not an error) if the
    /// lock is already held — the caller decides whether that is
    /// benign or fatal.
    fn acquire(&self, holder: &str) -> Result<bool>;

    /// Idempotent release.  Releasing a lock held by someone else is a
    /// no-op, not an error (defensive against double-release in
    /// cleanup paths).
    fn release(&self, holder: &str) -> Result<()>;

    /// Current lock state, for `status` display and error messages.
    fn status(&self) -> Result<LockStatus>;
}

/// Contents of the lock file.
#[derive(Debug, Serialize, Deserialize)]
struct LockFile {
    holder: String,
    acquired_at: DateTime<Utc>,
}

/// File-backed rotation lock.
pub struct FileLock {
    path: PathBuf,
    stale_after: Duration,
}

impl FileLock {
    /// `path` is conventionally `<store_dir>/<name>.lock`.
    pub fn new(path: PathBuf, stale_after_secs: u64) -> Self {
        Self {
            path,
            stale_after: Duration::seconds(stale_after_secs as i64),
        }
    }

    /// Remove the lock file unconditionally.
    ///
    /// Operator escape hatch for a lock left behind by a crash; never
    /// call this while a rotation might genuinely be running.
    pub fn force_release(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn read_lock_file(&self) -> Result<Option<LockFile>> {
        let data = match std::fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        // A crash between `create_new` and `write_all` leaves an empty
        // or partial lock file.  Surface it as an ancient unknown
        // holder so `status` reports it stale and `unlock` can clear it.
        let lock = serde_json::from_slice(&data).unwrap_or(LockFile {
            holder: "unknown".to_string(),
            acquired_at: DateTime::<Utc>::MIN_UTC,
        });
        Ok(Some(lock))
    }
}

impl RotationLock for FileLock {
    fn acquire(&self, holder: &str) -> Result<bool> {
        // O_EXCL creation is the atomic check-and-take: exactly one
        // process can win, even across machines sharing a filesystem.
        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        let contents = serde_json::to_vec(&LockFile {
            holder: holder.to_string(),
            acquired_at: Utc::now(),
        })
        .map_err(|e| RotaVaultError::SerializationError(format!("lock file: {e}")))?;
        file.write_all(&contents)?;

        Ok(true)
    }

    fn release(&self, holder: &str) -> Result<()> {
        match self.read_lock_file()? {
            Some(lock) if lock.holder == holder => self.force_release(),
            // Held by someone else or already free: no-op.
            _ => Ok(()),
        }
    }

    fn status(&self) -> Result<LockStatus> {
        match self.read_lock_file()? {
            None => Ok(LockStatus::Free),
            Some(lock) => {
                let stale = Utc::now() - lock.acquired_at > self.stale_after;
                Ok(LockStatus::Held {
                    holder: lock.holder,
                    acquired_at: lock.acquired_at,
                    stale,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn lock_in(dir: &TempDir) -> FileLock {
        FileLock::new(dir.path().join("main.lock"), 3600)
    }

    #[test]
    fn acquire_then_release() {
        let dir = TempDir::new().unwrap();
        let lock = lock_in(&dir);

        assert!(lock.acquire("worker-1").unwrap());
        assert!(matches!(
            lock.status().unwrap(),
            LockStatus::Held { stale: false, .. }
        ));

        lock.release("worker-1").unwrap();
        assert_eq!(lock.status().unwrap(), LockStatus::Free);
    }

    #[test]
    fn second_acquire_fails_without_error() {
        let dir = TempDir::new().unwrap();
        let lock = lock_in(&dir);

        assert!(lock.acquire("worker-1").unwrap());
        assert!(!lock.acquire("worker-2").unwrap());
    }

    #[test]
    fn release_by_non_holder_is_noop() {
        let dir = TempDir::new().unwrap();
        let lock = lock_in(&dir);

        assert!(lock.acquire("worker-1").unwrap());
        lock.release("worker-2").unwrap();

        // Still held by worker-1.
        match lock.status().unwrap() {
            LockStatus::Held { holder, .. } => assert_eq!(holder, "worker-1"),
            LockStatus::Free => panic!("lock should still be held"),
        }
    }

    #[test]
    fn release_when_free_is_noop() {
        let dir = TempDir::new().unwrap();
        let lock = lock_in(&dir);
        lock.release("worker-1").unwrap();
        assert_eq!(lock.status().unwrap(), LockStatus::Free);
    }

    #[test]
    fn old_lock_reports_stale() {
        let dir = TempDir::new().unwrap();
        // Zero-second stale timeout: held locks are immediately stale.
        let lock = FileLock::new(dir.path().join("main.lock"), 0);

        assert!(lock.acquire("worker-1").unwrap());
        std::thread::sleep(std::time::Duration::from_millis(20));
        assert!(matches!(
            lock.status().unwrap(),
            LockStatus::Held { stale: true, .. }
        ));
    }

    #[test]
    fn corrupt_lock_file_reports_stale_unknown_holder() {
        let dir = TempDir::new().unwrap();
        let lock = lock_in(&dir);

        // Empty file, as left by a crash between create and write.
        std::fs::write(dir.path().join("main.lock"), b"").unwrap();

        match lock.status().unwrap() {
            LockStatus::Held { holder, stale, .. } => {
                assert_eq!(holder, "unknown");
                assert!(stale);
            }
            LockStatus::Free => panic!("corrupt lock must report as held"),
        }

        lock.force_release().unwrap();
        assert_eq!(lock.status().unwrap(), LockStatus::Free);
        assert!(lock.acquire("worker-1").unwrap());
    }

    #[test]
    fn force_release_clears_any_holder() {
        let dir = TempDir::new().unwrap();
        let lock = lock_in(&dir);

        assert!(lock.acquire("worker-1").unwrap());
        lock.force_release().unwrap();
        assert_eq!(lock.status().unwrap(), LockStatus::Free);
        assert!(lock.acquire("worker-2").unwrap());
    }
}
