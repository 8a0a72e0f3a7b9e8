//! Exclusive advisory lock around the session record.
//!
//! The lock is a `flock(2)` on `session.lock` beside the record. It is not
//! taken on `session.json` itself because every save replaces that file by
//! rename, which would leave waiters holding a lock on an unlinked inode.
//!
//! Acquisition polls a non-blocking lock so that it can give up after a
//! bounded wait instead of wedging every later invocation behind a stuck
//! process. The lock is released when the guard is dropped, on every exit
//! path.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::time::{sleep, timeout};

use super::error::SessionError;

/// File name of the lock inside the state directory.
pub const LOCK_FILE_NAME: &str = "session.lock";

/// Delay between acquisition attempts.
const LOCK_POLL_INTERVAL_MS: u64 = 25;

// ============================================================================
// SessionLock
// ============================================================================

/// Held exclusive lock on the session. Dropping it releases the lock.
#[derive(Debug)]
pub struct SessionLock {
    file: File,
    path: PathBuf,
}

impl SessionLock {
    /// Acquires the lock for the session in `state_dir`, waiting at most
    /// `wait`.
    ///
    /// # Errors
    ///
    /// - [`SessionError::LockTimeout`] if another holder keeps the lock
    /// - [`SessionError::Io`] if the lock file cannot be opened or locked
    pub async fn acquire(state_dir: &Path, wait: Duration) -> Result<Self, SessionError> {
        fs::create_dir_all(state_dir).map_err(|e| {
            SessionError::io(format!("failed to create {}", state_dir.display()), e)
        })?;

        let path = state_dir.join(LOCK_FILE_NAME);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| SessionError::io(format!("failed to open {}", path.display()), e))?;

        let mut contended = false;
        let attempt = async {
            loop {
                match try_lock_exclusive(&file) {
                    Ok(true) => return Ok(()),
                    Ok(false) => {
                        if !contended {
                            tracing::debug!("waiting for session lock {}", path.display());
                            contended = true;
                        }
                        sleep(Duration::from_millis(LOCK_POLL_INTERVAL_MS)).await;
                    }
                    Err(e) => {
                        return Err(SessionError::io(
                            format!("failed to lock {}", path.display()),
                            e,
                        ))
                    }
                }
            }
        };

        let outcome = timeout(wait, attempt).await;
        match outcome {
            Ok(Ok(())) => {
                tracing::debug!("acquired session lock {}", path.display());
                Ok(Self { file, path })
            }
            Ok(Err(e)) => Err(e),
            Err(_) => {
                tracing::warn!(
                    "gave up on session lock {} after {:?}",
                    path.display(),
                    wait
                );
                Err(SessionError::LockTimeout { path, waited: wait })
            }
        }
    }

    /// Returns the path to the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SessionLock {
    fn drop(&mut self) {
        // SAFETY: the descriptor is owned by `self.file` and still open.
        let rc = unsafe { libc::flock(self.file.as_raw_fd(), libc::LOCK_UN) };
        if rc != 0 {
            // Closing the file releases the lock regardless.
            tracing::debug!(
                "explicit unlock of {} failed: {}",
                self.path.display(),
                io::Error::last_os_error()
            );
        } else {
            tracing::debug!("released session lock {}", self.path.display());
        }
    }
}

/// Attempts a non-blocking exclusive lock. `Ok(false)` means contended.
fn try_lock_exclusive(file: &File) -> io::Result<bool> {
    loop {
        // SAFETY: the descriptor is owned by `file` and open for the call.
        let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
        if rc == 0 {
            return Ok(true);
        }
        let err = io::Error::last_os_error();
        match err.raw_os_error() {
            Some(libc::EINTR) => continue,
            Some(code) if code == libc::EWOULDBLOCK => return Ok(false),
            _ => return Err(err),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
