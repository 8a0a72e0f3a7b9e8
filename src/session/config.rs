//! Session location and lock settings.
//!
//! The command-line front end always uses [`SessionConfig::locate`], which
//! resolves the fixed per-user location. Embedders and tests can point the
//! session at another directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::error::SessionError;
use super::lock::LOCK_FILE_NAME;
use super::store::STATE_FILE_NAME;

/// Directory under the home directory that holds the session.
const DEFAULT_STATE_DIR: &str = ".config/redgreen";

/// Default bound on lock acquisition in milliseconds.
const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5_000;

/// Where the session lives and how long to wait for it.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use redgreen::session::SessionConfig;
///
/// let config = SessionConfig::new("/tmp/redgreen-demo")
///     .with_lock_timeout(Duration::from_millis(250));
/// assert!(config.state_file().ends_with("session.json"));
/// assert_eq!(config.lock_timeout(), Duration::from_millis(250));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Directory holding the record and the lock
    state_dir: PathBuf,
    /// Bound on lock acquisition
    lock_timeout: Duration,
}

impl SessionConfig {
    /// Creates a configuration for the session in `state_dir`.
    #[must_use]
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            state_dir: state_dir.into(),
            lock_timeout: Duration::from_millis(DEFAULT_LOCK_TIMEOUT_MS),
        }
    }

    /// Resolves the per-user location, `~/.config/redgreen`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::HomeDirNotFound`] if the home directory cannot
    /// be determined.
    pub fn locate() -> Result<Self, SessionError> {
        let home = dirs::home_dir().ok_or(SessionError::HomeDirNotFound)?;
        Ok(Self::new(home.join(DEFAULT_STATE_DIR)))
    }

    /// Points the session at another directory.
    #[must_use]
    pub fn with_state_dir(mut self, state_dir: impl Into<PathBuf>) -> Self {
        self.state_dir = state_dir.into();
        self
    }

    /// Changes the bound on lock acquisition.
    #[must_use]
    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }

    /// Directory holding the record and the lock.
    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    /// Path to the session record.
    pub fn state_file(&self) -> PathBuf {
        self.state_dir.join(STATE_FILE_NAME)
    }

    /// Path to the lock file.
    pub fn lock_file(&self) -> PathBuf {
        self.state_dir.join(LOCK_FILE_NAME)
    }

    /// Bound on lock acquisition.
    pub fn lock_timeout(&self) -> Duration {
        self.lock_timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_default_timeout() {
        let config = SessionConfig::new("/tmp/rg");
        assert_eq!(config.lock_timeout(), Duration::from_secs(5));
        assert_eq!(config.state_dir(), Path::new("/tmp/rg"));
    }

    #[test]
    fn test_file_paths() {
        let config = SessionConfig::new("/tmp/rg");
        assert_eq!(config.state_file(), PathBuf::from("/tmp/rg/session.json"));
        assert_eq!(config.lock_file(), PathBuf::from("/tmp/rg/session.lock"));
    }

    #[test]
    fn test_builders() {
        let config = SessionConfig::new("/tmp/a")
            .with_state_dir("/tmp/b")
            .with_lock_timeout(Duration::from_millis(10));
        assert_eq!(config.state_dir(), Path::new("/tmp/b"));
        assert_eq!(config.lock_timeout(), Duration::from_millis(10));
    }

    #[test]
    fn test_locate_is_under_home() {
        if let Some(home) = dirs::home_dir() {
            let config = SessionConfig::locate().unwrap();
            assert_eq!(config.state_dir(), home.join(".config").join("redgreen"));
        }
    }
}
