//! File-backed session record.
//!
//! The whole session lives in one JSON document that is replaced atomically
//! (temp file in the same directory, then rename), so a concurrent reader
//! sees either the old record or the new one, never a partial write.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::types::{TimerState, MAX_SESSION_MINUTES, MIN_SESSION_MINUTES};

use super::error::SessionError;
use super::timer::Timer;

/// File name of the session record inside the state directory.
pub const STATE_FILE_NAME: &str = "session.json";

/// Current record layout.
const RECORD_VERSION: u32 = 1;

// ============================================================================
// SessionRecord
// ============================================================================

/// On-disk form of a [`Timer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Layout version
    pub version: u32,
    /// Session length
    pub total_duration_seconds: u64,
    /// Stored state
    pub state: TimerState,
    /// Monotonic reading at which the running interval began
    pub started_at_ms: Option<u64>,
    /// Time consumed before the running interval
    pub accumulated_elapsed_ms: u64,
}

impl SessionRecord {
    /// Captures a timer.
    pub fn from_timer(timer: &Timer) -> Self {
        Self {
            version: RECORD_VERSION,
            total_duration_seconds: timer.total_duration().as_secs(),
            state: timer.state(),
            started_at_ms: timer.started_at().map(duration_to_ms),
            accumulated_elapsed_ms: duration_to_ms(timer.accumulated_elapsed()),
        }
    }

    /// Rebuilds the timer, rejecting records that cannot describe a session.
    fn into_timer(self) -> Result<Timer, String> {
        if self.version != RECORD_VERSION {
            return Err(format!("unsupported record version {}", self.version));
        }
        if self.state == TimerState::Idle {
            return Err("stored session is idle".to_string());
        }
        let minutes = u64::from(MIN_SESSION_MINUTES)..=u64::from(MAX_SESSION_MINUTES);
        if self.total_duration_seconds % 60 != 0
            || !minutes.contains(&(self.total_duration_seconds / 60))
        {
            return Err(format!(
                "session length of {}s is not a whole number of minutes between {} and {}",
                self.total_duration_seconds, MIN_SESSION_MINUTES, MAX_SESSION_MINUTES
            ));
        }
        if self.accumulated_elapsed_ms > self.total_duration_seconds * 1_000 {
            return Err(format!(
                "elapsed time of {}ms exceeds the session length",
                self.accumulated_elapsed_ms
            ));
        }
        if self.state == TimerState::Running && self.started_at_ms.is_none() {
            return Err("running session has no start reading".to_string());
        }

        Ok(Timer::from_parts(
            Duration::from_secs(self.total_duration_seconds),
            self.state,
            self.started_at_ms.map(Duration::from_millis),
            Duration::from_millis(self.accumulated_elapsed_ms),
        ))
    }
}

fn duration_to_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// ============================================================================
// StateStore
// ============================================================================

/// Reads and writes the session record.
///
/// The store does no locking of its own; callers hold the session lock
/// around every load/save pair.
#[derive(Debug, Clone)]
pub struct StateStore {
    /// Full path to the record
    path: PathBuf,
}

impl StateStore {
    /// Creates a store for the record inside `state_dir`.
    pub fn new(state_dir: &Path) -> Self {
        Self {
            path: state_dir.join(STATE_FILE_NAME),
        }
    }

    /// Returns the path to the record.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the timer; a missing record means no session.
    ///
    /// # Errors
    ///
    /// - [`SessionError::CorruptState`] if the record cannot be parsed or
    ///   describes an impossible session
    /// - [`SessionError::Io`] if the file exists but cannot be read
    pub fn load(&self) -> Result<Timer, SessionError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("no session record at {}", self.path.display());
                return Ok(Timer::idle());
            }
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                return Err(self.corrupt("file is not valid UTF-8"));
            }
            Err(e) => {
                return Err(SessionError::io(
                    format!("failed to read {}", self.path.display()),
                    e,
                ));
            }
        };

        let record: SessionRecord =
            serde_json::from_str(&content).map_err(|e| self.corrupt(e.to_string()))?;
        let timer = record.into_timer().map_err(|reason| self.corrupt(reason))?;

        tracing::debug!("loaded {} session from {}", timer.state(), self.path.display());
        Ok(timer)
    }

    /// Persists the timer, replacing the previous record in one step.
    ///
    /// An idle timer removes the record instead.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Io`] if the record cannot be written.
    pub fn save(&self, timer: &Timer) -> Result<(), SessionError> {
        if timer.state() == TimerState::Idle {
            return self.remove();
        }

        let dir = self.parent_dir()?;
        fs::create_dir_all(dir)
            .map_err(|e| SessionError::io(format!("failed to create {}", dir.display()), e))?;

        let record = SessionRecord::from_timer(timer);
        let content = serde_json::to_string_pretty(&record)
            .map_err(|e| SessionError::io("failed to serialize session", e.into()))?;

        let mut temp_file = NamedTempFile::new_in(dir)
            .map_err(|e| SessionError::io("failed to create temp state file", e))?;
        temp_file
            .write_all(content.as_bytes())
            .map_err(|e| SessionError::io("failed to write temp state file", e))?;
        temp_file
            .as_file()
            .sync_all()
            .map_err(|e| SessionError::io("failed to sync temp state file", e))?;
        temp_file.persist(&self.path).map_err(|e| {
            SessionError::io(format!("failed to replace {}", self.path.display()), e.error)
        })?;

        tracing::debug!("saved {} session to {}", timer.state(), self.path.display());
        Ok(())
    }

    /// Deletes the record. Missing records are not an error.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Io`] if an existing record cannot be removed.
    pub fn remove(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!("removed {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::io(
                format!("failed to remove {}", self.path.display()),
                e,
            )),
        }
    }

    fn parent_dir(&self) -> Result<&Path, SessionError> {
        self.path.parent().ok_or_else(|| {
            SessionError::io(
                format!("{} has no parent directory", self.path.display()),
                ErrorKind::InvalidInput.into(),
            )
        })
    }

    fn corrupt(&self, reason: impl Into<String>) -> SessionError {
        SessionError::CorruptState {
            path: self.path.clone(),
            reason: reason.into(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
