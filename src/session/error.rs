//! Session error types.
//!
//! Every session operation returns one of these to the front end. None of
//! them is fatal to the process; a failed operation leaves the persisted
//! record exactly as it was.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::types::TimerState;

/// Errors that can occur while operating on the session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Requested length is not a whole number of minutes in range.
    #[error("session length must be a whole number of minutes between 1 and 60, got '{0}'")]
    InvalidDuration(String),

    /// The operation needs a session but none exists.
    #[error("no active session")]
    NoActiveSession,

    /// The operation is not permitted from the current state.
    #[error("cannot {operation} a session that is {state}")]
    InvalidStateTransition {
        /// Operation that was attempted
        operation: &'static str,
        /// State the session was in
        state: TimerState,
    },

    /// `start` was requested while a session still has time on it.
    #[error("a session is already active ({state})")]
    SessionAlreadyActive {
        /// State of the session that blocked the start
        state: TimerState,
    },

    /// The state file exists but cannot be understood.
    #[error("session state file {} is corrupt: {reason}", .path.display())]
    CorruptState {
        /// Path to the state file
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },

    /// Another process held the session lock for too long.
    #[error("session is busy: could not lock {} within {}ms", .path.display(), .waited.as_millis())]
    LockTimeout {
        /// Path to the lock file
        path: PathBuf,
        /// How long acquisition was attempted
        waited: Duration,
    },

    /// A filesystem operation failed.
    #[error("{context}: {source}")]
    Io {
        /// What was being done
        context: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The default state location could not be resolved.
    #[error("could not determine the home directory")]
    HomeDirNotFound,
}

impl SessionError {
    /// Wraps an I/O error with a description of what was being done.
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Returns true if the operation failed because no session exists.
    #[must_use]
    pub fn is_no_active_session(&self) -> bool {
        matches!(self, Self::NoActiveSession)
    }

    /// Returns true if the operation failed on lock contention.
    #[must_use]
    pub fn is_lock_timeout(&self) -> bool {
        matches!(self, Self::LockTimeout { .. })
    }

    /// Returns true if the persisted record could not be read.
    #[must_use]
    pub fn is_corrupt_state(&self) -> bool {
        matches!(self, Self::CorruptState { .. })
    }

    /// Returns a user-facing hint for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::NoActiveSession => Some("start one with 'redgreen start <MINUTES>'"),
            Self::SessionAlreadyActive { .. } => {
                Some("use 'redgreen restart' or 'redgreen clear' first")
            }
            Self::CorruptState { .. } => Some("run 'redgreen clear' to discard the session"),
            Self::LockTimeout { .. } => Some("another redgreen command is running; try again"),
            Self::InvalidDuration(_)
            | Self::InvalidStateTransition { .. }
            | Self::Io { .. }
            | Self::HomeDirNotFound => None,
        }
    }
}
