//! Session manager: the persisted, lock-protected timer.
//!
//! Every operation is one locked cycle:
//!
//! 1. acquire the session lock (bounded wait)
//! 2. load the record (missing means idle)
//! 3. apply lazy expiry and the requested transition to the in-memory timer
//! 4. persist the record if it changed
//! 5. release the lock and report a snapshot
//!
//! Nothing is written when a step fails, so a failed operation leaves the
//! previous record untouched.

use std::time::Duration;

use crate::types::{SessionSnapshot, TimerState};

use super::clock::{Clock, MonotonicClock};
use super::config::SessionConfig;
use super::error::SessionError;
use super::lock::SessionLock;
use super::store::StateStore;
use super::timer::Timer;

// ============================================================================
// SessionManager
// ============================================================================

/// Entry point for every front end.
pub struct SessionManager<C: Clock = MonotonicClock> {
    /// Location and lock settings
    config: SessionConfig,
    /// Record persistence
    store: StateStore,
    /// Monotonic time source
    clock: C,
}

impl SessionManager<MonotonicClock> {
    /// Creates a manager for the per-user session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::HomeDirNotFound`] if the home directory cannot
    /// be determined.
    pub fn new() -> Result<Self, SessionError> {
        Ok(Self::with_config(SessionConfig::locate()?))
    }

    /// Creates a manager for the session described by `config`.
    pub fn with_config(config: SessionConfig) -> Self {
        Self::with_clock(config, MonotonicClock)
    }
}

impl<C: Clock> SessionManager<C> {
    /// Creates a manager that reads time from `clock`.
    pub fn with_clock(config: SessionConfig, clock: C) -> Self {
        let store = StateStore::new(config.state_dir());
        Self {
            config,
            store,
            clock,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Starts a session of `minutes`.
    ///
    /// Refused while a session is running or paused; an expired session is
    /// replaced.
    ///
    /// # Errors
    ///
    /// - [`SessionError::InvalidDuration`] if `minutes` is outside 1..=60
    /// - [`SessionError::SessionAlreadyActive`] if a session has time left
    pub async fn start_session(&self, minutes: u32) -> Result<SessionSnapshot, SessionError> {
        let snapshot = self
            .transact("start", |timer, now| timer.start(minutes, now))
            .await?;
        tracing::info!("started {} minute session", minutes);
        Ok(snapshot)
    }

    /// Reports the session, persisting a lazily detected expiry.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoActiveSession`] when there is no session.
    pub async fn get_status(&self) -> Result<SessionSnapshot, SessionError> {
        self.transact("status", |timer, _| {
            if timer.state() == TimerState::Idle {
                Err(SessionError::NoActiveSession)
            } else {
                Ok(())
            }
        })
        .await
    }

    /// Pauses the running session.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NoActiveSession`] when there is no session
    /// - [`SessionError::InvalidStateTransition`] unless running
    pub async fn pause_session(&self) -> Result<SessionSnapshot, SessionError> {
        let snapshot = self
            .transact("pause", |timer, now| {
                require_session(timer)?;
                timer.pause(now)
            })
            .await?;
        tracing::info!("paused session with {}s left", snapshot.remaining_seconds);
        Ok(snapshot)
    }

    /// Resumes the paused session.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NoActiveSession`] when there is no session
    /// - [`SessionError::InvalidStateTransition`] unless paused
    pub async fn resume_session(&self) -> Result<SessionSnapshot, SessionError> {
        let snapshot = self
            .transact("resume", |timer, now| {
                require_session(timer)?;
                timer.resume(now)
            })
            .await?;
        tracing::info!("resumed session with {}s left", snapshot.remaining_seconds);
        Ok(snapshot)
    }

    /// Restarts the session with its original length.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoActiveSession`] when there is no session.
    pub async fn restart_session(&self) -> Result<SessionSnapshot, SessionError> {
        let snapshot = self
            .transact("restart", |timer, now| timer.restart(now))
            .await?;
        tracing::info!("restarted {} minute session", snapshot.total_minutes());
        Ok(snapshot)
    }

    /// Discards the session in any state, including a corrupt record.
    ///
    /// Returns the state the session was in, or `Idle` if there was none or
    /// the record could not be read.
    ///
    /// # Errors
    ///
    /// - [`SessionError::LockTimeout`] if the lock cannot be acquired
    /// - [`SessionError::Io`] if the clock cannot be read or the record cannot
    ///   be removed
    pub async fn clear_session(&self) -> Result<TimerState, SessionError> {
        let _lock = self.lock().await?;
        let now = self.clock.now()?;

        let previous = match self.store.load() {
            Ok(timer) => timer.state_at(now),
            Err(e) if e.is_corrupt_state() => {
                tracing::warn!("discarding unreadable session: {}", e);
                TimerState::Idle
            }
            Err(e) => return Err(e),
        };

        self.store.save(&Timer::idle())?;
        tracing::info!("cleared session (was {})", previous);
        Ok(previous)
    }

    /// Runs one locked load → refresh → mutate → persist cycle.
    async fn transact<F>(
        &self,
        operation: &'static str,
        apply: F,
    ) -> Result<SessionSnapshot, SessionError>
    where
        F: FnOnce(&mut Timer, Duration) -> Result<(), SessionError>,
    {
        let _lock = self.lock().await?;

        let stored = self.store.load()?;
        let now = self.clock.now()?;

        let mut timer = stored;
        timer.refresh(now);
        if let Err(e) = apply(&mut timer, now) {
            tracing::debug!("{} rejected: {}", operation, e);
            return Err(e);
        }

        if timer != stored {
            self.store.save(&timer)?;
            tracing::debug!("{}: {} -> {}", operation, stored.state(), timer.state());
        }

        Ok(timer.snapshot(now))
    }

    async fn lock(&self) -> Result<SessionLock, SessionError> {
        SessionLock::acquire(self.config.state_dir(), self.config.lock_timeout()).await
    }
}

fn require_session(timer: &Timer) -> Result<(), SessionError> {
    if timer.state() == TimerState::Idle {
        Err(SessionError::NoActiveSession)
    } else {
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
