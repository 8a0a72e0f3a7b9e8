//! Pure timer state machine.
//!
//! The timer never reads a clock itself: every operation takes the current
//! monotonic reading as `now`. It has no knowledge of storage or front ends.
//!
//! - Transitions: Idle → Running ⇄ Paused, Running → Expired
//! - Elapsed time accumulates across pause/resume cycles
//! - Expiry is detected lazily by [`Timer::refresh`]

use std::time::Duration;

use crate::types::{validate_minutes, SessionSnapshot, TimerState};

use super::error::SessionError;

// ============================================================================
// Timer
// ============================================================================

/// One timed interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timer {
    /// Length the session was started with
    total_duration: Duration,
    /// Stored state; may lag behind the logical state until refreshed
    state: TimerState,
    /// Reading at which the current running interval began
    started_at: Option<Duration>,
    /// Time consumed before the current running interval
    accumulated_elapsed: Duration,
}

impl Timer {
    /// Returns a timer with no session.
    pub fn idle() -> Self {
        Self::default()
    }

    /// Rebuilds a timer from persisted parts.
    ///
    /// `started_at` is kept only for a running timer and accumulated time
    /// is capped at the total, so an inconsistent record cannot produce
    /// negative remaining time.
    pub fn from_parts(
        total_duration: Duration,
        state: TimerState,
        started_at: Option<Duration>,
        accumulated_elapsed: Duration,
    ) -> Self {
        let started_at = match state {
            TimerState::Running => started_at,
            _ => None,
        };
        Self {
            total_duration,
            state,
            started_at,
            accumulated_elapsed: accumulated_elapsed.min(total_duration),
        }
    }

    /// Session length.
    pub fn total_duration(&self) -> Duration {
        self.total_duration
    }

    /// Stored state. Use [`Timer::state_at`] for the logical state.
    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Reading at which the current running interval began.
    pub fn started_at(&self) -> Option<Duration> {
        self.started_at
    }

    /// Time consumed before the current running interval.
    pub fn accumulated_elapsed(&self) -> Duration {
        self.accumulated_elapsed
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Time consumed as of `now`, capped at the total.
    pub fn elapsed(&self, now: Duration) -> Duration {
        let running = match (self.state, self.started_at) {
            (TimerState::Running, Some(started_at)) => now.saturating_sub(started_at),
            _ => Duration::ZERO,
        };
        (self.accumulated_elapsed + running).min(self.total_duration)
    }

    /// Time left as of `now`, never negative.
    pub fn remaining(&self, now: Duration) -> Duration {
        self.total_duration.saturating_sub(self.elapsed(now))
    }

    /// Logical state as of `now`, with expiry applied.
    pub fn state_at(&self, now: Duration) -> TimerState {
        if self.state == TimerState::Running && self.remaining(now).is_zero() {
            TimerState::Expired
        } else {
            self.state
        }
    }

    /// Builds the snapshot reported to front ends.
    ///
    /// Seconds are floored, so the countdown never shows more time than
    /// truly remains.
    pub fn snapshot(&self, now: Duration) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state_at(now),
            remaining_seconds: self.remaining(now).as_secs(),
            total_duration_seconds: self.total_duration.as_secs(),
            elapsed_seconds: self.elapsed(now).as_secs(),
        }
    }

    // ------------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------------

    /// Applies lazy transitions as of `now`.
    ///
    /// A running timer that has used up its time becomes expired. A running
    /// timer whose start lies in the future of `now` was started before a
    /// reboot reset the clock; its running interval is rebased to `now`.
    ///
    /// A reboot is only visible while the new uptime is still below the
    /// stored start. Once uptime passes it, the reading looks like ordinary
    /// progress and elapsed time is computed from the unrelated boot.
    ///
    /// Returns true if the stored fields changed.
    pub fn refresh(&mut self, now: Duration) -> bool {
        if self.state != TimerState::Running {
            return false;
        }

        let mut changed = false;
        if let Some(started_at) = self.started_at {
            if now < started_at {
                tracing::warn!(
                    "monotonic clock is behind the session start ({:?} < {:?}); assuming a reboot",
                    now,
                    started_at
                );
                self.started_at = Some(now);
                changed = true;
            }
        }

        if self.remaining(now).is_zero() {
            self.accumulated_elapsed = self.total_duration;
            self.started_at = None;
            self.state = TimerState::Expired;
            tracing::debug!("session expired");
            changed = true;
        }
        changed
    }

    /// Starts a new session of `minutes`, replacing an idle or expired one.
    ///
    /// # Errors
    ///
    /// - [`SessionError::InvalidDuration`] if `minutes` is out of range
    /// - [`SessionError::SessionAlreadyActive`] if running or paused
    pub fn start(&mut self, minutes: u32, now: Duration) -> Result<(), SessionError> {
        let minutes = validate_minutes(minutes)?;
        self.refresh(now);
        if self.state.is_active() {
            return Err(SessionError::SessionAlreadyActive { state: self.state });
        }

        *self = Self {
            total_duration: Duration::from_secs(u64::from(minutes) * 60),
            state: TimerState::Running,
            started_at: Some(now),
            accumulated_elapsed: Duration::ZERO,
        };
        Ok(())
    }

    /// Freezes the countdown.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidStateTransition`] unless running.
    pub fn pause(&mut self, now: Duration) -> Result<(), SessionError> {
        self.refresh(now);
        self.require("pause", TimerState::Running)?;

        self.accumulated_elapsed = self.elapsed(now);
        self.started_at = None;
        self.state = TimerState::Paused;
        Ok(())
    }

    /// Continues a frozen countdown.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidStateTransition`] unless paused.
    pub fn resume(&mut self, now: Duration) -> Result<(), SessionError> {
        self.refresh(now);
        self.require("resume", TimerState::Paused)?;

        self.started_at = Some(now);
        self.state = TimerState::Running;
        Ok(())
    }

    /// Starts the countdown over with the same length.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoActiveSession`] when idle.
    pub fn restart(&mut self, now: Duration) -> Result<(), SessionError> {
        if self.state == TimerState::Idle {
            return Err(SessionError::NoActiveSession);
        }

        self.accumulated_elapsed = Duration::ZERO;
        self.started_at = Some(now);
        self.state = TimerState::Running;
        Ok(())
    }

    fn require(&self, operation: &'static str, expected: TimerState) -> Result<(), SessionError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SessionError::InvalidStateTransition {
                operation,
                state: self.state,
            })
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const T0: Duration = Duration::from_secs(1_000);

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn running(minutes: u32) -> Timer {
        let mut timer = Timer::idle();
        timer.start(minutes, T0).unwrap();
        timer
    }

    // ------------------------------------------------------------------------
    // Start Tests
    // ------------------------------------------------------------------------

    mod start_tests {
        use super::*;

        #[test]
        fn test_idle_timer() {
            let timer = Timer::idle();
            assert_eq!(timer.state(), TimerState::Idle);
            assert_eq!(timer.remaining(T0), Duration::ZERO);
            assert_eq!(timer.started_at(), None);
        }

        #[test]
        fn test_start_full_remaining_for_every_valid_length() {
            for minutes in 1..=60 {
                let timer = running(minutes);
                assert_eq!(timer.state(), TimerState::Running);
                assert_eq!(timer.remaining(T0), secs(u64::from(minutes) * 60));
                assert_eq!(timer.snapshot(T0).remaining_seconds, u64::from(minutes) * 60);
            }
        }

        #[test]
        fn test_start_rejects_out_of_range() {
            for minutes in [0, 61, 120, u32::MAX] {
                let mut timer = Timer::idle();
                let err = timer.start(minutes, T0).unwrap_err();
                assert!(matches!(err, SessionError::InvalidDuration(_)));
                assert_eq!(timer, Timer::idle());
            }
        }

        #[test]
        fn test_invalid_duration_leaves_running_timer_untouched() {
            let mut timer = running(10);
            let before = timer;
            assert!(timer.start(0, T0 + secs(5)).is_err());
            assert_eq!(timer, before);
        }

        #[test]
        fn test_start_refused_while_running() {
            let mut timer = running(10);
            let err = timer.start(5, T0 + secs(1)).unwrap_err();
            assert!(matches!(
                err,
                SessionError::SessionAlreadyActive {
                    state: TimerState::Running
                }
            ));
            assert_eq!(timer.total_duration(), secs(600));
        }

        #[test]
        fn test_start_refused_while_paused() {
            let mut timer = running(10);
            timer.pause(T0 + secs(1)).unwrap();
            let err = timer.start(5, T0 + secs(2)).unwrap_err();
            assert!(matches!(
                err,
                SessionError::SessionAlreadyActive {
                    state: TimerState::Paused
                }
            ));
        }

        #[test]
        fn test_start_replaces_expired() {
            let mut timer = running(1);
            let later = T0 + secs(120);
            timer.start(5, later).unwrap();
            assert_eq!(timer.state(), TimerState::Running);
            assert_eq!(timer.remaining(later), secs(300));
        }
    }

    // ------------------------------------------------------------------------
    // Elapsed / Remaining Tests
    // ------------------------------------------------------------------------

    mod query_tests {
        use super::*;

        #[test]
        fn test_remaining_counts_down() {
            let timer = running(10);
            assert_eq!(timer.remaining(T0 + secs(146)), secs(454));
            assert_eq!(timer.elapsed(T0 + secs(146)), secs(146));
        }

        #[test]
        fn test_remaining_non_increasing_while_running() {
            let timer = running(2);
            let mut last = timer.remaining(T0);
            for step in 1..=150 {
                let now = T0 + Duration::from_millis(step * 997);
                let remaining = timer.remaining(now);
                assert!(remaining <= last);
                last = remaining;
            }
            assert_eq!(last, Duration::ZERO);
        }

        #[test]
        fn test_snapshot_floors_seconds() {
            let timer = running(10);
            let snapshot = timer.snapshot(T0 + Duration::from_millis(500));
            assert_eq!(snapshot.remaining_seconds, 599);
            assert_eq!(snapshot.elapsed_seconds, 0);
            assert_eq!(snapshot.remaining_display(), "09:59");
        }

        #[test]
        fn test_queries_do_not_mutate() {
            let timer = running(1);
            let before = timer;
            let _ = timer.remaining(T0 + secs(600));
            let _ = timer.state_at(T0 + secs(600));
            assert_eq!(timer, before);
            assert_eq!(timer.state(), TimerState::Running);
        }

        #[test]
        fn test_logical_expiry_without_refresh() {
            let timer = running(1);
            assert_eq!(timer.state_at(T0 + secs(59)), TimerState::Running);
            assert_eq!(timer.state_at(T0 + secs(60)), TimerState::Expired);
            assert_eq!(timer.remaining(T0 + secs(3600)), Duration::ZERO);
        }

        #[test]
        fn test_clock_behind_start_reads_zero_running_time() {
            let timer = running(10);
            assert_eq!(timer.elapsed(T0 - secs(10)), Duration::ZERO);
        }
    }

    // ------------------------------------------------------------------------
    // Pause / Resume Tests
    // ------------------------------------------------------------------------

    mod pause_resume_tests {
        use super::*;

        #[test]
        fn test_pause_freezes_remaining() {
            let mut timer = running(10);
            timer.pause(T0 + secs(146)).unwrap();
            assert_eq!(timer.state(), TimerState::Paused);
            assert_eq!(timer.started_at(), None);
            assert_eq!(timer.accumulated_elapsed(), secs(146));
            assert_eq!(timer.remaining(T0 + secs(146)), secs(454));
            assert_eq!(timer.remaining(T0 + secs(5_000)), secs(454));
        }

        #[test]
        fn test_second_pause_fails_and_keeps_remaining() {
            let mut timer = running(10);
            timer.pause(T0 + secs(30)).unwrap();
            let remaining = timer.remaining(T0 + secs(30));

            let err = timer.pause(T0 + secs(40)).unwrap_err();
            assert!(matches!(
                err,
                SessionError::InvalidStateTransition {
                    operation: "pause",
                    state: TimerState::Paused
                }
            ));
            assert_eq!(timer.remaining(T0 + secs(40)), remaining);
        }

        #[test]
        fn test_pause_from_idle_fails() {
            let mut timer = Timer::idle();
            let err = timer.pause(T0).unwrap_err();
            assert!(matches!(
                err,
                SessionError::InvalidStateTransition {
                    state: TimerState::Idle,
                    ..
                }
            ));
        }

        #[test]
        fn test_pause_after_time_ran_out_reports_expired() {
            let mut timer = running(1);
            let err = timer.pause(T0 + secs(61)).unwrap_err();
            assert!(matches!(
                err,
                SessionError::InvalidStateTransition {
                    state: TimerState::Expired,
                    ..
                }
            ));
        }

        #[test]
        fn test_resume_keeps_remaining() {
            let mut timer = running(10);
            timer.pause(T0 + secs(100)).unwrap();
            let frozen = timer.remaining(T0 + secs(100));

            let resumed_at = T0 + secs(400);
            timer.resume(resumed_at).unwrap();
            assert_eq!(timer.state(), TimerState::Running);
            assert_eq!(timer.remaining(resumed_at), frozen);
            assert_eq!(timer.remaining(resumed_at + secs(10)), frozen - secs(10));
        }

        #[test]
        fn test_elapsed_accumulates_across_cycles() {
            let mut timer = running(10);
            timer.pause(T0 + secs(60)).unwrap();
            timer.resume(T0 + secs(1_000)).unwrap();
            timer.pause(T0 + secs(1_090)).unwrap();
            timer.resume(T0 + secs(2_000)).unwrap();

            assert_eq!(timer.elapsed(T0 + secs(2_030)), secs(180));
            assert_eq!(timer.remaining(T0 + secs(2_030)), secs(420));
        }

        #[test]
        fn test_resume_requires_paused() {
            for mut timer in [Timer::idle(), running(10)] {
                let err = timer.resume(T0 + secs(1)).unwrap_err();
                assert!(matches!(
                    err,
                    SessionError::InvalidStateTransition {
                        operation: "resume",
                        ..
                    }
                ));
            }
        }

        #[test]
        fn test_resume_expired_fails() {
            let mut timer = running(1);
            timer.refresh(T0 + secs(60));
            assert!(timer.resume(T0 + secs(70)).is_err());
        }
    }

    // ------------------------------------------------------------------------
    // Refresh Tests
    // ------------------------------------------------------------------------

    mod refresh_tests {
        use super::*;

        #[test]
        fn test_refresh_expires_running_timer() {
            let mut timer = running(1);
            assert!(timer.refresh(T0 + secs(75)));
            assert_eq!(timer.state(), TimerState::Expired);
            assert_eq!(timer.started_at(), None);
            assert_eq!(timer.accumulated_elapsed(), secs(60));
            assert_eq!(timer.remaining(T0 + secs(75)), Duration::ZERO);
        }

        #[test]
        fn test_refresh_is_noop_before_expiry() {
            let mut timer = running(1);
            assert!(!timer.refresh(T0 + secs(59)));
            assert_eq!(timer.state(), TimerState::Running);
        }

        #[test]
        fn test_refresh_does_not_touch_paused() {
            let mut timer = running(1);
            timer.pause(T0 + secs(30)).unwrap();
            assert!(!timer.refresh(T0 + secs(10_000)));
            assert_eq!(timer.state(), TimerState::Paused);
        }

        #[test]
        fn test_refresh_rebases_after_reboot() {
            let mut timer = running(10);
            timer.pause(T0 + secs(100)).unwrap();
            timer.resume(T0 + secs(200)).unwrap();

            // Clock restarted from a small reading.
            let after_reboot = secs(5);
            assert!(timer.refresh(after_reboot));
            assert_eq!(timer.state(), TimerState::Running);
            assert_eq!(timer.started_at(), Some(after_reboot));
            assert_eq!(timer.remaining(after_reboot), secs(500));
        }
    }

    // ------------------------------------------------------------------------
    // Restart Tests
    // ------------------------------------------------------------------------

    mod restart_tests {
        use super::*;

        #[test]
        fn test_restart_from_running() {
            let mut timer = running(10);
            let now = T0 + secs(300);
            timer.restart(now).unwrap();
            assert_eq!(timer.state(), TimerState::Running);
            assert_eq!(timer.remaining(now), secs(600));
        }

        #[test]
        fn test_restart_from_paused() {
            let mut timer = running(10);
            timer.pause(T0 + secs(300)).unwrap();
            let now = T0 + secs(900);
            timer.restart(now).unwrap();
            assert_eq!(timer.state(), TimerState::Running);
            assert_eq!(timer.remaining(now), secs(600));
        }

        #[test]
        fn test_restart_from_expired() {
            let mut timer = running(1);
            timer.refresh(T0 + secs(90));
            let now = T0 + secs(120);
            timer.restart(now).unwrap();
            assert_eq!(timer.state(), TimerState::Running);
            assert_eq!(timer.total_duration(), secs(60));
            assert_eq!(timer.remaining(now), secs(60));
        }

        #[test]
        fn test_restart_from_idle() {
            let mut timer = Timer::idle();
            assert!(matches!(
                timer.restart(T0),
                Err(SessionError::NoActiveSession)
            ));
        }
    }

    // ------------------------------------------------------------------------
    // from_parts Tests
    // ------------------------------------------------------------------------

    mod from_parts_tests {
        use super::*;

        #[test]
        fn test_from_parts_drops_start_of_paused_timer() {
            let timer = Timer::from_parts(secs(600), TimerState::Paused, Some(T0), secs(10));
            assert_eq!(timer.started_at(), None);
            assert_eq!(timer.remaining(T0 + secs(100)), secs(590));
        }

        #[test]
        fn test_from_parts_caps_accumulated() {
            let timer = Timer::from_parts(secs(60), TimerState::Paused, None, secs(500));
            assert_eq!(timer.accumulated_elapsed(), secs(60));
            assert_eq!(timer.remaining(T0), Duration::ZERO);
        }
    }
}
