//! Core data types for the redgreen session timer.
//!
//! This module defines the data structures shared by the timer, the
//! session manager and the front ends:
//! - Timer state with its string forms
//! - Session duration bounds and validation
//! - The session snapshot returned by every session operation

use serde::{Deserialize, Serialize};

use crate::session::SessionError;

// ============================================================================
// Constants
// ============================================================================

/// Shortest session that can be started, in minutes.
pub const MIN_SESSION_MINUTES: u32 = 1;

/// Longest session that can be started, in minutes.
pub const MAX_SESSION_MINUTES: u32 = 60;

// ============================================================================
// TimerState
// ============================================================================

/// Represents the state of the session timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimerState {
    /// No session exists
    #[default]
    Idle,
    /// Counting down
    Running,
    /// Countdown frozen
    Paused,
    /// Ran out of time; stays here until restarted or replaced
    Expired,
}

impl TimerState {
    /// Returns the string representation of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerState::Idle => "idle",
            TimerState::Running => "running",
            TimerState::Paused => "paused",
            TimerState::Expired => "expired",
        }
    }

    /// Returns true for a session that still has time on it.
    pub fn is_active(&self) -> bool {
        matches!(self, TimerState::Running | TimerState::Paused)
    }
}

impl std::fmt::Display for TimerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Duration validation
// ============================================================================

/// Validates a requested session length.
///
/// # Errors
///
/// Returns [`SessionError::InvalidDuration`] when `minutes` is outside
/// `MIN_SESSION_MINUTES..=MAX_SESSION_MINUTES`.
pub fn validate_minutes(minutes: u32) -> Result<u32, SessionError> {
    if (MIN_SESSION_MINUTES..=MAX_SESSION_MINUTES).contains(&minutes) {
        Ok(minutes)
    } else {
        Err(SessionError::InvalidDuration(minutes.to_string()))
    }
}

/// Parses a session length typed by a user.
///
/// Anything that is not a whole number of minutes in range is rejected,
/// including fractions such as `2.5` and negative numbers.
pub fn parse_minutes(input: &str) -> Result<u32, SessionError> {
    let trimmed = input.trim();
    let minutes: u32 = trimmed
        .parse()
        .map_err(|_| SessionError::InvalidDuration(trimmed.to_string()))?;
    validate_minutes(minutes)
}

/// Formats whole seconds as `MM:SS`.
pub fn format_remaining(total_seconds: u64) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

// ============================================================================
// SessionSnapshot
// ============================================================================

/// Point-in-time view of the session, returned by every session operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Logical state, with lazy expiry already applied
    pub state: TimerState,
    /// Whole seconds left, floored
    pub remaining_seconds: u64,
    /// Length the session was started with
    pub total_duration_seconds: u64,
    /// Whole seconds consumed so far, floored
    pub elapsed_seconds: u64,
}

impl SessionSnapshot {
    /// Session length in whole minutes.
    pub fn total_minutes(&self) -> u64 {
        self.total_duration_seconds / 60
    }

    /// Remaining time as `MM:SS`.
    pub fn remaining_display(&self) -> String {
        format_remaining(self.remaining_seconds)
    }

    /// Returns true if the session is running or paused.
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }
}

// ============================================================================
// Tests
// ============================================================================
