//! Display utilities for the redgreen CLI.
//!
//! This module provides formatted output for:
//! - Success messages for each session operation
//! - Status lines
//! - Error messages with hints

use crate::session::SessionError;
use crate::types::{SessionSnapshot, TimerState};

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows a success message for session start.
    pub fn show_start_success(snapshot: &SessionSnapshot) {
        println!("{}", Self::start_message(snapshot));
    }

    /// Shows a success message for session pause.
    pub fn show_pause_success(snapshot: &SessionSnapshot) {
        println!("{}", Self::pause_message(snapshot));
    }

    /// Shows a success message for session resume.
    pub fn show_resume_success(snapshot: &SessionSnapshot) {
        println!("{}", Self::resume_message(snapshot));
    }

    /// Shows a success message for session restart.
    pub fn show_restart_success(snapshot: &SessionSnapshot) {
        println!("{}", Self::restart_message(snapshot));
    }

    /// Shows a success message for clearing the session.
    pub fn show_clear_success(previous: TimerState) {
        println!("{}", Self::clear_message(previous));
    }

    /// Shows the current session status.
    pub fn show_status(snapshot: &SessionSnapshot) {
        println!("{}", Self::status_message(snapshot));
    }

    /// Shows the status line for a missing session.
    pub fn show_no_session() {
        println!("No active session");
    }

    /// Shows the session as JSON.
    pub fn show_status_json(snapshot: &SessionSnapshot) -> serde_json::Result<()> {
        println!("{}", serde_json::to_string_pretty(snapshot)?);
        Ok(())
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }

    /// Shows a session error with its hint, if it has one.
    pub fn show_session_error(error: &SessionError) {
        Self::show_error(&error.to_string());
        if let Some(hint) = error.suggestion() {
            eprintln!("Hint: {}", hint);
        }
    }

    fn start_message(snapshot: &SessionSnapshot) -> String {
        format!("Session started: {} minutes", snapshot.total_minutes())
    }

    fn pause_message(snapshot: &SessionSnapshot) -> String {
        format!(
            "Session paused at {} remaining",
            snapshot.remaining_display()
        )
    }

    fn resume_message(snapshot: &SessionSnapshot) -> String {
        format!("Session resumed: {} remaining", snapshot.remaining_display())
    }

    fn restart_message(snapshot: &SessionSnapshot) -> String {
        format!("Session restarted: {} minutes", snapshot.total_minutes())
    }

    fn clear_message(previous: TimerState) -> &'static str {
        if previous == TimerState::Idle {
            "No session to clear"
        } else {
            "Session cleared"
        }
    }

    fn status_message(snapshot: &SessionSnapshot) -> String {
        match snapshot.state {
            TimerState::Running => format!("{} remaining", snapshot.remaining_display()),
            TimerState::Paused => format!("{} remaining (paused)", snapshot.remaining_display()),
            TimerState::Expired => "Session expired".to_string(),
            TimerState::Idle => "No active session".to_string(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
