//! redgreen library
//!
//! This library provides the core of the redgreen timeboxing timer:
//! - Pure timer state machine with lazy expiry
//! - Session manager that persists the timer to a per-user state file and
//!   serializes concurrent invocations with a file lock
//! - CLI command parsing and display utilities
//! - Shared types for state and status snapshots

#[cfg(not(unix))]
compile_error!("redgreen relies on flock(2) and a system-wide monotonic clock and only builds on Unix");

pub mod cli;
pub mod session;
pub mod types;

// Re-export commonly used types for convenience
pub use session::{SessionConfig, SessionError, SessionManager};
pub use types::{SessionSnapshot, TimerState};
