//! Command definitions for the redgreen CLI.
//!
//! Uses clap derive macro for argument parsing.

use clap::{Args, Parser, Subcommand};

use crate::types::parse_minutes;

// ============================================================================
// CLI Structure
// ============================================================================

/// redgreen - timeboxed sessions for TDD loops
#[derive(Parser, Debug)]
#[command(
    name = "redgreen",
    version,
    about = "Timebox your red-green-refactor loops",
    long_about = "A session timer for test-driven development.\n\
                  One session runs at a time and is shared by every terminal.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start a new session
    Start(StartArgs),

    /// Show the current session
    Status(StatusArgs),

    /// Pause the running session
    Pause,

    /// Resume a paused session
    Resume,

    /// Start the session over with its original length
    Restart,

    /// Discard the session, whatever its state
    Clear,

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Arguments
// ============================================================================

/// Arguments for the start command
#[derive(Args, Debug, Clone)]
pub struct StartArgs {
    /// Session length in whole minutes (1-60)
    #[arg(value_parser = validate_minutes_arg, allow_hyphen_values = true)]
    pub minutes: u32,
}

/// Arguments for the status command
#[derive(Args, Debug, Clone, Default)]
pub struct StatusArgs {
    /// Print the status as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Validates the session length argument.
fn validate_minutes_arg(s: &str) -> Result<u32, String> {
    parse_minutes(s).map_err(|e| e.to_string())
}

// ============================================================================
// Tests
// ============================================================================
