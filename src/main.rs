//! redgreen CLI - timeboxed sessions for TDD loops
//!
//! Each invocation performs one operation on the shared session and exits:
//! - 0: the operation succeeded and the session is running or paused
//! - 1: no session, an expired session, or an error

use anyhow::Result;
use clap::{CommandFactory, Parser};

use redgreen::cli::{Cli, Commands, Display};
use redgreen::session::{SessionError, SessionManager};
use redgreen::types::SessionSnapshot;

/// Exit code for an active session or a successful command.
const EXIT_OK: i32 = 0;

/// Exit code for an inactive session or a failed command.
const EXIT_INACTIVE: i32 = 1;

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    match execute(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            match e.downcast_ref::<SessionError>() {
                Some(session_error) => Display::show_session_error(session_error),
                None => Display::show_error(&format!("{:#}", e)),
            }
            std::process::exit(EXIT_INACTIVE);
        }
    }
}

/// Initializes the tracing subscriber for logging.
///
/// `RUST_LOG` wins over `--verbose`. Logs go to stderr so that stdout stays
/// parseable for `status --json`.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Executes the CLI command and returns the process exit code.
async fn execute(cli: Cli) -> Result<i32> {
    match cli.command {
        Some(Commands::Start(args)) => {
            let manager = SessionManager::new()?;
            let snapshot = manager.start_session(args.minutes).await?;
            Display::show_start_success(&snapshot);
            Ok(exit_code(&snapshot))
        }
        Some(Commands::Status(args)) => {
            let manager = SessionManager::new()?;
            match manager.get_status().await {
                Ok(snapshot) => {
                    if args.json {
                        Display::show_status_json(&snapshot)?;
                    } else {
                        Display::show_status(&snapshot);
                    }
                    Ok(exit_code(&snapshot))
                }
                Err(SessionError::NoActiveSession) => {
                    if args.json {
                        println!("null");
                    } else {
                        Display::show_no_session();
                    }
                    Ok(EXIT_INACTIVE)
                }
                Err(e) => Err(e.into()),
            }
        }
        Some(Commands::Pause) => {
            let manager = SessionManager::new()?;
            let snapshot = manager.pause_session().await?;
            Display::show_pause_success(&snapshot);
            Ok(exit_code(&snapshot))
        }
        Some(Commands::Resume) => {
            let manager = SessionManager::new()?;
            let snapshot = manager.resume_session().await?;
            Display::show_resume_success(&snapshot);
            Ok(exit_code(&snapshot))
        }
        Some(Commands::Restart) => {
            let manager = SessionManager::new()?;
            let snapshot = manager.restart_session().await?;
            Display::show_restart_success(&snapshot);
            Ok(exit_code(&snapshot))
        }
        Some(Commands::Clear) => {
            let manager = SessionManager::new()?;
            let previous = manager.clear_session().await?;
            Display::show_clear_success(previous);
            Ok(EXIT_OK)
        }
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
            Ok(EXIT_OK)
        }
        None => {
            // No command provided, show help
            Cli::command().print_help()?;
            Ok(EXIT_OK)
        }
    }
}

/// Maps a snapshot to the process exit code.
fn exit_code(snapshot: &SessionSnapshot) -> i32 {
    if snapshot.is_active() {
        EXIT_OK
    } else {
        EXIT_INACTIVE
    }
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================
