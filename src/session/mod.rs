//! Session core for redgreen.
//!
//! One timed session exists at a time, shared by every invocation of the
//! tool through a single state file. This module contains:
//! - `timer`: pure state machine over monotonic clock readings
//! - `clock`: monotonic time sources
//! - `store`: the JSON record and its atomic replacement
//! - `lock`: the exclusive lock around each read-mutate-write cycle
//! - `manager`: session operations for front ends
//!
//! # Example
//!
//! ```no_run
//! use redgreen::session::SessionManager;
//!
//! # async fn example() -> Result<(), redgreen::session::SessionError> {
//! let manager = SessionManager::new()?;
//! let snapshot = manager.start_session(10).await?;
//! println!("{} remaining", snapshot.remaining_display());
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod lock;
pub mod manager;
pub mod store;
pub mod timer;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::SessionConfig;
pub use error::SessionError;
pub use lock::SessionLock;
pub use manager::SessionManager;
pub use store::{SessionRecord, StateStore};
pub use timer::Timer;
