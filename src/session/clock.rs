//! Monotonic time sources for the session timer.
//!
//! Readings are offsets from an arbitrary system-wide origin (boot), so a
//! reading taken by one process can be compared with one taken by another.
//! Wall-clock time is never used.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::error::SessionError;

/// Source of monotonic readings.
pub trait Clock: Send + Sync {
    /// Returns the current reading.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform clock cannot be read.
    fn now(&self) -> Result<Duration, SessionError>;
}

// ============================================================================
// MonotonicClock
// ============================================================================

/// System-wide monotonic clock.
///
/// On Linux this is `CLOCK_BOOTTIME`, which keeps counting while the machine
/// is suspended. Elsewhere it is `CLOCK_MONOTONIC`; on macOS that clock also
/// includes time asleep.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl MonotonicClock {
    #[cfg(target_os = "linux")]
    const CLOCK_ID: libc::clockid_t = libc::CLOCK_BOOTTIME;

    #[cfg(not(target_os = "linux"))]
    const CLOCK_ID: libc::clockid_t = libc::CLOCK_MONOTONIC;
}

impl Clock for MonotonicClock {
    fn now(&self) -> Result<Duration, SessionError> {
        let mut ts = libc::timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };
        // SAFETY: `ts` is a valid, writable timespec and CLOCK_ID is a clock
        // the platform supports, so clock_gettime only writes into `ts`.
        let rc = unsafe { libc::clock_gettime(Self::CLOCK_ID, &mut ts) };
        if rc != 0 {
            return Err(SessionError::io(
                "failed to read the monotonic clock",
                std::io::Error::last_os_error(),
            ));
        }
        Ok(Duration::new(ts.tv_sec as u64, ts.tv_nsec as u32))
    }
}

// ============================================================================
// ManualClock
// ============================================================================

/// Clock that only moves when told to.
///
/// Clones share the same reading, so a test can hand one clone to a
/// session manager and advance time through another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<Mutex<Duration>>,
}

impl ManualClock {
    /// Creates a clock that reads `start`.
    pub fn new(start: Duration) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }

    /// Sets the reading outright, including backwards.
    pub fn set(&self, to: Duration) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Result<Duration, SessionError> {
        Ok(*self.now.lock().unwrap_or_else(|e| e.into_inner()))
    }
}
