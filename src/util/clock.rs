//! Wall-clock access.
//!
//! All core operations take `now_ms` explicitly; the service reads it from an
//! injected [`Clock`] so tests can move time forward by hand.

use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

/// Milliseconds in one minute.
pub const MINUTE_MS: u128 = 60_000;
/// Milliseconds in one hour.
pub const HOUR_MS: u128 = 60 * MINUTE_MS;
const DAY_MS: u128 = 24 * HOUR_MS;

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

/// Whether the UTC day containing `ms` is a Sunday.
pub const fn is_sunday(ms: u128) -> bool {
    // 1970-01-01 was a Thursday.
    (ms / DAY_MS + 4) % 7 == 0
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> u128;
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u128 {
        now_ms()
    }
}

/// Manually advanced clock for tests and simulations.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<u128>,
}

impl ManualClock {
    /// Start the clock at `start_ms`.
    pub fn new(start_ms: u128) -> Self {
        Self {
            now: Mutex::new(start_ms),
        }
    }

    /// Move time forward.
    pub fn advance_ms(&self, delta: u128) {
        *self.now.lock() += delta;
    }

    /// Move time forward by whole minutes.
    pub fn advance_minutes(&self, minutes: u64) {
        self.advance_ms(u128::from(minutes) * MINUTE_MS);
    }

    /// Jump to an absolute time.
    pub fn set_ms(&self, ms: u128) {
        *self.now.lock() = ms;
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u128 {
        *self.now.lock()
    }
}
