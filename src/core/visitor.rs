//! Visitor records queued on an island.

use serde::{Deserialize, Serialize};

use crate::util::clock::MINUTE_MS;
use crate::util::types::Identity;

/// One queued identity and the time it last entered the active window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Visitor {
    /// Who is queued.
    pub identity: Identity,
    /// Planned number of trips, `None` when the visitor did not say.
    pub trips: Option<u32>,
    /// Join time while waiting; reset to the admission time on activation.
    pub admitted_at_ms: u128,
}

impl Visitor {
    /// Create a record at join time. A trip count of `0` means unspecified.
    pub fn new(identity: Identity, trips: u32, now_ms: u128) -> Self {
        Self {
            identity,
            trips: (trips > 0).then_some(trips),
            admitted_at_ms: now_ms,
        }
    }

    /// Restart the active-time budget.
    pub fn admit(&mut self, now_ms: u128) {
        self.admitted_at_ms = now_ms;
    }

    /// Whole minutes elapsed since [`Visitor::admitted_at_ms`].
    pub fn minutes_active(&self, now_ms: u128) -> u64 {
        let elapsed = now_ms.saturating_sub(self.admitted_at_ms) / MINUTE_MS;
        u64::try_from(elapsed).unwrap_or(u64::MAX)
    }

    /// Trip count as shown to humans.
    pub fn trips_label(&self) -> String {
        self.trips.map_or_else(|| "?".to_string(), |t| t.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_trips_is_unspecified() {
        let v = Visitor::new(Identity::new(1, "a"), 0, 0);
        assert_eq!(v.trips, None);
        assert_eq!(v.trips_label(), "?");
        let v = Visitor::new(Identity::new(1, "a"), 3, 0);
        assert_eq!(v.trips_label(), "3");
    }

    #[test]
    fn minutes_active_rounds_down_and_resets() {
        let mut v = Visitor::new(Identity::new(1, "a"), 0, 0);
        assert_eq!(v.minutes_active(MINUTE_MS * 5 + 59_999), 5);
        v.admit(MINUTE_MS * 10);
        assert_eq!(v.minutes_active(MINUTE_MS * 11), 1);
        assert_eq!(v.minutes_active(0), 0);
    }
}
