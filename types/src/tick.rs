//! Logical clock used in place of wall-clock time.
//!
//! The ledger advances the clock exactly once per mutating operation,
//! successful or not. Expiry is measured in these ticks, never in seconds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A reading of the operation counter.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Tick(u64);

impl Tick {
    /// The clock before any operation has run.
    pub const ZERO: Self = Self(0);

    pub fn new(count: u64) -> Self {
        Self(count)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Step the clock forward by one operation.
    pub fn advance(&mut self) {
        self.0 = self.0.saturating_add(1);
    }

    /// Last tick at which something created at `self` with a lifetime of
    /// `duration` ticks is still live.
    pub fn deadline(&self, duration: u64) -> Self {
        Self(self.0.saturating_add(duration))
    }

    /// Whether `now` is strictly past `self + duration`.
    pub fn has_expired(&self, duration: u64, now: Tick) -> bool {
        now > self.deadline(duration)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_is_strictly_after_deadline() {
        let created = Tick::new(10);
        assert!(!created.has_expired(5, Tick::new(14)));
        assert!(!created.has_expired(5, Tick::new(15)));
        assert!(created.has_expired(5, Tick::new(16)));
    }

    #[test]
    fn deadline_saturates() {
        let created = Tick::new(u64::MAX - 1);
        assert_eq!(created.deadline(10), Tick::new(u64::MAX));
        assert!(!created.has_expired(10, Tick::new(u64::MAX)));
    }

    #[test]
    fn advance_moves_forward_by_one() {
        let mut t = Tick::ZERO;
        t.advance();
        t.advance();
        assert_eq!(t.as_u64(), 2);
    }
}
