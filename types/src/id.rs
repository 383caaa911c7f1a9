//! Transfer identifier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sequential identifier of an escrowed transfer.
///
/// Allocated starting at 1 and never reused; 0 is never a valid id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransferId(u64);

impl TransferId {
    /// The first id ever allocated.
    pub const FIRST: Self = Self(1);

    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }

    /// The id allocated after this one.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for TransferId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}
