//! Outcome counters for ledger operations.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Named counters shared between threads. The set of names is fixed when
/// the counter is built; bumping or reading any other name is a no-op that
/// reads as zero.
pub struct StatsCounter {
    counters: BTreeMap<&'static str, AtomicU64>,
}

impl StatsCounter {
    pub fn new(names: &[&'static str]) -> Self {
        Self {
            counters: names.iter().map(|&n| (n, AtomicU64::new(0))).collect(),
        }
    }

    pub fn increment(&self, name: &str) {
        if let Some(counter) = self.counters.get(name) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn get(&self, name: &str) -> u64 {
        self.counters
            .get(name)
            .map_or(0, |c| c.load(Ordering::Relaxed))
    }

    /// Sum over every counter.
    pub fn total(&self) -> u64 {
        self.counters
            .values()
            .map(|c| c.load(Ordering::Relaxed))
            .sum()
    }

    /// Current value of every counter, ordered by name.
    pub fn snapshot(&self) -> BTreeMap<&'static str, u64> {
        self.counters
            .iter()
            .map(|(&name, c)| (name, c.load(Ordering::Relaxed)))
            .collect()
    }
}
