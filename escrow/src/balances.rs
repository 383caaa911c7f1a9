//! Balance store: identity → internal balance.

use crate::error::EscrowError;
use remit_types::Identity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-identity balances held in custody.
///
/// A missing entry reads as zero. Entries appear on first credit and are
/// never removed, even when they return to zero.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BalanceLedger {
    balances: HashMap<Identity, u128>,
}

impl BalanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, who: &Identity) -> u128 {
        self.balances.get(who).copied().unwrap_or(0)
    }

    /// Add `amount` to `who`, creating the entry if needed.
    pub fn credit(&mut self, who: &Identity, amount: u128) {
        let entry = self.balances.entry(who.clone()).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    /// Remove `amount` from `who`. Leaves the entry untouched on failure.
    pub fn debit(&mut self, who: &Identity, amount: u128) -> Result<(), EscrowError> {
        let available = self.balance_of(who);
        if available < amount {
            return Err(EscrowError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        if let Some(entry) = self.balances.get_mut(who) {
            *entry = available - amount;
        }
        Ok(())
    }

    /// Sum of every balance.
    pub fn total(&self) -> u128 {
        self.balances
            .values()
            .fold(0u128, |acc, b| acc.saturating_add(*b))
    }

    /// The stored entry for `who`; `None` if it was never credited.
    pub fn entry(&self, who: &Identity) -> Option<u128> {
        self.balances.get(who).copied()
    }

    /// Put `who`'s entry back to a value read earlier with
    /// [`entry`](Self::entry).
    pub fn restore_entry(&mut self, who: &Identity, entry: Option<u128>) {
        match entry {
            Some(balance) => {
                self.balances.insert(who.clone(), balance);
            }
            None => {
                self.balances.remove(who);
            }
        }
    }
}
