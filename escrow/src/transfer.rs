//! Escrowed transfer records and the registry that allocates them.

use remit_types::{CountryCode, Identity, Tick, TransferId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lifecycle of a transfer. `Claimed` and `Cancelled` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferState {
    Active,
    Claimed,
    Cancelled,
}

/// An escrowed transfer.
///
/// `amount` is owed to the recipient on claim or refunded to the sender on
/// cancellation. `fee` was taken at creation and is never returned.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub id: TransferId,
    pub sender: Identity,
    pub recipient: Identity,
    pub amount: u128,
    pub fee: u128,
    /// Clock reading when the transfer was created.
    pub created_at: Tick,
    /// Ticks after `created_at` during which the transfer can be claimed.
    pub expires_after: u64,
    /// Write-once; mutually exclusive with `cancelled`.
    pub claimed: bool,
    /// Write-once; mutually exclusive with `claimed`.
    pub cancelled: bool,
    pub country_from: CountryCode,
    pub country_to: CountryCode,
}

impl TransferRecord {
    pub fn state(&self) -> TransferState {
        if self.claimed {
            TransferState::Claimed
        } else if self.cancelled {
            TransferState::Cancelled
        } else {
            TransferState::Active
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.claimed || self.cancelled
    }

    /// `now > created_at + expires_after`.
    pub fn is_expired(&self, now: Tick) -> bool {
        self.created_at.has_expired(self.expires_after, now)
    }
}

/// All transfers ever created, keyed by id, plus the id allocator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransferRegistry {
    records: BTreeMap<TransferId, TransferRecord>,
    next_id: TransferId,
}

impl Default for TransferRegistry {
    fn default() -> Self {
        Self {
            records: BTreeMap::new(),
            next_id: TransferId::FIRST,
        }
    }
}

impl TransferRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next id. Ids are never reused.
    pub fn allocate_id(&mut self) -> TransferId {
        let id = self.next_id;
        self.next_id = id.next();
        id
    }

    /// The id the next `allocate_id` call will return.
    pub fn next_id(&self) -> TransferId {
        self.next_id
    }

    pub fn insert(&mut self, record: TransferRecord) {
        self.records.insert(record.id, record);
    }

    pub fn get(&self, id: TransferId) -> Option<&TransferRecord> {
        self.records.get(&id)
    }

    pub fn get_mut(&mut self, id: TransferId) -> Option<&mut TransferRecord> {
        self.records.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of amounts still held for active transfers.
    pub fn escrowed_total(&self) -> u128 {
        self.records
            .values()
            .filter(|r| !r.is_terminal())
            .fold(0u128, |acc, r| acc.saturating_add(r.amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: TransferId, amount: u128) -> TransferRecord {
        TransferRecord {
            id,
            sender: Identity::new("alice").unwrap(),
            recipient: Identity::new("bob").unwrap(),
            amount,
            fee: 1_000_000,
            created_at: Tick::new(3),
            expires_after: 5,
            claimed: false,
            cancelled: false,
            country_from: CountryCode::usa(),
            country_to: CountryCode::new("MEX").unwrap(),
        }
    }

    #[test]
    fn ids_start_at_one_and_increase() {
        let mut registry = TransferRegistry::new();
        assert_eq!(registry.allocate_id(), TransferId::new(1));
        assert_eq!(registry.allocate_id(), TransferId::new(2));
        assert_eq!(registry.next_id(), TransferId::new(3));
    }

    #[test]
    fn state_reflects_flags() {
        let mut r = record(TransferId::new(1), 10);
        assert_eq!(r.state(), TransferState::Active);
        r.claimed = true;
        assert_eq!(r.state(), TransferState::Claimed);
        assert!(r.is_terminal());

        let mut r = record(TransferId::new(2), 10);
        r.cancelled = true;
        assert_eq!(r.state(), TransferState::Cancelled);
    }

    #[test]
    fn expiry_uses_created_plus_duration() {
        let r = record(TransferId::new(1), 10);
        assert!(!r.is_expired(Tick::new(8)));
        assert!(r.is_expired(Tick::new(9)));
    }

    #[test]
    fn escrowed_total_skips_terminal_records() {
        let mut registry = TransferRegistry::new();
        let a = registry.allocate_id();
        registry.insert(record(a, 100));
        let b = registry.allocate_id();
        let mut claimed = record(b, 50);
        claimed.claimed = true;
        registry.insert(claimed);
        assert_eq!(registry.escrowed_total(), 100);
        assert_eq!(registry.len(), 2);
    }
}
