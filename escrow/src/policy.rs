//! Policy and control state: owner, pause flag, fee pool, exchange rates.

use crate::error::EscrowError;
use remit_types::{Identity, PairKey, Tick};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Informational exchange-rate entry. Never applied to transfer amounts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub rate: u128,
    pub updated_at: Tick,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PolicyState {
    /// Fixed at construction; there is no ownership transfer.
    owner: Identity,
    paused: bool,
    /// Fees collected from created transfers and not yet withdrawn.
    fee_pool: u128,
    exchange_rates: BTreeMap<PairKey, ExchangeRate>,
}

impl PolicyState {
    pub fn new(owner: Identity) -> Self {
        Self {
            owner,
            paused: false,
            fee_pool: 0,
            exchange_rates: BTreeMap::new(),
        }
    }

    pub fn owner(&self) -> &Identity {
        &self.owner
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn fee_pool(&self) -> u128 {
        self.fee_pool
    }

    pub fn ensure_owner(&self, caller: &Identity) -> Result<(), EscrowError> {
        if caller != &self.owner {
            return Err(EscrowError::NotAuthorized);
        }
        Ok(())
    }

    /// Pause is a blanket authorization gate.
    pub fn ensure_running(&self) -> Result<(), EscrowError> {
        if self.paused {
            return Err(EscrowError::NotAuthorized);
        }
        Ok(())
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn accrue_fee(&mut self, fee: u128) {
        self.fee_pool = self.fee_pool.saturating_add(fee);
    }

    /// Empty the fee pool, returning what it held. Fails on an empty pool.
    pub fn take_fees(&mut self) -> Result<u128, EscrowError> {
        if self.fee_pool == 0 {
            return Err(EscrowError::InvalidAmount);
        }
        Ok(std::mem::take(&mut self.fee_pool))
    }

    pub fn restore_fee_pool(&mut self, amount: u128) {
        self.fee_pool = amount;
    }

    pub fn set_rate(&mut self, pair: PairKey, rate: u128, now: Tick) {
        self.exchange_rates.insert(pair, ExchangeRate { rate, updated_at: now });
    }

    pub fn rate(&self, pair: &PairKey) -> Option<&ExchangeRate> {
        self.exchange_rates.get(pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> Identity {
        Identity::new("owner").unwrap()
    }

    #[test]
    fn only_owner_passes_gate() {
        let policy = PolicyState::new(owner());
        assert!(policy.ensure_owner(&owner()).is_ok());
        assert_eq!(
            policy.ensure_owner(&Identity::new("mallory").unwrap()),
            Err(EscrowError::NotAuthorized)
        );
    }

    #[test]
    fn take_fees_zeroes_pool() {
        let mut policy = PolicyState::new(owner());
        assert_eq!(policy.take_fees(), Err(EscrowError::InvalidAmount));
        policy.accrue_fee(7);
        policy.accrue_fee(5);
        assert_eq!(policy.take_fees(), Ok(12));
        assert_eq!(policy.fee_pool(), 0);
    }

    #[test]
    fn rate_overwrite_keeps_latest() {
        let mut policy = PolicyState::new(owner());
        let pair = PairKey::new("USD-MXN").unwrap();
        policy.set_rate(pair.clone(), 17, Tick::new(1));
        policy.set_rate(pair.clone(), 18, Tick::new(4));
        assert_eq!(
            policy.rate(&pair),
            Some(&ExchangeRate {
                rate: 18,
                updated_at: Tick::new(4)
            })
        );
    }
}
