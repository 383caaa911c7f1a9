//! Nullable custody: an in-memory native asset for testing.

use remit_custody::{AssetCustody, CustodyError};
use remit_types::Identity;
use std::collections::HashMap;

/// Tracks external (off-ledger) holdings per identity and the amount held
/// in custody. Failures can be injected with [`NullCustody::fail_next`].
#[derive(Clone, Debug, Default)]
pub struct NullCustody {
    wallets: HashMap<Identity, u128>,
    held: u128,
    fail_next: Option<String>,
}

impl NullCustody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with initial external holdings.
    pub fn with_funding(funding: impl IntoIterator<Item = (Identity, u128)>) -> Self {
        Self {
            wallets: funding.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Seed the custody holdings, e.g. to back a ledger restored from a
    /// snapshot.
    pub fn with_held(mut self, held: u128) -> Self {
        self.held = held;
        self
    }

    /// Give `who` more external funds.
    pub fn fund(&mut self, who: &Identity, amount: u128) {
        let entry = self.wallets.entry(who.clone()).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    /// External (not yet deposited) funds of `who`.
    pub fn wallet_of(&self, who: &Identity) -> u128 {
        self.wallets.get(who).copied().unwrap_or(0)
    }

    /// Make the next `collect` or `disburse` fail with `Unavailable(reason)`.
    pub fn fail_next(&mut self, reason: impl Into<String>) {
        self.fail_next = Some(reason.into());
    }

    fn injected_failure(&mut self) -> Result<(), CustodyError> {
        match self.fail_next.take() {
            Some(reason) => Err(CustodyError::Unavailable(reason)),
            None => Ok(()),
        }
    }
}

impl AssetCustody for NullCustody {
    fn collect(&mut self, from: &Identity, amount: u128) -> Result<(), CustodyError> {
        self.injected_failure()?;
        let available = self.wallet_of(from);
        if available < amount {
            return Err(CustodyError::InsufficientFunds {
                holder: from.clone(),
                needed: amount,
                available,
            });
        }
        self.wallets.insert(from.clone(), available - amount);
        self.held = self.held.saturating_add(amount);
        Ok(())
    }

    fn disburse(&mut self, to: &Identity, amount: u128) -> Result<(), CustodyError> {
        self.injected_failure()?;
        if self.held < amount {
            return Err(CustodyError::Underfunded {
                needed: amount,
                held: self.held,
            });
        }
        self.held -= amount;
        self.fund(to, amount);
        Ok(())
    }

    fn held(&self) -> u128 {
        self.held
    }

    fn name(&self) -> &str {
        "null-custody"
    }
}
