//! The ledger node: the host around the escrow engine.
//!
//! Concurrent callers are serialised behind one mutex that guards both the
//! engine and the custody backend, so an operation's ledger mutation and its
//! asset movement commit together or not at all.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use remit_custody::{AssetCustody, CustodyError};
use remit_escrow::{EscrowError, ExchangeRate, RemitEngine, TransferRecord, TransferState};
use remit_types::{CountryCode, Identity, PairKey, Tick, TransferId};
use remit_utils::StatsCounter;

use crate::NodeError;

const STAT_NAMES: &[&str] = &["accepted", "rejected", "custody_failures"];

struct Host<C> {
    engine: RemitEngine,
    custody: C,
}

impl<C: AssetCustody> Host<C> {
    /// Apply an engine mutation on `account`, then the matching custody
    /// movement. If the movement fails the engine is put back exactly as it
    /// was before the call, clock included, as if the invocation never
    /// happened.
    fn settle<T>(
        &mut self,
        account: &Identity,
        mutate: impl FnOnce(&mut RemitEngine) -> Result<T, EscrowError>,
        movement: impl FnOnce(&mut C, &T) -> Result<(), CustodyError>,
    ) -> Result<T, NodeError> {
        let checkpoint = self.engine.checkpoint(account);
        let value = mutate(&mut self.engine)?;
        if let Err(e) = movement(&mut self.custody, &value) {
            self.engine.rollback(checkpoint);
            return Err(e.into());
        }
        Ok(value)
    }
}

/// Thread-safe host for one ledger.
pub struct LedgerNode<C> {
    host: Mutex<Host<C>>,
    stats: StatsCounter,
}

impl<C: AssetCustody> LedgerNode<C> {
    /// Start a fresh ledger owned by `owner`.
    pub fn new(owner: Identity, custody: C) -> Self {
        Self::from_engine(RemitEngine::new(owner), custody)
    }

    pub fn from_engine(engine: RemitEngine, custody: C) -> Self {
        tracing::info!(
            owner = %engine.owner(),
            custody = custody.name(),
            tick = %engine.current_tick(),
            "ledger node started"
        );
        Self {
            host: Mutex::new(Host { engine, custody }),
            stats: StatsCounter::new(STAT_NAMES),
        }
    }

    /// Restore the engine from a snapshot file written by
    /// [`save_snapshot`](Self::save_snapshot).
    pub fn restore(path: impl AsRef<Path>, custody: C) -> Result<Self, NodeError> {
        Self::restore_with(path, |_| custody)
    }

    /// Like [`restore`](Self::restore), but builds the custody backend from
    /// the restored engine, e.g. to seed its holdings with the liabilities.
    pub fn restore_with(
        path: impl AsRef<Path>,
        custody: impl FnOnce(&RemitEngine) -> C,
    ) -> Result<Self, NodeError> {
        let bytes = std::fs::read(path.as_ref())?;
        let engine = RemitEngine::load_state(&bytes)?;
        tracing::info!(
            path = %path.as_ref().display(),
            transfers = engine.transfer_count(),
            "ledger restored from snapshot"
        );
        let custody = custody(&engine);
        Ok(Self::from_engine(engine, custody))
    }

    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> Result<(), NodeError> {
        let bytes = self.lock().engine.save_state()?;
        std::fs::write(path.as_ref(), bytes)?;
        tracing::info!(path = %path.as_ref().display(), "ledger snapshot written");
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Host<C>> {
        // A panic mid-operation cannot leave a half-applied mutation behind:
        // every engine operation validates fully before it writes.
        self.host.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn run<T>(
        &self,
        op: &'static str,
        f: impl FnOnce(&mut Host<C>) -> Result<T, NodeError>,
    ) -> Result<T, NodeError> {
        let result = {
            let mut host = self.lock();
            f(&mut host)
        };
        match &result {
            Ok(_) => self.stats.increment("accepted"),
            Err(NodeError::Custody(e)) => {
                self.stats.increment("custody_failures");
                tracing::warn!(op, error = %e, "custody movement failed, operation rolled back");
            }
            Err(e) => {
                self.stats.increment("rejected");
                tracing::debug!(op, error = %e, "operation rejected");
            }
        }
        result
    }

    // ── Balance ledger ──────────────────────────────────────────────────

    pub fn deposit(&self, who: &Identity, amount: u128) -> Result<(), NodeError> {
        self.run("deposit", |host| {
            host.settle(who, |e| e.deposit(who, amount), |c, _| c.collect(who, amount))
        })
    }

    pub fn withdraw(&self, who: &Identity, amount: u128) -> Result<(), NodeError> {
        self.run("withdraw", |host| {
            host.settle(who, |e| e.withdraw(who, amount), |c, _| c.disburse(who, amount))
        })
    }

    // ── Transfers ───────────────────────────────────────────────────────

    pub fn create_transfer(
        &self,
        sender: &Identity,
        recipient: &Identity,
        amount: u128,
        country_from: CountryCode,
        country_to: CountryCode,
        expiry_duration: u64,
    ) -> Result<TransferId, NodeError> {
        self.run("create_transfer", |host| {
            Ok(host.engine.create_transfer(
                sender,
                recipient,
                amount,
                country_from,
                country_to,
                expiry_duration,
            )?)
        })
    }

    pub fn quick_transfer(
        &self,
        sender: &Identity,
        recipient: &Identity,
        amount: u128,
    ) -> Result<TransferId, NodeError> {
        self.run("quick_transfer", |host| {
            Ok(host.engine.quick_transfer(sender, recipient, amount)?)
        })
    }

    pub fn claim_transfer(&self, caller: &Identity, id: TransferId) -> Result<(), NodeError> {
        self.run("claim_transfer", |host| Ok(host.engine.claim_transfer(caller, id)?))
    }

    pub fn cancel_expired_transfer(
        &self,
        caller: &Identity,
        id: TransferId,
    ) -> Result<(), NodeError> {
        self.run("cancel_expired_transfer", |host| {
            Ok(host.engine.cancel_expired_transfer(caller, id)?)
        })
    }

    pub fn batch_claim(
        &self,
        caller: &Identity,
        ids: &[TransferId],
    ) -> Result<Vec<Result<(), EscrowError>>, NodeError> {
        self.run("batch_claim", |host| Ok(host.engine.batch_claim(caller, ids)?))
    }

    // ── Owner controls ──────────────────────────────────────────────────

    pub fn set_exchange_rate(
        &self,
        caller: &Identity,
        pair: PairKey,
        rate: u128,
    ) -> Result<(), NodeError> {
        self.run("set_exchange_rate", |host| {
            Ok(host.engine.set_exchange_rate(caller, pair, rate)?)
        })
    }

    pub fn pause(&self, caller: &Identity) -> Result<(), NodeError> {
        self.run("pause", |host| Ok(host.engine.pause(caller)?))
    }

    pub fn unpause(&self, caller: &Identity) -> Result<(), NodeError> {
        self.run("unpause", |host| Ok(host.engine.unpause(caller)?))
    }

    /// Drain the fee pool and pay it out to the owner.
    pub fn withdraw_fees(&self, caller: &Identity) -> Result<u128, NodeError> {
        self.run("withdraw_fees", |host| {
            host.settle(
                caller,
                |e| e.withdraw_fees(caller),
                |c, &amount| c.disburse(caller, amount),
            )
        })
    }

    // ── Reads ───────────────────────────────────────────────────────────

    pub fn balance_of(&self, who: &Identity) -> u128 {
        self.lock().engine.balance_of(who)
    }

    pub fn get_transfer(&self, id: TransferId) -> Option<TransferRecord> {
        self.lock().engine.get_transfer(id).cloned()
    }

    pub fn check_expired(&self, id: TransferId) -> bool {
        self.lock().engine.check_expired(id)
    }

    pub fn transfer_state(&self, id: TransferId) -> Option<TransferState> {
        self.lock().engine.transfer_state(id)
    }

    pub fn exchange_rate(&self, pair: &PairKey) -> Option<ExchangeRate> {
        self.lock().engine.exchange_rate(pair).copied()
    }

    pub fn fee_pool(&self) -> u128 {
        self.lock().engine.fee_pool()
    }

    pub fn is_paused(&self) -> bool {
        self.lock().engine.is_paused()
    }

    pub fn current_tick(&self) -> Tick {
        self.lock().engine.current_tick()
    }

    /// Run a read against a consistent view of the engine.
    pub fn with_engine<R>(&self, f: impl FnOnce(&RemitEngine) -> R) -> R {
        f(&self.lock().engine)
    }

    /// Run a closure against the custody backend, e.g. to fund a simulated
    /// wallet or inject a failure.
    pub fn with_custody<R>(&self, f: impl FnOnce(&mut C) -> R) -> R {
        f(&mut self.lock().custody)
    }

    /// Check that custody holds exactly what the ledger owes.
    pub fn audit(&self) -> Result<(), NodeError> {
        let host = self.lock();
        let held = host.custody.held();
        let owed = host.engine.liabilities();
        if held != owed {
            tracing::error!(held, owed, "custody and ledger disagree");
            return Err(NodeError::Imbalance { held, owed });
        }
        Ok(())
    }

    /// Counters of accepted, rejected and rolled-back operations.
    pub fn stats(&self) -> &StatsCounter {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remit_nullables::NullCustody;

    fn id(s: &str) -> Identity {
        Identity::new(s).unwrap()
    }

    fn node() -> LedgerNode<NullCustody> {
        let custody = NullCustody::with_funding([(id("user1"), 1_000_000_000)]);
        LedgerNode::new(id("owner"), custody)
    }

    #[test]
    fn deposit_moves_custody_and_ledger_together() {
        let node = node();
        node.deposit(&id("user1"), 100_000_000).unwrap();
        assert_eq!(node.balance_of(&id("user1")), 100_000_000);
        assert_eq!(node.with_custody(|c| c.wallet_of(&id("user1"))), 900_000_000);
        node.audit().unwrap();
        assert_eq!(node.stats().get("accepted"), 1);
    }

    #[test]
    fn custody_failure_rolls_back_including_clock() {
        let node = node();
        node.with_custody(|c| c.fail_next("rail offline"));
        let err = node.deposit(&id("user1"), 100).unwrap_err();
        assert!(matches!(err, NodeError::Custody(CustodyError::Unavailable(_))));
        assert_eq!(node.balance_of(&id("user1")), 0);
        assert_eq!(node.current_tick(), Tick::ZERO);
        assert_eq!(node.stats().get("custody_failures"), 1);
        assert_eq!(node.stats().total(), 1);
        node.audit().unwrap();
    }

    #[test]
    fn deposit_beyond_external_funds_is_rolled_back() {
        let node = node();
        let err = node.deposit(&id("user2"), 5).unwrap_err();
        assert!(matches!(err, NodeError::Custody(CustodyError::InsufficientFunds { .. })));
        assert_eq!(node.balance_of(&id("user2")), 0);
    }

    #[test]
    fn ledger_rejection_keeps_the_tick() {
        let node = node();
        let err = node.deposit(&id("user1"), 0).unwrap_err();
        assert_eq!(err.as_escrow(), Some(&EscrowError::InvalidAmount));
        assert_eq!(node.current_tick(), Tick::new(1));
        assert_eq!(node.stats().get("rejected"), 1);
    }

    #[test]
    fn withdraw_pays_out_to_wallet() {
        let node = node();
        node.deposit(&id("user1"), 50).unwrap();
        node.withdraw(&id("user1"), 20).unwrap();
        assert_eq!(node.balance_of(&id("user1")), 30);
        assert_eq!(node.with_custody(|c| c.wallet_of(&id("user1"))), 1_000_000_000 - 30);
        node.audit().unwrap();
    }

    #[test]
    fn rollback_leaves_existing_transfers_untouched() {
        let node = node();
        node.deposit(&id("user1"), 500_000_000).unwrap();
        let ids: Vec<_> = (0..20)
            .map(|_| node.quick_transfer(&id("user1"), &id("user2"), 5_000_000).unwrap())
            .collect();
        node.claim_transfer(&id("user2"), ids[0]).unwrap();
        let tick = node.current_tick();
        let balance = node.balance_of(&id("user1"));

        node.with_custody(|c| c.fail_next("rail offline"));
        assert!(node.withdraw(&id("user1"), 1_000).is_err());
        assert_eq!(node.current_tick(), tick);
        assert_eq!(node.balance_of(&id("user1")), balance);
        assert_eq!(node.transfer_state(ids[0]), Some(TransferState::Claimed));
        assert_eq!(node.with_engine(RemitEngine::transfer_count), 20);
        node.audit().unwrap();
    }

    #[test]
    fn failed_fee_payout_keeps_pool() {
        let node = node();
        node.deposit(&id("user1"), 100_000_000).unwrap();
        node.quick_transfer(&id("user1"), &id("user2"), 10_000_000).unwrap();
        let pool = node.fee_pool();
        node.with_custody(|c| c.fail_next("rail offline"));
        assert!(node.withdraw_fees(&id("owner")).is_err());
        assert_eq!(node.fee_pool(), pool);
        assert_eq!(node.withdraw_fees(&id("owner")).unwrap(), pool);
        assert_eq!(node.with_custody(|c| c.wallet_of(&id("owner"))), pool);
        node.audit().unwrap();
    }
}
