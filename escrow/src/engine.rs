//! Core ledger engine: balances, the transfer state machine and owner
//! controls over a single state container.
//!
//! Every mutating operation advances the logical clock first, even when it
//! goes on to fail, then runs its checks in a fixed order and only mutates
//! once all of them pass. A rejected call leaves everything but the clock
//! exactly as it found it.

use crate::balances::BalanceLedger;
use crate::error::EscrowError;
use crate::fee::calculate_fee;
use crate::policy::{ExchangeRate, PolicyState};
use crate::transfer::{TransferRecord, TransferRegistry, TransferState};
use remit_types::params::{DEFAULT_EXPIRY, MAX_BATCH_CLAIM};
use remit_types::{CountryCode, Identity, PairKey, Tick, TransferId};
use serde::{Deserialize, Serialize};

/// The part of the engine state that a deposit, a withdrawal or a fee
/// withdrawal can change: the clock, one balance entry and the fee pool.
///
/// Taken with [`RemitEngine::checkpoint`] before one of those operations and
/// handed back to [`RemitEngine::rollback`] to undo it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Checkpoint {
    clock: Tick,
    account: Identity,
    balance: Option<u128>,
    fee_pool: u128,
}

/// The ledger and transfer engine.
///
/// Owned by the host and driven through `&mut self`; the engine has no
/// internal synchronisation. Callers are passed explicitly and trusted as
/// already authenticated.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RemitEngine {
    clock: Tick,
    balances: BalanceLedger,
    transfers: TransferRegistry,
    policy: PolicyState,
}

impl RemitEngine {
    pub fn new(owner: Identity) -> Self {
        Self {
            clock: Tick::ZERO,
            balances: BalanceLedger::new(),
            transfers: TransferRegistry::new(),
            policy: PolicyState::new(owner),
        }
    }

    // ── Balance ledger ──────────────────────────────────────────────────

    /// Credit `amount` to `who`. The matching inbound asset movement is the
    /// host's job.
    pub fn deposit(&mut self, who: &Identity, amount: u128) -> Result<(), EscrowError> {
        self.clock.advance();
        self.policy.ensure_running()?;
        if amount == 0 {
            return Err(EscrowError::InvalidAmount);
        }
        self.balances.credit(who, amount);
        tracing::debug!(account = %who, amount, tick = %self.clock, "deposit credited");
        Ok(())
    }

    /// Debit `amount` from `who`. Not gated by pause.
    ///
    /// The balance check runs before the zero-amount check.
    pub fn withdraw(&mut self, who: &Identity, amount: u128) -> Result<(), EscrowError> {
        self.clock.advance();
        let available = self.balances.balance_of(who);
        if available < amount {
            return Err(EscrowError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        if amount == 0 {
            return Err(EscrowError::InvalidAmount);
        }
        self.balances.debit(who, amount)?;
        tracing::debug!(account = %who, amount, tick = %self.clock, "withdrawal debited");
        Ok(())
    }

    // ── Transfer state machine ──────────────────────────────────────────

    /// Escrow `amount` from `sender` for `recipient`, charging the transfer
    /// fee on top. Returns the new transfer's id.
    pub fn create_transfer(
        &mut self,
        sender: &Identity,
        recipient: &Identity,
        amount: u128,
        country_from: CountryCode,
        country_to: CountryCode,
        expiry_duration: u64,
    ) -> Result<TransferId, EscrowError> {
        self.clock.advance();
        self.policy.ensure_running()?;
        if amount == 0 {
            return Err(EscrowError::InvalidAmount);
        }
        if expiry_duration == 0 {
            return Err(EscrowError::InvalidDuration);
        }
        if sender == recipient {
            return Err(EscrowError::InvalidRecipient);
        }

        let fee = calculate_fee(amount);
        let Some(total) = amount.checked_add(fee) else {
            return Err(EscrowError::InsufficientBalance {
                needed: u128::MAX,
                available: self.balances.balance_of(sender),
            });
        };
        self.balances.debit(sender, total)?;

        let id = self.transfers.allocate_id();
        self.transfers.insert(TransferRecord {
            id,
            sender: sender.clone(),
            recipient: recipient.clone(),
            amount,
            fee,
            created_at: self.clock,
            expires_after: expiry_duration,
            claimed: false,
            cancelled: false,
            country_from,
            country_to,
        });
        self.policy.accrue_fee(fee);

        tracing::debug!(
            transfer = %id,
            %sender,
            %recipient,
            amount,
            fee,
            expires_after = expiry_duration,
            tick = %self.clock,
            "transfer created"
        );
        Ok(id)
    }

    /// [`create_transfer`](Self::create_transfer) with `USA`→`USA` and the
    /// default expiry.
    pub fn quick_transfer(
        &mut self,
        sender: &Identity,
        recipient: &Identity,
        amount: u128,
    ) -> Result<TransferId, EscrowError> {
        self.create_transfer(
            sender,
            recipient,
            amount,
            CountryCode::usa(),
            CountryCode::usa(),
            DEFAULT_EXPIRY,
        )
    }

    /// Recipient collects an active, unexpired transfer.
    ///
    /// Expiry is judged against the clock after this call's own tick.
    pub fn claim_transfer(&mut self, caller: &Identity, id: TransferId) -> Result<(), EscrowError> {
        self.clock.advance();
        let now = self.clock;
        let record = self
            .transfers
            .get_mut(id)
            .ok_or(EscrowError::TransferNotFound(id))?;
        self.policy.ensure_running()?;
        if caller != &record.recipient {
            return Err(EscrowError::NotAuthorized);
        }
        if record.is_terminal() {
            return Err(EscrowError::AlreadyClaimed(id));
        }
        if record.is_expired(now) {
            return Err(EscrowError::TransferExpired(id));
        }

        record.claimed = true;
        let amount = record.amount;
        self.balances.credit(caller, amount);
        tracing::debug!(transfer = %id, recipient = %caller, amount, tick = %now, "transfer claimed");
        Ok(())
    }

    /// Sender reclaims the amount of an expired, unclaimed transfer. The
    /// fee stays in the pool.
    ///
    /// Cancelling before expiry reports `NotAuthorized`, the same as a wrong
    /// caller.
    pub fn cancel_expired_transfer(
        &mut self,
        caller: &Identity,
        id: TransferId,
    ) -> Result<(), EscrowError> {
        self.clock.advance();
        let now = self.clock;
        let record = self
            .transfers
            .get_mut(id)
            .ok_or(EscrowError::TransferNotFound(id))?;
        self.policy.ensure_running()?;
        if caller != &record.sender {
            return Err(EscrowError::NotAuthorized);
        }
        if record.is_terminal() {
            return Err(EscrowError::AlreadyClaimed(id));
        }
        if !record.is_expired(now) {
            return Err(EscrowError::NotAuthorized);
        }

        record.cancelled = true;
        let amount = record.amount;
        self.balances.credit(caller, amount);
        tracing::debug!(transfer = %id, sender = %caller, refunded = amount, tick = %now, "transfer cancelled");
        Ok(())
    }

    /// Claim several transfers one after another.
    ///
    /// Each id is an independent claim with its own tick and its own result;
    /// a failure does not undo earlier successes. An empty list, or one with
    /// more than [`MAX_BATCH_CLAIM`] ids, is rejected whole with
    /// `InvalidAmount` after a single tick.
    pub fn batch_claim(
        &mut self,
        caller: &Identity,
        ids: &[TransferId],
    ) -> Result<Vec<Result<(), EscrowError>>, EscrowError> {
        if ids.is_empty() || ids.len() > MAX_BATCH_CLAIM {
            self.clock.advance();
            return Err(EscrowError::InvalidAmount);
        }
        Ok(ids
            .iter()
            .map(|&id| self.claim_transfer(caller, id))
            .collect())
    }

    // ── Owner controls ──────────────────────────────────────────────────

    /// Record an informational exchange rate for `pair`.
    pub fn set_exchange_rate(
        &mut self,
        caller: &Identity,
        pair: PairKey,
        rate: u128,
    ) -> Result<(), EscrowError> {
        self.clock.advance();
        self.policy.ensure_owner(caller)?;
        tracing::debug!(%pair, rate, tick = %self.clock, "exchange rate set");
        self.policy.set_rate(pair, rate, self.clock);
        Ok(())
    }

    pub fn pause(&mut self, caller: &Identity) -> Result<(), EscrowError> {
        self.clock.advance();
        self.policy.ensure_owner(caller)?;
        self.policy.set_paused(true);
        tracing::info!(tick = %self.clock, "ledger paused");
        Ok(())
    }

    pub fn unpause(&mut self, caller: &Identity) -> Result<(), EscrowError> {
        self.clock.advance();
        self.policy.ensure_owner(caller)?;
        self.policy.set_paused(false);
        tracing::info!(tick = %self.clock, "ledger unpaused");
        Ok(())
    }

    /// Drain the fee pool. Returns the amount the host must pay out to the
    /// owner.
    pub fn withdraw_fees(&mut self, caller: &Identity) -> Result<u128, EscrowError> {
        self.clock.advance();
        self.policy.ensure_owner(caller)?;
        let amount = self.policy.take_fees()?;
        tracing::info!(amount, tick = %self.clock, "fees withdrawn");
        Ok(amount)
    }

    // ── Reads ───────────────────────────────────────────────────────────

    pub fn balance_of(&self, who: &Identity) -> u128 {
        self.balances.balance_of(who)
    }

    pub fn get_transfer(&self, id: TransferId) -> Option<&TransferRecord> {
        self.transfers.get(id)
    }

    /// Whether transfer `id` is past its deadline at the current tick.
    /// Unknown ids read as not expired.
    pub fn check_expired(&self, id: TransferId) -> bool {
        self.transfers
            .get(id)
            .is_some_and(|r| r.is_expired(self.clock))
    }

    pub fn transfer_state(&self, id: TransferId) -> Option<TransferState> {
        self.transfers.get(id).map(TransferRecord::state)
    }

    pub fn exchange_rate(&self, pair: &PairKey) -> Option<&ExchangeRate> {
        self.policy.rate(pair)
    }

    pub fn fee_pool(&self) -> u128 {
        self.policy.fee_pool()
    }

    pub fn is_paused(&self) -> bool {
        self.policy.is_paused()
    }

    pub fn owner(&self) -> &Identity {
        self.policy.owner()
    }

    pub fn current_tick(&self) -> Tick {
        self.clock
    }

    pub fn next_transfer_id(&self) -> TransferId {
        self.transfers.next_id()
    }

    pub fn transfer_count(&self) -> usize {
        self.transfers.len()
    }

    /// Fee a transfer of `amount` would pay.
    pub fn calculate_fee(&self, amount: u128) -> u128 {
        calculate_fee(amount)
    }

    /// Amount held for active transfers.
    pub fn escrowed_total(&self) -> u128 {
        self.transfers.escrowed_total()
    }

    pub fn total_balances(&self) -> u128 {
        self.balances.total()
    }

    /// Everything the ledger owes: balances, escrowed amounts and the fee
    /// pool. Equals the native asset custody must hold.
    pub fn liabilities(&self) -> u128 {
        self.total_balances()
            .saturating_add(self.escrowed_total())
            .saturating_add(self.fee_pool())
    }

    // ── Rollback ────────────────────────────────────────────────────────

    /// Record what a single-account operation on `account` may touch.
    pub fn checkpoint(&self, account: &Identity) -> Checkpoint {
        Checkpoint {
            clock: self.clock,
            account: account.clone(),
            balance: self.balances.entry(account),
            fee_pool: self.policy.fee_pool(),
        }
    }

    /// Undo everything since `checkpoint`, clock included. Only valid when
    /// the operations in between were deposits, withdrawals or fee
    /// withdrawals on the checkpointed account.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        self.clock = checkpoint.clock;
        self.balances
            .restore_entry(&checkpoint.account, checkpoint.balance);
        self.policy.restore_fee_pool(checkpoint.fee_pool);
        tracing::debug!(account = %checkpoint.account, tick = %self.clock, "operation rolled back");
    }

    // ── Snapshots ───────────────────────────────────────────────────────

    /// Serialize the full engine state.
    pub fn save_state(&self) -> Result<Vec<u8>, EscrowError> {
        bincode::serialize(self).map_err(|e| EscrowError::Snapshot(e.to_string()))
    }

    /// Restore an engine from [`save_state`](Self::save_state) output.
    pub fn load_state(data: &[u8]) -> Result<Self, EscrowError> {
        bincode::deserialize(data).map_err(|e| EscrowError::Snapshot(e.to_string()))
    }
}
