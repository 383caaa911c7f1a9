//! Fixed protocol constants.
//!
//! None of these are governable: the ledger has a single static owner and no
//! parameter-change path.

// ── Fees ─────────────────────────────────────────────────────────────────

/// Transfer fee rate in basis points (50 bps = 0.5%).
pub const BASE_FEE_BPS: u128 = 50;

/// One whole in basis points.
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Floor applied to every transfer fee (raw units).
pub const MIN_FEE: u128 = 1_000_000;

/// Cap applied to every transfer fee (raw units).
pub const MAX_FEE: u128 = 50_000_000;

// ── Transfers ────────────────────────────────────────────────────────────

/// Lifetime, in logical-clock ticks, of a transfer created by `quick_transfer`.
pub const DEFAULT_EXPIRY: u64 = 144;

/// Largest number of ids a single batch claim may carry.
pub const MAX_BATCH_CLAIM: usize = 10;
