//! Transfer fee calculator.
//!
//! `fee(amount) = clamp(floor(amount × BASE_FEE_BPS / 10_000), MIN_FEE, MAX_FEE)`
//!
//! Integer-only; truncating division. Total over every `u128`: the product
//! saturates, which only matters far above the point where the cap applies.

use remit_types::params::{BASE_FEE_BPS, BPS_DENOMINATOR, MAX_FEE, MIN_FEE};

/// Fee charged on top of `amount` when a transfer is created.
pub fn calculate_fee(amount: u128) -> u128 {
    let proportional = amount.saturating_mul(BASE_FEE_BPS) / BPS_DENOMINATOR;
    proportional.clamp(MIN_FEE, MAX_FEE)
}
