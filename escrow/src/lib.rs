//! Remit escrow: the custodial balance ledger and escrowed-transfer engine.
//!
//! Users deposit into an internal balance, open time-boxed transfers to a
//! recipient (paying a bounded percentage fee), and recipients claim before
//! expiry. Expired, unclaimed transfers can be cancelled by the sender for a
//! refund of the amount; the fee is kept.
//!
//! Time is a logical clock: one tick per mutating operation, including
//! rejected ones.
//!
//! This crate handles:
//! - Fee computation (basis points, floor and cap)
//! - The balance store
//! - The transfer registry and its `Active → Claimed | Cancelled` machine
//! - Owner controls: pause, exchange-rate metadata, fee withdrawal
//! - State snapshots

pub mod balances;
pub mod engine;
pub mod error;
pub mod fee;
pub mod policy;
pub mod transfer;

pub use balances::BalanceLedger;
pub use engine::{Checkpoint, RemitEngine};
pub use error::EscrowError;
pub use fee::calculate_fee;
pub use policy::{ExchangeRate, PolicyState};
pub use transfer::{TransferRecord, TransferRegistry, TransferState};
