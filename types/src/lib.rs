//! Fundamental types for the Remit ledger.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! caller identities, transfer identifiers, country and currency-pair codes,
//! the logical clock, and the fixed protocol constants.

pub mod code;
pub mod error;
pub mod id;
pub mod identity;
pub mod params;
pub mod tick;

pub use code::{CountryCode, PairKey};
pub use error::TypeError;
pub use id::TransferId;
pub use identity::Identity;
pub use tick::Tick;
