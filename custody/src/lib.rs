//! Abstract native-asset custody for the Remit ledger.
//!
//! The ledger only moves numbers between internal balances. Whenever value
//! enters or leaves the ledger the host moves the real asset through an
//! [`AssetCustody`] implementation (a chain adapter, a bank rail, or the
//! in-memory double in `remit-nullables`). The rest of the codebase depends
//! only on this trait.

pub mod error;

pub use error::CustodyError;

use remit_types::Identity;

/// Moves native asset between external holders and the ledger's custody.
pub trait AssetCustody: Send {
    /// Pull `amount` from `from` into custody (deposit).
    fn collect(&mut self, from: &Identity, amount: u128) -> Result<(), CustodyError>;

    /// Pay `amount` out of custody to `to` (withdrawal, fee withdrawal).
    fn disburse(&mut self, to: &Identity, amount: u128) -> Result<(), CustodyError>;

    /// Total asset currently held in custody.
    fn held(&self) -> u128;

    /// Short backend name for logs.
    fn name(&self) -> &str;
}
