//! Ledger errors.
//!
//! The operation taxonomy is closed: every rejected call reports exactly one
//! of these kinds, chosen by the first failing check in the operation's
//! fixed validation order.

use remit_types::TransferId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EscrowError {
    /// Paused ledger, non-owner on an owner control, wrong party on a
    /// transfer, or cancellation of a transfer that has not yet expired.
    #[error("caller is not authorized for this operation")]
    NotAuthorized,

    #[error("insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    #[error("amount must be non-zero")]
    InvalidAmount,

    #[error("transfer {0} not found")]
    TransferNotFound(TransferId),

    /// Covers both terminal states, claimed and cancelled.
    #[error("transfer {0} has already been claimed or cancelled")]
    AlreadyClaimed(TransferId),

    #[error("sender and recipient must differ")]
    InvalidRecipient,

    #[error("transfer {0} has expired")]
    TransferExpired(TransferId),

    #[error("expiry duration must be non-zero")]
    InvalidDuration,

    #[error("state snapshot error: {0}")]
    Snapshot(String),
}

impl EscrowError {
    /// Stable numeric code reported to hosts.
    pub fn code(&self) -> u32 {
        match self {
            Self::NotAuthorized => 100,
            Self::InsufficientBalance { .. } => 101,
            Self::InvalidAmount => 102,
            Self::TransferNotFound(_) => 103,
            Self::AlreadyClaimed(_) => 104,
            Self::InvalidRecipient => 105,
            Self::TransferExpired(_) => 106,
            Self::InvalidDuration => 107,
            Self::Snapshot(_) => 900,
        }
    }
}
