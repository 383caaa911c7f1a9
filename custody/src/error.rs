use remit_types::Identity;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CustodyError {
    #[error("{holder} cannot cover {needed}: has {available}")]
    InsufficientFunds {
        holder: Identity,
        needed: u128,
        available: u128,
    },

    #[error("custody holds {held}, cannot pay out {needed}")]
    Underfunded { needed: u128, held: u128 },

    #[error("custody backend unavailable: {0}")]
    Unavailable(String),
}
