use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("ledger rejected operation: {0}")]
    Escrow(#[from] remit_escrow::EscrowError),

    #[error("custody error: {0}")]
    Custody(#[from] remit_custody::CustodyError),

    #[error("custody holds {held} but the ledger owes {owed}")]
    Imbalance { held: u128, owed: u128 },

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl NodeError {
    /// The ledger's own rejection, if that is what this is.
    pub fn as_escrow(&self) -> Option<&remit_escrow::EscrowError> {
        match self {
            Self::Escrow(e) => Some(e),
            _ => None,
        }
    }
}
