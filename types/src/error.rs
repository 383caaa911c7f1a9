//! Errors raised while constructing typed values from raw input.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("invalid identity: {0}")]
    InvalidIdentity(String),

    #[error("invalid country code {code:?}: {reason}")]
    InvalidCountryCode { code: String, reason: &'static str },

    #[error("invalid currency pair key {key:?}: {reason}")]
    InvalidPairKey { key: String, reason: &'static str },
}
