//! Caller identity: the opaque principal balances and transfers are keyed by.

use crate::error::TypeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An authenticated principal (account handle).
///
/// The ledger only ever compares identities for equality; the host is
/// responsible for authenticating them before they reach the engine.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity(String);

impl Identity {
    /// Longest accepted handle, in bytes.
    pub const MAX_LEN: usize = 128;

    /// Create an identity from a raw handle.
    ///
    /// Handles must be non-empty, at most [`Self::MAX_LEN`] bytes and contain
    /// no whitespace or control characters.
    pub fn new(raw: impl Into<String>) -> Result<Self, TypeError> {
        let s = raw.into();
        if s.is_empty() {
            return Err(TypeError::InvalidIdentity("empty handle".into()));
        }
        if s.len() > Self::MAX_LEN {
            return Err(TypeError::InvalidIdentity(format!(
                "handle is {} bytes, limit is {}",
                s.len(),
                Self::MAX_LEN
            )));
        }
        if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(TypeError::InvalidIdentity(format!("{s:?} contains whitespace")));
        }
        Ok(Self(s))
    }

    /// Return the raw handle.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Identity {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Identity {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Identity> for String {
    fn from(id: Identity) -> Self {
        id.0
    }
}
