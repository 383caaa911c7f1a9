//! Short ASCII codes carried as metadata: country codes on transfers and
//! currency-pair keys on exchange rates.
//!
//! Neither is interpreted by the ledger. Country codes are only bounded in
//! length; pair keys must also be non-empty printable ASCII.

use crate::error::TypeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

fn check_length(raw: &str, max_len: usize) -> Result<(), &'static str> {
    if !raw.is_ascii() {
        return Err("not ascii");
    }
    if raw.len() > max_len {
        return Err("too long");
    }
    Ok(())
}

fn check_printable(raw: &str, max_len: usize) -> Result<(), &'static str> {
    if raw.is_empty() {
        return Err("empty");
    }
    if raw.len() > max_len {
        return Err("too long");
    }
    if !raw.chars().all(|c| c.is_ascii_graphic()) {
        return Err("not printable ascii");
    }
    Ok(())
}

/// Country code attached to a transfer (e.g. `"USA"`, `"MEX"`). At most
/// three ASCII bytes; the content is not otherwise checked.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    pub const MAX_LEN: usize = 3;

    pub fn new(raw: impl Into<String>) -> Result<Self, TypeError> {
        let code = raw.into();
        match check_length(&code, Self::MAX_LEN) {
            Ok(()) => Ok(Self(code)),
            Err(reason) => Err(TypeError::InvalidCountryCode { code, reason }),
        }
    }

    /// Code used by quick transfers.
    pub fn usa() -> Self {
        Self("USA".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CountryCode {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CountryCode {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<CountryCode> for String {
    fn from(code: CountryCode) -> Self {
        code.0
    }
}

/// Key of an exchange-rate entry (e.g. `"USD-MXN"`).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PairKey(String);

impl PairKey {
    pub const MAX_LEN: usize = 10;

    pub fn new(raw: impl Into<String>) -> Result<Self, TypeError> {
        let key = raw.into();
        match check_printable(&key, Self::MAX_LEN) {
            Ok(()) => Ok(Self(key)),
            Err(reason) => Err(TypeError::InvalidPairKey { key, reason }),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PairKey {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for PairKey {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<PairKey> for String {
    fn from(key: PairKey) -> Self {
        key.0
    }
}
