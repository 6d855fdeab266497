//! Wallet address type: `0x` followed by 20 hex-encoded bytes.

use crate::error::CivitasError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An externally owned wallet address.
///
/// Always stored in canonical lowercase form so that two spellings of the
/// same address compare equal.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WalletAddress(String);

impl WalletAddress {
    /// The standard prefix for all wallet addresses.
    pub const PREFIX: &'static str = "0x";

    /// Number of raw bytes behind an address.
    pub const BYTE_LEN: usize = 20;

    /// Parse and canonicalise an address string.
    pub fn parse(raw: &str) -> Result<Self, CivitasError> {
        let body = raw
            .strip_prefix(Self::PREFIX)
            .or_else(|| raw.strip_prefix("0X"))
            .ok_or_else(|| CivitasError::InvalidAddress(raw.to_string()))?;
        let bytes =
            hex::decode(body).map_err(|_| CivitasError::InvalidAddress(raw.to_string()))?;
        if bytes.len() != Self::BYTE_LEN {
            return Err(CivitasError::InvalidAddress(raw.to_string()));
        }
        Ok(Self(format!("{}{}", Self::PREFIX, hex::encode(bytes))))
    }

    /// Build an address from its raw bytes.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(format!("{}{}", Self::PREFIX, hex::encode(bytes)))
    }

    /// Return the canonical address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for WalletAddress {
    type Err = CivitasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for WalletAddress {
    type Error = CivitasError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<WalletAddress> for String {
    fn from(addr: WalletAddress) -> Self {
        addr.0
    }
}
