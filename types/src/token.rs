//! Governance token references.

use crate::error::CivitasError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque reference to a fungible governance token (a contract address,
/// a ticker, or any other identifier the ledger understands).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TokenRef(String);

impl TokenRef {
    pub fn new(raw: impl Into<String>) -> Result<Self, CivitasError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.len() != raw.len() {
            return Err(CivitasError::InvalidTokenRef(raw));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TokenRef {
    type Err = CivitasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for TokenRef {
    type Error = CivitasError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<TokenRef> for String {
    fn from(token: TokenRef) -> Self {
        token.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_blank() {
        assert!(TokenRef::new("").is_err());
        assert!(TokenRef::new("  ").is_err());
        assert!(TokenRef::new(" SMPL").is_err());
        assert_eq!(TokenRef::new("SMPL").unwrap().as_str(), "SMPL");
    }
}
