//! Governance-token factory: per-DAO tokens deployed on the local ledger.
//!
//! A deployment records the token's metadata and who deployed it, then
//! credits the whole initial supply to the creator's wallet. The symbol is
//! the token reference other operations use.

use crate::error::TokenError;
use civitas_types::{TokenAmount, TokenRef, UserId, WalletAddress};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What was deployed, and by whom.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub token: TokenRef,
    pub name: String,
    pub symbol: String,
    pub initial_supply: TokenAmount,
    pub creator: UserId,
    /// Wallet the initial supply was credited to.
    pub holder: WalletAddress,
}

/// Deployed tokens, indexed by reference and by creator.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TokenFactory {
    tokens: HashMap<TokenRef, TokenMetadata>,
    by_creator: HashMap<UserId, Vec<TokenRef>>,
}

impl TokenFactory {
    /// Validate a deployment request and return the reference it would get.
    pub(crate) fn check(&self, name: &str, symbol: &str) -> Result<TokenRef, TokenError> {
        if name.trim().is_empty() {
            return Err(TokenError::InvalidMetadata("token name is empty".into()));
        }
        let token = TokenRef::new(symbol)
            .map_err(|_| TokenError::InvalidMetadata(format!("invalid token symbol {symbol:?}")))?;
        if self.tokens.contains_key(&token) {
            return Err(TokenError::AlreadyDeployed(token));
        }
        Ok(token)
    }

    pub(crate) fn record(&mut self, metadata: TokenMetadata) {
        self.by_creator
            .entry(metadata.creator)
            .or_default()
            .push(metadata.token.clone());
        self.tokens.insert(metadata.token.clone(), metadata);
    }

    /// Tokens `creator` deployed, oldest first.
    pub fn deployed_by(&self, creator: UserId) -> &[TokenRef] {
        self.by_creator
            .get(&creator)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn metadata(&self, token: &TokenRef) -> Option<&TokenMetadata> {
        self.tokens.get(token)
    }

    pub fn total_deployed(&self) -> usize {
        self.tokens.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(symbol: &str, creator: u64) -> TokenMetadata {
        TokenMetadata {
            token: TokenRef::new(symbol).unwrap(),
            name: format!("{symbol} token"),
            symbol: symbol.into(),
            initial_supply: TokenAmount::new(10),
            creator: UserId::new(creator),
            holder: WalletAddress::from_bytes([creator as u8; 20]),
        }
    }

    #[test]
    fn test_index_keeps_deployment_order_per_creator() {
        let mut factory = TokenFactory::default();
        factory.record(metadata("AAA", 1));
        factory.record(metadata("BBB", 2));
        factory.record(metadata("CCC", 1));

        let names: Vec<_> = factory.deployed_by(UserId::new(1)).iter().map(TokenRef::as_str).collect();
        assert_eq!(names, ["AAA", "CCC"]);
        assert_eq!(factory.deployed_by(UserId::new(2)).len(), 1);
        assert!(factory.deployed_by(UserId::new(3)).is_empty());
        assert_eq!(factory.total_deployed(), 3);
    }

    #[test]
    fn test_check_rejects_bad_metadata() {
        let mut factory = TokenFactory::default();
        assert!(matches!(factory.check("  ", "TDT"), Err(TokenError::InvalidMetadata(_))));
        assert!(matches!(factory.check("Test", ""), Err(TokenError::InvalidMetadata(_))));
        assert!(matches!(factory.check("Test", " TDT"), Err(TokenError::InvalidMetadata(_))));

        factory.record(metadata("TDT", 1));
        assert_eq!(
            factory.check("Another", "TDT"),
            Err(TokenError::AlreadyDeployed(TokenRef::new("TDT").unwrap()))
        );
        assert_eq!(factory.check("Another", "XYZ").unwrap().as_str(), "XYZ");
    }
}
