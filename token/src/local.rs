//! In-process fungible token ledger with allowances.

use crate::error::TokenError;
use crate::factory::{TokenFactory, TokenMetadata};
use crate::ledger::TokenLedger;
use civitas_types::{TokenAmount, TokenRef, UserId, WalletAddress};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A multi-token ledger kept entirely in memory.
///
/// Serializable so the operator CLI can persist it next to the governance
/// state.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LocalLedger {
    /// (token, holder) → balance.
    balances: HashMap<(TokenRef, WalletAddress), TokenAmount>,
    /// (token, owner, spender) → remaining allowance.
    allowances: HashMap<(TokenRef, WalletAddress, WalletAddress), TokenAmount>,
    /// token → total minted.
    supply: HashMap<TokenRef, TokenAmount>,
    factory: TokenFactory,
}

impl LocalLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `amount` new tokens in `to`'s balance.
    pub fn mint(
        &mut self,
        token: &TokenRef,
        to: &WalletAddress,
        amount: TokenAmount,
    ) -> Result<(), TokenError> {
        let supply = self.total_supply(token);
        let new_supply = supply.checked_add(amount).ok_or(TokenError::Overflow)?;
        let new_balance = self
            .balance_of(token, to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        self.supply.insert(token.clone(), new_supply);
        self.balances
            .insert((token.clone(), to.clone()), new_balance);
        tracing::debug!(token = %token, to = %to, amount = amount.raw(), "minted");
        Ok(())
    }

    /// Set (not add to) the allowance `spender` holds over `owner`'s tokens.
    pub fn approve(
        &mut self,
        token: &TokenRef,
        owner: &WalletAddress,
        spender: &WalletAddress,
        amount: TokenAmount,
    ) {
        let key = (token.clone(), owner.clone(), spender.clone());
        if amount.is_zero() {
            self.allowances.remove(&key);
        } else {
            self.allowances.insert(key, amount);
        }
    }

    pub fn total_supply(&self, token: &TokenRef) -> TokenAmount {
        self.supply.get(token).copied().unwrap_or_default()
    }

    /// Deploy a new governance token and credit `initial_supply` to
    /// `holder`, the creator's wallet. The symbol becomes the token
    /// reference; a symbol that was already deployed or minted is refused.
    pub fn deploy_token(
        &mut self,
        name: &str,
        symbol: &str,
        initial_supply: TokenAmount,
        creator: UserId,
        holder: &WalletAddress,
    ) -> Result<TokenRef, TokenError> {
        let token = self.factory.check(name, symbol)?;
        if self.supply.contains_key(&token) {
            return Err(TokenError::AlreadyDeployed(token));
        }
        self.mint(&token, holder, initial_supply)?;
        self.factory.record(TokenMetadata {
            token: token.clone(),
            name: name.to_string(),
            symbol: symbol.to_string(),
            initial_supply,
            creator,
            holder: holder.clone(),
        });
        tracing::info!(token = %token, creator = %creator, supply = initial_supply.raw(), "token deployed");
        Ok(token)
    }

    /// Tokens `creator` deployed, oldest first.
    pub fn tokens_deployed_by(&self, creator: UserId) -> &[TokenRef] {
        self.factory.deployed_by(creator)
    }

    pub fn token_metadata(&self, token: &TokenRef) -> Option<&TokenMetadata> {
        self.factory.metadata(token)
    }

    pub fn factory(&self) -> &TokenFactory {
        &self.factory
    }

    /// Compute both post-transfer balances without touching state.
    fn plan_move(
        &self,
        token: &TokenRef,
        from: &WalletAddress,
        to: &WalletAddress,
        amount: TokenAmount,
    ) -> Result<(TokenAmount, TokenAmount), TokenError> {
        let available = self.balance_of(token, from);
        let from_after = available
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientBalance {
                needed: amount,
                available,
            })?;
        if from == to {
            return Ok((available, available));
        }
        let to_after = self
            .balance_of(token, to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        Ok((from_after, to_after))
    }

    fn apply_move(
        &mut self,
        token: &TokenRef,
        from: &WalletAddress,
        to: &WalletAddress,
        (from_after, to_after): (TokenAmount, TokenAmount),
    ) {
        self.balances
            .insert((token.clone(), from.clone()), from_after);
        self.balances.insert((token.clone(), to.clone()), to_after);
    }
}

impl TokenLedger for LocalLedger {
    fn balance_of(&self, token: &TokenRef, wallet: &WalletAddress) -> TokenAmount {
        self.balances
            .get(&(token.clone(), wallet.clone()))
            .copied()
            .unwrap_or_default()
    }

    fn allowance(
        &self,
        token: &TokenRef,
        owner: &WalletAddress,
        spender: &WalletAddress,
    ) -> TokenAmount {
        self.allowances
            .get(&(token.clone(), owner.clone(), spender.clone()))
            .copied()
            .unwrap_or_default()
    }

    fn transfer_from(
        &mut self,
        token: &TokenRef,
        spender: &WalletAddress,
        from: &WalletAddress,
        to: &WalletAddress,
        amount: TokenAmount,
    ) -> Result<(), TokenError> {
        let approved = self.allowance(token, from, spender);
        let remaining = approved
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientAllowance {
                needed: amount,
                available: approved,
            })?;
        let plan = self.plan_move(token, from, to, amount)?;
        self.apply_move(token, from, to, plan);
        self.approve(token, from, spender, remaining);
        Ok(())
    }

    fn transfer(
        &mut self,
        token: &TokenRef,
        from: &WalletAddress,
        to: &WalletAddress,
        amount: TokenAmount,
    ) -> Result<(), TokenError> {
        let plan = self.plan_move(token, from, to, amount)?;
        self.apply_move(token, from, to, plan);
        Ok(())
    }
}
