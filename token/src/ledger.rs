//! The token interface consumed by the engine.

use crate::error::TokenError;
use civitas_types::{TokenAmount, TokenRef, WalletAddress};

/// Balance, allowance and transfer operations of a fungible token ledger.
///
/// Every mutating call is all-or-nothing: on `Err` no balance or allowance
/// has changed.
pub trait TokenLedger {
    fn balance_of(&self, token: &TokenRef, wallet: &WalletAddress) -> TokenAmount;

    /// Amount `spender` may still move out of `owner`'s balance.
    fn allowance(
        &self,
        token: &TokenRef,
        owner: &WalletAddress,
        spender: &WalletAddress,
    ) -> TokenAmount;

    /// Move `amount` from `from` to `to`, spending `spender`'s allowance.
    fn transfer_from(
        &mut self,
        token: &TokenRef,
        spender: &WalletAddress,
        from: &WalletAddress,
        to: &WalletAddress,
        amount: TokenAmount,
    ) -> Result<(), TokenError>;

    /// Move `amount` out of `from`'s own balance.
    fn transfer(
        &mut self,
        token: &TokenRef,
        from: &WalletAddress,
        to: &WalletAddress,
        amount: TokenAmount,
    ) -> Result<(), TokenError>;
}
