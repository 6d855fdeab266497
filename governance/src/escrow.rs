//! Custody bookkeeping for vote commitments.
//!
//! Tokens pulled for a vote sit in the custody wallet. Each
//! `(proposal, user)` pair has at most one entry, growing with every ballot
//! until it is released back to the voter after finalization.

use crate::error::GovernanceError;
use civitas_types::{ProposalId, TokenAmount, TokenRef, UserId, WalletAddress};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowEntry {
    pub token: TokenRef,
    /// Wallet the tokens came from and are returned to.
    pub owner: WalletAddress,
    pub amount: TokenAmount,
    pub released: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EscrowBook {
    entries: HashMap<(ProposalId, UserId), EscrowEntry>,
    /// token → amount currently held in custody.
    held: HashMap<TokenRef, TokenAmount>,
}

impl EscrowBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&self, proposal: ProposalId, user: UserId) -> Option<&EscrowEntry> {
        self.entries.get(&(proposal, user))
    }

    /// Amount of `token` the custody wallet holds on behalf of voters.
    pub fn held(&self, token: &TokenRef) -> TokenAmount {
        self.held.get(token).copied().unwrap_or_default()
    }

    /// Record tokens that were just pulled into custody.
    ///
    /// Call only after the ledger transfer succeeded. The per-entry total
    /// mirrors the vote record's commitment, which was overflow-checked
    /// while planning the vote.
    pub fn lock(
        &mut self,
        proposal: ProposalId,
        user: UserId,
        owner: &WalletAddress,
        token: &TokenRef,
        amount: TokenAmount,
    ) {
        let entry = self
            .entries
            .entry((proposal, user))
            .or_insert_with(|| EscrowEntry {
                token: token.clone(),
                owner: owner.clone(),
                amount: TokenAmount::ZERO,
                released: false,
            });
        entry.amount = TokenAmount::new(entry.amount.raw().saturating_add(amount.raw()));
        let held = self.held.entry(token.clone()).or_default();
        *held = TokenAmount::new(held.raw().saturating_add(amount.raw()));
    }

    /// The entry that a release would pay out.
    pub fn releasable(&self, proposal: ProposalId, user: UserId) -> Result<&EscrowEntry, GovernanceError> {
        self.entries
            .get(&(proposal, user))
            .filter(|e| !e.released && !e.amount.is_zero())
            .ok_or(GovernanceError::NothingToRelease { proposal, user })
    }

    /// Mark an entry paid out. Call only after the ledger transfer succeeded.
    pub fn mark_released(&mut self, proposal: ProposalId, user: UserId) {
        if let Some(entry) = self.entries.get_mut(&(proposal, user)) {
            if entry.released {
                return;
            }
            entry.released = true;
            if let Some(held) = self.held.get_mut(&entry.token) {
                *held = held.saturating_sub(entry.amount);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gov() -> TokenRef {
        TokenRef::new("GOV").unwrap()
    }

    fn voter() -> WalletAddress {
        WalletAddress::from_bytes([7; 20])
    }

    #[test]
    fn test_lock_accumulates_per_vote() {
        let mut book = EscrowBook::new();
        let (p, u) = (ProposalId::new(1), UserId::new(2));
        book.lock(p, u, &voter(), &gov(), TokenAmount::new(40));
        book.lock(p, u, &voter(), &gov(), TokenAmount::new(60));
        book.lock(ProposalId::new(2), u, &voter(), &gov(), TokenAmount::new(5));

        assert_eq!(book.entry(p, u).unwrap().amount, TokenAmount::new(100));
        assert_eq!(book.held(&gov()), TokenAmount::new(105));
    }

    #[test]
    fn test_release_once() {
        let mut book = EscrowBook::new();
        let (p, u) = (ProposalId::new(1), UserId::new(2));
        book.lock(p, u, &voter(), &gov(), TokenAmount::new(40));

        assert_eq!(book.releasable(p, u).unwrap().owner, voter());
        book.mark_released(p, u);
        assert!(book.entry(p, u).unwrap().released);
        assert_eq!(book.held(&gov()), TokenAmount::ZERO);

        assert!(matches!(
            book.releasable(p, u),
            Err(GovernanceError::NothingToRelease { .. })
        ));
        book.mark_released(p, u);
        assert_eq!(book.held(&gov()), TokenAmount::ZERO);
    }

    #[test]
    fn test_nothing_escrowed() {
        let book = EscrowBook::new();
        assert!(matches!(
            book.releasable(ProposalId::new(1), UserId::new(1)),
            Err(GovernanceError::NothingToRelease { .. })
        ));
    }
}
