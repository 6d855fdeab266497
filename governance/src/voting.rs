//! Vote bookkeeping for both voting mechanisms.
//!
//! Every mutation is split into a pure `plan_*` step, which checks all
//! preconditions and computes the new [`VoteRecord`], and an infallible
//! [`VoteBook::apply`]. The engine pulls escrow between the two, so a
//! failed token pull never leaves a half-recorded vote behind.

use crate::error::GovernanceError;
use crate::params::{GovernanceParams, QvCapPolicy};
use crate::proposal::{Proposal, ProposalKind};
use crate::quadratic::quadratic_weight;
use crate::tally::Tally;
use civitas_types::{ProposalId, TokenAmount, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A voter's side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoteChoice {
    Yes,
    No,
}

impl VoteChoice {
    /// Wire code used by clients: 1 = yes, 2 = no.
    pub fn code(&self) -> u8 {
        match self {
            Self::Yes => 1,
            Self::No => 2,
        }
    }
}

impl TryFrom<u8> for VoteChoice {
    type Error = GovernanceError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Yes),
            2 => Ok(Self::No),
            other => Err(GovernanceError::InvalidChoice(other)),
        }
    }
}

impl fmt::Display for VoteChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Yes => "yes",
            Self::No => "no",
        })
    }
}

/// One voter's standing on one proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub choice: VoteChoice,
    /// Total tokens escrowed for this vote across all calls.
    pub committed: TokenAmount,
    /// 1 on threshold proposals, the capped square root on quadratic ones.
    pub weight: u64,
    /// Number of accepted calls.
    pub ballots: u32,
}

/// Voter sets and records of a single proposal.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProposalVotes {
    /// YES voters in the order they last moved to that side.
    yes: Vec<UserId>,
    /// NO voters in the order they last moved to that side.
    no: Vec<UserId>,
    records: HashMap<UserId, VoteRecord>,
}

impl ProposalVotes {
    pub fn yes_voters(&self) -> &[UserId] {
        &self.yes
    }

    pub fn no_voters(&self) -> &[UserId] {
        &self.no
    }

    pub fn record(&self, user: UserId) -> Option<&VoteRecord> {
        self.records.get(&user)
    }

    pub fn voter_count(&self) -> usize {
        self.records.len()
    }

    /// Store `record`. Re-voting on the same side keeps the voter's
    /// position; switching sides removes them from the old side and
    /// appends them to the end of the new one.
    fn apply(&mut self, user: UserId, record: VoteRecord) {
        let previous = self.records.insert(user, record);
        match previous {
            Some(prev) if prev.choice == record.choice => {}
            Some(prev) => {
                self.side_mut(prev.choice).retain(|&u| u != user);
                self.side_mut(record.choice).push(user);
            }
            None => self.side_mut(record.choice).push(user),
        }
    }

    fn side_mut(&mut self, choice: VoteChoice) -> &mut Vec<UserId> {
        match choice {
            VoteChoice::Yes => &mut self.yes,
            VoteChoice::No => &mut self.no,
        }
    }

    pub fn tally(&self, kind: ProposalKind) -> Tally {
        match kind {
            ProposalKind::Threshold => Tally {
                yes: self.yes.len() as u128,
                no: self.no.len() as u128,
            },
            ProposalKind::Quadratic => Tally {
                yes: self.weight_of(&self.yes),
                no: self.weight_of(&self.no),
            },
        }
    }

    fn weight_of(&self, side: &[UserId]) -> u128 {
        side.iter()
            .filter_map(|user| self.records.get(user))
            .map(|r| u128::from(r.weight))
            .sum()
    }
}

/// Votes of every proposal.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VoteBook {
    proposals: HashMap<ProposalId, ProposalVotes>,
}

impl VoteBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn votes(&self, proposal: ProposalId) -> Option<&ProposalVotes> {
        self.proposals.get(&proposal)
    }

    pub fn record(&self, proposal: ProposalId, user: UserId) -> Option<&VoteRecord> {
        self.votes(proposal).and_then(|v| v.record(user))
    }

    /// Commit a planned record.
    pub fn apply(&mut self, proposal: ProposalId, user: UserId, record: VoteRecord) {
        self.proposals
            .entry(proposal)
            .or_default()
            .apply(user, record);
    }

    pub fn tally(&self, proposal: &Proposal) -> Tally {
        self.votes(proposal.id)
            .map(|v| v.tally(proposal.kind))
            .unwrap_or_default()
    }
}

/// Plan a threshold vote: one unit of weight, `voting_threshold` escrowed.
///
/// Without `vote_once` a member may vote again; each ballot escrows the
/// threshold again and the member counts once, on the side of their latest
/// choice.
pub fn plan_threshold_vote(
    proposal: &Proposal,
    previous: Option<&VoteRecord>,
    user: UserId,
    choice: VoteChoice,
) -> Result<VoteRecord, GovernanceError> {
    if proposal.vote_once && previous.is_some() {
        return Err(GovernanceError::AlreadyVoted {
            proposal: proposal.id,
            user,
        });
    }
    let prior = previous.map(|r| r.committed).unwrap_or_default();
    Ok(VoteRecord {
        choice,
        committed: prior
            .checked_add(proposal.voting_threshold)
            .ok_or(GovernanceError::Overflow)?,
        weight: 1,
        ballots: previous.map_or(1, |r| r.ballots.saturating_add(1)),
    })
}

/// Plan a quadratic commitment of `amount` on top of any earlier ones.
pub fn plan_quadratic_vote(
    proposal: &Proposal,
    previous: Option<&VoteRecord>,
    user: UserId,
    choice: VoteChoice,
    amount: TokenAmount,
    params: &GovernanceParams,
) -> Result<VoteRecord, GovernanceError> {
    if amount.is_zero() {
        return Err(GovernanceError::ZeroAmount);
    }
    if let Some(prev) = previous {
        if proposal.vote_once {
            return Err(GovernanceError::AlreadyVoted {
                proposal: proposal.id,
                user,
            });
        }
        if prev.choice != choice {
            return Err(GovernanceError::ChoiceMismatch {
                proposal: proposal.id,
                user,
                previous: prev.choice,
            });
        }
    }
    let prior = previous.map(|r| r.committed).unwrap_or_default();
    let cumulative = prior.checked_add(amount).ok_or(GovernanceError::Overflow)?;
    if params.qv_cap_policy == QvCapPolicy::Reject {
        let cap = params.qv_cap_commitment();
        if cumulative > cap {
            return Err(GovernanceError::WeightCapExceeded {
                requested: amount,
                remaining: cap.saturating_sub(prior),
            });
        }
    }
    Ok(VoteRecord {
        choice,
        committed: cumulative,
        weight: quadratic_weight(cumulative, params),
        ballots: previous.map_or(1, |r| r.ballots.saturating_add(1)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use civitas_types::{DaoId, Timestamp, TokenRef};

    fn proposal(kind: ProposalKind, vote_once: bool) -> Proposal {
        Proposal {
            id: ProposalId::new(1),
            kind,
            title: "t".into(),
            description: String::new(),
            proposer: UserId::new(1),
            voting_threshold: TokenAmount::new(100),
            dao: DaoId::new(1),
            token: TokenRef::new("GOV").unwrap(),
            begin: Timestamp::new(0),
            end: Timestamp::new(10),
            passing_threshold: 50,
            vote_once,
            outcome: None,
        }
    }

    fn unit_params(policy: QvCapPolicy) -> GovernanceParams {
        GovernanceParams {
            qv_unit: TokenAmount::new(1),
            qv_cap_policy: policy,
            ..Default::default()
        }
    }

    fn cast_threshold(book: &mut VoteBook, p: &Proposal, user: u64, choice: VoteChoice) -> Result<(), GovernanceError> {
        let user = UserId::new(user);
        let record = plan_threshold_vote(p, book.record(p.id, user), user, choice)?;
        book.apply(p.id, user, record);
        Ok(())
    }

    fn cast_quadratic(book: &mut VoteBook, p: &Proposal, params: &GovernanceParams, user: u64, choice: VoteChoice, amount: u128) -> Result<VoteRecord, GovernanceError> {
        let user = UserId::new(user);
        let record = plan_quadratic_vote(p, book.record(p.id, user), user, choice, TokenAmount::new(amount), params)?;
        book.apply(p.id, user, record);
        Ok(record)
    }

    #[test]
    fn test_choice_codes() {
        assert_eq!(VoteChoice::try_from(1).unwrap(), VoteChoice::Yes);
        assert_eq!(VoteChoice::try_from(2).unwrap(), VoteChoice::No);
        assert!(matches!(VoteChoice::try_from(0), Err(GovernanceError::InvalidChoice(0))));
    }

    #[test]
    fn test_vote_once_rejects_second_ballot() {
        let p = proposal(ProposalKind::Threshold, true);
        let mut book = VoteBook::new();
        cast_threshold(&mut book, &p, 1, VoteChoice::Yes).unwrap();

        let err = cast_threshold(&mut book, &p, 1, VoteChoice::Yes).unwrap_err();
        assert!(matches!(err, GovernanceError::AlreadyVoted { .. }));
        let err = cast_threshold(&mut book, &p, 1, VoteChoice::No).unwrap_err();
        assert!(matches!(err, GovernanceError::AlreadyVoted { .. }));

        let votes = book.votes(p.id).unwrap();
        assert_eq!(votes.yes_voters(), &[UserId::new(1)]);
        assert!(votes.no_voters().is_empty());
    }

    #[test]
    fn test_sets_keep_insertion_order() {
        let p = proposal(ProposalKind::Threshold, true);
        let mut book = VoteBook::new();
        for (user, choice) in [(3, VoteChoice::Yes), (1, VoteChoice::No), (2, VoteChoice::Yes)] {
            cast_threshold(&mut book, &p, user, choice).unwrap();
        }
        let votes = book.votes(p.id).unwrap();
        assert_eq!(votes.yes_voters(), &[UserId::new(3), UserId::new(2)]);
        assert_eq!(votes.no_voters(), &[UserId::new(1)]);
        assert_eq!(book.tally(&p), Tally { yes: 2, no: 1 });
    }

    #[test]
    fn test_switching_sides_appends_and_same_side_keeps_position() {
        let p = proposal(ProposalKind::Threshold, false);
        let mut book = VoteBook::new();
        for user in [1, 2, 3] {
            cast_threshold(&mut book, &p, user, VoteChoice::No).unwrap();
        }
        cast_threshold(&mut book, &p, 4, VoteChoice::Yes).unwrap();
        // Re-affirming NO does not move user 1.
        cast_threshold(&mut book, &p, 1, VoteChoice::No).unwrap();
        cast_threshold(&mut book, &p, 2, VoteChoice::Yes).unwrap();
        cast_threshold(&mut book, &p, 2, VoteChoice::No).unwrap();

        let votes = book.votes(p.id).unwrap();
        assert_eq!(votes.yes_voters(), &[UserId::new(4)]);
        assert_eq!(votes.no_voters(), &[UserId::new(1), UserId::new(3), UserId::new(2)]);
        assert_eq!(votes.voter_count(), 4);
    }

    #[test]
    fn test_revote_moves_voter_and_accumulates_escrow() {
        let p = proposal(ProposalKind::Threshold, false);
        let mut book = VoteBook::new();
        cast_threshold(&mut book, &p, 1, VoteChoice::Yes).unwrap();
        cast_threshold(&mut book, &p, 1, VoteChoice::Yes).unwrap();
        cast_threshold(&mut book, &p, 1, VoteChoice::No).unwrap();

        let votes = book.votes(p.id).unwrap();
        assert!(votes.yes_voters().is_empty());
        assert_eq!(votes.no_voters(), &[UserId::new(1)]);
        let record = votes.record(UserId::new(1)).unwrap();
        assert_eq!(record.committed, TokenAmount::new(300));
        assert_eq!(record.ballots, 3);
        assert_eq!(book.tally(&p), Tally { yes: 0, no: 1 });
    }

    #[test]
    fn test_quadratic_incremental_commitment() {
        let p = proposal(ProposalKind::Quadratic, false);
        let params = unit_params(QvCapPolicy::Saturate);
        let mut book = VoteBook::new();

        assert_eq!(cast_quadratic(&mut book, &p, &params, 1, VoteChoice::Yes, 4).unwrap().weight, 2);
        assert_eq!(cast_quadratic(&mut book, &p, &params, 1, VoteChoice::Yes, 5).unwrap().weight, 3);
        let record = cast_quadratic(&mut book, &p, &params, 1, VoteChoice::Yes, 16).unwrap();
        assert_eq!(record.weight, 5);
        assert_eq!(record.committed, TokenAmount::new(25));
        assert_eq!(book.votes(p.id).unwrap().yes_voters(), &[UserId::new(1)]);
    }

    #[test]
    fn test_quadratic_saturates_past_cap() {
        let p = proposal(ProposalKind::Quadratic, false);
        let params = unit_params(QvCapPolicy::Saturate);
        let mut book = VoteBook::new();
        cast_quadratic(&mut book, &p, &params, 1, VoteChoice::Yes, 100).unwrap();
        let record = cast_quadratic(&mut book, &p, &params, 1, VoteChoice::Yes, 9_900).unwrap();
        assert_eq!(record.weight, 10);
        assert_eq!(record.committed, TokenAmount::new(10_000));
    }

    #[test]
    fn test_quadratic_reject_policy_refuses_excess() {
        let p = proposal(ProposalKind::Quadratic, false);
        let params = unit_params(QvCapPolicy::Reject);
        let mut book = VoteBook::new();
        cast_quadratic(&mut book, &p, &params, 1, VoteChoice::Yes, 90).unwrap();

        let err = cast_quadratic(&mut book, &p, &params, 1, VoteChoice::Yes, 11).unwrap_err();
        assert!(matches!(
            err,
            GovernanceError::WeightCapExceeded { remaining, .. } if remaining == TokenAmount::new(10)
        ));

        let record = cast_quadratic(&mut book, &p, &params, 1, VoteChoice::Yes, 10).unwrap();
        assert_eq!(record.weight, 10);
    }

    #[test]
    fn test_quadratic_choice_cannot_flip() {
        let p = proposal(ProposalKind::Quadratic, false);
        let params = unit_params(QvCapPolicy::Saturate);
        let mut book = VoteBook::new();
        cast_quadratic(&mut book, &p, &params, 1, VoteChoice::Yes, 4).unwrap();
        let err = cast_quadratic(&mut book, &p, &params, 1, VoteChoice::No, 4).unwrap_err();
        assert!(matches!(err, GovernanceError::ChoiceMismatch { previous: VoteChoice::Yes, .. }));
    }

    #[test]
    fn test_quadratic_vote_once_and_zero_amount() {
        let p = proposal(ProposalKind::Quadratic, true);
        let params = unit_params(QvCapPolicy::Saturate);
        let mut book = VoteBook::new();
        assert!(matches!(
            cast_quadratic(&mut book, &p, &params, 1, VoteChoice::Yes, 0),
            Err(GovernanceError::ZeroAmount)
        ));
        cast_quadratic(&mut book, &p, &params, 1, VoteChoice::Yes, 4).unwrap();
        assert!(matches!(
            cast_quadratic(&mut book, &p, &params, 1, VoteChoice::Yes, 4),
            Err(GovernanceError::AlreadyVoted { .. })
        ));
    }

    #[test]
    fn test_quadratic_tally_sums_weights() {
        let p = proposal(ProposalKind::Quadratic, false);
        let params = unit_params(QvCapPolicy::Saturate);
        let mut book = VoteBook::new();
        cast_quadratic(&mut book, &p, &params, 1, VoteChoice::Yes, 100).unwrap();
        cast_quadratic(&mut book, &p, &params, 2, VoteChoice::No, 25).unwrap();
        cast_quadratic(&mut book, &p, &params, 3, VoteChoice::No, 16).unwrap();
        assert_eq!(book.tally(&p), Tally { yes: 10, no: 9 });
    }

    #[test]
    fn test_empty_tally() {
        let p = proposal(ProposalKind::Threshold, true);
        assert_eq!(VoteBook::new().tally(&p), Tally::default());
    }
}
