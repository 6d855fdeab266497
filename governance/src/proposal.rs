//! Governance proposals and their time-derived lifecycle.
//!
//! Only finalization is stored. Pending, Active and Closed are computed
//! from the clock on every read, so there is no transition to forget.

use crate::error::GovernanceError;
use crate::tally::Outcome;
use civitas_store::Arena;
use civitas_types::{DaoId, ProposalId, Timestamp, TokenAmount, TokenRef, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Voting mechanism of a proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalKind {
    /// One member, one vote; each vote locks `voting_threshold` tokens.
    Threshold,
    /// Weight is the square root of committed tokens, capped.
    Quadratic,
}

impl ProposalKind {
    /// Wire code used by clients: 1 = threshold, 2 = quadratic.
    pub fn code(&self) -> u8 {
        match self {
            Self::Threshold => 1,
            Self::Quadratic => 2,
        }
    }
}

impl TryFrom<u8> for ProposalKind {
    type Error = GovernanceError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Threshold),
            2 => Ok(Self::Quadratic),
            other => Err(GovernanceError::InvalidType(other)),
        }
    }
}

impl fmt::Display for ProposalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Threshold => "threshold",
            Self::Quadratic => "quadratic",
        })
    }
}

/// Lifecycle state of a proposal at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalState {
    /// Voting has not started.
    Pending,
    /// Votes are accepted.
    Active,
    /// Voting ended; waiting for finalization.
    Closed,
    /// Outcome recorded. Terminal.
    Finalized,
}

impl fmt::Display for ProposalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Closed => "closed",
            Self::Finalized => "finalized",
        })
    }
}

/// Caller-supplied parameters of a new proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalDraft {
    pub kind: ProposalKind,
    pub title: String,
    pub description: String,
    /// Tokens locked per threshold vote.
    pub voting_threshold: TokenAmount,
    pub dao: DaoId,
    pub token: TokenRef,
    pub begin: Timestamp,
    pub end: Timestamp,
    /// Percentage (0..=100) of cast votes or weight needed to pass.
    pub passing_threshold: u8,
    pub vote_once: bool,
}

impl ProposalDraft {
    /// Checks that need nothing but the draft itself.
    pub fn validate(&self) -> Result<(), GovernanceError> {
        if self.begin >= self.end {
            return Err(GovernanceError::InvalidWindow {
                begin: self.begin,
                end: self.end,
            });
        }
        if self.passing_threshold > 100 {
            return Err(GovernanceError::InvalidPassingThreshold(
                self.passing_threshold,
            ));
        }
        Ok(())
    }
}

/// A governance proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub kind: ProposalKind,
    pub title: String,
    pub description: String,
    pub proposer: UserId,
    pub voting_threshold: TokenAmount,
    pub dao: DaoId,
    pub token: TokenRef,
    pub begin: Timestamp,
    pub end: Timestamp,
    pub passing_threshold: u8,
    pub vote_once: bool,
    /// Set exactly once, by finalization.
    pub outcome: Option<Outcome>,
}

impl Proposal {
    pub fn state(&self, now: Timestamp) -> ProposalState {
        if self.outcome.is_some() {
            ProposalState::Finalized
        } else if now < self.begin {
            ProposalState::Pending
        } else if now < self.end {
            ProposalState::Active
        } else {
            ProposalState::Closed
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.outcome.is_some()
    }

    /// `Some(passed)` once finalized.
    pub fn result(&self) -> Option<bool> {
        self.outcome.as_ref().map(|o| o.passed)
    }
}

/// All proposals, with a per-DAO index.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProposalBook {
    proposals: Arena<Proposal>,
    by_dao: HashMap<DaoId, Vec<ProposalId>>,
}

impl ProposalBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a validated draft.
    pub fn insert(&mut self, draft: ProposalDraft, proposer: UserId) -> Result<ProposalId, GovernanceError> {
        draft.validate()?;
        let dao = draft.dao;
        let id = self.proposals.insert_with(|raw| Proposal {
            id: ProposalId::new(raw),
            kind: draft.kind,
            title: draft.title,
            description: draft.description,
            proposer,
            voting_threshold: draft.voting_threshold,
            dao: draft.dao,
            token: draft.token,
            begin: draft.begin,
            end: draft.end,
            passing_threshold: draft.passing_threshold,
            vote_once: draft.vote_once,
            outcome: None,
        })?;
        let id = ProposalId::new(id);
        self.by_dao.entry(dao).or_default().push(id);
        Ok(id)
    }

    pub fn get(&self, id: ProposalId) -> Result<&Proposal, GovernanceError> {
        self.proposals
            .get(id.get())
            .ok_or(GovernanceError::ProposalNotFound(id))
    }

    /// Record the outcome. Fails if one is already recorded.
    pub fn finalize(&mut self, id: ProposalId, outcome: Outcome) -> Result<(), GovernanceError> {
        let proposal = self
            .proposals
            .get_mut(id.get())
            .ok_or(GovernanceError::ProposalNotFound(id))?;
        if proposal.outcome.is_some() {
            return Err(GovernanceError::AlreadyFinalized(id));
        }
        proposal.outcome = Some(outcome);
        Ok(())
    }

    pub fn total(&self) -> u64 {
        self.proposals.len()
    }

    pub fn for_dao(&self, dao: DaoId) -> &[ProposalId] {
        self.by_dao.get(&dao).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.iter().map(|(_, p)| p)
    }
}
