use crate::proposal::{ProposalKind, ProposalState};
use crate::voting::VoteChoice;
use civitas_dao::DaoError;
use civitas_identity::IdentityError;
use civitas_store::StoreError;
use civitas_token::TokenError;
use civitas_types::{
    DaoId, ErrorCategory, ProposalId, Timestamp, TokenAmount, TokenRef, UserId, WalletAddress,
};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("{0} not found")]
    ProposalNotFound(ProposalId),

    #[error("invalid governance parameters: {0}")]
    InvalidParams(String),

    #[error("unknown proposal type code {0} (expected 1 = threshold, 2 = quadratic)")]
    InvalidType(u8),

    #[error("unknown vote choice code {0} (expected 1 = yes, 2 = no)")]
    InvalidChoice(u8),

    #[error("voting window must begin before it ends, got {begin}..{end}")]
    InvalidWindow { begin: Timestamp, end: Timestamp },

    #[error("passing threshold must be a percentage in 0..=100, got {0}")]
    InvalidPassingThreshold(u8),

    #[error("proposal token {given} does not match the DAO governance token {expected}")]
    TokenMismatch { expected: TokenRef, given: TokenRef },

    #[error("proposer balance {available} is below the proposing threshold {needed}")]
    InsufficientBalance {
        needed: TokenAmount,
        available: TokenAmount,
    },

    #[error("{proposal} uses {kind} voting")]
    WrongVotingMode {
        proposal: ProposalId,
        kind: ProposalKind,
    },

    #[error("quadratic commitment must be non-zero")]
    ZeroAmount,

    #[error("{user} already backs {previous} on {proposal}")]
    ChoiceMismatch {
        proposal: ProposalId,
        user: UserId,
        previous: VoteChoice,
    },

    #[error("{user} has already voted on {proposal}")]
    AlreadyVoted { proposal: ProposalId, user: UserId },

    #[error("{proposal} is not open for voting ({state})")]
    VotingClosed {
        proposal: ProposalId,
        state: ProposalState,
    },

    #[error("{proposal} is still open until {ends}")]
    VotingStillActive { proposal: ProposalId, ends: Timestamp },

    #[error("{0} is already finalized")]
    AlreadyFinalized(ProposalId),

    #[error("{0} is not finalized yet")]
    NotFinalized(ProposalId),

    #[error("commitment of {requested} exceeds the {remaining} still counted below the weight cap")]
    WeightCapExceeded {
        requested: TokenAmount,
        remaining: TokenAmount,
    },

    #[error("nothing escrowed for {user} on {proposal}")]
    NothingToRelease { proposal: ProposalId, user: UserId },

    #[error("arithmetic overflow in vote bookkeeping")]
    Overflow,

    #[error(transparent)]
    Dao(#[from] DaoError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("governance storage: {0}")]
    Store(#[from] StoreError),
}

impl GovernanceError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ProposalNotFound(_) => ErrorCategory::NotFound,
            Self::InvalidParams(_)
            | Self::InvalidType(_)
            | Self::InvalidChoice(_)
            | Self::InvalidWindow { .. }
            | Self::InvalidPassingThreshold(_)
            | Self::TokenMismatch { .. }
            | Self::WrongVotingMode { .. }
            | Self::ZeroAmount
            | Self::ChoiceMismatch { .. }
            | Self::Overflow => ErrorCategory::Validation,
            Self::AlreadyVoted { .. }
            | Self::VotingClosed { .. }
            | Self::VotingStillActive { .. }
            | Self::AlreadyFinalized(_)
            | Self::NotFinalized(_)
            | Self::WeightCapExceeded { .. }
            | Self::NothingToRelease { .. }
            | Self::Store(_) => ErrorCategory::State,
            Self::InsufficientBalance { .. } => ErrorCategory::Resource,
            Self::Dao(e) => e.category(),
            Self::Identity(e) => e.category(),
            Self::Token(e) => e.category(),
        }
    }
}

/// Engine operations, named as they appear in logs and error reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateUser,
    CreateDao,
    JoinDao,
    AddMemberToDao,
    CreateProposal,
    VoteForProposal,
    QvVoting,
    FinalizeProposal,
    ReleaseCommitment,
    DeployToken,
    Query,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateUser => "create_user",
            Self::CreateDao => "create_dao",
            Self::JoinDao => "join_dao",
            Self::AddMemberToDao => "add_member_to_dao",
            Self::CreateProposal => "create_proposal",
            Self::VoteForProposal => "vote_for_proposal",
            Self::QvVoting => "qv_voting",
            Self::FinalizeProposal => "finalize_proposal",
            Self::ReleaseCommitment => "release_commitment",
            Self::DeployToken => "deploy_token",
            Self::Query => "query",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The entity an operation was addressed to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntityRef {
    Wallet(WalletAddress),
    User(UserId),
    Dao(DaoId),
    Proposal(ProposalId),
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wallet(w) => write!(f, "{w}"),
            Self::User(id) => write!(f, "{id}"),
            Self::Dao(id) => write!(f, "{id}"),
            Self::Proposal(id) => write!(f, "{id}"),
        }
    }
}

/// A failed engine operation: what was attempted, on what, and which
/// precondition did not hold. State is unchanged whenever this is returned.
#[derive(Debug, Error)]
#[error("{op} on {entity} failed: {reason}")]
pub struct EngineError {
    pub op: Operation,
    pub entity: EntityRef,
    pub reason: GovernanceError,
}

impl EngineError {
    pub fn category(&self) -> ErrorCategory {
        self.reason.category()
    }
}
