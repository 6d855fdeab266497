//! DAO governance engine.
//!
//! Members of a DAO put proposals to a vote under one of two mechanisms:
//!
//! - **Threshold**: one member, one vote. Every ballot escrows the
//!   proposal's `voting_threshold` of the governance token.
//! - **Quadratic**: a member escrows any amount; their weight is the
//!   integer square root of the cumulative commitment (in units of
//!   [`GovernanceParams::qv_unit`]), capped at `qv_max_weight`.
//!
//! Proposal state is derived from the clock (pending, active, closed) plus
//! one stored, irreversible transition to finalized. Escrowed tokens can
//! be released back to voters once a proposal is finalized.
//!
//! [`GovernanceEngine`] owns all state and is the only entry point; it is
//! generic over the [`TokenLedger`](civitas_token::TokenLedger) holding the
//! tokens and the [`Clock`](civitas_types::Clock) supplying time.

pub mod engine;
pub mod error;
pub mod escrow;
pub mod params;
pub mod proposal;
pub mod quadratic;
pub mod state;
pub mod tally;
pub mod voting;

pub use engine::{GovernanceEngine, VoteReceipt};
pub use error::{EngineError, EntityRef, GovernanceError, Operation};
pub use escrow::{EscrowBook, EscrowEntry};
pub use params::{GovernanceParams, QvCapPolicy};
pub use proposal::{Proposal, ProposalBook, ProposalDraft, ProposalKind, ProposalState};
pub use quadratic::{integer_sqrt, quadratic_weight};
pub use state::GovernanceState;
pub use tally::{Outcome, Tally};
pub use voting::{ProposalVotes, VoteBook, VoteChoice, VoteRecord};
