//! DAO records.

use crate::error::DaoError;
use civitas_types::{DaoId, TokenAmount, TokenRef, UserId};
use serde::{Deserialize, Serialize};

/// Caller-supplied parameters for a new DAO.
///
/// Thresholds are signed so that malformed input (e.g. a negative number
/// typed at the CLI or sent by a client) is rejected with
/// `InvalidThreshold` instead of wrapping.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaoDraft {
    pub name: String,
    pub description: String,
    pub joining_threshold: i128,
    pub proposing_threshold: i128,
    pub token: TokenRef,
    pub is_private: bool,
}

impl DaoDraft {
    /// Validated `(joining, proposing)` thresholds.
    pub fn thresholds(&self) -> Result<(TokenAmount, TokenAmount), DaoError> {
        Ok((
            non_negative("joining_threshold", self.joining_threshold)?,
            non_negative("proposing_threshold", self.proposing_threshold)?,
        ))
    }
}

fn non_negative(field: &'static str, value: i128) -> Result<TokenAmount, DaoError> {
    u128::try_from(value)
        .map(TokenAmount::new)
        .map_err(|_| DaoError::InvalidThreshold { field, value })
}

/// A DAO.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dao {
    pub id: DaoId,
    pub name: String,
    pub description: String,
    /// Minimum governance-token balance to self-join.
    pub joining_threshold: TokenAmount,
    /// Minimum governance-token balance to submit a proposal.
    pub proposing_threshold: TokenAmount,
    pub token: TokenRef,
    pub is_private: bool,
    pub creator: UserId,
    /// Members in join order; the creator is always first.
    pub members: Vec<UserId>,
}

/// One `(dao, user)` membership.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub is_admin: bool,
}
