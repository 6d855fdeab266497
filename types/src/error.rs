//! Top-level error types shared across crates.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Coarse classification of every failure the engine can report.
///
/// Callers use the category to decide whether a retry can ever succeed:
/// validation and authorization failures never will, state failures may
/// after the world moves on, resource failures after the caller tops up
/// balance or allowance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Malformed or out-of-range input.
    Validation,
    /// The caller lacks the required membership or admin right.
    Authorization,
    /// The operation conflicts with the current lifecycle state.
    State,
    /// Token balance or allowance is too low.
    Resource,
    /// The referenced user, DAO or proposal does not exist.
    NotFound,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Authorization => "authorization",
            Self::State => "state",
            Self::Resource => "resource",
            Self::NotFound => "not_found",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse errors for the primitive types in this crate.
#[derive(Debug, Error)]
pub enum CivitasError {
    #[error("invalid wallet address: {0}")]
    InvalidAddress(String),

    #[error("invalid token amount: {0}")]
    InvalidAmount(String),

    #[error("invalid token reference: {0:?}")]
    InvalidTokenRef(String),
}
