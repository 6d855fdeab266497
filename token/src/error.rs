//! Token-ledger errors.

use civitas_types::{ErrorCategory, TokenAmount, TokenRef};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("insufficient balance: need {needed}, have {available}")]
    InsufficientBalance {
        needed: TokenAmount,
        available: TokenAmount,
    },

    #[error("insufficient allowance: need {needed}, approved {available}")]
    InsufficientAllowance {
        needed: TokenAmount,
        available: TokenAmount,
    },

    #[error("arithmetic overflow in token ledger")]
    Overflow,

    #[error("invalid token metadata: {0}")]
    InvalidMetadata(String),

    #[error("token {0} is already deployed")]
    AlreadyDeployed(TokenRef),
}

impl TokenError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InsufficientBalance { .. } | Self::InsufficientAllowance { .. } => {
                ErrorCategory::Resource
            }
            Self::Overflow | Self::InvalidMetadata(_) => ErrorCategory::Validation,
            Self::AlreadyDeployed(_) => ErrorCategory::State,
        }
    }
}
