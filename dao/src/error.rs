use civitas_identity::IdentityError;
use civitas_store::StoreError;
use civitas_types::{DaoId, ErrorCategory, TokenAmount, UserId, WalletAddress};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaoError {
    #[error("{0} not found")]
    DaoNotFound(DaoId),

    #[error("{field} must be non-negative, got {value}")]
    InvalidThreshold { field: &'static str, value: i128 },

    #[error("{0} is private: members can only be added by an admin")]
    PrivateDao(DaoId),

    #[error("{user} is already a member of {dao}")]
    AlreadyMember { dao: DaoId, user: UserId },

    #[error("balance {available} is below the {dao} threshold of {needed}")]
    InsufficientBalance {
        dao: DaoId,
        needed: TokenAmount,
        available: TokenAmount,
    },

    #[error("{wallet} is not an admin of {dao}")]
    NotAdmin { dao: DaoId, wallet: WalletAddress },

    #[error("{user} is not a member of {dao}")]
    NotMember { dao: DaoId, user: UserId },

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error("DAO storage: {0}")]
    Store(#[from] StoreError),
}

impl DaoError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::DaoNotFound(_) => ErrorCategory::NotFound,
            Self::InvalidThreshold { .. } => ErrorCategory::Validation,
            Self::PrivateDao(_) | Self::AlreadyMember { .. } | Self::Store(_) => {
                ErrorCategory::State
            }
            Self::InsufficientBalance { .. } => ErrorCategory::Resource,
            Self::NotAdmin { .. } | Self::NotMember { .. } => ErrorCategory::Authorization,
            Self::Identity(e) => e.category(),
        }
    }
}
