use civitas_store::StoreError;
use civitas_types::{ErrorCategory, UserId, WalletAddress};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("wallet {wallet} is already registered as {user}")]
    AlreadyRegistered { wallet: WalletAddress, user: UserId },

    #[error("wallet {0} is not registered")]
    NotRegistered(WalletAddress),

    #[error("{0} not found")]
    UnknownUser(UserId),

    #[error("user storage: {0}")]
    Store(#[from] StoreError),
}

impl IdentityError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::AlreadyRegistered { .. } => ErrorCategory::State,
            Self::NotRegistered(_) => ErrorCategory::Authorization,
            Self::UnknownUser(_) => ErrorCategory::NotFound,
            Self::Store(_) => ErrorCategory::State,
        }
    }
}
