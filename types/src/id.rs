//! Dense entity identifiers.
//!
//! Ids are handed out by monotonic counters starting at 1. The value 0 is
//! reserved as the "absent" sentinel (e.g. an unregistered wallet looks up
//! to `UserId::NONE`).

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! dense_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// The "absent" sentinel.
            pub const NONE: Self = Self(0);

            pub fn new(raw: u64) -> Self {
                Self(raw)
            }

            pub fn get(&self) -> u64 {
                self.0
            }

            pub fn is_none(&self) -> bool {
                self.0 == 0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "#{}"), self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

dense_id!(
    /// Identifier of a registered user.
    UserId,
    "user"
);
dense_id!(
    /// Identifier of a DAO.
    DaoId,
    "dao"
);
dense_id!(
    /// Identifier of a proposal.
    ProposalId,
    "proposal"
);
