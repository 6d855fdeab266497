//! User records.

use civitas_types::{UserId, WalletAddress};
use serde::{Deserialize, Serialize};

/// Profile fields supplied at registration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub description: String,
    /// Link to a profile image or document (e.g. an `ipfs://` URI).
    pub profile_uri: String,
}

/// A registered user. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub profile: UserProfile,
    pub wallet: WalletAddress,
}
