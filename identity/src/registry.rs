//! Wallet → user registry.

use crate::error::IdentityError;
use crate::user::{User, UserProfile};
use civitas_store::Arena;
use civitas_types::{UserId, WalletAddress};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Registry of all users, indexed by id and by wallet.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct IdentityRegistry {
    users: Arena<User>,
    by_wallet: HashMap<WalletAddress, UserId>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `wallet` with the given profile.
    pub fn create_user(
        &mut self,
        profile: UserProfile,
        wallet: WalletAddress,
    ) -> Result<UserId, IdentityError> {
        if let Some(&user) = self.by_wallet.get(&wallet) {
            return Err(IdentityError::AlreadyRegistered { wallet, user });
        }
        let id = self.users.insert_with(|raw| User {
            id: UserId::new(raw),
            profile,
            wallet: wallet.clone(),
        })?;
        let id = UserId::new(id);
        self.by_wallet.insert(wallet, id);
        tracing::debug!(user = %id, "user registered");
        Ok(id)
    }

    /// Return the wallet's user id, registering it with an empty profile
    /// first if needed. The flag is `true` when a user was created.
    pub fn resolve_or_create(
        &mut self,
        wallet: &WalletAddress,
    ) -> Result<(UserId, bool), IdentityError> {
        match self.find(wallet) {
            Some(id) => Ok((id, false)),
            None => self
                .create_user(UserProfile::default(), wallet.clone())
                .map(|id| (id, true)),
        }
    }

    /// The wallet's user id, or [`UserId::NONE`] if unregistered.
    pub fn lookup(&self, wallet: &WalletAddress) -> UserId {
        self.find(wallet).unwrap_or(UserId::NONE)
    }

    pub fn find(&self, wallet: &WalletAddress) -> Option<UserId> {
        self.by_wallet.get(wallet).copied()
    }

    /// The wallet's user id, failing with `NotRegistered` if absent.
    pub fn require(&self, wallet: &WalletAddress) -> Result<UserId, IdentityError> {
        self.find(wallet)
            .ok_or_else(|| IdentityError::NotRegistered(wallet.clone()))
    }

    pub fn user(&self, id: UserId) -> Result<&User, IdentityError> {
        self.users
            .get(id.get())
            .ok_or(IdentityError::UnknownUser(id))
    }

    pub fn total_users(&self) -> u64 {
        self.users.len()
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.iter().map(|(_, user)| user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wallet(seed: u8) -> WalletAddress {
        WalletAddress::from_bytes([seed; 20])
    }

    fn profile(name: &str) -> UserProfile {
        UserProfile {
            name: name.to_string(),
            email: format!("{name}@example.com"),
            description: "member".to_string(),
            profile_uri: format!("ipfs://{name}"),
        }
    }

    #[test]
    fn test_lookup_is_none_until_registered() {
        let mut registry = IdentityRegistry::new();
        assert_eq!(registry.lookup(&wallet(1)), UserId::NONE);

        let id = registry.create_user(profile("alice"), wallet(1)).unwrap();

        assert_eq!(id, UserId::new(1));
        assert_eq!(registry.lookup(&wallet(1)), id);
        assert_eq!(registry.total_users(), 1);
    }

    #[test]
    fn test_second_registration_rejected() {
        let mut registry = IdentityRegistry::new();
        registry.create_user(profile("alice"), wallet(1)).unwrap();

        let err = registry
            .create_user(profile("mallory"), wallet(1))
            .unwrap_err();

        assert!(matches!(err, IdentityError::AlreadyRegistered { user, .. } if user == UserId::new(1)));
        assert_eq!(registry.total_users(), 1);
        assert_eq!(registry.user(UserId::new(1)).unwrap().profile.name, "alice");
    }

    #[test]
    fn test_ids_are_dense_in_registration_order() {
        let mut registry = IdentityRegistry::new();
        let a = registry.create_user(profile("a"), wallet(1)).unwrap();
        let b = registry.create_user(profile("b"), wallet(2)).unwrap();
        let c = registry.create_user(profile("c"), wallet(3)).unwrap();
        assert_eq!((a.get(), b.get(), c.get()), (1, 2, 3));
        assert_eq!(registry.user(b).unwrap().wallet, wallet(2));
    }

    #[test]
    fn test_resolve_or_create_is_idempotent() {
        let mut registry = IdentityRegistry::new();
        let (first, created) = registry.resolve_or_create(&wallet(4)).unwrap();
        assert!(created);
        let (second, created) = registry.resolve_or_create(&wallet(4)).unwrap();
        assert!(!created);
        assert_eq!(first, second);
        assert_eq!(registry.user(first).unwrap().profile, UserProfile::default());
    }

    #[test]
    fn test_unknown_user_and_require() {
        let registry = IdentityRegistry::new();
        assert!(matches!(
            registry.user(UserId::new(7)),
            Err(IdentityError::UnknownUser(_))
        ));
        assert!(matches!(
            registry.user(UserId::NONE),
            Err(IdentityError::UnknownUser(_))
        ));
        assert!(matches!(
            registry.require(&wallet(1)),
            Err(IdentityError::NotRegistered(_))
        ));
    }
}
