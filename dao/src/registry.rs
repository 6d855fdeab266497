//! DAO creation and membership.

use crate::dao::{Dao, DaoDraft, Membership};
use crate::error::DaoError;
use civitas_identity::IdentityRegistry;
use civitas_store::Arena;
use civitas_token::TokenLedger;
use civitas_types::{DaoId, UserId, WalletAddress};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// All DAOs and their memberships.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DaoRegistry {
    daos: Arena<Dao>,
    memberships: HashMap<(DaoId, UserId), Membership>,
}

impl DaoRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a DAO with `creator` as its first member and admin.
    ///
    /// An unregistered creator is registered on the fly with an empty
    /// profile.
    pub fn create_dao(
        &mut self,
        identity: &mut IdentityRegistry,
        draft: DaoDraft,
        creator: &WalletAddress,
    ) -> Result<DaoId, DaoError> {
        let (joining_threshold, proposing_threshold) = draft.thresholds()?;
        // Fail before registering the creator if the arena is full.
        self.daos.next_id()?;
        let (creator_id, _) = identity.resolve_or_create(creator)?;

        let id = self.daos.insert_with(|raw| Dao {
            id: DaoId::new(raw),
            name: draft.name,
            description: draft.description,
            joining_threshold,
            proposing_threshold,
            token: draft.token,
            is_private: draft.is_private,
            creator: creator_id,
            members: vec![creator_id],
        })?;
        let id = DaoId::new(id);
        self.memberships
            .insert((id, creator_id), Membership { is_admin: true });
        tracing::debug!(dao = %id, creator = %creator_id, "dao created");
        Ok(id)
    }

    /// Self-service join, gated on the DAO's joining threshold.
    pub fn join_dao<L: TokenLedger + ?Sized>(
        &mut self,
        identity: &IdentityRegistry,
        ledger: &L,
        dao_id: DaoId,
        wallet: &WalletAddress,
    ) -> Result<UserId, DaoError> {
        let dao = self.dao(dao_id)?;
        if dao.is_private {
            return Err(DaoError::PrivateDao(dao_id));
        }
        let user = identity.require(wallet)?;
        if self.is_member(dao_id, user) {
            return Err(DaoError::AlreadyMember { dao: dao_id, user });
        }
        let available = ledger.balance_of(&dao.token, wallet);
        if available < dao.joining_threshold {
            return Err(DaoError::InsufficientBalance {
                dao: dao_id,
                needed: dao.joining_threshold,
                available,
            });
        }
        self.insert_member(dao_id, user, false)?;
        Ok(user)
    }

    /// Admin-only add. Skips the balance check and works for private DAOs.
    pub fn add_member(
        &mut self,
        identity: &IdentityRegistry,
        dao_id: DaoId,
        member: &WalletAddress,
        admin: &WalletAddress,
    ) -> Result<UserId, DaoError> {
        self.dao(dao_id)?;
        if !self.is_admin(identity, dao_id, admin) {
            return Err(DaoError::NotAdmin {
                dao: dao_id,
                wallet: admin.clone(),
            });
        }
        let user = identity.require(member)?;
        if self.is_member(dao_id, user) {
            return Err(DaoError::AlreadyMember { dao: dao_id, user });
        }
        self.insert_member(dao_id, user, false)?;
        Ok(user)
    }

    fn insert_member(&mut self, dao_id: DaoId, user: UserId, is_admin: bool) -> Result<(), DaoError> {
        let dao = self
            .daos
            .get_mut(dao_id.get())
            .ok_or(DaoError::DaoNotFound(dao_id))?;
        dao.members.push(user);
        self.memberships
            .insert((dao_id, user), Membership { is_admin });
        tracing::debug!(dao = %dao_id, user = %user, is_admin, "member added");
        Ok(())
    }

    pub fn dao(&self, id: DaoId) -> Result<&Dao, DaoError> {
        self.daos.get(id.get()).ok_or(DaoError::DaoNotFound(id))
    }

    pub fn total_daos(&self) -> u64 {
        self.daos.len()
    }

    pub fn daos(&self) -> impl Iterator<Item = &Dao> {
        self.daos.iter().map(|(_, dao)| dao)
    }

    /// Members in join order.
    pub fn members(&self, id: DaoId) -> Result<&[UserId], DaoError> {
        self.dao(id).map(|dao| dao.members.as_slice())
    }

    pub fn membership(&self, dao: DaoId, user: UserId) -> Option<Membership> {
        self.memberships.get(&(dao, user)).copied()
    }

    pub fn is_member(&self, dao: DaoId, user: UserId) -> bool {
        self.memberships.contains_key(&(dao, user))
    }

    /// Wallet-level membership check; unregistered wallets are never members.
    pub fn check_membership(
        &self,
        identity: &IdentityRegistry,
        dao: DaoId,
        wallet: &WalletAddress,
    ) -> bool {
        identity
            .find(wallet)
            .is_some_and(|user| self.is_member(dao, user))
    }

    pub fn is_admin(&self, identity: &IdentityRegistry, dao: DaoId, wallet: &WalletAddress) -> bool {
        identity
            .find(wallet)
            .and_then(|user| self.membership(dao, user))
            .is_some_and(|m| m.is_admin)
    }

    pub fn require_member(&self, dao: DaoId, user: UserId) -> Result<(), DaoError> {
        if self.is_member(dao, user) {
            Ok(())
        } else {
            Err(DaoError::NotMember { dao, user })
        }
    }
}
