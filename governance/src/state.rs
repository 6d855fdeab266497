//! The complete persisted governance state.

use crate::error::GovernanceError;
use crate::escrow::EscrowBook;
use crate::proposal::ProposalBook;
use crate::voting::VoteBook;
use civitas_dao::DaoRegistry;
use civitas_identity::IdentityRegistry;
use civitas_store::{decode_snapshot, encode_snapshot, SnapshotStore};
use serde::{Deserialize, Serialize};

/// Every collection and index the engine owns.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GovernanceState {
    pub identity: IdentityRegistry,
    pub daos: DaoRegistry,
    pub proposals: ProposalBook,
    pub votes: VoteBook,
    pub escrow: EscrowBook,
}

impl GovernanceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the state as one snapshot blob.
    pub fn save_to<S: SnapshotStore + ?Sized>(&self, store: &S) -> Result<(), GovernanceError> {
        let blob = encode_snapshot(self)?;
        store.save(&blob)?;
        tracing::debug!(bytes = blob.len(), "governance state saved");
        Ok(())
    }

    /// Read the last saved state, `None` if nothing was saved yet.
    pub fn load_from<S: SnapshotStore + ?Sized>(store: &S) -> Result<Option<Self>, GovernanceError> {
        match store.load()? {
            Some(blob) => Ok(Some(decode_snapshot(&blob)?)),
            None => Ok(None),
        }
    }
}
