//! The on-disk workspace: governance state plus the local token ledger,
//! persisted together as one snapshot.

use anyhow::Context;
use civitas_governance::{GovernanceEngine, GovernanceParams, GovernanceState};
use civitas_store::{decode_snapshot, encode_snapshot, SnapshotStore};
use civitas_token::LocalLedger;
use civitas_types::{Clock, SystemClock, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Workspace {
    pub state: GovernanceState,
    pub ledger: LocalLedger,
}

/// Wall-clock time, or a pinned instant for scripted runs.
#[derive(Clone, Copy, Debug)]
pub enum CliClock {
    System(SystemClock),
    Fixed(Timestamp),
}

impl Clock for CliClock {
    fn now(&self) -> Timestamp {
        match self {
            Self::System(clock) => clock.now(),
            Self::Fixed(at) => *at,
        }
    }
}

pub type CliEngine = GovernanceEngine<LocalLedger, CliClock>;

impl Workspace {
    /// Load the workspace, starting empty when nothing was saved yet.
    pub fn load<S: SnapshotStore>(store: &S) -> anyhow::Result<Self> {
        match store.load().context("reading state snapshot")? {
            Some(blob) => decode_snapshot(&blob).context("decoding state snapshot"),
            None => {
                tracing::info!("no saved state, starting empty");
                Ok(Self::default())
            }
        }
    }

    pub fn save<S: SnapshotStore>(&self, store: &S) -> anyhow::Result<()> {
        let blob = encode_snapshot(self).context("encoding state snapshot")?;
        store.save(&blob).context("writing state snapshot")?;
        tracing::debug!(bytes = blob.len(), "state saved");
        Ok(())
    }

    pub fn into_engine(self, params: GovernanceParams, clock: CliClock) -> anyhow::Result<CliEngine> {
        GovernanceEngine::with_state(params, self.state, self.ledger, clock)
            .context("invalid governance parameters")
    }

    pub fn from_engine(engine: CliEngine) -> Self {
        let (state, ledger, _) = engine.into_parts();
        Self { state, ledger }
    }
}
