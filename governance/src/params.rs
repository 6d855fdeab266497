//! Governance parameters.
//!
//! Loaded from the `[governance]` table of the daemon's TOML config; every
//! field has a default so an empty table is valid.

use crate::error::GovernanceError;
use civitas_types::{TokenAmount, WalletAddress};
use serde::{Deserialize, Serialize};

/// What happens to quadratic commitments beyond the maximum weight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QvCapPolicy {
    /// Accept the tokens; the weight stays at the cap.
    #[default]
    Saturate,
    /// Refuse any commitment that would push the cumulative amount past
    /// the point where the cap is reached.
    Reject,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceParams {
    /// Wallet that holds escrowed vote commitments.
    #[serde(default = "default_custody")]
    pub custody: WalletAddress,

    /// Raw token amount that counts as one unit under the square root.
    #[serde(default = "default_qv_unit")]
    pub qv_unit: TokenAmount,

    /// Maximum weight one voter can reach on a quadratic proposal.
    #[serde(default = "default_qv_max_weight")]
    pub qv_max_weight: u64,

    #[serde(default)]
    pub qv_cap_policy: QvCapPolicy,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_custody() -> WalletAddress {
    WalletAddress::from_bytes([0xcc; 20])
}

fn default_qv_unit() -> TokenAmount {
    TokenAmount::new(TokenAmount::RAW_PER_TOKEN)
}

fn default_qv_max_weight() -> u64 {
    10
}

// ── Impl ───────────────────────────────────────────────────────────────

impl GovernanceParams {
    pub fn validate(&self) -> Result<(), GovernanceError> {
        if self.qv_unit.is_zero() {
            return Err(GovernanceError::InvalidParams(
                "qv_unit must be non-zero".into(),
            ));
        }
        if self.qv_max_weight == 0 {
            return Err(GovernanceError::InvalidParams(
                "qv_max_weight must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Cumulative commitment at which a voter reaches the weight cap
    /// (`max_weight² × unit`), saturating at the largest representable amount.
    pub fn qv_cap_commitment(&self) -> TokenAmount {
        let max = u128::from(self.qv_max_weight);
        TokenAmount::new(
            max.saturating_mul(max)
                .saturating_mul(self.qv_unit.raw()),
        )
    }
}

impl Default for GovernanceParams {
    fn default() -> Self {
        Self {
            custody: default_custody(),
            qv_unit: default_qv_unit(),
            qv_max_weight: default_qv_max_weight(),
            qv_cap_policy: QvCapPolicy::default(),
        }
    }
}
