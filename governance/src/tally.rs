//! Tallying and the pass rule.
//!
//! The denominator is always what was cast: voter counts on threshold
//! proposals, summed weights on quadratic ones. Members who stayed away do
//! not count against a proposal.

use civitas_types::Timestamp;
use serde::{Deserialize, Serialize};

/// Running or final vote totals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub yes: u128,
    pub no: u128,
}

impl Tally {
    pub fn total(&self) -> u128 {
        self.yes.saturating_add(self.no)
    }

    /// Passes iff something was cast and `yes` is at least
    /// `passing_threshold` percent of it. Ties at the threshold pass.
    pub fn passes(&self, passing_threshold: u8) -> bool {
        let total = self.total();
        if total == 0 {
            return false;
        }
        self.yes.saturating_mul(100) >= u128::from(passing_threshold).saturating_mul(total)
    }
}

/// The recorded result of a finalized proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub passed: bool,
    pub tally: Tally,
    pub finalized_at: Timestamp,
}
