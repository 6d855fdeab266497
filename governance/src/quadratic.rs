//! Quadratic weight arithmetic.
//!
//! `weight = min(floor(sqrt(committed / unit)), max_weight)`, computed
//! entirely in integers so every node derives the same weight.

use crate::params::GovernanceParams;
use civitas_types::TokenAmount;

/// Integer square root using Newton's method: `floor(sqrt(n))`.
pub fn integer_sqrt(n: u128) -> u128 {
    if n < 2 {
        return n;
    }
    // Start above the root so the iteration decreases monotonically.
    let shift = (127 - n.leading_zeros()) / 2 + 1;
    let mut x = 1u128 << shift;
    loop {
        let next = (x + n / x) / 2;
        if next >= x {
            return x;
        }
        x = next;
    }
}

/// Weight carried by a cumulative commitment of `committed` raw tokens.
pub fn quadratic_weight(committed: TokenAmount, params: &GovernanceParams) -> u64 {
    let unit = params.qv_unit.raw().max(1);
    let units = committed.raw() / unit;
    let root = integer_sqrt(units);
    u64::try_from(root)
        .unwrap_or(u64::MAX)
        .min(params.qv_max_weight)
}
