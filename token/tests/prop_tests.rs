use proptest::prelude::*;

use civitas_token::{LocalLedger, TokenLedger};
use civitas_types::{TokenAmount, TokenRef, WalletAddress};

fn wallet(seed: u8) -> WalletAddress {
    WalletAddress::from_bytes([seed; 20])
}

proptest! {
    /// Whatever mix of transfers succeeds or fails, the sum of balances
    /// equals the minted supply.
    #[test]
    fn transfers_conserve_supply(
        minted in prop::collection::vec(0u128..1_000, 4),
        moves in prop::collection::vec((0u8..4, 0u8..4, 0u128..1_500), 0..40),
    ) {
        let token = TokenRef::new("GOV").unwrap();
        let mut ledger = LocalLedger::new();
        for (i, amount) in minted.iter().enumerate() {
            ledger.mint(&token, &wallet(i as u8), TokenAmount::new(*amount)).unwrap();
        }
        for (from, to, amount) in moves {
            let _ = ledger.transfer(&token, &wallet(from), &wallet(to), TokenAmount::new(amount));
        }
        let total: u128 = (0..4u8).map(|i| ledger.balance_of(&token, &wallet(i)).raw()).sum();
        prop_assert_eq!(total, ledger.total_supply(&token).raw());
    }

    /// A pull larger than the allowance never moves tokens.
    #[test]
    fn transfer_from_respects_allowance(approved in 0u128..1_000, pull in 0u128..2_000) {
        let token = TokenRef::new("GOV").unwrap();
        let (owner, custody) = (wallet(1), wallet(2));
        let mut ledger = LocalLedger::new();
        ledger.mint(&token, &owner, TokenAmount::new(5_000)).unwrap();
        ledger.approve(&token, &owner, &custody, TokenAmount::new(approved));

        let result = ledger.transfer_from(&token, &custody, &owner, &custody, TokenAmount::new(pull));

        prop_assert_eq!(result.is_ok(), pull <= approved);
        let moved = ledger.balance_of(&token, &custody).raw();
        prop_assert_eq!(moved, if pull <= approved { pull } else { 0 });
    }
}
