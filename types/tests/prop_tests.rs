use proptest::prelude::*;

use civitas_types::{Timestamp, TokenAmount, UserId, WalletAddress};

proptest! {
    /// Any 20 bytes produce an address that parses back to itself.
    #[test]
    fn wallet_address_parse_accepts_own_output(bytes in prop::array::uniform20(0u8..)) {
        let addr = WalletAddress::from_bytes(bytes);
        let reparsed = WalletAddress::parse(addr.as_str()).unwrap();
        prop_assert_eq!(reparsed, addr);
    }

    /// Upper-case spelling of an address is the same wallet.
    #[test]
    fn wallet_address_case_insensitive(bytes in prop::array::uniform20(0u8..)) {
        let addr = WalletAddress::from_bytes(bytes);
        let shouted = format!("0x{}", &addr.as_str()[2..].to_uppercase());
        prop_assert_eq!(WalletAddress::parse(&shouted).unwrap(), addr);
    }

    /// Timestamp ordering: new(a) <= new(b) iff a <= b.
    #[test]
    fn timestamp_ordering(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
        let ta = Timestamp::new(a);
        let tb = Timestamp::new(b);
        prop_assert_eq!(ta <= tb, a <= b);
        prop_assert_eq!(ta == tb, a == b);
    }

    /// elapsed_since and remaining_from are mirror images.
    #[test]
    fn timestamp_elapsed_and_remaining(base in 0u64..1_000_000, offset in 0u64..1_000_000) {
        let t = Timestamp::new(base);
        let later = Timestamp::new(base + offset);
        prop_assert_eq!(t.elapsed_since(later), offset);
        prop_assert_eq!(later.remaining_from(t), offset);
        prop_assert_eq!(t.remaining_from(later), 0);
    }

    /// Raw amounts parse exactly.
    #[test]
    fn token_amount_parses_raw(raw in 0u128..u128::MAX) {
        prop_assert_eq!(raw.to_string().parse::<TokenAmount>().unwrap(), TokenAmount::new(raw));
    }

    /// checked_add never silently wraps.
    #[test]
    fn token_amount_checked_add(a in 0u128..u128::MAX, b in 0u128..u128::MAX) {
        let sum = TokenAmount::new(a).checked_add(TokenAmount::new(b));
        prop_assert_eq!(sum.map(|s| s.raw()), a.checked_add(b));
    }

    /// Ids keep their ordering and only zero is the sentinel.
    #[test]
    fn user_id_sentinel(raw in 0u64..u64::MAX) {
        prop_assert_eq!(UserId::new(raw).is_none(), raw == 0);
    }
}

#[test]
fn timestamp_bincode_is_plain_u64() {
    let encoded = bincode::serialize(&Timestamp::new(7)).unwrap();
    assert_eq!(encoded, bincode::serialize(&7u64).unwrap());
}
