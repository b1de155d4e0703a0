use proptest::prelude::*;

use strata_types::{Deposit, ElectRole, NodeAddress, Position, VipLevel};

proptest! {
    /// NodeAddress roundtrip: new -> as_bytes -> new produces identical address.
    #[test]
    fn address_roundtrip(bytes in prop::array::uniform20(0u8..)) {
        let addr = NodeAddress::new(bytes);
        prop_assert_eq!(addr.as_bytes(), &bytes);
    }

    /// NodeAddress hex display parses back to the same address.
    #[test]
    fn address_hex_roundtrip(bytes in prop::array::uniform20(0u8..)) {
        let addr = NodeAddress::new(bytes);
        let parsed = NodeAddress::from_hex(&addr.to_string()).unwrap();
        prop_assert_eq!(parsed, addr);
    }

    /// NodeAddress::is_zero is true only for all-zero bytes.
    #[test]
    fn address_is_zero_correct(bytes in prop::array::uniform20(0u8..)) {
        let addr = NodeAddress::new(bytes);
        prop_assert_eq!(addr.is_zero(), bytes == [0u8; 20]);
    }

    /// Deposit whole-coin conversion inverts from_coins.
    #[test]
    fn deposit_coin_roundtrip(coins in 0u64..1_000_000_000) {
        let d = Deposit::from_coins(coins);
        prop_assert_eq!(d.whole_coins(), coins);
    }

    /// Deposit ordering matches raw ordering.
    #[test]
    fn deposit_ordering(a in 0u128..u128::MAX, b in 0u128..u128::MAX) {
        prop_assert_eq!(Deposit::new(a) <= Deposit::new(b), a <= b);
    }

    /// Position round-trips role and index for every in-range index.
    #[test]
    fn position_roundtrip(index in 0u16..0x1000) {
        for role in [
            ElectRole::Miner,
            ElectRole::Validator,
            ElectRole::BackupValidator,
            ElectRole::CandidateValidator,
        ] {
            let p = Position::new(role, index).unwrap();
            prop_assert_eq!(p.role().unwrap(), role);
            prop_assert_eq!(p.index(), index);
        }
    }

    /// VipLevel ordering follows tier index.
    #[test]
    fn vip_ordering(a in 0usize..=255, b in 0usize..=255) {
        prop_assert_eq!(VipLevel::from_tier(a) <= VipLevel::from_tier(b), a <= b);
    }
}
