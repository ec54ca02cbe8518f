use proptest::prelude::*;

use meridian_types::{Address, Amount, BlockHash, Hash, Timestamp, TxHash};

proptest! {
    /// BlockHash round trip: new -> as_bytes produces identical bytes.
    #[test]
    fn block_hash_round_trip(bytes in prop::array::uniform32(0u8..)) {
        let hash = BlockHash::new(bytes);
        prop_assert_eq!(hash.as_bytes(), &bytes);
    }

    /// Hash::is_zero is true only for all-zero bytes.
    #[test]
    fn hash_is_zero_correct(bytes in prop::array::uniform32(0u8..)) {
        let hash = Hash::new(bytes);
        prop_assert_eq!(hash.is_zero(), bytes == [0u8; 32]);
    }

    /// BlockHash bincode serialization round trip.
    #[test]
    fn block_hash_bincode_round_trip(bytes in prop::array::uniform32(0u8..)) {
        let hash = BlockHash::new(bytes);
        let encoded = bincode::serialize(&hash).unwrap();
        let decoded: BlockHash = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded, hash);
    }

    /// TxHash ordering matches byte ordering.
    #[test]
    fn tx_hash_ordering(a in prop::array::uniform32(0u8..), b in prop::array::uniform32(0u8..)) {
        let ha = TxHash::new(a);
        let hb = TxHash::new(b);
        prop_assert_eq!(ha <= hb, a <= b);
    }

    /// Address is 20 bytes of the input, unchanged.
    #[test]
    fn address_round_trip(bytes in prop::array::uniform20(0u8..)) {
        let addr = Address::new(bytes);
        prop_assert_eq!(addr.as_bytes(), &bytes);
    }

    /// Amount wrapping subtraction inverts wrapping addition.
    #[test]
    fn amount_wrapping_inverse(a in any::<u64>(), b in any::<u64>()) {
        let x = Amount::from_u64(a);
        let y = Amount::from_u64(b);
        prop_assert_eq!(x.wrapping_sub(y).wrapping_add(y), x);
    }

    /// Amount saturating addition never decreases either operand.
    #[test]
    fn amount_saturating_add_monotone(a in any::<u64>(), b in any::<u64>()) {
        let x = Amount::from_u64(a);
        let y = Amount::from_u64(b);
        let sum = x.saturating_add(y);
        prop_assert!(sum >= x);
        prop_assert!(sum >= y);
    }

    /// Timestamp ordering: new(a) <= new(b) iff a <= b.
    #[test]
    fn timestamp_ordering(a in any::<u64>(), b in any::<u64>()) {
        prop_assert_eq!(Timestamp::new(a) <= Timestamp::new(b), a <= b);
    }

    /// secs_since is the saturating difference.
    #[test]
    fn timestamp_secs_since(base in 0u64..1_000_000, offset in 0u64..1_000_000) {
        let t = Timestamp::new(base);
        let later = Timestamp::new(base + offset);
        prop_assert_eq!(later.secs_since(t), offset);
        prop_assert_eq!(t.secs_since(later), 0);
    }
}
