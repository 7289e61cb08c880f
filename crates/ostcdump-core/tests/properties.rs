//! Property tests for value widths, version ranges and the encode/decode law.

use ostcdump_core::protocols::mk2;
use ostcdump_core::{
    BoundedInt, DumpCodec, MAX_BITS, ValueError, VersionMatcher, format_version, parse_version,
};
use proptest::prelude::*;

const DOWNLOAD_SIZE: usize = 65_802;

fn noisy_dump(seed: u64, major: u8, minor: u8) -> Vec<u8> {
    let mut state = seed | 1;
    let mut dump: Vec<u8> = (0..DOWNLOAD_SIZE)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state as u8
        })
        .collect();
    dump[264] = major;
    dump[265] = minor;
    dump
}

fn minor_strategy() -> impl Strategy<Value = (u8, u8)> {
    prop_oneof![
        (Just(1u8), 0u8..=99),
        (2u8..=9, 0u8..=99),
    ]
}

proptest! {
    #[test]
    fn prop_bounded_int_accepts_values_in_width(bits in 1u8..=MAX_BITS, raw in any::<u32>()) {
        let value = raw & ((1u32 << bits) - 1);
        let cf = BoundedInt::new(value, value, bits).unwrap();
        prop_assert_eq!(u32::from(cf.default_value()), value);
        prop_assert_eq!(u32::from(cf.current()), value);
    }

    #[test]
    fn prop_bounded_int_rejects_values_past_width(
        bits in 1u8..=MAX_BITS,
        excess in 0u32..1_000_000,
        fallback in any::<u16>(),
    ) {
        let value = (1u32 << bits) + excess;
        prop_assert_eq!(
            BoundedInt::new(value, 0, bits).unwrap_err(),
            ValueError::OutOfRange { value, bits }
        );
        let fallback = fallback & (((1u32 << bits) - 1) as u16);
        let cf = BoundedInt::lenient(value, value, bits, fallback);
        prop_assert_eq!(cf.default_value(), fallback);
        prop_assert_eq!(cf.current(), fallback);
    }

    #[test]
    fn prop_version_parse_matches_from_bytes(major in 0u8..=255, minor in 0u8..=99) {
        let text = format!("{major}.{minor}");
        let parsed = parse_version(&text).unwrap();
        prop_assert_eq!(parsed, ostcdump_core::version_from_bytes(major, minor));
        prop_assert_eq!(parse_version(&format_version(parsed)).unwrap(), parsed);
    }

    #[test]
    fn prop_unbounded_range_contains_everything_newer(min in 0u32..25_000, delta in 0u32..75_000) {
        let range = VersionMatcher::from_version(min);
        prop_assert!(range.contains(min + delta));
        if min > 0 {
            prop_assert!(!range.contains(min - 1));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_encode_decode_is_stable(seed in any::<u64>(), (major, minor) in minor_strategy()) {
        let codec = DumpCodec::mk2().unwrap();
        let original = noisy_dump(seed, major, minor);
        let decoded = codec.decode(&original).unwrap();

        let first = codec
            .encode(&decoded.settings, &decoded.revision, Some(&original))
            .unwrap();
        let owned = decoded.revision.effective_fields();
        for (idx, (a, b)) in original.iter().zip(&first).enumerate() {
            if !owned.iter().any(|field| field.range().contains(&idx)) {
                prop_assert_eq!(a, b, "unowned byte {} changed", idx);
            }
        }

        let again = codec.decode(&first).unwrap();
        prop_assert!(again.normalized.is_empty());
        prop_assert_eq!(&again.settings, &decoded.settings);
        let second = codec
            .encode(&again.settings, &again.revision, Some(&first))
            .unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_clean_dump_reproduces_owned_bytes(seed in any::<u64>()) {
        let codec = DumpCodec::mk2().unwrap();
        let revision = codec.registry().by_name(mk2::REVISION_1_91).unwrap();
        let noisy = noisy_dump(seed, 1, 91);
        let settings = revision.decode(&noisy).unwrap();
        let clean = codec.encode(&settings, &revision, Some(&noisy)).unwrap();

        let mut copy = clean.clone();
        revision.encode(&revision.decode(&clean).unwrap(), &mut copy).unwrap();
        prop_assert_eq!(copy, clean);
    }
}
