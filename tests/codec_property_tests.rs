//! Property-based round-trip tests for the byte codecs

use memcab::compression::block_sort::{gamma_decode, gamma_encode, mtf_decode, mtf_encode};
use memcab::encoding::{
    base64_decode, base64_encode, ber_decode, ber_encode, mime_decode, mime_encode, pack_decode,
    pack_encode, quote_decode, quote_encode, url_decode, url_encode, xml_escape, xml_unescape,
    Base64Codec,
};
use memcab::{bwt_decode, bwt_encode, BlockSortCodec, BlockSortConfig};
use proptest::prelude::*;

// =============================================================================
// PROPERTY TEST GENERATORS
// =============================================================================

/// Buffers built from runs of random length, mixing long runs with noise
fn runs_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec((any::<u8>(), 1usize..300), 0..30).prop_map(|runs| {
        runs.into_iter()
            .flat_map(|(byte, len)| std::iter::repeat(byte).take(len))
            .collect()
    })
}

/// Text over a small alphabet, which produces many equal rotations
fn text_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop_oneof![Just(b'a'), Just(b'b'), Just(b'n'), Just(b' ')], 0..2000)
}

fn bytes_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..1024)
}

// =============================================================================
// BLOCK SORT PIPELINE
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_block_sort_round_trip(
        data in prop_oneof![bytes_strategy(), runs_strategy(), text_strategy()]
    ) {
        let codec = BlockSortCodec::new();
        prop_assert_eq!(codec.decode(&codec.encode(&data)), data);
    }

    #[test]
    fn prop_block_sort_custom_blocks(data in text_strategy(), block_size in 1usize..300) {
        let config = BlockSortConfig {
            block_size,
            count_sort_threshold: 8,
            count_sort_levels: 2,
        };
        let codec = BlockSortCodec::with_config(config).unwrap();
        prop_assert_eq!(codec.decode(&codec.encode(&data)), data);
    }

    #[test]
    fn prop_bwt_round_trip(data in prop_oneof![bytes_strategy(), text_strategy()]) {
        let (column, primary) = bwt_encode(&data);
        prop_assert_eq!(column.len(), data.len());
        let mut sorted_in = data.clone();
        let mut sorted_out = column.clone();
        sorted_in.sort_unstable();
        sorted_out.sort_unstable();
        prop_assert_eq!(sorted_out, sorted_in);
        prop_assert_eq!(bwt_decode(&column, primary), data);
    }
}

proptest! {
    #[test]
    fn prop_mtf_round_trip(data in bytes_strategy()) {
        let mut staged = data.clone();
        mtf_encode(&mut staged);
        mtf_decode(&mut staged);
        prop_assert_eq!(staged, data);
    }

    #[test]
    fn prop_gamma_round_trip(data in prop_oneof![bytes_strategy(), runs_strategy()]) {
        prop_assert_eq!(gamma_decode(&gamma_encode(&data)), data);
    }

    // =========================================================================
    // SIMPLE CODECS
    // =========================================================================

    #[test]
    fn prop_packbits_round_trip(data in prop_oneof![bytes_strategy(), runs_strategy()]) {
        prop_assert_eq!(pack_decode(&pack_encode(&data)), data);
    }

    #[test]
    fn prop_base64_round_trip(data in bytes_strategy()) {
        let encoded = base64_encode(&data);
        prop_assert_eq!(base64_decode(&encoded), data.clone());
        prop_assert_eq!(Base64Codec::new().decode(&encoded).unwrap(), data);
    }

    #[test]
    fn prop_url_round_trip(data in bytes_strategy()) {
        let encoded = url_encode(&data);
        prop_assert!(encoded.is_ascii());
        prop_assert_eq!(url_decode(&encoded), data);
    }

    #[test]
    fn prop_quoted_printable_round_trip(data in bytes_strategy()) {
        let encoded = quote_encode(&data);
        prop_assert!(encoded.is_ascii());
        prop_assert_eq!(quote_decode(&encoded), data);
    }

    #[test]
    fn prop_ber_round_trip(numbers in prop::collection::vec(any::<u32>(), 0..200)) {
        prop_assert_eq!(ber_decode(&ber_encode(&numbers)), numbers);
    }

    #[test]
    fn prop_xml_round_trip(text in "\\PC{0,200}") {
        let escaped = xml_escape(&text);
        prop_assert!(!escaped.contains('<'));
        prop_assert_eq!(xml_unescape(&escaped), text);
    }

    #[test]
    fn prop_mime_round_trip(data in bytes_strategy(), base64 in any::<bool>()) {
        let word = mime_encode(&data, "ISO-8859-1", base64);
        let (decoded, charset) = mime_decode(&word);
        prop_assert_eq!(decoded, data);
        prop_assert_eq!(charset, "ISO-8859-1");
    }
}

#[test]
fn test_packbits_long_run_is_small() {
    let encoded = pack_encode(&[0x42; 1000]);
    assert!(encoded.len() <= 2 * (1000 / 127 + 1));
    assert_eq!(pack_decode(&encoded), vec![0x42; 1000]);
}

#[test]
fn test_block_sort_edge_buffers() {
    let codec = BlockSortCodec::new();
    for data in [Vec::new(), vec![0u8], vec![0xff; 9000], (0..=255u8).collect()] {
        assert_eq!(codec.decode(&codec.encode(&data)), data);
    }
}
