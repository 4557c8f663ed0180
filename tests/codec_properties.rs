//! Property-based checks of the codec using proptest

use proptest::prelude::*;

use grayhuff::decoder;
use grayhuff::{CodecError, Dimensions, HuffmanCodec, HuffmanTree};

/// Samples drawn from a small alphabet so codes get reused and trees get shape
fn skewed_samples() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        prop::collection::vec(any::<u8>(), 1..2000),
        prop::collection::vec(0u8..4, 1..2000),
        prop::collection::vec(prop::sample::select(vec![0u8, 17, 128, 255]), 1..500),
    ]
}

fn decompress_flat(samples_len: usize, compressed: &grayhuff::Compressed) -> Result<Vec<u8>, CodecError> {
    HuffmanCodec::decompress(
        &compressed.stream,
        &compressed.code_book,
        samples_len,
        Dimensions::new(samples_len as u32, 1),
    )
    .map(|raster| raster.into_samples())
}

proptest! {
    #[test]
    fn prop_roundtrip(samples in skewed_samples()) {
        let compressed = HuffmanCodec::compress(&samples).unwrap();
        prop_assert_eq!(decompress_flat(samples.len(), &compressed).unwrap(), samples);
    }

    #[test]
    fn prop_tree_walk_matches_table(samples in skewed_samples()) {
        let codec = HuffmanCodec::from_samples(&samples).unwrap();
        let stream = codec.encode(&samples).unwrap().pack();
        let reverse = codec.code_book().reverse().unwrap();
        prop_assert_eq!(
            decoder::decode_with_tree(&stream, codec.tree(), Some(samples.len())).unwrap(),
            decoder::decode(&stream, &reverse, Some(samples.len())).unwrap()
        );
    }

    #[test]
    fn prop_prefix_free(samples in skewed_samples()) {
        let book = HuffmanTree::from_samples(&samples).unwrap().generate_code_book();
        let codes: Vec<_> = book.iter().collect();
        for (i, (_, a)) in codes.iter().enumerate() {
            prop_assert!(!a.is_empty());
            for (j, (_, b)) in codes.iter().enumerate() {
                if i != j {
                    prop_assert!(!a.is_prefix_of(b));
                }
            }
        }
    }

    #[test]
    fn prop_every_symbol_has_a_code(samples in skewed_samples()) {
        let compressed = HuffmanCodec::compress(&samples).unwrap();
        for &s in &samples {
            prop_assert!(compressed.code_book.get(s).is_some());
        }
        let mut distinct = samples.clone();
        distinct.sort_unstable();
        distinct.dedup();
        prop_assert_eq!(compressed.code_book.len(), distinct.len());
    }

    #[test]
    fn prop_deterministic(samples in skewed_samples()) {
        let a = HuffmanCodec::compress(&samples).unwrap();
        let b = HuffmanCodec::compress(&samples).unwrap();
        prop_assert_eq!(&a.code_book, &b.code_book);
        prop_assert_eq!(&a.stream, &b.stream);
    }

    #[test]
    fn prop_bit_accounting(samples in skewed_samples()) {
        let compressed = HuffmanCodec::compress(&samples).unwrap();
        let stats = &compressed.stats;
        let expected_bits: usize = samples
            .iter()
            .map(|&s| compressed.code_book.get(s).unwrap().len())
            .sum();
        prop_assert_eq!(stats.compressed_bits, expected_bits as u64);
        prop_assert_eq!(stats.original_bits, samples.len() as u64 * 8);

        let padding = compressed.stream.padding() as usize;
        prop_assert!((1..=8).contains(&padding));
        prop_assert_eq!(compressed.stream.bytes().len() * 8, expected_bits + padding);
    }

    #[test]
    fn prop_single_bit_flip_is_detected_or_same_length(
        samples in prop::collection::vec(0u8..16, 8..400),
        flip in any::<prop::sample::Index>(),
    ) {
        let compressed = HuffmanCodec::compress(&samples).unwrap();
        let mut stream = compressed.stream.clone();
        let bit = flip.index(stream.data_bit_len());
        stream.bytes_mut()[bit / 8] ^= 1 << (7 - bit % 8);

        match HuffmanCodec::decompress(
            &stream,
            &compressed.code_book,
            samples.len(),
            Dimensions::new(samples.len() as u32, 1),
        ) {
            Ok(raster) => {
                prop_assert_eq!(raster.samples().len(), samples.len());
                prop_assert_ne!(raster.samples(), &samples[..]);
            }
            Err(e) => prop_assert!(e.is_corruption(), "unexpected error: {}", e),
        }
    }
}

#[test]
fn single_symbol_image() {
    let samples = [7u8, 7, 7, 7];
    let compressed = HuffmanCodec::compress(&samples).unwrap();
    assert_eq!(compressed.code_book.get(7).unwrap().to_string(), "0");
    assert_eq!(compressed.stats.compressed_bits, 4);

    let raster = HuffmanCodec::decompress(
        &compressed.stream,
        &compressed.code_book,
        4,
        Dimensions::new(2, 2),
    )
    .unwrap();
    assert_eq!(raster.samples(), &samples);
}

#[test]
fn byte_aligned_stream_gets_full_padding_byte() {
    // two equally common symbols -> one bit each, 16 samples -> 16 bits
    let samples: Vec<u8> = (0..16).map(|i| if i % 2 == 0 { 40 } else { 90 }).collect();
    let compressed = HuffmanCodec::compress(&samples).unwrap();
    assert_eq!(compressed.stats.compressed_bits, 16);
    assert_eq!(compressed.stream.padding(), 8);
    assert_eq!(compressed.stream.bytes().len(), 3);
    assert_eq!(compressed.stream.bytes()[2], 0);

    let serialized = compressed.stream.serialize().unwrap();
    assert_eq!(serialized[0], 8);
    assert_eq!(serialized.len(), 4);

    let restored = decompress_flat(samples.len(), &compressed).unwrap();
    assert_eq!(restored, samples);
}

#[test]
fn skewed_two_symbol_ratio() {
    let mut samples = vec![12u8; 900];
    samples.extend(std::iter::repeat(240u8).take(100));
    let compressed = HuffmanCodec::compress(&samples).unwrap();
    assert!(compressed.stats.compressed_bits <= 8000);
    assert!(compressed.stats.compression_ratio < 50.0);
}

#[test]
fn empty_input_is_rejected() {
    assert!(matches!(HuffmanCodec::compress(&[]), Err(CodecError::EmptyInput)));
}
