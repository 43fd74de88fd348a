//! Corruption rejection: flipping any single bit of a compressed
//! stream must either still round-trip (the bit was redundant) or
//! fail with a typed error. Silent wrong output and panics are both
//! forbidden.

use ferroflate_core::error::CodecError;
use ferroflate_deflate::zlib::{zlib_compress, zlib_decompress};
use ferroflate_deflate::{Inflater, inflate};
use ferroflate_core::traits::FlushMode;

fn sample_input() -> Vec<u8> {
    let mut input = Vec::new();
    let pattern = b"corruption probe: abcabcabc 0123456789 ";
    while input.len() < 4000 {
        input.extend_from_slice(pattern);
    }
    input
}

#[test]
fn test_every_single_bit_flip_is_caught_or_harmless() {
    let input = sample_input();
    let compressed = zlib_compress(&input, 6).unwrap();

    for byte_idx in 0..compressed.len() {
        for bit in 0..8 {
            let mut corrupted = compressed.clone();
            corrupted[byte_idx] ^= 1 << bit;

            match zlib_decompress(&corrupted) {
                Ok(output) => assert_eq!(
                    output, input,
                    "flip at byte {byte_idx} bit {bit} silently changed the output"
                ),
                Err(err) => assert!(
                    err.is_data_error(),
                    "flip at byte {byte_idx} bit {bit} produced a non-data error"
                ),
            }
        }
    }
}

#[test]
fn test_truncation_at_every_length_is_caught() {
    let input = sample_input();
    let compressed = zlib_compress(&input, 6).unwrap();

    for len in 0..compressed.len() {
        let err = zlib_decompress(&compressed[..len]);
        assert!(
            err.is_err(),
            "truncation to {len} bytes decoded successfully"
        );
    }
}

#[test]
fn test_garbage_input_is_rejected() {
    let mut seed = 0xDEADBEEFu64;
    for _ in 0..100 {
        let garbage: Vec<u8> = (0..64)
            .map(|_| {
                seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
                (seed >> 33) as u8
            })
            .collect();
        // Any outcome but a panic is acceptable; raw mode may decode
        // garbage to something, zlib mode should normally reject it.
        let _ = zlib_decompress(&garbage);
        let _ = inflate(&garbage);
    }
}

#[test]
fn test_oversubscribed_dynamic_header_rejected() {
    // A dynamic block whose code-length code is over-subscribed:
    // HLIT=257, HDIST=1, HCLEN=19, every code-length code 1 bit.
    let mut bits = ferroflate_core::bitstream::BitWriter::new();
    bits.push(1, 1); // final
    bits.push(0b10, 2); // dynamic
    bits.push(0, 5); // hlit = 257
    bits.push(0, 5); // hdist = 1
    bits.push(15, 4); // hclen = 19
    for _ in 0..19 {
        bits.push(1, 3); // all 19 codes claim length 1
    }
    bits.align();

    let err = inflate(&bits.split_bytes()).unwrap_err();
    assert!(matches!(err, CodecError::BadHuffmanTable { .. }));
}

#[test]
fn test_repeat_directive_overflow_rejected() {
    // Header announces 258 code lengths but the repeat directives run
    // past the announced count.
    let mut bits = ferroflate_core::bitstream::BitWriter::new();
    bits.push(1, 1);
    bits.push(0b10, 2);
    bits.push(0, 5); // hlit = 257
    bits.push(0, 5); // hdist = 1
    bits.push(15, 4); // hclen = 19

    // Code-length code: symbol 0 -> 1 bit, symbol 18 -> 1 bit. The
    // transmission order is 16,17,18,0,...; slots 2 (symbol 18) and 3
    // (symbol 0) get length 1.
    for i in 0..19 {
        let len = if i == 2 || i == 3 { 1 } else { 0 };
        bits.push(len, 3);
    }
    // Canonical: symbol 0 -> code 0, symbol 18 -> code 1.
    // Emit 18 (138 zeros) three times: 414 > 258.
    for _ in 0..3 {
        bits.push(1, 1); // symbol 18
        bits.push(127, 7); // repeat 138
    }
    bits.align();

    let err = inflate(&bits.split_bytes()).unwrap_err();
    assert!(matches!(err, CodecError::BadHuffmanTable { .. }));
}

#[test]
fn test_error_state_is_terminal_and_syncable() {
    let input = sample_input();
    let good = zlib_compress(&input, 6).unwrap();
    let mut corrupted = good.clone();
    corrupted[10] ^= 0xFF;

    let mut inflater = Inflater::zlib();
    let mut buffer = vec![0u8; 65536];
    let mut failed = false;
    let mut pos = 0;
    while pos < corrupted.len() {
        match inflater.inflate(&corrupted[pos..], &mut buffer, FlushMode::None) {
            Ok((consumed, _, _)) => {
                if consumed == 0 {
                    break;
                }
                pos += consumed;
            }
            Err(_) => {
                failed = true;
                break;
            }
        }
    }
    // A flip this early in the stream corrupts a block header or the
    // first table; the engine must report and stay failed.
    if failed {
        let again = inflater.inflate(&corrupted, &mut buffer, FlushMode::None);
        assert!(again.is_err(), "data errors must be sticky");

        // sync() is the documented escape hatch: scanning garbage
        // without a marker consumes it and keeps looking.
        let (_, found) = inflater.sync(b"no marker here");
        assert!(!found);
        let (_, found) = inflater.sync(&[0x00, 0x00, 0xFF, 0xFF]);
        assert!(found);
    }
}
