//! Suspend/resume behavior of the streaming engines: tiny buffers must
//! behave bit-for-bit like large ones.

use ferroflate_core::traits::{CompressStatus, DecompressStatus, FlushMode};
use ferroflate_deflate::{Deflater, Inflater, deflate, inflate};

fn sample_input() -> Vec<u8> {
    let mut input = Vec::new();
    let pattern = b"streaming equivalence: the same bytes, every time. ";
    while input.len() < 150_000 {
        input.extend_from_slice(pattern);
    }
    input.truncate(150_000);
    input
}

/// Encoding through one-byte input feeds must produce output identical
/// to a single large call.
#[test]
fn test_encode_single_byte_feeds_identical() {
    let input = sample_input();
    let reference = deflate(&input, 6).unwrap();

    let mut deflater = Deflater::new(6);
    let mut out = Vec::new();
    let mut buffer = vec![0u8; 4096];
    for &byte in &input {
        let (consumed, produced, _) = deflater
            .compress(&[byte], &mut buffer, FlushMode::None)
            .unwrap();
        assert_eq!(consumed, 1);
        out.extend_from_slice(&buffer[..produced]);
    }
    loop {
        let (_, produced, status) = deflater
            .compress(&[], &mut buffer, FlushMode::Finish)
            .unwrap();
        out.extend_from_slice(&buffer[..produced]);
        if status == CompressStatus::Done {
            break;
        }
    }

    assert_eq!(out, reference);
}

/// Encoding through a one-byte output buffer must also match.
#[test]
fn test_encode_single_byte_output_identical() {
    let input = b"output drained one byte at a time, output drained one byte at a time";
    let reference = deflate(input, 6).unwrap();

    let mut deflater = Deflater::new(6);
    let mut out = Vec::new();
    let mut byte = [0u8; 1];
    let mut fed = false;
    loop {
        let src: &[u8] = if fed { &[] } else { input };
        let (_, produced, status) = deflater.compress(src, &mut byte, FlushMode::Finish).unwrap();
        fed = true;
        out.extend_from_slice(&byte[..produced]);
        if status == CompressStatus::Done {
            break;
        }
    }

    assert_eq!(out, reference);
}

/// Decoding through one-byte input and output buffers must reproduce
/// the one-shot result exactly.
#[test]
fn test_decode_single_byte_buffers_identical() {
    let input = sample_input();
    let compressed = deflate(&input, 6).unwrap();
    let reference = inflate(&compressed).unwrap();
    assert_eq!(reference, input);

    let mut inflater = Inflater::raw();
    let mut out = Vec::new();
    let mut byte = [0u8; 1];
    let mut pos = 0;
    while !inflater.is_finished() {
        let end = (pos + 1).min(compressed.len());
        let (consumed, produced, status) = inflater
            .inflate(&compressed[pos..end], &mut byte, FlushMode::None)
            .unwrap();
        pos += consumed;
        out.extend_from_slice(&byte[..produced]);
        if status == DecompressStatus::NeedsInput && pos >= compressed.len() {
            break;
        }
    }

    assert!(inflater.is_finished());
    assert_eq!(out, reference);
}

/// Mixed buffer sizes mid-stream: odd chunk sizes on both sides.
#[test]
fn test_decode_irregular_chunks() {
    let input = sample_input();
    let compressed = deflate(&input, 9).unwrap();

    let mut inflater = Inflater::raw();
    let mut out = Vec::new();
    let mut buffer = vec![0u8; 7];
    let mut pos = 0;
    let mut step = 1usize;
    while !inflater.is_finished() {
        let end = (pos + step).min(compressed.len());
        step = step % 13 + 1;
        let (consumed, produced, status) = inflater
            .inflate(&compressed[pos..end], &mut buffer, FlushMode::None)
            .unwrap();
        pos += consumed;
        out.extend_from_slice(&buffer[..produced]);
        if status == DecompressStatus::NeedsInput && pos >= compressed.len() {
            break;
        }
    }

    assert_eq!(out, input);
}

/// `FlushMode::Block` surfaces block boundaries during decode.
#[test]
fn test_block_flush_reports_boundaries() {
    // Two blocks separated by a sync flush.
    let mut deflater = Deflater::new(6);
    let mut buffer = vec![0u8; 8192];
    let mut stream = Vec::new();
    let (_, n, _) = deflater
        .compress(b"first block ", &mut buffer, FlushMode::Sync)
        .unwrap();
    stream.extend_from_slice(&buffer[..n]);
    let (_, n, _) = deflater
        .compress(b"second block", &mut buffer, FlushMode::Finish)
        .unwrap();
    stream.extend_from_slice(&buffer[..n]);

    let mut inflater = Inflater::raw();
    let mut out = Vec::new();
    let mut pos = 0;
    let mut boundaries = 0;
    loop {
        let (consumed, produced, status) = inflater
            .inflate(&stream[pos..], &mut buffer, FlushMode::Block)
            .unwrap();
        pos += consumed;
        out.extend_from_slice(&buffer[..produced]);
        match status {
            DecompressStatus::BlockEnd => boundaries += 1,
            DecompressStatus::Done => break,
            DecompressStatus::NeedsInput if pos >= stream.len() => break,
            _ => {}
        }
    }

    assert!(boundaries >= 2, "expected block boundaries, saw {boundaries}");
    assert_eq!(out, b"first block second block");
}

/// Consumed counts are byte-exact at stream end: trailing bytes after
/// the stream are not consumed.
#[test]
fn test_exact_consumption_at_stream_end() {
    let compressed = deflate(b"exactness", 6).unwrap();
    let mut with_trailer = compressed.clone();
    with_trailer.extend_from_slice(b"TRAILING");

    let mut inflater = Inflater::raw();
    let mut buffer = vec![0u8; 256];
    let (consumed, produced, status) = inflater
        .inflate(&with_trailer, &mut buffer, FlushMode::None)
        .unwrap();
    assert_eq!(status, DecompressStatus::Done);
    assert_eq!(&buffer[..produced], b"exactness");
    assert_eq!(consumed, compressed.len(), "over-read bytes must be pushed back");
}

/// A reused decoder (reset between streams) behaves like a fresh one.
#[test]
fn test_reset_reuses_cleanly() {
    let a = deflate(b"first stream", 6).unwrap();
    let b = deflate(b"second stream, unrelated", 9).unwrap();

    let mut inflater = Inflater::raw();
    let mut buffer = vec![0u8; 256];

    let (_, n, status) = inflater.inflate(&a, &mut buffer, FlushMode::None).unwrap();
    assert_eq!(status, DecompressStatus::Done);
    assert_eq!(&buffer[..n], b"first stream");

    inflater.reset();
    let (_, n, status) = inflater.inflate(&b, &mut buffer, FlushMode::None).unwrap();
    assert_eq!(status, DecompressStatus::Done);
    assert_eq!(&buffer[..n], b"second stream, unrelated");
}
