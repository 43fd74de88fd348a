//! Chunked-parallel compression.
//!
//! Splits the input into chunks and compresses each on its own engine
//! instance, seeding every chunk's window with the trailing 32 KiB of
//! the previous chunk so cross-chunk references keep working. Each
//! chunk ends at a sync-flush byte boundary (the last one with the
//! final block), so the outputs concatenate into one valid stream; the
//! container checksum is folded together algebraically with `combine`,
//! never touching the input again.
//!
//! This is safe precisely because each chunk's encoding is a pure
//! function of (chunk bytes, seeded dictionary): no mutable state is
//! shared between workers, and the checksum combine is associative by
//! construction.

use crate::deflate::Deflater;
use ferroflate_core::checksum::{Adler32, Crc32, adler32_combine, crc32_combine};
use ferroflate_core::error::Result;
use ferroflate_core::traits::{CompressStatus, FlushMode};
use ferroflate_core::window::DEFLATE_WINDOW_SIZE;
use rayon::prelude::*;

/// Default chunk size (128 KiB): large enough that the per-chunk ratio
/// loss is small, small enough to spread across cores.
pub const DEFAULT_CHUNK_SIZE: usize = 128 * 1024;

/// Compress one chunk as a raw DEFLATE fragment: dictionary-seeded,
/// sync-flushed (or finished, for the last chunk).
fn deflate_chunk(chunk: &[u8], dict: Option<&[u8]>, level: u8, last: bool) -> Result<Vec<u8>> {
    let mut deflater = Deflater::new(level);
    if let Some(dict) = dict {
        deflater.set_dictionary(dict)?;
    }

    let mut out = Vec::with_capacity(chunk.len() / 2 + 64);
    let mut buffer = vec![0u8; 65536];
    let mut fed = false;
    loop {
        let input: &[u8] = if fed { &[] } else { chunk };
        let flush = if fed {
            FlushMode::None
        } else if last {
            FlushMode::Finish
        } else {
            FlushMode::Sync
        };
        let (_, produced, status) = deflater.compress(input, &mut buffer, flush)?;
        fed = true;
        out.extend_from_slice(&buffer[..produced]);
        if status != CompressStatus::NeedsOutput {
            break;
        }
    }
    Ok(out)
}

/// The trailing window of a chunk, used to seed its successor.
fn tail_window(chunk: &[u8]) -> &[u8] {
    &chunk[chunk.len().saturating_sub(DEFLATE_WINDOW_SIZE)..]
}

/// Compress into the zlib format using parallel chunks, combining the
/// per-chunk Adler-32 values into the trailer.
pub fn zlib_compress_parallel(input: &[u8], level: u8, chunk_size: usize) -> Result<Vec<u8>> {
    let chunk_size = chunk_size.max(DEFLATE_WINDOW_SIZE);
    if input.len() <= chunk_size {
        return crate::zlib::zlib_compress(input, level);
    }

    let chunks: Vec<&[u8]> = input.chunks(chunk_size).collect();
    let count = chunks.len();

    let results: Vec<(Vec<u8>, u32)> = chunks
        .par_iter()
        .enumerate()
        .map(|(i, chunk)| {
            let dict = (i > 0).then(|| tail_window(chunks[i - 1]));
            let body = deflate_chunk(chunk, dict, level, i + 1 == count)?;
            Ok((body, Adler32::compute(chunk)))
        })
        .collect::<Result<_>>()?;

    // zlib header: method 8, 32 KiB window, default-level hint.
    let mut out = Vec::with_capacity(input.len() / 2 + 64);
    let cmf: u8 = 0x78;
    let flg_base: u8 = 2 << 6;
    let fcheck = (31 - (u16::from(cmf) * 256 + u16::from(flg_base)) % 31) % 31;
    out.push(cmf);
    out.push(flg_base | fcheck as u8);

    let mut adler = 1u32; // Adler-32 of the empty prefix
    let mut offset = 0usize;
    for ((body, chunk_sum), chunk) in results.iter().zip(&chunks) {
        out.extend_from_slice(body);
        adler = adler32_combine(adler, *chunk_sum, chunk.len() as u64);
        offset += chunk.len();
    }
    debug_assert_eq!(offset, input.len());

    out.extend_from_slice(&adler.to_be_bytes());
    Ok(out)
}

/// Compress into the gzip format using parallel chunks, combining the
/// per-chunk CRC-32 values into the trailer.
pub fn gzip_compress_parallel(input: &[u8], level: u8, chunk_size: usize) -> Result<Vec<u8>> {
    let chunk_size = chunk_size.max(DEFLATE_WINDOW_SIZE);
    if input.len() <= chunk_size {
        return crate::gzip::compress(input, level);
    }

    let chunks: Vec<&[u8]> = input.chunks(chunk_size).collect();
    let count = chunks.len();

    let results: Vec<(Vec<u8>, u32)> = chunks
        .par_iter()
        .enumerate()
        .map(|(i, chunk)| {
            let dict = (i > 0).then(|| tail_window(chunks[i - 1]));
            let body = deflate_chunk(chunk, dict, level, i + 1 == count)?;
            Ok((body, Crc32::compute(chunk)))
        })
        .collect::<Result<_>>()?;

    let mut out = Vec::with_capacity(input.len() / 2 + 64);
    crate::gzip::GzipHeader::default().write_to(&mut out);

    let mut crc = 0u32; // CRC-32 of the empty prefix
    for ((body, chunk_crc), chunk) in results.iter().zip(&chunks) {
        out.extend_from_slice(body);
        crc = crc32_combine(crc, *chunk_crc, chunk.len() as u64);
    }

    out.extend_from_slice(&crc.to_le_bytes());
    out.extend_from_slice(&(input.len() as u32).to_le_bytes());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{gzip, zlib};

    fn sample(len: usize) -> Vec<u8> {
        // Compressible but position-dependent, so cross-chunk
        // references matter.
        (0..len)
            .map(|i| ((i / 7) % 251) as u8 ^ (i % 13) as u8)
            .collect()
    }

    #[test]
    fn test_parallel_zlib_roundtrip() {
        let input = sample(500_000);
        let compressed = zlib_compress_parallel(&input, 6, DEFAULT_CHUNK_SIZE).unwrap();
        assert_eq!(zlib::zlib_decompress(&compressed).unwrap(), input);
    }

    #[test]
    fn test_parallel_gzip_roundtrip() {
        let input = sample(400_000);
        let compressed = gzip_compress_parallel(&input, 6, DEFAULT_CHUNK_SIZE).unwrap();
        assert_eq!(gzip::decompress(&compressed).unwrap(), input);
    }

    #[test]
    fn test_parallel_small_input_falls_back() {
        let input = b"small enough for one chunk";
        let compressed = zlib_compress_parallel(input, 6, DEFAULT_CHUNK_SIZE).unwrap();
        assert_eq!(zlib::zlib_decompress(&compressed).unwrap(), input);
    }

    #[test]
    fn test_combined_checksum_matches_direct() {
        let input = sample(300_000);
        let compressed = zlib_compress_parallel(&input, 6, 65536).unwrap();
        let n = compressed.len();
        let trailer = u32::from_be_bytes([
            compressed[n - 4],
            compressed[n - 3],
            compressed[n - 2],
            compressed[n - 1],
        ]);
        assert_eq!(trailer, Adler32::compute(&input));
    }
}
