//! zlib container (RFC 1950) one-shot helpers.
//!
//! The engines handle zlib framing natively ([`Deflater::zlib`],
//! [`Inflater::zlib`]); this module provides the convenience surface:
//! whole-buffer compress/decompress, the preset-dictionary variants,
//! and header inspection.
//!
//! # Format
//!
//! ```text
//! +---+---+=[DICTID]=+============+---+---+---+---+
//! |CMF|FLG|  4 bytes | compressed |    ADLER32    |
//! +---+---+==========+============+---+---+---+---+
//! ```
//!
//! - CMF: compression method (8 = DEFLATE) and log2(window) - 8
//! - FLG: check bits (so CMF·256+FLG ≡ 0 mod 31), FDICT, FLEVEL
//! - DICTID: Adler-32 of the preset dictionary, present iff FDICT
//! - ADLER32: checksum of the uncompressed data, big-endian

use crate::deflate::Deflater;
use crate::inflate::Inflater;
use ferroflate_core::error::{CodecError, Result};
use ferroflate_core::traits::{DecompressStatus, FlushMode};

/// Maximum preset dictionary size (32 KiB).
pub const MAX_DICTIONARY_SIZE: usize = 32768;

/// Compress data into the zlib format.
///
/// # Example
///
/// ```
/// use ferroflate_deflate::zlib::{zlib_compress, zlib_decompress};
///
/// let data = b"Hello, World! Hello, World!";
/// let compressed = zlib_compress(data, 6).unwrap();
/// let decompressed = zlib_decompress(&compressed).unwrap();
/// assert_eq!(decompressed, data);
/// ```
pub fn zlib_compress(input: &[u8], level: u8) -> Result<Vec<u8>> {
    Deflater::zlib(level).compress_to_vec(input)
}

/// Compress data into the zlib format with a preset dictionary.
///
/// The dictionary's Adler-32 is advertised in the header (FDICT), so
/// decompression requires the same dictionary.
///
/// # Example
///
/// ```
/// use ferroflate_deflate::zlib::{zlib_compress_with_dict, zlib_decompress_with_dict};
///
/// let dict = b"common patterns and shared content";
/// let data = b"data with common patterns and shared content in it";
/// let compressed = zlib_compress_with_dict(data, 6, dict).unwrap();
/// let decompressed = zlib_decompress_with_dict(&compressed, dict).unwrap();
/// assert_eq!(decompressed, data);
/// ```
pub fn zlib_compress_with_dict(input: &[u8], level: u8, dictionary: &[u8]) -> Result<Vec<u8>> {
    let mut deflater = Deflater::zlib(level);
    deflater.set_dictionary(dictionary)?;
    deflater.compress_to_vec(input)
}

/// Decompress zlib data. Streams that advertise a preset dictionary
/// fail with [`CodecError::DictionaryRequired`] carrying the expected
/// dictionary checksum; use [`zlib_decompress_with_dict`] instead.
pub fn zlib_decompress(input: &[u8]) -> Result<Vec<u8>> {
    if let Some(checksum) = zlib_requires_dictionary(input)? {
        return Err(CodecError::dictionary_required(checksum));
    }
    drive(Inflater::zlib(), input, None)
}

/// Decompress zlib data, supplying `dictionary` if the stream asks for
/// one. The dictionary's Adler-32 must match the header's DICTID.
pub fn zlib_decompress_with_dict(input: &[u8], dictionary: &[u8]) -> Result<Vec<u8>> {
    drive(Inflater::zlib(), input, Some(dictionary))
}

/// Whether zlib data requires a preset dictionary, and if so the
/// Adler-32 of the dictionary it expects.
pub fn zlib_requires_dictionary(input: &[u8]) -> Result<Option<u32>> {
    if input.len() < 2 {
        return Err(CodecError::malformed_header("zlib data too short"));
    }
    let cmf = input[0];
    let flg = input[1];
    if cmf & 0x0F != 8 {
        return Err(CodecError::malformed_header("unknown compression method"));
    }
    if (u16::from(cmf) * 256 + u16::from(flg)) % 31 != 0 {
        return Err(CodecError::malformed_header("incorrect header check"));
    }
    if flg & 0x20 == 0 {
        return Ok(None);
    }
    if input.len() < 6 {
        return Err(CodecError::malformed_header(
            "zlib data with dictionary too short",
        ));
    }
    Ok(Some(u32::from_be_bytes([
        input[2], input[3], input[4], input[5],
    ])))
}

/// Drive a decoder over a whole buffer, answering at most one
/// dictionary request.
fn drive(mut inflater: Inflater, input: &[u8], dictionary: Option<&[u8]>) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    let mut buffer = vec![0u8; 32768];
    let mut pos = 0;

    loop {
        let (consumed, produced, status) =
            inflater.inflate(&input[pos..], &mut buffer, FlushMode::None)?;
        pos += consumed;
        output.extend_from_slice(&buffer[..produced]);

        match status {
            DecompressStatus::Done => return Ok(output),
            DecompressStatus::NeedsDictionary => match dictionary {
                Some(dict) => {
                    inflater.set_dictionary(dict)?;
                }
                None => {
                    return Err(CodecError::dictionary_required(
                        inflater.dictionary_required().unwrap_or(0),
                    ));
                }
            },
            DecompressStatus::NeedsInput if pos >= input.len() => {
                return Err(CodecError::corrupt(pos as u64, "truncated zlib stream"));
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zlib_roundtrip() {
        let data = b"Hello, World! Hello, World!";
        let compressed = zlib_compress(data, 6).unwrap();
        // CMF: method 8, 32K window.
        assert_eq!(compressed[0], 0x78);
        assert_eq!(zlib_decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn test_zlib_header_check_valid() {
        for level in [0u8, 1, 6, 9] {
            let compressed = zlib_compress(b"x", level).unwrap();
            let check = u16::from(compressed[0]) * 256 + u16::from(compressed[1]);
            assert_eq!(check % 31, 0, "level {level}");
        }
    }

    #[test]
    fn test_zlib_trailer_checksum_verified() {
        let mut compressed = zlib_compress(b"checksummed payload", 6).unwrap();
        // Corrupt the trailer.
        let last = compressed.len() - 1;
        compressed[last] ^= 0xFF;
        let err = zlib_decompress(&compressed).unwrap_err();
        assert!(matches!(err, CodecError::ChecksumMismatch { .. }));
    }

    #[test]
    fn test_zlib_bad_method_rejected() {
        let err = zlib_decompress(&[0x79, 0x9C, 0x00]).unwrap_err();
        assert!(matches!(err, CodecError::MalformedHeader { .. }));
    }

    #[test]
    fn test_dictionary_roundtrip() {
        let dict = b"hello";
        let data = b"hello, hello!";
        let compressed = zlib_compress_with_dict(data, 6, dict).unwrap();
        assert_eq!(
            zlib_decompress_with_dict(&compressed, dict).unwrap(),
            data
        );
    }

    #[test]
    fn test_dictionary_required_without_dict() {
        let dict = b"hello";
        let compressed = zlib_compress_with_dict(b"hello, hello!", 6, dict).unwrap();
        let err = zlib_decompress(&compressed).unwrap_err();
        match err {
            CodecError::DictionaryRequired { checksum } => {
                assert_eq!(checksum, ferroflate_core::Adler32::compute(dict));
            }
            other => panic!("expected DictionaryRequired, got {other:?}"),
        }
    }

    #[test]
    fn test_wrong_dictionary_rejected() {
        let compressed = zlib_compress_with_dict(b"hello, hello!", 6, b"hello").unwrap();
        let err = zlib_decompress_with_dict(&compressed, b"goodbye").unwrap_err();
        assert!(matches!(err, CodecError::ChecksumMismatch { .. }));
    }

    #[test]
    fn test_requires_dictionary_probe() {
        let plain = zlib_compress(b"data", 6).unwrap();
        assert_eq!(zlib_requires_dictionary(&plain).unwrap(), None);

        let with_dict = zlib_compress_with_dict(b"data", 6, b"dict").unwrap();
        assert!(zlib_requires_dictionary(&with_dict).unwrap().is_some());
    }
}
