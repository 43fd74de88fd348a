//! gzip container (RFC 1952).
//!
//! Single-member gzip framing over the raw DEFLATE engines: a header
//! with optional filename/comment/extra fields, the compressed data,
//! and a CRC-32 + ISIZE trailer. Multi-member concatenation is out of
//! scope; [`decompress`] reads the first member and ignores anything
//! after its trailer.

use crate::deflate::Deflater;
use crate::inflate::Inflater;
use ferroflate_core::checksum::Crc32;
use ferroflate_core::error::{CodecError, Result};
use ferroflate_core::traits::{DecompressStatus, FlushMode};
use std::time::{SystemTime, UNIX_EPOCH};

/// gzip magic bytes.
pub const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// gzip compression method: DEFLATE.
pub const CM_DEFLATE: u8 = 8;

/// gzip header flag bits.
pub mod flags {
    /// Probably-text hint.
    pub const FTEXT: u8 = 0x01;
    /// Header CRC present.
    pub const FHCRC: u8 = 0x02;
    /// Extra field present.
    pub const FEXTRA: u8 = 0x04;
    /// Original filename present.
    pub const FNAME: u8 = 0x08;
    /// Comment present.
    pub const FCOMMENT: u8 = 0x10;
}

/// gzip member header.
#[derive(Debug, Clone)]
pub struct GzipHeader {
    /// Compression method (8 = DEFLATE).
    pub method: u8,
    /// Flag bits.
    pub flags: u8,
    /// Modification time (Unix seconds, 0 = unknown).
    pub mtime: u32,
    /// Extra flags (2 = best compression, 4 = fastest).
    pub xfl: u8,
    /// Originating OS (255 = unknown).
    pub os: u8,
    /// Extra field payload (FEXTRA).
    pub extra: Option<Vec<u8>>,
    /// Original filename (FNAME).
    pub filename: Option<String>,
    /// Comment (FCOMMENT).
    pub comment: Option<String>,
}

impl Default for GzipHeader {
    fn default() -> Self {
        Self {
            method: CM_DEFLATE,
            flags: 0,
            mtime: 0,
            xfl: 0,
            os: 255,
            extra: None,
            filename: None,
            comment: None,
        }
    }
}

impl GzipHeader {
    /// A header with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// A header carrying the original filename.
    pub fn with_filename(filename: &str) -> Self {
        Self {
            flags: flags::FNAME,
            filename: Some(filename.to_string()),
            ..Self::default()
        }
    }

    /// Set the modification time to now.
    pub fn with_mtime_now(mut self) -> Self {
        self.mtime = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or(0);
        self
    }

    /// Serialize the header.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&GZIP_MAGIC);
        out.push(self.method);
        out.push(self.flags);
        out.extend_from_slice(&self.mtime.to_le_bytes());
        out.push(self.xfl);
        out.push(self.os);

        if self.flags & flags::FEXTRA != 0 {
            let extra = self.extra.as_deref().unwrap_or(&[]);
            out.extend_from_slice(&(extra.len() as u16).to_le_bytes());
            out.extend_from_slice(extra);
        }
        if self.flags & flags::FNAME != 0 {
            if let Some(name) = &self.filename {
                out.extend_from_slice(name.as_bytes());
                out.push(0);
            }
        }
        if self.flags & flags::FCOMMENT != 0 {
            if let Some(comment) = &self.comment {
                out.extend_from_slice(comment.as_bytes());
                out.push(0);
            }
        }
        // Header CRC16 over everything written so far would go here;
        // we never set FHCRC when writing.
    }

    /// Parse a header, returning it and the number of bytes consumed.
    pub fn parse(input: &[u8]) -> Result<(Self, usize)> {
        if input.len() < 10 {
            return Err(CodecError::malformed_header("gzip data too short"));
        }
        if input[0..2] != GZIP_MAGIC {
            return Err(CodecError::malformed_header("bad gzip magic"));
        }
        let method = input[2];
        if method != CM_DEFLATE {
            return Err(CodecError::malformed_header(format!(
                "unsupported gzip compression method {method}"
            )));
        }
        let hflags = input[3];
        if hflags & 0xE0 != 0 {
            return Err(CodecError::malformed_header("reserved gzip flag bits set"));
        }
        let mtime = u32::from_le_bytes([input[4], input[5], input[6], input[7]]);
        let xfl = input[8];
        let os = input[9];
        let mut pos = 10;

        let mut header = Self {
            method,
            flags: hflags,
            mtime,
            xfl,
            os,
            extra: None,
            filename: None,
            comment: None,
        };

        if hflags & flags::FEXTRA != 0 {
            if input.len() < pos + 2 {
                return Err(CodecError::malformed_header("truncated gzip extra field"));
            }
            let xlen = usize::from(u16::from_le_bytes([input[pos], input[pos + 1]]));
            pos += 2;
            if input.len() < pos + xlen {
                return Err(CodecError::malformed_header("truncated gzip extra field"));
            }
            header.extra = Some(input[pos..pos + xlen].to_vec());
            pos += xlen;
        }
        if hflags & flags::FNAME != 0 {
            let (value, next) = read_cstring(input, pos)?;
            header.filename = Some(value);
            pos = next;
        }
        if hflags & flags::FCOMMENT != 0 {
            let (value, next) = read_cstring(input, pos)?;
            header.comment = Some(value);
            pos = next;
        }
        if hflags & flags::FHCRC != 0 {
            if input.len() < pos + 2 {
                return Err(CodecError::malformed_header("truncated gzip header CRC"));
            }
            let stored = u16::from_le_bytes([input[pos], input[pos + 1]]);
            let computed = (Crc32::compute(&input[..pos]) & 0xFFFF) as u16;
            if stored != computed {
                return Err(CodecError::malformed_header("gzip header CRC mismatch"));
            }
            pos += 2;
        }

        Ok((header, pos))
    }
}

fn read_cstring(input: &[u8], start: usize) -> Result<(String, usize)> {
    let end = input[start..]
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| CodecError::malformed_header("unterminated gzip header string"))?;
    let value = String::from_utf8_lossy(&input[start..start + end]).into_owned();
    Ok((value, start + end + 1))
}

/// Compress data into a gzip member with a default header.
///
/// # Example
///
/// ```
/// use ferroflate_deflate::gzip;
///
/// let data = b"Hello, World!";
/// let compressed = gzip::compress(data, 6).unwrap();
/// let decompressed = gzip::decompress(&compressed).unwrap();
/// assert_eq!(decompressed, data);
/// ```
pub fn compress(data: &[u8], level: u8) -> Result<Vec<u8>> {
    compress_with_header(data, level, &GzipHeader::default())
}

/// Compress data into a gzip member with the given header.
pub fn compress_with_header(data: &[u8], level: u8, header: &GzipHeader) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() / 2 + 32);

    let mut header = header.clone();
    header.xfl = match level {
        9 => 2,
        1 => 4,
        _ => header.xfl,
    };
    header.write_to(&mut out);

    let compressed = Deflater::new(level).compress_to_vec(data)?;
    out.extend_from_slice(&compressed);

    out.extend_from_slice(&Crc32::compute(data).to_le_bytes());
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    Ok(out)
}

/// Decompress the first gzip member, verifying the trailer.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    decompress_with_header(data).map(|(_, out)| out)
}

/// Decompress the first gzip member, returning its header too.
pub fn decompress_with_header(data: &[u8]) -> Result<(GzipHeader, Vec<u8>)> {
    let (header, header_len) = GzipHeader::parse(data)?;

    // Stream the member; byte-exact consumption tells us where the
    // trailer starts.
    let mut inflater = Inflater::raw();
    let mut output = Vec::new();
    let mut buffer = vec![0u8; 32768];
    let mut pos = header_len;
    loop {
        let (consumed, produced, status) =
            inflater.inflate(&data[pos..], &mut buffer, FlushMode::None)?;
        pos += consumed;
        output.extend_from_slice(&buffer[..produced]);
        match status {
            DecompressStatus::Done => break,
            DecompressStatus::NeedsInput if pos >= data.len() => {
                return Err(CodecError::corrupt(pos as u64, "truncated gzip stream"));
            }
            _ => {}
        }
    }

    if data.len() < pos + 8 {
        return Err(CodecError::corrupt(pos as u64, "missing gzip trailer"));
    }
    let stored_crc = u32::from_le_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]]);
    let stored_isize = u32::from_le_bytes([
        data[pos + 4],
        data[pos + 5],
        data[pos + 6],
        data[pos + 7],
    ]);

    let computed_crc = Crc32::compute(&output);
    if stored_crc != computed_crc {
        return Err(CodecError::checksum_mismatch(stored_crc, computed_crc));
    }
    if stored_isize != output.len() as u32 {
        return Err(CodecError::corrupt(
            pos as u64 + 4,
            format!(
                "gzip size mismatch: trailer says {stored_isize}, got {}",
                output.len() as u32
            ),
        ));
    }

    Ok((header, output))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gzip_roundtrip() {
        let data = b"Hello, World! Hello, World!";
        let compressed = compress(data, 6).unwrap();
        assert_eq!(&compressed[0..2], &GZIP_MAGIC);
        assert_eq!(compressed[2], CM_DEFLATE);
        assert_eq!(decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn test_gzip_filename_header() {
        let header = GzipHeader::with_filename("test.txt");
        let compressed = compress_with_header(b"contents", 6, &header).unwrap();
        let (parsed, out) = decompress_with_header(&compressed).unwrap();
        assert_eq!(parsed.filename.as_deref(), Some("test.txt"));
        assert_eq!(out, b"contents");
    }

    #[test]
    fn test_gzip_trailer_crc_verified() {
        let mut compressed = compress(b"payload under test", 6).unwrap();
        let n = compressed.len();
        compressed[n - 5] ^= 0x01; // corrupt the stored CRC
        let err = decompress(&compressed).unwrap_err();
        assert!(matches!(err, CodecError::ChecksumMismatch { .. }));
    }

    #[test]
    fn test_gzip_isize_verified() {
        let mut compressed = compress(b"payload", 6).unwrap();
        let n = compressed.len();
        compressed[n - 1] ^= 0x01; // corrupt ISIZE
        let err = decompress(&compressed).unwrap_err();
        assert!(matches!(err, CodecError::StreamCorrupt { .. }));
    }

    #[test]
    fn test_gzip_bad_magic_rejected() {
        let err = decompress(&[0x50, 0x4B, 0x03, 0x04, 0, 0, 0, 0, 0, 0]).unwrap_err();
        assert!(matches!(err, CodecError::MalformedHeader { .. }));
    }

    #[test]
    fn test_gzip_trailing_bytes_ignored() {
        let mut compressed = compress(b"first member", 6).unwrap();
        compressed.extend_from_slice(b"junk after the member");
        assert_eq!(decompress(&compressed).unwrap(), b"first member");
    }

    #[test]
    fn test_gzip_empty_input() {
        let compressed = compress(b"", 6).unwrap();
        assert!(decompress(&compressed).unwrap().is_empty());
    }
}
