//! # ferroflate-core
//!
//! Core components for the ferroflate codec.
//!
//! This crate provides the leaf primitives the DEFLATE engines are
//! built from:
//!
//! - [`bitstream`]: resumable LSB-first bit I/O with persisted state
//! - [`window`]: the sliding window of recently produced bytes
//! - [`checksum`]: CRC-32 and Adler-32 check functions with `combine`
//! - [`traits`]: the streaming call contract (flush modes, statuses)
//! - [`config`]: one-time environment-derived tuning
//! - [`error`]: error types
//!
//! ## Architecture
//!
//! ferroflate is a layered stack:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L3: CLI                                                 │
//! │     gzip-style command-line tool                        │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Containers                                          │
//! │     zlib (RFC 1950), gzip (RFC 1952) framing            │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Codec                                               │
//! │     DEFLATE (RFC 1951): Inflater, Deflater, Huffman     │
//! ├─────────────────────────────────────────────────────────┤
//! │ L0: Primitives (this crate)                             │
//! │     BitReader/BitWriter, SlidingWindow, checksums       │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use ferroflate_core::bitstream::{BitReader, BitWriter};
//! use ferroflate_core::checksum::Crc32;
//!
//! let mut w = BitWriter::new();
//! w.push(0b101, 3);
//! w.align();
//! let bytes = w.split_bytes();
//!
//! let mut pos = 0;
//! let mut r = BitReader::new();
//! assert!(r.need(3, &bytes, &mut pos));
//! assert_eq!(r.take(3), 0b101);
//!
//! assert_eq!(Crc32::compute(b"123456789"), 0xCBF43926);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod checksum;
pub mod config;
pub mod error;
pub mod traits;
pub mod window;

// Re-exports for convenience
pub use bitstream::{BitReader, BitWriter};
pub use checksum::{Adler32, Check, Crc32, adler32_combine, crc32_combine};
pub use config::Tuning;
pub use error::{CodecError, Result};
pub use traits::{
    CompressStatus, CompressionLevel, Compressor, DecompressStatus, Decompressor, FlushMode,
};
pub use window::SlidingWindow;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitstream::{BitReader, BitWriter};
    pub use crate::checksum::{Adler32, Check, Crc32};
    pub use crate::error::{CodecError, Result};
    pub use crate::traits::{
        CompressStatus, CompressionLevel, Compressor, DecompressStatus, Decompressor, FlushMode,
    };
    pub use crate::window::SlidingWindow;
}
