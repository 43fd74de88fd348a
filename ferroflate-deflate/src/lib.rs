//! # ferroflate-deflate
//!
//! Streaming DEFLATE (RFC 1951) codec with zlib (RFC 1950) and gzip
//! (RFC 1952) containers.
//!
//! ## Features
//!
//! - **Decompression**: a resumable state machine over all three block
//!   types (stored, fixed, dynamic), with a fast literal/length/
//!   distance loop, strict validation of untrusted input, preset
//!   dictionaries, and flush-marker resynchronization.
//! - **Compression**: hash-chain LZ77 match search with per-level
//!   effort tuning and lazy evaluation, per-block choice between
//!   stored, fixed, and dynamic Huffman tables, five strategies, and
//!   the full flush-mode set.
//! - **Containers**: zlib and gzip framing with checksum verification,
//!   plus chunked-parallel compression with checksum combining.
//!
//! ## Example
//!
//! ```rust
//! use ferroflate_deflate::{deflate, inflate};
//!
//! let original = b"Hello, World! Hello, World!";
//! let compressed = deflate(original, 6).unwrap();
//! let decompressed = inflate(&compressed).unwrap();
//! assert_eq!(&decompressed, original);
//! ```
//!
//! ## Streaming
//!
//! Both engines follow the same push/pull contract: supply an input
//! slice and an output slice, get back `(consumed, produced, status)`,
//! and call again when the status asks for more of either. State is
//! captured exactly between calls, so one-byte buffers decode the same
//! stream the same way a single large call does.
//!
//! ## Compression levels
//!
//! - Level 0: no compression (stored blocks)
//! - Levels 1-3: fast (greedy matching, shallow chains)
//! - Levels 4-6: balanced (lazy matching; 6 is the default)
//! - Levels 7-9: best (deep chains, slower)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod deflate;
pub mod gzip;
pub mod huffman;
pub mod inflate;
pub mod lz77;
pub mod parallel;
pub mod tables;
pub mod zlib;

// Re-exports
pub use deflate::{Deflater, deflate};
pub use huffman::{DecodeTable, HuffmanBuilder, TableKind};
pub use inflate::{Format, Inflater, inflate};
pub use lz77::{MatchFinder, Strategy, Token};
pub use parallel::{gzip_compress_parallel, zlib_compress_parallel};
pub use zlib::{
    zlib_compress, zlib_compress_with_dict, zlib_decompress, zlib_decompress_with_dict,
};
