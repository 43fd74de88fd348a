//! Error types for ferroflate operations.
//!
//! Every failure the codec can detect maps to one variant of
//! [`CodecError`], carrying enough context to produce a human-readable
//! message alongside the typed code. Buffer exhaustion is *not* an
//! error: the streaming calls report it through their status value and
//! the caller retries with more input or output space.

use std::io;
use thiserror::Error;

/// The main error type for ferroflate operations.
#[derive(Debug, Error)]
pub enum CodecError {
    /// I/O error from an underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed stream header (bad magic, method, or reserved bits).
    #[error("Malformed header: {message}")]
    MalformedHeader {
        /// Description of the header error.
        message: String,
    },

    /// A code-length sequence that does not describe a valid prefix code.
    #[error("Bad Huffman table: {message}")]
    BadHuffmanTable {
        /// Description of the invalid length sequence.
        message: String,
    },

    /// A decoded symbol outside the valid range at the current position.
    #[error("Invalid code at bit position {bit_position}")]
    InvalidCode {
        /// Bit position where the invalid code was found.
        bit_position: u64,
    },

    /// Back-reference distance exceeds the available history.
    #[error("Invalid back-reference distance: {distance} exceeds available history {available}")]
    DistanceTooFar {
        /// The offending distance value.
        distance: usize,
        /// Bytes of history actually available.
        available: usize,
    },

    /// Trailer check value disagrees with the running checksum.
    #[error("Checksum mismatch: expected {expected:#010x}, computed {computed:#010x}")]
    ChecksumMismatch {
        /// Check value stored in the stream trailer.
        expected: u32,
        /// Check value computed over the processed data.
        computed: u32,
    },

    /// The stream was compressed with a preset dictionary that has not
    /// been supplied yet.
    #[error("Preset dictionary required (Adler-32 {checksum:#010x})")]
    DictionaryRequired {
        /// Adler-32 of the dictionary the stream expects.
        checksum: u32,
    },

    /// Corrupted stream data outside the header/table/code categories.
    #[error("Corrupted stream at offset {offset}: {message}")]
    StreamCorrupt {
        /// Approximate byte offset where corruption was detected.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },
}

/// Result type alias for ferroflate operations.
pub type Result<T> = std::result::Result<T, CodecError>;

impl CodecError {
    /// Create a malformed header error.
    pub fn malformed_header(message: impl Into<String>) -> Self {
        Self::MalformedHeader {
            message: message.into(),
        }
    }

    /// Create a bad Huffman table error.
    pub fn bad_table(message: impl Into<String>) -> Self {
        Self::BadHuffmanTable {
            message: message.into(),
        }
    }

    /// Create an invalid code error.
    pub fn invalid_code(bit_position: u64) -> Self {
        Self::InvalidCode { bit_position }
    }

    /// Create a distance-too-far error.
    pub fn distance_too_far(distance: usize, available: usize) -> Self {
        Self::DistanceTooFar {
            distance,
            available,
        }
    }

    /// Create a checksum mismatch error.
    pub fn checksum_mismatch(expected: u32, computed: u32) -> Self {
        Self::ChecksumMismatch { expected, computed }
    }

    /// Create a dictionary-required error.
    pub fn dictionary_required(checksum: u32) -> Self {
        Self::DictionaryRequired { checksum }
    }

    /// Create a corrupted stream error.
    pub fn corrupt(offset: u64, message: impl Into<String>) -> Self {
        Self::StreamCorrupt {
            offset,
            message: message.into(),
        }
    }

    /// Whether this error is a data error (as opposed to an I/O error).
    ///
    /// Data errors are terminal: the engine that reported one stays in
    /// its error state and repeats it on every subsequent call.
    pub fn is_data_error(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CodecError::malformed_header("reserved block type 3");
        assert!(err.to_string().contains("reserved block type 3"));

        let err = CodecError::checksum_mismatch(0x12345678, 0xDEADBEEF);
        assert!(err.to_string().contains("0x12345678"));

        let err = CodecError::distance_too_far(30000, 12);
        assert!(err.to_string().contains("30000"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: CodecError = io_err.into();
        assert!(matches!(err, CodecError::Io(_)));
        assert!(!err.is_data_error());
    }

    #[test]
    fn test_data_error_classification() {
        assert!(CodecError::bad_table("oversubscribed").is_data_error());
        assert!(CodecError::invalid_code(17).is_data_error());
    }
}
