//! Streaming traits shared by the compression engines.
//!
//! Both engines follow the same call contract: the caller supplies an
//! input slice and an output slice, the engine consumes and produces as
//! much as those buffers allow, and the call returns `(bytes consumed,
//! bytes produced, status)`. A call never blocks; suspension is the
//! status value, and the caller resumes by calling again with more
//! input or fresh output space. Running out of buffer is not an error.

use crate::error::Result;

/// Status of a streaming decompression call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecompressStatus {
    /// More input is needed to continue.
    NeedsInput,
    /// More output buffer space is needed.
    NeedsOutput,
    /// The stream was compressed with a preset dictionary; supply it
    /// and call again. No output is produced before this is resolved.
    NeedsDictionary,
    /// A block boundary was reached (only reported under
    /// [`FlushMode::Block`]); more blocks follow.
    BlockEnd,
    /// The final block and any trailer have been consumed and verified.
    Done,
}

/// Status of a streaming compression call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressStatus {
    /// All supplied input was absorbed; more can be accepted.
    NeedsInput,
    /// Pending output did not fit; supply more output space.
    NeedsOutput,
    /// The stream is finished and fully drained.
    Done,
}

/// How eagerly pending output is forced out, and whether history is
/// reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlushMode {
    /// Buffer freely for best compression.
    #[default]
    None,
    /// Force pending output out with an empty fixed block; cheaper than
    /// a sync flush but the boundary is not byte-aligned.
    Partial,
    /// Emit pending output and an empty stored block, leaving the
    /// stream byte-aligned at a resynchronization marker.
    Sync,
    /// As [`Sync`](Self::Sync), then clear history so the next block
    /// is independent of everything before the flush.
    Full,
    /// Complete the stream.
    Finish,
    /// Stop at the next block boundary without forcing alignment
    /// (decode: report [`DecompressStatus::BlockEnd`]).
    Block,
}

/// A streaming decompressor.
pub trait Decompressor {
    /// Decompress from `input` into `output`.
    ///
    /// Returns `(bytes consumed, bytes produced, status)`. After a data
    /// error the engine is terminal: every subsequent call returns the
    /// same error.
    fn decompress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> Result<(usize, usize, DecompressStatus)>;

    /// Reset to the initial state, ready for a new stream.
    fn reset(&mut self);

    /// Whether the stream has been fully decoded.
    fn is_finished(&self) -> bool;

    /// Decompress an entire in-memory stream (convenience driver).
    fn decompress_all(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        let mut buffer = vec![0u8; 32768];
        let mut input_pos = 0;

        loop {
            let (consumed, produced, status) =
                self.decompress(&input[input_pos..], &mut buffer, FlushMode::None)?;
            input_pos += consumed;
            output.extend_from_slice(&buffer[..produced]);

            match status {
                DecompressStatus::Done => break,
                DecompressStatus::NeedsInput if input_pos >= input.len() => break,
                DecompressStatus::NeedsDictionary => {
                    return Err(crate::error::CodecError::dictionary_required(0));
                }
                _ => continue,
            }
        }

        Ok(output)
    }
}

/// A streaming compressor.
pub trait Compressor {
    /// Compress from `input` into `output` under the given flush mode.
    ///
    /// Returns `(bytes consumed, bytes produced, status)`.
    fn compress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> Result<(usize, usize, CompressStatus)>;

    /// Reset to the initial state, ready for a new stream.
    fn reset(&mut self);

    /// Whether the stream has been finished.
    fn is_finished(&self) -> bool;

    /// Compress an entire in-memory buffer (convenience driver).
    fn compress_all(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        let mut buffer = vec![0u8; 32768];
        let mut input_pos = 0;

        loop {
            let flush = if input_pos >= input.len() {
                FlushMode::Finish
            } else {
                FlushMode::None
            };
            let (consumed, produced, status) =
                self.compress(&input[input_pos..], &mut buffer, flush)?;
            input_pos += consumed;
            output.extend_from_slice(&buffer[..produced]);

            if status == CompressStatus::Done {
                break;
            }
        }

        Ok(output)
    }
}

/// Compression level (0 = store, 9 = best).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionLevel(u8);

impl CompressionLevel {
    /// No compression (stored blocks only).
    pub const NONE: Self = Self(0);
    /// Fastest compression.
    pub const FAST: Self = Self(1);
    /// Default compression (balanced).
    pub const DEFAULT: Self = Self(6);
    /// Best compression (slowest).
    pub const BEST: Self = Self(9);

    /// Create a level, clamped to 0-9.
    pub fn new(level: u8) -> Self {
        Self(level.min(9))
    }

    /// The level value.
    pub fn level(&self) -> u8 {
        self.0
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<u8> for CompressionLevel {
    fn from(level: u8) -> Self {
        Self::new(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_level_clamps() {
        assert_eq!(CompressionLevel::new(100).level(), 9);
        assert_eq!(CompressionLevel::DEFAULT.level(), 6);
    }

    #[test]
    fn test_flush_mode_default() {
        assert_eq!(FlushMode::default(), FlushMode::None);
    }
}
