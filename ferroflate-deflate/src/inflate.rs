//! DEFLATE decompression (inflate).
//!
//! [`Inflater`] is a resumable state machine over RFC 1951 bitstreams,
//! optionally wrapped in the zlib (RFC 1950) container. Each call to
//! [`Inflater::inflate`] consumes as much input and produces as much
//! output as the caller's buffers allow, then returns control with a
//! status; all partial state, down to bits consumed beyond whole bytes
//! and half-decoded symbols, lives in the engine so the next call
//! resumes bit-for-bit where the last one stopped.
//!
//! Decoding runs in one of two gears. The slow path advances one
//! symbol-granular mode at a time with full bounds checks and can
//! suspend anywhere. The fast path takes over while at least 8 input
//! bytes and 260 output bytes remain: it keeps the bit register topped
//! up with 64-bit loads and decodes literal/length/distance chains
//! without intermediate checks, falling back to the slow path when the
//! margins run out.
//!
//! After any data error the engine is terminal: every subsequent call
//! repeats the same error. The only escapes are [`Inflater::reset`] and
//! [`Inflater::sync`], which scans forward for an empty-stored-block
//! flush marker and restarts decoding from it.

use crate::huffman::{DecodeTable, Op, TableKind};
use crate::tables::{CODE_LENGTH_ORDER, fixed_distance_table, fixed_litlen_table};
use ferroflate_core::bitstream::BitReader;
use ferroflate_core::checksum::{Adler32, Check};
use ferroflate_core::config::Tuning;
use ferroflate_core::error::{CodecError, Result};
use ferroflate_core::traits::{DecompressStatus, Decompressor, FlushMode};
use ferroflate_core::window::SlidingWindow;

/// Maximum dictionary / window size for DEFLATE (32 KiB).
pub const MAX_DICTIONARY_SIZE: usize = 32768;

/// Minimum output space for a fast-path iteration (one maximum-length
/// match plus slack).
const FAST_OUT_MARGIN: usize = 260;

/// Minimum input bytes for a fast-path iteration (a full length/
/// distance pair needs at most 48 bits).
const FAST_IN_MARGIN: usize = 8;

/// Stream framing around the raw DEFLATE data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Raw DEFLATE, no header or trailer.
    Raw,
    /// zlib: 2-byte header, optional dictionary id, Adler-32 trailer.
    Zlib,
}

/// Decoder phase. Payload-carrying variants capture exactly the state
/// needed to resume mid-structure; larger scratch buffers (the code
/// length arrays) live on the engine itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Expecting the zlib CMF/FLG header pair.
    Header,
    /// Expecting the 4-byte dictionary id (FDICT was set).
    DictId,
    /// Waiting for the caller to supply the preset dictionary.
    DictWait,
    /// Expecting a block header (final flag + type).
    BlockHead,
    /// Expecting a stored block's LEN/NLEN.
    StoredLen,
    /// Copying a stored block's payload.
    Stored { remaining: u16 },
    /// Expecting HLIT/HDIST/HCLEN of a dynamic block.
    TableSizes,
    /// Reading 3-bit code-length-code lengths.
    CodeLenCodes { have: usize },
    /// Reading the RLE-compressed literal/length + distance lengths.
    CodeLens { have: usize },
    /// Expecting a literal/length symbol.
    Len,
    /// Expecting the extra bits of a length code.
    LenExt { base: u16, extra: u8 },
    /// Expecting a distance symbol.
    Dist { length: u16 },
    /// Expecting the extra bits of a distance code.
    DistExt { length: u16, base: u16, extra: u8 },
    /// Copying a match, possibly across calls.
    Match { length: u16, distance: u16 },
    /// Expecting the stream trailer (zlib Adler-32).
    Trailer,
    /// Stream fully decoded.
    Done,
    /// Terminal error state.
    Bad,
}

/// DEFLATE decompressor.
#[derive(Debug)]
pub struct Inflater {
    mode: Mode,
    bits: BitReader,
    window: SlidingWindow,
    /// Dynamic tables for the current block; `None` while a fixed block
    /// (or no block) is active.
    litlen: Option<DecodeTable>,
    dist: Option<DecodeTable>,
    use_fixed: bool,
    format: Format,
    check: Check,
    /// Expected dictionary Adler-32 once FDICT has been seen.
    dict_id: Option<u32>,
    /// Opt-in zero-fill tolerance for over-far distances.
    tolerant: bool,
    fast_path: bool,
    last_block: bool,
    total_in: u64,
    total_out: u64,
    /// Dynamic header scratch.
    nlen: usize,
    ndist: usize,
    ncode: usize,
    cl_lens: [u8; 19],
    lens: Vec<u8>,
    cl_table: Option<DecodeTable>,
    saved_error: Option<CodecError>,
    /// Sync-marker scan progress across calls.
    sync_have: u8,
}

impl Inflater {
    /// Create a decoder for a raw DEFLATE stream (no header, no
    /// trailer, no checksum).
    pub fn new() -> Self {
        Self::with_format(Format::Raw, Tuning::new())
    }

    /// Create a decoder for a raw DEFLATE stream. Alias of
    /// [`new`](Self::new), kept for symmetry with [`zlib`](Self::zlib).
    pub fn raw() -> Self {
        Self::new()
    }

    /// Create a decoder for a zlib-wrapped stream (RFC 1950 header,
    /// Adler-32 trailer, dictionary negotiation).
    pub fn zlib() -> Self {
        Self::with_format(Format::Zlib, Tuning::new())
    }

    /// Create a decoder with explicit framing and tuning.
    pub fn with_format(format: Format, tuning: Tuning) -> Self {
        Self {
            mode: match format {
                Format::Raw => Mode::BlockHead,
                Format::Zlib => Mode::Header,
            },
            bits: BitReader::new(),
            window: SlidingWindow::deflate(),
            litlen: None,
            dist: None,
            use_fixed: false,
            format,
            check: Check::None,
            dict_id: None,
            tolerant: false,
            fast_path: !tuning.disable_fast_path,
            last_block: false,
            total_in: 0,
            total_out: 0,
            nlen: 0,
            ndist: 0,
            ncode: 0,
            cl_lens: [0; 19],
            lens: Vec::new(),
            cl_table: None,
            saved_error: None,
            sync_have: 0,
        }
    }

    /// Enable the legacy zero-fill tolerance: a back-reference past the
    /// start of history fills with zero bytes instead of failing. Never
    /// the default; exists only for compatibility with streams that
    /// relied on it.
    pub fn allow_invalid_distance(mut self) -> Self {
        self.tolerant = true;
        self
    }

    /// Create a raw decoder primed with a dictionary.
    pub fn with_dictionary(dictionary: &[u8]) -> Self {
        let mut inflater = Self::raw();
        inflater
            .set_dictionary(dictionary)
            .expect("priming a fresh raw decoder cannot fail");
        inflater
    }

    /// Total compressed bytes consumed.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Total decompressed bytes produced.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    /// The dictionary Adler-32 the stream expects, if decoding stopped
    /// at a dictionary request.
    pub fn dictionary_required(&self) -> Option<u32> {
        (self.mode == Mode::DictWait).then(|| self.dict_id.unwrap_or(0))
    }

    /// Supply the preset dictionary.
    ///
    /// Valid before any compressed data has been decoded (raw streams)
    /// or when the engine has reported
    /// [`CodecError::DictionaryRequired`] (zlib streams, where the
    /// dictionary's Adler-32 must match the id in the stream). Returns
    /// the dictionary's Adler-32.
    pub fn set_dictionary(&mut self, dictionary: &[u8]) -> Result<u32> {
        let sum = Adler32::compute(dictionary);
        match self.mode {
            Mode::DictWait => {
                let expected = self.dict_id.unwrap_or(0);
                if sum != expected {
                    return Err(CodecError::checksum_mismatch(expected, sum));
                }
                self.window.preload(dictionary);
                self.mode = Mode::BlockHead;
                Ok(sum)
            }
            Mode::BlockHead if self.total_out == 0 && !self.last_block => {
                self.window.preload(dictionary);
                self.dict_id = Some(sum);
                Ok(sum)
            }
            _ => Err(CodecError::corrupt(
                self.total_in,
                "dictionary may only be set before decompression begins",
            )),
        }
    }

    /// Reset to the initial state for a fresh stream, keeping the
    /// allocated window and configuration.
    pub fn reset(&mut self) {
        self.mode = match self.format {
            Format::Raw => Mode::BlockHead,
            Format::Zlib => Mode::Header,
        };
        self.bits.clear();
        self.window.clear();
        self.litlen = None;
        self.dist = None;
        self.use_fixed = false;
        self.check = Check::None;
        self.dict_id = None;
        self.last_block = false;
        self.total_in = 0;
        self.total_out = 0;
        self.cl_table = None;
        self.saved_error = None;
        self.sync_have = 0;
    }

    /// Whether the stream has been fully decoded.
    pub fn is_finished(&self) -> bool {
        self.mode == Mode::Done
    }

    fn fail(&mut self, err: CodecError) -> CodecError {
        self.mode = Mode::Bad;
        self.saved_error = Some(clone_data_error(&err));
        err
    }

    fn bit_position(&self, pos: usize) -> u64 {
        (self.total_in + pos as u64) * 8 - u64::from(self.bits.bit_count())
    }

    /// Decompress from `input` into `output`.
    ///
    /// Returns `(bytes consumed, bytes produced, status)`. Under
    /// [`FlushMode::Block`] the call additionally stops at every block
    /// boundary with [`DecompressStatus::BlockEnd`].
    pub fn inflate(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> Result<(usize, usize, DecompressStatus)> {
        if let Some(saved) = &self.saved_error {
            return Err(clone_data_error(saved));
        }

        let mut pos = 0usize;
        let mut out_pos = 0usize;
        // Bytes of `output` already folded into the window/checksum
        // (needed when the trailer is verified mid-call).
        let mut committed = 0usize;

        let status = 'run: loop {
            match self.mode {
                Mode::Header => {
                    if !self.bits.need(16, input, &mut pos) {
                        break 'run DecompressStatus::NeedsInput;
                    }
                    let header = self.bits.take(16);
                    let cmf = header & 0xFF;
                    let flg = header >> 8;
                    if cmf & 0x0F != 8 {
                        return Err(self.fail(CodecError::malformed_header(
                            "unknown compression method",
                        )));
                    }
                    if cmf >> 4 > 7 {
                        return Err(
                            self.fail(CodecError::malformed_header("invalid window size"))
                        );
                    }
                    if (cmf * 256 + flg) % 31 != 0 {
                        return Err(
                            self.fail(CodecError::malformed_header("incorrect header check"))
                        );
                    }
                    self.check = Check::adler();
                    self.mode = if flg & 0x20 != 0 {
                        Mode::DictId
                    } else {
                        Mode::BlockHead
                    };
                }

                Mode::DictId => {
                    if !self.bits.need(32, input, &mut pos) {
                        break 'run DecompressStatus::NeedsInput;
                    }
                    // The id is stored big-endian.
                    self.dict_id = Some(self.bits.take(32).swap_bytes());
                    self.mode = Mode::DictWait;
                }

                Mode::DictWait => {
                    // Recoverable: the caller provides the dictionary
                    // via set_dictionary() and calls again.
                    break 'run DecompressStatus::NeedsDictionary;
                }

                Mode::BlockHead => {
                    if self.last_block {
                        self.bits.align();
                        self.mode = match self.format {
                            Format::Raw => Mode::Done,
                            Format::Zlib => Mode::Trailer,
                        };
                        continue;
                    }
                    if !self.bits.need(3, input, &mut pos) {
                        break 'run DecompressStatus::NeedsInput;
                    }
                    self.last_block = self.bits.take(1) == 1;
                    match self.bits.take(2) {
                        0 => {
                            self.bits.align();
                            self.mode = Mode::StoredLen;
                        }
                        1 => {
                            self.use_fixed = true;
                            self.litlen = None;
                            self.dist = None;
                            self.mode = Mode::Len;
                        }
                        2 => {
                            self.use_fixed = false;
                            self.mode = Mode::TableSizes;
                        }
                        _ => {
                            return Err(
                                self.fail(CodecError::malformed_header("reserved block type 3"))
                            );
                        }
                    }
                }

                Mode::StoredLen => {
                    if !self.bits.need(32, input, &mut pos) {
                        break 'run DecompressStatus::NeedsInput;
                    }
                    let pair = self.bits.take(32);
                    let len = pair & 0xFFFF;
                    let nlen = pair >> 16;
                    if len != !nlen & 0xFFFF {
                        return Err(self.fail(CodecError::corrupt(
                            self.total_in + pos as u64,
                            "stored block length mismatch",
                        )));
                    }
                    self.mode = Mode::Stored {
                        remaining: len as u16,
                    };
                }

                Mode::Stored { remaining } => {
                    if remaining == 0 {
                        self.mode = Mode::BlockHead;
                        if flush == FlushMode::Block {
                            break 'run DecompressStatus::BlockEnd;
                        }
                        continue;
                    }
                    let want = remaining as usize;
                    let have_in = input.len() - pos;
                    let have_out = output.len() - out_pos;
                    let n = want.min(have_in).min(have_out);
                    if n == 0 {
                        break 'run if have_out == 0 {
                            DecompressStatus::NeedsOutput
                        } else {
                            DecompressStatus::NeedsInput
                        };
                    }
                    output[out_pos..out_pos + n].copy_from_slice(&input[pos..pos + n]);
                    pos += n;
                    out_pos += n;
                    self.mode = Mode::Stored {
                        remaining: (want - n) as u16,
                    };
                }

                Mode::TableSizes => {
                    if !self.bits.need(14, input, &mut pos) {
                        break 'run DecompressStatus::NeedsInput;
                    }
                    self.nlen = self.bits.take(5) as usize + 257;
                    self.ndist = self.bits.take(5) as usize + 1;
                    self.ncode = self.bits.take(4) as usize + 4;
                    if self.nlen > 286 || self.ndist > 30 {
                        return Err(self.fail(CodecError::bad_table(
                            "too many length or distance symbols",
                        )));
                    }
                    self.cl_lens = [0; 19];
                    self.mode = Mode::CodeLenCodes { have: 0 };
                }

                Mode::CodeLenCodes { mut have } => {
                    while have < self.ncode {
                        if !self.bits.need(3, input, &mut pos) {
                            self.mode = Mode::CodeLenCodes { have };
                            break 'run DecompressStatus::NeedsInput;
                        }
                        self.cl_lens[CODE_LENGTH_ORDER[have]] = self.bits.take(3) as u8;
                        have += 1;
                    }
                    match DecodeTable::build(TableKind::CodeLengths, &self.cl_lens) {
                        Ok(table) => self.cl_table = Some(table),
                        Err(err) => return Err(self.fail(err)),
                    }
                    self.lens.clear();
                    self.lens.reserve(self.nlen + self.ndist);
                    self.mode = Mode::CodeLens { have: 0 };
                }

                Mode::CodeLens { mut have } => {
                    let total = self.nlen + self.ndist;
                    while have < total {
                        let table = self.cl_table.as_ref().expect("code length table built");
                        let Some(entry) = decode_symbol(table, &mut self.bits, input, &mut pos)
                        else {
                            self.mode = Mode::CodeLens { have };
                            break 'run DecompressStatus::NeedsInput;
                        };
                        let symbol = entry.val;
                        // Repeat codes need their payload available
                        // before anything is consumed, so suspension
                        // never loses half a directive.
                        let extra = match symbol {
                            16 => 2u32,
                            17 => 3,
                            18 => 7,
                            _ => 0,
                        };
                        if extra > 0
                            && !self
                                .bits
                                .need(u32::from(entry.code_bits) + extra, input, &mut pos)
                        {
                            self.mode = Mode::CodeLens { have };
                            break 'run DecompressStatus::NeedsInput;
                        }
                        self.bits.drop_bits(u32::from(entry.code_bits));

                        let (fill, count) = match symbol {
                            0..=15 => {
                                self.lens.push(symbol as u8);
                                have += 1;
                                continue;
                            }
                            16 => {
                                if self.lens.is_empty() {
                                    return Err(self.fail(CodecError::bad_table(
                                        "repeat directive with no previous length",
                                    )));
                                }
                                let prev = *self.lens.last().expect("checked non-empty");
                                (prev, self.bits.take(2) as usize + 3)
                            }
                            17 => (0, self.bits.take(3) as usize + 3),
                            18 => (0, self.bits.take(7) as usize + 11),
                            _ => {
                                return Err(self.fail(CodecError::invalid_code(
                                    self.bit_position(pos),
                                )));
                            }
                        };
                        if have + count > total {
                            return Err(
                                self.fail(CodecError::bad_table("length repeat overflows table"))
                            );
                        }
                        for _ in 0..count {
                            self.lens.push(fill);
                        }
                        have += count;
                    }

                    if self.lens[256] == 0 {
                        return Err(self.fail(CodecError::bad_table("missing end-of-block code")));
                    }
                    let litlen = match DecodeTable::build(TableKind::LitLen, &self.lens[..self.nlen])
                    {
                        Ok(table) => table,
                        Err(err) => return Err(self.fail(err)),
                    };
                    let dist = match DecodeTable::build(TableKind::Distance, &self.lens[self.nlen..])
                    {
                        Ok(table) => table,
                        Err(err) => return Err(self.fail(err)),
                    };
                    self.litlen = Some(litlen);
                    self.dist = Some(dist);
                    self.mode = Mode::Len;
                }

                Mode::Len => {
                    // The fast loop accounts refills in whole bytes, so
                    // it must start from a sub-byte register state.
                    if self.fast_path
                        && self.bits.bit_count() < 8
                        && input.len() - pos >= FAST_IN_MARGIN
                        && output.len() - out_pos >= FAST_OUT_MARGIN
                    {
                        match self.inflate_fast(input, &mut pos, output, &mut out_pos) {
                            Ok(()) => {}
                            Err(err) => return Err(self.fail(err)),
                        }
                        if self.mode == Mode::BlockHead && flush == FlushMode::Block {
                            break 'run DecompressStatus::BlockEnd;
                        }
                        continue;
                    }

                    if out_pos == output.len() {
                        break 'run DecompressStatus::NeedsOutput;
                    }
                    let table = if self.use_fixed {
                        fixed_litlen_table()
                    } else {
                        self.litlen.as_ref().expect("literal/length table active")
                    };
                    let Some(entry) = decode_symbol(table, &mut self.bits, input, &mut pos) else {
                        break 'run DecompressStatus::NeedsInput;
                    };
                    match entry.op {
                        Op::Literal => {
                            self.bits.drop_bits(u32::from(entry.code_bits));
                            output[out_pos] = entry.val as u8;
                            out_pos += 1;
                        }
                        Op::EndOfBlock => {
                            self.bits.drop_bits(u32::from(entry.code_bits));
                            self.mode = Mode::BlockHead;
                            if flush == FlushMode::Block {
                                break 'run DecompressStatus::BlockEnd;
                            }
                        }
                        Op::Length => {
                            self.bits.drop_bits(u32::from(entry.code_bits));
                            let extra = entry.total_bits - entry.code_bits;
                            self.mode = if extra > 0 {
                                Mode::LenExt {
                                    base: entry.val,
                                    extra,
                                }
                            } else {
                                Mode::Dist { length: entry.val }
                            };
                        }
                        Op::Invalid | Op::Link => {
                            return Err(
                                self.fail(CodecError::invalid_code(self.bit_position(pos)))
                            );
                        }
                    }
                }

                Mode::LenExt { base, extra } => {
                    if !self.bits.need(u32::from(extra), input, &mut pos) {
                        break 'run DecompressStatus::NeedsInput;
                    }
                    let length = base + self.bits.take(u32::from(extra)) as u16;
                    self.mode = Mode::Dist { length };
                }

                Mode::Dist { length } => {
                    let table = if self.use_fixed {
                        fixed_distance_table()
                    } else {
                        self.dist.as_ref().expect("distance table active")
                    };
                    let Some(entry) = decode_symbol(table, &mut self.bits, input, &mut pos) else {
                        break 'run DecompressStatus::NeedsInput;
                    };
                    match entry.op {
                        Op::Length => {
                            self.bits.drop_bits(u32::from(entry.code_bits));
                            let extra = entry.total_bits - entry.code_bits;
                            self.mode = if extra > 0 {
                                Mode::DistExt {
                                    length,
                                    base: entry.val,
                                    extra,
                                }
                            } else {
                                Mode::Match {
                                    length,
                                    distance: entry.val,
                                }
                            };
                        }
                        _ => {
                            return Err(
                                self.fail(CodecError::invalid_code(self.bit_position(pos)))
                            );
                        }
                    }
                }

                Mode::DistExt {
                    length,
                    base,
                    extra,
                } => {
                    if !self.bits.need(u32::from(extra), input, &mut pos) {
                        break 'run DecompressStatus::NeedsInput;
                    }
                    let distance = base + self.bits.take(u32::from(extra)) as u16;
                    self.mode = Mode::Match { length, distance };
                }

                Mode::Match { length, distance } => {
                    if out_pos == output.len() {
                        break 'run DecompressStatus::NeedsOutput;
                    }
                    let dist = distance as usize;
                    let available = out_pos + self.window.have();
                    if dist > available {
                        if !self.tolerant {
                            return Err(
                                self.fail(CodecError::distance_too_far(dist, available))
                            );
                        }
                        // Legacy tolerance: the bytes beyond history
                        // read as zero.
                        let gap = dist - available;
                        let n = (length as usize).min(gap).min(output.len() - out_pos);
                        output[out_pos..out_pos + n].fill(0);
                        out_pos += n;
                        let left = length as usize - n;
                        self.mode = if left == 0 {
                            Mode::Len
                        } else {
                            Mode::Match {
                                length: left as u16,
                                distance,
                            }
                        };
                        continue;
                    }

                    let n = (length as usize).min(output.len() - out_pos);
                    if dist <= out_pos {
                        copy_from_output(output, out_pos, dist, n);
                    } else {
                        // Source begins in the persisted window, then
                        // continues from this call's output.
                        let win_dist = dist - out_pos;
                        let take = n.min(win_dist);
                        let (a, b) = self.window.span(win_dist, take);
                        output[out_pos..out_pos + a.len()].copy_from_slice(a);
                        output[out_pos + a.len()..out_pos + take].copy_from_slice(b);
                        let rest = n - take;
                        if rest > 0 {
                            copy_from_output(output, out_pos + take, dist, rest);
                        }
                    }
                    out_pos += n;
                    let left = length as usize - n;
                    self.mode = if left == 0 {
                        Mode::Len
                    } else {
                        Mode::Match {
                            length: left as u16,
                            distance,
                        }
                    };
                }

                Mode::Trailer => {
                    // Fold everything produced so far into the running
                    // check before comparing against the trailer.
                    if out_pos > committed {
                        self.check.update(&output[committed..out_pos]);
                        self.window.append(&output[committed..out_pos]);
                        self.total_out += (out_pos - committed) as u64;
                        committed = out_pos;
                    }
                    self.bits.align();
                    if !self.bits.need(32, input, &mut pos) {
                        break 'run DecompressStatus::NeedsInput;
                    }
                    let stored = self.bits.take(32).swap_bytes();
                    let computed = self.check.value();
                    if stored != computed {
                        return Err(self.fail(CodecError::checksum_mismatch(stored, computed)));
                    }
                    self.mode = Mode::Done;
                }

                Mode::Done => break 'run DecompressStatus::Done,

                Mode::Bad => {
                    return Err(clone_data_error(
                        self.saved_error
                            .as_ref()
                            .expect("bad state always records its error"),
                    ));
                }
            }
        };

        // Fold produced bytes into the checksum and window.
        if out_pos > committed {
            self.check.update(&output[committed..out_pos]);
            self.window.append(&output[committed..out_pos]);
            self.total_out += (out_pos - committed) as u64;
        }
        // Push whole over-read bytes back for byte-exact positioning.
        // A NeedsInput suspension keeps them buffered instead: they are
        // a partial read of something mid-stream, and returning them
        // would forfeit the accumulation that makes tiny input buffers
        // work. Everywhere else the buffered whole bytes provably came
        // from this call's slice, so the clamp never binds at Done.
        if status != DecompressStatus::NeedsInput {
            pos -= self.bits.rewind_whole_bytes(pos);
        }
        self.total_in += pos as u64;

        Ok((pos, out_pos, status))
    }

    /// The fast decode loop: literal/length/distance chains with the
    /// bit register kept ≥ 56 bits via speculative 64-bit loads.
    ///
    /// Entered only with fewer than 8 bits buffered; runs while 8 input
    /// bytes remain for refills and each decoded match fits the output.
    /// Exits with the mode set for the slow path (`Len` on low buffers,
    /// `BlockHead` on end of block) and the bit state normalized back
    /// to under 8 bits, whole bytes pushed back.
    fn inflate_fast(
        &mut self,
        input: &[u8],
        pos: &mut usize,
        output: &mut [u8],
        out_pos: &mut usize,
    ) -> Result<()> {
        let litlen = if self.use_fixed {
            fixed_litlen_table()
        } else {
            self.litlen.as_ref().expect("literal/length table active")
        };
        let dist_table = if self.use_fixed {
            fixed_distance_table()
        } else {
            self.dist.as_ref().expect("distance table active")
        };

        let (mut hold, mut count) = self.bits.save();
        let mut p = *pos;
        let mut op = *out_pos;

        let result = loop {
            // Refill: OR whole bytes above the valid count. Loading the
            // same positions twice is harmless, which is what makes the
            // byte-granular accounting below sound.
            if count < 48 {
                if p + 8 > input.len() {
                    break Ok(());
                }
                let word = u64::from_le_bytes(input[p..p + 8].try_into().expect("8-byte window"));
                hold |= word << count;
                p += ((63 - count) >> 3) as usize;
                count |= 56;
            }

            let entry = litlen.resolve(hold as u32);
            match entry.op {
                Op::Literal => {
                    if op >= output.len() {
                        break Ok(());
                    }
                    output[op] = entry.val as u8;
                    op += 1;
                    hold >>= entry.code_bits;
                    count -= u32::from(entry.code_bits);
                }
                Op::EndOfBlock => {
                    hold >>= entry.code_bits;
                    count -= u32::from(entry.code_bits);
                    self.mode = Mode::BlockHead;
                    break Ok(());
                }
                Op::Length => {
                    let extra = u32::from(entry.total_bits - entry.code_bits);
                    let length = entry.val as usize
                        + (((hold >> entry.code_bits) as u32) & ((1 << extra) - 1)) as usize;
                    if output.len() - op < length {
                        // Nothing consumed yet; the slow path redecodes
                        // this pair against the remaining space.
                        break Ok(());
                    }

                    let after_len = hold >> entry.total_bits;
                    let dentry = dist_table.resolve(after_len as u32);
                    if dentry.op != Op::Length {
                        break Err(CodecError::invalid_code(
                            (self.total_in + p as u64) * 8 - u64::from(count),
                        ));
                    }
                    let dextra = u32::from(dentry.total_bits - dentry.code_bits);
                    let distance = dentry.val as usize
                        + (((after_len >> dentry.code_bits) as u32) & ((1 << dextra) - 1)) as usize;

                    let available = op + self.window.have();
                    if distance > available {
                        if self.tolerant {
                            // Fall back to the slow path's zero-fill;
                            // no bits consumed for this pair yet.
                            break Ok(());
                        }
                        break Err(CodecError::distance_too_far(distance, available));
                    }

                    let consumed =
                        u32::from(entry.total_bits) + u32::from(dentry.total_bits);
                    hold >>= consumed;
                    count -= consumed;

                    if distance <= op {
                        copy_from_output(output, op, distance, length);
                    } else {
                        let win_dist = distance - op;
                        let take = length.min(win_dist);
                        let (a, b) = self.window.span(win_dist, take);
                        output[op..op + a.len()].copy_from_slice(a);
                        output[op + a.len()..op + take].copy_from_slice(b);
                        let rest = length - take;
                        if rest > 0 {
                            copy_from_output(output, op + take, distance, rest);
                        }
                    }
                    op += length;
                }
                Op::Invalid | Op::Link => {
                    break Err(CodecError::invalid_code(
                        (self.total_in + p as u64) * 8 - u64::from(count),
                    ));
                }
            }
        };

        // Normalize: push whole buffered bytes back (only those loaded
        // from this slice) and clear the speculative bits above the
        // count.
        let back = ((count >> 3) as usize).min(p);
        p -= back;
        count -= (back as u32) << 3;
        hold &= (1u64 << count) - 1;
        self.bits.restore(hold, count);
        *pos = p;
        *out_pos = op;

        result
    }

    /// Scan forward for a sync-flush marker (the 00 00 FF FF of an
    /// empty stored block) and restart decoding from it, discarding
    /// everything before. Clears a prior data error.
    ///
    /// Returns `(bytes consumed, found)`; when `found` is false the
    /// whole input was scanned without a marker and the caller should
    /// supply more.
    pub fn sync(&mut self, input: &[u8]) -> (usize, bool) {
        let mut got = self.sync_have;
        let mut next = 0usize;
        while next < input.len() && got < 4 {
            let byte = input[next];
            if byte == if got < 2 { 0x00 } else { 0xFF } {
                got += 1;
            } else if byte != 0 {
                got = 0;
            } else {
                got = 4 - got;
            }
            next += 1;
        }
        self.total_in += next as u64;

        if got < 4 {
            self.sync_have = got;
            return (next, false);
        }

        self.sync_have = 0;
        self.saved_error = None;
        self.bits.clear();
        self.mode = Mode::BlockHead;
        self.last_block = false;
        (next, true)
    }
}

impl Default for Inflater {
    fn default() -> Self {
        Self::new()
    }
}

impl Decompressor for Inflater {
    fn decompress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> Result<(usize, usize, DecompressStatus)> {
        self.inflate(input, output, flush)
    }

    fn reset(&mut self) {
        Inflater::reset(self);
    }

    fn is_finished(&self) -> bool {
        Inflater::is_finished(self)
    }
}

/// Resolve one Huffman symbol, refilling as needed.
///
/// Probes the table with the bits at hand; when the returned entry
/// claims more bits than are buffered, pulls another byte and retries.
/// Returns `None` when the input runs dry first (the bit buffer is
/// untouched, so the caller can suspend and re-enter).
#[inline]
fn decode_symbol(
    table: &DecodeTable,
    bits: &mut BitReader,
    input: &[u8],
    pos: &mut usize,
) -> Option<crate::huffman::Entry> {
    loop {
        let entry = table.resolve(bits.peek_or_zero(15));
        if u32::from(entry.code_bits) <= bits.bit_count() {
            return Some(entry);
        }
        if !bits.need(u32::from(entry.code_bits), input, pos) {
            return None;
        }
    }
}

/// Copy `n` bytes within `output` from `dist` back, with byte-by-byte
/// semantics when the regions self-overlap (`dist < n`) so RLE-style
/// references replicate correctly.
#[inline]
fn copy_from_output(output: &mut [u8], out_pos: usize, dist: usize, n: usize) {
    let start = out_pos - dist;
    if dist >= n {
        output.copy_within(start..start + n, out_pos);
    } else if dist == 1 {
        let byte = output[start];
        output[out_pos..out_pos + n].fill(byte);
    } else {
        for i in 0..n {
            output[out_pos + i] = output[start + i];
        }
    }
}

/// Clone a data error for repeat reporting. I/O errors are never
/// stored, so that arm is unreachable in practice.
fn clone_data_error(err: &CodecError) -> CodecError {
    match err {
        CodecError::MalformedHeader { message } => CodecError::MalformedHeader {
            message: message.clone(),
        },
        CodecError::BadHuffmanTable { message } => CodecError::BadHuffmanTable {
            message: message.clone(),
        },
        CodecError::InvalidCode { bit_position } => CodecError::InvalidCode {
            bit_position: *bit_position,
        },
        CodecError::DistanceTooFar {
            distance,
            available,
        } => CodecError::DistanceTooFar {
            distance: *distance,
            available: *available,
        },
        CodecError::ChecksumMismatch { expected, computed } => CodecError::ChecksumMismatch {
            expected: *expected,
            computed: *computed,
        },
        CodecError::DictionaryRequired { checksum } => CodecError::DictionaryRequired {
            checksum: *checksum,
        },
        CodecError::StreamCorrupt { offset, message } => CodecError::StreamCorrupt {
            offset: *offset,
            message: message.clone(),
        },
        CodecError::Io(io) => CodecError::StreamCorrupt {
            offset: 0,
            message: io.to_string(),
        },
    }
}

/// Decompress a complete raw DEFLATE stream.
pub fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut inflater = Inflater::raw();
    inflater.decompress_all(data)
}
