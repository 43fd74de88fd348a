//! DEFLATE compression (deflate).
//!
//! [`Deflater`] is the streaming counterpart of the decoder: it absorbs
//! caller input into an internal buffer, runs the LZ77 match search
//! over it block by block, Huffman-encodes the resulting tokens with
//! whichever representation is cheapest (stored, fixed, or dynamic
//! tables built per block), and drains the encoded bytes into the
//! caller's output buffer across calls.
//!
//! Flush modes control block boundaries: `Sync` and `Full` end the
//! current block and append an empty stored block, leaving the stream
//! byte-aligned at the 00 00 FF FF resynchronization marker (`Full`
//! also discards history, making the next block independent);
//! `Partial` emits a cheaper empty fixed block without alignment;
//! `Finish` marks the final block, aligns, and appends the container
//! trailer.

use crate::huffman::{HuffmanBuilder, canonical_codes};
use crate::inflate::Format;
use crate::lz77::{MatchFinder, Strategy, Token};
use crate::tables::{
    CODE_LENGTH_ORDER, distance_to_code, fixed_distance_lengths, fixed_litlen_lengths,
    length_to_code,
};
use ferroflate_core::bitstream::BitWriter;
use ferroflate_core::checksum::{Adler32, Check};
use ferroflate_core::config::Tuning;
use ferroflate_core::error::{CodecError, Result};
use ferroflate_core::traits::{CompressStatus, Compressor, FlushMode};

/// Maximum bytes tokenized into one block (also the stored-block size
/// limit, which keeps the stored fallback a single block).
const BLOCK_MAX: usize = 65535;

/// DEFLATE compressor.
#[derive(Debug)]
pub struct Deflater {
    finder: MatchFinder,
    level: u8,
    strategy: Strategy,
    format: Format,
    check: Check,
    bits: BitWriter,
    /// Raw input awaiting tokenization.
    buffer: Vec<u8>,
    /// Encoded bytes awaiting the caller's output buffer.
    pending: Vec<u8>,
    pending_pos: usize,
    header_written: bool,
    dict_id: Option<u32>,
    finished: bool,
    total_in: u64,
    total_out: u64,
}

impl Deflater {
    /// Create a raw-DEFLATE compressor at the given level (0-9).
    pub fn new(level: u8) -> Self {
        Self::with_options(level, Strategy::Default, Format::Raw, Tuning::new())
    }

    /// Create a zlib-wrapped compressor at the given level.
    pub fn zlib(level: u8) -> Self {
        Self::with_options(level, Strategy::Default, Format::Zlib, Tuning::new())
    }

    /// Create a compressor with explicit strategy, framing, and tuning.
    pub fn with_options(level: u8, strategy: Strategy, format: Format, tuning: Tuning) -> Self {
        let level = level.min(9);
        Self {
            finder: MatchFinder::new(level, strategy, &tuning),
            level,
            strategy,
            format,
            check: match format {
                Format::Raw => Check::None,
                Format::Zlib => Check::adler(),
            },
            bits: BitWriter::new(),
            buffer: Vec::new(),
            pending: Vec::new(),
            pending_pos: 0,
            header_written: false,
            dict_id: None,
            finished: false,
            total_in: 0,
            total_out: 0,
        }
    }

    /// Create a raw compressor primed with a dictionary.
    pub fn with_dictionary(level: u8, dictionary: &[u8]) -> Self {
        let mut deflater = Self::new(level);
        deflater
            .set_dictionary(dictionary)
            .expect("priming a fresh compressor cannot fail");
        deflater
    }

    /// Total raw bytes absorbed.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Total compressed bytes handed to the caller.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    /// The Adler-32 of the primed dictionary, if one was set.
    pub fn dictionary_checksum(&self) -> Option<u32> {
        self.dict_id
    }

    /// Seed the sliding window with dictionary bytes. Must be called
    /// before any data is compressed. Returns the dictionary's
    /// Adler-32 (a zlib stream advertises it in the FDICT header).
    pub fn set_dictionary(&mut self, dictionary: &[u8]) -> Result<u32> {
        if self.total_in != 0 || self.header_written {
            return Err(CodecError::corrupt(
                self.total_in,
                "dictionary may only be set before compression begins",
            ));
        }
        self.finder.set_dictionary(dictionary);
        let sum = Adler32::compute(dictionary);
        self.dict_id = Some(sum);
        Ok(sum)
    }

    /// Reset for a fresh stream, keeping level, strategy, and framing.
    pub fn reset(&mut self) {
        self.finder.reset();
        self.check = match self.format {
            Format::Raw => Check::None,
            Format::Zlib => Check::adler(),
        };
        self.bits.clear();
        self.buffer.clear();
        self.pending.clear();
        self.pending_pos = 0;
        self.header_written = false;
        self.dict_id = None;
        self.finished = false;
        self.total_in = 0;
        self.total_out = 0;
    }

    /// Whether the stream has been finished and fully drained.
    pub fn is_finished(&self) -> bool {
        self.finished && self.pending_len() == 0
    }

    fn pending_len(&self) -> usize {
        self.pending.len() - self.pending_pos
    }

    /// Compress from `input` into `output` under the given flush mode.
    ///
    /// All supplied input is absorbed; encoded bytes are produced as
    /// blocks complete or flushing forces them out.
    pub fn compress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> Result<(usize, usize, CompressStatus)> {
        if self.finished {
            if !input.is_empty() {
                return Err(CodecError::corrupt(
                    self.total_in,
                    "input supplied after the stream was finished",
                ));
            }
            let produced = self.drain(output);
            return Ok((0, produced, self.drain_status()));
        }

        self.buffer.extend_from_slice(input);
        self.check.update(input);
        self.total_in += input.len() as u64;

        if !self.header_written {
            self.write_header();
            self.header_written = true;
        }

        // Emit full blocks as the buffer fills. Window and hash state
        // persist in the finder, so later blocks still match into
        // earlier input.
        while self.buffer.len() >= BLOCK_MAX {
            let chunk: Vec<u8> = self.buffer.drain(..BLOCK_MAX).collect();
            self.emit_block(&chunk, false);
        }

        match flush {
            FlushMode::None => {}
            FlushMode::Block => {
                if !self.buffer.is_empty() {
                    let chunk = std::mem::take(&mut self.buffer);
                    self.emit_block(&chunk, false);
                }
            }
            FlushMode::Partial => {
                if !self.buffer.is_empty() {
                    let chunk = std::mem::take(&mut self.buffer);
                    self.emit_block(&chunk, false);
                }
                // An empty fixed block: ten bits that let the far end
                // decode everything buffered so far.
                self.bits.push(0, 1);
                self.bits.push(0b01, 2);
                self.bits.push(0, 7);
            }
            FlushMode::Sync | FlushMode::Full => {
                if !self.buffer.is_empty() {
                    let chunk = std::mem::take(&mut self.buffer);
                    self.emit_block(&chunk, false);
                }
                self.write_sync_marker();
                if flush == FlushMode::Full {
                    self.finder.reset();
                }
            }
            FlushMode::Finish => {
                let chunk = std::mem::take(&mut self.buffer);
                self.emit_block(&chunk, true);
                self.bits.align();
                let bytes = self.bits.split_bytes();
                self.pending.extend_from_slice(&bytes);
                if self.format == Format::Zlib {
                    let adler = self.check.value();
                    self.pending.extend_from_slice(&adler.to_be_bytes());
                }
                self.finished = true;
            }
        }

        let bytes = self.bits.split_bytes();
        self.pending.extend_from_slice(&bytes);

        let produced = self.drain(output);
        Ok((input.len(), produced, self.drain_status()))
    }

    fn drain(&mut self, output: &mut [u8]) -> usize {
        let n = self.pending_len().min(output.len());
        output[..n].copy_from_slice(&self.pending[self.pending_pos..self.pending_pos + n]);
        self.pending_pos += n;
        self.total_out += n as u64;
        if self.pending_pos == self.pending.len() {
            self.pending.clear();
            self.pending_pos = 0;
        }
        n
    }

    fn drain_status(&self) -> CompressStatus {
        if self.pending_len() > 0 {
            CompressStatus::NeedsOutput
        } else if self.finished {
            CompressStatus::Done
        } else {
            CompressStatus::NeedsInput
        }
    }

    fn write_header(&mut self) {
        if self.format != Format::Zlib {
            return;
        }
        // CMF: method 8, 32 KiB window.
        let cmf: u8 = 0x78;
        let flevel: u8 = match self.level {
            0..=2 => 0,
            3..=5 => 1,
            6 => 2,
            _ => 3,
        };
        let fdict: u8 = u8::from(self.dict_id.is_some());
        let fcheck = {
            let base = u16::from(cmf) * 256 + u16::from((flevel << 6) | (fdict << 5));
            let rem = base % 31;
            if rem == 0 { 0 } else { (31 - rem) as u8 }
        };
        self.pending.push(cmf);
        self.pending.push((flevel << 6) | (fdict << 5) | fcheck);
        if let Some(id) = self.dict_id {
            self.pending.extend_from_slice(&id.to_be_bytes());
        }
    }

    /// An empty stored block: aligns the stream and leaves the
    /// 00 00 FF FF resynchronization marker.
    fn write_sync_marker(&mut self) {
        self.bits.push(0, 1);
        self.bits.push(0b00, 2);
        self.bits.align();
        self.bits.extend_bytes(&[0x00, 0x00, 0xFF, 0xFF]);
    }

    /// Tokenize one block's worth of raw input and write it with the
    /// cheapest representation.
    fn emit_block(&mut self, raw: &[u8], final_block: bool) {
        if self.level == 0 {
            self.write_stored(raw, final_block);
            return;
        }

        let mut tokens = Vec::with_capacity(raw.len() / 2 + 1);
        self.finder.tokenize(raw, &mut tokens);
        self.write_block(&tokens, raw, final_block);
    }

    /// Choose stored / fixed / dynamic for this block and write it.
    fn write_block(&mut self, tokens: &[Token], raw: &[u8], final_block: bool) {
        let plan = DynamicPlan::build(tokens);

        let fixed_lit_lens = fixed_litlen_lengths();
        let fixed_dist_lens = fixed_distance_lengths();
        let fixed_cost = token_cost(tokens, &fixed_lit_lens, &fixed_dist_lens) + 3;
        let dynamic_cost = plan.data_bits + plan.header_bits + 3;
        let stored_cost = 8 * (raw.len() + 5 * raw.len().div_ceil(BLOCK_MAX).max(1));

        let forced_fixed = self.strategy == Strategy::Fixed;
        if !forced_fixed && stored_cost < fixed_cost.min(dynamic_cost) {
            self.write_stored(raw, final_block);
        } else if forced_fixed || fixed_cost <= dynamic_cost {
            self.write_fixed(tokens, final_block);
        } else {
            self.write_dynamic(tokens, &plan, final_block);
        }
    }

    /// Write `raw` as stored blocks (split at the 65535-byte limit).
    fn write_stored(&mut self, raw: &[u8], final_block: bool) {
        let mut offset = 0;
        loop {
            let n = (raw.len() - offset).min(BLOCK_MAX);
            let last_chunk = offset + n == raw.len();
            self.bits.push(u32::from(final_block && last_chunk), 1);
            self.bits.push(0b00, 2);
            self.bits.align();
            let len = n as u16;
            self.bits.extend_bytes(&len.to_le_bytes());
            self.bits.extend_bytes(&(!len).to_le_bytes());
            self.bits.extend_bytes(&raw[offset..offset + n]);
            offset += n;
            if last_chunk {
                break;
            }
        }
    }

    fn write_fixed(&mut self, tokens: &[Token], final_block: bool) {
        self.bits.push(u32::from(final_block), 1);
        self.bits.push(0b01, 2);

        let lit_lens = fixed_litlen_lengths();
        let lit_codes = canonical_codes(&lit_lens);
        let dist_lens = fixed_distance_lengths();
        let dist_codes = canonical_codes(&dist_lens);
        self.write_tokens(tokens, &lit_codes, &lit_lens, &dist_codes, &dist_lens);
    }

    fn write_dynamic(&mut self, tokens: &[Token], plan: &DynamicPlan, final_block: bool) {
        self.bits.push(u32::from(final_block), 1);
        self.bits.push(0b10, 2);

        self.bits.push((plan.hlit - 257) as u32, 5);
        self.bits.push((plan.hdist - 1) as u32, 5);
        self.bits.push((plan.hclen - 4) as u32, 4);
        for i in 0..plan.hclen {
            self.bits
                .push(u32::from(plan.cl_lens[CODE_LENGTH_ORDER[i]]), 3);
        }
        for &(sym, extra_val, extra_bits) in &plan.rle {
            self.bits.push(
                u32::from(plan.cl_codes[usize::from(sym)]),
                u32::from(plan.cl_lens[usize::from(sym)]),
            );
            if extra_bits > 0 {
                self.bits.push(u32::from(extra_val), u32::from(extra_bits));
            }
        }

        let lit_codes = canonical_codes(&plan.lit_lens);
        let dist_codes = canonical_codes(&plan.dist_lens);
        self.write_tokens(
            tokens,
            &lit_codes,
            &plan.lit_lens,
            &dist_codes,
            &plan.dist_lens,
        );
    }

    fn write_tokens(
        &mut self,
        tokens: &[Token],
        lit_codes: &[u16],
        lit_lens: &[u8],
        dist_codes: &[u16],
        dist_lens: &[u8],
    ) {
        for token in tokens {
            match *token {
                Token::Literal(byte) => {
                    let sym = usize::from(byte);
                    self.bits
                        .push(u32::from(lit_codes[sym]), u32::from(lit_lens[sym]));
                }
                Token::Match { length, distance } => {
                    let (code, extra_bits, extra) = length_to_code(length);
                    let sym = usize::from(code);
                    self.bits
                        .push(u32::from(lit_codes[sym]), u32::from(lit_lens[sym]));
                    if extra_bits > 0 {
                        self.bits.push(u32::from(extra), u32::from(extra_bits));
                    }

                    let (code, extra_bits, extra) = distance_to_code(distance);
                    let sym = usize::from(code);
                    self.bits
                        .push(u32::from(dist_codes[sym]), u32::from(dist_lens[sym]));
                    if extra_bits > 0 {
                        self.bits.push(u32::from(extra), u32::from(extra_bits));
                    }
                }
            }
        }
        // End of block.
        self.bits
            .push(u32::from(lit_codes[256]), u32::from(lit_lens[256]));
    }

    /// Compress an entire buffer to a freshly allocated `Vec`.
    pub fn compress_to_vec(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        let mut buffer = vec![0u8; 32768];
        let mut fed = false;
        loop {
            let input: &[u8] = if fed { &[] } else { data };
            let (_, produced, status) = self.compress(input, &mut buffer, FlushMode::Finish)?;
            fed = true;
            output.extend_from_slice(&buffer[..produced]);
            if status == CompressStatus::Done {
                break;
            }
        }
        Ok(output)
    }
}

impl Default for Deflater {
    fn default() -> Self {
        Self::new(6)
    }
}

impl Compressor for Deflater {
    fn compress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> Result<(usize, usize, CompressStatus)> {
        Deflater::compress(self, input, output, flush)
    }

    fn reset(&mut self) {
        Deflater::reset(self);
    }

    fn is_finished(&self) -> bool {
        Deflater::is_finished(self)
    }
}

/// Everything needed to emit (and cost) a dynamic-table block.
struct DynamicPlan {
    lit_lens: Vec<u8>,
    dist_lens: Vec<u8>,
    hlit: usize,
    hdist: usize,
    hclen: usize,
    cl_lens: Vec<u8>,
    cl_codes: Vec<u16>,
    /// `(symbol, extra_value, extra_bits)` triples for the
    /// RLE-compressed length table.
    rle: Vec<(u8, u8, u8)>,
    data_bits: usize,
    header_bits: usize,
}

impl DynamicPlan {
    fn build(tokens: &[Token]) -> Self {
        let (lit_freq, dist_freq) = count_frequencies(tokens);

        let mut lit_builder = HuffmanBuilder::new(286, 15);
        for (sym, &freq) in lit_freq.iter().enumerate() {
            lit_builder.add_count(sym as u16, freq);
        }
        let lit_lens = lit_builder.build_lengths();

        let mut dist_builder = HuffmanBuilder::new(30, 15);
        for (sym, &freq) in dist_freq.iter().enumerate() {
            dist_builder.add_count(sym as u16, freq);
        }
        let dist_lens = dist_builder.build_lengths();

        let hlit = last_nonzero(&lit_lens).max(257);
        let hdist = last_nonzero(&dist_lens).max(1);

        let mut combined = Vec::with_capacity(hlit + hdist);
        combined.extend_from_slice(&lit_lens[..hlit]);
        combined.extend_from_slice(&dist_lens[..hdist]);
        let (rle, cl_freqs) = rle_encode_lengths(&combined);

        let mut cl_builder = HuffmanBuilder::new(19, 7);
        for (sym, &freq) in cl_freqs.iter().enumerate() {
            cl_builder.add_count(sym as u16, freq);
        }
        let cl_lens = cl_builder.build_lengths();
        let cl_codes = canonical_codes(&cl_lens);

        let mut hclen = 19;
        while hclen > 4 && cl_lens[CODE_LENGTH_ORDER[hclen - 1]] == 0 {
            hclen -= 1;
        }

        let data_bits = token_cost(tokens, &lit_lens, &dist_lens);
        let header_bits = 14
            + 3 * hclen
            + rle
                .iter()
                .map(|&(sym, _, extra_bits)| {
                    usize::from(cl_lens[usize::from(sym)]) + usize::from(extra_bits)
                })
                .sum::<usize>();

        Self {
            lit_lens,
            dist_lens,
            hlit,
            hdist,
            hclen,
            cl_lens,
            cl_codes,
            rle,
            data_bits,
            header_bits,
        }
    }
}

/// Symbol frequencies over a token stream, end-of-block included.
fn count_frequencies(tokens: &[Token]) -> ([u32; 286], [u32; 30]) {
    let mut lit_freq = [0u32; 286];
    let mut dist_freq = [0u32; 30];

    for token in tokens {
        match *token {
            Token::Literal(byte) => lit_freq[usize::from(byte)] += 1,
            Token::Match { length, distance } => {
                let (code, _, _) = length_to_code(length);
                lit_freq[usize::from(code)] += 1;
                let (code, _, _) = distance_to_code(distance);
                dist_freq[usize::from(code)] += 1;
            }
        }
    }
    lit_freq[256] += 1;

    (lit_freq, dist_freq)
}

fn last_nonzero(lens: &[u8]) -> usize {
    lens.iter().rposition(|&l| l != 0).map_or(0, |i| i + 1)
}

/// Exact bit cost of a token stream under the given code lengths,
/// end-of-block included.
fn token_cost(tokens: &[Token], lit_lens: &[u8], dist_lens: &[u8]) -> usize {
    let mut bits = 0usize;
    for token in tokens {
        match *token {
            Token::Literal(byte) => bits += usize::from(lit_lens[usize::from(byte)]),
            Token::Match { length, distance } => {
                let (code, extra, _) = length_to_code(length);
                bits += usize::from(lit_lens[usize::from(code)]) + usize::from(extra);
                let (code, extra, _) = distance_to_code(distance);
                bits += usize::from(dist_lens[usize::from(code)]) + usize::from(extra);
            }
        }
    }
    bits + usize::from(lit_lens[256])
}

/// RLE-compress a code length sequence with symbols 16 (repeat
/// previous), 17 (short zero run), and 18 (long zero run), returning
/// the emitted triples and the code-length-alphabet frequencies.
fn rle_encode_lengths(lengths: &[u8]) -> (Vec<(u8, u8, u8)>, [u32; 19]) {
    let mut out = Vec::new();
    let mut freqs = [0u32; 19];
    let mut i = 0;

    while i < lengths.len() {
        let value = lengths[i];
        let mut run = 1;
        while i + run < lengths.len() && lengths[i + run] == value {
            run += 1;
        }

        if value == 0 {
            let mut left = run;
            while left >= 11 {
                let take = left.min(138);
                out.push((18, (take - 11) as u8, 7));
                freqs[18] += 1;
                left -= take;
            }
            if left >= 3 {
                out.push((17, (left - 3) as u8, 3));
                freqs[17] += 1;
                left = 0;
            }
            for _ in 0..left {
                out.push((0, 0, 0));
                freqs[0] += 1;
            }
        } else {
            out.push((value, 0, 0));
            freqs[usize::from(value)] += 1;
            let mut left = run - 1;
            while left >= 3 {
                let take = left.min(6);
                out.push((16, (take - 3) as u8, 2));
                freqs[16] += 1;
                left -= take;
            }
            for _ in 0..left {
                out.push((value, 0, 0));
                freqs[usize::from(value)] += 1;
            }
        }

        i += run;
    }

    (out, freqs)
}

/// Compress data as a raw DEFLATE stream.
pub fn deflate(data: &[u8], level: u8) -> Result<Vec<u8>> {
    let mut deflater = Deflater::new(level);
    deflater.compress_to_vec(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inflate::inflate;

    #[test]
    fn test_deflate_stored_roundtrip() {
        let input = b"Hello, World!";
        let compressed = deflate(input, 0).unwrap();
        assert_eq!(inflate(&compressed).unwrap(), input);
    }

    #[test]
    fn test_deflate_empty() {
        for level in [0u8, 1, 6, 9] {
            let compressed = deflate(b"", level).unwrap();
            assert!(!compressed.is_empty());
            assert!(inflate(&compressed).unwrap().is_empty());
        }
    }

    #[test]
    fn test_deflate_compresses_repetition() {
        let input = b"AAAAAAAAAABBBBBBBBBBCCCCCCCCCCAAAAAAAAAABBBBBBBBBB";
        let compressed = deflate(input, 6).unwrap();
        assert!(compressed.len() < input.len());
        assert_eq!(inflate(&compressed).unwrap(), input);
    }

    #[test]
    fn test_deflate_roundtrip_levels() {
        let inputs: Vec<Vec<u8>> = vec![
            b"Hello".to_vec(),
            b"The quick brown fox jumps over the lazy dog".to_vec(),
            vec![0u8; 1000],
            (0u16..=255).map(|b| b as u8).collect(),
            b"hello, hello!".to_vec(),
        ];
        for input in &inputs {
            for level in [0u8, 1, 4, 6, 9] {
                let compressed = deflate(input, level).unwrap();
                let decompressed = inflate(&compressed).unwrap();
                assert_eq!(&decompressed, input, "level {level}, {} bytes", input.len());
            }
        }
    }

    #[test]
    fn test_deflate_multi_block_input() {
        // More than one BLOCK_MAX of patterned data exercises block
        // splitting and cross-block matches.
        let pattern = b"abcdefghij_klmnopqrst_";
        let input: Vec<u8> = pattern.iter().copied().cycle().take(200_000).collect();
        let compressed = deflate(&input, 6).unwrap();
        assert!(compressed.len() < input.len() / 4);
        assert_eq!(inflate(&compressed).unwrap(), input);
    }

    #[test]
    fn test_sync_flush_marker_present() {
        let mut deflater = Deflater::new(6);
        let mut out = vec![0u8; 4096];
        let (_, n1, _) = deflater
            .compress(b"some data", &mut out, FlushMode::Sync)
            .unwrap();
        // A sync flush ends on the empty stored block marker.
        assert!(n1 >= 4);
        assert_eq!(&out[n1 - 4..n1], &[0x00, 0x00, 0xFF, 0xFF]);

        // The stream still finishes and round-trips.
        let mut rest = vec![0u8; 4096];
        let (_, n2, status) = deflater
            .compress(b" and more", &mut rest, FlushMode::Finish)
            .unwrap();
        assert_eq!(status, CompressStatus::Done);

        let mut stream = out[..n1].to_vec();
        stream.extend_from_slice(&rest[..n2]);
        assert_eq!(inflate(&stream).unwrap(), b"some data and more");
    }

    #[test]
    fn test_full_flush_makes_blocks_independent() {
        let mut deflater = Deflater::new(9);
        let mut first = vec![0u8; 4096];
        let (_, n1, _) = deflater
            .compress(b"independent segment one", &mut first, FlushMode::Full)
            .unwrap();
        let mut second = vec![0u8; 4096];
        let (_, n2, _) = deflater
            .compress(b"independent segment one", &mut second, FlushMode::Finish)
            .unwrap();

        // After a full flush the second segment cannot reference the
        // first, so decoding the tail alone (after the marker) works.
        let mut inf = crate::inflate::Inflater::raw();
        let tail = &second[..n2];
        let mut out = vec![0u8; 256];
        let (_, produced, _) = inf.inflate(tail, &mut out, FlushMode::None).unwrap();
        assert_eq!(&out[..produced], b"independent segment one");

        // And the concatenated whole decodes too.
        let mut stream = first[..n1].to_vec();
        stream.extend_from_slice(tail);
        let whole = inflate(&stream).unwrap();
        assert_eq!(whole, b"independent segment oneindependent segment one".to_vec());
    }

    #[test]
    fn test_strategies_roundtrip() {
        let input: Vec<u8> = b"runruns: aaaaaabbbbbbbcccccc 1234 aaaaaabbbbbbbcccccc"
            .iter()
            .copied()
            .cycle()
            .take(5000)
            .collect();
        for strategy in [
            Strategy::Default,
            Strategy::Filtered,
            Strategy::HuffmanOnly,
            Strategy::Rle,
            Strategy::Fixed,
        ] {
            let mut deflater =
                Deflater::with_options(6, strategy, Format::Raw, Tuning::new());
            let compressed = deflater.compress_to_vec(&input).unwrap();
            assert_eq!(
                inflate(&compressed).unwrap(),
                input,
                "strategy {strategy:?}"
            );
        }
    }

    #[test]
    fn test_rle_encode_long_zero_run() {
        // 150 zeros: one 138-run, then a 12-run.
        let lengths = vec![0u8; 150];
        let (rle, freqs) = rle_encode_lengths(&lengths);
        assert_eq!(freqs[18], 2);
        assert_eq!(rle[0], (18, 127, 7));
        assert_eq!(rle[1], (18, 1, 7));
        let decoded: usize = rle
            .iter()
            .map(|&(sym, extra, _)| match sym {
                18 => 11 + usize::from(extra),
                17 => 3 + usize::from(extra),
                16 => 3 + usize::from(extra),
                _ => 1,
            })
            .sum();
        assert_eq!(decoded, 150);
    }

    #[test]
    fn test_rle_encode_repeats() {
        // 8, then 7 more eights: literal + 16-run(6) + literal.
        let lengths = vec![8u8; 8];
        let (rle, freqs) = rle_encode_lengths(&lengths);
        assert_eq!(rle[0], (8, 0, 0));
        assert_eq!(rle[1], (16, 3, 2));
        assert_eq!(rle[2], (8, 0, 0));
        assert_eq!(freqs[8], 2);
        assert_eq!(freqs[16], 1);
    }

    #[test]
    fn test_input_after_finish_rejected() {
        let mut deflater = Deflater::new(6);
        let mut out = vec![0u8; 1024];
        deflater.compress(b"abc", &mut out, FlushMode::Finish).unwrap();
        let err = deflater
            .compress(b"more", &mut out, FlushMode::None)
            .unwrap_err();
        assert!(matches!(err, CodecError::StreamCorrupt { .. }));
    }
}
