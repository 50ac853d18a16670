// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasm-audio

//! Block-wise encode/decode pipeline.
//!
//! The encoder walks the audio in blocks of `block_frames` frames:
//! 1. full blocks are transformed and classified SILENT or ACTIVE;
//! 2. each ACTIVE block consumes one payload bit, and a `1` forces the
//!    embedding bin (and its mirror) to the embedded magnitude before the
//!    inverse transform replaces the reference channel;
//! 3. SILENT blocks, `0` bits, the trailing partial block and everything after
//!    the last payload bit pass through untouched.
//!
//! Capacity is checked before a single sample is written: first a cheap
//! estimate from the declared length, then a read-only scan that stops as
//! soon as enough ACTIVE blocks were seen, then a rewind.
//!
//! The decoder mirrors the walk and reads one bit per ACTIVE block by
//! thresholding the embedding-bin magnitude.

use log::{debug, info, trace};

use super::bits::{bits_to_bytes, bits_to_text, pack_byte, TEXT_TERMINATOR};
use super::block::{Analyzer, BlockReader};
use super::capacity::{count_active_blocks, estimate_capacity};
use super::error::{Result, StegoError};
use super::params::StegoParams;
use crate::audio::{SampleSink, SampleSource};

/// Where the encoder is in its walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderState {
    /// Payload bits remain; ACTIVE blocks are analysed and may be modified.
    Streaming,
    /// Payload exhausted; remaining blocks are copied verbatim.
    Passthrough,
    /// Input exhausted.
    Done,
}

/// Summary of one encode run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeReport {
    /// Frames written to the sink.
    pub frames: u64,
    /// Blocks read, including the trailing partial one.
    pub blocks: usize,
    /// Full blocks skipped as silent while bits remained.
    pub silent_blocks: usize,
    /// Payload bits placed (one per ACTIVE block).
    pub bits_embedded: usize,
    /// Blocks whose reference channel was rewritten (`1` bits).
    pub marked_blocks: usize,
}

// ──────────────────────────────────────────────────────────────────────────
// Encoder
// ──────────────────────────────────────────────────────────────────────────

/// Streaming embedder over a prepared (capacity-checked) source.
pub struct Encoder<'a, S: ?Sized, K: ?Sized> {
    blocks: BlockReader<'a, S>,
    sink: &'a mut K,
    analyzer: Analyzer,
    bits: &'a [bool],
    next_bit: usize,
    state: EncoderState,
    report: EncodeReport,
}

impl<'a, S, K> Encoder<'a, S, K>
where
    S: SampleSource + ?Sized,
    K: SampleSink + ?Sized,
{
    /// Set up an encoder. Does not check capacity; see [`prepare_encode`].
    pub fn new(source: &'a mut S, sink: &'a mut K, analyzer: Analyzer, bits: &'a [bool]) -> Self {
        let block_frames = analyzer.params().block_frames;
        let state = if bits.is_empty() {
            EncoderState::Passthrough
        } else {
            EncoderState::Streaming
        };
        Self {
            blocks: BlockReader::new(source, block_frames),
            sink,
            analyzer,
            bits,
            next_bit: 0,
            state,
            report: EncodeReport::default(),
        }
    }

    pub fn state(&self) -> EncoderState {
        self.state
    }

    pub fn report(&self) -> &EncodeReport {
        &self.report
    }

    /// Process one block and return the state afterwards.
    pub fn step(&mut self) -> Result<EncoderState> {
        if self.state == EncoderState::Done {
            return Ok(EncoderState::Done);
        }
        let Some(mut block) = self.blocks.next_block()? else {
            self.state = EncoderState::Done;
            return Ok(EncoderState::Done);
        };
        self.report.blocks += 1;
        self.report.frames += block.frames() as u64;

        if self.state == EncoderState::Streaming && self.analyzer.is_full(&block) {
            let mut spectrum = self.analyzer.spectrum(&block);
            if self.analyzer.classify(&spectrum).is_active() {
                let bit = self.bits[self.next_bit];
                if bit {
                    self.analyzer.mark(&mut spectrum);
                    self.analyzer.plan().inverse(&mut spectrum);
                    let reference: Vec<f64> =
                        spectrum.iter().map(|c| c.re.clamp(-1.0, 1.0)).collect();
                    block.set_channel(self.analyzer.params().reference_channel, &reference);
                    self.report.marked_blocks += 1;
                }
                trace!("block {}: bit {} = {}", self.report.blocks - 1, self.next_bit, bit as u8);
                self.next_bit += 1;
                self.report.bits_embedded += 1;
                if self.next_bit == self.bits.len() {
                    debug!("payload complete after {} blocks", self.report.blocks);
                    self.state = EncoderState::Passthrough;
                }
            } else {
                self.report.silent_blocks += 1;
            }
        }

        self.sink.write(block.samples())?;
        Ok(self.state)
    }

    /// Run to the end of the input.
    ///
    /// # Errors
    /// [`StegoError::InsufficientCapacity`] if the input ran out with bits
    /// left, which only happens when the source was not prepared.
    pub fn run(mut self) -> Result<EncodeReport> {
        while self.step()? != EncoderState::Done {}
        if self.next_bit < self.bits.len() {
            return Err(StegoError::InsufficientCapacity {
                needed: self.bits.len(),
                available: self.next_bit,
            });
        }
        Ok(self.report)
    }
}

/// Check that `payload_bits` fit into `source` and rewind it for encoding.
///
/// Nothing is written. Returns the analyzer for the stream.
///
/// # Errors
/// - `UnsupportedFormat` if the sample rate cannot carry the embedding bin.
/// - [`StegoError::InvalidParams`] if `params` are inconsistent.
/// - [`StegoError::InsufficientCapacity`] if there are fewer ACTIVE blocks
///   than payload bits.
pub fn prepare_encode<S: SampleSource + ?Sized>(
    source: &mut S,
    payload_bits: usize,
    params: &StegoParams,
) -> Result<Analyzer> {
    let analyzer = Analyzer::new(*params, source.spec())?;
    if payload_bits == 0 {
        return Ok(analyzer);
    }

    let estimate = estimate_capacity(source.frames(), params);
    if payload_bits > estimate {
        return Err(StegoError::InsufficientCapacity {
            needed: payload_bits,
            available: estimate,
        });
    }

    let available = count_active_blocks(source, &analyzer, Some(payload_bits))?;
    source.rewind()?;
    if available < payload_bits {
        return Err(StegoError::InsufficientCapacity {
            needed: payload_bits,
            available,
        });
    }
    debug!("capacity ok: {payload_bits} bits, estimate {estimate}");
    Ok(analyzer)
}

/// Embed `bits` into `source`, writing every frame to `sink`.
///
/// The source must be positioned at its first sample. The sink is not
/// touched unless the capacity check passes.
pub fn encode_bits<S, K>(
    source: &mut S,
    sink: &mut K,
    bits: &[bool],
    params: &StegoParams,
) -> Result<EncodeReport>
where
    S: SampleSource + ?Sized,
    K: SampleSink + ?Sized,
{
    let analyzer = prepare_encode(source, bits.len(), params)?;
    let bin = analyzer.embed_bin();
    info!(
        "embedding {} bits at bin {} ({:.1} Hz)",
        bits.len(),
        bin.index,
        bin.frequency_hz
    );
    let report = Encoder::new(source, sink, analyzer, bits).run()?;
    info!(
        "encoded {} frames: {} bits in {} blocks ({} silent skipped)",
        report.frames, report.bits_embedded, report.blocks, report.silent_blocks
    );
    Ok(report)
}

// ──────────────────────────────────────────────────────────────────────────
// Decoder
// ──────────────────────────────────────────────────────────────────────────

/// Pulls payload bits out of a stream, one per ACTIVE full block.
pub struct BitExtractor<'a, S: ?Sized> {
    blocks: BlockReader<'a, S>,
    analyzer: Analyzer,
    recovered: usize,
}

impl<'a, S: SampleSource + ?Sized> BitExtractor<'a, S> {
    pub fn new(source: &'a mut S, params: &StegoParams) -> Result<Self> {
        let analyzer = Analyzer::new(*params, source.spec())?;
        Ok(Self {
            blocks: BlockReader::new(source, params.block_frames),
            analyzer,
            recovered: 0,
        })
    }

    /// Bits handed out so far.
    pub fn recovered(&self) -> usize {
        self.recovered
    }

    /// Next bit, or `None` when no ACTIVE full block remains.
    pub fn next_bit(&mut self) -> Result<Option<bool>> {
        while let Some(block) = self.blocks.next_block()? {
            if !self.analyzer.is_full(&block) {
                return Ok(None);
            }
            let spectrum = self.analyzer.spectrum(&block);
            if !self.analyzer.classify(&spectrum).is_active() {
                continue;
            }
            let bit = self.analyzer.embed_magnitude(&spectrum) > self.analyzer.params().detection_threshold;
            self.recovered += 1;
            return Ok(Some(bit));
        }
        Ok(None)
    }

    /// Next 8 bits as a byte, or `None` if the stream ends first.
    pub fn next_byte(&mut self) -> Result<Option<u8>> {
        let mut bits = [false; 8];
        for slot in bits.iter_mut() {
            match self.next_bit()? {
                Some(bit) => *slot = bit,
                None => return Ok(None),
            }
        }
        Ok(Some(pack_byte(&bits)))
    }
}

/// Recover exactly `count` bits.
///
/// # Errors
/// [`StegoError::PrematureEnd`] if fewer ACTIVE blocks remain. Counts above
/// the number of full blocks in the declared length fail before any read.
pub fn decode_bits<S: SampleSource + ?Sized>(
    source: &mut S,
    count: usize,
    params: &StegoParams,
) -> Result<Vec<bool>> {
    let estimate = estimate_capacity(source.frames(), params);
    if count > estimate {
        return Err(StegoError::PrematureEnd {
            expected: count,
            recovered: 0,
        });
    }
    let mut extractor = BitExtractor::new(source, params)?;
    let mut bits = Vec::with_capacity(count);
    while bits.len() < count {
        match extractor.next_bit()? {
            Some(bit) => bits.push(bit),
            None => {
                return Err(StegoError::PrematureEnd {
                    expected: count,
                    recovered: bits.len(),
                })
            }
        }
    }
    debug!("decoded {count} bits");
    Ok(bits)
}

/// Recover `len` bytes of binary payload.
pub fn decode_bytes<S: SampleSource + ?Sized>(
    source: &mut S,
    len: usize,
    params: &StegoParams,
) -> Result<Vec<u8>> {
    let bits = decode_bits(source, byte_bits(len)?, params)?;
    Ok(bits_to_bytes(&bits))
}

/// Recover `len` bytes and interpret them as UTF-8 text.
pub fn decode_text<S: SampleSource + ?Sized>(
    source: &mut S,
    len: usize,
    params: &StegoParams,
) -> Result<String> {
    let bits = decode_bits(source, byte_bits(len)?, params)?;
    bits_to_text(&bits)
}

/// Bit count for `len` bytes; no stream can hold more than `usize::MAX` bits.
fn byte_bits(len: usize) -> Result<usize> {
    len.checked_mul(8).ok_or(StegoError::PrematureEnd {
        expected: usize::MAX,
        recovered: 0,
    })
}

/// Recover text up to its NUL terminator.
///
/// # Errors
/// [`StegoError::PrematureEnd`] if the stream ends before a terminator.
pub fn decode_terminated_text<S: SampleSource + ?Sized>(
    source: &mut S,
    params: &StegoParams,
) -> Result<String> {
    let mut extractor = BitExtractor::new(source, params)?;
    let mut bytes = Vec::new();
    loop {
        match extractor.next_byte()? {
            Some(TEXT_TERMINATOR) => break,
            Some(byte) => bytes.push(byte),
            None => {
                return Err(StegoError::PrematureEnd {
                    expected: (bytes.len() + 1) * 8,
                    recovered: extractor.recovered(),
                })
            }
        }
    }
    debug!("decoded {} text bytes", bytes.len());
    String::from_utf8(bytes).map_err(|_| StegoError::InvalidUtf8)
}
