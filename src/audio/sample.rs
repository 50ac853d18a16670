// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasm-audio

//! Per-sample conversion between packed PCM bytes and normalized `f64`.
//!
//! Integer samples are scaled by the signed maximum of their width
//! (`2^(bits-1) - 1`), so `i16::MAX` maps to exactly `1.0` and `i16::MIN`
//! lands just below `-1.0`. Samples are kept as `f64` so that every 32-bit
//! integer survives a decode/encode cycle unchanged.

use byteorder::{BigEndian, ByteOrder as _, LittleEndian};

use super::error::{AudioError, Result};

/// Supported integer sample widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleWidth {
    /// 8-bit (1 byte).
    W8,
    /// 16-bit (2 bytes).
    W16,
    /// 24-bit packed (3 bytes).
    W24,
    /// 32-bit (4 bytes).
    W32,
}

impl SampleWidth {
    /// Width from a byte count (1–4).
    pub fn from_bytes(bytes: usize) -> Result<Self> {
        match bytes {
            1 => Ok(Self::W8),
            2 => Ok(Self::W16),
            3 => Ok(Self::W24),
            4 => Ok(Self::W32),
            n => Err(AudioError::UnsupportedFormat(format!("{n}-byte samples"))),
        }
    }

    /// Width from a bit depth (8, 16, 24 or 32).
    pub fn from_bits(bits: u16) -> Result<Self> {
        if bits % 8 != 0 {
            return Err(AudioError::UnsupportedFormat(format!("{bits}-bit samples")));
        }
        Self::from_bytes(bits as usize / 8)
            .map_err(|_| AudioError::UnsupportedFormat(format!("{bits}-bit samples")))
    }

    pub const fn bytes(self) -> usize {
        match self {
            Self::W8 => 1,
            Self::W16 => 2,
            Self::W24 => 3,
            Self::W32 => 4,
        }
    }

    pub const fn bits(self) -> u16 {
        self.bytes() as u16 * 8
    }

    /// Largest positive value, used as the full-scale divisor.
    pub const fn max_value(self) -> i64 {
        (1i64 << (self.bits() - 1)) - 1
    }

    /// Most negative value.
    pub const fn min_value(self) -> i64 {
        -(1i64 << (self.bits() - 1))
    }

    /// One quantization step in normalized units.
    pub fn step(self) -> f64 {
        1.0 / self.max_value() as f64
    }
}

/// Byte order of packed samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    Little,
    Big,
}

/// How samples are laid out in a raw PCM byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PcmLayout {
    pub width: SampleWidth,
    pub order: ByteOrder,
    /// `false` for offset-binary data such as 8-bit WAV.
    pub signed: bool,
}

impl PcmLayout {
    pub const fn new(width: SampleWidth, order: ByteOrder, signed: bool) -> Self {
        Self { width, order, signed }
    }

    /// Signed little-endian layout of the given width.
    pub const fn signed_le(width: SampleWidth) -> Self {
        Self::new(width, ByteOrder::Little, true)
    }

    /// Layout WAV files use for a given width: little endian, unsigned at 8 bits.
    pub const fn wav(width: SampleWidth) -> Self {
        Self::new(width, ByteOrder::Little, !matches!(width, SampleWidth::W8))
    }

    pub const fn bytes_per_sample(&self) -> usize {
        self.width.bytes()
    }

    /// Offset added to a signed value to store it as offset binary.
    const fn unsigned_offset(&self) -> i64 {
        if self.signed {
            0
        } else {
            1i64 << (self.width.bits() - 1)
        }
    }

    /// Decode one packed sample. `bytes.len()` must equal the sample width.
    pub fn decode(&self, bytes: &[u8]) -> f64 {
        self.decode_int(bytes) as f64 / self.width.max_value() as f64
    }

    /// Decode one packed sample to its signed integer value.
    pub fn decode_int(&self, bytes: &[u8]) -> i64 {
        let n = self.width.bytes();
        debug_assert_eq!(bytes.len(), n);
        let raw = match self.order {
            ByteOrder::Little => LittleEndian::read_uint(bytes, n),
            ByteOrder::Big => BigEndian::read_uint(bytes, n),
        };

        if !self.signed {
            return raw as i64 - self.unsigned_offset();
        }

        // Two's-complement sign extension from the top bit of the width.
        let shift = 64 - self.width.bits() as u32;
        ((raw << shift) as i64) >> shift
    }

    /// Quantize a normalized sample to the nearest integer of this width.
    pub fn quantize(&self, sample: f64) -> i64 {
        let scaled = (sample * self.width.max_value() as f64).round();
        if scaled.is_nan() {
            return 0;
        }
        (scaled as i64).clamp(self.width.min_value(), self.width.max_value())
    }

    /// Encode one normalized sample into `out` (`out.len()` == sample width).
    pub fn encode(&self, sample: f64, out: &mut [u8]) {
        self.encode_int(self.quantize(sample), out);
    }

    /// Pack a signed integer sample (already within range) into `out`.
    pub fn encode_int(&self, value: i64, out: &mut [u8]) {
        let n = self.width.bytes();
        debug_assert_eq!(out.len(), n);
        let mask = (1u64 << (n * 8)) - 1;
        let raw = ((value + self.unsigned_offset()) as u64) & mask;
        match self.order {
            ByteOrder::Little => LittleEndian::write_uint(out, raw, n),
            ByteOrder::Big => BigEndian::write_uint(out, raw, n),
        }
    }

    /// Decode every complete sample in `bytes`, appending to `out`.
    /// Returns the number of bytes consumed; a trailing partial sample is left.
    pub fn decode_slice(&self, bytes: &[u8], out: &mut Vec<f64>) -> usize {
        let n = self.width.bytes();
        let whole = bytes.len() / n * n;
        out.extend(bytes[..whole].chunks_exact(n).map(|c| self.decode(c)));
        whole
    }

    /// Encode `samples`, appending the packed bytes to `out`.
    pub fn encode_slice(&self, samples: &[f64], out: &mut Vec<u8>) {
        let n = self.width.bytes();
        let start = out.len();
        out.resize(start + samples.len() * n, 0);
        for (chunk, &s) in out[start..].chunks_exact_mut(n).zip(samples) {
            self.encode(s, chunk);
        }
    }
}
