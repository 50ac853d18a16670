// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasm-audio

//! PCM sample access.
//!
//! Turns raw audio bytes of any channel count, sample width (8/16/24/32-bit),
//! signedness and byte order into normalized `f64` samples and back. The
//! container layer (`wav`) only parses headers; sample data always flows
//! through the streaming codec in `stream`.
//!
//! Everything here is pull-based and streaming: a [`SampleSource`] hands out
//! interleaved samples on demand and a [`SampleSink`] accepts them, so at most
//! one block of audio is held in memory at a time.

pub mod error;
pub mod sample;
pub mod stream;
pub mod wav;

pub use error::AudioError;
pub use sample::{ByteOrder, PcmLayout, SampleWidth};

use error::Result;

/// Format metadata of an audio stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSpec {
    pub channels: u16,
    pub sample_rate: u32,
    pub layout: PcmLayout,
    /// Declared length in frames (one sample per channel).
    pub frames: u64,
}

impl AudioSpec {
    pub fn bit_depth(&self) -> u16 {
        self.layout.width.bits()
    }

    /// Bytes in one frame across all channels.
    pub fn frame_bytes(&self) -> usize {
        self.layout.bytes_per_sample() * self.channels as usize
    }

    /// Declared length in individual samples (`frames * channels`).
    pub fn samples_len(&self) -> u64 {
        self.frames * self.channels as u64
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames as f64 / self.sample_rate as f64
    }
}

/// Pull-based stream of interleaved, normalized samples.
pub trait SampleSource {
    fn spec(&self) -> &AudioSpec;

    /// Fill `buf` with as many samples as are available, up to its length.
    /// Returns the number written; `0` means end of stream.
    fn read(&mut self, buf: &mut [f64]) -> Result<usize>;

    /// Seek back to the first sample so the stream can be walked again.
    fn rewind(&mut self) -> Result<()>;

    /// Declared length in frames.
    fn frames(&self) -> u64 {
        self.spec().frames
    }

    /// Read a single sample, or `None` at end of stream.
    fn next_sample(&mut self) -> Result<Option<f64>> {
        let mut one = [0.0f64];
        match self.read(&mut one)? {
            0 => Ok(None),
            _ => Ok(Some(one[0])),
        }
    }

    /// Read up to `buf.len()` samples, looping over short reads.
    /// Returns fewer only at end of stream.
    fn read_full(&mut self, buf: &mut [f64]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.read(&mut buf[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        Ok(filled)
    }
}

/// Push-based consumer of interleaved, normalized samples.
pub trait SampleSink {
    fn write(&mut self, samples: &[f64]) -> Result<()>;

    /// Flush buffered data and close the underlying handle.
    fn finish(self) -> Result<()>
    where
        Self: Sized;
}

impl SampleSink for Vec<f64> {
    fn write(&mut self, samples: &[f64]) -> Result<()> {
        self.extend_from_slice(samples);
        Ok(())
    }

    fn finish(self) -> Result<()> {
        Ok(())
    }
}
