// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasm-audio

//! Block walking and per-block spectral analysis.
//!
//! Encoder, decoder and the capacity scan all walk a stream the same way:
//! fixed-size blocks of whole frames, the last one possibly shorter, and the
//! spectrum of the reference channel for each full block.

use log::warn;
use num_complex::Complex64;

use super::classify::{classify, Classification};
use super::error::Result;
use super::fft::{fit_length, magnitude, mirror_bin, FftPlan, FrequencyBin};
use super::params::StegoParams;
use crate::audio::{AudioSpec, SampleSource};

/// Interleaved samples for a run of whole frames.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    samples: Vec<f64>,
    channels: usize,
}

impl Block {
    pub fn new(samples: Vec<f64>, channels: usize) -> Self {
        debug_assert!(channels > 0 && samples.len() % channels == 0);
        Self { samples, channels }
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// De-interleave one channel.
    pub fn channel(&self, ch: usize) -> Vec<f64> {
        self.samples.iter().skip(ch).step_by(self.channels).copied().collect()
    }

    /// Overwrite one channel in place; other channels are left as they are.
    pub fn set_channel(&mut self, ch: usize, values: &[f64]) {
        for (dst, &v) in self.samples.iter_mut().skip(ch).step_by(self.channels).zip(values) {
            *dst = v;
        }
    }
}

/// Reads a [`SampleSource`] in blocks of `block_frames` frames.
///
/// Trailing samples that do not complete a frame are dropped with a warning;
/// the container cannot represent them.
pub struct BlockReader<'a, S: ?Sized> {
    source: &'a mut S,
    block_frames: usize,
    channels: usize,
    finished: bool,
}

impl<'a, S: SampleSource + ?Sized> BlockReader<'a, S> {
    pub fn new(source: &'a mut S, block_frames: usize) -> Self {
        let channels = source.spec().channels.max(1) as usize;
        Self {
            source,
            block_frames,
            channels,
            finished: false,
        }
    }

    /// Next block, or `None` once the stream is exhausted.
    pub fn next_block(&mut self) -> Result<Option<Block>> {
        if self.finished {
            return Ok(None);
        }
        let want = self.block_frames * self.channels;
        let mut samples = vec![0.0f64; want];
        let got = self.source.read_full(&mut samples)?;
        if got < want {
            self.finished = true;
        }

        let whole = got / self.channels * self.channels;
        if whole < got {
            warn!("dropping {} samples of an incomplete trailing frame", got - whole);
        }
        if whole == 0 {
            return Ok(None);
        }
        samples.truncate(whole);
        Ok(Some(Block::new(samples, self.channels)))
    }
}

/// Per-run analysis state: FFT plan and embedding bin for one stream.
pub struct Analyzer {
    params: StegoParams,
    plan: FftPlan,
    bin: FrequencyBin,
}

impl Analyzer {
    /// Validate `params` against the stream and prepare the transform.
    pub fn new(params: StegoParams, spec: &AudioSpec) -> Result<Self> {
        params.validate_for(spec.channels)?;
        let bin = params.embed_bin(spec.sample_rate)?;
        let plan = FftPlan::new(params.block_frames)?;
        Ok(Self { params, plan, bin })
    }

    pub fn params(&self) -> &StegoParams {
        &self.params
    }

    pub fn embed_bin(&self) -> FrequencyBin {
        self.bin
    }

    pub fn plan(&self) -> &FftPlan {
        &self.plan
    }

    /// Only full-length blocks carry payload bits.
    pub fn is_full(&self, block: &Block) -> bool {
        block.frames() == self.params.block_frames
    }

    /// Forward spectrum of the reference channel.
    pub fn spectrum(&self, block: &Block) -> Vec<Complex64> {
        let reference = block.channel(self.params.reference_channel);
        let mut data = fit_length(&reference, self.plan.len());
        self.plan.forward(&mut data);
        data
    }

    pub fn classify(&self, spectrum: &[Complex64]) -> Classification {
        classify(spectrum, &self.params)
    }

    /// Magnitude at the embedding bin.
    pub fn embed_magnitude(&self, spectrum: &[Complex64]) -> f64 {
        magnitude(spectrum[self.bin.index])
    }

    /// Force the embedding bin and its mirror to the embedded magnitude.
    pub fn mark(&self, spectrum: &mut [Complex64]) {
        let value = Complex64::new(self.params.embed_magnitude, 0.0);
        spectrum[self.bin.index] = value;
        spectrum[mirror_bin(self.bin.index, spectrum.len())] = value;
    }
}
