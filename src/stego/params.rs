// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasm-audio

//! Protocol parameters shared by encoder and decoder.
//!
//! These values are effectively the wire format: a file encoded with one set
//! can only be decoded with the same set. They are grouped in one versioned
//! struct so neither side can drift on its own.

use super::error::{Result, StegoError};
use super::fft::{nearest_bin, FrequencyBin};
use crate::audio::AudioError;

/// Fixed constants of the embedding scheme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StegoParams {
    /// Protocol revision these constants belong to.
    pub version: u8,
    /// Frames per analysis block; also the transform length (power of two).
    pub block_frames: usize,
    /// Target embedding frequency, snapped to the nearest bin.
    pub embed_frequency_hz: f64,
    /// Magnitude forced into the embedding bin for a `1` bit.
    pub embed_magnitude: f64,
    /// Peak spectral magnitude at or below which a block counts as silent.
    pub silence_threshold: f64,
    /// Embedding-bin magnitude above which a bit decodes as `1`.
    pub detection_threshold: f64,
    /// Channel analysed and modified in every block.
    pub reference_channel: usize,
}

impl StegoParams {
    /// Version 1 of the scheme.
    pub const V1: Self = Self {
        version: 1,
        block_frames: 4096,
        embed_frequency_hz: 20_000.0,
        embed_magnitude: 15.0,
        silence_threshold: 1.0,
        detection_threshold: 7.5,
        reference_channel: 0,
    };

    /// Check internal consistency.
    ///
    /// The detection threshold must sit between the silence threshold and the
    /// embedded magnitude, otherwise an embedded `1` could classify as silent
    /// or fail detection.
    pub fn validate(&self) -> Result<()> {
        if self.block_frames < 2 || !self.block_frames.is_power_of_two() {
            return Err(StegoError::InvalidParams("block size must be a power of two >= 2"));
        }
        if !(self.embed_frequency_hz > 0.0) {
            return Err(StegoError::InvalidParams("embedding frequency must be positive"));
        }
        if !(self.silence_threshold >= 0.0
            && self.silence_threshold < self.detection_threshold
            && self.detection_threshold < self.embed_magnitude)
        {
            return Err(StegoError::InvalidParams(
                "thresholds must satisfy silence < detection < embedded magnitude",
            ));
        }
        Ok(())
    }

    /// Check the parameters against a stream's channel count.
    pub fn validate_for(&self, channels: u16) -> Result<()> {
        self.validate()?;
        if self.reference_channel >= channels as usize {
            return Err(StegoError::InvalidParams("reference channel out of range"));
        }
        Ok(())
    }

    /// Bin carrying the payload at the given sample rate.
    ///
    /// # Errors
    /// `UnsupportedFormat` if the embedding frequency does not fall strictly
    /// between DC and Nyquist for `sample_rate`.
    pub fn embed_bin(&self, sample_rate: u32) -> Result<FrequencyBin> {
        let bin = nearest_bin(self.embed_frequency_hz, self.block_frames, sample_rate);
        if bin.index == 0 || bin.index >= self.block_frames / 2 {
            return Err(AudioError::UnsupportedFormat(format!(
                "sample rate {sample_rate} Hz cannot carry a {} Hz embedding tone",
                self.embed_frequency_hz
            ))
            .into());
        }
        Ok(bin)
    }
}

impl Default for StegoParams {
    fn default() -> Self {
        Self::V1
    }
}
