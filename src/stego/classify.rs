// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasm-audio

//! Silent/active block classification.
//!
//! A block is ACTIVE when the largest magnitude among its positive-frequency
//! bins (DC excluded) exceeds the silence threshold. Encoder and decoder run
//! the same test: unmodified blocks are byte-identical on both sides, and a
//! block carrying a `1` holds a bin at the embedded magnitude, which is above
//! the threshold, so the verdicts always agree.

use num_complex::Complex64;

use super::fft::magnitude;
use super::params::StegoParams;

/// Per-block verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Silent,
    Active,
}

impl Classification {
    pub fn is_active(self) -> bool {
        self == Self::Active
    }
}

/// Peak magnitude over bins `1..N/2`.
pub fn peak_magnitude(spectrum: &[Complex64]) -> f64 {
    let half = spectrum.len() / 2;
    spectrum
        .iter()
        .take(half)
        .skip(1)
        .map(|&c| magnitude(c))
        .fold(0.0, f64::max)
}

/// Classify a block from the spectrum of its reference channel.
pub fn classify(spectrum: &[Complex64], params: &StegoParams) -> Classification {
    if peak_magnitude(spectrum) > params.silence_threshold {
        Classification::Active
    } else {
        Classification::Silent
    }
}
