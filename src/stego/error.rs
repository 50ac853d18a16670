// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasm-audio

//! Error types for the steganography pipeline.
//!
//! [`StegoError`] covers all failure modes from sample access through
//! capacity checks and payload recovery.

use thiserror::Error;

use crate::audio::AudioError;

/// Errors that can occur during steganographic encoding or decoding.
#[derive(Debug, Error)]
pub enum StegoError {
    /// Reading or writing the audio failed, or its format is unsupported.
    #[error(transparent)]
    Audio(#[from] AudioError),

    /// The payload needs more ACTIVE blocks than the audio provides.
    #[error("audio too short for the message: {needed} bits needed, room for {available}")]
    InsufficientCapacity { needed: usize, available: usize },

    /// The stream ended before the expected number of bits was recovered.
    #[error("audio ended after {recovered} of {expected} payload bits")]
    PrematureEnd { expected: usize, recovered: usize },

    /// Protocol parameters are inconsistent.
    #[error("invalid parameters: {0}")]
    InvalidParams(&'static str),

    /// The message cannot be framed (e.g. text containing NUL).
    #[error("invalid message: {0}")]
    InvalidMessage(&'static str),

    /// The recovered bytes are not valid UTF-8.
    #[error("extracted text is not valid UTF-8")]
    InvalidUtf8,
}

impl StegoError {
    /// `true` for format errors the caller cannot fix by retrying.
    pub fn is_unsupported_format(&self) -> bool {
        matches!(self, Self::Audio(AudioError::UnsupportedFormat(_)))
    }
}

pub type Result<T> = std::result::Result<T, StegoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = StegoError::InsufficientCapacity { needed: 16, available: 3 };
        assert_eq!(err.to_string(), "audio too short for the message: 16 bits needed, room for 3");

        let err = StegoError::PrematureEnd { expected: 8, recovered: 5 };
        assert!(err.to_string().contains("5 of 8"));
    }

    #[test]
    fn audio_errors_pass_through() {
        let err: StegoError = AudioError::UnsupportedFormat("x".into()).into();
        assert!(err.is_unsupported_format());
        assert_eq!(err.to_string(), "unsupported audio format: x");
    }
}
