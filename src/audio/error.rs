// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasm-audio

//! Error types for PCM sample access and container I/O.

use thiserror::Error;

/// Errors raised while reading or writing PCM audio.
#[derive(Debug, Error)]
pub enum AudioError {
    /// Sample width, sample format or container not handled by this crate.
    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),

    /// `read_all` was asked for more samples than fit in one buffer.
    #[error("audio stream too long to hold in memory ({0} samples)")]
    StreamTooLong(u64),

    /// Underlying reader or writer failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// WAV header parsing or writing failed.
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}

pub type Result<T> = std::result::Result<T, AudioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_format_display() {
        let err = AudioError::UnsupportedFormat("5-byte samples".into());
        assert_eq!(err.to_string(), "unsupported audio format: 5-byte samples");
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "short");
        let err: AudioError = io.into();
        assert!(matches!(err, AudioError::Io(_)));
    }
}
