// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasm-audio

//! Steganographic encoding and decoding of PCM audio.
//!
//! One payload bit rides in each non-silent block of 4096 frames: a `1` is a
//! fixed-magnitude component at a near-ultrasonic bin of the reference
//! channel, a `0` leaves the block alone. Silent blocks carry nothing and are
//! skipped identically by encoder and decoder.
//!
//! The generic pipeline (`encode_bits` / `decode_bits`) works on any
//! [`SampleSource`](crate::audio::SampleSource); the functions in this module
//! wrap it for WAV files.

pub mod error;
pub mod fft;
pub mod params;
pub mod classify;
pub mod bits;
pub mod block;
pub mod capacity;
mod pipeline;

pub use error::StegoError;
pub use params::StegoParams;
pub use capacity::{estimate_capacity, scan_capacity, CapacityInfo};
pub use pipeline::{
    decode_bits, decode_bytes, decode_terminated_text, decode_text, encode_bits, prepare_encode,
    BitExtractor, EncodeReport, Encoder, EncoderState,
};

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::audio::wav::{check_extension, WavSink, WavSource};
use crate::audio::{AudioError, SampleSink, SampleSource};
use error::Result;

/// Default output path for an encode: `<stem>-encoded.wav` next to `input`.
pub fn encoded_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio".to_string());
    input.with_file_name(format!("{stem}-encoded.wav"))
}

fn partial_path(output: &Path) -> PathBuf {
    let mut name = output.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".partial");
    output.with_file_name(name)
}

/// Embed `bits` into the WAV at `input`, writing the result to `output`.
///
/// Capacity is verified before `output` is created. The data is written to a
/// sibling `.partial` file and renamed into place once complete; on any error
/// that file is removed and `output` is left as it was.
///
/// # Errors
/// - `UnsupportedFormat` for non-WAV paths, float WAV, odd bit depths or
///   sample rates too low for the embedding frequency.
/// - [`StegoError::InsufficientCapacity`] if the audio has fewer non-silent
///   blocks than `bits`.
/// - I/O and header errors from either file.
pub fn encode_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    bits: &[bool],
    params: &StegoParams,
) -> Result<EncodeReport> {
    let (input, output) = (input.as_ref(), output.as_ref());
    check_extension(output)?;

    let mut source = WavSource::open(input)?;
    let analyzer = prepare_encode(&mut source, bits.len(), params)?;

    let partial = partial_path(output);
    let written = write_encoded(&mut source, &partial, analyzer, bits);
    source.close();
    match written {
        Ok(report) => {
            fs::rename(&partial, output).map_err(AudioError::from)?;
            debug!("wrote {}", output.display());
            Ok(report)
        }
        Err(e) => {
            if let Err(rm) = fs::remove_file(&partial) {
                if rm.kind() != std::io::ErrorKind::NotFound {
                    warn!("could not remove {}: {rm}", partial.display());
                }
            }
            Err(e)
        }
    }
}

fn write_encoded(
    source: &mut WavSource,
    path: &Path,
    analyzer: block::Analyzer,
    bits: &[bool],
) -> Result<EncodeReport> {
    let spec = *source.spec();
    let mut sink = WavSink::create(path, &spec)?;
    let report = Encoder::new(source, &mut sink, analyzer, bits).run()?;
    sink.finish()?;
    info!(
        "encoded {} frames: {} bits in {} blocks ({} silent skipped)",
        report.frames,
        report.bits_embedded,
        report.blocks,
        report.silent_blocks
    );
    Ok(report)
}

/// Embed `message` followed by a NUL terminator with [`StegoParams::V1`].
pub fn encode_message(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    message: &str,
) -> Result<EncodeReport> {
    let bits = bits::terminated_text_to_bits(message)?;
    encode_file(input, output, &bits, &StegoParams::V1)
}

/// Embed raw bytes with [`StegoParams::V1`]. The reader must know the length.
pub fn encode_bytes(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    payload: &[u8],
) -> Result<EncodeReport> {
    encode_file(input, output, &bits::bytes_to_bits(payload), &StegoParams::V1)
}

/// Recover `count` bits from the WAV at `input`.
pub fn decode_file_bits(
    input: impl AsRef<Path>,
    count: usize,
    params: &StegoParams,
) -> Result<Vec<bool>> {
    with_wav(input, |source| decode_bits(source, count, params))
}

/// Recover `len` raw bytes with [`StegoParams::V1`].
pub fn decode_file_bytes(input: impl AsRef<Path>, len: usize) -> Result<Vec<u8>> {
    with_wav(input, |source| decode_bytes(source, len, &StegoParams::V1))
}

/// Recover NUL-terminated text with [`StegoParams::V1`].
pub fn decode_message(input: impl AsRef<Path>) -> Result<String> {
    with_wav(input, |source| decode_terminated_text(source, &StegoParams::V1))
}

/// Exact capacity of the WAV at `input`.
pub fn file_capacity(input: impl AsRef<Path>, params: &StegoParams) -> Result<CapacityInfo> {
    with_wav(input, |source| scan_capacity(source, params))
}

/// Open `input`, run `f` on it and close it again, whatever `f` returned.
fn with_wav<T>(
    input: impl AsRef<Path>,
    f: impl FnOnce(&mut WavSource) -> Result<T>,
) -> Result<T> {
    let mut source = WavSource::open(input)?;
    let result = f(&mut source);
    source.close();
    result
}
