// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasm-audio

//! WAV container adapter.
//!
//! `hound` parses and writes the RIFF headers. On the read side only the
//! header is taken from `hound`; the data chunk bytes go through
//! [`PcmReader`] so every sample passes the same codec as raw PCM input.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use log::debug;

use super::error::{AudioError, Result};
use super::sample::{PcmLayout, SampleWidth};
use super::stream::PcmReader;
use super::{AudioSpec, SampleSink, SampleSource};

/// Fail with `UnsupportedFormat` unless `path` has a `.wav` extension.
///
/// AIFF and AU are recognised by name only to give a clearer message.
pub fn check_extension(path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("wav") | Some("wave") => Ok(()),
        Some(other @ ("aif" | "aiff" | "au")) => Err(AudioError::UnsupportedFormat(format!(
            ".{other} containers are not supported, convert to WAV first"
        ))),
        _ => Err(AudioError::UnsupportedFormat(format!(
            "unrecognised file format for {}",
            path.display()
        ))),
    }
}

/// Length field of the `data` chunk whose payload starts at `start`, if the
/// bytes just before `start` are that chunk's header. Leaves `r` at `start`.
fn data_chunk_len<R: Read + Seek>(r: &mut R, start: u64) -> Result<Option<u64>> {
    let Some(header) = start.checked_sub(8) else {
        return Ok(None);
    };
    r.seek(SeekFrom::Start(header))?;
    let mut tag = [0u8; 4];
    r.read_exact(&mut tag)?;
    let len = r.read_u32::<LittleEndian>()?;
    r.seek(SeekFrom::Start(start))?;
    Ok((&tag == b"data").then_some(len as u64))
}

/// Fail unless the data chunk holds samples packed at the declared width.
///
/// WAVE_FORMAT_EXTENSIBLE allows e.g. 24 valid bits in 4-byte containers;
/// the header then reports 24 bits while each sample occupies 4 bytes.
fn check_container(data_len: u64, spec: &AudioSpec) -> Result<()> {
    let frame_bytes = spec.frame_bytes() as u64;
    if frame_bytes == 0 || data_len / frame_bytes == spec.frames {
        return Ok(());
    }
    Err(AudioError::UnsupportedFormat(format!(
        "{}-bit samples in wider containers ({data_len} data bytes for {} frames)",
        spec.bit_depth(),
        spec.frames
    )))
}

/// Streaming sample source over a PCM WAV file.
pub struct WavSource {
    reader: PcmReader<BufReader<File>>,
}

impl WavSource {
    /// Open a WAV file and position the stream at its first sample.
    ///
    /// # Errors
    /// - [`AudioError::UnsupportedFormat`] for non-`.wav` paths, floating-point
    ///   data, bit depths other than 8/16/24/32, or samples stored in
    ///   containers wider than their bit depth.
    /// - [`AudioError::Wav`] if the header cannot be parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        check_extension(path)?;

        let wav = hound::WavReader::open(path)?;
        let header = wav.spec();
        if header.sample_format != hound::SampleFormat::Int {
            return Err(AudioError::UnsupportedFormat("floating-point WAV".into()));
        }
        let width = SampleWidth::from_bits(header.bits_per_sample)?;
        let spec = AudioSpec {
            channels: header.channels,
            sample_rate: header.sample_rate,
            layout: PcmLayout::wav(width),
            frames: wav.duration() as u64,
        };

        let mut inner = wav.into_inner();
        let start = inner.stream_position()?;
        if let Some(data_len) = data_chunk_len(&mut inner, start)? {
            check_container(data_len, &spec)?;
        }
        debug!(
            "opened {}: {} ch, {} Hz, {}-bit, {} frames, data at byte {start}",
            path.display(),
            spec.channels,
            spec.sample_rate,
            spec.bit_depth(),
            spec.frames
        );

        Ok(Self {
            reader: PcmReader::with_start(inner, spec, start),
        })
    }

    /// Read every remaining sample. See [`PcmReader::read_all`].
    pub fn read_all(&mut self) -> Result<Vec<f64>> {
        self.reader.read_all()
    }

    /// Release the file handle.
    pub fn close(&mut self) {
        self.reader.close();
    }
}

impl SampleSource for WavSource {
    fn spec(&self) -> &AudioSpec {
        self.reader.spec()
    }

    fn read(&mut self, buf: &mut [f64]) -> Result<usize> {
        self.reader.read_samples(buf)
    }

    fn rewind(&mut self) -> Result<()> {
        self.reader.rewind()
    }
}

/// Sample sink writing a PCM WAV file with the same layout as a source.
pub struct WavSink {
    writer: hound::WavWriter<BufWriter<File>>,
    layout: PcmLayout,
}

impl WavSink {
    /// Create (or truncate) `path` for the given format. `spec.frames` is
    /// ignored; the header is sized from what is actually written.
    pub fn create(path: impl AsRef<Path>, spec: &AudioSpec) -> Result<Self> {
        let header = hound::WavSpec {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bit_depth(),
            sample_format: hound::SampleFormat::Int,
        };
        let writer = hound::WavWriter::create(path, header)?;
        Ok(Self {
            writer,
            layout: PcmLayout::wav(spec.layout.width),
        })
    }
}

impl SampleSink for WavSink {
    fn write(&mut self, samples: &[f64]) -> Result<()> {
        for &s in samples {
            // quantize() clamps to the width's range, so this always fits i32.
            self.writer.write_sample(self.layout.quantize(s) as i32)?;
        }
        Ok(())
    }

    fn finish(self) -> Result<()> {
        self.writer.finalize()?;
        Ok(())
    }
}
