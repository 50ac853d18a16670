// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasm-audio

//! Streaming PCM codec.
//!
//! - [`PcmReader`]: bytes → samples. Pulls raw bytes from any `Read` and
//!   decodes them on demand. Bytes that do not complete a sample (short reads,
//!   odd-sized chunks) stay in an internal remainder for the next call.
//! - [`SampleBytes`]: samples → bytes as an `io::Read`. Pulls samples from a
//!   [`SampleSource`] only when the consumer asks for bytes, and keeps the
//!   unserved tail of the last encoded sample for the next call.
//! - [`PcmWriter`]: samples → bytes pushed into any `Write`.
//!
//! All three own their buffers; nothing is shared between instances.

use std::io::{self, Read, Seek, SeekFrom, Write};

use super::error::{AudioError, Result};
use super::sample::PcmLayout;
use super::{AudioSpec, SampleSink, SampleSource};

/// Pull-based PCM decoder over a byte reader.
///
/// Reads at most the declared data length (`spec.frames * frame_bytes`) from
/// `inner`, starting at its current position.
pub struct PcmReader<R> {
    inner: Option<R>,
    spec: AudioSpec,
    /// Position of the first sample byte in `inner`, used by `rewind`.
    start: u64,
    byte_limit: u64,
    bytes_pulled: u64,
    samples_read: u64,
    /// Buffered bytes not yet decoded (partial sample at the tail).
    pending: Vec<u8>,
}

impl<R: Read> PcmReader<R> {
    /// Wrap a reader positioned at the first sample byte.
    pub fn new(inner: R, spec: AudioSpec) -> Self {
        Self::with_start(inner, spec, 0)
    }

    /// Like [`new`](Self::new), recording `start` as the offset `rewind` seeks to.
    pub fn with_start(inner: R, spec: AudioSpec, start: u64) -> Self {
        let byte_limit = spec.samples_len() * spec.layout.bytes_per_sample() as u64;
        Self {
            inner: Some(inner),
            spec,
            start,
            byte_limit,
            bytes_pulled: 0,
            samples_read: 0,
            pending: Vec::new(),
        }
    }

    pub fn spec(&self) -> &AudioSpec {
        &self.spec
    }

    /// Samples handed out so far.
    pub fn samples_read(&self) -> u64 {
        self.samples_read
    }

    /// Bytes buffered but not yet decoded.
    pub fn pending_bytes(&self) -> usize {
        self.pending.len()
    }

    /// Samples left according to the declared length.
    pub fn remaining_samples(&self) -> u64 {
        self.spec.samples_len().saturating_sub(self.samples_read)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }

    /// Decode up to `buf.len()` samples. Returns `0` at end of stream or once
    /// closed. A trailing partial sample is never returned.
    pub fn read_samples(&mut self, buf: &mut [f64]) -> Result<usize> {
        let Some(inner) = self.inner.as_mut() else {
            return Ok(0);
        };
        let n = self.spec.layout.bytes_per_sample();
        let wanted = buf.len() * n;

        if self.pending.len() < wanted {
            let left = self.byte_limit.saturating_sub(self.bytes_pulled);
            let need = ((wanted - self.pending.len()) as u64).min(left) as usize;
            let at = self.pending.len();
            self.pending.resize(at + need, 0);
            let got = read_up_to(inner, &mut self.pending[at..])?;
            self.pending.truncate(at + got);
            self.bytes_pulled += got as u64;
        }

        let count = (self.pending.len() / n).min(buf.len());
        let layout = self.spec.layout;
        for (dst, chunk) in buf.iter_mut().zip(self.pending[..count * n].chunks_exact(n)) {
            *dst = layout.decode(chunk);
        }
        self.pending.drain(..count * n);
        self.samples_read += count as u64;
        Ok(count)
    }

    /// Read every remaining sample into one buffer.
    ///
    /// # Errors
    /// [`AudioError::StreamTooLong`] if the remaining declared length cannot
    /// be allocated as a single `Vec<f64>`.
    pub fn read_all(&mut self) -> Result<Vec<f64>> {
        let remaining = self.remaining_samples();
        let max = isize::MAX as u64 / std::mem::size_of::<f64>() as u64;
        if remaining > max {
            return Err(AudioError::StreamTooLong(remaining));
        }
        let mut out = vec![0.0f64; remaining as usize];
        let mut filled = 0;
        while filled < out.len() {
            let n = self.read_samples(&mut out[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        out.truncate(filled);
        Ok(out)
    }

    /// Release the underlying reader and drop any buffered bytes.
    /// Later reads return end of stream.
    pub fn close(&mut self) {
        self.inner = None;
        self.pending = Vec::new();
    }

    /// Consume the stream, returning the reader (if still open).
    pub fn into_inner(self) -> Option<R> {
        self.inner
    }
}

impl<R: Read + Seek> SampleSource for PcmReader<R> {
    fn spec(&self) -> &AudioSpec {
        &self.spec
    }

    fn read(&mut self, buf: &mut [f64]) -> Result<usize> {
        self.read_samples(buf)
    }

    fn rewind(&mut self) -> Result<()> {
        let inner = self.inner.as_mut().ok_or_else(|| {
            AudioError::Io(io::Error::new(io::ErrorKind::Other, "stream is closed"))
        })?;
        inner.seek(SeekFrom::Start(self.start))?;
        self.bytes_pulled = 0;
        self.samples_read = 0;
        self.pending.clear();
        Ok(())
    }
}

/// Read until `buf` is full or the reader reports EOF.
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn to_io(err: AudioError) -> io::Error {
    match err {
        AudioError::Io(e) => e,
        other => io::Error::new(io::ErrorKind::Other, other),
    }
}

/// Serve the samples of a [`SampleSource`] as packed PCM bytes.
///
/// Any `read` size is accepted: samples are encoded lazily and the bytes of a
/// sample only partly handed out are kept for the next call.
pub struct SampleBytes<S> {
    source: S,
    layout: PcmLayout,
    pending: Vec<u8>,
    scratch: Vec<f64>,
}

impl<S: SampleSource> SampleBytes<S> {
    pub fn new(source: S, layout: PcmLayout) -> Self {
        Self {
            source,
            layout,
            pending: Vec::new(),
            scratch: Vec::new(),
        }
    }

    /// Total byte length the source declares, in this adapter's layout.
    pub fn declared_len(&self) -> u64 {
        self.source.spec().samples_len() * self.layout.bytes_per_sample() as u64
    }

    pub fn into_inner(self) -> S {
        self.source
    }
}

impl<S: SampleSource> Read for SampleBytes<S> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }
        if self.pending.len() < out.len() {
            let n = self.layout.bytes_per_sample();
            let missing = out.len() - self.pending.len();
            self.scratch.resize(missing.div_ceil(n), 0.0);
            let got = self.source.read_full(&mut self.scratch).map_err(to_io)?;
            self.layout.encode_slice(&self.scratch[..got], &mut self.pending);
        }

        let len = out.len().min(self.pending.len());
        out[..len].copy_from_slice(&self.pending[..len]);
        self.pending.drain(..len);
        Ok(len)
    }
}

/// Push-based PCM encoder over a byte writer (headerless output).
pub struct PcmWriter<W: Write> {
    inner: W,
    layout: PcmLayout,
    buf: Vec<u8>,
    samples_written: u64,
}

impl<W: Write> PcmWriter<W> {
    pub fn new(inner: W, layout: PcmLayout) -> Self {
        Self {
            inner,
            layout,
            buf: Vec::new(),
            samples_written: 0,
        }
    }

    pub fn samples_written(&self) -> u64 {
        self.samples_written
    }

    /// Flush and hand back the writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<W: Write> SampleSink for PcmWriter<W> {
    fn write(&mut self, samples: &[f64]) -> Result<()> {
        self.buf.clear();
        self.layout.encode_slice(samples, &mut self.buf);
        self.inner.write_all(&self.buf)?;
        self.samples_written += samples.len() as u64;
        Ok(())
    }

    fn finish(mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}
