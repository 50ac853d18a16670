// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasm-audio

//! # phasm-audio
//!
//! Steganography engine for hiding short messages in uncompressed PCM audio.
//! Each non-silent block of 4096 frames carries one bit as a fixed-magnitude
//! component at a ~20 kHz bin of the reference channel. Silent blocks are
//! skipped, and everything after the payload is copied sample for sample.
//!
//! The PCM codec (`audio` module) handles 8/16/24/32-bit integer samples in
//! either byte order and streams them block by block. The steganography layer
//! (`stego` module) owns the transform, classifier, capacity scan and the
//! encode/decode pipeline.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use phasm_audio::{encode_message, decode_message};
//!
//! encode_message("voice.wav", "voice-encoded.wav", "HI").unwrap();
//! assert_eq!(decode_message("voice-encoded.wav").unwrap(), "HI");
//! ```

pub mod audio;
pub mod stego;

pub use audio::{AudioError, AudioSpec, ByteOrder, PcmLayout, SampleSink, SampleSource, SampleWidth};
pub use stego::{encode_file, encode_message, encode_bytes, decode_file_bits, decode_file_bytes, decode_message};
pub use stego::{encode_bits, decode_bits, decode_bytes, decode_text, decode_terminated_text};
pub use stego::{file_capacity, scan_capacity, estimate_capacity, CapacityInfo};
pub use stego::{encoded_path, EncodeReport, StegoError, StegoParams};
