// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasm-audio

//! Payload ↔ bit sequence framing.
//!
//! Bits are MSB first within each byte. There is no length prefix: binary
//! payloads rely on an externally known byte count, text may carry a single
//! NUL terminator so the decoder can stop on its own.

use super::error::{Result, StegoError};

/// Byte that ends a terminated text payload.
pub const TEXT_TERMINATOR: u8 = 0x00;

/// Convert bytes to bits, MSB first.
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<bool> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for &byte in bytes {
        for bit_pos in (0..8).rev() {
            bits.push((byte >> bit_pos) & 1 == 1);
        }
    }
    bits
}

/// Convert bits (MSB first) back to bytes.
/// Pads the last byte with zero bits if `bits.len()` is not a multiple of 8.
pub fn bits_to_bytes(bits: &[bool]) -> Vec<u8> {
    bits.chunks(8).map(pack_byte).collect()
}

/// Pack up to 8 bits (MSB first) into one byte.
pub fn pack_byte(bits: &[bool]) -> u8 {
    bits.iter()
        .take(8)
        .enumerate()
        .fold(0u8, |acc, (i, &b)| acc | ((b as u8) << (7 - i)))
}

/// UTF-8 bytes of `text` as bits, without terminator.
pub fn text_to_bits(text: &str) -> Vec<bool> {
    bytes_to_bits(text.as_bytes())
}

/// UTF-8 bytes of `text` followed by [`TEXT_TERMINATOR`], as bits.
///
/// # Errors
/// [`StegoError::InvalidMessage`] if `text` already contains a NUL.
pub fn terminated_text_to_bits(text: &str) -> Result<Vec<bool>> {
    if text.as_bytes().contains(&TEXT_TERMINATOR) {
        return Err(StegoError::InvalidMessage("text must not contain NUL"));
    }
    let mut bits = text_to_bits(text);
    bits.extend(bytes_to_bits(&[TEXT_TERMINATOR]));
    Ok(bits)
}

/// Decode bits as UTF-8 text.
pub fn bits_to_text(bits: &[bool]) -> Result<String> {
    String::from_utf8(bits_to_bytes(bits)).map_err(|_| StegoError::InvalidUtf8)
}
