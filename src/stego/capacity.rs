// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasm-audio

//! Payload capacity of an audio stream.
//!
//! Two measures:
//! - [`estimate_capacity`]: full blocks in the declared length, an upper bound
//!   that needs no I/O;
//! - [`count_active_blocks`] / [`scan_capacity`]: a read-only pass counting the
//!   full blocks that classify ACTIVE, which is the exact number of bits the
//!   encoder can place.

use log::debug;

use super::block::{Analyzer, BlockReader};
use super::error::Result;
use super::params::StegoParams;
use crate::audio::SampleSource;

/// Result of a full capacity scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityInfo {
    /// Blocks of exactly `block_frames` frames.
    pub full_blocks: usize,
    /// Full blocks that classify ACTIVE; one payload bit each.
    pub active_blocks: usize,
    /// Frames in the trailing partial block (never used for payload).
    pub tail_frames: usize,
}

impl CapacityInfo {
    pub fn bits(&self) -> usize {
        self.active_blocks
    }

    /// Whole bytes of binary payload that fit.
    pub fn bytes(&self) -> usize {
        self.active_blocks / 8
    }

    /// Characters of NUL-terminated text that fit (bytes minus terminator).
    pub fn text_bytes(&self) -> usize {
        self.bytes().saturating_sub(1)
    }

    pub fn silent_blocks(&self) -> usize {
        self.full_blocks - self.active_blocks
    }
}

/// Upper bound on payload bits: full blocks in `frames`.
pub fn estimate_capacity(frames: u64, params: &StegoParams) -> usize {
    let blocks = frames / params.block_frames as u64;
    usize::try_from(blocks).unwrap_or(usize::MAX)
}

/// Count ACTIVE full blocks from the current position, stopping early once
/// `limit` is reached. Leaves the source wherever the walk stopped.
pub fn count_active_blocks<S: SampleSource + ?Sized>(
    source: &mut S,
    analyzer: &Analyzer,
    limit: Option<usize>,
) -> Result<usize> {
    let limit = limit.unwrap_or(usize::MAX);
    let mut active = 0usize;
    let mut blocks = BlockReader::new(source, analyzer.params().block_frames);
    while active < limit {
        let Some(block) = blocks.next_block()? else {
            break;
        };
        if !analyzer.is_full(&block) {
            break;
        }
        let spectrum = analyzer.spectrum(&block);
        if analyzer.classify(&spectrum).is_active() {
            active += 1;
        }
    }
    Ok(active)
}

/// Walk the whole stream and report its exact capacity, then rewind it.
pub fn scan_capacity<S: SampleSource + ?Sized>(
    source: &mut S,
    params: &StegoParams,
) -> Result<CapacityInfo> {
    let analyzer = Analyzer::new(*params, source.spec())?;
    let mut info = CapacityInfo { full_blocks: 0, active_blocks: 0, tail_frames: 0 };

    let mut blocks = BlockReader::new(&mut *source, params.block_frames);
    while let Some(block) = blocks.next_block()? {
        if !analyzer.is_full(&block) {
            info.tail_frames = block.frames();
            break;
        }
        info.full_blocks += 1;
        let spectrum = analyzer.spectrum(&block);
        if analyzer.classify(&spectrum).is_active() {
            info.active_blocks += 1;
        }
    }
    source.rewind()?;

    debug!(
        "capacity scan: {} full blocks, {} active, {} tail frames",
        info.full_blocks, info.active_blocks, info.tail_frames
    );
    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_counts_full_blocks() {
        let p = StegoParams::V1;
        assert_eq!(estimate_capacity(0, &p), 0);
        assert_eq!(estimate_capacity(4095, &p), 0);
        assert_eq!(estimate_capacity(4096, &p), 1);
        assert_eq!(estimate_capacity(44_100 * 5, &p), 53);
    }

    #[test]
    fn info_derived_sizes() {
        let info = CapacityInfo { full_blocks: 60, active_blocks: 53, tail_frames: 12 };
        assert_eq!(info.bits(), 53);
        assert_eq!(info.bytes(), 6);
        assert_eq!(info.text_bytes(), 5);
        assert_eq!(info.silent_blocks(), 7);

        let empty = CapacityInfo { full_blocks: 0, active_blocks: 0, tail_frames: 0 };
        assert_eq!(empty.text_bytes(), 0);
    }
}
