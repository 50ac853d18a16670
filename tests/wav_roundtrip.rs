// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasm-audio

//! Round-trip integration tests for WAV encode/decode.

use std::f64::consts::PI;
use std::path::Path;

use phasm_audio::stego::bits::{bits_to_text, bytes_to_bits, text_to_bits};
use phasm_audio::{
    decode_file_bits, decode_file_bytes, decode_message, encode_bytes, encode_file,
    encode_message, file_capacity, StegoError, StegoParams,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

const BLOCK: usize = 4096;

/// Write `frames` of audio; `f(frame, channel)` gives the normalized value.
fn write_wav(
    path: &Path,
    bits: u16,
    channels: u16,
    sample_rate: u32,
    frames: usize,
    mut f: impl FnMut(usize, usize) -> f64,
) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: bits,
        sample_format: hound::SampleFormat::Int,
    };
    let max = ((1i64 << (bits - 1)) - 1) as f64;
    let mut w = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..frames {
        for ch in 0..channels as usize {
            let v = (f(i, ch) * max).round().clamp(-max, max) as i32;
            w.write_sample(v).unwrap();
        }
    }
    w.finalize().unwrap();
}

fn read_ints(path: &Path) -> (hound::WavSpec, Vec<i32>) {
    let mut r = hound::WavReader::open(path).unwrap();
    let spec = r.spec();
    let samples = r.samples::<i32>().map(|s| s.unwrap()).collect();
    (spec, samples)
}

fn sine(freq: f64, rate: u32, amp: f64) -> impl Fn(usize, usize) -> f64 {
    move |i, _| amp * (2.0 * PI * freq * i as f64 / rate as f64).sin()
}

#[test]
fn hi_in_five_second_sine() {
    let dir = tempfile::tempdir().unwrap();
    let cover = dir.path().join("sine.wav");
    let stego = dir.path().join("sine-encoded.wav");
    write_wav(&cover, 16, 1, 44_100, 5 * 44_100, sine(440.0, 44_100, 0.5));

    let bits = text_to_bits("HI");
    assert_eq!(bits.len(), 16);
    let report = encode_file(&cover, &stego, &bits, &StegoParams::V1).unwrap();
    assert_eq!(report.bits_embedded, 16);
    assert_eq!(report.frames, 5 * 44_100);

    let decoded = decode_file_bits(&stego, 16, &StegoParams::V1).unwrap();
    assert_eq!(bits_to_text(&decoded).unwrap(), "HI");

    let (spec_in, original) = read_ints(&cover);
    let (spec_out, encoded) = read_ints(&stego);
    assert_eq!(spec_in, spec_out);
    assert_eq!(original.len(), encoded.len());

    // Only blocks carrying a 1 differ; everything after the payload is identical.
    for (b, (a, e)) in original.chunks(BLOCK).zip(encoded.chunks(BLOCK)).enumerate() {
        let marked = b < bits.len() && bits[b];
        assert_eq!(a != e, marked, "block {b}");
    }
}

#[test]
fn terminated_text_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let cover = dir.path().join("tone.wav");
    let stego = dir.path().join("tone-encoded.wav");
    write_wav(&cover, 16, 1, 48_000, 6 * 48_000, sine(523.25, 48_000, 0.4));

    encode_message(&cover, &stego, "héllo").unwrap();
    assert_eq!(decode_message(&stego).unwrap(), "héllo");
}

#[test]
fn all_silence_has_no_capacity() {
    let dir = tempfile::tempdir().unwrap();
    let cover = dir.path().join("silence.wav");
    let stego = dir.path().join("silence-encoded.wav");
    write_wav(&cover, 16, 1, 44_100, 5 * 44_100, |_, _| 0.0);

    let err = encode_message(&cover, &stego, "HI").unwrap_err();
    assert!(matches!(err, StegoError::InsufficientCapacity { needed: 24, available: 0 }));
    assert!(!stego.exists());
    assert!(!dir.path().join("silence-encoded.wav.partial").exists());

    let info = file_capacity(&cover, &StegoParams::V1).unwrap();
    assert_eq!(info.full_blocks, 53);
    assert_eq!(info.active_blocks, 0);
}

#[test]
fn failed_encode_leaves_existing_output_alone() {
    let dir = tempfile::tempdir().unwrap();
    let cover = dir.path().join("short.wav");
    let stego = dir.path().join("out.wav");
    write_wav(&cover, 16, 1, 44_100, 3 * BLOCK, sine(440.0, 44_100, 0.5));
    std::fs::write(&stego, b"keep me").unwrap();

    let err = encode_message(&cover, &stego, "too long for three blocks").unwrap_err();
    assert!(matches!(err, StegoError::InsufficientCapacity { .. }));
    assert_eq!(std::fs::read(&stego).unwrap(), b"keep me");
}

#[test]
fn random_bits_round_trip() {
    let mut rng = ChaCha20Rng::seed_from_u64(0x5EED);
    let dir = tempfile::tempdir().unwrap();
    let cover = dir.path().join("mix.wav");
    let stego = dir.path().join("mix-encoded.wav");

    // Two tones plus a little noise; silent gaps every fifth block.
    let noise: Vec<f64> = (0..80 * BLOCK).map(|_| rng.gen_range(-0.01..0.01)).collect();
    write_wav(&cover, 24, 1, 44_100, 80 * BLOCK, |i, _| {
        if (i / BLOCK) % 5 == 4 {
            return 0.0;
        }
        let t = i as f64 / 44_100.0;
        0.2 * (2.0 * PI * 440.0 * t).sin() + 0.1 * (2.0 * PI * 1234.0 * t).sin() + noise[i]
    });

    let info = file_capacity(&cover, &StegoParams::V1).unwrap();
    assert_eq!(info.full_blocks, 80);
    assert_eq!(info.active_blocks, 64);

    for len in [1usize, 7, 33, 64] {
        let bits: Vec<bool> = (0..len).map(|_| rng.gen()).collect();
        let report = encode_file(&cover, &stego, &bits, &StegoParams::V1).unwrap();
        assert_eq!(report.bits_embedded, len);
        assert_eq!(decode_file_bits(&stego, len, &StegoParams::V1).unwrap(), bits, "len {len}");
    }

    let err = encode_file(&cover, &stego, &[true; 65], &StegoParams::V1).unwrap_err();
    assert!(matches!(err, StegoError::InsufficientCapacity { needed: 65, available: 64 }));
}

#[test]
fn passthrough_is_exact_for_every_width() {
    for bits in [8u16, 16, 24, 32] {
        let dir = tempfile::tempdir().unwrap();
        let cover = dir.path().join("cover.wav");
        let stego = dir.path().join("stego.wav");
        let frames = 12 * BLOCK + 777;
        write_wav(&cover, bits, 2, 44_100, frames, |i, ch| {
            let t = i as f64 / 44_100.0;
            0.45 * (2.0 * PI * (330.0 + 110.0 * ch as f64) * t).sin()
        });

        let payload = [0xC3u8];
        encode_bytes(&cover, &stego, &payload).unwrap();
        assert_eq!(decode_file_bytes(&stego, 1).unwrap(), payload, "{bits}-bit");

        let (_, a) = read_ints(&cover);
        let (_, b) = read_ints(&stego);
        assert_eq!(a.len(), b.len());
        // Past the eighth block nothing may change.
        assert_eq!(a[8 * BLOCK * 2..], b[8 * BLOCK * 2..], "{bits}-bit");
        // The second channel is never touched.
        let right = |v: &[i32]| v.iter().skip(1).step_by(2).copied().collect::<Vec<_>>();
        assert_eq!(right(&a), right(&b), "{bits}-bit");
        // Blocks carrying 0 bits are untouched too.
        let marked = bytes_to_bits(&payload);
        for (blk, &bit) in marked.iter().enumerate() {
            let range = blk * BLOCK * 2..(blk + 1) * BLOCK * 2;
            assert_eq!(a[range.clone()] != b[range], bit, "{bits}-bit block {blk}");
        }
    }
}

#[test]
fn frame_count_remainder_is_passed_through() {
    for extra in [0usize, 1000] {
        let dir = tempfile::tempdir().unwrap();
        let cover = dir.path().join("c.wav");
        let stego = dir.path().join("s.wav");
        let frames = 10 * BLOCK + extra;
        write_wav(&cover, 16, 1, 44_100, frames, sine(440.0, 44_100, 0.3));

        let info = file_capacity(&cover, &StegoParams::V1).unwrap();
        assert_eq!(info.full_blocks, 10);
        assert_eq!(info.active_blocks, 10);
        assert_eq!(info.tail_frames, extra);

        let bits = [true; 10];
        let report = encode_file(&cover, &stego, &bits, &StegoParams::V1).unwrap();
        assert_eq!(report.frames, frames as u64);
        assert_eq!(report.blocks, 10 + usize::from(extra > 0));

        let (_, a) = read_ints(&cover);
        let (_, b) = read_ints(&stego);
        assert_eq!(a.len(), b.len());
        assert_eq!(a[10 * BLOCK..], b[10 * BLOCK..]);
        assert_eq!(decode_file_bits(&stego, 10, &StegoParams::V1).unwrap(), bits);
        // Ten full blocks can never yield eleven bits; this fails before reading.
        assert!(matches!(
            decode_file_bits(&stego, 11, &StegoParams::V1),
            Err(StegoError::PrematureEnd { expected: 11, recovered: 0 })
        ));
    }
}

#[test]
fn unsupported_inputs_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let low = dir.path().join("low.wav");
    write_wav(&low, 16, 1, 22_050, 4 * BLOCK, sine(440.0, 22_050, 0.3));
    let err = encode_message(&low, dir.path().join("o.wav"), "x").unwrap_err();
    assert!(err.is_unsupported_format());

    let good = dir.path().join("good.wav");
    write_wav(&good, 16, 1, 44_100, 4 * BLOCK, sine(440.0, 44_100, 0.3));
    let err = encode_message(&good, dir.path().join("o.aiff"), "").unwrap_err();
    assert!(err.is_unsupported_format());

    let err = decode_message(dir.path().join("missing.wav")).unwrap_err();
    assert!(!err.is_unsupported_format());
}
