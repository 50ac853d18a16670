// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasm-audio

//! Radix-2 FFT/IFFT over `Complex64`, plus bin/frequency helpers.
//!
//! - In-place iterative Cooley-Tukey for power-of-2 lengths only
//! - Twiddle factors precomputed once per length in an [`FftPlan`] and reused
//!   for every block of a run
//! - The inverse applies the `1/N` normalization; the forward does not
//!
//! All arithmetic is `f64`.

use num_complex::Complex64;
use std::f64::consts::PI;

use super::error::{Result, StegoError};

/// A frequency bin of an N-point transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyBin {
    pub index: usize,
    pub frequency_hz: f64,
}

/// Precomputed twiddle factors for one transform length.
#[derive(Debug, Clone)]
pub struct FftPlan {
    n: usize,
    /// `exp(-2πik/n)` for `k < n/2`.
    twiddles: Vec<Complex64>,
}

impl FftPlan {
    /// Create a plan for length `n`.
    ///
    /// # Errors
    /// [`StegoError::InvalidParams`] unless `n` is a power of two.
    pub fn new(n: usize) -> Result<Self> {
        if !n.is_power_of_two() {
            return Err(StegoError::InvalidParams("transform length must be a power of two"));
        }
        let twiddles = (0..n / 2)
            .map(|k| {
                let (s, c) = (-2.0 * PI * k as f64 / n as f64).sin_cos();
                Complex64::new(c, s)
            })
            .collect();
        Ok(Self { n, twiddles })
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Forward DFT in place. `data.len()` must equal the plan length.
    pub fn forward(&self, data: &mut [Complex64]) {
        self.transform(data, false);
    }

    /// Inverse DFT in place, normalized by `1/N`.
    pub fn inverse(&self, data: &mut [Complex64]) {
        self.transform(data, true);
        let norm = 1.0 / self.n as f64;
        for c in data.iter_mut() {
            *c *= norm;
        }
    }

    fn transform(&self, data: &mut [Complex64], inverse: bool) {
        let n = self.n;
        assert_eq!(data.len(), n, "buffer length does not match FFT plan");
        if n <= 1 {
            return;
        }

        // Bit-reversal permutation
        let mut j = 0usize;
        for i in 1..n {
            let mut bit = n >> 1;
            while j & bit != 0 {
                j ^= bit;
                bit >>= 1;
            }
            j ^= bit;
            if i < j {
                data.swap(i, j);
            }
        }

        // Butterfly stages
        let mut len = 2;
        while len <= n {
            let half = len / 2;
            let stride = n / len;
            for start in (0..n).step_by(len) {
                for k in 0..half {
                    let mut w = self.twiddles[k * stride];
                    if inverse {
                        w = w.conj();
                    }
                    let u = data[start + k];
                    let v = data[start + k + half] * w;
                    data[start + k] = u + v;
                    data[start + k + half] = u - v;
                }
            }
            len <<= 1;
        }
    }
}

/// Truncate or zero-pad a real slice to length `n` and lift it to complex.
pub fn fit_length(samples: &[f64], n: usize) -> Vec<Complex64> {
    let mut out = vec![Complex64::new(0.0, 0.0); n];
    for (dst, &s) in out.iter_mut().zip(samples) {
        dst.re = s;
    }
    out
}

/// Frequency in Hz of bin `index` in an `n`-point transform at `rate` Hz.
/// Bins in the upper half map to negative frequencies.
pub fn bin_frequency(index: usize, n: usize, rate: u32) -> f64 {
    let r = rate as f64;
    if index < n / 2 {
        index as f64 * r / n as f64
    } else {
        (index as f64 - n as f64) * r / n as f64
    }
}

/// Bin of the positive half closest to `freq_hz`.
pub fn nearest_bin(freq_hz: f64, n: usize, rate: u32) -> FrequencyBin {
    let raw = (freq_hz * n as f64 / rate as f64).round();
    let index = (raw.max(0.0) as usize).min(n / 2);
    FrequencyBin {
        index,
        frequency_hz: index as f64 * rate as f64 / n as f64,
    }
}

/// Index of the negative-frequency twin of `index`.
pub fn mirror_bin(index: usize, n: usize) -> usize {
    (n - index) % n
}

pub fn magnitude(c: Complex64) -> f64 {
    c.norm()
}

/// Magnitude of every element of a spectrum.
pub fn magnitude_spectrum(spectrum: &[Complex64]) -> Vec<f64> {
    spectrum.iter().map(|&c| magnitude(c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reference O(n²) DFT.
    fn naive_dft(input: &[Complex64]) -> Vec<Complex64> {
        let n = input.len();
        (0..n)
            .map(|k| {
                input.iter().enumerate().fold(Complex64::new(0.0, 0.0), |acc, (t, &x)| {
                    let angle = -2.0 * PI * (k * t) as f64 / n as f64;
                    acc + x * Complex64::new(angle.cos(), angle.sin())
                })
            })
            .collect()
    }

    #[test]
    fn rejects_non_power_of_two() {
        assert!(FftPlan::new(12).is_err());
        assert!(FftPlan::new(0).is_err());
        assert!(FftPlan::new(1).is_ok());
    }

    #[test]
    fn impulse_transforms_to_flat_spectrum() {
        // FFT of [1, 0, 0, 0] should be [1, 1, 1, 1]
        let plan = FftPlan::new(4).unwrap();
        let mut data = fit_length(&[1.0], 4);
        plan.forward(&mut data);
        for (k, c) in data.iter().enumerate() {
            assert!((c.re - 1.0).abs() < 1e-12, "Re[{k}]={}", c.re);
            assert!(c.im.abs() < 1e-12, "Im[{k}]={}", c.im);
        }
    }

    #[test]
    fn matches_naive_dft() {
        let n = 64;
        let plan = FftPlan::new(n).unwrap();
        let input: Vec<Complex64> = (0..n)
            .map(|i| Complex64::new(((i * 7 + 3) % 11) as f64 - 5.0, ((i * 5) % 3) as f64))
            .collect();
        let expected = naive_dft(&input);
        let mut data = input.clone();
        plan.forward(&mut data);
        for k in 0..n {
            assert!((data[k] - expected[k]).norm() < 1e-9, "mismatch at {k}");
        }
    }

    #[test]
    fn inverse_is_exact_inverse() {
        let n = 256;
        let plan = FftPlan::new(n).unwrap();
        let samples: Vec<f64> = (0..n).map(|i| (i as f64 * 0.37).sin() * 0.8).collect();
        let mut data = fit_length(&samples, n);
        plan.forward(&mut data);
        plan.inverse(&mut data);
        for i in 0..n {
            assert!((data[i].re - samples[i]).abs() < 1e-12, "sample {i}");
            assert!(data[i].im.abs() < 1e-12);
        }
    }

    #[test]
    fn parseval_theorem() {
        let n = 128;
        let plan = FftPlan::new(n).unwrap();
        let samples: Vec<f64> = (0..n).map(|i| ((i * 13 + 1) % 17) as f64 / 17.0).collect();
        let time_energy: f64 = samples.iter().map(|v| v * v).sum();

        let mut data = fit_length(&samples, n);
        plan.forward(&mut data);
        let freq_energy: f64 = data.iter().map(|c| c.norm_sqr()).sum();
        assert!((time_energy - freq_energy / n as f64).abs() < 1e-9);
    }

    #[test]
    fn real_input_is_conjugate_symmetric() {
        let n = 32;
        let plan = FftPlan::new(n).unwrap();
        let samples: Vec<f64> = (0..n).map(|i| (i as f64).cos() + 0.1 * i as f64).collect();
        let mut data = fit_length(&samples, n);
        plan.forward(&mut data);
        for k in 1..n {
            let m = mirror_bin(k, n);
            assert!((data[k] - data[m].conj()).norm() < 1e-9, "bin {k}");
        }
    }

    #[test]
    fn fit_length_pads_and_truncates() {
        let padded = fit_length(&[1.0, 2.0, 3.0], 4);
        assert_eq!(padded.iter().map(|c| c.re).collect::<Vec<_>>(), vec![1.0, 2.0, 3.0, 0.0]);
        let truncated = fit_length(&[1.0, 2.0, 3.0, 4.0, 5.0], 4);
        assert_eq!(truncated.len(), 4);
        assert_eq!(truncated[3].re, 4.0);
        assert!(truncated.iter().all(|c| c.im == 0.0));
    }

    #[test]
    fn bin_frequency_mapping() {
        assert_eq!(bin_frequency(0, 8, 8000), 0.0);
        assert_eq!(bin_frequency(1, 8, 8000), 1000.0);
        assert_eq!(bin_frequency(3, 8, 8000), 3000.0);
        assert_eq!(bin_frequency(4, 8, 8000), -4000.0);
        assert_eq!(bin_frequency(7, 8, 8000), -1000.0);
    }

    #[test]
    fn nearest_bin_for_20khz() {
        let bin = nearest_bin(20_000.0, 4096, 44_100);
        assert_eq!(bin.index, 1858);
        assert!((bin.frequency_hz - 20_000.0).abs() < 44_100.0 / 4096.0 / 2.0);
        assert_eq!(mirror_bin(bin.index, 4096), 4096 - 1858);
        assert_eq!(mirror_bin(0, 4096), 0);
    }

    #[test]
    fn pure_tone_peaks_at_its_bin() {
        let n = 1024;
        let rate = 8192;
        let plan = FftPlan::new(n).unwrap();
        // 1000 Hz lands exactly on bin 125.
        let samples: Vec<f64> = (0..n)
            .map(|i| (2.0 * PI * 1000.0 * i as f64 / rate as f64).sin())
            .collect();
        let mut data = fit_length(&samples, n);
        plan.forward(&mut data);
        let mags = magnitude_spectrum(&data);
        let peak = (1..n / 2).max_by(|&a, &b| mags[a].total_cmp(&mags[b])).unwrap();
        assert_eq!(peak, nearest_bin(1000.0, n, rate).index);
        assert!((mags[peak] - n as f64 / 2.0).abs() < 1e-6);
    }
}
