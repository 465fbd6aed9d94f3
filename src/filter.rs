//! FIR low-pass filtering
//!
//! Windowed-sinc design (Hamming window) normalised to unit DC gain, applied
//! as a causal direct-form convolution. The filtered output always has the
//! same length as its input, so filtering never changes pulse-train timing.

use std::f64::consts::PI;

use num::complex::Complex64;
use snafu::ensure;
use tracing::debug;

use crate::error::{CutoffOutOfRangeSnafu, GenerationError, NoTapsSnafu, TooManyTapsSnafu};

/// Longest supported filter
pub const MAX_TAPS: usize = 4096;

/// Design a low-pass FIR filter
///
/// # Arguments
/// * `num_taps` - Filter length, 1 to [`MAX_TAPS`]
/// * `cutoff_freq` - Cutoff in Hz, strictly between 0 and `sample_rate / 2`
/// * `sample_rate` - Sample rate in Hz
///
/// # Returns
/// * Real tap weights summing to 1.0
pub fn design_lowpass(
    num_taps: usize,
    cutoff_freq: f64,
    sample_rate: f64,
) -> Result<Vec<f64>, GenerationError> {
    ensure!(num_taps > 0, NoTapsSnafu);
    ensure!(
        num_taps <= MAX_TAPS,
        TooManyTapsSnafu {
            num_taps,
            max: MAX_TAPS
        }
    );

    let nyquist = sample_rate / 2.0;
    ensure!(
        cutoff_freq > 0.0 && cutoff_freq < nyquist,
        CutoffOutOfRangeSnafu {
            cutoff: cutoff_freq,
            nyquist
        }
    );

    // Cutoff as a fraction of Nyquist
    let cutoff = cutoff_freq / nyquist;
    let m = (num_taps - 1) as f64 / 2.0;

    let mut taps: Vec<f64> = (0..num_taps)
        .map(|i| {
            let x = i as f64 - m;
            let sinc = if x.abs() < 1e-10 {
                cutoff
            } else {
                libm::sin(PI * cutoff * x) / (PI * x)
            };
            let window = if num_taps == 1 {
                1.0
            } else {
                0.54 - 0.46 * libm::cos(2.0 * PI * i as f64 / (num_taps - 1) as f64)
            };
            sinc * window
        })
        .collect();

    let sum: f64 = taps.iter().sum();
    if sum.abs() > 1e-12 {
        for t in taps.iter_mut() {
            *t /= sum;
        }
    }

    debug!(num_taps, cutoff_freq, sample_rate, "designed low-pass filter");
    Ok(taps)
}

/// Filter `input` through `taps`, starting from a zero state
pub fn apply_fir(taps: &[f64], input: &[Complex64]) -> Vec<Complex64> {
    (0..input.len())
        .map(|n| {
            taps.iter()
                .take(n + 1)
                .enumerate()
                .fold(Complex64::new(0.0, 0.0), |acc, (k, &h)| acc + input[n - k] * h)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_dc_gain() {
        let taps = design_lowpass(31, 100.0, 1000.0).unwrap();
        assert_eq!(taps.len(), 31);

        let sum: f64 = taps.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9, "DC gain should be 1.0, got {}", sum);
    }

    #[test]
    fn test_taps_are_symmetric() {
        let taps = design_lowpass(21, 250.0, 1000.0).unwrap();
        for i in 0..taps.len() / 2 {
            assert!((taps[i] - taps[taps.len() - 1 - i]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_output_length_matches_input() {
        let taps = design_lowpass(15, 100.0, 1000.0).unwrap();
        let input = vec![Complex64::new(1.0, -1.0); 7];
        assert_eq!(apply_fir(&taps, &input).len(), 7);
        assert!(apply_fir(&taps, &[]).is_empty());
    }

    #[test]
    fn test_constant_input_settles() {
        let taps = design_lowpass(31, 100.0, 1000.0).unwrap();
        let input = vec![Complex64::new(2.0, -3.0); 200];
        let output = apply_fir(&taps, &input);

        for y in &output[31..] {
            assert!((y.re - 2.0).abs() < 1e-9);
            assert!((y.im + 3.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_removes_nyquist_tone() {
        let taps = design_lowpass(63, 50.0, 1000.0).unwrap();
        let input: Vec<Complex64> = (0..500)
            .map(|n| Complex64::new(if n % 2 == 0 { 1.0 } else { -1.0 }, 0.0))
            .collect();
        let output = apply_fir(&taps, &input);

        let peak = output[100..].iter().map(|y| y.norm()).fold(0.0, f64::max);
        assert!(peak < 0.01, "Nyquist tone should be suppressed, peak {}", peak);
    }

    #[test]
    fn test_single_tap_is_passthrough() {
        let taps = design_lowpass(1, 100.0, 1000.0).unwrap();
        assert_eq!(taps, vec![1.0]);

        let input = vec![Complex64::new(3.0, 4.0), Complex64::new(-1.0, 0.5)];
        assert_eq!(apply_fir(&taps, &input), input);
    }

    #[test]
    fn test_invalid_parameters() {
        assert_eq!(design_lowpass(0, 100.0, 1000.0), Err(GenerationError::NoTaps));
        assert_eq!(
            design_lowpass(11, 500.0, 1000.0),
            Err(GenerationError::CutoffOutOfRange {
                cutoff: 500.0,
                nyquist: 500.0
            })
        );
        assert!(design_lowpass(11, 0.0, 1000.0).is_err());
        assert_eq!(
            design_lowpass(MAX_TAPS + 1, 100.0, 1000.0),
            Err(GenerationError::TooManyTaps {
                num_taps: MAX_TAPS + 1,
                max: MAX_TAPS
            })
        );
    }
}
