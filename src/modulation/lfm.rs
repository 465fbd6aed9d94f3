use std::f64::consts::PI;

use num::complex::Complex64;
use snafu::ensure;

use crate::error::{DegenerateChirpSnafu, EmptyPulseSnafu, GenerationError, TrainTooLongSnafu};
use crate::pulse_train::{samples_in, MAX_SAMPLES};

/// Generate one linear-frequency-modulated chirp
///
/// The instantaneous frequency sweeps linearly from `fstart` to `fstop` over
/// `pulse_width` seconds:
/// `phase(t) = 2π * (fstart * t + 0.5 * k * t²)` with `k = (fstop - fstart) / pulse_width`.
///
/// # Errors
/// * `DegenerateChirp` when `fstart == fstop`
/// * `EmptyPulse` when the pulse rounds to zero samples
pub fn chirp(
    sample_rate: f64,
    fstart: f64,
    fstop: f64,
    pulse_width: f64,
) -> Result<Vec<Complex64>, GenerationError> {
    ensure!(fstart != fstop, DegenerateChirpSnafu { frequency: fstart });

    let num_samples = samples_in(pulse_width, sample_rate);
    ensure!(
        num_samples > 0,
        EmptyPulseSnafu {
            duration: pulse_width,
            sample_rate
        }
    );
    ensure!(
        num_samples <= MAX_SAMPLES,
        TrainTooLongSnafu {
            what: "pulse",
            max: MAX_SAMPLES
        }
    );

    let sweep_rate = (fstop - fstart) / pulse_width;

    Ok((0..num_samples)
        .map(|k| {
            let t = k as f64 / sample_rate;
            let phi = 2.0 * PI * (fstart * t + 0.5 * sweep_rate * t * t);
            Complex64::new(libm::cos(phi), libm::sin(phi))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Instantaneous frequency between samples `k` and `k + 1`
    fn inst_freq(pulse: &[Complex64], k: usize, sample_rate: f64) -> f64 {
        (pulse[k + 1] * pulse[k].conj()).arg() * sample_rate / (2.0 * PI)
    }

    #[test]
    fn test_chirp_length_and_magnitude() {
        let pulse = chirp(1e6, -100e3, 100e3, 1e-4).unwrap();
        assert_eq!(pulse.len(), 100);
        for s in &pulse {
            assert!((s.norm() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_chirp_sweeps_between_endpoints() {
        let fs = 1e6;
        let pulse = chirp(fs, 10e3, 90e3, 1e-3).unwrap();

        let start = inst_freq(&pulse, 0, fs);
        let end = inst_freq(&pulse, pulse.len() - 2, fs);

        assert!((start - 10e3).abs() < 200.0, "start frequency {}", start);
        assert!((end - 90e3).abs() < 200.0, "end frequency {}", end);
        assert!(end > start);
    }

    #[test]
    fn test_down_chirp() {
        let fs = 1e6;
        let pulse = chirp(fs, 50e3, -50e3, 1e-3).unwrap();
        assert!(inst_freq(&pulse, 0, fs) > inst_freq(&pulse, pulse.len() - 2, fs));
    }

    #[test]
    fn test_degenerate_chirp_rejected() {
        assert_eq!(
            chirp(1e6, 5e3, 5e3, 1e-3),
            Err(GenerationError::DegenerateChirp { frequency: 5e3 })
        );
    }

    #[test]
    fn test_empty_chirp_rejected() {
        assert!(matches!(
            chirp(1000.0, 0.0, 100.0, 1e-4),
            Err(GenerationError::EmptyPulse { .. })
        ));
    }
}
