use std::f64::consts::PI;

use num::complex::Complex64;
use snafu::ensure;

use crate::error::{EmptyPulseSnafu, GenerationError, TrainTooLongSnafu};
use crate::pulse_train::{samples_in, MAX_SAMPLES};

/// Generate one continuous-wave pulse
///
/// Produces `round(pulse_width * sample_rate)` samples of
/// `exp(j * 2π * frequency * t)`. A `frequency` of zero gives a constant
/// unit phasor.
pub fn tone(
    sample_rate: f64,
    frequency: f64,
    pulse_width: f64,
) -> Result<Vec<Complex64>, GenerationError> {
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

    let dphi = 2.0 * PI * frequency / sample_rate;

    Ok((0..num_samples)
        .map(|k| {
            let phi = dphi * k as f64;
            Complex64::new(libm::cos(phi), libm::sin(phi))
        })
        .collect())
}
