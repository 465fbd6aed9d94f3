use bitvec::prelude::*;
use num::complex::Complex64;
use snafu::ensure;

use crate::error::{EmptyChipSnafu, GenerationError, NoBitsSnafu, NoRepetitionsSnafu};
use crate::pulse_train::{samples_in, MAX_SAMPLES};

/// Sample count of a pulse of `num_chips` chips sent `pulse_reps` times
///
/// Fails like [`chip_waveform`] would, without building the pulse.
pub fn pulse_length(
    num_chips: usize,
    pulse_reps: usize,
    sample_rate: f64,
    bit_length: f64,
) -> Result<usize, GenerationError> {
    ensure!(num_chips > 0, NoBitsSnafu);
    ensure!(pulse_reps > 0, NoRepetitionsSnafu);

    let samples_per_chip = samples_in(bit_length, sample_rate);
    ensure!(
        samples_per_chip > 0,
        EmptyChipSnafu {
            bit_length,
            sample_rate
        }
    );

    num_chips
        .checked_mul(pulse_reps)
        .and_then(|n| n.checked_mul(samples_per_chip))
        .filter(|&n| n <= MAX_SAMPLES)
        .ok_or(GenerationError::TrainTooLong {
            what: "BPSK pulse",
            max: MAX_SAMPLES,
        })
}

/// Map a chip sequence to one BPSK pulse
///
/// Bit 0 maps to +1 and bit 1 to -1 on the real axis. The whole sequence
/// is sent `pulse_reps` times back to back and every chip is held for
/// `round(bit_length * sample_rate)` samples.
///
/// # Example
/// ```
/// use bitvec::prelude::*;
/// use rustypulse::modulation::chip_waveform;
///
/// let chips = bitvec![0, 1];
/// let pulse = chip_waveform(&chips, 1, 1000.0, 0.002)?;
/// assert_eq!(pulse.len(), 4);
/// assert_eq!(pulse[2].re, -1.0);
/// # Ok::<(), rustypulse::error::GenerationError>(())
/// ```
pub fn chip_waveform(
    chips: &BitSlice,
    pulse_reps: usize,
    sample_rate: f64,
    bit_length: f64,
) -> Result<Vec<Complex64>, GenerationError> {
    let length = pulse_length(chips.len(), pulse_reps, sample_rate, bit_length)?;
    let samples_per_chip = samples_in(bit_length, sample_rate);

    let mut pulse = Vec::with_capacity(length);
    for _ in 0..pulse_reps {
        for chip in chips.iter().by_vals() {
            let symbol = if chip { -1.0 } else { 1.0 };
            pulse.extend(std::iter::repeat(Complex64::new(symbol, 0.0)).take(samples_per_chip));
        }
    }
    Ok(pulse)
}
