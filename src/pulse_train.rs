//! Pulse-Train Assembly
//!
//! Turns one elementary pulse into a correctly timed pulse train: each pulse
//! is followed by enough zero samples that consecutive pulse starts are one
//! pulse-repetition interval (PRI) apart.
//!
//! **Padding rules**:
//! - CW / LFM ([`NominalWidth`]): the pulse sample count is derived from the
//!   nominal pulse width, `blank = round(pri*fs) - round(pulse_width*fs)`
//! - BPSK ([`MeasuredLength`]): the pulse sample count is measured from the
//!   pulse itself, `blank = round(pri*fs) - len(pulse)`
//!
//! Both clamp `blank` at zero. A pulse longer than the PRI is never
//! truncated; consecutive pulses then simply touch.
//!
//! **Replication**:
//! - [`tile`] repeats one padded unit (identical pulses)
//! - [`concatenate`] joins independently generated units in order
//!
//! Every length is bounded by [`MAX_SAMPLES`]; generators call
//! [`TimingSpec::check_budget`] and [`train_length`] before allocating.

use num::complex::Complex64;
use snafu::ensure;
use tracing::{trace, warn};

use crate::error::{GenerationError, TrainTooLongSnafu};

/// Largest pulse, padded unit or train, in samples (1 GiB of `Complex64`)
pub const MAX_SAMPLES: usize = 1 << 26;

/// Timing parameters for one pulse train
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingSpec {
    /// Sample rate in Hz
    pub sample_rate: f64,
    /// Active pulse duration in seconds
    pub pulse_width: f64,
    /// Pulse-repetition interval in seconds
    pub pri: f64,
    /// Number of pulses in the train
    pub pulse_count: usize,
}

impl TimingSpec {
    pub fn new(sample_rate: f64, pulse_width: f64, pri: f64, pulse_count: usize) -> Self {
        Self {
            sample_rate,
            pulse_width,
            pri,
            pulse_count,
        }
    }

    /// PRI length in samples
    pub fn pri_samples(&self) -> usize {
        samples_in(self.pri, self.sample_rate)
    }

    /// Nominal pulse length in samples
    pub fn pulse_width_samples(&self) -> usize {
        samples_in(self.pulse_width, self.sample_rate)
    }

    /// Reject a PRI or pulse width spanning more than [`MAX_SAMPLES`]
    pub fn check_budget(&self) -> Result<(), GenerationError> {
        ensure!(
            self.pri_samples() <= MAX_SAMPLES,
            TrainTooLongSnafu {
                what: "PRI",
                max: MAX_SAMPLES
            }
        );
        ensure!(
            self.pulse_width_samples() <= MAX_SAMPLES,
            TrainTooLongSnafu {
                what: "pulse",
                max: MAX_SAMPLES
            }
        );
        Ok(())
    }
}

/// Length of `count` units of `unit_len` samples, within [`MAX_SAMPLES`]
pub fn train_length(unit_len: usize, count: usize) -> Result<usize, GenerationError> {
    unit_len
        .checked_mul(count)
        .filter(|&len| len <= MAX_SAMPLES)
        .ok_or(GenerationError::TrainTooLong {
            what: "pulse train",
            max: MAX_SAMPLES,
        })
}

/// Number of whole samples spanned by `duration` seconds at `sample_rate` Hz
///
/// Rounds half to even. Negative or NaN products give zero.
pub fn samples_in(duration: f64, sample_rate: f64) -> usize {
    let samples = (duration * sample_rate).round_ties_even();
    if samples.is_nan() || samples <= 0.0 {
        0
    } else {
        samples as usize
    }
}

/// Strategy computing the length of one padded pulse unit
pub trait PaddingRule: Sync {
    /// Pulse length plus blank samples for `pulse` under `timing`
    fn padded_length(&self, pulse: &[Complex64], timing: &TimingSpec) -> usize;
}

/// CW / LFM rule: pulse length taken from the nominal pulse width
#[derive(Debug, Clone, Copy, Default)]
pub struct NominalWidth;

impl PaddingRule for NominalWidth {
    fn padded_length(&self, pulse: &[Complex64], timing: &TimingSpec) -> usize {
        let blank = timing.pri_samples().saturating_sub(timing.pulse_width_samples());
        pulse.len() + blank
    }
}

/// BPSK rule: pulse length measured from the samples themselves
#[derive(Debug, Clone, Copy, Default)]
pub struct MeasuredLength;

impl PaddingRule for MeasuredLength {
    fn padded_length(&self, pulse: &[Complex64], timing: &TimingSpec) -> usize {
        pulse.len().max(timing.pri_samples())
    }
}

/// Waveform family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaveformKind {
    /// Continuous-wave tone
    Cw,
    /// Linear frequency modulated chirp
    Lfm,
    /// Binary phase-shift keyed chip burst
    Bpsk,
}

impl WaveformKind {
    /// Padding strategy for this family
    pub fn padding_rule(self) -> &'static dyn PaddingRule {
        match self {
            WaveformKind::Cw | WaveformKind::Lfm => &NominalWidth,
            WaveformKind::Bpsk => &MeasuredLength,
        }
    }

    /// Short name used in file names and plot titles
    pub fn label(self) -> &'static str {
        match self {
            WaveformKind::Cw => "cw",
            WaveformKind::Lfm => "lfm",
            WaveformKind::Bpsk => "bpsk",
        }
    }
}

impl std::fmt::Display for WaveformKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Number of zero samples appended after `pulse`
pub fn blank_samples(pulse: &[Complex64], timing: &TimingSpec, rule: &dyn PaddingRule) -> usize {
    rule.padded_length(pulse, timing) - pulse.len()
}

/// Pad one pulse with trailing zeros so the unit spans one PRI
///
/// # Arguments
/// * `pulse` - Elementary pulse (non-empty)
/// * `timing` - Sample rate, pulse width and PRI
/// * `rule` - Family padding rule, see [`WaveformKind::padding_rule`]
///
/// # Example
/// ```
/// use num::complex::Complex64;
/// use rustypulse::pulse_train::{assemble, TimingSpec, WaveformKind};
///
/// let pulse = vec![Complex64::new(1.0, 0.0); 10];
/// let timing = TimingSpec::new(1000.0, 0.01, 0.05, 3);
/// let unit = assemble(&pulse, &timing, WaveformKind::Lfm.padding_rule());
/// assert_eq!(unit.len(), 50);
/// ```
pub fn assemble(pulse: &[Complex64], timing: &TimingSpec, rule: &dyn PaddingRule) -> Vec<Complex64> {
    let padded_length = rule.padded_length(pulse, timing);

    if timing.pri < timing.pulse_width {
        warn!(
            pri = timing.pri,
            pulse_width = timing.pulse_width,
            "PRI shorter than pulse width, pulses will run back to back"
        );
    }
    trace!(
        pulse_len = pulse.len(),
        blank = padded_length - pulse.len(),
        "padding pulse"
    );

    let mut unit = Vec::with_capacity(padded_length);
    unit.extend_from_slice(pulse);
    unit.resize(padded_length, Complex64::new(0.0, 0.0));
    unit
}

/// Repeat one padded unit `count` times
///
/// Callers bound `unit.len() * count` with [`train_length`] first.
pub fn tile(unit: &[Complex64], count: usize) -> Vec<Complex64> {
    unit.repeat(count)
}

/// Join independently generated padded units in order
pub fn concatenate(units: Vec<Vec<Complex64>>) -> Vec<Complex64> {
    units.concat()
}
