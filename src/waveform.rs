//! Waveform Orchestration
//!
//! Builds a finished, amplitude-scaled pulse train for each waveform family.
//!
//! **Process**:
//! 1. Synthesize the elementary pulse ([`crate::modulation`])
//! 2. Pad it to one PRI ([`crate::pulse_train::assemble`])
//! 3. Replicate: tiling for CW / LFM, concatenation of independently drawn
//!    pulses for BPSK
//! 4. BPSK only: low-pass filter the whole composite once
//! 5. Scale by the amplitude and round to integers, exactly once

use num::complex::Complex64;
use rand::Rng;
use tracing::{debug, instrument};

use crate::error::GenerationError;
use crate::filter;
use crate::modulation;
use crate::pulse_train::{
    assemble, concatenate, tile, train_length, PaddingRule, TimingSpec, WaveformKind, MAX_SAMPLES,
};
use crate::sequence::{self, SequenceType};

/// Continuous-wave parameters
#[derive(Debug, Clone, PartialEq)]
pub struct CwParams {
    /// Sample rate in Hz
    pub sample_rate: f64,
    /// Tone frequency in Hz (0 = constant phasor)
    pub frequency: f64,
    /// Tone duration in seconds
    pub pulse_width: f64,
    /// Pulse-repetition interval; defaults to the pulse width (no gap)
    pub pri: Option<f64>,
    pub num_pulses: usize,
    pub amplitude: f64,
}

impl Default for CwParams {
    fn default() -> Self {
        Self {
            sample_rate: 1e6,
            frequency: 0.0,
            pulse_width: 1e-3,
            pri: None,
            num_pulses: 1,
            amplitude: 2000.0,
        }
    }
}

/// Linear-frequency-modulated chirp train parameters
#[derive(Debug, Clone, PartialEq)]
pub struct LfmParams {
    pub sample_rate: f64,
    /// Sweep start frequency in Hz
    pub fstart: f64,
    /// Sweep stop frequency in Hz
    pub fstop: f64,
    /// Chirp duration in seconds
    pub pulse_width: f64,
    /// Pulse-repetition interval in seconds
    pub pri: f64,
    pub num_pulses: usize,
    pub amplitude: f64,
}

impl Default for LfmParams {
    fn default() -> Self {
        Self {
            sample_rate: 1e6,
            fstart: -100e3,
            fstop: 100e3,
            pulse_width: 1e-4,
            pri: 1e-3,
            num_pulses: 4,
            amplitude: 2000.0,
        }
    }
}

/// BPSK pulse train parameters
#[derive(Debug, Clone, PartialEq)]
pub struct BpskParams {
    pub sample_rate: f64,
    /// Low-pass cutoff in Hz applied to the whole train
    pub cutoff_freq: f64,
    /// Low-pass filter length
    pub num_taps: usize,
    /// Chips per code
    pub num_bits: usize,
    /// Chip duration in seconds
    pub bit_length: f64,
    pub sequence_type: SequenceType,
    /// Code repetitions inside each pulse
    pub pulse_reps: usize,
    /// Pulse-repetition interval in seconds; derived from the code when absent,
    /// see [`BpskParams::effective_pri`]
    pub pri: Option<f64>,
    pub num_pulses: usize,
    pub amplitude: f64,
}

impl Default for BpskParams {
    fn default() -> Self {
        Self {
            sample_rate: 1e6,
            cutoff_freq: 200e3,
            num_taps: 31,
            num_bits: 13,
            bit_length: 1e-5,
            sequence_type: SequenceType::Random,
            pulse_reps: 1,
            pri: None,
            num_pulses: 4,
            amplitude: 2000.0,
        }
    }
}

impl BpskParams {
    /// PRI in seconds: the explicit one, else `bit_length * 2^(num_bits - 1)`
    ///
    /// The derived interval leaves room for the longest code that fits in a
    /// power-of-two number of chips.
    pub fn effective_pri(&self) -> Result<f64, GenerationError> {
        if let Some(pri) = self.pri {
            return Ok(pri);
        }

        u32::try_from(self.num_bits.saturating_sub(1))
            .ok()
            .and_then(|exponent| 1u64.checked_shl(exponent))
            .map(|chips| self.bit_length * chips as f64)
            .ok_or(GenerationError::TrainTooLong {
                what: "PRI",
                max: MAX_SAMPLES,
            })
    }
}

/// A finished pulse train with integer-valued samples
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledSignal {
    samples: Vec<Complex64>,
    sample_rate: f64,
    kind: WaveformKind,
}

impl ScaledSignal {
    /// Scale `train` by `amplitude` and round once
    pub fn from_train(train: &[Complex64], amplitude: f64, sample_rate: f64, kind: WaveformKind) -> Self {
        Self {
            samples: scale_and_round(train, amplitude),
            sample_rate,
            kind,
        }
    }

    pub fn samples(&self) -> &[Complex64] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<Complex64> {
        self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn kind(&self) -> WaveformKind {
        self.kind
    }

    /// Time of the last sample in seconds, the natural end of the time base
    pub fn stop_time(&self) -> f64 {
        self.samples.len().saturating_sub(1) as f64 / self.sample_rate
    }
}

/// Multiply every sample by `amplitude` and round I and Q to the nearest
/// integer (half to even)
pub fn scale_and_round(train: &[Complex64], amplitude: f64) -> Vec<Complex64> {
    train
        .iter()
        .map(|s| {
            let scaled = *s * amplitude;
            Complex64::new(scaled.re.round_ties_even(), scaled.im.round_ties_even())
        })
        .collect()
}

/// Generate a CW pulse train
#[instrument(level = "debug", skip_all, fields(pulse_width = params.pulse_width, num_pulses = params.num_pulses))]
pub fn generate_cw(params: &CwParams) -> Result<ScaledSignal, GenerationError> {
    let kind = WaveformKind::Cw;
    let timing = TimingSpec::new(
        params.sample_rate,
        params.pulse_width,
        params.pri.unwrap_or(params.pulse_width),
        params.num_pulses,
    );

    timing.check_budget()?;

    let pulse = modulation::tone(params.sample_rate, params.frequency, params.pulse_width)?;
    let unit = assemble(&pulse, &timing, kind.padding_rule());
    train_length(unit.len(), timing.pulse_count)?;
    let train = tile(&unit, timing.pulse_count);

    debug!(unit_len = unit.len(), train_len = train.len(), "assembled CW train");
    Ok(ScaledSignal::from_train(&train, params.amplitude, params.sample_rate, kind))
}

/// Generate an LFM chirp train
#[instrument(level = "debug", skip_all, fields(fstart = params.fstart, fstop = params.fstop, num_pulses = params.num_pulses))]
pub fn generate_lfm(params: &LfmParams) -> Result<ScaledSignal, GenerationError> {
    let kind = WaveformKind::Lfm;
    let timing = TimingSpec::new(params.sample_rate, params.pulse_width, params.pri, params.num_pulses);

    timing.check_budget()?;

    let pulse = modulation::chirp(params.sample_rate, params.fstart, params.fstop, params.pulse_width)?;
    let unit = assemble(&pulse, &timing, kind.padding_rule());
    train_length(unit.len(), timing.pulse_count)?;
    let train = tile(&unit, timing.pulse_count);

    debug!(unit_len = unit.len(), train_len = train.len(), "assembled LFM train");
    Ok(ScaledSignal::from_train(&train, params.amplitude, params.sample_rate, kind))
}

/// Generate a BPSK pulse train using the thread-local RNG
pub fn generate_bpsk(params: &BpskParams) -> Result<ScaledSignal, GenerationError> {
    generate_bpsk_with_rng(params, &mut rand::rng())
}

/// Generate a BPSK pulse train drawing random codes from `rng`
///
/// Every pulse gets its own code, so pulses are concatenated rather than
/// tiled. The filter runs once over the complete train. All sizes are
/// checked before the first code is drawn.
#[instrument(level = "debug", skip_all, fields(num_bits = params.num_bits, num_pulses = params.num_pulses))]
pub fn generate_bpsk_with_rng<R: Rng>(
    params: &BpskParams,
    rng: &mut R,
) -> Result<ScaledSignal, GenerationError> {
    let kind = WaveformKind::Bpsk;
    let rule = kind.padding_rule();

    let taps = filter::design_lowpass(params.num_taps, params.cutoff_freq, params.sample_rate)?;

    let pri = params.effective_pri()?;
    let pulse_len = modulation::pulse_length(
        params.num_bits,
        params.pulse_reps,
        params.sample_rate,
        params.bit_length,
    )?;
    let timing = TimingSpec::new(
        params.sample_rate,
        pulse_len as f64 / params.sample_rate,
        pri,
        params.num_pulses,
    );
    timing.check_budget()?;
    train_length(pulse_len.max(timing.pri_samples()), params.num_pulses)?;
    debug!(pri, pulse_len, "BPSK timing");

    let units = (0..params.num_pulses)
        .map(|_| bpsk_unit(params, &timing, rule, rng))
        .collect::<Result<Vec<_>, _>>()?;
    let composite = concatenate(units);
    let filtered = filter::apply_fir(&taps, &composite);

    debug!(train_len = filtered.len(), "assembled BPSK train");
    Ok(ScaledSignal::from_train(&filtered, params.amplitude, params.sample_rate, kind))
}

/// One freshly coded, padded BPSK pulse
fn bpsk_unit<R: Rng>(
    params: &BpskParams,
    timing: &TimingSpec,
    rule: &dyn PaddingRule,
    rng: &mut R,
) -> Result<Vec<Complex64>, GenerationError> {
    let chips = sequence::generate(params.sequence_type, params.num_bits, rng)?;
    let pulse = modulation::chip_waveform(&chips, params.pulse_reps, params.sample_rate, params.bit_length)?;
    Ok(assemble(&pulse, timing, rule))
}
