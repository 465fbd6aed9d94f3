//! Request boundary
//!
//! Validates an inbound parameter record, runs the matching generator and
//! dispatches the result. Nothing in the core sees a record that failed
//! validation.

use tracing::{info, instrument, warn};

use crate::error::{Error, ValidationError};
use crate::filter::MAX_TAPS;
use crate::output::{dispatch, OutputFormat, RenderedOutput};
use crate::pulse_train::{WaveformKind, MAX_SAMPLES};
use crate::waveform::{self, BpskParams, CwParams, LfmParams, ScaledSignal};

/// Largest amplitude whose samples still fit a signed 16-bit integer
pub const MAX_AMPLITUDE: f64 = i16::MAX as f64;

/// Parameters of one waveform family
#[derive(Debug, Clone, PartialEq)]
pub enum WaveformParams {
    Cw(CwParams),
    Lfm(LfmParams),
    Bpsk(BpskParams),
}

/// One generation request
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformRequest {
    pub params: WaveformParams,
    pub format: OutputFormat,
    /// Axes mode, read only for static images
    pub axes: Option<String>,
}

/// Accumulates every violated precondition of one record
#[derive(Default)]
struct Checks {
    messages: Vec<String>,
}

impl Checks {
    fn positive(&mut self, name: &str, value: f64) {
        if !(value.is_finite() && value > 0.0) {
            self.messages
                .push(format!("{name}: must be a positive finite number, got {value}"));
        }
    }

    fn at_least_one(&mut self, name: &str, value: usize) {
        if value < 1 {
            self.messages.push(format!("{name}: must be at least 1"));
        }
    }

    fn within_nyquist(&mut self, name: &str, value: f64, sample_rate: f64) {
        let nyquist = sample_rate / 2.0;
        if !value.is_finite() || (sample_rate.is_finite() && value.abs() > nyquist) {
            self.messages
                .push(format!("{name}: {value} Hz lies outside +/-{nyquist} Hz"));
        }
    }

    /// `samples` is an estimate in floating point so it cannot overflow
    fn budget(&mut self, name: &str, samples: f64) {
        if samples > MAX_SAMPLES as f64 {
            self.messages
                .push(format!("{name}: needs {samples:.0} samples, limit is {MAX_SAMPLES}"));
        }
    }

    fn amplitude(&mut self, value: f64) {
        if !(value.is_finite() && value.abs() <= MAX_AMPLITUDE) {
            self.messages
                .push(format!("amplitude: must lie within +/-{MAX_AMPLITUDE}, got {value}"));
        }
    }

    fn finish(self) -> Result<(), ValidationError> {
        if self.messages.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                messages: self.messages,
            })
        }
    }
}

impl WaveformParams {
    pub fn kind(&self) -> WaveformKind {
        match self {
            WaveformParams::Cw(_) => WaveformKind::Cw,
            WaveformParams::Lfm(_) => WaveformKind::Lfm,
            WaveformParams::Bpsk(_) => WaveformKind::Bpsk,
        }
    }

    /// Family label used in file names and plot titles
    pub fn label(&self) -> &'static str {
        self.kind().label()
    }

    /// Check every field, reporting all violations at once
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut checks = Checks::default();

        match self {
            WaveformParams::Cw(p) => {
                checks.positive("sample_rate", p.sample_rate);
                checks.within_nyquist("frequency", p.frequency, p.sample_rate);
                checks.positive("pulse_width", p.pulse_width);
                if let Some(pri) = p.pri {
                    checks.positive("pri", pri);
                }
                checks.at_least_one("num_pulses", p.num_pulses);
                checks.amplitude(p.amplitude);

                let pri = p.pri.unwrap_or(p.pulse_width);
                train_budget(&mut checks, p.sample_rate, p.pulse_width, pri, p.num_pulses);
            }
            WaveformParams::Lfm(p) => {
                checks.positive("sample_rate", p.sample_rate);
                checks.within_nyquist("fstart", p.fstart, p.sample_rate);
                checks.within_nyquist("fstop", p.fstop, p.sample_rate);
                checks.positive("pulse_width", p.pulse_width);
                checks.positive("pri", p.pri);
                checks.at_least_one("num_pulses", p.num_pulses);
                checks.amplitude(p.amplitude);

                train_budget(&mut checks, p.sample_rate, p.pulse_width, p.pri, p.num_pulses);
            }
            WaveformParams::Bpsk(p) => {
                checks.positive("sample_rate", p.sample_rate);
                checks.positive("cutoff_freq", p.cutoff_freq);
                checks.at_least_one("num_taps", p.num_taps);
                if p.num_taps > MAX_TAPS {
                    checks
                        .messages
                        .push(format!("num_taps: must be at most {MAX_TAPS}"));
                }
                checks.at_least_one("num_bits", p.num_bits);
                checks.positive("bit_length", p.bit_length);
                checks.at_least_one("pulse_reps", p.pulse_reps);
                if let Some(pri) = p.pri {
                    checks.positive("pri", pri);
                }
                checks.at_least_one("num_pulses", p.num_pulses);
                checks.amplitude(p.amplitude);

                let pulse_width = p.num_bits as f64 * p.pulse_reps as f64 * p.bit_length;
                let pri = p.pri.unwrap_or_else(|| {
                    p.bit_length * 2f64.powf(p.num_bits.saturating_sub(1) as f64)
                });
                train_budget(&mut checks, p.sample_rate, pulse_width, pri, p.num_pulses);
            }
        }

        checks.finish()
    }

    /// Run the generator for this family
    pub fn generate(&self) -> Result<ScaledSignal, Error> {
        let signal = match self {
            WaveformParams::Cw(p) => waveform::generate_cw(p)?,
            WaveformParams::Lfm(p) => waveform::generate_lfm(p)?,
            WaveformParams::Bpsk(p) => waveform::generate_bpsk(p)?,
        };
        Ok(signal)
    }
}

/// Bound the pulse, the padded unit and the whole train by [`MAX_SAMPLES`]
fn train_budget(checks: &mut Checks, sample_rate: f64, pulse_width: f64, pri: f64, num_pulses: usize) {
    let pulse = pulse_width * sample_rate;
    let unit = pulse.max(pri * sample_rate);

    checks.budget("pulse_width", pulse);
    checks.budget("pri", pri * sample_rate);
    if unit <= MAX_SAMPLES as f64 {
        checks.budget("num_pulses", unit * num_pulses as f64);
    }
}

/// Validate, generate and render one request
#[instrument(level = "info", skip_all, fields(kind = %request.params.kind(), format = ?request.format))]
pub fn handle(request: &WaveformRequest) -> Result<RenderedOutput, Error> {
    if let Err(e) = request.params.validate() {
        warn!(violations = e.messages.len(), "rejected request");
        return Err(e.into());
    }

    let signal = request.params.generate()?;
    info!(samples = signal.len(), "generated waveform");

    let output = dispatch(
        &signal,
        request.format,
        signal.stop_time(),
        request.params.label(),
        request.axes.as_deref(),
    )?;
    Ok(output)
}
