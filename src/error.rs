//! Error types for every layer of the generator
//!
//! - [`GenerationError`]: a waveform primitive cannot produce a pulse
//! - [`DispatchError`]: a finished signal cannot be rendered
//! - [`ValidationError`]: an inbound parameter record is out of range
//! - [`Error`]: the request boundary's umbrella type
//!
//! Every error maps to an `{errors: [messages]}` payload through
//! [`Error::payload`].

use serde::Serialize;
use snafu::Snafu;

/// A waveform source primitive rejected its parameters
#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum GenerationError {
    /// Pulse duration rounds to zero samples
    #[snafu(display("pulse of {duration} s at {sample_rate} Hz contains no samples"))]
    EmptyPulse { duration: f64, sample_rate: f64 },

    /// Chirp sweeps over zero bandwidth
    #[snafu(display("chirp start and stop frequencies are both {frequency} Hz"))]
    DegenerateChirp { frequency: f64 },

    #[snafu(display("chip sequence must contain at least one bit"))]
    NoBits,

    /// Chip duration rounds to zero samples
    #[snafu(display("chip of {bit_length} s at {sample_rate} Hz contains no samples"))]
    EmptyChip { bit_length: f64, sample_rate: f64 },

    #[snafu(display("pulse must repeat its chip sequence at least once"))]
    NoRepetitions,

    #[snafu(display("low-pass filter needs at least one tap"))]
    NoTaps,

    #[snafu(display("cutoff {cutoff} Hz must lie strictly between 0 and {nyquist} Hz"))]
    CutoffOutOfRange { cutoff: f64, nyquist: f64 },

    #[snafu(display("maximal-length sequence of {num_bits} bits exceeds {max} chips"))]
    SequenceTooLong { num_bits: usize, max: usize },

    /// A pulse, padded unit or whole train would exceed the sample budget
    #[snafu(display("{what} would exceed {max} samples"))]
    TrainTooLong { what: &'static str, max: usize },

    #[snafu(display("low-pass filter of {num_taps} taps exceeds {max} taps"))]
    TooManyTaps { num_taps: usize, max: usize },
}

/// A finished signal could not be turned into the requested output
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DispatchError {
    #[snafu(display("Invalid graph axes request: {}", axes.as_deref().unwrap_or("<none>")))]
    InvalidAxes { axes: Option<String> },

    #[snafu(display("Unknown output format: {format}"))]
    UnknownFormat { format: String },

    #[snafu(display("plot rendering failed: {message}"))]
    Render { message: String },

    #[snafu(display("PNG encoding failed: {source}"))]
    ImageEncoding { source: image::ImageError },
}

/// One or more inbound parameters failed validation
#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(display("invalid parameters: {}", messages.join("; ")))]
pub struct ValidationError {
    pub messages: Vec<String>,
}

/// Any failure surfaced by [`crate::request::handle`]
#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(context(false), display("{source}"))]
    Validation { source: ValidationError },

    #[snafu(context(false), display("{source}"))]
    Generation { source: GenerationError },

    #[snafu(context(false), display("{source}"))]
    Dispatch { source: DispatchError },
}

/// Machine-readable error body: `{"errors": ["..."]}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorPayload {
    pub errors: Vec<String>,
}

impl ErrorPayload {
    pub fn to_json(&self) -> String {
        // A struct holding only strings always serializes
        serde_json::to_string(self).unwrap_or_else(|_| String::from(r#"{"errors":[]}"#))
    }
}

impl Error {
    /// HTTP-equivalent status for this failure
    ///
    /// Caller mistakes (bad parameters, rejected generator input, unknown
    /// axes or formats) are 400; backend rendering failures are 500.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation { .. } | Error::Generation { .. } => 400,
            Error::Dispatch { source } => match source {
                DispatchError::InvalidAxes { .. } | DispatchError::UnknownFormat { .. } => 400,
                DispatchError::Render { .. } | DispatchError::ImageEncoding { .. } => 500,
            },
        }
    }

    pub fn payload(&self) -> ErrorPayload {
        let errors = match self {
            Error::Validation { source } => source.messages.clone(),
            Error::Generation { source } => vec![source.to_string()],
            Error::Dispatch { source } => vec![source.to_string()],
        };
        ErrorPayload { errors }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_axes_is_client_error() {
        let err: Error = DispatchError::InvalidAxes {
            axes: Some("bogus".to_string()),
        }
        .into();

        assert_eq!(err.status_code(), 400);
        assert_eq!(
            err.payload().errors,
            vec!["Invalid graph axes request: bogus".to_string()]
        );
    }

    #[test]
    fn test_render_failure_is_server_error() {
        let err: Error = DispatchError::Render {
            message: "backend gone".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_validation_payload_keeps_every_message() {
        let err: Error = ValidationError {
            messages: vec!["a: bad".to_string(), "b: worse".to_string()],
        }
        .into();

        assert_eq!(err.status_code(), 400);
        assert_eq!(err.payload().to_json(), r#"{"errors":["a: bad","b: worse"]}"#);
    }

    #[test]
    fn test_generation_error_message() {
        let err: Error = GenerationError::DegenerateChirp { frequency: 100.0 }.into();
        assert_eq!(err.status_code(), 400);
        assert!(err.payload().errors[0].contains("100 Hz"));
    }
}
