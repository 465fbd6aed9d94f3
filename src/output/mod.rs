//! Output Dispatch
//!
//! Turns a finished [`ScaledSignal`] into one deliverable:
//! - `binary`: headerless SC16 IQ dump with a timestamped file name
//! - `static-image`: PNG, either I/Q against time or Q against I
//! - `interactive-graph`: HTML time-domain plot
//! - `3d-graph`: HTML 3D scatter of (I, Q, time)
//!
//! Dispatch only borrows the signal. Invalid axes are rejected before any
//! time base is computed or anything is drawn.

pub mod graph;
pub mod png;
pub mod rendering;
pub mod sc16;

use std::str::FromStr;

use chrono::Local;
use tracing::{info, instrument};

use crate::error::DispatchError;
use crate::waveform::ScaledSignal;

/// Requested output encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Binary,
    StaticImage,
    InteractiveGraph,
    ThreeDimGraph,
}

impl FromStr for OutputFormat {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "binary" | "sc16" => Ok(OutputFormat::Binary),
            "static-image" | "png" => Ok(OutputFormat::StaticImage),
            "interactive-graph" | "graph" => Ok(OutputFormat::InteractiveGraph),
            "3d-graph" | "threeDim" => Ok(OutputFormat::ThreeDimGraph),
            other => Err(DispatchError::UnknownFormat {
                format: other.to_string(),
            }),
        }
    }
}

/// Axes of a static image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxesMode {
    /// I and Q against time
    TimeDomain,
    /// Q against I, no time axis
    IqPlane,
}

impl AxesMode {
    /// Parse an optional axes request
    pub fn parse(axes: Option<&str>) -> Result<Self, DispatchError> {
        match axes.map(str::to_ascii_lowercase).as_deref() {
            Some("time-domain") | Some("iqvt") => Ok(AxesMode::TimeDomain),
            Some("iq-plane") | Some("ivq") => Ok(AxesMode::IqPlane),
            _ => Err(DispatchError::InvalidAxes {
                axes: axes.map(str::to_string),
            }),
        }
    }
}

impl FromStr for AxesMode {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AxesMode::parse(Some(s))
    }
}

/// A rendered deliverable
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedOutput {
    /// Downloadable SC16 attachment
    Binary { filename: String, bytes: Vec<u8> },
    /// PNG image bytes
    Png(Vec<u8>),
    /// Complete HTML document embedding a plot
    Html { title: String, document: String },
}

impl RenderedOutput {
    pub fn mime_type(&self) -> &'static str {
        match self {
            RenderedOutput::Binary { .. } => "application/octet-stream",
            RenderedOutput::Png(_) => "image/png",
            RenderedOutput::Html { .. } => "text/html",
        }
    }

    /// Body bytes as they would be sent to a client
    pub fn body(&self) -> &[u8] {
        match self {
            RenderedOutput::Binary { bytes, .. } => bytes,
            RenderedOutput::Png(bytes) => bytes,
            RenderedOutput::Html { document, .. } => document.as_bytes(),
        }
    }
}

/// `count` evenly spaced instants from 0 to `stop_time` inclusive
pub fn time_base(stop_time: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => {
            let step = stop_time / (count - 1) as f64;
            let mut t: Vec<f64> = (0..count).map(|i| i as f64 * step).collect();
            t[count - 1] = stop_time;
            t
        }
    }
}

/// Render `signal` in the requested format
///
/// # Arguments
/// * `signal` - Finished, integer-valued samples
/// * `format` - Output encoding
/// * `stop_time` - Last instant of the time base in seconds
/// * `label` - Waveform label for file names and titles
/// * `axes` - Axes mode, only read for [`OutputFormat::StaticImage`]
#[instrument(level = "debug", skip(signal), fields(samples = signal.len()))]
pub fn dispatch(
    signal: &ScaledSignal,
    format: OutputFormat,
    stop_time: f64,
    label: &str,
    axes: Option<&str>,
) -> Result<RenderedOutput, DispatchError> {
    let samples = signal.samples();

    let output = match format {
        OutputFormat::Binary => RenderedOutput::Binary {
            filename: sc16::filename(label, Local::now()),
            bytes: sc16::encode(samples),
        },
        OutputFormat::StaticImage => {
            let axes = AxesMode::parse(axes)?;
            let config = rendering::rendering_config();
            let t = time_base(stop_time, samples.len());
            RenderedOutput::Png(png::render_png(samples, &t, label, axes, config)?)
        }
        OutputFormat::InteractiveGraph => {
            let config = rendering::rendering_config();
            let t = time_base(stop_time, samples.len());
            RenderedOutput::Html {
                title: graph::graph_title(label),
                document: graph::interactive(samples, &t, label, config),
            }
        }
        OutputFormat::ThreeDimGraph => {
            let config = rendering::rendering_config();
            let t = time_base(stop_time, samples.len());
            RenderedOutput::Html {
                title: graph::graph_title(label),
                document: graph::three_dim(samples, &t, label, config),
            }
        }
    };

    info!(
        ?format,
        mime = output.mime_type(),
        bytes = output.body().len(),
        "dispatched waveform"
    );
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pulse_train::WaveformKind;
    use num::complex::Complex64;

    fn example_signal() -> ScaledSignal {
        let train = vec![
            Complex64::new(1.0, 0.0),
            Complex64::new(0.0, 1.0),
            Complex64::new(-1.0, 0.0),
            Complex64::new(0.0, -1.0),
        ];
        ScaledSignal::from_train(&train, 1.0, 4.0, WaveformKind::Cw)
    }

    #[test]
    fn test_time_base() {
        assert!(time_base(1.0, 0).is_empty());
        assert_eq!(time_base(1.0, 1), vec![0.0]);
        assert_eq!(time_base(1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);

        let t = time_base(0.3, 7);
        assert_eq!(t.len(), 7);
        assert_eq!(t[6], 0.3);
    }

    #[test]
    fn test_binary_dispatch() {
        let signal = example_signal();
        let output = dispatch(&signal, OutputFormat::Binary, 0.75, "cw", None).unwrap();

        assert_eq!(output.mime_type(), "application/octet-stream");
        match output {
            RenderedOutput::Binary { filename, bytes } => {
                assert!(filename.starts_with("cw_"));
                assert!(filename.ends_with(".sc16"));
                // cw_ + YYYYMMDD_HHMMSS + .sc16
                assert_eq!(filename.len(), 3 + 15 + 5);
                assert_eq!(
                    bytes,
                    vec![
                        0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0xFF, 0xFF, 0x00, 0x00,
                        0x00, 0x00, 0xFF, 0xFF
                    ]
                );
            }
            other => panic!("expected binary output, got {:?}", other.mime_type()),
        }
    }

    #[test]
    fn test_bogus_axes_rejected() {
        let signal = example_signal();
        let result = dispatch(&signal, OutputFormat::StaticImage, 0.75, "cw", Some("bogus"));

        match result {
            Err(DispatchError::InvalidAxes { axes }) => assert_eq!(axes.as_deref(), Some("bogus")),
            other => panic!("expected InvalidAxes, got {:?}", other.map(|o| o.body().len())),
        }
    }

    #[test]
    fn test_missing_axes_rejected() {
        let signal = example_signal();
        assert!(matches!(
            dispatch(&signal, OutputFormat::StaticImage, 0.75, "cw", None),
            Err(DispatchError::InvalidAxes { axes: None })
        ));
    }

    #[test]
    fn test_axes_ignored_outside_static_image() {
        let signal = example_signal();
        let output = dispatch(&signal, OutputFormat::Binary, 0.75, "cw", Some("bogus"));
        assert!(output.is_ok());
    }

    #[test]
    fn test_graph_dispatch() {
        let signal = example_signal();

        let output = dispatch(&signal, OutputFormat::InteractiveGraph, 0.75, "lfm", None).unwrap();
        assert_eq!(output.mime_type(), "text/html");

        let output = dispatch(&signal, OutputFormat::ThreeDimGraph, 0.75, "lfm", None).unwrap();
        match output {
            RenderedOutput::Html { title, document } => {
                assert_eq!(title, "LFM Graph");
                assert!(document.contains("3D Representation of LFM"));
            }
            other => panic!("expected HTML output, got {:?}", other.mime_type()),
        }
    }

    #[test]
    fn test_dispatch_leaves_signal_untouched() {
        let signal = example_signal();
        let before = signal.clone();
        let _ = dispatch(&signal, OutputFormat::Binary, 0.75, "cw", None);
        let _ = dispatch(&signal, OutputFormat::InteractiveGraph, 0.75, "cw", None);
        assert_eq!(signal, before);
    }

    #[test]
    fn test_parse_formats_and_axes() {
        assert_eq!("sc16".parse::<OutputFormat>().unwrap(), OutputFormat::Binary);
        assert_eq!("threeDim".parse::<OutputFormat>().unwrap(), OutputFormat::ThreeDimGraph);
        assert!("gif".parse::<OutputFormat>().is_err());

        assert_eq!(AxesMode::parse(Some("IQVT")).unwrap(), AxesMode::TimeDomain);
        assert_eq!("iq-plane".parse::<AxesMode>().unwrap(), AxesMode::IqPlane);
    }
}
