//! Interactive HTML graphs
//!
//! Both graphs are self-contained plotly documents; the page loads
//! plotly.js itself, so the HTTP layer can serve the string as-is.

use num::complex::Complex64;
use plotly::common::{Marker, Mode, Title};
use plotly::layout::Axis;
use plotly::{Layout, Plot, Scatter, Scatter3D};
use tracing::debug;

use crate::output::rendering::{downsample_min_max, RenderConfig};

/// Time-domain graph of I and Q, titled `"{LABEL} Graph"`
///
/// Traces longer than the configured point budget are min/max downsampled
/// when downsampling is enabled.
pub fn interactive(signal: &[Complex64], t: &[f64], label: &str, config: &RenderConfig) -> String {
    let real: Vec<f64> = signal.iter().map(|s| s.re).collect();
    let imag: Vec<f64> = signal.iter().map(|s| s.im).collect();

    let ((real_t, real), (imag_t, imag)) = if config.downsample {
        (
            downsample_min_max(t, &real, config.max_points),
            downsample_min_max(t, &imag, config.max_points),
        )
    } else {
        ((t.to_vec(), real), (t.to_vec(), imag))
    };
    debug!(
        samples = signal.len(),
        plotted = real.len(),
        "building interactive graph"
    );

    let mut plot = Plot::new();
    plot.add_trace(Scatter::new(real_t, real).mode(Mode::Lines).name("real"));
    plot.add_trace(Scatter::new(imag_t, imag).mode(Mode::Lines).name("imag"));

    let layout = Layout::new()
        .title(Title::with_text(graph_title(label)))
        .x_axis(Axis::new().title(Title::with_text("Time (s)")))
        .y_axis(Axis::new().title(Title::with_text("Amplitude")))
        .height(config.graph_height);
    plot.set_layout(layout);

    plot.to_html()
}

/// 3D scatter of (I, Q, time), titled `"3D Representation of {LABEL}"`
pub fn three_dim(signal: &[Complex64], t: &[f64], label: &str, config: &RenderConfig) -> String {
    let real: Vec<f64> = signal.iter().map(|s| s.re).collect();
    let imag: Vec<f64> = signal.iter().map(|s| s.im).collect();
    debug!(samples = signal.len(), "building 3D graph");

    let mut plot = Plot::new();
    plot.add_trace(
        Scatter3D::new(real, imag, t.to_vec())
            .mode(Mode::Markers)
            .marker(Marker::new().size(config.marker_size)),
    );
    plot.set_layout(
        Layout::new()
            .title(Title::with_text(three_dim_title(label)))
            .height(config.three_dim_height),
    );

    plot.to_html()
}

pub fn graph_title(label: &str) -> String {
    format!("{} Graph", label.to_uppercase())
}

pub fn three_dim_title(label: &str) -> String {
    format!("3D Representation of {}", label.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> (Vec<Complex64>, Vec<f64>) {
        let signal = (0..n).map(|i| Complex64::new(i as f64, -(i as f64))).collect();
        let t = (0..n).map(|i| i as f64 * 1e-3).collect();
        (signal, t)
    }

    #[test]
    fn test_interactive_graph_document() {
        let (signal, t) = ramp(50);
        let html = interactive(&signal, &t, "lfm", &RenderConfig::default());

        assert!(html.contains("<html"));
        assert!(html.contains("LFM Graph"));
        assert!(html.contains("Time (s)"));
    }

    #[test]
    fn test_three_dim_graph_document() {
        let (signal, t) = ramp(50);
        let html = three_dim(&signal, &t, "bpsk", &RenderConfig::default());

        assert!(html.contains("3D Representation of BPSK"));
        assert!(html.contains("scatter3d"));
    }

    #[test]
    fn test_titles() {
        assert_eq!(graph_title("cw"), "CW Graph");
        assert_eq!(three_dim_title("lfm"), "3D Representation of LFM");
    }
}
