//! Static PNG plots
//!
//! Draws into an in-memory RGB bitmap with `plotters` and encodes the result
//! as PNG, so no display or temporary file is ever needed.

use std::io::Cursor;

use num::complex::Complex64;
use plotters::prelude::*;
use snafu::ResultExt;
use tracing::debug;

use crate::error::{DispatchError, ImageEncodingSnafu};
use crate::output::rendering::RenderConfig;
use crate::output::AxesMode;

/// Map any plotters error into a dispatch error
fn render_err<E: std::fmt::Display>(e: E) -> DispatchError {
    DispatchError::Render {
        message: e.to_string(),
    }
}

/// Axis range covering `values`, widened when the data is flat or empty
fn span(values: impl Iterator<Item = f64>) -> std::ops::Range<f64> {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });

    if !lo.is_finite() || !hi.is_finite() {
        -1.0..1.0
    } else if lo == hi {
        (lo - 1.0)..(hi + 1.0)
    } else {
        let margin = 0.05 * (hi - lo);
        (lo - margin)..(hi + margin)
    }
}

/// Render `signal` as a PNG
///
/// # Arguments
/// * `signal` - Complex samples
/// * `t` - Time base, same length as `signal`
/// * `label` - Waveform label used in the title
/// * `axes` - Time-domain (I and Q against time) or IQ-plane (Q against I)
/// * `config` - Image dimensions
pub fn render_png(
    signal: &[Complex64],
    t: &[f64],
    label: &str,
    axes: AxesMode,
    config: &RenderConfig,
) -> Result<Vec<u8>, DispatchError> {
    let (width, height) = (config.image_width, config.image_height);
    let mut buffer = vec![0u8; width as usize * height as usize * 3];

    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let label = label.to_uppercase();
        match axes {
            AxesMode::TimeDomain => {
                let x_range = span(t.iter().copied());
                let y_range = span(signal.iter().flat_map(|s| [s.re, s.im]));

                let mut chart = ChartBuilder::on(&root)
                    .caption(format!("{} Signal in Time Domain", label), ("sans-serif", 20))
                    .margin(10)
                    .x_label_area_size(40)
                    .y_label_area_size(60)
                    .build_cartesian_2d(x_range, y_range)
                    .map_err(render_err)?;

                chart
                    .configure_mesh()
                    .x_desc("Time (s)")
                    .y_desc("Amplitude")
                    .draw()
                    .map_err(render_err)?;

                chart
                    .draw_series(LineSeries::new(
                        t.iter().zip(signal).map(|(&x, s)| (x, s.re)),
                        &BLUE,
                    ))
                    .map_err(render_err)?
                    .label("In-phase (I)")
                    .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));

                chart
                    .draw_series(LineSeries::new(
                        t.iter().zip(signal).map(|(&x, s)| (x, s.im)),
                        &RED,
                    ))
                    .map_err(render_err)?
                    .label("Quadrature (Q)")
                    .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));

                chart
                    .configure_series_labels()
                    .background_style(&WHITE.mix(0.8))
                    .border_style(&BLACK)
                    .draw()
                    .map_err(render_err)?;
            }
            AxesMode::IqPlane => {
                let x_range = span(signal.iter().map(|s| s.re));
                let y_range = span(signal.iter().map(|s| s.im));

                let mut chart = ChartBuilder::on(&root)
                    .caption(format!("{} In-phase vs Quadrature", label), ("sans-serif", 20))
                    .margin(10)
                    .x_label_area_size(40)
                    .y_label_area_size(60)
                    .build_cartesian_2d(x_range, y_range)
                    .map_err(render_err)?;

                chart
                    .configure_mesh()
                    .x_desc("In-phase (I)")
                    .y_desc("Quadrature (Q)")
                    .draw()
                    .map_err(render_err)?;

                chart
                    .draw_series(LineSeries::new(signal.iter().map(|s| (s.re, s.im)), &BLUE))
                    .map_err(render_err)?
                    .label("Trajectory")
                    .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));

                chart
                    .configure_series_labels()
                    .background_style(&WHITE.mix(0.8))
                    .border_style(&BLACK)
                    .draw()
                    .map_err(render_err)?;
            }
        }

        root.present().map_err(render_err)?;
    }

    let img = image::RgbImage::from_raw(width, height, buffer).ok_or_else(|| DispatchError::Render {
        message: "bitmap buffer does not match image dimensions".to_string(),
    })?;

    let mut png = Cursor::new(Vec::new());
    img.write_to(&mut png, image::ImageOutputFormat::Png)
        .context(ImageEncodingSnafu)?;

    let png = png.into_inner();
    debug!(bytes = png.len(), ?axes, "rendered PNG");
    Ok(png)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_handles_flat_and_empty_data() {
        assert_eq!(span(std::iter::empty()), -1.0..1.0);
        assert_eq!(span([3.0, 3.0].into_iter()), 2.0..4.0);

        let r = span([0.0, 10.0].into_iter());
        assert!(r.start < 0.0 && r.end > 10.0);
    }

    #[test]
    #[ignore] // Needs a system sans-serif font - run with: cargo test -- --ignored
    fn test_render_png_signature() {
        let signal: Vec<Complex64> = (0..200)
            .map(|i| Complex64::from_polar(100.0, i as f64 * 0.1))
            .collect();
        let t: Vec<f64> = (0..200).map(|i| i as f64 * 1e-3).collect();
        let config = RenderConfig::default();

        for axes in [AxesMode::TimeDomain, AxesMode::IqPlane] {
            let png = render_png(&signal, &t, "cw", axes, &config).unwrap();
            assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        }
    }
}
