//! Process-wide rendering setup
//!
//! Plots are rendered headless into in-memory bitmaps and interactive
//! graphs are downsampled before they reach the browser. Both choices are
//! made once per process by [`initialize_rendering`] and never change
//! afterwards; every later call is a no-op returning the installed config.

use once_cell::sync::OnceCell;
use tracing::{debug, info};

static RENDERING: OnceCell<RenderConfig> = OnceCell::new();

/// Rendering settings shared by every request
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Downsample interactive traces that exceed `max_points`
    pub downsample: bool,
    /// Point budget per interactive trace
    pub max_points: usize,
    /// Static image width in pixels
    pub image_width: u32,
    /// Static image height in pixels
    pub image_height: u32,
    /// Interactive graph height in pixels
    pub graph_height: usize,
    /// 3D graph height in pixels
    pub three_dim_height: usize,
    /// 3D scatter marker size
    pub marker_size: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            downsample: true,
            max_points: 1000,
            image_width: 640,
            image_height: 480,
            graph_height: 750,
            three_dim_height: 800,
            marker_size: 5,
        }
    }
}

/// Install the default rendering config, once
pub fn initialize_rendering() -> &'static RenderConfig {
    initialize_rendering_with(RenderConfig::default())
}

/// Install `config` if rendering has not been initialized yet
///
/// Returns the config actually in effect, which is the earlier one when
/// another caller got there first.
pub fn initialize_rendering_with(config: RenderConfig) -> &'static RenderConfig {
    let mut installed = false;
    let active = RENDERING.get_or_init(|| {
        installed = true;
        config
    });

    if installed {
        info!(
            downsample = active.downsample,
            max_points = active.max_points,
            "rendering initialized with headless bitmap backend"
        );
    } else {
        debug!("rendering already initialized");
    }
    active
}

/// Config in effect, initializing with defaults on first use
pub fn rendering_config() -> &'static RenderConfig {
    match RENDERING.get() {
        Some(config) => config,
        None => initialize_rendering(),
    }
}

/// Min/max decimation of one trace down to at most `max_points` points
///
/// The trace is split into `max_points / 2` buckets and each bucket keeps
/// its smallest and largest sample in time order, so peaks survive.
pub fn downsample_min_max(x: &[f64], y: &[f64], max_points: usize) -> (Vec<f64>, Vec<f64>) {
    let len = x.len().min(y.len());
    if len <= max_points || max_points < 2 {
        return (x[..len].to_vec(), y[..len].to_vec());
    }

    let buckets = max_points / 2;
    let mut out_x = Vec::with_capacity(2 * buckets);
    let mut out_y = Vec::with_capacity(2 * buckets);

    for b in 0..buckets {
        let start = b * len / buckets;
        let end = ((b + 1) * len / buckets).max(start + 1);

        let (mut lo, mut hi) = (start, start);
        for i in start..end {
            if y[i] < y[lo] {
                lo = i;
            }
            if y[i] > y[hi] {
                hi = i;
            }
        }

        let (first, second) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        out_x.push(x[first]);
        out_y.push(y[first]);
        if second != first {
            out_x.push(x[second]);
            out_y.push(y[second]);
        }
    }

    (out_x, out_y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_is_idempotent() {
        let first = initialize_rendering();
        let second = initialize_rendering_with(RenderConfig {
            max_points: 7,
            ..Default::default()
        });

        assert!(std::ptr::eq(first, second));
        assert!(std::ptr::eq(first, rendering_config()));
    }

    #[test]
    fn test_short_trace_untouched() {
        let x = vec![0.0, 1.0, 2.0];
        let y = vec![5.0, -5.0, 1.0];
        let (dx, dy) = downsample_min_max(&x, &y, 10);
        assert_eq!(dx, x);
        assert_eq!(dy, y);
    }

    #[test]
    fn test_downsample_respects_budget_and_extremes() {
        let n = 10_000;
        let x: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let mut y: Vec<f64> = (0..n).map(|i| (i as f64 * 0.01).sin()).collect();
        y[1234] = 50.0;
        y[8765] = -50.0;

        let (dx, dy) = downsample_min_max(&x, &y, 1000);

        assert!(dx.len() <= 1000);
        assert_eq!(dx.len(), dy.len());
        assert!(dy.contains(&50.0));
        assert!(dy.contains(&-50.0));
        assert!(dx.windows(2).all(|w| w[0] < w[1]), "time must stay ordered");
    }
}
