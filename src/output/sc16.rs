//! SC16 IQ File Generation
//!
//! Raw complex sample dump as produced and consumed by most SDR tooling.
//!
//! **SC16 Format**:
//! - Interleaved I/Q pairs: real sample then imaginary sample
//! - 16-bit signed integers, little-endian
//! - No header, no metadata
//!
//! File names follow `{label}_{YYYYMMDD_HHMMSS}.sc16`.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Local};
use num::complex::Complex64;
use tracing::warn;

/// File extension of raw interleaved 16-bit IQ dumps
pub const EXTENSION: &str = "sc16";

/// Convert one component to i16, saturating at the type's limits
fn f64_to_i16(value: f64) -> i16 {
    // `as` saturates and maps NaN to 0
    value.round_ties_even() as i16
}

/// Encode complex samples as interleaved little-endian i16 pairs
///
/// # Example
/// ```
/// use num::complex::Complex64;
/// use rustypulse::output::sc16;
///
/// let bytes = sc16::encode(&[Complex64::new(1.0, -1.0)]);
/// assert_eq!(bytes, vec![0x01, 0x00, 0xFF, 0xFF]);
/// ```
pub fn encode(samples: &[Complex64]) -> Vec<u8> {
    let mut data = Vec::with_capacity(samples.len() * 4);
    let mut clipped = 0usize;

    for s in samples {
        for component in [s.re, s.im] {
            if component > i16::MAX as f64 || component < i16::MIN as f64 {
                clipped += 1;
            }
            data.extend_from_slice(&f64_to_i16(component).to_le_bytes());
        }
    }

    if clipped > 0 {
        warn!(clipped, "components exceeded the 16-bit range and were saturated");
    }
    data
}

/// Attachment file name for a waveform generated at `now`
pub fn filename(label: &str, now: DateTime<Local>) -> String {
    format!("{}_{}.{}", label, now.format("%Y%m%d_%H%M%S"), EXTENSION)
}

/// Write samples to disk as an SC16 file
pub fn write_sc16_file(path: impl AsRef<Path>, samples: &[Complex64]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(&encode(samples))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_encode_example() {
        let samples = vec![
            Complex64::new(1.0, 0.0),
            Complex64::new(0.0, 1.0),
            Complex64::new(-1.0, 0.0),
            Complex64::new(0.0, -1.0),
        ];
        let bytes = encode(&samples);

        assert_eq!(
            bytes,
            vec![
                0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00,
                0xFF, 0xFF
            ]
        );
    }

    #[test]
    fn test_encode_size() {
        let samples = vec![Complex64::new(0.0, 0.0); 1000];
        assert_eq!(encode(&samples).len(), 4000);
        assert!(encode(&[]).is_empty());
    }

    #[test]
    fn test_f64_to_i16_saturates() {
        assert_eq!(f64_to_i16(0.0), 0);
        assert_eq!(f64_to_i16(32767.0), 32767);
        assert_eq!(f64_to_i16(-32768.0), -32768);
        assert_eq!(f64_to_i16(40000.0), 32767);
        assert_eq!(f64_to_i16(-40000.0), -32768);
        assert_eq!(f64_to_i16(f64::NAN), 0);
    }

    #[test]
    fn test_encode_full_scale() {
        let bytes = encode(&[Complex64::new(32767.0, -32768.0)]);
        assert_eq!(i16::from_le_bytes([bytes[0], bytes[1]]), 32767);
        assert_eq!(i16::from_le_bytes([bytes[2], bytes[3]]), -32768);
    }

    #[test]
    fn test_filename_format() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(filename("lfm", now), "lfm_20240309_140507.sc16");
    }

    #[test]
    fn test_write_sc16_file() {
        let path = std::env::temp_dir().join("test_rustypulse.sc16");
        let samples = vec![Complex64::new(100.0, -100.0); 250];

        write_sc16_file(&path, &samples).expect("file should be written");

        let metadata = std::fs::metadata(&path).expect("File should exist");
        assert_eq!(metadata.len(), 1000);

        std::fs::remove_file(&path).ok();
    }
}
