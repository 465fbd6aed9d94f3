//! Log subscriber setup
//!
//! `RUST_LOG` always wins. Useful directives:
//! - `RUST_LOG=rustypulse::pulse_train=trace` - one line per padded pulse
//! - `RUST_LOG=rustypulse::filter=debug` - designed tap counts and cutoffs
//! - `RUST_LOG=rustypulse=info,rustypulse::output=debug` - rendering detail
//!
//! Without it, tests log warnings only and the binary logs at the level
//! picked by its `-v` count.

use tracing_subscriber::{fmt, EnvFilter};

/// `RUST_LOG`, or `fallback` when unset or unparsable
fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Directive for the binary at a given `-v` count
pub fn verbosity_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "rustypulse=info",
        1 => "rustypulse=debug",
        _ => "rustypulse=trace",
    }
}

/// Route test logs through the harness's captured output
///
/// Safe to call from every test; only the first call installs anything.
#[cfg(test)]
pub fn init_test_tracing() {
    use once_cell::sync::Lazy;

    static SUBSCRIBER: Lazy<()> = Lazy::new(|| {
        // Another test binary in the same process may own the global subscriber
        let _ = fmt()
            .with_env_filter(env_filter("rustypulse=warn"))
            .with_line_number(true)
            .with_test_writer()
            .try_init();
    });

    Lazy::force(&SUBSCRIBER);
}

/// Install the binary's subscriber, writing to stderr
///
/// Written files are the binary's only output, so stderr carries both logs
/// and the JSON error payload.
pub fn init_tracing(verbosity: u8) {
    fmt()
        .with_env_filter(env_filter(verbosity_directive(verbosity)))
        .with_target(verbosity > 0)
        .with_line_number(verbosity > 1)
        .with_writer(std::io::stderr)
        .init();
}
