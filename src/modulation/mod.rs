//! Elementary pulse synthesis
//!
//! Each generator produces one unpadded pulse of complex baseband samples:
//! - [`cw::tone`]: constant-frequency phasor
//! - [`lfm::chirp`]: linear frequency sweep
//! - [`bpsk::chip_waveform`]: rectangular ±1 chips from a bit sequence

pub mod bpsk;
pub mod cw;
pub mod lfm;

pub use bpsk::{chip_waveform, pulse_length};
pub use cw::tone;
pub use lfm::chirp;
