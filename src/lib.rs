pub mod error;
pub mod filter;
pub mod modulation;
pub mod output;
pub mod pulse_train;
pub mod request;
pub mod sequence;
pub mod tracing_init;
pub mod waveform;

pub use error::{DispatchError, Error, ErrorPayload, GenerationError, ValidationError};
pub use output::{dispatch, rendering::initialize_rendering, AxesMode, OutputFormat, RenderedOutput};
pub use request::{handle, WaveformParams, WaveformRequest};
pub use waveform::{
    generate_bpsk, generate_bpsk_with_rng, generate_cw, generate_lfm, BpskParams, CwParams,
    LfmParams, ScaledSignal,
};
