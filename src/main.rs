use std::fs;
use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::info;

use rustypulse::sequence::SequenceType;
use rustypulse::tracing_init::init_tracing;
use rustypulse::{
    handle, initialize_rendering, BpskParams, CwParams, Error, LfmParams, OutputFormat,
    RenderedOutput, WaveformParams, WaveformRequest,
};

#[derive(Parser)]
#[command(author, version, about = "Radar pulse-train waveform generator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// binary | static-image | interactive-graph | 3d-graph
    #[arg(short, long, global = true, default_value = "binary")]
    format: String,

    /// time-domain | iq-plane (static images only)
    #[arg(short, long, global = true)]
    axes: Option<String>,

    /// Output path; defaults to a name derived from the waveform
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// More log detail on stderr (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Args)]
struct Common {
    #[arg(long, default_value_t = 1e6)]
    sample_rate: f64,
    #[arg(long, default_value_t = 2000.0)]
    amplitude: f64,
}

#[derive(Subcommand)]
enum Commands {
    /// Continuous-wave tone pulses
    Cw {
        #[command(flatten)]
        common: Common,
        #[arg(long, default_value_t = 0.0)]
        frequency: f64,
        #[arg(long, default_value_t = 1e-3)]
        pulse_width: f64,
        #[arg(long)]
        pri: Option<f64>,
        #[arg(long, default_value_t = 1)]
        num_pulses: usize,
    },
    /// Linear-FM chirp pulses
    Lfm {
        #[command(flatten)]
        common: Common,
        #[arg(long, default_value_t = -100e3, allow_negative_numbers = true)]
        fstart: f64,
        #[arg(long, default_value_t = 100e3, allow_negative_numbers = true)]
        fstop: f64,
        #[arg(long, default_value_t = 1e-4)]
        pulse_width: f64,
        #[arg(long, default_value_t = 1e-3)]
        pri: f64,
        #[arg(long, default_value_t = 4)]
        num_pulses: usize,
    },
    /// Filtered BPSK phase-coded pulses
    Bpsk {
        #[command(flatten)]
        common: Common,
        #[arg(long, default_value_t = 200e3)]
        cutoff_freq: f64,
        #[arg(long, default_value_t = 31)]
        num_taps: usize,
        #[arg(long, default_value_t = 13)]
        num_bits: usize,
        #[arg(long, default_value_t = 1e-5)]
        bit_length: f64,
        /// random | mls
        #[arg(long, default_value = "random")]
        sequence_type: SequenceType,
        #[arg(long, default_value_t = 1)]
        pulse_reps: usize,
        /// Defaults to bit_length * 2^(num_bits - 1)
        #[arg(long)]
        pri: Option<f64>,
        #[arg(long, default_value_t = 4)]
        num_pulses: usize,
    },
}

impl Commands {
    fn into_params(self) -> WaveformParams {
        match self {
            Commands::Cw { common, frequency, pulse_width, pri, num_pulses } => {
                WaveformParams::Cw(CwParams {
                    sample_rate: common.sample_rate,
                    frequency,
                    pulse_width,
                    pri,
                    num_pulses,
                    amplitude: common.amplitude,
                })
            }
            Commands::Lfm { common, fstart, fstop, pulse_width, pri, num_pulses } => {
                WaveformParams::Lfm(LfmParams {
                    sample_rate: common.sample_rate,
                    fstart,
                    fstop,
                    pulse_width,
                    pri,
                    num_pulses,
                    amplitude: common.amplitude,
                })
            }
            Commands::Bpsk {
                common,
                cutoff_freq,
                num_taps,
                num_bits,
                bit_length,
                sequence_type,
                pulse_reps,
                pri,
                num_pulses,
            } => WaveformParams::Bpsk(BpskParams {
                sample_rate: common.sample_rate,
                cutoff_freq,
                num_taps,
                num_bits,
                bit_length,
                sequence_type,
                pulse_reps,
                pri,
                num_pulses,
                amplitude: common.amplitude,
            }),
        }
    }
}

/// Default file for an output when no path was given
fn default_path(output: &RenderedOutput, label: &str) -> PathBuf {
    match output {
        RenderedOutput::Binary { filename, .. } => PathBuf::from(filename),
        RenderedOutput::Png(_) => PathBuf::from(format!("{}.png", label)),
        RenderedOutput::Html { .. } => PathBuf::from(format!("{}.html", label)),
    }
}

fn fail(err: Error) -> ! {
    eprintln!("{}", err.payload().to_json());
    std::process::exit(1);
}

fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);
    initialize_rendering();

    let format: OutputFormat = match cli.format.parse() {
        Ok(format) => format,
        Err(e) => fail(Error::from(e)),
    };

    let request = WaveformRequest {
        params: cli.command.into_params(),
        format,
        axes: cli.axes,
    };
    let label = request.params.label();

    let output = match handle(&request) {
        Ok(output) => output,
        Err(e) => {
            tracing::error!(status = e.status_code(), "{}", e);
            fail(e)
        }
    };

    let path = cli.output.unwrap_or_else(|| default_path(&output, label));
    if let Err(e) = fs::write(&path, output.body()) {
        eprintln!("Failed to write {}: {}", path.display(), e);
        std::process::exit(1);
    }

    info!(path = %path.display(), mime = output.mime_type(), "wrote output");
}
