// Commandline argument parsers using clap for the three programs

use clap::Parser;
use std::path::PathBuf;

use crate::{config::ExperimentConfig, Point};

/// Run the spiral tracing experiment
#[derive(Debug, Parser, Clone)]
#[clap(version, about)]
pub struct ExperimentArgs {
    /// RON configuration file; command line flags take precedence over it
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Serial device the arm's encoders are attached to
    #[arg(short = 'd', long = "device", conflicts_with = "dummy")]
    pub device: Option<String>,

    /// Baud rate of the serial device
    #[arg(short = 'b', long = "baud")]
    pub baud: Option<u32>,

    /// Use simulated encoder readings instead of a serial device
    #[arg(long)]
    pub dummy: bool,

    /// Number of the first trial in this session
    #[arg(short = 't', long = "trial")]
    pub trial: Option<u32>,

    /// Folder that trace files are written to
    #[arg(short = 'o', long = "out")]
    pub out_dir: Option<PathBuf>,
}

impl ExperimentArgs {
    /// Apply the flags that were given on top of `config`.
    pub fn apply(&self, mut config: ExperimentConfig) -> ExperimentConfig {
        if let Some(device) = &self.device {
            config.device = Some(device.clone());
        }
        if let Some(baud) = self.baud {
            config.baud = baud;
        }
        if let Some(trial) = self.trial {
            config.start_trial = trial;
        }
        if let Some(out_dir) = &self.out_dir {
            config.out_dir = out_dir.clone();
        }
        config
    }
}

/// Score every recorded trial and plot accuracy over trials
#[derive(Debug, Parser, Clone)]
#[clap(version, about)]
pub struct AccuracyArgs {
    /// RON configuration the trials were recorded with
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Folder holding the trace files, the config's output folder by default
    #[arg(short = 'd', long = "dir")]
    pub dir: Option<PathBuf>,

    /// Only print the scores, do not open the chart
    #[arg(long)]
    pub no_plot: bool,
}

impl AccuracyArgs {
    /// The folder to score, given the configuration in use.
    pub fn trace_dir(&self, config: &ExperimentConfig) -> PathBuf {
        self.dir.clone().unwrap_or_else(|| config.out_dir.clone())
    }
}

/// Replay a recorded trial through the arm's kinematics
#[derive(Debug, Parser, Clone)]
#[clap(version, about)]
pub struct SimulationArgs {
    /// Trace file to replay
    pub trace: PathBuf,

    /// Only log the principal axis equations, do not animate
    #[arg(long)]
    pub headless: bool,

    /// Point to test principal axes against, as X Y
    #[arg(
        short = 'r',
        long = "reference",
        num_args = 2,
        value_names = ["X", "Y"],
        default_values_t = [400.0, 300.0],
        allow_negative_numbers = true
    )]
    pub reference: Vec<f64>,

    /// Milliseconds between animation frames
    #[arg(long = "frame-ms", default_value_t = 10)]
    pub frame_ms: u64,
}

impl SimulationArgs {
    /// The reference point given on the command line.
    pub fn reference_point(&self) -> Point {
        match self.reference.as_slice() {
            [x, y] => Point::new(*x, *y),
            _ => Point::new(400.0, 300.0),
        }
    }
}
