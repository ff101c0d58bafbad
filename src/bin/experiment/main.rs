//! Runs the spiral tracing experiment.
//!
//! Example:
//!
//! ```text
//! cargo run --bin experiment -- --device /dev/ttyACM0 --trial 50
//! cargo run --bin experiment -- --dummy
//! ```

use chrono::Local;
use clap::Parser;
use log::{error, info};
use spiral_hri::{
    args::ExperimentArgs,
    config::ExperimentConfig,
    encoder_monitor::{DummyEncoder, EncoderSource, SerialEncoder},
    experiment::Experiment,
    gui::{device_selector, tracing_window},
    trace_file::save_trial,
};
use std::{error::Error, process::ExitCode};

fn open_encoder(
    args: &ExperimentArgs,
    config: &ExperimentConfig,
) -> Result<Box<dyn EncoderSource>, Box<dyn Error>> {
    if args.dummy {
        info!("Using simulated encoder readings");
        return Ok(Box::new(DummyEncoder::default()));
    }

    let device = match &config.device {
        Some(device) => device.clone(),
        None => {
            let ports = SerialEncoder::available_ports()?;
            match device_selector(ports)? {
                Some(port) => port.to_string_lossy().into_owned(),
                None => return Err("no encoder device selected".into()),
            }
        }
    };

    Ok(Box::new(SerialEncoder::open(&device, config.baud)?))
}

fn run() -> Result<(), Box<dyn Error>> {
    let args = ExperimentArgs::parse();
    let config = match &args.config {
        Some(path) => ExperimentConfig::from_path(path)?,
        None => ExperimentConfig::default(),
    };
    let config = args.apply(config);

    let mut encoder = open_encoder(&args, &config)?;
    let mut experiment = Experiment::new(&config);
    let out_dir = config.out_dir.clone();

    let res = tracing_window(&mut experiment, encoder.as_ref(), |outcome| {
        save_trial(&out_dir, outcome.trial, &outcome.samples, Local::now())
    });
    encoder.stop();
    res?;

    info!("Session ended before trial {}", experiment.trial());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("experiment: {}", e);
            ExitCode::FAILURE
        }
    }
}
