//! Scores every recorded trial against the ideal spiral, prints the
//! results, and charts accuracy over trials.

use clap::Parser;
use log::{error, info};
use spiral_hri::{
    args::AccuracyArgs, config::ExperimentConfig, gui::accuracy_chart, spiral::generate_spiral,
    trace_file::score_folder,
};
use std::{error::Error, process::ExitCode};

fn run() -> Result<(), Box<dyn Error>> {
    let args = AccuracyArgs::parse();
    let config = match &args.config {
        Some(path) => ExperimentConfig::from_path(path)?,
        None => ExperimentConfig::default(),
    };
    let dir = args.trace_dir(&config);
    let spiral = generate_spiral(&config.spiral);

    let scores = score_folder(&dir, &spiral, config.max_distance)?;
    for score in &scores {
        println!("Trial {}: Accuracy = {}%", score.trial, score.accuracy);
    }
    info!("Scored {} trials in {}", scores.len(), dir.display());

    if !args.no_plot && !scores.is_empty() {
        accuracy_chart(&scores)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("accuracy: {}", e);
            ExitCode::FAILURE
        }
    }
}
