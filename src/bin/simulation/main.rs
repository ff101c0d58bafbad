//! Replays the encoder angles of one recorded trial through the arm's
//! kinematics, animating its manipulability ellipse.

use clap::Parser;
use log::{error, info};
use spiral_hri::{
    args::SimulationArgs,
    arm_replay::{ArmReplay, AXIS_NAMES},
    gui::arm_animation,
    trace_file::read_trace_path,
};
use std::{error::Error, process::ExitCode, time::Duration};

fn run() -> Result<(), Box<dyn Error>> {
    let args = SimulationArgs::parse();
    let samples = read_trace_path(&args.trace)?;
    let mut replay = ArmReplay::new(args.reference_point());
    info!("Replaying {} samples from {}", samples.len(), args.trace.display());

    let through = if args.headless {
        let mut frames = 0;
        for frame in samples.iter().filter_map(|s| replay.step(s)) {
            frames += 1;
            for (name, axis) in AXIS_NAMES.iter().zip(frame.axes.iter()) {
                println!("{} Axis Equation: {}", name, axis);
            }
        }
        info!("Replayed {} frames", frames);
        replay.through_count()
    } else {
        arm_animation(&samples, replay, Duration::from_millis(args.frame_ms))?
    };

    println!("{}", through);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("simulation: {}", e);
            ExitCode::FAILURE
        }
    }
}
