use std::time::{Duration, Instant};

use crossterm::event::{self, Event};
use log::info;
use ratatui::{
    prelude::*,
    widgets::{
        block::{Position, Title},
        canvas::{Canvas, Line as CanvasLine, Points},
        *,
    },
};

use crate::{
    arm_replay::{ArmFrame, ArmReplay},
    gui::{terminal, GuiError},
    trace_file::TraceSample,
    Point,
};

const ROBOT: Color = Color::Rgb(0, 102, 204);
const ELLIPSE: Color = Color::Rgb(204, 77, 77);
const PATH: Color = Color::Rgb(255, 165, 0);
const DIRECTIONS: [Color; 2] = [Color::Rgb(0, 128, 0), Color::Rgb(77, 0, 179)];
const REFERENCE: Color = Color::Red;

const X_BOUNDS: [f64; 2] = [-11.0, 11.0];
const Y_BOUNDS: [f64; 2] = [0.0, 15.25];

/// Half the size of the cross marking the reference point.
const CROSS: f64 = 0.4;

/// Animate the arm through every usable sample of a trial, then hold the
/// last frame until the user quits. Returns how many principal axes passed
/// through the reference point.
pub fn arm_animation(
    samples: &[TraceSample],
    mut replay: ArmReplay,
    frame_time: Duration,
) -> Result<usize, GuiError> {
    let mut terminal = terminal::enter(false)?;
    let res = run(&mut terminal, samples, &mut replay, frame_time);
    terminal::leave(&mut terminal)?;
    res.map(|_| replay.through_count())
}

/// Wait up to `timeout` for a quit key. Other input is dropped.
fn quit_requested(timeout: Duration) -> Result<bool, GuiError> {
    let deadline = Instant::now() + timeout;
    loop {
        let left = deadline.saturating_duration_since(Instant::now());
        if !event::poll(left)? {
            return Ok(false);
        }
        if let Event::Key(key) = event::read()? {
            if terminal::is_quit(&key) {
                return Ok(true);
            }
        }
    }
}

fn run(
    terminal: &mut terminal::Tui,
    samples: &[TraceSample],
    replay: &mut ArmReplay,
    frame_time: Duration,
) -> Result<(), GuiError> {
    let mut shown = 0;
    let mut last = None;
    for sample in samples {
        let Some(frame) = replay.step(sample) else {
            continue;
        };
        shown += 1;
        info!("Axes through reference so far: {}", replay.through_count());

        terminal.draw(|f| ui(f, &frame, replay, shown))?;
        let mut pause = frame_time;
        // Give the viewer a moment to take in the starting pose.
        if shown == 2 {
            pause += Duration::from_secs(1);
        }
        if quit_requested(pause)? {
            return Ok(());
        }
        last = Some(frame);
    }

    let Some(frame) = last else {
        return Ok(());
    };
    loop {
        terminal.draw(|f| ui(f, &frame, replay, shown))?;
        if quit_requested(Duration::from_millis(250))? {
            return Ok(());
        }
    }
}

fn segment(a: Point, b: Point, color: Color) -> CanvasLine {
    CanvasLine {
        x1: a.x,
        y1: a.y,
        x2: b.x,
        y2: b.y,
        color,
    }
}

fn ui(f: &mut Frame, frame: &ArmFrame, replay: &ArmReplay, n: usize) {
    let title = Title::from(Span::from(format!(" 2R Robot Arm Simulation - Frame {} ", n)).bold());
    let legend = Title::from(Line::from(vec![
        " Robot ".fg(ROBOT),
        " Manip. Ellipse ".fg(ELLIPSE),
        " End-Effector Path ".fg(PATH),
        " Principal Dir 1 ".fg(DIRECTIONS[0]),
        " Principal Dir 2 ".fg(DIRECTIONS[1]),
        " Quit ".into(),
        "<Q> ".magenta().bold(),
    ]));
    let axes = Title::from(" X → / Y ↑ ");
    let block = Block::default()
        .title(title.alignment(Alignment::Center))
        .title(legend.alignment(Alignment::Center).position(Position::Bottom))
        .title(axes.alignment(Alignment::Left).position(Position::Bottom))
        .borders(Borders::ALL);

    let reference = replay.reference();
    let path = replay.path();
    let end = frame.end_effector();

    let canvas = Canvas::default()
        .block(block)
        .marker(symbols::Marker::Braille)
        .x_bounds(X_BOUNDS)
        .y_bounds(Y_BOUNDS)
        .paint(|ctx| {
            ctx.draw(&segment(
                Point::new(reference.x - CROSS, reference.y - CROSS),
                Point::new(reference.x + CROSS, reference.y + CROSS),
                REFERENCE,
            ));
            ctx.draw(&segment(
                Point::new(reference.x - CROSS, reference.y + CROSS),
                Point::new(reference.x + CROSS, reference.y - CROSS),
                REFERENCE,
            ));

            for w in frame.pose.windows(2) {
                ctx.draw(&segment(w[0], w[1], ROBOT));
            }
            let joints: Vec<(f64, f64)> = frame.pose.iter().map(|p| (p.x, p.y)).collect();
            ctx.draw(&Points {
                coords: &joints,
                color: ROBOT,
            });

            // dash-dot: draw every other segment
            for w in frame.ellipse.windows(2).step_by(2) {
                ctx.draw(&segment(w[0], w[1], ELLIPSE));
            }

            for w in path.windows(2) {
                ctx.draw(&segment(w[0], w[1], PATH));
            }

            ctx.layer();
            for (dir, color) in frame.directions.iter().zip(DIRECTIONS) {
                let tip = Point::new(end.x + dir[0], end.y + dir[1]);
                ctx.draw(&segment(end, tip, color));
                ctx.draw(&Points {
                    coords: &[(tip.x, tip.y)],
                    color,
                });
            }
        });

    f.render_widget(canvas, f.size());
}
