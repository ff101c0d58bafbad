use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, MouseButton, MouseEventKind};
use log::info;
use ratatui::{
    prelude::*,
    widgets::{
        canvas::{Canvas, Line as CanvasLine},
        *,
    },
};

use crate::{
    encoder_monitor::EncoderSource,
    experiment::{countdown_scale, Experiment, ExperimentState, TrialOutcome},
    gui::{terminal, GuiError},
    trace_file::TraceFileError,
    Point,
};

const FRAME: Duration = Duration::from_micros(16_667);

const BACKGROUND: (u8, u8, u8) = (173, 239, 209);
const INK: (u8, u8, u8) = (0, 32, 63);
const TRACE: Color = Color::Rgb(255, 0, 0);

/// Opacity of the veil drawn over the spiral between trials, out of 255.
const OVERLAY_ALPHA: u16 = 180;

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(r, g, b)
}

/// `fg` seen through the between-trials veil.
fn veiled((r, g, b): (u8, u8, u8)) -> Color {
    let mix = |fg: u8, bg: u8| {
        ((fg as u16 * (255 - OVERLAY_ALPHA) + bg as u16 * OVERLAY_ALPHA) / 255) as u8
    };
    Color::Rgb(
        mix(r, BACKGROUND.0),
        mix(g, BACKGROUND.1),
        mix(b, BACKGROUND.2),
    )
}

/// Maps terminal cells onto the experiment's window pixels.
#[derive(Debug, Clone, Copy)]
struct Viewport {
    area: Rect,
    width: f64,
    height: f64,
}

impl Viewport {
    /// The pixel at the center of the cell at `(column, row)`, or `None`
    /// outside the drawing area.
    fn to_window(&self, column: u16, row: u16) -> Option<Point> {
        let a = self.area;
        if a.width == 0
            || a.height == 0
            || column < a.x
            || row < a.y
            || column >= a.x + a.width
            || row >= a.y + a.height
        {
            return None;
        }
        Some(Point::new(
            ((column - a.x) as f64 + 0.5) * self.width / a.width as f64,
            ((row - a.y) as f64 + 0.5) * self.height / a.height as f64,
        ))
    }

    /// Canvas coordinates have y growing upward.
    fn flip(&self, p: Point) -> (f64, f64) {
        (p.x, self.height - p.y)
    }
}

/// Tracks the left mouse button across events.
#[derive(Debug, Default)]
struct PointerState {
    held: bool,
    cell: Option<(u16, u16)>,
}

impl PointerState {
    fn on_mouse(&mut self, kind: MouseEventKind, column: u16, row: u16) {
        match kind {
            MouseEventKind::Down(MouseButton::Left) | MouseEventKind::Drag(MouseButton::Left) => {
                self.held = true;
                self.cell = Some((column, row));
            }
            MouseEventKind::Up(MouseButton::Left) => self.held = false,
            MouseEventKind::Moved => self.cell = Some((column, row)),
            _ => {}
        }
    }

    fn pressed_at(&self, viewport: &Viewport) -> Option<Point> {
        if !self.held {
            return None;
        }
        self.cell.and_then(|(c, r)| viewport.to_window(c, r))
    }
}

/// What gets printed about a finished trial once it has been saved to
/// `path`.
fn trial_report(outcome: &TrialOutcome, path: &Path) -> [String; 2] {
    [
        format!("Saved trial {} to {}", outcome.trial, path.display()),
        format!("Accuracy for trial {}: {}%", outcome.trial, outcome.accuracy),
    ]
}

/// Run the tracing experiment in the terminal until the participant quits.
/// Every finished trial is handed to `on_outcome`, which saves it and
/// returns where it went. A report on each saved trial is printed once the
/// terminal has been restored.
pub fn tracing_window<F>(
    experiment: &mut Experiment,
    encoder: &dyn EncoderSource,
    on_outcome: F,
) -> Result<(), GuiError>
where
    F: FnMut(&TrialOutcome) -> Result<PathBuf, TraceFileError>,
{
    let mut report = Vec::new();
    let mut terminal = terminal::enter(true)?;
    let res = run(&mut terminal, experiment, encoder, on_outcome, &mut report);
    terminal::leave(&mut terminal)?;
    for line in &report {
        println!("{}", line);
    }
    res
}

fn run<F>(
    terminal: &mut terminal::Tui,
    experiment: &mut Experiment,
    encoder: &dyn EncoderSource,
    mut on_outcome: F,
    report: &mut Vec<String>,
) -> Result<(), GuiError>
where
    F: FnMut(&TrialOutcome) -> Result<PathBuf, TraceFileError>,
{
    let clock = Instant::now();
    let mut pointer = PointerState::default();
    let (width, height) = experiment.window_size();
    let (width, height) = (width as f64, height as f64);

    loop {
        let frame_start = Instant::now();
        let viewport = Viewport {
            area: terminal.size()?,
            width,
            height,
        };

        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) if terminal::is_quit(&key) => return Ok(()),
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if key.code == KeyCode::Enter {
                        experiment.press_enter(now_ms(clock));
                    }
                }
                Event::Mouse(m) => pointer.on_mouse(m.kind, m.column, m.row),
                _ => {}
            }
        }

        let now = now_ms(clock);
        let held = pointer.pressed_at(&viewport);
        if let Some(outcome) = experiment.tick(now, held, encoder.latest()) {
            let path = on_outcome(&outcome)?;
            info!("Trial {} done", outcome.trial);
            report.extend(trial_report(&outcome, &path));
        }

        terminal.draw(|f| ui(f, experiment, &viewport, now))?;

        if let Some(rest) = FRAME.checked_sub(frame_start.elapsed()) {
            spin_sleep::sleep(rest);
        }
    }
}

fn now_ms(clock: Instant) -> u64 {
    clock.elapsed().as_millis() as u64
}

fn ui(f: &mut Frame, experiment: &Experiment, viewport: &Viewport, now: u64) {
    let state = experiment.state();
    let recording = matches!(state, ExperimentState::Recording { .. });
    let spiral_color = if recording { rgb(INK) } else { veiled(INK) };

    let spiral: Vec<(f64, f64)> = experiment.spiral().iter().map(|p| viewport.flip(*p)).collect();
    let trace: Vec<(f64, f64)> = experiment
        .trace()
        .iter()
        .map(|s| viewport.flip(s.point()))
        .collect();

    let canvas = Canvas::default()
        .background_color(rgb(BACKGROUND))
        .marker(symbols::Marker::Braille)
        .x_bounds([0.0, viewport.width])
        .y_bounds([0.0, viewport.height])
        .paint(move |ctx| {
            for w in spiral.windows(2) {
                ctx.draw(&CanvasLine {
                    x1: w[0].0,
                    y1: w[0].1,
                    x2: w[1].0,
                    y2: w[1].1,
                    color: spiral_color,
                });
            }
            if trace.len() > 1 {
                ctx.layer();
                for w in trace.windows(2) {
                    ctx.draw(&CanvasLine {
                        x1: w[0].0,
                        y1: w[0].1,
                        x2: w[1].0,
                        y2: w[1].1,
                        color: TRACE,
                    });
                }
            }
        });
    f.render_widget(canvas, viewport.area);

    let ink = Style::default().fg(rgb(INK)).bg(rgb(BACKGROUND));
    let bold = ink.add_modifier(Modifier::BOLD);
    let area = viewport.area;
    let line_at = |row: u16| {
        Rect::new(
            area.x,
            area.y + row.min(area.height.saturating_sub(1)),
            area.width,
            1u16.min(area.height),
        )
    };

    f.render_widget(
        Paragraph::new(format!(" Trial: {}", experiment.trial())).style(bold),
        line_at(0),
    );

    let middle = area.height / 2;
    match state {
        ExperimentState::WaitForEnter => {
            f.render_widget(
                Paragraph::new("Trial Ended! Press ENTER to start next trial")
                    .style(bold)
                    .alignment(Alignment::Center),
                line_at(middle.saturating_sub(1)),
            );
            if let Some(accuracy) = experiment.last_accuracy() {
                f.render_widget(
                    Paragraph::new(format!("Accuracy: {}%", accuracy))
                        .style(ink)
                        .alignment(Alignment::Center),
                    line_at(middle + 1),
                );
            }
        }
        ExperimentState::Countdown { started_ms } => {
            let elapsed = now.saturating_sub(started_ms);
            let n = experiment.countdown_number(elapsed);
            let pad = " ".repeat(((countdown_scale(elapsed) - 1.2) * 40.0).round() as usize);
            f.render_widget(
                Paragraph::new(format!("{pad}{n}{pad}"))
                    .style(bold.add_modifier(Modifier::REVERSED))
                    .alignment(Alignment::Center),
                line_at(middle),
            );
        }
        ExperimentState::Recording { started_ms } => {
            let elapsed = now.saturating_sub(started_ms);
            let msg = format!("Time left: {}s ", experiment.remaining_secs(elapsed));
            let w = (msg.len() as u16).min(area.width);
            f.render_widget(
                Paragraph::new(msg).style(bold),
                Rect::new(area.x + area.width - w, area.y, w, 1u16.min(area.height)),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport {
            area: Rect::new(0, 0, 80, 40),
            width: 800.0,
            height: 800.0,
        }
    }

    #[test]
    fn cells_map_to_window_pixels() {
        let vp = viewport();
        assert_eq!(vp.to_window(0, 0), Some(Point::new(5.0, 10.0)));
        assert_eq!(vp.to_window(40, 20), Some(Point::new(405.0, 410.0)));
        assert_eq!(vp.to_window(80, 0), None);
        assert_eq!(vp.to_window(0, 40), None);
    }

    #[test]
    fn canvas_is_flipped_vertically() {
        assert_eq!(viewport().flip(Point::new(10.0, 100.0)), (10.0, 700.0));
    }

    #[test]
    fn pointer_only_counts_while_left_button_held() {
        let vp = viewport();
        let mut p = PointerState::default();
        p.on_mouse(MouseEventKind::Moved, 1, 1);
        assert_eq!(p.pressed_at(&vp), None);

        p.on_mouse(MouseEventKind::Down(MouseButton::Left), 2, 3);
        assert_eq!(p.pressed_at(&vp), Some(Point::new(25.0, 70.0)));

        p.on_mouse(MouseEventKind::Drag(MouseButton::Left), 4, 3);
        assert_eq!(p.pressed_at(&vp), Some(Point::new(45.0, 70.0)));

        p.on_mouse(MouseEventKind::Up(MouseButton::Left), 4, 3);
        assert_eq!(p.pressed_at(&vp), None);

        p.on_mouse(MouseEventKind::Down(MouseButton::Right), 4, 3);
        assert_eq!(p.pressed_at(&vp), None);
    }

    #[test]
    fn trial_report_names_file_and_accuracy() {
        let outcome = TrialOutcome {
            trial: 50,
            samples: Vec::new(),
            accuracy: 87.5,
        };
        assert_eq!(
            trial_report(&outcome, Path::new("trace_data/trial_50_20250425-005227.csv")),
            [
                "Saved trial 50 to trace_data/trial_50_20250425-005227.csv".to_string(),
                "Accuracy for trial 50: 87.5%".to_string(),
            ]
        );
    }

    #[test]
    fn veil_moves_ink_towards_background() {
        assert_eq!(veiled(BACKGROUND), rgb(BACKGROUND));
        match veiled(INK) {
            Color::Rgb(r, g, b) => {
                assert!(r > INK.0 && r < BACKGROUND.0);
                assert!(g > INK.1 && g < BACKGROUND.1);
                assert!(b > INK.2 && b < BACKGROUND.2);
            }
            other => panic!("unexpected color {:?}", other),
        }
    }
}
