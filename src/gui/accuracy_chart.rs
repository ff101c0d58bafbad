use std::time::Duration;

use crossterm::event::{self, Event};
use ratatui::{
    prelude::*,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
};

use crate::{
    gui::{terminal, GuiError},
    trace_file::TrialScore,
};

/// Show accuracy over trials as a line chart until the user quits.
pub fn accuracy_chart(scores: &[TrialScore]) -> Result<(), GuiError> {
    let points: Vec<(f64, f64)> = scores
        .iter()
        .map(|s| (s.trial as f64, s.accuracy))
        .collect();

    let mut terminal = terminal::enter(false)?;
    let res = run(&mut terminal, &points);
    terminal::leave(&mut terminal)?;
    res
}

fn run(terminal: &mut terminal::Tui, points: &[(f64, f64)]) -> Result<(), GuiError> {
    loop {
        terminal.draw(|f| ui(f, points))?;
        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                if terminal::is_quit(&key) {
                    return Ok(());
                }
            }
        }
    }
}

/// Chart bounds along the trial axis; a single trial still gets some room.
fn trial_bounds(points: &[(f64, f64)]) -> [f64; 2] {
    let lo = points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let hi = points.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    if !lo.is_finite() || !hi.is_finite() {
        [0.0, 1.0]
    } else if lo == hi {
        [lo - 1.0, hi + 1.0]
    } else {
        [lo, hi]
    }
}

/// Evenly spaced labels for the trial axis, at most `max_labels` of them.
fn trial_labels(bounds: [f64; 2], max_labels: usize) -> Vec<String> {
    let span = bounds[1] - bounds[0];
    let n = (span as usize + 1).clamp(2, max_labels.max(2));
    (0..n)
        .map(|i| bounds[0] + span * i as f64 / (n - 1) as f64)
        .map(|v| format!("{:.0}", v))
        .collect()
}

fn ui(f: &mut Frame, points: &[(f64, f64)]) {
    let bounds = trial_bounds(points);
    let chart = Chart::new(vec![
        Dataset::default()
            .name("Accuracy")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(points),
        Dataset::default()
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(Color::Yellow))
            .data(points),
    ])
    .block(
        Block::default()
            .title(" Spiral Tracing Accuracy Over Trials ".bold())
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL),
    )
    .x_axis(
        Axis::default()
            .title("Trial Number")
            .style(Style::default().fg(Color::White))
            .bounds(bounds)
            .labels(trial_labels(bounds, 11).into_iter().map(Span::from).collect()),
    )
    .y_axis(
        Axis::default()
            .title("Accuracy (%)")
            .style(Style::default().fg(Color::White))
            .bounds([0.0, 100.0])
            .labels(
                ["0", "25", "50", "75", "100"]
                    .iter()
                    .cloned()
                    .map(Span::from)
                    .collect(),
            ),
    );

    f.render_widget(chart, f.size());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_cover_the_trials() {
        assert_eq!(trial_bounds(&[(3.0, 10.0), (9.0, 50.0), (5.0, 0.0)]), [3.0, 9.0]);
        assert_eq!(trial_bounds(&[(4.0, 10.0)]), [3.0, 5.0]);
        assert_eq!(trial_bounds(&[]), [0.0, 1.0]);
    }

    #[test]
    fn labels_land_on_trials_when_few() {
        assert_eq!(trial_labels([50.0, 53.0], 11), vec!["50", "51", "52", "53"]);
        assert_eq!(trial_labels([0.0, 100.0], 11).len(), 11);
        assert_eq!(trial_labels([0.0, 100.0], 11)[1], "10");
    }
}
