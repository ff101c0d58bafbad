//! The trial cycle of the tracing experiment.
//!
//! An [Experiment] moves through three states in a fixed loop:
//!
//! ```text
//! WaitForEnter --Enter--> Countdown --countdown elapsed--> Recording
//!      ^                                                       |
//!      +---------------- trial duration elapsed ---------------+
//! ```
//!
//! It knows nothing about windows or devices; the caller feeds it a clock
//! in milliseconds, the pointer position while the button is held, and the
//! latest encoder reading, once per frame.

use log::{debug, info};

use crate::{
    accuracy::compute_accuracy,
    config::ExperimentConfig,
    encoder_message_decoder::EncoderReading,
    spiral::generate_spiral,
    trace_file::TraceSample,
    Point,
};

/// Where we are in the trial cycle. Times are on the caller's clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperimentState {
    /// Between trials, waiting for the participant to press Enter
    WaitForEnter,
    /// Counting down before recording starts
    Countdown {
        #[allow(missing_docs)]
        started_ms: u64,
    },
    /// Recording the participant's trace
    Recording {
        #[allow(missing_docs)]
        started_ms: u64,
    },
}

/// A finished trial, ready to be saved.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialOutcome {
    /// The trial's number
    pub trial: u32,
    /// Everything recorded during the trial
    pub samples: Vec<TraceSample>,
    /// Accuracy in percent
    pub accuracy: f64,
}

/// State of a running experiment session.
#[derive(Debug, Clone)]
pub struct Experiment {
    state: ExperimentState,
    trial: u32,
    trace: Vec<TraceSample>,
    last_accuracy: Option<f64>,
    spiral: Vec<Point>,
    window: (u32, u32),
    trial_duration_ms: u64,
    countdown_ms: u64,
    max_distance: f64,
}

impl Experiment {
    /// A new session, waiting for the first trial.
    pub fn new(config: &ExperimentConfig) -> Self {
        Self {
            state: ExperimentState::WaitForEnter,
            trial: config.start_trial,
            trace: Vec::new(),
            last_accuracy: None,
            spiral: generate_spiral(&config.spiral),
            window: (config.spiral.width, config.spiral.height),
            trial_duration_ms: config.trial_duration_ms,
            countdown_ms: config.countdown_ms,
            max_distance: config.max_distance,
        }
    }

    #[allow(missing_docs)]
    pub fn state(&self) -> ExperimentState {
        self.state
    }

    /// Number of the current (or next) trial.
    pub fn trial(&self) -> u32 {
        self.trial
    }

    /// Samples recorded so far in the current trial.
    pub fn trace(&self) -> &[TraceSample] {
        &self.trace
    }

    /// The ideal spiral, in window coordinates.
    pub fn spiral(&self) -> &[Point] {
        &self.spiral
    }

    /// Width and height of the window the spiral is drawn in, in pixels.
    pub fn window_size(&self) -> (u32, u32) {
        self.window
    }

    /// Accuracy of the most recently finished trial, if there was one.
    pub fn last_accuracy(&self) -> Option<f64> {
        self.last_accuracy
    }

    /// The participant pressed Enter. Starts the countdown if we are
    /// between trials; ignored otherwise.
    pub fn press_enter(&mut self, now_ms: u64) {
        if self.state == ExperimentState::WaitForEnter {
            debug!("Starting countdown for trial {}", self.trial);
            self.state = ExperimentState::Countdown { started_ms: now_ms };
        }
    }

    /// Advance the experiment by one frame.
    ///
    /// `pointer` is the pointer position if the button is held this frame.
    /// Returns the finished trial when recording ends.
    pub fn tick(
        &mut self,
        now_ms: u64,
        pointer: Option<Point>,
        encoder: Option<EncoderReading>,
    ) -> Option<TrialOutcome> {
        match self.state {
            ExperimentState::WaitForEnter => None,
            ExperimentState::Countdown { started_ms } => {
                if now_ms.saturating_sub(started_ms) >= self.countdown_ms {
                    self.trace.clear();
                    self.state = ExperimentState::Recording { started_ms: now_ms };
                    info!("Recording trial {}", self.trial);
                }
                None
            }
            ExperimentState::Recording { started_ms } => {
                let elapsed = now_ms.saturating_sub(started_ms);
                if let Some(p) = pointer {
                    self.trace.push(TraceSample {
                        x: p.x,
                        y: p.y,
                        timestamp_ms: elapsed,
                        encoder,
                    });
                }

                if elapsed < self.trial_duration_ms {
                    return None;
                }

                let points: Vec<Point> = self.trace.iter().map(TraceSample::point).collect();
                let accuracy = compute_accuracy(&points, &self.spiral, self.max_distance);
                let outcome = TrialOutcome {
                    trial: self.trial,
                    samples: std::mem::take(&mut self.trace),
                    accuracy,
                };

                self.last_accuracy = Some(accuracy);
                self.trial += 1;
                self.state = ExperimentState::WaitForEnter;
                Some(outcome)
            }
        }
    }

    /// The number shown during the countdown, `elapsed_ms` into it.
    pub fn countdown_number(&self, elapsed_ms: u64) -> u64 {
        (self.countdown_ms / 1000).saturating_sub(elapsed_ms / 1000)
    }

    /// Whole seconds of recording left, `elapsed_ms` into a trial.
    pub fn remaining_secs(&self, elapsed_ms: u64) -> u64 {
        self.trial_duration_ms.saturating_sub(elapsed_ms) / 1000
    }
}

/// Size multiplier for the countdown number; it swells slightly every half
/// second to give it a bounce.
pub fn countdown_scale(elapsed_ms: u64) -> f64 {
    1.2 + 0.1 * (elapsed_ms % 500) as f64 / 500.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn experiment() -> Experiment {
        Experiment::new(&ExperimentConfig {
            start_trial: 50,
            ..Default::default()
        })
    }

    fn reading() -> EncoderReading {
        EncoderReading {
            encoder_1_deg: 10.0,
            encoder_2_deg: 20.0,
        }
    }

    #[test]
    fn ticks_do_nothing_until_enter() {
        let mut exp = experiment();
        for t in (0..20_000).step_by(16) {
            assert_eq!(exp.tick(t, Some(Point::new(1.0, 1.0)), None), None);
        }
        assert_eq!(exp.state(), ExperimentState::WaitForEnter);
        assert!(exp.trace().is_empty());
    }

    #[test]
    fn countdown_leads_to_recording() {
        let mut exp = experiment();
        exp.press_enter(1_000);
        assert_eq!(exp.state(), ExperimentState::Countdown { started_ms: 1_000 });

        exp.tick(3_999, None, None);
        assert_eq!(exp.state(), ExperimentState::Countdown { started_ms: 1_000 });

        exp.tick(4_000, None, None);
        assert_eq!(exp.state(), ExperimentState::Recording { started_ms: 4_000 });
    }

    #[test]
    fn enter_is_ignored_outside_waiting() {
        let mut exp = experiment();
        exp.press_enter(0);
        exp.press_enter(500);
        assert_eq!(exp.state(), ExperimentState::Countdown { started_ms: 0 });

        exp.tick(3_000, None, None);
        exp.press_enter(3_100);
        assert_eq!(exp.state(), ExperimentState::Recording { started_ms: 3_000 });
    }

    #[test]
    fn samples_are_only_taken_while_held() {
        let mut exp = experiment();
        exp.press_enter(0);
        exp.tick(3_000, None, None);

        exp.tick(3_016, Some(Point::new(410.0, 400.0)), Some(reading()));
        exp.tick(3_032, None, Some(reading()));
        exp.tick(3_048, Some(Point::new(412.0, 401.0)), None);

        assert_eq!(
            exp.trace(),
            &[
                TraceSample {
                    x: 410.0,
                    y: 400.0,
                    timestamp_ms: 16,
                    encoder: Some(reading()),
                },
                TraceSample {
                    x: 412.0,
                    y: 401.0,
                    timestamp_ms: 48,
                    encoder: None,
                },
            ]
        );
    }

    #[test]
    fn trial_ends_after_duration_and_is_scored() {
        let mut exp = experiment();
        exp.press_enter(0);
        exp.tick(3_000, None, None);
        let on_spiral = exp.spiral()[5];
        exp.tick(4_000, Some(on_spiral), Some(reading()));

        assert_eq!(exp.tick(12_999, None, None), None);
        let outcome = exp.tick(13_000, None, None).expect("trial should end");

        assert_eq!(outcome.trial, 50);
        assert_eq!(outcome.samples.len(), 1);
        assert_eq!(outcome.accuracy, 100.0);
        assert_eq!(exp.trial(), 51);
        assert_eq!(exp.last_accuracy(), Some(100.0));
        assert_eq!(exp.state(), ExperimentState::WaitForEnter);
        assert!(exp.trace().is_empty());
    }

    #[test]
    fn empty_trial_scores_zero_and_next_trial_starts_clean() {
        let mut exp = experiment();
        exp.press_enter(0);
        exp.tick(3_000, None, None);
        let outcome = exp.tick(13_000, None, None).unwrap();
        assert_eq!(outcome.accuracy, 0.0);
        assert!(outcome.samples.is_empty());

        exp.press_enter(20_000);
        exp.tick(23_000, None, None);
        exp.tick(23_010, Some(Point::new(0.0, 0.0)), None);
        assert_eq!(exp.trace().len(), 1);
        assert_eq!(exp.trace()[0].timestamp_ms, 10);
    }

    #[test]
    fn display_helpers() {
        let exp = experiment();
        assert_eq!(exp.countdown_number(0), 3);
        assert_eq!(exp.countdown_number(999), 3);
        assert_eq!(exp.countdown_number(1_000), 2);
        assert_eq!(exp.countdown_number(2_999), 1);

        assert_eq!(exp.remaining_secs(0), 10);
        assert_eq!(exp.remaining_secs(500), 9);
        assert_eq!(exp.remaining_secs(12_000), 0);

        assert_eq!(countdown_scale(0), 1.2);
        assert!((countdown_scale(250) - 1.25).abs() < 1e-12);
        assert_eq!(countdown_scale(500), 1.2);
    }
}
