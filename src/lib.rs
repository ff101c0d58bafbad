//! Spiral HRI is a small toolkit for a human-robot-interaction tracing
//! experiment. A participant traces an ideal spiral with the mouse while a
//! two-joint arm, instrumented with encoders, follows along. Encoder angles
//! stream in over a serial port and are stamped onto every recorded sample.
//!
//! Three programs share this library:
//!
//! - `experiment` runs the live capture loop and writes one trace file per
//!   trial, see [experiment] and [gui].
//! - `accuracy` scores every recorded trial against the ideal spiral and
//!   charts the results, see [accuracy] and [trace_file].
//! - `simulation` replays the recorded encoder angles through the arm's
//!   kinematics and animates its manipulability ellipse, see [kinematics]
//!   and [arm_replay].

#![warn(missing_docs)]
pub mod accuracy;
pub mod args;
pub mod arm_replay;
pub mod config;
pub mod encoder_message_decoder;
pub mod encoder_monitor;
pub mod experiment;
pub mod gui;
pub mod kinematics;
pub mod spiral;
pub mod trace_file;

use std::fmt::Display;

/// A point in the plane. Depending on context this is either a window pixel
/// coordinate (y grows downward) or an arm-space coordinate.
#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub struct Point {
    #[allow(missing_docs)]
    pub x: f64,
    #[allow(missing_docs)]
    pub y: f64,
}

impl Point {
    /// Shorthand constructor.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance between two points.
    pub fn abs_dist(&self, other: &Self) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}
