//! The ideal spiral that participants trace.
//!
//! The spiral is Archimedean: its radius grows linearly with the angle,
//! `r = a + b * theta`, and it is centered in the capture window.

use serde::{Deserialize, Serialize};

use crate::Point;

/// Parameters of the ideal spiral and of the window it is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SpiralParams {
    /// Start radius, in pixels
    pub a: f64,
    /// Radius growth per radian, in pixels
    pub b: f64,
    /// Number of points sampled along the spiral
    pub num_points: usize,
    /// Angle between consecutive samples, in radians
    pub theta_step: f64,
    /// Window width, in pixels
    pub width: u32,
    /// Window height, in pixels
    pub height: u32,
}

impl Default for SpiralParams {
    fn default() -> Self {
        Self {
            a: 10.0,
            b: 20.0,
            num_points: 200,
            theta_step: 0.1,
            width: 800,
            height: 800,
        }
    }
}

impl SpiralParams {
    /// The window center, using integer division like the capture window.
    pub fn center(&self) -> Point {
        Point::new((self.width / 2) as f64, (self.height / 2) as f64)
    }
}

/// Samples the spiral described by `params` in window coordinates.
pub fn generate_spiral(params: &SpiralParams) -> Vec<Point> {
    let center = params.center();
    (0..params.num_points)
        .map(|i| i as f64 * params.theta_step)
        .map(|theta| {
            let r = params.a + params.b * theta;
            Point::new(r * theta.cos() + center.x, r * theta.sin() + center.y)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_spiral_has_two_hundred_points() {
        let spiral = generate_spiral(&SpiralParams::default());
        assert_eq!(spiral.len(), 200);
    }

    #[test]
    fn spiral_starts_at_start_radius_right_of_center() {
        let spiral = generate_spiral(&SpiralParams::default());
        assert_eq!(spiral[0], Point::new(410.0, 400.0));
    }

    #[test]
    fn radius_grows_linearly() {
        let params = SpiralParams::default();
        let center = params.center();
        let spiral = generate_spiral(&params);
        for (i, p) in spiral.iter().enumerate() {
            let theta = i as f64 * params.theta_step;
            let expected = params.a + params.b * theta;
            assert!((p.abs_dist(&center) - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn odd_window_size_uses_integer_center() {
        let params = SpiralParams {
            width: 801,
            height: 799,
            ..Default::default()
        };
        assert_eq!(params.center(), Point::new(400.0, 399.0));
    }
}
