//! Scoring of a recorded trace against the ideal spiral.
//!
//! Every trace point is matched to its closest spiral point; the mean of
//! those distances is mapped linearly onto a percentage, where a mean of
//! zero scores 100% and a mean of `max_distance` or more scores 0%.

use crate::Point;

/// Mean distances at or beyond this many pixels score 0%.
pub const DEFAULT_MAX_DISTANCE: f64 = 100.0;

/// Distance from `point` to the closest point of `path`. An empty path is
/// infinitely far away.
pub fn closest_distance(point: &Point, path: &[Point]) -> f64 {
    path.iter()
        .map(|p| point.abs_dist(p))
        .fold(f64::INFINITY, f64::min)
}

/// Accuracy of `trace` relative to `spiral`, as a percentage in `[0, 100]`
/// rounded to two decimal places. An empty trace scores zero.
pub fn compute_accuracy(trace: &[Point], spiral: &[Point], max_distance: f64) -> f64 {
    if trace.is_empty() {
        return 0.0;
    }

    let total: f64 = trace.iter().map(|p| closest_distance(p, spiral)).sum();
    let mean = total / trace.len() as f64;
    let accuracy = (100.0 * (1.0 - mean / max_distance)).max(0.0);

    round_hundredths(accuracy)
}

// Round the exact binary value, not an inexact `v * 100`.
fn round_hundredths(v: f64) -> f64 {
    format!("{:.2}", v).parse().unwrap_or(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spiral::{generate_spiral, SpiralParams};

    #[test]
    fn closest_distance_known_inputs() {
        let path = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
        ];
        assert_eq!(closest_distance(&Point::new(10.0, 0.0), &path), 0.0);
        assert!((closest_distance(&Point::new(13.0, 14.0), &path) - 5.0).abs() < 1e-12);
        assert!((closest_distance(&Point::new(4.0, -3.0), &path) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn closest_distance_to_nothing_is_infinite() {
        assert!(closest_distance(&Point::new(1.0, 1.0), &[]).is_infinite());
    }

    #[test]
    fn empty_trace_scores_zero() {
        let spiral = generate_spiral(&SpiralParams::default());
        assert_eq!(compute_accuracy(&[], &spiral, DEFAULT_MAX_DISTANCE), 0.0);
    }

    #[test]
    fn tracing_the_spiral_exactly_scores_full_marks() {
        let spiral = generate_spiral(&SpiralParams::default());
        assert_eq!(
            compute_accuracy(&spiral[10..50], &spiral, DEFAULT_MAX_DISTANCE),
            100.0
        );
    }

    #[test]
    fn far_away_trace_clamps_to_zero() {
        let spiral = [Point::new(0.0, 0.0)];
        let trace = [Point::new(1000.0, 0.0)];
        assert_eq!(compute_accuracy(&trace, &spiral, DEFAULT_MAX_DISTANCE), 0.0);
    }

    #[test]
    fn mean_distance_maps_linearly_and_rounds() {
        let spiral = [Point::new(0.0, 0.0)];
        // distances 10 and 15 -> mean 12.5 -> 87.5%
        let trace = [Point::new(10.0, 0.0), Point::new(0.0, 15.0)];
        assert_eq!(compute_accuracy(&trace, &spiral, 100.0), 87.5);

        // mean 1/3 -> 99.6666.. -> 99.67
        let trace = [Point::new(1.0 / 3.0, 0.0)];
        assert_eq!(compute_accuracy(&trace, &spiral, 100.0), 99.67);
    }

    #[test]
    fn rounding_uses_the_stored_value() {
        // 99.985 is stored as 99.98499.., so it rounds down
        let spiral = [Point::new(0.0, 0.0)];
        let trace = [Point::new(0.015, 0.0)];
        assert_eq!(compute_accuracy(&trace, &spiral, 100.0), 99.98);

        assert_eq!(round_hundredths(2.675), 2.67);
        assert_eq!(round_hundredths(50.0), 50.0);
    }
}
