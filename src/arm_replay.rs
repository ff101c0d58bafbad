//! Replays a recorded trial through the arm's kinematics.
//!
//! Each sample that carries encoder angles becomes one [ArmFrame]: the arm
//! pose, its manipulability ellipse and its two principal directions at the
//! end effector. Encoder 1 measures the elbow (`theta2`) and encoder 2 the
//! shoulder (`theta1`).

use log::debug;

use crate::{
    kinematics::{manipulability_ellipse, Mat2, Svd2, TwoLinkArm},
    trace_file::TraceSample,
    Point,
};

/// The pose is drawn this many times larger than the arm's link lengths.
pub const DISPLAY_SCALE: f64 = 2.0;

/// Points sampled along each manipulability ellipse.
pub const ELLIPSE_POINTS: usize = 100;

/// Axes passing this close to the reference point count as through it.
pub const THROUGH_TOLERANCE: f64 = 1e-9;

/// Names of the principal axes, in the order [ArmFrame::axes] holds them.
pub const AXIS_NAMES: [&str; 2] = ["Major", "Minor"];

/// A line `a * x + b * y + c = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisLine {
    #[allow(missing_docs)]
    pub a: f64,
    #[allow(missing_docs)]
    pub b: f64,
    #[allow(missing_docs)]
    pub c: f64,
}

impl AxisLine {
    /// The line through `origin` along `(dx, dy)`.
    pub fn through(origin: Point, dx: f64, dy: f64) -> Self {
        Self {
            a: -dy,
            b: dx,
            c: dy * origin.x - dx * origin.y,
        }
    }

    /// Left-hand side of the line equation at `p`.
    pub fn eval(&self, p: Point) -> f64 {
        self.a * p.x + self.b * p.y + self.c
    }

    /// Whether `p` lies on the line.
    pub fn passes_through(&self, p: Point) -> bool {
        self.eval(p).abs() <= THROUGH_TOLERANCE
    }
}

impl std::fmt::Display for AxisLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4} * x + {:.4} * y + {:.4} = 0", self.a, self.b, self.c)
    }
}

/// Everything needed to draw one step of the replay.
#[derive(Debug, Clone, PartialEq)]
pub struct ArmFrame {
    /// Shoulder angle, radians
    pub theta1: f64,
    /// Elbow angle, radians
    pub theta2: f64,
    /// Base, elbow and end effector, display scaled
    pub pose: [Point; 3],
    /// Decomposition of the scaled end-effector Jacobian
    pub svd: Svd2,
    /// Manipulability ellipse around the end effector
    pub ellipse: Vec<Point>,
    /// Major then minor principal direction at the end effector
    pub directions: [[f64; 2]; 2],
    /// Major then minor axis lines through the end effector
    pub axes: [AxisLine; 2],
}

impl ArmFrame {
    /// Position of the end effector.
    pub fn end_effector(&self) -> Point {
        self.pose[2]
    }
}

/// Steps through a recorded trial, accumulating the end-effector path and
/// counting principal axes that pass through a reference point.
#[derive(Debug, Clone)]
pub struct ArmReplay {
    arm: TwoLinkArm,
    joint_scaling: Mat2,
    reference: Point,
    path: Vec<Point>,
    through_count: usize,
}

impl ArmReplay {
    /// A replay of the default arm, with joint 2 weighted by 1.5.
    pub fn new(reference: Point) -> Self {
        Self {
            arm: TwoLinkArm::default(),
            joint_scaling: Mat2::diag(1.0, 1.5),
            reference,
            path: Vec::new(),
            through_count: 0,
        }
    }

    /// End-effector positions visited so far.
    pub fn path(&self) -> &[Point] {
        &self.path
    }

    /// The point principal axes are checked against.
    pub fn reference(&self) -> Point {
        self.reference
    }

    /// How many principal axes have passed through the reference point.
    pub fn through_count(&self) -> usize {
        self.through_count
    }

    /// The frame for one pair of joint angles, without touching the replay
    /// state.
    pub fn frame_at(&self, theta1: f64, theta2: f64) -> ArmFrame {
        let pose = self
            .arm
            .joint_positions(theta1, theta2)
            .map(|p| Point::new(p.x * DISPLAY_SCALE, p.y * DISPLAY_SCALE));
        let scaled = self.arm.jacobian(theta1, theta2) * self.joint_scaling;
        let svd = scaled.svd();
        let end = pose[2];
        let ellipse = manipulability_ellipse(end, &svd, ELLIPSE_POINTS);

        // End-effector rows of J_all * Eq * V, i.e. s_j * u_j
        let all = self.arm.articulation_jacobian(theta1, theta2);
        let ee = Mat2([all[2], all[3]]) * self.joint_scaling * svd.vt.transpose();
        let directions = [ee.column(0), ee.column(1)];
        let axes = directions.map(|[dx, dy]| AxisLine::through(end, dx, dy));

        ArmFrame {
            theta1,
            theta2,
            pose,
            svd,
            ellipse,
            directions,
            axes,
        }
    }

    /// Advance by one recorded sample. Samples without encoder angles are
    /// skipped and yield `None`.
    pub fn step(&mut self, sample: &TraceSample) -> Option<ArmFrame> {
        let reading = sample.encoder?;
        let theta2 = reading.encoder_1_deg.to_radians();
        let theta1 = reading.encoder_2_deg.to_radians();
        let frame = self.frame_at(theta1, theta2);

        self.path.push(frame.end_effector());
        for (name, axis) in AXIS_NAMES.iter().zip(frame.axes.iter()) {
            debug!("{} Axis Equation: {}", name, axis);
            if axis.passes_through(self.reference) {
                self.through_count += 1;
            }
        }

        Some(frame)
    }
}

impl Default for ArmReplay {
    fn default() -> Self {
        Self::new(Point::new(400.0, 300.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder_message_decoder::EncoderReading;

    fn sample(enc: Option<(f64, f64)>) -> TraceSample {
        TraceSample {
            x: 0.0,
            y: 0.0,
            timestamp_ms: 0,
            encoder: enc.map(|(a, b)| EncoderReading {
                encoder_1_deg: a,
                encoder_2_deg: b,
            }),
        }
    }

    #[test]
    fn encoder_1_drives_the_elbow() {
        let mut replay = ArmReplay::default();
        let frame = replay.step(&sample(Some((90.0, 0.0)))).unwrap();

        assert!((frame.theta2 - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert_eq!(frame.theta1, 0.0);
        // shoulder flat, elbow up: (3, 2.4) scaled by 2
        let end = frame.end_effector();
        assert!((end.x - 6.0).abs() < 1e-9 && (end.y - 4.8).abs() < 1e-9);
    }

    #[test]
    fn samples_without_encoders_are_skipped() {
        let mut replay = ArmReplay::default();
        assert!(replay.step(&sample(None)).is_none());
        assert!(replay.step(&sample(Some((10.0, 20.0)))).is_some());
        assert!(replay.step(&sample(Some((15.0, 25.0)))).is_some());
        assert_eq!(replay.path().len(), 2);
    }

    #[test]
    fn principal_directions_are_scaled_singular_vectors() {
        let replay = ArmReplay::default();
        let frame = replay.frame_at(0.4, 1.1);
        for j in 0..2 {
            let u = frame.svd.u.column(j);
            let s = frame.svd.s[j];
            assert!((frame.directions[j][0] - s * u[0]).abs() < 1e-9);
            assert!((frame.directions[j][1] - s * u[1]).abs() < 1e-9);
        }
    }

    #[test]
    fn axes_pass_through_the_end_effector() {
        let replay = ArmReplay::default();
        let frame = replay.frame_at(-0.3, 0.8);
        let end = frame.end_effector();
        for axis in &frame.axes {
            assert!(axis.eval(end).abs() < 1e-9);
        }
        assert_eq!(frame.ellipse.len(), ELLIPSE_POINTS);
    }

    #[test]
    fn axes_through_reference_are_counted() {
        // Reference at the end effector: both axes pass through it.
        let pose = ArmReplay::default().frame_at(0.0, 0.5);
        let mut replay = ArmReplay::new(pose.end_effector());
        replay.step(&sample(Some((0.5f64.to_degrees(), 0.0))));
        assert_eq!(replay.through_count(), 2);

        let mut far = ArmReplay::default();
        far.step(&sample(Some((30.0, 30.0))));
        assert_eq!(far.through_count(), 0);
    }

    #[test]
    fn axis_line_formatting() {
        let line = AxisLine::through(Point::new(1.0, 2.0), 3.0, 4.0);
        assert_eq!(line, AxisLine { a: -4.0, b: 3.0, c: -2.0 });
        assert_eq!(line.to_string(), "-4.0000 * x + 3.0000 * y + -2.0000 = 0");
        assert!(line.passes_through(Point::new(4.0, 6.0)));
    }
}
