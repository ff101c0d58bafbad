//! Kinematics of a planar arm with two revolute joints.
//!
//! Joint 1 sits at the origin, joint 2 at the end of link 1, and the end
//! effector at the end of link 2. Angles are in radians, `theta2` relative
//! to link 1.

use std::f64::consts::PI;
use std::ops::Mul;

use crate::Point;

/// A 2x2 matrix, row major.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat2(pub [[f64; 2]; 2]);

/// Singular value decomposition `M = U * diag(s) * Vt`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Svd2 {
    /// Left singular vectors, as columns
    pub u: Mat2,
    /// Singular values, largest first, never negative
    pub s: [f64; 2],
    /// Transposed right singular vectors
    pub vt: Mat2,
}

impl Mat2 {
    /// The identity matrix.
    pub const IDENTITY: Self = Self([[1.0, 0.0], [0.0, 1.0]]);

    /// A diagonal matrix.
    pub const fn diag(a: f64, b: f64) -> Self {
        Self([[a, 0.0], [0.0, b]])
    }

    /// Counter-clockwise rotation by `angle`.
    pub fn rotation(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self([[c, -s], [s, c]])
    }

    #[allow(missing_docs)]
    pub fn transpose(&self) -> Self {
        let m = self.0;
        Self([[m[0][0], m[1][0]], [m[0][1], m[1][1]]])
    }

    /// Column `j` as a vector.
    pub fn column(&self, j: usize) -> [f64; 2] {
        [self.0[0][j], self.0[1][j]]
    }

    /// Matrix-vector product.
    pub fn apply(&self, v: [f64; 2]) -> [f64; 2] {
        let m = self.0;
        [
            m[0][0] * v[0] + m[0][1] * v[1],
            m[1][0] * v[0] + m[1][1] * v[1],
        ]
    }

    /// Closed-form singular value decomposition.
    pub fn svd(&self) -> Svd2 {
        let [[a, b], [c, d]] = self.0;
        let e = (a + d) / 2.0;
        let f = (a - d) / 2.0;
        let g = (c + b) / 2.0;
        let h = (c - b) / 2.0;
        let q = e.hypot(h);
        let r = f.hypot(g);
        let a1 = g.atan2(f);
        let a2 = h.atan2(e);
        let theta = (a2 - a1) / 2.0;
        let phi = (a2 + a1) / 2.0;

        let mut u = Mat2::rotation(phi);
        let s1 = q + r;
        let mut s2 = q - r;
        if s2 < 0.0 {
            s2 = -s2;
            u.0[0][1] = -u.0[0][1];
            u.0[1][1] = -u.0[1][1];
        }

        Svd2 {
            u,
            s: [s1, s2],
            vt: Mat2::rotation(theta),
        }
    }
}

impl Mul for Mat2 {
    type Output = Mat2;
    fn mul(self, rhs: Mat2) -> Mat2 {
        let (l, r) = (self.0, rhs.0);
        let mut out = [[0.0; 2]; 2];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = l[i][0] * r[0][j] + l[i][1] * r[1][j];
            }
        }
        Mat2(out)
    }
}

/// A 2-link planar arm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoLinkArm {
    /// Length of the first link
    pub l1: f64,
    /// Length of the second link
    pub l2: f64,
}

impl Default for TwoLinkArm {
    fn default() -> Self {
        Self { l1: 3.0, l2: 2.4 }
    }
}

impl TwoLinkArm {
    /// Base, elbow and end-effector positions.
    pub fn joint_positions(&self, theta1: f64, theta2: f64) -> [Point; 3] {
        let elbow = Point::new(self.l1 * theta1.cos(), self.l1 * theta1.sin());
        let end = Point::new(
            elbow.x + self.l2 * (theta1 + theta2).cos(),
            elbow.y + self.l2 * (theta1 + theta2).sin(),
        );
        [Point::new(0.0, 0.0), elbow, end]
    }

    /// Jacobian of the end-effector position with respect to the joints.
    pub fn jacobian(&self, theta1: f64, theta2: f64) -> Mat2 {
        let (s1, c1) = theta1.sin_cos();
        let (s12, c12) = (theta1 + theta2).sin_cos();
        Mat2([
            [-self.l1 * s1 - self.l2 * s12, -self.l2 * s12],
            [self.l1 * c1 + self.l2 * c12, self.l2 * c12],
        ])
    }

    /// Jacobian of every articulation, rows ordered `x1, y1, x2, y2`
    /// (elbow then end effector).
    pub fn articulation_jacobian(&self, theta1: f64, theta2: f64) -> [[f64; 2]; 4] {
        let (s1, c1) = theta1.sin_cos();
        let ee = self.jacobian(theta1, theta2).0;
        [
            [-self.l1 * s1, 0.0],
            [self.l1 * c1, 0.0],
            ee[0],
            ee[1],
        ]
    }
}

/// Points of the ellipse `center + U * diag(s) * [cos t, sin t]` for `n`
/// values of `t` spread evenly over a full turn, both ends included.
pub fn manipulability_ellipse(center: Point, svd: &Svd2, n: usize) -> Vec<Point> {
    let us = svd.u * Mat2::diag(svd.s[0], svd.s[1]);
    (0..n)
        .map(|i| {
            if n > 1 {
                2.0 * PI * i as f64 / (n - 1) as f64
            } else {
                0.0
            }
        })
        .map(|t| {
            let [dx, dy] = us.apply([t.cos(), t.sin()]);
            Point::new(center.x + dx, center.y + dy)
        })
        .collect()
}
