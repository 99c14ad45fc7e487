use std::fmt;

use glam::{DMat2, DMat3, DVec2, DVec3, DVec4};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::group::check_homogeneous_row;
use crate::{LieError, LieGroup, SO2, EPSILON};

/// A 2D rigid body transformation: rotation `r` followed by translation `t`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SE2 {
    r: SO2,
    t: DVec2,
}

impl SE2 {
    pub const IDENTITY: Self = Self {
        r: SO2::IDENTITY,
        t: DVec2::ZERO,
    };

    pub fn new(r: SO2, t: DVec2) -> Self {
        Self { r, t }
    }

    /// Create a transformation from a 3x3 homogeneous matrix.
    pub fn from_matrix(mat: &DMat3) -> Result<Self, LieError> {
        check_homogeneous_row(&[mat.x_axis.z, mat.y_axis.z, mat.z_axis.z])?;
        let rotation = DMat2::from_cols(mat.x_axis.truncate(), mat.y_axis.truncate());
        Ok(Self {
            r: SO2::from_matrix(&rotation)?,
            t: mat.z_axis.truncate(),
        })
    }

    pub fn from_random() -> Self {
        let mut rng = rand::rng();

        let r1: f64 = rng.random();
        let r2: f64 = rng.random();

        Self {
            r: SO2::from_random(),
            t: DVec2::new(r1, r2),
        }
    }

    /// Pure translation.
    pub fn trans(t: DVec2) -> Self {
        Self::new(SO2::IDENTITY, t)
    }

    pub fn trans_x(x: f64) -> Self {
        Self::trans(DVec2::new(x, 0.0))
    }

    pub fn trans_y(y: f64) -> Self {
        Self::trans(DVec2::new(0.0, y))
    }

    /// Pure rotation of `theta` radians.
    pub fn rot(theta: f64) -> Self {
        Self::new(SO2::exp(theta), DVec2::ZERO)
    }

    pub fn so2(&self) -> SO2 {
        self.r
    }

    pub fn translation(&self) -> DVec2 {
        self.t
    }

    #[inline]
    pub fn rplus(&self, tau: DVec3) -> Self {
        *self * SE2::exp(tau)
    }

    #[inline]
    pub fn rminus(&self, other: &Self) -> DVec3 {
        (self.inverse() * *other).log()
    }

    /// Homogeneous 3x3 matrix `[[R, t], [0, 0, 1]]`.
    pub fn matrix(&self) -> DMat3 {
        let r = self.r.matrix();
        DMat3::from_cols(
            r.x_axis.extend(0.0),
            r.y_axis.extend(0.0),
            self.t.extend(1.0),
        )
    }

    /// `[unit complex, translation]`.
    pub fn params(&self) -> DVec4 {
        let z = self.r.params();
        DVec4::new(z.x, z.y, self.t.x, self.t.y)
    }

    pub fn inverse(&self) -> Self {
        let r_inv = self.r.inverse();
        Self {
            r: r_inv,
            t: r_inv * (-self.t),
        }
    }

    pub fn adj(&self) -> DMat3 {
        let mut mat = self.matrix();
        mat.z_axis.x = self.t.y; // matrix[0, 2] = t.y
        mat.z_axis.y = -self.t.x; // matrix[1, 2] = -t.x
        mat
    }

    /// Tangent is `[υx, υy, θ]`.
    pub fn exp(tangent: DVec3) -> Self {
        let theta = tangent.z;
        let so2 = SO2::exp(theta);

        let (sin_theta_by_theta, one_minus_cos_theta_by_theta) = if theta.abs() < EPSILON {
            let theta_sq = theta * theta;
            (
                1.0 - theta_sq / 6.0,
                0.5 * theta - theta * theta_sq / 24.0,
            )
        } else {
            let z = so2.unit_complex();
            // 1 - cos θ = 2 sin²(θ/2), without cancellation for small θ
            (z.y / theta, 2.0 * (0.5 * theta).sin().powi(2) / theta)
        };

        let upsilon = tangent.truncate();
        Self {
            r: so2,
            t: DVec2::new(
                sin_theta_by_theta * upsilon.x - one_minus_cos_theta_by_theta * upsilon.y,
                one_minus_cos_theta_by_theta * upsilon.x + sin_theta_by_theta * upsilon.y,
            ),
        }
    }

    pub fn log(&self) -> DVec3 {
        let theta = self.r.log();
        let half_theta = 0.5 * theta;
        let z = self.r.unit_complex();
        let real_minus_one = z.x - 1.0;

        let half_theta_by_tan_of_half_theta = if real_minus_one.abs() < EPSILON {
            1.0 - theta * theta / 12.0
        } else {
            -(half_theta * z.y) / real_minus_one
        };

        // V^-1 = [[a, θ/2], [-θ/2, a]]
        let v_inv = DMat2::from_cols(
            DVec2::new(half_theta_by_tan_of_half_theta, -half_theta),
            DVec2::new(half_theta, half_theta_by_tan_of_half_theta),
        );
        (v_inv * self.t).extend(theta)
    }

    pub fn hat(tangent: DVec3) -> DMat3 {
        let hat_theta = SO2::hat(tangent.z);
        DMat3::from_cols(
            hat_theta.x_axis.extend(0.0),
            hat_theta.y_axis.extend(0.0),
            DVec3::new(tangent.x, tangent.y, 0.0),
        )
    }

    pub fn vee(omega: &DMat3) -> DVec3 {
        let hat_theta = DMat2::from_cols(omega.x_axis.truncate(), omega.y_axis.truncate());
        DVec3::new(omega.z_axis.x, omega.z_axis.y, SO2::vee(&hat_theta))
    }
}

impl Default for SE2 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl std::ops::Mul<SE2> for SE2 {
    type Output = SE2;

    fn mul(self, other: SE2) -> SE2 {
        SE2::new(self.r * other.r, self.r * other.t + self.t)
    }
}

impl std::ops::MulAssign<SE2> for SE2 {
    #[inline]
    fn mul_assign(&mut self, rhs: SE2) {
        *self = *self * rhs;
    }
}

impl std::ops::Mul<DVec2> for SE2 {
    type Output = DVec2;

    fn mul(self, rhs: DVec2) -> Self::Output {
        self.r * rhs + self.t
    }
}

impl fmt::Display for SE2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SE2(theta: {}, translation: [{}, {}])",
            self.r.log(),
            self.t.x,
            self.t.y
        )
    }
}

impl approx::AbsDiffEq for SE2 {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        approx::AbsDiffEq::abs_diff_eq(&self.r, &other.r, epsilon)
            && self.t.abs_diff_eq(other.t, epsilon)
    }
}

impl LieGroup for SE2 {
    type Tangent = DVec3;
    type Point = DVec2;
    type Transformation = DMat3;
    type Adjoint = DMat3;
    type Params = DVec4;

    const DOF: usize = 3;
    const NUM_PARAMETERS: usize = 4;
    const MATRIX_DIM: usize = 3;
    const IDENTITY: Self = SE2::IDENTITY;

    fn exp(tangent: DVec3) -> Self {
        SE2::exp(tangent)
    }

    fn log(&self) -> DVec3 {
        SE2::log(self)
    }

    fn hat(tangent: DVec3) -> DMat3 {
        SE2::hat(tangent)
    }

    fn vee(omega: &DMat3) -> DVec3 {
        SE2::vee(omega)
    }

    fn inverse(&self) -> Self {
        SE2::inverse(self)
    }

    fn params(&self) -> DVec4 {
        SE2::params(self)
    }

    fn matrix(&self) -> DMat3 {
        SE2::matrix(self)
    }

    fn adj(&self) -> DMat3 {
        SE2::adj(self)
    }

    fn from_matrix(mat: &DMat3) -> Result<Self, LieError> {
        SE2::from_matrix(mat)
    }

    fn transform(&self, point: DVec2) -> DVec2 {
        *self * point
    }
}
