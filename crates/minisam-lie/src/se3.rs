use std::fmt;

use glam::{DMat3, DMat4, DVec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::group::check_homogeneous_row;
use crate::{LieError, LieGroup, Matrix6, Vector6, SO3, EPSILON};

/// A 3D rigid body transformation: rotation `r` followed by translation `t`.
///
/// Tangent vectors are laid out as `[υ, ω]`: translational part first, then
/// the axis-angle rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SE3 {
    r: SO3,
    t: DVec3,
}

fn split_tangent(tangent: &Vector6) -> (DVec3, DVec3) {
    (
        DVec3::new(tangent[0], tangent[1], tangent[2]),
        DVec3::new(tangent[3], tangent[4], tangent[5]),
    )
}

fn join_tangent(upsilon: DVec3, omega: DVec3) -> Vector6 {
    [upsilon.x, upsilon.y, upsilon.z, omega.x, omega.y, omega.z]
}

impl SE3 {
    pub const IDENTITY: Self = Self {
        r: SO3::IDENTITY,
        t: DVec3::ZERO,
    };

    pub fn new(r: SO3, t: DVec3) -> Self {
        Self { r, t }
    }

    /// Create a transformation from a 4x4 homogeneous matrix.
    pub fn from_matrix(mat: &DMat4) -> Result<Self, LieError> {
        check_homogeneous_row(&[mat.x_axis.w, mat.y_axis.w, mat.z_axis.w, mat.w_axis.w])?;
        Ok(Self {
            r: SO3::from_matrix(&DMat3::from_mat4(*mat))?,
            t: mat.w_axis.truncate(),
        })
    }

    pub fn from_random() -> Self {
        let mut rng = rand::rng();

        let r1: f64 = rng.random();
        let r2: f64 = rng.random();
        let r3: f64 = rng.random();

        Self {
            r: SO3::from_random(),
            t: DVec3::new(r1, r2, r3),
        }
    }

    /// Pure translation.
    pub fn trans(t: DVec3) -> Self {
        Self::new(SO3::IDENTITY, t)
    }

    pub fn trans_x(x: f64) -> Self {
        Self::trans(DVec3::new(x, 0.0, 0.0))
    }

    pub fn trans_y(y: f64) -> Self {
        Self::trans(DVec3::new(0.0, y, 0.0))
    }

    pub fn trans_z(z: f64) -> Self {
        Self::trans(DVec3::new(0.0, 0.0, z))
    }

    pub fn rot_x(theta: f64) -> Self {
        Self::new(SO3::rot_x(theta), DVec3::ZERO)
    }

    pub fn rot_y(theta: f64) -> Self {
        Self::new(SO3::rot_y(theta), DVec3::ZERO)
    }

    pub fn rot_z(theta: f64) -> Self {
        Self::new(SO3::rot_z(theta), DVec3::ZERO)
    }

    pub fn so3(&self) -> SO3 {
        self.r
    }

    pub fn translation(&self) -> DVec3 {
        self.t
    }

    #[inline]
    pub fn rplus(&self, tau: Vector6) -> Self {
        *self * SE3::exp(tau)
    }

    #[inline]
    pub fn rminus(&self, other: &Self) -> Vector6 {
        (self.inverse() * *other).log()
    }

    /// Homogeneous 4x4 matrix `[[R, t], [0, 0, 0, 1]]`.
    pub fn matrix(&self) -> DMat4 {
        let r = self.r.matrix();
        DMat4::from_cols(
            r.x_axis.extend(0.0),
            r.y_axis.extend(0.0),
            r.z_axis.extend(0.0),
            self.t.extend(1.0),
        )
    }

    /// `[qx, qy, qz, qw, tx, ty, tz]`.
    pub fn params(&self) -> [f64; 7] {
        let q = self.r.params();
        [q.x, q.y, q.z, q.w, self.t.x, self.t.y, self.t.z]
    }

    pub fn inverse(&self) -> Self {
        let r_inv = self.r.inverse();
        Self {
            r: r_inv,
            t: r_inv * (-self.t),
        }
    }

    /// Row-major adjoint `[[R, [t]x R], [0, R]]`.
    pub fn adj(&self) -> Matrix6 {
        let r = self.r.matrix();
        let tr = SO3::hat(self.t) * r;

        let mut adj = [[0.0; 6]; 6];
        for row in 0..3 {
            for col in 0..3 {
                adj[row][col] = r.col(col)[row];
                adj[row][col + 3] = tr.col(col)[row];
                adj[row + 3][col + 3] = r.col(col)[row];
            }
        }
        adj
    }

    pub fn exp(tangent: Vector6) -> Self {
        let (upsilon, omega) = split_tangent(&tangent);
        let v = SO3::left_jacobian(omega);
        Self {
            r: SO3::exp(omega),
            t: v * upsilon,
        }
    }

    pub fn log(&self) -> Vector6 {
        let omega = self.r.log();
        let theta = omega.length();
        let omega_hat = SO3::hat(omega);
        let omega_hat_sq = omega_hat * omega_hat;

        let v_inv = if theta < EPSILON {
            DMat3::IDENTITY - omega_hat * 0.5 + omega_hat_sq * (1.0 / 12.0)
        } else {
            let half_theta = 0.5 * theta;
            DMat3::IDENTITY - omega_hat * 0.5
                + omega_hat_sq
                    * ((1.0 - theta * half_theta.cos() / (2.0 * half_theta.sin()))
                        / (theta * theta))
        };

        join_tangent(v_inv * self.t, omega)
    }

    pub fn hat(tangent: Vector6) -> DMat4 {
        let (upsilon, omega) = split_tangent(&tangent);
        let omega_hat = SO3::hat(omega);
        DMat4::from_cols(
            omega_hat.x_axis.extend(0.0),
            omega_hat.y_axis.extend(0.0),
            omega_hat.z_axis.extend(0.0),
            upsilon.extend(0.0),
        )
    }

    pub fn vee(omega: &DMat4) -> Vector6 {
        let omega_hat = DMat3::from_mat4(*omega);
        join_tangent(omega.w_axis.truncate(), SO3::vee(&omega_hat))
    }
}

impl Default for SE3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl std::ops::Mul<SE3> for SE3 {
    type Output = SE3;

    fn mul(self, other: SE3) -> SE3 {
        SE3::new(self.r * other.r, self.r * other.t + self.t)
    }
}

impl std::ops::MulAssign<SE3> for SE3 {
    #[inline]
    fn mul_assign(&mut self, rhs: SE3) {
        *self = *self * rhs;
    }
}

impl std::ops::Mul<DVec3> for SE3 {
    type Output = DVec3;

    fn mul(self, rhs: DVec3) -> Self::Output {
        self.r * rhs + self.t
    }
}

impl fmt::Display for SE3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let q = self.r.unit_quaternion();
        write!(
            f,
            "SE3(quaternion: [{}, {}, {}, {}], translation: [{}, {}, {}])",
            q.x, q.y, q.z, q.w, self.t.x, self.t.y, self.t.z
        )
    }
}

impl approx::AbsDiffEq for SE3 {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        approx::AbsDiffEq::abs_diff_eq(&self.r, &other.r, epsilon)
            && self.t.abs_diff_eq(other.t, epsilon)
    }
}

impl LieGroup for SE3 {
    type Tangent = Vector6;
    type Point = DVec3;
    type Transformation = DMat4;
    type Adjoint = Matrix6;
    type Params = [f64; 7];

    const DOF: usize = 6;
    const NUM_PARAMETERS: usize = 7;
    const MATRIX_DIM: usize = 4;
    const IDENTITY: Self = SE3::IDENTITY;

    fn exp(tangent: Vector6) -> Self {
        SE3::exp(tangent)
    }

    fn log(&self) -> Vector6 {
        SE3::log(self)
    }

    fn hat(tangent: Vector6) -> DMat4 {
        SE3::hat(tangent)
    }

    fn vee(omega: &DMat4) -> Vector6 {
        SE3::vee(omega)
    }

    fn inverse(&self) -> Self {
        SE3::inverse(self)
    }

    fn params(&self) -> [f64; 7] {
        SE3::params(self)
    }

    fn matrix(&self) -> DMat4 {
        SE3::matrix(self)
    }

    fn adj(&self) -> Matrix6 {
        SE3::adj(self)
    }

    fn from_matrix(mat: &DMat4) -> Result<Self, LieError> {
        SE3::from_matrix(mat)
    }

    fn transform(&self, point: DVec3) -> DVec3 {
        *self * point
    }
}
