//! # SO(3): rotations in 3D
//!
//! Rotations are stored as unit quaternions, an element of SU(2), the double
//! cover of SO(3): `q` and `-q` encode the same rotation. Equality checks in
//! this module therefore accept both signs.
//!
//! The Lie algebra so(3) is the space of skew-symmetric matrices, identified
//! with R³ through [`SO3::hat`]. A tangent vector is an axis-angle rotation:
//! its direction is the axis and its norm the angle in radians.
//!
//! Both `exp` and `log` switch to Taylor expansions below [`EPSILON`], so that
//! tiny rotations do not divide by a vanishing angle.

use std::f64::consts::PI;
use std::fmt;

use glam::{DMat3, DQuat, DVec3, DVec4};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::group::check_rotation3;
use crate::{LieError, LieGroup, EPSILON};

/// A 3D rotation, stored as a unit quaternion.
///
/// See the [module-level documentation](self) for the double cover caveat.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 4]", into = "[f64; 4]")]
pub struct SO3 {
    q: DQuat,
}

impl SO3 {
    /// The identity rotation.
    pub const IDENTITY: Self = Self { q: DQuat::IDENTITY };

    /// Create a rotation from quaternion components, scalar part first.
    ///
    /// The quaternion is normalized; it fails only when its norm is zero.
    pub fn from_quaternion_wxyz(w: f64, x: f64, y: f64, z: f64) -> Result<Self, LieError> {
        let q = DQuat::from_xyzw(x, y, z, w);
        let squared_norm = q.length_squared();
        if squared_norm < EPSILON {
            return Err(LieError::ZeroNorm("quaternion", squared_norm));
        }
        Ok(Self {
            q: q * (1.0 / squared_norm.sqrt()),
        })
    }

    /// Create a rotation from quaternion components, scalar part last.
    ///
    /// This is the argument order of the Python constructor `SO3(x, y, z, w)`;
    /// `w` becomes the scalar part.
    pub fn from_xyzw(x: f64, y: f64, z: f64, w: f64) -> Result<Self, LieError> {
        Self::from_quaternion_wxyz(w, x, y, z)
    }

    /// Create a rotation from a glam quaternion, normalizing it.
    pub fn from_quaternion(q: DQuat) -> Result<Self, LieError> {
        Self::from_quaternion_wxyz(q.w, q.x, q.y, q.z)
    }

    /// Create a rotation from a 3x3 rotation matrix.
    pub fn from_matrix(mat: &DMat3) -> Result<Self, LieError> {
        check_rotation3(mat)?;
        Self::from_quaternion(DQuat::from_mat3(mat))
    }

    pub fn from_random() -> Self {
        let mut rng = rand::rng();

        let r1: f64 = rng.random();
        let r2: f64 = rng.random();
        let r3: f64 = rng.random();

        // uniform random quaternion (Shoemake method)
        let one_minus_r1_sqrt = (1.0 - r1).sqrt();
        let r1_sqrt = r1.sqrt();

        let w = one_minus_r1_sqrt * (2.0 * PI * r2).cos();
        let x = one_minus_r1_sqrt * (2.0 * PI * r2).sin();
        let y = r1_sqrt * (2.0 * PI * r3).cos();
        let z = r1_sqrt * (2.0 * PI * r3).sin();

        Self {
            q: DQuat::from_xyzw(x, y, z, w).normalize(),
        }
    }

    /// Rotation of `theta` radians about the x axis.
    pub fn rot_x(theta: f64) -> Self {
        Self::exp(DVec3::new(theta, 0.0, 0.0))
    }

    /// Rotation of `theta` radians about the y axis.
    pub fn rot_y(theta: f64) -> Self {
        Self::exp(DVec3::new(0.0, theta, 0.0))
    }

    /// Rotation of `theta` radians about the z axis.
    pub fn rot_z(theta: f64) -> Self {
        Self::exp(DVec3::new(0.0, 0.0, theta))
    }

    #[inline]
    pub fn unit_quaternion(&self) -> DQuat {
        self.q
    }

    /// Quaternion coefficients `[x, y, z, w]`.
    pub fn params(&self) -> DVec4 {
        DVec4::new(self.q.x, self.q.y, self.q.z, self.q.w)
    }

    #[inline]
    pub fn rplus(&self, tau: DVec3) -> Self {
        *self * SO3::exp(tau)
    }

    #[inline]
    pub fn rminus(&self, other: &Self) -> DVec3 {
        (self.inverse() * *other).log()
    }

    #[inline]
    pub fn lplus(tau: DVec3, x: &Self) -> Self {
        SO3::exp(tau) * *x
    }

    #[inline]
    pub fn lminus(y: &Self, x: &Self) -> DVec3 {
        (*y * x.inverse()).log()
    }

    pub fn matrix(&self) -> DMat3 {
        DMat3::from_quat(self.q)
    }

    pub fn adj(&self) -> DMat3 {
        self.matrix()
    }

    pub fn inverse(&self) -> Self {
        Self {
            q: self.q.conjugate(),
        }
    }

    pub fn exp(omega: DVec3) -> Self {
        let theta_sq = omega.length_squared();
        let theta = theta_sq.sqrt();

        let (imag_factor, real_factor) = if theta < EPSILON {
            let theta_po4 = theta_sq * theta_sq;
            (
                0.5 - theta_sq / 48.0 + theta_po4 / 3840.0,
                1.0 - theta_sq / 8.0 + theta_po4 / 384.0,
            )
        } else {
            let half_theta = 0.5 * theta;
            (half_theta.sin() / theta, half_theta.cos())
        };

        let xyz = omega * imag_factor;
        Self {
            q: DQuat::from_xyzw(xyz.x, xyz.y, xyz.z, real_factor),
        }
    }

    /// Returns the axis-angle vector, with angle in `[-π, π]`.
    pub fn log(&self) -> DVec3 {
        let vec = DVec3::new(self.q.x, self.q.y, self.q.z);
        let w = self.q.w;
        let squared_n = vec.length_squared();

        let two_atan_n_by_w_by_n = if squared_n < EPSILON * EPSILON {
            // w is ±1 here, so dividing by it is safe
            let squared_w = w * w;
            2.0 / w - 2.0 / 3.0 * squared_n / (w * squared_w)
        } else {
            let n = squared_n.sqrt();
            if w.abs() < EPSILON {
                if w > 0.0 {
                    PI / n
                } else {
                    -PI / n
                }
            } else {
                2.0 * (n / w).atan() / n
            }
        };

        vec * two_atan_n_by_w_by_n
    }

    /// Skew-symmetric matrix of `omega`.
    pub fn hat(omega: DVec3) -> DMat3 {
        DMat3::from_cols(
            DVec3::new(0.0, omega.z, -omega.y),
            DVec3::new(-omega.z, 0.0, omega.x),
            DVec3::new(omega.y, -omega.x, 0.0),
        )
    }

    pub fn vee(omega: &DMat3) -> DVec3 {
        DVec3::new(omega.y_axis.z, omega.z_axis.x, omega.x_axis.y)
    }

    pub fn left_jacobian(omega: DVec3) -> DMat3 {
        let skew = Self::hat(omega);
        let theta = omega.length();
        if theta < EPSILON {
            return DMat3::IDENTITY + skew * 0.5 + (skew * skew) * (1.0 / 6.0);
        }
        // 1 - cos θ = 2 sin²(θ/2), without cancellation for small θ
        let one_minus_cos = 2.0 * (0.5 * theta).sin().powi(2);
        DMat3::IDENTITY
            + skew * (one_minus_cos / theta.powi(2))
            + (skew * skew) * ((theta - theta.sin()) / theta.powi(3))
    }

    pub fn right_jacobian(omega: DVec3) -> DMat3 {
        Self::left_jacobian(-omega)
    }

    fn renormalized(q: DQuat) -> Self {
        // first order correction, enough to stop drift under repeated products
        let squared_norm = q.length_squared();
        if squared_norm == 1.0 {
            return Self { q };
        }
        Self {
            q: q * (2.0 / (1.0 + squared_norm)),
        }
    }
}

impl Default for SO3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl std::ops::Mul<SO3> for SO3 {
    type Output = SO3;

    fn mul(self, rhs: Self) -> Self::Output {
        SO3::renormalized(self.q * rhs.q)
    }
}

impl std::ops::MulAssign<SO3> for SO3 {
    #[inline]
    fn mul_assign(&mut self, rhs: SO3) {
        *self = *self * rhs;
    }
}

impl std::ops::Mul<DVec3> for SO3 {
    type Output = DVec3;

    fn mul(self, rhs: DVec3) -> Self::Output {
        self.q * rhs
    }
}

impl fmt::Display for SO3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SO3(quaternion: [{}, {}, {}, {}])",
            self.q.x, self.q.y, self.q.z, self.q.w
        )
    }
}

impl TryFrom<[f64; 4]> for SO3 {
    type Error = LieError;

    fn try_from(xyzw: [f64; 4]) -> Result<Self, Self::Error> {
        Self::from_xyzw(xyzw[0], xyzw[1], xyzw[2], xyzw[3])
    }
}

impl From<SO3> for [f64; 4] {
    fn from(so3: SO3) -> Self {
        so3.q.to_array()
    }
}

impl approx::AbsDiffEq for SO3 {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.q.abs_diff_eq(other.q, epsilon) || self.q.abs_diff_eq(-other.q, epsilon)
    }
}

impl LieGroup for SO3 {
    type Tangent = DVec3;
    type Point = DVec3;
    type Transformation = DMat3;
    type Adjoint = DMat3;
    type Params = DVec4;

    const DOF: usize = 3;
    const NUM_PARAMETERS: usize = 4;
    const MATRIX_DIM: usize = 3;
    const IDENTITY: Self = SO3::IDENTITY;

    fn exp(tangent: DVec3) -> Self {
        SO3::exp(tangent)
    }

    fn log(&self) -> DVec3 {
        SO3::log(self)
    }

    fn hat(tangent: DVec3) -> DMat3 {
        SO3::hat(tangent)
    }

    fn vee(omega: &DMat3) -> DVec3 {
        SO3::vee(omega)
    }

    fn inverse(&self) -> Self {
        SO3::inverse(self)
    }

    fn params(&self) -> DVec4 {
        SO3::params(self)
    }

    fn matrix(&self) -> DMat3 {
        SO3::matrix(self)
    }

    fn adj(&self) -> DMat3 {
        SO3::adj(self)
    }

    fn from_matrix(mat: &DMat3) -> Result<Self, LieError> {
        SO3::from_matrix(mat)
    }

    fn transform(&self, point: DVec3) -> DVec3 {
        *self * point
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::f64::consts::FRAC_PI_2;

    const EPSILON: f64 = 1e-10;

    #[test]
    fn test_identity() {
        let s = SO3::IDENTITY;
        assert_eq!(s.unit_quaternion(), DQuat::from_xyzw(0.0, 0.0, 0.0, 1.0));
        assert_eq!(SO3::default(), s);
        assert_eq!(s.log(), DVec3::ZERO);
    }

    #[test]
    fn test_from_xyzw_keeps_scalar_part_last() {
        let half = FRAC_PI_2 / 2.0;
        let so3 = SO3::from_xyzw(0.0, 0.0, half.sin(), half.cos()).unwrap();
        assert_abs_diff_eq!(so3, SO3::rot_z(FRAC_PI_2), epsilon = EPSILON);

        let q = so3.unit_quaternion();
        assert_relative_eq!(q.w, half.cos(), epsilon = EPSILON);
        assert_relative_eq!(q.z, half.sin(), epsilon = EPSILON);

        // same rotation through the scalar-first constructor
        let wxyz = SO3::from_quaternion_wxyz(half.cos(), 0.0, 0.0, half.sin()).unwrap();
        assert_eq!(wxyz, so3);
    }

    #[test]
    fn test_from_xyzw_normalizes() {
        let so3 = SO3::from_xyzw(4.0, -2.0, 1.0, 3.5).unwrap();
        assert_relative_eq!(so3.unit_quaternion().length(), 1.0, epsilon = EPSILON);
        let expected = DQuat::from_xyzw(4.0, -2.0, 1.0, 3.5).normalize();
        assert!(so3.unit_quaternion().abs_diff_eq(expected, EPSILON));

        assert!(matches!(
            SO3::from_xyzw(0.0, 0.0, 0.0, 0.0),
            Err(LieError::ZeroNorm(_, _))
        ));
    }

    #[test]
    fn test_params_order() {
        let so3 = SO3::from_xyzw(0.1, 0.2, 0.3, 0.9).unwrap();
        let q = so3.unit_quaternion();
        assert_eq!(so3.params(), DVec4::new(q.x, q.y, q.z, q.w));
    }

    #[test]
    fn test_from_matrix() {
        // rotation about x with cos = 0.6, sin = 0.8
        let mat = DMat3::from_cols_array(&[1.0, 0.0, 0.0, 0.0, 0.6, 0.8, 0.0, -0.8, 0.6]);
        let s = SO3::from_matrix(&mat).unwrap();
        assert!(s.matrix().abs_diff_eq(mat, EPSILON));
        assert_relative_eq!(s.log().x, 0.8f64.atan2(0.6), epsilon = EPSILON);

        let reflection = DMat3::from_diagonal(DVec3::new(1.0, 1.0, -1.0));
        assert!(matches!(
            SO3::from_matrix(&reflection),
            Err(LieError::NegativeDeterminant(_))
        ));
        assert!(matches!(
            SO3::from_matrix(&(mat * 2.0)),
            Err(LieError::NotOrthogonal(_))
        ));
    }

    #[test]
    fn test_axis_builders() {
        let p = DVec3::new(1.0, 0.0, 0.0);
        assert!((SO3::rot_z(FRAC_PI_2) * p).abs_diff_eq(DVec3::Y, EPSILON));
        assert!((SO3::rot_y(FRAC_PI_2) * p).abs_diff_eq(-DVec3::Z, EPSILON));
        assert!((SO3::rot_x(FRAC_PI_2) * DVec3::Y).abs_diff_eq(DVec3::Z, EPSILON));
    }

    #[test]
    fn test_exp_log() {
        let test_vectors = [
            DVec3::new(0.1, 0.2, 0.3),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
            DVec3::new(0.0, 0.0, 1.0),
            DVec3::new(-0.5, 0.3, -0.2),
            DVec3::new(1e-12, -2e-12, 0.0),
            DVec3::new(0.0, 0.0, 3.0),
        ];

        for v in test_vectors {
            let log = SO3::exp(v).log();
            assert!(log.abs_diff_eq(v, EPSILON), "{log} != {v}");
        }
    }

    #[test]
    fn test_log_negative_scalar_part() {
        // -q is the same rotation as q
        let so3 = SO3::exp(DVec3::new(0.2, -0.1, 0.4));
        let q = so3.unit_quaternion();
        let flipped = SO3::from_quaternion(-q).unwrap();
        assert!(flipped.log().abs_diff_eq(so3.log(), EPSILON));
        assert_abs_diff_eq!(flipped, so3, epsilon = EPSILON);
    }

    #[test]
    fn test_log_half_turn() {
        let so3 = SO3::from_xyzw(1.0, 0.0, 0.0, 0.0).unwrap();
        let log = so3.log();
        assert_relative_eq!(log.length(), PI, epsilon = EPSILON);
    }

    #[test]
    fn test_hat() {
        let hat_v = SO3::hat(DVec3::new(1.0, 2.0, 3.0));
        assert_eq!(hat_v.x_axis, DVec3::new(0.0, 3.0, -2.0));
        assert_eq!(hat_v.y_axis, DVec3::new(-3.0, 0.0, 1.0));
        assert_eq!(hat_v.z_axis, DVec3::new(2.0, -1.0, 0.0));

        // hat(a) * b == a x b
        let a = DVec3::new(0.3, -0.2, 0.5);
        let b = DVec3::new(-1.0, 0.4, 2.0);
        assert!((SO3::hat(a) * b).abs_diff_eq(a.cross(b), EPSILON));
    }

    #[test]
    fn test_hat_vee() {
        for v in [
            DVec3::new(1.0, 2.0, 3.0),
            DVec3::new(-0.5, 0.0, 1.5),
            DVec3::new(0.1, -0.2, 0.3),
        ] {
            assert_eq!(SO3::vee(&SO3::hat(v)), v);
        }
    }

    #[test]
    fn test_matrix_orthogonal() {
        let so3 = SO3::from_xyzw(0.1, 0.2, 0.3, 0.9).unwrap();
        let r = so3.matrix();
        assert!((r.transpose() * r).abs_diff_eq(DMat3::IDENTITY, EPSILON));
        assert_relative_eq!(r.determinant(), 1.0, epsilon = EPSILON);
        assert!(so3.inverse().matrix().abs_diff_eq(r.transpose(), EPSILON));
    }

    #[test]
    fn test_mul() {
        let s2 = SO3::from_xyzw(0.1, 0.2, 0.3, 0.9).unwrap();
        assert_abs_diff_eq!(SO3::IDENTITY * s2, s2, epsilon = EPSILON);
        assert_abs_diff_eq!(s2 * s2.inverse(), SO3::IDENTITY, epsilon = EPSILON);

        let s3 = SO3::from_random();
        assert!((s2 * s3)
            .matrix()
            .abs_diff_eq(s2.matrix() * s3.matrix(), EPSILON));
    }

    #[test]
    fn test_mul_assign() {
        let mut s3 = SO3::from_random();
        let original_s3 = s3;
        let s4 = SO3::from_random();
        s3 *= s4;
        assert_abs_diff_eq!(s3, original_s3 * s4, epsilon = EPSILON);
    }

    #[test]
    fn test_unit_norm_after_many_products() {
        let step = SO3::exp(DVec3::new(0.001, -0.002, 0.003));
        let mut so3 = SO3::IDENTITY;
        for _ in 0..10_000 {
            so3 *= step;
        }
        assert_relative_eq!(so3.unit_quaternion().length(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_mul_vec() {
        let t = DVec3::new(1.0, 2.0, 3.0);
        assert_eq!(SO3::IDENTITY * t, t);

        let s2 = SO3::from_xyzw(0.1, 0.2, 0.3, 0.9).unwrap();
        let rotated = s2 * t;
        assert_relative_eq!(rotated.length(), t.length(), epsilon = EPSILON);
        assert!(rotated.abs_diff_eq(s2.matrix() * t, EPSILON));
    }

    #[test]
    fn test_adjoint() {
        let x = SO3::from_random();
        let y = SO3::from_random();

        // Adj(x) * ω == vee(R hat(ω) Rᵀ)
        let omega = DVec3::new(0.3, -0.1, 0.2);
        let r = x.matrix();
        let conjugated = SO3::vee(&(r * SO3::hat(omega) * r.transpose()));
        assert!((x.adj() * omega).abs_diff_eq(conjugated, EPSILON));

        assert!((x * y).adj().abs_diff_eq(x.adj() * y.adj(), EPSILON));
    }

    #[test]
    fn test_jacobians() {
        for v in [
            DVec3::new(0.1, 0.2, 0.3),
            DVec3::new(0.01, 0.02, 0.03),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::ZERO,
        ] {
            let jl = SO3::left_jacobian(v);
            let jr = SO3::right_jacobian(v);

            assert!(jl.is_finite());
            assert!(jr.is_finite());
            // J v = v for both Jacobians
            assert!((jl * v).abs_diff_eq(v, 1e-9));
            assert!((jr * v).abs_diff_eq(v, 1e-9));
            // Jl = Jrᵀ
            assert!(jl.abs_diff_eq(jr.transpose(), 1e-9));
        }
    }

    #[test]
    fn test_left_jacobian_small_angle() {
        // first order term is hat(ω) / 2 well above the Taylor threshold
        let omega = DVec3::new(1e-8, 0.0, 0.0);
        let jl = SO3::left_jacobian(omega);
        let expected = DMat3::IDENTITY + SO3::hat(omega) * 0.5;
        assert!(jl.abs_diff_eq(expected, 1e-15));
        assert_relative_eq!(jl.y_axis.z, 0.5e-8, max_relative = 1e-6);
    }

    #[test]
    fn test_rplus_rminus_roundtrip() {
        let x = SO3::from_random();
        let tau = DVec3::new(0.4, -0.2, 0.7);
        let y = x.rplus(tau);
        assert!(x.rminus(&y).abs_diff_eq(tau, EPSILON));
    }

    #[test]
    fn test_lplus_lminus_consistency() {
        let x = SO3::from_random();
        let tau = DVec3::new(-0.3, 1.1, 0.2);
        let y = SO3::lplus(tau, &x);
        assert!(SO3::lminus(&y, &x).abs_diff_eq(tau, EPSILON));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            SO3::IDENTITY.to_string(),
            "SO3(quaternion: [0, 0, 0, 1])"
        );
    }

    #[test]
    fn test_serde() {
        let so3 = SO3::from_random();
        let json = serde_json::to_string(&so3).unwrap();
        let back: SO3 = serde_json::from_str(&json).unwrap();
        assert_abs_diff_eq!(back, so3, epsilon = EPSILON);
        assert!(serde_json::from_str::<SO3>("[0.0, 0.0, 0.0, 0.0]").is_err());
    }
}
