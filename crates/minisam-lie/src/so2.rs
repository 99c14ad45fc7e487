use std::f64::consts::TAU;
use std::fmt;

use glam::{DMat2, DVec2};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::group::check_rotation2;
use crate::{LieError, LieGroup, EPSILON};

/// A 2D rotation, stored as a unit complex number `[real, imaginary]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 2]", into = "[f64; 2]")]
pub struct SO2 {
    z: DVec2,
}

impl SO2 {
    /// The identity rotation.
    pub const IDENTITY: Self = Self {
        z: DVec2::new(1.0, 0.0),
    };

    /// Create a rotation of `theta` radians.
    pub fn from_angle(theta: f64) -> Self {
        Self::exp(theta)
    }

    /// Create a rotation from a complex number `real + i·imag`.
    ///
    /// The complex number is normalized; it fails only when its norm is zero.
    pub fn from_complex(real: f64, imag: f64) -> Result<Self, LieError> {
        let z = DVec2::new(real, imag);
        let squared_norm = z.length_squared();
        if squared_norm < EPSILON {
            return Err(LieError::ZeroNorm("complex number", squared_norm));
        }
        Ok(Self {
            z: z / squared_norm.sqrt(),
        })
    }

    /// Create a rotation from a 2x2 rotation matrix.
    pub fn from_matrix(mat: &DMat2) -> Result<Self, LieError> {
        check_rotation2(mat)?;
        Self::from_complex(mat.x_axis.x, mat.x_axis.y)
    }

    /// Sample a rotation with a uniformly distributed angle.
    pub fn from_random() -> Self {
        let mut rng = rand::rng();
        let theta: f64 = rng.random_range(0.0..TAU);
        Self::exp(theta)
    }

    /// The unit complex number as `[real, imaginary]`.
    #[inline]
    pub fn unit_complex(&self) -> DVec2 {
        self.z
    }

    /// The rotation angle in `(-π, π]`, same as [`SO2::log`].
    #[inline]
    pub fn theta(&self) -> f64 {
        self.log()
    }

    #[inline]
    pub fn rplus(&self, dtheta: f64) -> Self {
        *self * SO2::exp(dtheta)
    }

    #[inline]
    pub fn rminus(&self, other: &Self) -> f64 {
        (self.inverse() * *other).log()
    }

    #[inline]
    pub fn lplus(dtheta: f64, x: &Self) -> Self {
        SO2::exp(dtheta) * *x
    }

    #[inline]
    pub fn lminus(y: &Self, x: &Self) -> f64 {
        (*y * x.inverse()).log()
    }

    pub fn matrix(&self) -> DMat2 {
        DMat2::from_cols(
            DVec2::new(self.z.x, self.z.y),
            DVec2::new(-self.z.y, self.z.x),
        )
    }

    /// Complex conjugate; the representation is kept at unit norm.
    pub fn inverse(&self) -> Self {
        Self {
            z: DVec2::new(self.z.x, -self.z.y),
        }
    }

    pub fn params(&self) -> DVec2 {
        self.z
    }

    /// SO(2) is commutative, its adjoint is the scalar 1.
    pub fn adj(&self) -> f64 {
        1.0
    }

    pub fn exp(theta: f64) -> Self {
        Self {
            z: DVec2::new(theta.cos(), theta.sin()),
        }
    }

    pub fn log(&self) -> f64 {
        self.z.y.atan2(self.z.x)
    }

    pub fn hat(theta: f64) -> DMat2 {
        DMat2::from_cols(DVec2::new(0.0, theta), DVec2::new(-theta, 0.0))
    }

    pub fn vee(omega: &DMat2) -> f64 {
        omega.x_axis.y
    }

    pub(crate) fn renormalized(z: DVec2) -> Self {
        // first order correction, enough to stop drift under repeated products
        let squared_norm = z.length_squared();
        if squared_norm == 1.0 {
            return Self { z };
        }
        Self {
            z: z * (2.0 / (1.0 + squared_norm)),
        }
    }
}

impl Default for SO2 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl std::ops::Mul<SO2> for SO2 {
    type Output = SO2;

    fn mul(self, other: SO2) -> Self::Output {
        // (a + bi)(c + di) = (ac - bd) + (ad + bc)i
        let real = self.z.x * other.z.x - self.z.y * other.z.y;
        let imag = self.z.x * other.z.y + self.z.y * other.z.x;
        SO2::renormalized(DVec2::new(real, imag))
    }
}

impl std::ops::MulAssign<SO2> for SO2 {
    #[inline]
    fn mul_assign(&mut self, rhs: SO2) {
        *self = *self * rhs;
    }
}

impl std::ops::Mul<DVec2> for SO2 {
    type Output = DVec2;

    fn mul(self, rhs: DVec2) -> Self::Output {
        DVec2::new(
            self.z.x * rhs.x - self.z.y * rhs.y,
            self.z.y * rhs.x + self.z.x * rhs.y,
        )
    }
}

impl fmt::Display for SO2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SO2(theta: {})", self.log())
    }
}

impl TryFrom<[f64; 2]> for SO2 {
    type Error = LieError;

    fn try_from(z: [f64; 2]) -> Result<Self, Self::Error> {
        Self::from_complex(z[0], z[1])
    }
}

impl From<SO2> for [f64; 2] {
    fn from(so2: SO2) -> Self {
        so2.z.to_array()
    }
}

impl approx::AbsDiffEq for SO2 {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.z.abs_diff_eq(other.z, epsilon)
    }
}

impl LieGroup for SO2 {
    type Tangent = f64;
    type Point = DVec2;
    type Transformation = DMat2;
    type Adjoint = f64;
    type Params = DVec2;

    const DOF: usize = 1;
    const NUM_PARAMETERS: usize = 2;
    const MATRIX_DIM: usize = 2;
    const IDENTITY: Self = SO2::IDENTITY;

    fn exp(tangent: f64) -> Self {
        SO2::exp(tangent)
    }

    fn log(&self) -> f64 {
        SO2::log(self)
    }

    fn hat(tangent: f64) -> DMat2 {
        SO2::hat(tangent)
    }

    fn vee(omega: &DMat2) -> f64 {
        SO2::vee(omega)
    }

    fn inverse(&self) -> Self {
        SO2::inverse(self)
    }

    fn params(&self) -> DVec2 {
        SO2::params(self)
    }

    fn matrix(&self) -> DMat2 {
        SO2::matrix(self)
    }

    fn adj(&self) -> f64 {
        SO2::adj(self)
    }

    fn from_matrix(mat: &DMat2) -> Result<Self, LieError> {
        SO2::from_matrix(mat)
    }

    fn transform(&self, point: DVec2) -> DVec2 {
        *self * point
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::f64::consts::PI;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn test_identity() {
        let identity = SO2::IDENTITY;
        assert_eq!(identity.unit_complex(), DVec2::new(1.0, 0.0));
        assert_eq!(SO2::default(), identity);
        assert_eq!(identity.log(), 0.0);
    }

    #[test]
    fn test_from_angle_theta_roundtrip() {
        for theta in [0.0, 0.3, -1.2, 3.0, -3.0] {
            assert_relative_eq!(SO2::from_angle(theta).theta(), theta, epsilon = EPSILON);
        }
        // angles are returned modulo 2π
        let wrapped = SO2::from_angle(2.0 * PI + 0.5).theta();
        assert_relative_eq!(wrapped, 0.5, epsilon = EPSILON);
    }

    #[test]
    fn test_from_complex() {
        let so2 = SO2::from_complex(0.6, 0.8).unwrap();
        assert!(so2.unit_complex().abs_diff_eq(DVec2::new(0.6, 0.8), EPSILON));

        // non-unit inputs are normalized
        let scaled = SO2::from_complex(3.0, 4.0).unwrap();
        assert_abs_diff_eq!(scaled, so2, epsilon = EPSILON);

        assert!(matches!(
            SO2::from_complex(0.0, 0.0),
            Err(LieError::ZeroNorm(_, _))
        ));
    }

    #[test]
    fn test_from_matrix() {
        // [0.6  -0.8]
        // [0.8   0.6]
        let mat = DMat2::from_cols_array(&[0.6, 0.8, -0.8, 0.6]);
        let so2 = SO2::from_matrix(&mat).unwrap();
        assert_relative_eq!(so2.unit_complex().x, 0.6, epsilon = EPSILON);
        assert_relative_eq!(so2.unit_complex().y, 0.8, epsilon = EPSILON);

        let scaled = DMat2::from_cols_array(&[1.2, 1.6, -1.6, 1.2]);
        assert!(matches!(
            SO2::from_matrix(&scaled),
            Err(LieError::NotOrthogonal(_))
        ));
    }

    #[test]
    fn test_matrix() {
        let so2 = SO2::from_complex(0.6, 0.8).unwrap();
        let expected = DMat2::from_cols_array(&[0.6, 0.8, -0.8, 0.6]);
        assert!(so2.matrix().abs_diff_eq(expected, EPSILON));
    }

    #[test]
    fn test_exp_log() {
        for theta in [0.0, 0.1, -0.7, 2.5] {
            assert_relative_eq!(SO2::exp(theta).log(), theta, epsilon = EPSILON);
        }
    }

    #[test]
    fn test_hat_vee() {
        let omega = SO2::hat(0.7);
        assert_eq!(omega.x_axis.y, 0.7);
        assert_eq!(omega.y_axis.x, -0.7);
        assert_eq!(SO2::vee(&omega), 0.7);
    }

    #[test]
    fn test_inverse() {
        let so2 = SO2::from_random();
        let identity = so2.inverse() * so2;
        assert_abs_diff_eq!(identity, SO2::IDENTITY, epsilon = EPSILON);
        assert_relative_eq!(so2.inverse().log(), -so2.log(), epsilon = EPSILON);
    }

    #[test]
    fn test_mul_assign() {
        let a = SO2::exp(0.4);
        let b = SO2::exp(-1.1);
        let mut c = a;
        c *= b;
        assert_abs_diff_eq!(c, a * b, epsilon = EPSILON);
        assert_relative_eq!(c.log(), -0.7, epsilon = EPSILON);
    }

    #[test]
    fn test_mul_vec() {
        let rotated = SO2::exp(PI / 2.0) * DVec2::new(1.0, 0.0);
        assert!(rotated.abs_diff_eq(DVec2::new(0.0, 1.0), EPSILON));
    }

    #[test]
    fn test_unit_norm_after_many_products() {
        let step = SO2::exp(0.001);
        let mut so2 = SO2::IDENTITY;
        for _ in 0..10_000 {
            so2 *= step;
        }
        assert_relative_eq!(so2.unit_complex().length(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rplus_rminus_roundtrip() {
        let x = SO2::from_random();
        let dtheta = 0.42;
        let y = x.rplus(dtheta);
        assert_relative_eq!(x.rminus(&y), dtheta, epsilon = EPSILON);
    }

    #[test]
    fn test_lplus_lminus_consistency() {
        let x = SO2::from_random();
        let dtheta = -1.1;
        let y = SO2::lplus(dtheta, &x);
        assert_relative_eq!(SO2::lminus(&y, &x), dtheta, epsilon = EPSILON);
    }

    #[test]
    fn test_display() {
        assert_eq!(SO2::IDENTITY.to_string(), "SO2(theta: 0)");
        let so2 = SO2::exp(0.5);
        let text = so2.to_string();
        let theta: f64 = text
            .trim_start_matches("SO2(theta: ")
            .trim_end_matches(')')
            .parse()
            .unwrap();
        assert_relative_eq!(theta, 0.5, epsilon = EPSILON);
        assert_eq!(text, SO2::exp(0.5).to_string());
    }

    #[test]
    fn test_serde() {
        let so2 = SO2::exp(0.25);
        let json = serde_json::to_string(&so2).unwrap();
        let back: SO2 = serde_json::from_str(&json).unwrap();
        assert_abs_diff_eq!(back, so2, epsilon = EPSILON);
        assert!(serde_json::from_str::<SO2>("[0.0, 0.0]").is_err());
    }
}
