use std::fmt::Display;
use std::ops::{Mul, MulAssign};

use glam::{DMat2, DMat3};

use crate::{LieError, EPSILON_SQRT};

/// Tangent vector of SE(3), ordered as `[υx, υy, υz, ωx, ωy, ωz]`.
pub type Vector6 = [f64; 6];

/// Row-major 6x6 matrix, used for the adjoint of SE(3).
pub type Matrix6 = [[f64; 6]; 6];

/// Operations shared by every group of this crate.
///
/// Each group also exposes these as inherent methods; the trait exists so that
/// code such as the Python binding and the property tests can be written once
/// for all four groups.
pub trait LieGroup: Copy + Display + Mul<Self, Output = Self> + MulAssign<Self> {
    /// Tangent space (Lie algebra) coordinates.
    type Tangent: Copy;
    /// Point the group acts on.
    type Point: Copy;
    /// Dense matrix representation, also the output of `hat`.
    type Transformation: Copy;
    /// Adjoint representation.
    type Adjoint: Copy;
    /// Minimal internal parameter vector.
    type Params: Copy;

    /// Degrees of freedom, the tangent space dimension.
    const DOF: usize;
    /// Number of internal parameters.
    const NUM_PARAMETERS: usize;
    /// Dimension of the square matrix representation.
    const MATRIX_DIM: usize;
    /// The identity element.
    const IDENTITY: Self;

    /// Lie algebra -> Lie group.
    fn exp(tangent: Self::Tangent) -> Self;
    /// Lie group -> Lie algebra.
    fn log(&self) -> Self::Tangent;
    /// Vector space -> matrix Lie algebra.
    fn hat(tangent: Self::Tangent) -> Self::Transformation;
    /// Matrix Lie algebra -> vector space.
    fn vee(omega: &Self::Transformation) -> Self::Tangent;
    /// Group inverse.
    fn inverse(&self) -> Self;
    /// Internal parameters.
    fn params(&self) -> Self::Params;
    /// Dense matrix representation.
    fn matrix(&self) -> Self::Transformation;
    /// Adjoint representation.
    fn adj(&self) -> Self::Adjoint;
    /// Build an element from its dense matrix representation.
    fn from_matrix(mat: &Self::Transformation) -> Result<Self, LieError>;
    /// Group action on a point.
    fn transform(&self, point: Self::Point) -> Self::Point;
}

pub(crate) fn check_rotation2(mat: &DMat2) -> Result<(), LieError> {
    let residual = (*mat * mat.transpose() - DMat2::IDENTITY)
        .to_cols_array()
        .iter()
        .map(|x| x * x)
        .sum::<f64>()
        .sqrt();
    if residual > EPSILON_SQRT {
        return Err(LieError::NotOrthogonal(residual));
    }
    let det = mat.determinant();
    if det <= 0.0 {
        return Err(LieError::NegativeDeterminant(det));
    }
    Ok(())
}

pub(crate) fn check_rotation3(mat: &DMat3) -> Result<(), LieError> {
    let residual = (*mat * mat.transpose() - DMat3::IDENTITY)
        .to_cols_array()
        .iter()
        .map(|x| x * x)
        .sum::<f64>()
        .sqrt();
    if residual > EPSILON_SQRT {
        return Err(LieError::NotOrthogonal(residual));
    }
    let det = mat.determinant();
    if det <= 0.0 {
        return Err(LieError::NegativeDeterminant(det));
    }
    Ok(())
}

pub(crate) fn check_homogeneous_row(row: &[f64]) -> Result<(), LieError> {
    let (last, rest) = match row.split_last() {
        Some(split) => split,
        None => return Err(LieError::InvalidHomogeneousRow(Vec::new())),
    };
    let valid = rest.iter().all(|x| x.abs() <= EPSILON_SQRT) && (last - 1.0).abs() <= EPSILON_SQRT;
    if !valid {
        return Err(LieError::InvalidHomogeneousRow(row.to_vec()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_rotation2() {
        assert!(check_rotation2(&DMat2::IDENTITY).is_ok());
        assert!(matches!(
            check_rotation2(&DMat2::from_cols_array(&[2.0, 0.0, 0.0, 1.0])),
            Err(LieError::NotOrthogonal(_))
        ));
        assert!(matches!(
            check_rotation2(&DMat2::from_cols_array(&[1.0, 0.0, 0.0, -1.0])),
            Err(LieError::NegativeDeterminant(_))
        ));
    }

    #[test]
    fn test_check_rotation3() {
        assert!(check_rotation3(&DMat3::from_rotation_z(0.3)).is_ok());
        assert!(matches!(
            check_rotation3(&DMat3::from_diagonal(glam::DVec3::new(1.0, 1.0, -1.0))),
            Err(LieError::NegativeDeterminant(_))
        ));
    }

    #[test]
    fn test_check_homogeneous_row() {
        assert!(check_homogeneous_row(&[0.0, 0.0, 1.0]).is_ok());
        assert_eq!(
            check_homogeneous_row(&[0.0, 0.5, 1.0]),
            Err(LieError::InvalidHomogeneousRow(vec![0.0, 0.5, 1.0]))
        );
    }
}
