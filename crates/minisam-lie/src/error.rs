/// An error type for the construction of Lie group elements.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LieError {
    /// The complex number or quaternion has a norm too close to zero to be normalized.
    #[error("cannot normalize a {0} with squared norm {1}")]
    ZeroNorm(&'static str, f64),

    /// The rotation block of a matrix is not orthogonal.
    #[error("rotation block is not orthogonal (|R Rᵀ - I| = {0})")]
    NotOrthogonal(f64),

    /// The rotation block of a matrix is a reflection.
    #[error("rotation block has non-positive determinant {0}")]
    NegativeDeterminant(f64),

    /// The last row of a homogeneous matrix is not `[0, .., 0, 1]`.
    #[error("last row of the homogeneous matrix must be [0, .., 0, 1], got {0:?}")]
    InvalidHomogeneousRow(Vec<f64>),
}
