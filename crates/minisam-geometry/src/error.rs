/// Error types for calibration and camera operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// A focal length is zero or not finite.
    #[error("Invalid focal length: {0}")]
    InvalidFocalLength(f64),

    /// The intrinsics matrix is not of the form `[[fx, 0, cx], [0, fy, cy], [0, 0, 1]]`.
    #[error("Invalid intrinsics matrix: {0}")]
    InvalidIntrinsics(String),

    /// The point lies on or behind the image plane, with the given depth.
    #[error("Point is behind the camera (depth {0})")]
    BehindCamera(f64),

    /// Iterative undistortion did not converge.
    #[error("Undistortion did not converge after {0} iterations")]
    UndistortFailed(usize),
}
