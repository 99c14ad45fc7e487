use std::fmt;

use glam::{DMat3, DVec2, DVec3};

use crate::GeometryError;

const UNDISTORT_MAX_ITERATIONS: usize = 50;
const UNDISTORT_TOLERANCE: f64 = 1e-12;

/// Maps points on the normalized image plane (`z = 1`) to pixels and back.
pub trait Calibration {
    /// Normalized image coordinates to pixel coordinates.
    fn project(&self, p: DVec2) -> DVec2;

    /// Pixel coordinates to normalized image coordinates.
    fn unproject(&self, pixel: DVec2) -> Result<DVec2, GeometryError>;
}

fn check_focal(f: f64) -> Result<(), GeometryError> {
    if f == 0.0 || !f.is_finite() {
        return Err(GeometryError::InvalidFocalLength(f));
    }
    Ok(())
}

/// Linear pinhole intrinsics `[[fx, 0, cx], [0, fy, cy], [0, 0, 1]]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibK {
    pub fx: f64,
    pub fy: f64,
    pub cx: f64,
    pub cy: f64,
}

impl CalibK {
    pub fn new(fx: f64, fy: f64, cx: f64, cy: f64) -> Result<Self, GeometryError> {
        check_focal(fx)?;
        check_focal(fy)?;
        Ok(Self { fx, fy, cx, cy })
    }

    /// Create the calibration from a 3x3 intrinsics matrix.
    pub fn from_matrix(k: &DMat3) -> Result<Self, GeometryError> {
        let (row0, row1, row2) = (k.row(0), k.row(1), k.row(2));
        if row0.y != 0.0 || row1.x != 0.0 || row2 != DVec3::Z {
            return Err(GeometryError::InvalidIntrinsics(format!(
                "expected [[fx, 0, cx], [0, fy, cy], [0, 0, 1]], got {k}"
            )));
        }
        Self::new(row0.x, row1.y, row0.z, row1.z)
    }

    pub fn matrix(&self) -> DMat3 {
        DMat3::from_cols(
            DVec3::new(self.fx, 0.0, 0.0),
            DVec3::new(0.0, self.fy, 0.0),
            DVec3::new(self.cx, self.cy, 1.0),
        )
    }

    /// Closed form inverse of [`CalibK::matrix`].
    pub fn inverse_matrix(&self) -> DMat3 {
        DMat3::from_cols(
            DVec3::new(1.0 / self.fx, 0.0, 0.0),
            DVec3::new(0.0, 1.0 / self.fy, 0.0),
            DVec3::new(-self.cx / self.fx, -self.cy / self.fy, 1.0),
        )
    }
}

impl Calibration for CalibK {
    fn project(&self, p: DVec2) -> DVec2 {
        DVec2::new(self.fx * p.x + self.cx, self.fy * p.y + self.cy)
    }

    fn unproject(&self, pixel: DVec2) -> Result<DVec2, GeometryError> {
        Ok(DVec2::new(
            (pixel.x - self.cx) / self.fx,
            (pixel.y - self.cy) / self.fy,
        ))
    }
}

impl fmt::Display for CalibK {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CalibK(fx: {}, fy: {}, cx: {}, cy: {})",
            self.fx, self.fy, self.cx, self.cy
        )
    }
}

/// Bundler style intrinsics: a single focal length and two radial
/// distortion terms, principal point at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibBundler {
    pub f: f64,
    pub k1: f64,
    pub k2: f64,
}

impl CalibBundler {
    pub fn new(f: f64, k1: f64, k2: f64) -> Result<Self, GeometryError> {
        check_focal(f)?;
        Ok(Self { f, k1, k2 })
    }

    /// Radial scale `1 + k1 r² + k2 r⁴` for a squared radius.
    fn radial(&self, r2: f64) -> f64 {
        1.0 + self.k1 * r2 + self.k2 * r2 * r2
    }
}

impl Calibration for CalibBundler {
    fn project(&self, p: DVec2) -> DVec2 {
        p * (self.f * self.radial(p.length_squared()))
    }

    /// Inverts the radial distortion by fixed point iteration.
    fn unproject(&self, pixel: DVec2) -> Result<DVec2, GeometryError> {
        let distorted = pixel / self.f;
        let mut p = distorted;
        for _ in 0..UNDISTORT_MAX_ITERATIONS {
            let next = distorted / self.radial(p.length_squared());
            if (next - p).length_squared() < UNDISTORT_TOLERANCE * UNDISTORT_TOLERANCE {
                return Ok(next);
            }
            p = next;
        }
        Err(GeometryError::UndistortFailed(UNDISTORT_MAX_ITERATIONS))
    }
}

impl fmt::Display for CalibBundler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CalibBundler(f: {}, k1: {}, k2: {})", self.f, self.k1, self.k2)
    }
}
