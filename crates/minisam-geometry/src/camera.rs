use std::fmt;

use glam::{DVec2, DVec3};
use minisam_lie::SE3;

use crate::{Calibration, GeometryError};

/// A calibrated pinhole camera.
///
/// `pose` maps camera coordinates to world coordinates; the camera looks down
/// its `+z` axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinholeCamera<C> {
    pose: SE3,
    calibration: C,
}

impl<C: Calibration> PinholeCamera<C> {
    pub fn new(pose: SE3, calibration: C) -> Self {
        Self { pose, calibration }
    }

    pub fn pose(&self) -> SE3 {
        self.pose
    }

    pub fn calibration(&self) -> &C {
        &self.calibration
    }

    /// Project a world point to pixel coordinates.
    ///
    /// # Errors
    ///
    /// [`GeometryError::BehindCamera`] when the point depth in the camera frame
    /// is not positive.
    pub fn project(&self, point_world: DVec3) -> Result<DVec2, GeometryError> {
        let p = self.pose.inverse() * point_world;
        if p.z <= 0.0 {
            return Err(GeometryError::BehindCamera(p.z));
        }
        Ok(self.calibration.project(p.truncate() / p.z))
    }

    /// World point at `depth` along the ray through `pixel`.
    pub fn backproject(&self, pixel: DVec2, depth: f64) -> Result<DVec3, GeometryError> {
        let p = self.calibration.unproject(pixel)?;
        Ok(self.pose * (p.extend(1.0) * depth))
    }
}

impl<C: fmt::Display> fmt::Display for PinholeCamera<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PinholeCamera(pose: {}, calibration: {})",
            self.pose, self.calibration
        )
    }
}
