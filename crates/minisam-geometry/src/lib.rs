#![doc = env!("CARGO_PKG_DESCRIPTION")]

mod error;
pub use error::GeometryError;

/// Intrinsic calibration models.
pub mod calib;
pub use calib::{CalibBundler, CalibK, Calibration};

/// Pinhole camera with a pose in the world frame.
pub mod camera;
pub use camera::PinholeCamera;
