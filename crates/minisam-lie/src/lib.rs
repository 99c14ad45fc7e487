#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # minisam Lie groups
//!
//! Rotations and rigid body transformations used by the SLAM building blocks of
//! this workspace. All groups are stored in double precision and keep their
//! internal representation on the group manifold under composition.
//!
//! | Group | DOF | Internal repr | Tangent layout |
//! |-------|-----|---------------|----------------|
//! | [`SO2`] | 1 | unit complex number | `θ` |
//! | [`SE2`] | 3 | `SO2` + `DVec2` | `[υx, υy, θ]` |
//! | [`SO3`] | 3 | unit quaternion | `[ωx, ωy, ωz]` |
//! | [`SE3`] | 6 | `SO3` + `DVec3` | `[υ, ω]` |
//!
//! ## Example
//!
//! ```rust
//! use glam::DVec3;
//! use minisam_lie::{SE3, SO3};
//!
//! let pose = SE3::new(SO3::rot_z(std::f64::consts::FRAC_PI_2), DVec3::new(1.0, 0.0, 0.0));
//! let p = pose * DVec3::new(1.0, 0.0, 0.0);
//! assert!((p - DVec3::new(1.0, 1.0, 0.0)).length() < 1e-12);
//!
//! let back = SE3::exp(pose.log());
//! assert!(back.translation().abs_diff_eq(pose.translation(), 1e-9));
//! ```

mod error;
pub use error::LieError;

/// Shared Lie group contract and small fixed-size helper types.
pub mod group;
pub use group::{LieGroup, Matrix6, Vector6};

/// Special Euclidean group SE(2) for 2D rigid transformations.
pub mod se2;
pub use se2::SE2;

/// Special Euclidean group SE(3) for 3D rigid transformations.
pub mod se3;
pub use se3::SE3;

/// Special Orthogonal group SO(2) for 2D rotations.
pub mod so2;
pub use so2::SO2;

/// Special Orthogonal group SO(3) for 3D rotations.
pub mod so3;
pub use so3::SO3;

/// Threshold below which the exp/log maps switch to their Taylor expansions.
pub const EPSILON: f64 = 1e-10;

/// Tolerance used when validating rotation matrices and unit norms.
pub const EPSILON_SQRT: f64 = 1e-5;
