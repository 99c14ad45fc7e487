#![doc = env!("CARGO_PKG_DESCRIPTION")]

mod error;
pub use error::{KeyError, LossError, TimerError, VariableError};

/// Packed `(char, index)` identifiers for variables.
pub mod key;
pub use key::{key, key_char, key_index, key_string, Key};

/// Linear algebra helpers on small row-major matrices.
pub mod linalg;

/// Loss functions that whiten and robustify residuals.
pub mod loss;
pub use loss::{
    CauchyLoss, DiagonalLoss, GaussianLoss, HuberLoss, Jacobian, LossFunction, ScaleLoss,
};

/// Wall-clock timers and a process-wide timing registry.
pub mod timer;
pub use timer::{global_tic, global_timer, global_toc, reset_timers, timing_report, Timer};

/// Heterogeneous variable container keyed by [`Key`].
pub mod variables;
pub use variables::{Variable, Variables};
