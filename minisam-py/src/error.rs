use pyo3::exceptions::{PyIOError, PyKeyError, PyRuntimeError, PyValueError};
use pyo3::PyErr;

use minisam_core::{KeyError, LossError, TimerError, VariableError};
use minisam_geometry::GeometryError;
use minisam_lie::LieError;
use minisam_slam::G2oError;

/// Errors crossing the Python boundary.
///
/// Library errors become `ValueError`, missing keys `KeyError` and file errors
/// `IOError`.
#[derive(Debug, thiserror::Error)]
pub enum PyMinisamError {
    #[error(transparent)]
    Lie(#[from] LieError),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Variable(#[from] VariableError),

    #[error(transparent)]
    Loss(#[from] LossError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    G2o(#[from] G2oError),

    #[error(transparent)]
    Timer(#[from] TimerError),

    /// An error already raised on the Python side, e.g. a failed extraction.
    #[error(transparent)]
    Python(#[from] PyErr),
}

pub type PyMinisamResult<T> = Result<T, PyMinisamError>;

impl From<PyMinisamError> for PyErr {
    fn from(err: PyMinisamError) -> PyErr {
        match err {
            PyMinisamError::Python(e) => e,
            PyMinisamError::Variable(VariableError::KeyNotFound(key)) => PyKeyError::new_err(key),
            PyMinisamError::G2o(G2oError::IoError(e)) => PyIOError::new_err(e.to_string()),
            PyMinisamError::Timer(e) => PyRuntimeError::new_err(e.to_string()),
            other => PyValueError::new_err(other.to_string()),
        }
    }
}
