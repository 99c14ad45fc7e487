use pyo3::prelude::*;

use crate::error::PyMinisamResult;

/// Pack a character and an index into an integer key, e.g. `key('x', 1)`.
#[pyfunction]
pub fn key(c: char, index: u64) -> PyMinisamResult<u64> {
    Ok(minisam_core::key(c, index)?)
}

#[pyfunction]
pub fn key_char(key: u64) -> char {
    minisam_core::key_char(key)
}

#[pyfunction]
pub fn key_index(key: u64) -> u64 {
    minisam_core::key_index(key)
}

/// Readable form of a key, `x1` for `key('x', 1)`.
#[pyfunction]
pub fn key_string(key: u64) -> String {
    minisam_core::key_string(key)
}

pub fn wrap_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(key, m)?)?;
    m.add_function(wrap_pyfunction!(key_char, m)?)?;
    m.add_function(wrap_pyfunction!(key_index, m)?)?;
    m.add_function(wrap_pyfunction!(key_string, m)?)?;
    log::debug!("registered key functions");
    Ok(())
}
