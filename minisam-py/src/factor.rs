use pyo3::prelude::*;

/// Factor types are not exposed yet, the hook keeps the registration order.
pub fn wrap_factor(_m: &Bound<'_, PyModule>) -> PyResult<()> {
    log::debug!("no factor types to register");
    Ok(())
}
