use pyo3::prelude::*;

use crate::error::PyMinisamResult;

/// Start the named global timer.
#[pyfunction]
pub fn global_tic(name: &str) {
    minisam_core::global_tic(name);
}

/// Stop the named global timer and return the sample in seconds.
#[pyfunction]
pub fn global_toc(name: &str) -> PyMinisamResult<f64> {
    Ok(minisam_core::global_toc(name)?.as_secs_f64())
}

#[pyfunction]
pub fn timing_report() -> String {
    minisam_core::timing_report()
}

#[pyfunction]
pub fn reset_timers() {
    minisam_core::reset_timers();
}

pub fn wrap_utils(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(global_tic, m)?)?;
    m.add_function(wrap_pyfunction!(global_toc, m)?)?;
    m.add_function(wrap_pyfunction!(timing_report, m)?)?;
    m.add_function(wrap_pyfunction!(reset_timers, m)?)?;
    log::debug!("registered timing utilities");
    Ok(())
}
