use pyo3::exceptions::PyTypeError;
use pyo3::prelude::*;

use minisam_core::{key_string, Variable, Variables};

use crate::convert::{vector_from_py, vector_to_py};
use crate::error::PyMinisamResult;
use crate::lie::{PySE2, PySE3, PySO2, PySO3};

/// Convert a Python group object or float sequence to a [`Variable`].
pub(crate) fn variable_from_py(obj: &Bound<'_, PyAny>) -> PyResult<Variable> {
    if let Ok(v) = obj.extract::<PySO2>() {
        return Ok(Variable::SO2(v.0));
    }
    if let Ok(v) = obj.extract::<PySE2>() {
        return Ok(Variable::SE2(v.0));
    }
    if let Ok(v) = obj.extract::<PySO3>() {
        return Ok(Variable::SO3(v.0));
    }
    if let Ok(v) = obj.extract::<PySE3>() {
        return Ok(Variable::SE3(v.0));
    }
    vector_from_py(obj).map(Variable::Vector).map_err(|_| {
        PyTypeError::new_err("expected SO2, SE2, SO3, SE3 or a float vector")
    })
}

pub(crate) fn variable_to_py<'py>(py: Python<'py>, variable: &Variable) -> PyResult<Bound<'py, PyAny>> {
    let obj = match variable {
        Variable::SO2(v) => PySO2(*v).into_pyobject(py)?.into_any(),
        Variable::SE2(v) => PySE2(*v).into_pyobject(py)?.into_any(),
        Variable::SO3(v) => PySO3(*v).into_pyobject(py)?.into_any(),
        Variable::SE3(v) => PySE3(*v).into_pyobject(py)?.into_any(),
        Variable::Vector(v) => vector_to_py(py, v),
    };
    Ok(obj)
}

#[pyclass(name = "Variables", module = "_minisam")]
#[derive(Clone, Default)]
pub struct PyVariables(pub Variables);

#[pymethods]
impl PyVariables {
    #[new]
    fn new() -> Self {
        Self::default()
    }

    fn add(&mut self, key: u64, value: &Bound<'_, PyAny>) -> PyMinisamResult<()> {
        self.0.add(key, variable_from_py(value)?)?;
        Ok(())
    }

    fn update(&mut self, key: u64, value: &Bound<'_, PyAny>) -> PyMinisamResult<()> {
        self.0.update(key, variable_from_py(value)?)?;
        Ok(())
    }

    fn at<'py>(&self, py: Python<'py>, key: u64) -> PyMinisamResult<Bound<'py, PyAny>> {
        Ok(variable_to_py(py, self.0.at(key)?)?)
    }

    fn exists(&self, key: u64) -> bool {
        self.0.exists(key)
    }

    fn erase(&mut self, key: u64) -> PyMinisamResult<()> {
        self.0.erase(key)?;
        Ok(())
    }

    fn size(&self) -> usize {
        self.0.len()
    }

    fn dim(&self) -> usize {
        self.0.dim()
    }

    fn keys(&self) -> Vec<u64> {
        self.0.keys().collect()
    }

    fn __len__(&self) -> usize {
        self.0.len()
    }

    fn __contains__(&self, key: u64) -> bool {
        self.0.exists(key)
    }

    fn __repr__(&self) -> String {
        let keys = self.0.keys().map(key_string).collect::<Vec<_>>();
        format!("Variables(size: {}, keys: [{}])", self.0.len(), keys.join(", "))
    }

    fn __str__(&self) -> String {
        self.0.to_string()
    }
}

pub fn wrap_variables(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyVariables>()?;
    log::debug!("registered Variables");
    Ok(())
}
