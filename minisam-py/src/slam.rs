use pyo3::prelude::*;

use minisam_core::key_string;
use minisam_slam::{load_g2o, G2oEdge};

use crate::convert::matrix_to_py;
use crate::error::PyMinisamResult;
use crate::variables::{variable_to_py, PyVariables};

/// A relative pose measurement read from a g2o file.
#[pyclass(name = "G2oEdge", module = "_minisam", frozen)]
pub struct PyG2oEdge(pub G2oEdge);

#[pymethods]
impl PyG2oEdge {
    #[getter]
    fn key1(&self) -> u64 {
        self.0.key1
    }

    #[getter]
    fn key2(&self) -> u64 {
        self.0.key2
    }

    #[getter]
    fn measurement<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
        variable_to_py(py, &self.0.measurement)
    }

    #[getter]
    fn information<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
        let dim = self.0.dim();
        matrix_to_py(py, dim, dim, self.0.information.clone())
    }

    fn __repr__(&self) -> String {
        format!(
            "G2oEdge({} -> {}: {})",
            key_string(self.0.key1),
            key_string(self.0.key2),
            self.0.measurement
        )
    }
}

/// Read a g2o pose graph, returning `(is_3d, variables, edges)`.
#[pyfunction]
#[pyo3(name = "loadG2O")]
pub fn load_g2o_file(path: &str) -> PyMinisamResult<(bool, PyVariables, Vec<PyG2oEdge>)> {
    let graph = load_g2o(path)?;
    let edges = graph.edges.into_iter().map(PyG2oEdge).collect();
    Ok((graph.is_3d, PyVariables(graph.variables), edges))
}

pub fn wrap_slam(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyG2oEdge>()?;
    m.add_function(wrap_pyfunction!(load_g2o_file, m)?)?;
    log::debug!("registered slam utilities");
    Ok(())
}
