use std::sync::Arc;

use numpy::PyReadwriteArray1;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::pyclass_init::PyClassInitializer;

use minisam_core::{
    CauchyLoss, DiagonalLoss, GaussianLoss, HuberLoss, Jacobian, LossFunction, ScaleLoss,
};

use crate::convert::{matrix_from_py, matrix_to_py, square_matrix_from_py, vector_from_py, vector_to_py};
use crate::error::PyMinisamResult;

/// Base class of every loss function exposed to Python.
#[pyclass(name = "LossFunction", module = "_minisam", subclass, frozen)]
pub struct PyLossFunction(pub Arc<dyn LossFunction>);

#[pymethods]
impl PyLossFunction {
    /// Reweight a contiguous float64 array in place.
    #[pyo3(name = "weightInPlace")]
    fn weight_in_place(&self, mut b: PyReadwriteArray1<'_, f64>) -> PyMinisamResult<()> {
        let b = b
            .as_slice_mut()
            .map_err(|_| PyValueError::new_err("residual array must be contiguous"))?;
        self.0.weight_in_place(b)?;
        Ok(())
    }

    /// Reweighted copy of a residual vector.
    fn weight<'py>(&self, py: Python<'py>, b: &Bound<'py, PyAny>) -> PyMinisamResult<Bound<'py, PyAny>> {
        let mut b = vector_from_py(b)?;
        self.0.weight_in_place(&mut b)?;
        Ok(vector_to_py(py, &b))
    }

    /// Reweighted copies of a residual and the Jacobians of its factor.
    #[pyo3(name = "weightWithJacobians")]
    fn weight_with_jacobians<'py>(
        &self,
        py: Python<'py>,
        b: &Bound<'py, PyAny>,
        jacobians: Vec<Bound<'py, PyAny>>,
    ) -> PyMinisamResult<(Bound<'py, PyAny>, Vec<Bound<'py, PyAny>>)> {
        let mut b = vector_from_py(b)?;
        let mut jacobians = jacobians
            .iter()
            .map(|j| {
                let (rows, cols, data) = matrix_from_py(j)?;
                Ok(Jacobian::from_row_major(rows, cols, data)?)
            })
            .collect::<PyMinisamResult<Vec<_>>>()?;

        self.0.weight_in_place_with_jacobians(&mut b, &mut jacobians)?;

        let jacobians = jacobians
            .iter()
            .map(|j| matrix_to_py(py, j.rows(), j.cols(), j.as_slice().to_vec()))
            .collect::<PyResult<Vec<_>>>()?;
        Ok((vector_to_py(py, &b), jacobians))
    }

    fn __repr__(&self) -> String {
        self.0.to_string()
    }
}

fn base(loss: impl LossFunction + 'static) -> PyClassInitializer<PyLossFunction> {
    PyClassInitializer::from(PyLossFunction(Arc::new(loss)))
}

fn base_loss(base: Option<&Bound<'_, PyLossFunction>>) -> Option<Arc<dyn LossFunction>> {
    base.map(|b| b.get().0.clone())
}

#[pyclass(name = "ScaleLoss", module = "_minisam", extends = PyLossFunction, frozen)]
pub struct PyScaleLoss;

#[pymethods]
impl PyScaleLoss {
    #[staticmethod]
    #[pyo3(name = "Scale")]
    fn scale(py: Python<'_>, scale: f64) -> PyMinisamResult<Py<Self>> {
        let loss = ScaleLoss::scale(scale)?;
        Ok(Py::new(py, base(loss).add_subclass(Self))?)
    }

    #[staticmethod]
    #[pyo3(name = "Sigma")]
    fn sigma(py: Python<'_>, sigma: f64) -> PyMinisamResult<Py<Self>> {
        let loss = ScaleLoss::sigma(sigma)?;
        Ok(Py::new(py, base(loss).add_subclass(Self))?)
    }
}

#[pyclass(name = "GaussianLoss", module = "_minisam", extends = PyLossFunction, frozen)]
pub struct PyGaussianLoss;

#[pymethods]
impl PyGaussianLoss {
    #[staticmethod]
    #[pyo3(name = "SqrtInformation")]
    fn sqrt_information(py: Python<'_>, r: &Bound<'_, PyAny>) -> PyMinisamResult<Py<Self>> {
        let (dim, data) = square_matrix_from_py(r)?;
        let loss = GaussianLoss::sqrt_information(dim, data)?;
        Ok(Py::new(py, base(loss).add_subclass(Self))?)
    }

    #[staticmethod]
    #[pyo3(name = "Information")]
    fn information(py: Python<'_>, information: &Bound<'_, PyAny>) -> PyMinisamResult<Py<Self>> {
        let (dim, data) = square_matrix_from_py(information)?;
        let loss = GaussianLoss::information(dim, &data)?;
        Ok(Py::new(py, base(loss).add_subclass(Self))?)
    }

    #[staticmethod]
    #[pyo3(name = "Covariance")]
    fn covariance(py: Python<'_>, covariance: &Bound<'_, PyAny>) -> PyMinisamResult<Py<Self>> {
        let (dim, data) = square_matrix_from_py(covariance)?;
        let loss = GaussianLoss::covariance(dim, &data)?;
        Ok(Py::new(py, base(loss).add_subclass(Self))?)
    }
}

#[pyclass(name = "DiagonalLoss", module = "_minisam", extends = PyLossFunction, frozen)]
pub struct PyDiagonalLoss;

#[pymethods]
impl PyDiagonalLoss {
    #[staticmethod]
    #[pyo3(name = "Scales")]
    fn scales(py: Python<'_>, scales: &Bound<'_, PyAny>) -> PyMinisamResult<Py<Self>> {
        let loss = DiagonalLoss::scales(vector_from_py(scales)?)?;
        Ok(Py::new(py, base(loss).add_subclass(Self))?)
    }

    #[staticmethod]
    #[pyo3(name = "Sigmas")]
    fn sigmas(py: Python<'_>, sigmas: &Bound<'_, PyAny>) -> PyMinisamResult<Py<Self>> {
        let loss = DiagonalLoss::sigmas(&vector_from_py(sigmas)?)?;
        Ok(Py::new(py, base(loss).add_subclass(Self))?)
    }

    #[staticmethod]
    #[pyo3(name = "Precisions")]
    fn precisions(py: Python<'_>, precisions: &Bound<'_, PyAny>) -> PyMinisamResult<Py<Self>> {
        let loss = DiagonalLoss::precisions(&vector_from_py(precisions)?)?;
        Ok(Py::new(py, base(loss).add_subclass(Self))?)
    }
}

#[pyclass(name = "CauchyLoss", module = "_minisam", extends = PyLossFunction, frozen)]
pub struct PyCauchyLoss;

#[pymethods]
impl PyCauchyLoss {
    /// `CauchyLoss.Cauchy(k, base=None)`, `base` is applied first.
    #[staticmethod]
    #[pyo3(name = "Cauchy", signature = (k, base=None))]
    fn cauchy(
        py: Python<'_>,
        k: f64,
        base: Option<&Bound<'_, PyLossFunction>>,
    ) -> PyMinisamResult<Py<Self>> {
        let loss = match base_loss(base) {
            Some(b) => CauchyLoss::with_base(k, b)?,
            None => CauchyLoss::new(k)?,
        };
        Ok(Py::new(py, self::base(loss).add_subclass(Self))?)
    }
}

#[pyclass(name = "HuberLoss", module = "_minisam", extends = PyLossFunction, frozen)]
pub struct PyHuberLoss;

#[pymethods]
impl PyHuberLoss {
    #[staticmethod]
    #[pyo3(name = "Huber", signature = (k, base=None))]
    fn huber(
        py: Python<'_>,
        k: f64,
        base: Option<&Bound<'_, PyLossFunction>>,
    ) -> PyMinisamResult<Py<Self>> {
        let loss = match base_loss(base) {
            Some(b) => HuberLoss::with_base(k, b)?,
            None => HuberLoss::new(k)?,
        };
        Ok(Py::new(py, self::base(loss).add_subclass(Self))?)
    }
}

pub fn wrap_loss_function(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyLossFunction>()?;
    m.add_class::<PyScaleLoss>()?;
    m.add_class::<PyGaussianLoss>()?;
    m.add_class::<PyDiagonalLoss>()?;
    m.add_class::<PyCauchyLoss>()?;
    m.add_class::<PyHuberLoss>()?;
    log::debug!("registered loss functions");
    Ok(())
}
