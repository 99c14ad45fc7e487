use glam::{DMat2, DMat3, DMat4, DVec2, DVec3};
use pyo3::exceptions::PyTypeError;
use pyo3::prelude::*;
use pyo3::types::PyComplex;

use minisam_lie::{LieGroup, SE2, SE3, SO2, SO3};

use crate::convert::{FromPyValue, IntoPyValue};
use crate::error::PyMinisamResult;

/// Declares a Python class for a Lie group together with the methods shared by
/// every group. Constructors and accessors specific to one group are passed in
/// the braces and land in the same `#[pymethods]` block.
macro_rules! wrap_lie_group {
    ($py_ty:ident, $ty:ty, $name:literal, { $($extra:tt)* }) => {
        #[pyclass(name = $name, module = "_minisam")]
        #[derive(Clone, Copy)]
        pub struct $py_ty(pub $ty);

        #[pymethods]
        impl $py_ty {
            $($extra)*

            #[staticmethod]
            fn exp(tangent: &Bound<'_, PyAny>) -> PyResult<Self> {
                let tangent = FromPyValue::from_py_value(tangent)?;
                Ok(Self(<$ty as LieGroup>::exp(tangent)))
            }

            fn log<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
                LieGroup::log(&self.0).into_py_value(py)
            }

            #[staticmethod]
            fn hat<'py>(py: Python<'py>, tangent: &Bound<'py, PyAny>) -> PyResult<Bound<'py, PyAny>> {
                let tangent = FromPyValue::from_py_value(tangent)?;
                <$ty as LieGroup>::hat(tangent).into_py_value(py)
            }

            #[staticmethod]
            fn vee<'py>(py: Python<'py>, omega: &Bound<'py, PyAny>) -> PyResult<Bound<'py, PyAny>> {
                let omega = FromPyValue::from_py_value(omega)?;
                <$ty as LieGroup>::vee(&omega).into_py_value(py)
            }

            fn inverse(&self) -> Self {
                Self(LieGroup::inverse(&self.0))
            }

            fn params<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
                LieGroup::params(&self.0).into_py_value(py)
            }

            fn matrix<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
                LieGroup::matrix(&self.0).into_py_value(py)
            }

            #[pyo3(name = "Adj")]
            fn adj<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
                LieGroup::adj(&self.0).into_py_value(py)
            }

            /// Group product with another element, or action on a point.
            fn __mul__<'py>(&self, py: Python<'py>, other: &Bound<'py, PyAny>) -> PyResult<PyObject> {
                if let Ok(other) = other.downcast::<Self>() {
                    let product = Self(self.0 * other.borrow().0);
                    return Ok(product.into_pyobject(py)?.into_any().unbind());
                }
                match <<$ty as LieGroup>::Point as FromPyValue>::from_py_value(other) {
                    Ok(point) => Ok(self.0.transform(point).into_py_value(py)?.unbind()),
                    Err(_) => Ok(py.NotImplemented()),
                }
            }

            /// In-place product; `a *= a` squares `a` and keeps its identity.
            fn __imul__<'py>(
                slf: &Bound<'py, Self>,
                other: &Bound<'py, PyAny>,
            ) -> PyResult<Bound<'py, PyAny>> {
                let py = slf.py();
                let Ok(other) = other.downcast::<Self>() else {
                    return Ok(py.NotImplemented().into_bound(py));
                };
                // read before borrowing mutably, `other` may be `slf`
                let rhs = other.borrow().0;
                slf.borrow_mut().0 *= rhs;
                Ok(slf.clone().into_any())
            }

            fn __repr__(&self) -> String {
                self.0.to_string()
            }

            fn __str__(&self) -> String {
                self.0.to_string()
            }
        }
    };
}

wrap_lie_group!(PySO2, SO2, "SO2", {
    /// `SO2()`, `SO2(theta)`, `SO2(complex)`, `SO2([re, im])` or `SO2(matrix2x2)`.
    #[new]
    #[pyo3(signature = (value=None))]
    fn new(value: Option<&Bound<'_, PyAny>>) -> PyMinisamResult<Self> {
        let Some(value) = value else {
            return Ok(Self(SO2::IDENTITY));
        };
        if let Ok(c) = value.downcast::<PyComplex>() {
            return Ok(Self(SO2::from_complex(c.real(), c.imag())?));
        }
        if let Ok(theta) = value.extract::<f64>() {
            return Ok(Self(SO2::from_angle(theta)));
        }
        if let Ok(z) = DVec2::from_py_value(value) {
            return Ok(Self(SO2::from_complex(z.x, z.y)?));
        }
        Ok(Self(SO2::from_matrix(&DMat2::from_py_value(value)?)?))
    }

    fn theta(&self) -> f64 {
        self.0.theta()
    }

    fn unit_complex<'py>(&self, py: Python<'py>) -> Bound<'py, PyComplex> {
        let z = self.0.unit_complex();
        PyComplex::from_doubles(py, z.x, z.y)
    }
});

wrap_lie_group!(PySE2, SE2, "SE2", {
    /// `SE2()`, `SE2(so2, translation)` or `SE2(matrix3x3)`.
    #[new]
    #[pyo3(signature = (rotation=None, translation=None))]
    fn new(
        rotation: Option<&Bound<'_, PyAny>>,
        translation: Option<&Bound<'_, PyAny>>,
    ) -> PyMinisamResult<Self> {
        match (rotation, translation) {
            (None, None) => Ok(Self(SE2::IDENTITY)),
            (Some(r), Some(t)) => {
                let r = r.extract::<PySO2>()?.0;
                Ok(Self(SE2::new(r, DVec2::from_py_value(t)?)))
            }
            (Some(m), None) => Ok(Self(SE2::from_matrix(&DMat3::from_py_value(m)?)?)),
            (None, Some(_)) => Err(PyTypeError::new_err("SE2 translation given without rotation").into()),
        }
    }

    /// `trans(x, y)` or `trans([x, y])`.
    #[staticmethod]
    #[pyo3(signature = (x, y=None))]
    fn trans(x: &Bound<'_, PyAny>, y: Option<f64>) -> PyResult<Self> {
        let t = match y {
            Some(y) => DVec2::new(x.extract()?, y),
            None => DVec2::from_py_value(x)?,
        };
        Ok(Self(SE2::trans(t)))
    }

    #[staticmethod]
    #[pyo3(name = "transX")]
    fn trans_x(x: f64) -> Self {
        Self(SE2::trans_x(x))
    }

    #[staticmethod]
    #[pyo3(name = "transY")]
    fn trans_y(y: f64) -> Self {
        Self(SE2::trans_y(y))
    }

    #[staticmethod]
    fn rot(theta: f64) -> Self {
        Self(SE2::rot(theta))
    }

    fn so2(&self) -> PySO2 {
        PySO2(self.0.so2())
    }

    fn translation<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
        self.0.translation().into_py_value(py)
    }
});

wrap_lie_group!(PySO3, SO3, "SO3", {
    /// `SO3()`, `SO3(x, y, z, w)` or `SO3(matrix3x3)`.
    ///
    /// The four scalars are quaternion coefficients with the scalar part last.
    #[new]
    #[pyo3(signature = (x=None, y=None, z=None, w=None))]
    fn new(
        x: Option<&Bound<'_, PyAny>>,
        y: Option<f64>,
        z: Option<f64>,
        w: Option<f64>,
    ) -> PyMinisamResult<Self> {
        match (x, y, z, w) {
            (None, None, None, None) => Ok(Self(SO3::IDENTITY)),
            (Some(m), None, None, None) => Ok(Self(SO3::from_matrix(&DMat3::from_py_value(m)?)?)),
            (Some(x), Some(y), Some(z), Some(w)) => Ok(Self(SO3::from_xyzw(x.extract()?, y, z, w)?)),
            _ => Err(PyTypeError::new_err(
                "SO3() takes no arguments, a 3x3 matrix or four quaternion coefficients x, y, z, w",
            )
            .into()),
        }
    }

    #[staticmethod]
    #[pyo3(name = "rotX")]
    fn rot_x(theta: f64) -> Self {
        Self(SO3::rot_x(theta))
    }

    #[staticmethod]
    #[pyo3(name = "rotY")]
    fn rot_y(theta: f64) -> Self {
        Self(SO3::rot_y(theta))
    }

    #[staticmethod]
    #[pyo3(name = "rotZ")]
    fn rot_z(theta: f64) -> Self {
        Self(SO3::rot_z(theta))
    }

    /// Coefficients `[x, y, z, w]`.
    fn unit_quaternion<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
        self.0.params().into_py_value(py)
    }
});

wrap_lie_group!(PySE3, SE3, "SE3", {
    /// `SE3()`, `SE3(so3, translation)` or `SE3(matrix4x4)`.
    #[new]
    #[pyo3(signature = (rotation=None, translation=None))]
    fn new(
        rotation: Option<&Bound<'_, PyAny>>,
        translation: Option<&Bound<'_, PyAny>>,
    ) -> PyMinisamResult<Self> {
        match (rotation, translation) {
            (None, None) => Ok(Self(SE3::IDENTITY)),
            (Some(r), Some(t)) => {
                let r = r.extract::<PySO3>()?.0;
                Ok(Self(SE3::new(r, DVec3::from_py_value(t)?)))
            }
            (Some(m), None) => Ok(Self(SE3::from_matrix(&DMat4::from_py_value(m)?)?)),
            (None, Some(_)) => Err(PyTypeError::new_err("SE3 translation given without rotation").into()),
        }
    }

    /// `trans(x, y, z)` or `trans([x, y, z])`.
    #[staticmethod]
    #[pyo3(signature = (x, y=None, z=None))]
    fn trans(x: &Bound<'_, PyAny>, y: Option<f64>, z: Option<f64>) -> PyResult<Self> {
        let t = match (y, z) {
            (Some(y), Some(z)) => DVec3::new(x.extract()?, y, z),
            (None, None) => DVec3::from_py_value(x)?,
            _ => return Err(PyTypeError::new_err("trans takes a vector or three scalars")),
        };
        Ok(Self(SE3::trans(t)))
    }

    #[staticmethod]
    #[pyo3(name = "transX")]
    fn trans_x(x: f64) -> Self {
        Self(SE3::trans_x(x))
    }

    #[staticmethod]
    #[pyo3(name = "transY")]
    fn trans_y(y: f64) -> Self {
        Self(SE3::trans_y(y))
    }

    #[staticmethod]
    #[pyo3(name = "transZ")]
    fn trans_z(z: f64) -> Self {
        Self(SE3::trans_z(z))
    }

    #[staticmethod]
    #[pyo3(name = "rotX")]
    fn rot_x(theta: f64) -> Self {
        Self(SE3::rot_x(theta))
    }

    #[staticmethod]
    #[pyo3(name = "rotY")]
    fn rot_y(theta: f64) -> Self {
        Self(SE3::rot_y(theta))
    }

    #[staticmethod]
    #[pyo3(name = "rotZ")]
    fn rot_z(theta: f64) -> Self {
        Self(SE3::rot_z(theta))
    }

    fn so3(&self) -> PySO3 {
        PySO3(self.0.so3())
    }

    fn translation<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
        self.0.translation().into_py_value(py)
    }
});

pub fn wrap_lie_groups(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PySO2>()?;
    m.add_class::<PySE2>()?;
    m.add_class::<PySO3>()?;
    m.add_class::<PySE3>()?;
    Ok(())
}
