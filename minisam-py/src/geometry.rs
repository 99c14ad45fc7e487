use glam::{DMat3, DVec2, DVec3};
use pyo3::prelude::*;

use minisam_geometry::{CalibBundler, CalibK, Calibration, PinholeCamera};

use crate::convert::{FromPyValue, IntoPyValue};
use crate::error::PyMinisamResult;
use crate::lie::PySE3;

#[pyclass(name = "CalibK", module = "_minisam")]
#[derive(Clone, Copy)]
pub struct PyCalibK(pub CalibK);

#[pymethods]
impl PyCalibK {
    #[new]
    fn new(fx: f64, fy: f64, cx: f64, cy: f64) -> PyMinisamResult<Self> {
        Ok(Self(CalibK::new(fx, fy, cx, cy)?))
    }

    /// Create the calibration from a 3x3 intrinsics matrix.
    #[staticmethod]
    #[pyo3(name = "fromMatrix")]
    fn from_matrix(k: &Bound<'_, PyAny>) -> PyMinisamResult<Self> {
        Ok(Self(CalibK::from_matrix(&DMat3::from_py_value(k)?)?))
    }

    #[getter]
    fn fx(&self) -> f64 {
        self.0.fx
    }

    #[getter]
    fn fy(&self) -> f64 {
        self.0.fy
    }

    #[getter]
    fn cx(&self) -> f64 {
        self.0.cx
    }

    #[getter]
    fn cy(&self) -> f64 {
        self.0.cy
    }

    fn project<'py>(&self, py: Python<'py>, p: &Bound<'py, PyAny>) -> PyResult<Bound<'py, PyAny>> {
        self.0.project(DVec2::from_py_value(p)?).into_py_value(py)
    }

    fn unproject<'py>(&self, py: Python<'py>, pixel: &Bound<'py, PyAny>) -> PyMinisamResult<Bound<'py, PyAny>> {
        let p = self.0.unproject(DVec2::from_py_value(pixel)?)?;
        Ok(p.into_py_value(py)?)
    }

    fn matrix<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
        self.0.matrix().into_py_value(py)
    }

    #[pyo3(name = "inverseMatrix")]
    fn inverse_matrix<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
        self.0.inverse_matrix().into_py_value(py)
    }

    fn __repr__(&self) -> String {
        self.0.to_string()
    }
}

#[pyclass(name = "CalibBundler", module = "_minisam")]
#[derive(Clone, Copy)]
pub struct PyCalibBundler(pub CalibBundler);

#[pymethods]
impl PyCalibBundler {
    #[new]
    #[pyo3(signature = (f, k1=0.0, k2=0.0))]
    fn new(f: f64, k1: f64, k2: f64) -> PyMinisamResult<Self> {
        Ok(Self(CalibBundler::new(f, k1, k2)?))
    }

    #[getter]
    fn f(&self) -> f64 {
        self.0.f
    }

    #[getter]
    fn k1(&self) -> f64 {
        self.0.k1
    }

    #[getter]
    fn k2(&self) -> f64 {
        self.0.k2
    }

    fn project<'py>(&self, py: Python<'py>, p: &Bound<'py, PyAny>) -> PyResult<Bound<'py, PyAny>> {
        self.0.project(DVec2::from_py_value(p)?).into_py_value(py)
    }

    fn unproject<'py>(&self, py: Python<'py>, pixel: &Bound<'py, PyAny>) -> PyMinisamResult<Bound<'py, PyAny>> {
        let p = self.0.unproject(DVec2::from_py_value(pixel)?)?;
        Ok(p.into_py_value(py)?)
    }

    fn __repr__(&self) -> String {
        self.0.to_string()
    }
}

/// One camera class per calibration type.
macro_rules! wrap_pinhole_camera {
    ($py_ty:ident, $name:literal, $py_calib:ident, $calib:ty) => {
        #[pyclass(name = $name, module = "_minisam")]
        #[derive(Clone, Copy)]
        pub struct $py_ty(pub PinholeCamera<$calib>);

        #[pymethods]
        impl $py_ty {
            #[new]
            fn new(pose: PySE3, calibration: $py_calib) -> Self {
                Self(PinholeCamera::new(pose.0, calibration.0))
            }

            fn pose(&self) -> PySE3 {
                PySE3(self.0.pose())
            }

            fn calibration(&self) -> $py_calib {
                $py_calib(*self.0.calibration())
            }

            /// Pixel coordinates of a world point in front of the camera.
            fn project<'py>(
                &self,
                py: Python<'py>,
                point: &Bound<'py, PyAny>,
            ) -> PyMinisamResult<Bound<'py, PyAny>> {
                let pixel = self.0.project(DVec3::from_py_value(point)?)?;
                Ok(pixel.into_py_value(py)?)
            }

            fn backproject<'py>(
                &self,
                py: Python<'py>,
                pixel: &Bound<'py, PyAny>,
                depth: f64,
            ) -> PyMinisamResult<Bound<'py, PyAny>> {
                let point = self.0.backproject(DVec2::from_py_value(pixel)?, depth)?;
                Ok(point.into_py_value(py)?)
            }

            fn __repr__(&self) -> String {
                self.0.to_string()
            }
        }
    };
}

wrap_pinhole_camera!(PyPinholeCameraK, "PinholeCameraCalibK", PyCalibK, CalibK);
wrap_pinhole_camera!(PyPinholeCameraBundler, "PinholeCameraCalibBundler", PyCalibBundler, CalibBundler);

pub fn wrap_geometry(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyCalibK>()?;
    m.add_class::<PyCalibBundler>()?;
    m.add_class::<PyPinholeCameraK>()?;
    m.add_class::<PyPinholeCameraBundler>()?;
    log::debug!("registered geometry classes");
    Ok(())
}
