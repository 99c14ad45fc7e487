//! Conversions between Python values and the fixed-size types of the groups.
//!
//! Vectors and matrices go out as NumPy `float64` arrays. On the way in, any
//! NumPy array or nested Python sequence of the right shape is accepted.
//! Matrices are row-major on the Python side and column-major in `glam`.

use glam::{DMat2, DMat3, DMat4, DVec2, DVec3, DVec4};
use numpy::{PyArray1, PyArrayMethods, PyReadonlyArray1, PyReadonlyArray2, PyUntypedArrayMethods};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyFloat;

use minisam_lie::{Matrix6, Vector6};

pub(crate) trait FromPyValue: Sized {
    fn from_py_value(obj: &Bound<'_, PyAny>) -> PyResult<Self>;
}

pub(crate) trait IntoPyValue {
    fn into_py_value<'py>(self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>>;
}

/// Read a 1D float vector of any length.
pub(crate) fn vector_from_py(obj: &Bound<'_, PyAny>) -> PyResult<Vec<f64>> {
    if let Ok(array) = obj.extract::<PyReadonlyArray1<f64>>() {
        return Ok(array.as_array().to_vec());
    }
    obj.extract::<Vec<f64>>()
}

/// Read a 2D float matrix as `(rows, cols, row-major data)`.
pub(crate) fn matrix_from_py(obj: &Bound<'_, PyAny>) -> PyResult<(usize, usize, Vec<f64>)> {
    if let Ok(array) = obj.extract::<PyReadonlyArray2<f64>>() {
        let shape = array.shape();
        let (rows, cols) = (shape[0], shape[1]);
        // `iter` walks in logical (row-major) order whatever the memory layout
        let data = array.as_array().iter().copied().collect();
        return Ok((rows, cols, data));
    }

    let nested = obj.extract::<Vec<Vec<f64>>>()?;
    let rows = nested.len();
    let cols = nested.first().map_or(0, Vec::len);
    if nested.iter().any(|row| row.len() != cols) {
        return Err(PyValueError::new_err("matrix rows have different lengths"));
    }
    Ok((rows, cols, nested.into_iter().flatten().collect()))
}

/// Read an `n x n` matrix as row-major data.
pub(crate) fn square_matrix_from_py(obj: &Bound<'_, PyAny>) -> PyResult<(usize, Vec<f64>)> {
    let (rows, cols, data) = matrix_from_py(obj)?;
    if rows != cols {
        return Err(PyValueError::new_err(format!(
            "expected a square matrix, got {rows}x{cols}"
        )));
    }
    Ok((rows, data))
}

fn fixed_vector<const N: usize>(obj: &Bound<'_, PyAny>) -> PyResult<[f64; N]> {
    let data = vector_from_py(obj)?;
    <[f64; N]>::try_from(data.as_slice()).map_err(|_| {
        PyValueError::new_err(format!("expected a vector of size {N}, got size {}", data.len()))
    })
}

fn fixed_matrix<const N: usize>(obj: &Bound<'_, PyAny>) -> PyResult<Vec<f64>> {
    let (rows, cols, data) = matrix_from_py(obj)?;
    if rows != N || cols != N {
        return Err(PyValueError::new_err(format!(
            "expected a {N}x{N} matrix, got {rows}x{cols}"
        )));
    }
    Ok(data)
}

pub(crate) fn vector_to_py<'py>(py: Python<'py>, data: &[f64]) -> Bound<'py, PyAny> {
    PyArray1::from_slice(py, data).into_any()
}

pub(crate) fn matrix_to_py<'py>(
    py: Python<'py>,
    rows: usize,
    cols: usize,
    row_major: Vec<f64>,
) -> PyResult<Bound<'py, PyAny>> {
    Ok(PyArray1::from_vec(py, row_major)
        .reshape([rows, cols])?
        .into_any())
}

/// Row-major data of a column-major `glam` matrix.
pub(crate) fn row_major<const N: usize>(cols: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; N * N];
    for col in 0..N {
        for row in 0..N {
            out[row * N + col] = cols[col * N + row];
        }
    }
    out
}

impl FromPyValue for f64 {
    fn from_py_value(obj: &Bound<'_, PyAny>) -> PyResult<Self> {
        obj.extract()
    }
}

impl IntoPyValue for f64 {
    fn into_py_value<'py>(self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
        Ok(PyFloat::new(py, self).into_any())
    }
}

macro_rules! impl_vector_into_py {
    ($ty:ty, $n:literal, $to:expr) => {
        impl IntoPyValue for $ty {
            fn into_py_value<'py>(self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
                let data: [f64; $n] = ($to)(self);
                Ok(vector_to_py(py, &data))
            }
        }
    };
}

macro_rules! impl_vector_from_py {
    ($ty:ty, $n:literal, $from:expr) => {
        impl FromPyValue for $ty {
            fn from_py_value(obj: &Bound<'_, PyAny>) -> PyResult<Self> {
                fixed_vector::<$n>(obj).map($from)
            }
        }
    };
}

// tangents and points are read and written
impl_vector_from_py!(DVec2, 2, DVec2::from_array);
impl_vector_from_py!(DVec3, 3, DVec3::from_array);
impl_vector_from_py!(Vector6, 6, std::convert::identity);

impl_vector_into_py!(DVec2, 2, |v: DVec2| v.to_array());
impl_vector_into_py!(DVec3, 3, |v: DVec3| v.to_array());
impl_vector_into_py!(Vector6, 6, std::convert::identity);

// parameter vectors are output only
impl_vector_into_py!(DVec4, 4, |v: DVec4| v.to_array());
impl_vector_into_py!([f64; 7], 7, std::convert::identity);

macro_rules! impl_matrix_conversion {
    ($ty:ty, $n:literal) => {
        impl FromPyValue for $ty {
            fn from_py_value(obj: &Bound<'_, PyAny>) -> PyResult<Self> {
                // row-major data read as columns gives the transpose
                let data = fixed_matrix::<$n>(obj)?;
                Ok(<$ty>::from_cols_slice(&data).transpose())
            }
        }

        impl IntoPyValue for $ty {
            fn into_py_value<'py>(self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
                matrix_to_py(py, $n, $n, row_major::<$n>(&self.to_cols_array()))
            }
        }
    };
}

impl_matrix_conversion!(DMat2, 2);
impl_matrix_conversion!(DMat3, 3);
impl_matrix_conversion!(DMat4, 4);

impl IntoPyValue for Matrix6 {
    fn into_py_value<'py>(self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
        matrix_to_py(py, 6, 6, self.concat())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major() {
        let m = DMat3::from_cols_array(&[1.0, 4.0, 7.0, 2.0, 5.0, 8.0, 3.0, 6.0, 9.0]);
        assert_eq!(m.row(0), DVec3::new(1.0, 2.0, 3.0));
        assert_eq!(
            row_major::<3>(&m.to_cols_array()),
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]
        );
    }

    #[test]
    fn test_row_major_roundtrip() {
        let m = DMat4::from_cols_array(&std::array::from_fn(|i| i as f64));
        let data = row_major::<4>(&m.to_cols_array());
        assert_eq!(DMat4::from_cols_slice(&data).transpose(), m);
    }
}
