//! Loss functions rescale a residual `b` (and the Jacobians of the factor that
//! produced it) in place, so that a least squares solver can minimize the
//! plain squared norm `‖b‖²`.
//!
//! - [`GaussianLoss`], [`ScaleLoss`] and [`DiagonalLoss`] whiten the residual by
//!   a square root information matrix.
//! - [`CauchyLoss`] and [`HuberLoss`] are robust kernels: they multiply the
//!   residual by `sqrt(w(‖b‖²))`, optionally after a base loss.

use std::fmt;
use std::sync::Arc;

use crate::linalg;
use crate::LossError;

/// A dense row-major Jacobian block, one row per residual entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Jacobian {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Jacobian {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Create a Jacobian from row-major data.
    pub fn from_row_major(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self, LossError> {
        if data.len() != rows * cols {
            return Err(LossError::DimensionMismatch {
                expected: rows * cols,
                found: data.len(),
            });
        }
        Ok(Self { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [f64] {
        let start = row * self.cols;
        &mut self.data[start..start + self.cols]
    }

    fn scale(&mut self, s: f64) {
        self.data.iter_mut().for_each(|x| *x *= s);
    }
}

/// Whitening or robust reweighting of a residual.
pub trait LossFunction: fmt::Debug + fmt::Display + Send + Sync {
    /// Reweight the residual `b` in place.
    fn weight_in_place(&self, b: &mut [f64]) -> Result<(), LossError>;

    /// Reweight the residual `b` and every Jacobian of the same factor.
    ///
    /// Each Jacobian must have as many rows as `b` has entries.
    fn weight_in_place_with_jacobians(
        &self,
        b: &mut [f64],
        jacobians: &mut [Jacobian],
    ) -> Result<(), LossError>;
}

fn check_dim(expected: usize, found: usize) -> Result<(), LossError> {
    if expected != found {
        return Err(LossError::DimensionMismatch { expected, found });
    }
    Ok(())
}

fn check_jacobian_rows(b: &[f64], jacobians: &[Jacobian]) -> Result<(), LossError> {
    jacobians
        .iter()
        .try_for_each(|jacobian| check_dim(b.len(), jacobian.rows()))
}

fn check_positive(name: &'static str, value: f64) -> Result<(), LossError> {
    if value <= 0.0 || !value.is_finite() {
        return Err(LossError::NonPositiveParameter(name, value));
    }
    Ok(())
}

/// Gaussian noise model, stored as a square root information matrix `R` with
/// `RᵀR = Σ⁻¹`.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianLoss {
    dim: usize,
    sqrt_info: Vec<f64>,
}

impl GaussianLoss {
    /// Create the loss from a row-major `dim x dim` square root information matrix.
    pub fn sqrt_information(dim: usize, sqrt_info: Vec<f64>) -> Result<Self, LossError> {
        check_dim(dim * dim, sqrt_info.len())?;
        Ok(Self { dim, sqrt_info })
    }

    /// Create the loss from a row-major information matrix `Σ⁻¹`.
    ///
    /// `R` is the transposed Cholesky factor, so it is upper triangular.
    pub fn information(dim: usize, information: &[f64]) -> Result<Self, LossError> {
        check_dim(dim * dim, information.len())?;
        let l = linalg::cholesky(information, dim).ok_or(LossError::NotPositiveDefinite)?;
        Ok(Self {
            dim,
            sqrt_info: linalg::transpose(&l, dim),
        })
    }

    /// Create the loss from a row-major covariance matrix `Σ`.
    pub fn covariance(dim: usize, covariance: &[f64]) -> Result<Self, LossError> {
        check_dim(dim * dim, covariance.len())?;
        let l = linalg::cholesky(covariance, dim).ok_or(LossError::NotPositiveDefinite)?;
        // Σ = L Lᵀ, so Σ⁻¹ = L⁻ᵀ L⁻¹ and R = L⁻¹
        Ok(Self {
            dim,
            sqrt_info: linalg::lower_triangular_inverse(&l, dim),
        })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Row-major square root information matrix.
    pub fn sqrt_information_matrix(&self) -> &[f64] {
        &self.sqrt_info
    }
}

impl LossFunction for GaussianLoss {
    fn weight_in_place(&self, b: &mut [f64]) -> Result<(), LossError> {
        check_dim(self.dim, b.len())?;
        let whitened = linalg::mat_vec(&self.sqrt_info, self.dim, self.dim, b);
        b.copy_from_slice(&whitened);
        Ok(())
    }

    fn weight_in_place_with_jacobians(
        &self,
        b: &mut [f64],
        jacobians: &mut [Jacobian],
    ) -> Result<(), LossError> {
        check_jacobian_rows(b, jacobians)?;
        self.weight_in_place(b)?;
        for jacobian in jacobians.iter_mut() {
            jacobian.data = linalg::mat_mul(
                &self.sqrt_info,
                &jacobian.data,
                self.dim,
                self.dim,
                jacobian.cols,
            );
        }
        Ok(())
    }
}

impl fmt::Display for GaussianLoss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GaussianLoss(dim: {})", self.dim)
    }
}

/// Isotropic noise model: every entry is multiplied by the same `scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleLoss {
    scale: f64,
}

impl ScaleLoss {
    pub fn scale(scale: f64) -> Result<Self, LossError> {
        check_positive("scale", scale)?;
        Ok(Self { scale })
    }

    /// Standard deviation form, `scale = 1 / sigma`.
    pub fn sigma(sigma: f64) -> Result<Self, LossError> {
        check_positive("sigma", sigma)?;
        Ok(Self { scale: 1.0 / sigma })
    }

    pub fn scale_value(&self) -> f64 {
        self.scale
    }
}

impl LossFunction for ScaleLoss {
    fn weight_in_place(&self, b: &mut [f64]) -> Result<(), LossError> {
        b.iter_mut().for_each(|x| *x *= self.scale);
        Ok(())
    }

    fn weight_in_place_with_jacobians(
        &self,
        b: &mut [f64],
        jacobians: &mut [Jacobian],
    ) -> Result<(), LossError> {
        check_jacobian_rows(b, jacobians)?;
        self.weight_in_place(b)?;
        jacobians.iter_mut().for_each(|j| j.scale(self.scale));
        Ok(())
    }
}

impl fmt::Display for ScaleLoss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScaleLoss(scale: {})", self.scale)
    }
}

/// Diagonal noise model: entry `i` is multiplied by `scales[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagonalLoss {
    scales: Vec<f64>,
}

impl DiagonalLoss {
    pub fn scales(scales: Vec<f64>) -> Result<Self, LossError> {
        scales.iter().try_for_each(|&s| check_positive("scale", s))?;
        Ok(Self { scales })
    }

    pub fn sigmas(sigmas: &[f64]) -> Result<Self, LossError> {
        sigmas.iter().try_for_each(|&s| check_positive("sigma", s))?;
        Ok(Self {
            scales: sigmas.iter().map(|s| 1.0 / s).collect(),
        })
    }

    /// Diagonal of the information matrix, `scale = sqrt(precision)`.
    pub fn precisions(precisions: &[f64]) -> Result<Self, LossError> {
        precisions
            .iter()
            .try_for_each(|&p| check_positive("precision", p))?;
        Ok(Self {
            scales: precisions.iter().map(|p| p.sqrt()).collect(),
        })
    }

    pub fn dim(&self) -> usize {
        self.scales.len()
    }

    pub fn scale_values(&self) -> &[f64] {
        &self.scales
    }
}

impl LossFunction for DiagonalLoss {
    fn weight_in_place(&self, b: &mut [f64]) -> Result<(), LossError> {
        check_dim(self.scales.len(), b.len())?;
        b.iter_mut().zip(&self.scales).for_each(|(x, s)| *x *= s);
        Ok(())
    }

    fn weight_in_place_with_jacobians(
        &self,
        b: &mut [f64],
        jacobians: &mut [Jacobian],
    ) -> Result<(), LossError> {
        check_jacobian_rows(b, jacobians)?;
        self.weight_in_place(b)?;
        for jacobian in jacobians.iter_mut() {
            for (row, s) in self.scales.iter().enumerate() {
                jacobian.row_mut(row).iter_mut().for_each(|x| *x *= s);
            }
        }
        Ok(())
    }
}

impl fmt::Display for DiagonalLoss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DiagonalLoss(scales: {:?})", self.scales)
    }
}

fn robust_weight_in_place(
    base: Option<&Arc<dyn LossFunction>>,
    weight: impl Fn(f64) -> f64,
    b: &mut [f64],
    jacobians: &mut [Jacobian],
) -> Result<(), LossError> {
    check_jacobian_rows(b, jacobians)?;
    if let Some(base) = base {
        base.weight_in_place_with_jacobians(b, jacobians)?;
    }
    let squared_norm = b.iter().map(|x| x * x).sum::<f64>();
    let sqrt_weight = weight(squared_norm).sqrt();
    b.iter_mut().for_each(|x| *x *= sqrt_weight);
    jacobians.iter_mut().for_each(|j| j.scale(sqrt_weight));
    Ok(())
}

/// Cauchy robust kernel with width `k`: `w(s) = 1 / (1 + s / k²)`.
#[derive(Debug, Clone)]
pub struct CauchyLoss {
    k: f64,
    base: Option<Arc<dyn LossFunction>>,
}

impl CauchyLoss {
    pub fn new(k: f64) -> Result<Self, LossError> {
        check_positive("k", k)?;
        Ok(Self { k, base: None })
    }

    /// Apply `base` (usually a Gaussian model) before the robust kernel.
    pub fn with_base(k: f64, base: Arc<dyn LossFunction>) -> Result<Self, LossError> {
        check_positive("k", k)?;
        Ok(Self {
            k,
            base: Some(base),
        })
    }

    pub fn k(&self) -> f64 {
        self.k
    }

    /// Weight for a squared residual norm `s`.
    pub fn weight(&self, squared_norm: f64) -> f64 {
        1.0 / (1.0 + squared_norm / (self.k * self.k))
    }
}

impl LossFunction for CauchyLoss {
    fn weight_in_place(&self, b: &mut [f64]) -> Result<(), LossError> {
        self.weight_in_place_with_jacobians(b, &mut [])
    }

    fn weight_in_place_with_jacobians(
        &self,
        b: &mut [f64],
        jacobians: &mut [Jacobian],
    ) -> Result<(), LossError> {
        robust_weight_in_place(self.base.as_ref(), |s| self.weight(s), b, jacobians)
    }
}

impl fmt::Display for CauchyLoss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.base {
            Some(base) => write!(f, "CauchyLoss(k: {}, base: {})", self.k, base),
            None => write!(f, "CauchyLoss(k: {})", self.k),
        }
    }
}

/// Huber robust kernel with threshold `k`: quadratic for `‖b‖ <= k`, linear
/// beyond.
#[derive(Debug, Clone)]
pub struct HuberLoss {
    k: f64,
    base: Option<Arc<dyn LossFunction>>,
}

impl HuberLoss {
    pub fn new(k: f64) -> Result<Self, LossError> {
        check_positive("k", k)?;
        Ok(Self { k, base: None })
    }

    pub fn with_base(k: f64, base: Arc<dyn LossFunction>) -> Result<Self, LossError> {
        check_positive("k", k)?;
        Ok(Self {
            k,
            base: Some(base),
        })
    }

    pub fn k(&self) -> f64 {
        self.k
    }

    pub fn weight(&self, squared_norm: f64) -> f64 {
        let norm = squared_norm.sqrt();
        if norm <= self.k {
            1.0
        } else {
            self.k / norm
        }
    }
}

impl LossFunction for HuberLoss {
    fn weight_in_place(&self, b: &mut [f64]) -> Result<(), LossError> {
        self.weight_in_place_with_jacobians(b, &mut [])
    }

    fn weight_in_place_with_jacobians(
        &self,
        b: &mut [f64],
        jacobians: &mut [Jacobian],
    ) -> Result<(), LossError> {
        robust_weight_in_place(self.base.as_ref(), |s| self.weight(s), b, jacobians)
    }
}

impl fmt::Display for HuberLoss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.base {
            Some(base) => write!(f, "HuberLoss(k: {}, base: {})", self.k, base),
            None => write!(f, "HuberLoss(k: {})", self.k),
        }
    }
}
