//! Dense square matrices are passed as row-major `&[f64]` slices together with
//! their dimension `n`, so `a[i * n + j]` is row `i`, column `j`.

/// Cholesky decomposition of a symmetric positive definite matrix.
///
/// Returns the lower triangular `L` with `A = L * L^T`, or `None` when `A` is
/// not positive definite.
pub fn cholesky(a: &[f64], n: usize) -> Option<Vec<f64>> {
    if a.len() != n * n {
        return None;
    }
    let mut l = vec![0.0; n * n];

    for j in 0..n {
        let diag = a[j * n + j] - (0..j).map(|k| l[j * n + k] * l[j * n + k]).sum::<f64>();
        if diag <= 0.0 || !diag.is_finite() {
            return None;
        }
        let l_jj = diag.sqrt();
        l[j * n + j] = l_jj;

        for i in (j + 1)..n {
            let dot = (0..j).map(|k| l[i * n + k] * l[j * n + k]).sum::<f64>();
            l[i * n + j] = (a[i * n + j] - dot) / l_jj;
        }
    }

    Some(l)
}

/// Inverse of a lower triangular matrix with non-zero diagonal, by forward
/// substitution on the identity columns.
pub fn lower_triangular_inverse(l: &[f64], n: usize) -> Vec<f64> {
    let mut inv = vec![0.0; n * n];
    for col in 0..n {
        for i in col..n {
            let rhs = if i == col { 1.0 } else { 0.0 };
            let dot = (col..i).map(|k| l[i * n + k] * inv[k * n + col]).sum::<f64>();
            inv[i * n + col] = (rhs - dot) / l[i * n + i];
        }
    }
    inv
}

pub fn transpose(a: &[f64], n: usize) -> Vec<f64> {
    let mut t = vec![0.0; n * n];
    for i in 0..n {
        for j in 0..n {
            t[j * n + i] = a[i * n + j];
        }
    }
    t
}

/// `y = A x` for a row-major `rows x cols` matrix.
pub fn mat_vec(a: &[f64], rows: usize, cols: usize, x: &[f64]) -> Vec<f64> {
    (0..rows)
        .map(|i| (0..cols).map(|j| a[i * cols + j] * x[j]).sum::<f64>())
        .collect()
}

/// `C = A B` for row-major `A: m x k` and `B: k x n`.
pub fn mat_mul(a: &[f64], b: &[f64], m: usize, k: usize, n: usize) -> Vec<f64> {
    let mut c = vec![0.0; m * n];
    for i in 0..m {
        for p in 0..k {
            let a_ip = a[i * k + p];
            for j in 0..n {
                c[i * n + j] += a_ip * b[p * n + j];
            }
        }
    }
    c
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SPD: [f64; 9] = [4.0, 2.0, 0.6, 2.0, 5.0, 1.0, 0.6, 1.0, 3.0];

    #[test]
    fn test_cholesky_reconstructs() {
        let l = cholesky(&SPD, 3).unwrap();
        // strictly upper part is zero
        assert_eq!(l[1], 0.0);
        assert_eq!(l[2], 0.0);
        assert_eq!(l[5], 0.0);

        let llt = mat_mul(&l, &transpose(&l, 3), 3, 3, 3);
        for (x, y) in llt.iter().zip(SPD.iter()) {
            assert_relative_eq!(x, y, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_cholesky_rejects() {
        assert!(cholesky(&[1.0, 2.0, 2.0, 1.0], 2).is_none());
        assert!(cholesky(&[0.0], 1).is_none());
        assert!(cholesky(&[1.0, 0.0, 0.0], 2).is_none());
    }

    #[test]
    fn test_lower_triangular_inverse() {
        let l = cholesky(&SPD, 3).unwrap();
        let inv = lower_triangular_inverse(&l, 3);
        let id = mat_mul(&l, &inv, 3, 3, 3);
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(id[i * 3 + j], expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_mat_vec() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        assert_eq!(mat_vec(&a, 2, 3, &[1.0, 0.0, -1.0]), vec![-2.0, -2.0]);
    }
}
