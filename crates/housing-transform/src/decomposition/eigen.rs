//! Symmetric eigendecomposition by cyclic Jacobi rotations.
//!
//! Used on covariance and Gram matrices, which are small (at most a few
//! hundred rows) and symmetric positive semi-definite.

use crate::error::{Result, TransformError};
use ndarray::{Array1, Array2};
use tracing::debug;

/// Maximum number of full sweeps over the off-diagonal entries.
pub const MAX_SWEEPS: usize = 100;

/// Relative off-diagonal norm at which the matrix counts as diagonal.
const TOLERANCE: f64 = 1e-12;

/// Eigenvalues sorted in descending order, with matching unit eigenvectors
/// stored as columns.
#[derive(Debug, Clone)]
pub struct SymmetricEigen {
    pub eigenvalues: Array1<f64>,
    pub eigenvectors: Array2<f64>,
}

/// Decompose a real symmetric matrix.
///
/// Only the symmetric part is meaningful; the input is not checked for
/// symmetry.
pub fn symmetric_eigen(matrix: &Array2<f64>) -> Result<SymmetricEigen> {
    let n = matrix.nrows();
    if n != matrix.ncols() {
        return Err(TransformError::InvalidConfig(format!(
            "eigendecomposition needs a square matrix, got {}x{}",
            n,
            matrix.ncols()
        )));
    }

    let mut a = matrix.clone();
    let mut v = Array2::<f64>::eye(n);

    let mut sweeps = 0;
    loop {
        let (off, total) = off_diagonal_norms(&a);
        if off <= TOLERANCE * total || off == 0.0 {
            break;
        }
        if sweeps == MAX_SWEEPS {
            return Err(TransformError::NoConvergence(MAX_SWEEPS));
        }
        sweeps += 1;

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[[p, q]];
                if apq == 0.0 {
                    continue;
                }

                let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
                let t = if theta.abs() > 1e150 {
                    1.0 / (2.0 * theta)
                } else {
                    theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt())
                };
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                rotate(&mut a, &mut v, p, q, c, s);
            }
        }
    }
    debug!(size = n, sweeps, "Jacobi eigendecomposition converged");

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| a[[j, j]].total_cmp(&a[[i, i]]));

    let eigenvalues = Array1::from_iter(order.iter().map(|&i| a[[i, i]]));
    let mut eigenvectors = Array2::<f64>::zeros((n, n));
    for (dest, &src) in order.iter().enumerate() {
        eigenvectors.column_mut(dest).assign(&v.column(src));
    }

    Ok(SymmetricEigen {
        eigenvalues,
        eigenvectors,
    })
}

/// Apply the rotation in the (p, q) plane: `A <- Jᵀ A J`, `V <- V J`.
fn rotate(a: &mut Array2<f64>, v: &mut Array2<f64>, p: usize, q: usize, c: f64, s: f64) {
    let n = a.nrows();

    for k in 0..n {
        let akp = a[[k, p]];
        let akq = a[[k, q]];
        a[[k, p]] = c * akp - s * akq;
        a[[k, q]] = s * akp + c * akq;
    }
    for k in 0..n {
        let apk = a[[p, k]];
        let aqk = a[[q, k]];
        a[[p, k]] = c * apk - s * aqk;
        a[[q, k]] = s * apk + c * aqk;
    }
    for k in 0..n {
        let vkp = v[[k, p]];
        let vkq = v[[k, q]];
        v[[k, p]] = c * vkp - s * vkq;
        v[[k, q]] = s * vkp + c * vkq;
    }
}

/// Frobenius norms of the off-diagonal part and of the whole matrix.
fn off_diagonal_norms(a: &Array2<f64>) -> (f64, f64) {
    let mut off = 0.0;
    let mut total = 0.0;
    for ((i, j), value) in a.indexed_iter() {
        let sq = value * value;
        total += sq;
        if i != j {
            off += sq;
        }
    }
    (off.sqrt(), total.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn test_two_by_two() {
        let m = array![[2.0, 1.0], [1.0, 2.0]];
        let eig = symmetric_eigen(&m).unwrap();
        assert_close(eig.eigenvalues[0], 3.0);
        assert_close(eig.eigenvalues[1], 1.0);

        let v0 = eig.eigenvectors.column(0);
        assert_close(v0[0].abs(), 1.0 / 2f64.sqrt());
        assert_close(v0[0], v0[1]);
    }

    #[test]
    fn test_diagonal_matrix_sorted_descending() {
        let m = array![[1.0, 0.0, 0.0], [0.0, 5.0, 0.0], [0.0, 0.0, 3.0]];
        let eig = symmetric_eigen(&m).unwrap();
        assert_eq!(eig.eigenvalues.to_vec(), vec![5.0, 3.0, 1.0]);
        assert_eq!(eig.eigenvectors.column(0).to_vec(), vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_reconstruction_and_orthonormality() {
        let m = array![
            [4.0, 1.0, -2.0, 2.0],
            [1.0, 2.0, 0.0, 1.0],
            [-2.0, 0.0, 3.0, -2.0],
            [2.0, 1.0, -2.0, -1.0]
        ];
        let eig = symmetric_eigen(&m).unwrap();

        for i in 0..4 {
            let vi = eig.eigenvectors.column(i);
            let av = m.dot(&vi);
            for k in 0..4 {
                assert_close(av[k], eig.eigenvalues[i] * vi[k]);
            }
            for j in 0..4 {
                let dot = vi.dot(&eig.eigenvectors.column(j));
                assert_close(dot, if i == j { 1.0 } else { 0.0 });
            }
        }

        let trace: f64 = (0..4).map(|i| m[[i, i]]).sum();
        assert_close(eig.eigenvalues.sum(), trace);
    }

    #[test]
    fn test_non_square_rejected() {
        let m = Array2::<f64>::zeros((2, 3));
        assert!(symmetric_eigen(&m).is_err());
    }

    #[test]
    fn test_empty_matrix() {
        let eig = symmetric_eigen(&Array2::<f64>::zeros((0, 0))).unwrap();
        assert!(eig.eigenvalues.is_empty());
    }
}
