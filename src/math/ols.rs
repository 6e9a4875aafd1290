//! Least squares solver.
//!
//! Every fit in this crate reduces to small regression problems of the form:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! with 1–3 columns: the curve fitter solves `(a, c)` once per candidate shift,
//! and the correlation fit solves the slopes on centred regressors.
//!
//! Implementation choices:
//! - We use SVD to solve the least-squares problem robustly even when
//!   the design matrix is tall (more rows than columns).
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - Shifts far from the data make the basis column nearly constant, so the
//!   system can be close to singular; those candidates just lose on SSE.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Sum of squared residuals `Σ (y_i - x_i^T β)^2`.
pub fn sum_squared_residuals(x: &DMatrix<f64>, y: &DVector<f64>, beta: &DVector<f64>) -> f64 {
    let fitted = x * beta;
    (y - fitted).norm_squared()
}
