//! Least squares solver.
//!
//! Used by the size → total-defects calibration, which is a small linear
//! regression of the form:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! Implementation choices:
//! - We use SVD so the tall (more rows than columns) system solves robustly.
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - The parameter dimension is tiny (intercept + slope), so SVD cost is irrelevant.

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

/// Fit `y = a + b x` and return `(a, b)`.
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Option<(f64, f64)> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let n = xs.len();
    let mut x = DMatrix::<f64>::zeros(n, 2);
    for (i, &xi) in xs.iter().enumerate() {
        x[(i, 0)] = 1.0;
        x[(i, 1)] = xi;
    }
    let y = DVector::from_row_slice(ys);
    let beta = solve_least_squares(&x, &y)?;
    Some((beta[0], beta[1]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn fit_line_recovers_slope_on_scaled_sizes() {
        let sizes = [10_000.0, 25_000.0, 40_000.0, 80_000.0];
        let totals: Vec<f64> = sizes.iter().map(|s| 5.0 + 0.002 * s).collect();
        let (a, b) = fit_line(&sizes, &totals).unwrap();
        assert!((a - 5.0).abs() < 1e-6);
        assert!((b - 0.002).abs() < 1e-10);
    }

    #[test]
    fn fit_line_needs_two_points() {
        assert!(fit_line(&[1.0], &[2.0]).is_none());
    }
}
