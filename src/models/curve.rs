//! Curve evaluation for the Rayleigh defect-discovery model.
//!
//! The estimator and predictor rely on two primitive operations:
//! - the cumulative curve `K · F(t; σ)` at integer months (for least squares)
//! - the per-month density weights over a finite horizon (for discretized curves)

use crate::math::rayleigh::{cdf, log_pdf};
use crate::math::normalize_log_weights;

/// Cumulative shape `F(m; σ)` for months `1..=months`.
pub fn cumulative_shape(sigma: f64, months: usize) -> Vec<f64> {
    (1..=months).map(|m| cdf(m as f64, sigma)).collect()
}

/// Expected cumulative defects `total · F(m; σ)` for months `1..=months`.
pub fn cumulative_curve(sigma: f64, total: f64, months: usize) -> Vec<f64> {
    cumulative_shape(sigma, months)
        .into_iter()
        .map(|f| total * f)
        .collect()
}

/// Density weights for months `1..=months`, renormalized over the horizon.
///
/// The Rayleigh density is evaluated at each integer month and the weights are
/// scaled to sum to 1 (a truncated distribution, since projects end). Evaluation
/// happens in log space so a small σ over a long horizon does not underflow.
///
/// Returns `None` if `sigma` is not a finite positive number or `months == 0`.
pub fn monthly_weights(sigma: f64, months: usize) -> Option<Vec<f64>> {
    if !(sigma.is_finite() && sigma > 0.0) || months == 0 {
        return None;
    }
    let log_w: Vec<f64> = (1..=months).map(|m| log_pdf(m as f64, sigma)).collect();
    normalize_log_weights(&log_w)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cumulative_curve_is_non_decreasing_and_bounded() {
        let c = cumulative_curve(3.0, 50.0, 24);
        for w in c.windows(2) {
            assert!(w[1] >= w[0]);
        }
        assert!(c[23] <= 50.0);
        assert!(c[23] > 49.9);
    }

    #[test]
    fn monthly_weights_sum_to_one_and_peak_at_sigma() {
        let w = monthly_weights(4.0, 12).unwrap();
        assert_eq!(w.len(), 12);
        assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        let peak = w
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i + 1)
            .unwrap();
        assert_eq!(peak, 4);
    }

    #[test]
    fn monthly_weights_single_month() {
        assert_eq!(monthly_weights(7.5, 1).unwrap(), vec![1.0]);
    }

    #[test]
    fn monthly_weights_tiny_sigma_long_horizon() {
        let w = monthly_weights(0.05, 36).unwrap();
        assert!(w.iter().all(|v| v.is_finite() && *v >= 0.0));
        assert!((w[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn monthly_weights_rejects_bad_sigma() {
        assert!(monthly_weights(0.0, 5).is_none());
        assert!(monthly_weights(-1.0, 5).is_none());
        assert!(monthly_weights(f64::NAN, 5).is_none());
        assert!(monthly_weights(2.0, 0).is_none());
    }
}
