//! Goodness-of-fit metrics and curve normalization helpers.

use std::cmp::Ordering;

/// Coefficient of determination of `fitted` against `observed`.
///
/// When the observations have no variance the score is `1.0` for an exact fit
/// and `0.0` otherwise.
pub fn r_squared(observed: &[f64], fitted: &[f64]) -> f64 {
    let n = observed.len().min(fitted.len());
    if n == 0 {
        return 0.0;
    }
    let mean = observed[..n].iter().sum::<f64>() / n as f64;
    let mut sse = 0.0;
    let mut sst = 0.0;
    for i in 0..n {
        let r = observed[i] - fitted[i];
        let d = observed[i] - mean;
        sse += r * r;
        sst += d * d;
    }
    r_squared_from_sums(sse, sst)
}

/// R² from a residual sum of squares and a total sum of squares.
pub fn r_squared_from_sums(sse: f64, sst: f64) -> f64 {
    if sst <= f64::EPSILON {
        return if sse <= 1e-12 { 1.0 } else { 0.0 };
    }
    1.0 - sse / sst
}

pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> f64 {
    let n = actual.len().min(predicted.len());
    if n == 0 {
        return 0.0;
    }
    actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / n as f64
}

/// Turn log-weights into weights summing to 1 (log-sum-exp).
///
/// Entries equal to `-inf` get weight 0. Returns `None` if no entry is finite.
pub fn normalize_log_weights(log_w: &[f64]) -> Option<Vec<f64>> {
    let max = log_w
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return None;
    }
    let scaled: Vec<f64> = log_w
        .iter()
        .map(|&v| if v.is_finite() { (v - max).exp() } else { 0.0 })
        .collect();
    let sum: f64 = scaled.iter().sum();
    Some(scaled.into_iter().map(|v| v / sum).collect())
}

/// Split `units` integer units across `weights` so the parts sum exactly to `units`.
///
/// Largest-remainder method: every entry gets the floor of its exact share, and
/// the leftover units go to the largest fractional parts (earlier index wins ties).
/// `weights` are expected to be non-negative; they need not sum to exactly 1.
pub fn apportion(weights: &[f64], units: u64) -> Vec<u64> {
    let total_w: f64 = weights.iter().filter(|w| w.is_finite() && **w > 0.0).sum();
    if weights.is_empty() || total_w <= 0.0 {
        return vec![0; weights.len()];
    }

    let exact: Vec<f64> = weights
        .iter()
        .map(|&w| {
            if w.is_finite() && w > 0.0 {
                w / total_w * units as f64
            } else {
                0.0
            }
        })
        .collect();
    let mut parts: Vec<u64> = exact.iter().map(|e| e.floor() as u64).collect();
    let assigned: u64 = parts.iter().sum();

    let mut order: Vec<usize> = (0..exact.len()).collect();
    let frac = |i: usize| exact[i] - exact[i].floor();

    if assigned < units {
        order.sort_by(|&a, &b| frac(b).partial_cmp(&frac(a)).unwrap_or(Ordering::Equal).then(a.cmp(&b)));
        let mut left = units - assigned;
        for &i in order.iter().cycle() {
            if left == 0 {
                break;
            }
            if exact[i] > 0.0 {
                parts[i] += 1;
                left -= 1;
            }
        }
    } else if assigned > units {
        // Only reachable through floating-point drift in the shares.
        order.sort_by(|&a, &b| frac(a).partial_cmp(&frac(b)).unwrap_or(Ordering::Equal).then(b.cmp(&a)));
        let mut excess = assigned - units;
        for &i in order.iter().cycle() {
            if excess == 0 {
                break;
            }
            if parts[i] > 0 {
                parts[i] -= 1;
                excess -= 1;
            }
        }
    }

    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn r_squared_perfect_and_mean_fit() {
        let y = [1.0, 2.0, 3.0, 4.0];
        assert!((r_squared(&y, &y) - 1.0).abs() < 1e-12);
        let mean = [2.5; 4];
        assert!(r_squared(&y, &mean).abs() < 1e-12);
    }

    #[test]
    fn r_squared_constant_observations() {
        assert_eq!(r_squared(&[5.0], &[5.0]), 1.0);
        assert_eq!(r_squared(&[5.0, 5.0], &[4.0, 6.0]), 0.0);
    }

    #[test]
    fn mae_basic() {
        assert!((mean_absolute_error(&[1.0, 2.0], &[2.0, 0.0]) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn normalize_log_weights_handles_underflow() {
        let w = normalize_log_weights(&[-2000.0, -2001.0, f64::NEG_INFINITY]).unwrap();
        assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(w[0] > w[1]);
        assert_eq!(w[2], 0.0);
        assert!(normalize_log_weights(&[f64::NEG_INFINITY]).is_none());
    }

    #[test]
    fn apportion_sums_exactly() {
        let w = [0.1, 0.25, 0.3, 0.2, 0.15];
        for units in [0u64, 1, 7, 100, 333, 1001] {
            let parts = apportion(&w, units);
            assert_eq!(parts.iter().sum::<u64>(), units, "units={units}");
        }
    }

    #[test]
    fn apportion_gives_leftover_to_largest_remainders() {
        // Exact shares: 3.4, 3.3, 3.3 -> floors 3,3,3 and one leftover unit to index 0.
        let parts = apportion(&[0.34, 0.33, 0.33], 10);
        assert_eq!(parts, vec![4, 3, 3]);
    }

    #[test]
    fn apportion_zero_weights() {
        assert_eq!(apportion(&[0.0, 0.0], 5), vec![0, 0]);
    }
}
