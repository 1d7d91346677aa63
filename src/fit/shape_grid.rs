//! Shape-parameter grid generation and bracket refinement.
//!
//! We fit σ with a deterministic grid search followed by a golden-section
//! refinement inside the winning grid bracket. The result depends only on the
//! inputs and the grid flags.

use crate::error::AppError;

/// Generate `steps` log-spaced points between `min` and `max` (inclusive).
pub fn log_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > 0.0 && max > min) {
        return Err(AppError::config(format!(
            "Invalid shape range: min={min}, max={max} (must be finite, >0, and max>min)."
        )));
    }
    if steps < 2 {
        return Err(AppError::config("Shape grid steps must be >= 2."));
    }

    let ln_min = min.ln();
    let ln_max = max.ln();
    let step = (ln_max - ln_min) / (steps as f64 - 1.0);

    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        out.push((ln_min + step * i as f64).exp());
    }
    // Pin the endpoints exactly; exp(ln(x)) can drift by an ulp.
    out[0] = min;
    out[steps - 1] = max;
    Ok(out)
}

/// Neighbouring grid values around index `idx` (clamped at the grid edges).
pub fn bracket(grid: &[f64], idx: usize) -> (f64, f64) {
    let lo = grid[idx.saturating_sub(1)];
    let hi = grid[(idx + 1).min(grid.len() - 1)];
    (lo, hi)
}

/// Minimize `f` on `[a, b]` with golden-section search.
///
/// Returns the best abscissa and its objective value. Assumes `f` is unimodal on
/// the interval; non-finite objective values are treated as +∞.
pub fn golden_section<F>(f: F, mut a: f64, mut b: f64, iters: usize) -> (f64, f64)
where
    F: Fn(f64) -> f64,
{
    let inv_phi = (5f64.sqrt() - 1.0) / 2.0;
    let eval = |x: f64| {
        let v = f(x);
        if v.is_finite() { v } else { f64::INFINITY }
    };

    let mut c = b - inv_phi * (b - a);
    let mut d = a + inv_phi * (b - a);
    let mut fc = eval(c);
    let mut fd = eval(d);

    for _ in 0..iters {
        if fc < fd {
            b = d;
            d = c;
            fd = fc;
            c = b - inv_phi * (b - a);
            fc = eval(c);
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + inv_phi * (b - a);
            fd = eval(d);
        }
    }

    if fc <= fd { (c, fc) } else { (d, fd) }
}
