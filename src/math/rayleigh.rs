//! Numerically stable Rayleigh distribution primitives.
//!
//! With shape (scale) parameter `σ > 0`:
//!
//! - `pdf(t) = (t / σ²) · exp(-t² / (2σ²))`
//! - `cdf(t) = 1 - exp(-t² / (2σ²))`
//! - mode at `t = σ`
//!
//! Numerical notes:
//! - For small `x = t² / (2σ²)`, `1 - exp(-x)` suffers from catastrophic cancellation.
//!   We use `expm1` to keep precision.
//! - Densities far in the tail underflow to zero; `log_pdf` stays finite for `t > 0`
//!   so callers can normalize in log space.

/// Rayleigh cumulative distribution function. Zero for `t <= 0`.
pub fn cdf(t: f64, sigma: f64) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    let x = (t * t) / (2.0 * sigma * sigma);
    -(-x).exp_m1()
}

/// Rayleigh probability density function. Zero for `t <= 0`.
pub fn pdf(t: f64, sigma: f64) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    let s2 = sigma * sigma;
    (t / s2) * (-(t * t) / (2.0 * s2)).exp()
}

/// Natural log of the density; `-inf` for `t <= 0`.
pub fn log_pdf(t: f64, sigma: f64) -> f64 {
    if t <= 0.0 {
        return f64::NEG_INFINITY;
    }
    t.ln() - 2.0 * sigma.ln() - (t * t) / (2.0 * sigma * sigma)
}

/// Time of peak density.
pub fn mode(sigma: f64) -> f64 {
    sigma
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cdf_limits() {
        assert_eq!(cdf(0.0, 3.0), 0.0);
        assert!((cdf(1e6, 3.0) - 1.0).abs() < 1e-12);
        // Small-x regime: cdf ≈ x.
        let t = 1e-6;
        let sigma = 1.0;
        assert!((cdf(t, sigma) - t * t / 2.0).abs() < 1e-24);
    }

    #[test]
    fn pdf_peaks_at_sigma() {
        let sigma = 4.0;
        let at_mode = pdf(mode(sigma), sigma);
        for &t in &[1.0, 2.0, 3.0, 3.9, 4.1, 5.0, 8.0] {
            assert!(pdf(t, sigma) < at_mode, "pdf({t}) should be below the mode value");
        }
    }

    #[test]
    fn log_pdf_matches_pdf() {
        for &sigma in &[0.5, 2.0, 10.0] {
            for &t in &[0.1, 1.0, 5.0, 12.0] {
                let direct = pdf(t, sigma);
                let via_log = log_pdf(t, sigma).exp();
                assert!((direct - via_log).abs() < 1e-12 * direct.max(1.0));
            }
        }
    }

    #[test]
    fn log_pdf_finite_deep_in_tail() {
        // pdf underflows to 0 here, the log form must not.
        let v = log_pdf(50.0, 0.05);
        assert!(v.is_finite());
        assert_eq!(pdf(50.0, 0.05), 0.0);
    }
}
