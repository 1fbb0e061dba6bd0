//! Small numerical guards shared by the component models.

/// Largest magnitude passed to `exp` by the nonlinear pressure laws
pub const EXP_CLIP: f64 = 50.0;

/// `exp` with its argument clipped to ±EXP_CLIP.
#[inline]
pub fn clipped_exp(x: f64) -> f64 {
    x.clamp(-EXP_CLIP, EXP_CLIP).exp()
}

/// Logistic blend `(low + high·e)/(1 + e)` with `e = exp((x − centre)/slope)`.
#[inline]
pub fn sigmoid(x: f64, low: f64, high: f64, centre: f64, slope: f64) -> f64 {
    let e = clipped_exp((x - centre) / slope);
    (low + high * e) / (1.0 + e)
}

/// First-order lag derivative toward `target`.
#[inline]
pub fn lag(target: f64, value: f64, time_constant_s: f64) -> f64 {
    (target - value) / time_constant_s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clipped_exp_stays_finite() {
        assert!(clipped_exp(1e6).is_finite());
        assert!(clipped_exp(-1e6) > 0.0);
        assert!((clipped_exp(1.0) - std::f64::consts::E).abs() < 1e-12);
    }

    #[test]
    fn test_sigmoid_limits_and_centre() {
        assert!((sigmoid(0.0, 2.0, 10.0, 0.0, 1.0) - 6.0).abs() < 1e-12);
        assert!((sigmoid(-100.0, 2.0, 10.0, 0.0, 1.0) - 2.0).abs() < 1e-9);
        assert!((sigmoid(100.0, 2.0, 10.0, 0.0, 1.0) - 10.0).abs() < 1e-9);
    }
}
