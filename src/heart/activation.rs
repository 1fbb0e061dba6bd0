//! Normalized double-Hill activation φ(x) over one cardiac cycle.
//!
//! Reference: Albanese 2016 (Eq 3), shape fitted to the Ursino 1998 elastance

use crate::config::ActivationParameters;

/// Samples used to locate the peak of the raw double-Hill curve
const PEAK_SAMPLES: usize = 20_000;

/// Activation curve with its peak precomputed.
#[derive(Debug, Clone)]
pub struct ActivationCurve {
    alpha: [f64; 2],
    exponent: [f64; 2],
    peak: f64,
}

impl ActivationCurve {
    pub fn new(params: &ActivationParameters) -> Self {
        let mut curve = Self {
            alpha: params.alpha,
            exponent: params.exponent,
            peak: 1.0,
        };
        let peak = (1..PEAK_SAMPLES)
            .map(|i| curve.raw(i as f64 / PEAK_SAMPLES as f64))
            .fold(0.0_f64, f64::max);
        if peak > 0.0 {
            curve.peak = peak;
        }
        curve
    }

    /// Unnormalized product of the rising and falling Hill terms
    fn raw(&self, x: f64) -> f64 {
        let rising = (x / self.alpha[0]).powf(self.exponent[0]);
        let falling = (x / self.alpha[1]).powf(self.exponent[1]);
        rising / (1.0 + rising) / (1.0 + falling)
    }

    /// φ at cardiac phase fraction x ∈ [0, 1)
    pub fn value(&self, x: f64) -> f64 {
        (self.raw(x.max(0.0)) / self.peak).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve() -> ActivationCurve {
        ActivationCurve::new(&crate::config::HeartParameters::default().activation)
    }

    #[test]
    fn test_activation_bounded() {
        let c = curve();
        for i in 0..1000 {
            let phi = c.value(i as f64 / 1000.0);
            assert!((0.0..=1.0).contains(&phi), "φ({}) = {}", i, phi);
        }
    }

    #[test]
    fn test_activation_peak_is_one() {
        let c = curve();
        let peak = (0..20_000).map(|i| c.value(i as f64 / 20_000.0)).fold(0.0, f64::max);
        assert!((peak - 1.0).abs() < 1e-9, "peak {}", peak);
    }

    #[test]
    fn test_activation_relaxed_at_cycle_edges() {
        let c = curve();
        assert!(c.value(0.0) < 1e-9);
        assert!(c.value(0.9) < 1e-3, "late diastole φ = {}", c.value(0.9));
    }
}
