//! Collapsible thoracic veins (venae cavae) feeding the right atrium.
//!
//! Reference: Albanese 2016 (Eq 5-8)

use crate::config::ThoracicVeinParameters;
use crate::math::clipped_exp;

/// Transmural pressure at volume `v` (mmHg).
///
/// Above the unstressed volume the wall is linear; below it the vessel
/// collapses exponentially. ψ corrects the wall at very small volumes.
pub fn transmural_pressure(params: &ThoracicVeinParameters, v: f64) -> f64 {
    let v = v.max(1.0);
    let psi = params.correction_pressure_mmHg / (clipped_exp(v / params.correction_volume_mL) - 1.0);
    if v >= params.unstressed_volume_mL {
        params.open_offset_mmHg + params.open_elastance_mmHg_per_mL * (v - params.unstressed_volume_mL) - psi
    } else {
        params.collapsed_offset_mmHg + params.collapsed_gain_mmHg * clipped_exp(v / params.collapsed_volume_scale_mL)
            - psi
    }
}

/// Volume-dependent resistance R = KR·(Vmax/V)² + R0.
pub fn resistance(params: &ThoracicVeinParameters, v: f64) -> f64 {
    let v = v.max(0.1 * params.unstressed_volume_mL);
    params.resistance_gain_mmHg_s_per_mL * (params.resistance_reference_volume_mL / v).powi(2)
        + params.base_resistance_mmHg_s_per_mL
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SystemicParameters;

    fn params() -> ThoracicVeinParameters {
        SystemicParameters::default().thoracic_veins
    }

    #[test]
    fn test_pressure_continuous_at_unstressed_volume() {
        let p = params();
        let below = transmural_pressure(&p, p.unstressed_volume_mL - 1e-6);
        let above = transmural_pressure(&p, p.unstressed_volume_mL + 1e-6);
        assert!((below - above).abs() < 1e-2, "{} vs {}", below, above);
    }

    #[test]
    fn test_pressure_increases_with_volume() {
        let p = params();
        let mut last = transmural_pressure(&p, 20.0);
        for v in (30..400).step_by(10) {
            let next = transmural_pressure(&p, v as f64);
            assert!(next > last, "not monotone at {} mL", v);
            last = next;
        }
    }

    #[test]
    fn test_collapsed_vein_resists_more() {
        let p = params();
        assert!(resistance(&p, 40.0) > resistance(&p, 200.0));
        assert!(resistance(&p, 0.0).is_finite());
    }
}
