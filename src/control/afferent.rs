//! Afferent pathways: carotid baroreceptors, peripheral chemoreceptors
//! and pulmonary stretch receptors.
//!
//! References:
//! - Ursino 1998, Eq 18-20 (baroreceptors)
//! - Magosso & Ursino 2001, Eq 1-6 (chemoreceptors, lung stretch)

use crate::config::{BaroreceptorParameters, ChemoreceptorParameters, LungStretchParameters};
use crate::math::{lag, sigmoid};

/// Baroreceptor filter realised without differentiating Psa.
///
/// The state is `y = P̃ − (τz/τp)·Psa`, so `P̃ = y + (τz/τp)·Psa` and
/// `dy/dt = (Psa − P̃)/τp`.
pub fn filtered_pressure(params: &BaroreceptorParameters, filter_state: f64, arterial_pressure_mmHg: f64) -> f64 {
    filter_state + params.zero_time_constant_s / params.pole_time_constant_s * arterial_pressure_mmHg
}

pub fn filter_rate(params: &BaroreceptorParameters, filter_state: f64, arterial_pressure_mmHg: f64) -> f64 {
    let p_tilde = filtered_pressure(params, filter_state, arterial_pressure_mmHg);
    (arterial_pressure_mmHg - p_tilde) / params.pole_time_constant_s
}

/// Filter state that holds `P̃ = P` at a constant pressure
pub fn steady_filter_state(params: &BaroreceptorParameters, pressure_mmHg: f64) -> f64 {
    pressure_mmHg * (1.0 - params.zero_time_constant_s / params.pole_time_constant_s)
}

/// Baroreceptor firing fab (spikes/s) at filtered pressure P̃
pub fn baroreceptor_rate(params: &BaroreceptorParameters, filtered_pressure_mmHg: f64) -> f64 {
    sigmoid(
        filtered_pressure_mmHg,
        params.rate_min_hz,
        params.rate_max_hz,
        params.setpoint_mmHg,
        params.slope_mmHg,
    )
}

/// Hyperbolic O2 stimulus, 1 at normal PaO2
pub fn chemoreceptor_o2_stimulus(params: &ChemoreceptorParameters, pao2_mmHg: f64) -> f64 {
    (params.normal_pao2_mmHg - params.o2_asymptote_mmHg) / (pao2_mmHg - params.o2_asymptote_mmHg).max(1.0)
}

/// Linear CO2 stimulus, 1 at normal PaCO2
pub fn chemoreceptor_co2_stimulus(params: &ChemoreceptorParameters, paco2_mmHg: f64) -> f64 {
    (1.0 + params.co2_gain_per_mmHg * (paco2_mmHg - params.normal_paco2_mmHg)).max(0.0)
}

/// Lagged stimuli derivatives (O2, CO2)
pub fn chemoreceptor_rates(
    params: &ChemoreceptorParameters,
    o2_state: f64,
    co2_state: f64,
    pao2_mmHg: f64,
    paco2_mmHg: f64,
) -> (f64, f64) {
    (
        lag(chemoreceptor_o2_stimulus(params, pao2_mmHg), o2_state, params.o2_time_constant_s),
        lag(chemoreceptor_co2_stimulus(params, paco2_mmHg), co2_state, params.co2_time_constant_s),
    )
}

/// Chemoreceptor firing fac (spikes/s) from the lagged stimuli
pub fn chemoreceptor_rate(params: &ChemoreceptorParameters, o2_state: f64, co2_state: f64) -> f64 {
    (params.nominal_rate_hz * o2_state * co2_state).clamp(params.rate_min_hz, params.rate_max_hz)
}

/// Derivative of lung stretch firing fap toward `G·max(VL − FRC, 0)`
pub fn lung_stretch_rate(params: &LungStretchParameters, stretch_hz: f64, lung_volume_L: f64, frc_L: f64) -> f64 {
    lag(params.gain_hz_per_L * (lung_volume_L - frc_L).max(0.0), stretch_hz, params.time_constant_s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControlParameters;

    #[test]
    fn test_steady_filter_tracks_pressure() {
        let p = ControlParameters::default().baroreceptor;
        let y = steady_filter_state(&p, 92.0);
        assert!((filtered_pressure(&p, y, 92.0) - 92.0).abs() < 1e-12);
        assert!(filter_rate(&p, y, 92.0).abs() < 1e-12);
    }

    #[test]
    fn test_pressure_drop_reads_immediately_through_zero() {
        // The zero makes the filtered pressure overshoot a sudden fall
        let p = ControlParameters::default().baroreceptor;
        let y = steady_filter_state(&p, 92.0);
        let drop = filtered_pressure(&p, y, 62.0);
        assert!(drop < 62.0, "filtered {}", drop);
        assert!(baroreceptor_rate(&p, drop) < baroreceptor_rate(&p, 92.0));
    }

    #[test]
    fn test_baroreceptor_midpoint_at_setpoint() {
        let p = ControlParameters::default().baroreceptor;
        let mid = baroreceptor_rate(&p, p.setpoint_mmHg);
        assert!((mid - (p.rate_min_hz + p.rate_max_hz) / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_chemoreceptor_nominal_at_normal_gases() {
        let p = ControlParameters::default().chemoreceptor;
        assert!((chemoreceptor_o2_stimulus(&p, 100.0) - 1.0).abs() < 1e-12);
        assert!((chemoreceptor_co2_stimulus(&p, 40.0) - 1.0).abs() < 1e-12);
        assert!((chemoreceptor_rate(&p, 1.0, 1.0) - p.nominal_rate_hz).abs() < 1e-12);
    }

    #[test]
    fn test_hypoxia_and_hypercapnia_raise_firing() {
        let p = ControlParameters::default().chemoreceptor;
        assert!(chemoreceptor_o2_stimulus(&p, 50.0) > 1.0);
        assert!(chemoreceptor_co2_stimulus(&p, 50.0) > 1.0);
        assert!(chemoreceptor_rate(&p, 100.0, 100.0) <= p.rate_max_hz);
    }

    #[test]
    fn test_stretch_silent_below_frc() {
        let p = ControlParameters::default().lung_stretch;
        assert!(lung_stretch_rate(&p, 0.0, 2.0, 2.4).abs() < 1e-12);
        assert!(lung_stretch_rate(&p, 0.0, 2.9, 2.4) > 0.0);
    }
}
