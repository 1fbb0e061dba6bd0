//! Rhythmic intramuscular pressure from contracting leg muscles.
//!
//! Reference: Magosso & Ursino 2002 (Eq 2-3)

use std::f64::consts::PI;

use crate::config::MusclePumpParameters;

/// Intramuscular pressure (mmHg) at time `t_s` for exercise intensity in [0, 1].
pub fn intramuscular_pressure(params: &MusclePumpParameters, intensity: f64, t_s: f64) -> f64 {
    if intensity <= 0.0 {
        return 0.0;
    }
    let in_cycle = t_s.rem_euclid(params.cycle_period_s);
    let shape = if in_cycle <= params.contraction_time_s {
        (PI * in_cycle / params.contraction_time_s).sin()
    } else {
        0.0
    };
    params.amplitude_mmHg * intensity * shape
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SystemicParameters;

    #[test]
    fn test_pump_silent_at_rest() {
        let p = SystemicParameters::default().muscle_pump;
        assert_eq!(intramuscular_pressure(&p, 0.0, 0.15), 0.0);
    }

    #[test]
    fn test_pump_peaks_mid_contraction() {
        let p = SystemicParameters::default().muscle_pump;
        let peak = intramuscular_pressure(&p, 1.0, 0.15);
        assert!((peak - 50.0).abs() < 1e-9);
        assert_eq!(intramuscular_pressure(&p, 1.0, 0.5), 0.0);
        let next_cycle = intramuscular_pressure(&p, 0.5, 0.75 + 0.15);
        assert!((next_cycle - 25.0).abs() < 1e-9);
    }
}
