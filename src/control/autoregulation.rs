//! Local metabolic regulation of the brain, coronary and muscle beds.
//!
//! Venous O2 below normal and arterial CO2 above normal both dilate the
//! bed. The two lags enter the bed conductance as `1 + xO2 + xCO2`.
//!
//! Reference: Ursino & Magosso 2000; Magosso & Ursino 2002, Eq 15-17

use crate::config::AutoregulationParameters;
use crate::state::{Bed, BedSet};

/// Derivatives of the O2 and CO2 regulation states. Beds without local
/// regulation stay at zero.
pub fn rates(
    params: &AutoregulationParameters,
    o2_state: &BedSet<f64>,
    co2_state: &BedSet<f64>,
    venous_o2: &BedSet<f64>,
    paco2_mmHg: f64,
    normal_paco2_mmHg: f64,
) -> (BedSet<f64>, BedSet<f64>) {
    let d_o2 = BedSet::from_fn(|bed| match params.bed(bed) {
        Some(local) => {
            (-o2_state[bed] - local.o2_gain * (venous_o2[bed] - local.normal_venous_o2)) / params.o2_time_constant_s
        }
        None => 0.0,
    });
    let d_co2 = BedSet::from_fn(|bed| match params.bed(bed) {
        Some(local) => {
            (-co2_state[bed] + local.co2_gain_per_mmHg * (paco2_mmHg - normal_paco2_mmHg)) / params.co2_time_constant_s
        }
        None => 0.0,
    });
    (d_o2, d_co2)
}

/// Conductance factor of one bed, floored at 0.1
pub fn conductance_factor(bed: Bed, o2_state: &BedSet<f64>, co2_state: &BedSet<f64>, metabolic_vasodilation: f64) -> f64 {
    let mut factor = 1.0 + o2_state[bed] + co2_state[bed];
    if bed == Bed::ActiveMuscle {
        factor += metabolic_vasodilation;
    }
    factor.max(0.1)
}
