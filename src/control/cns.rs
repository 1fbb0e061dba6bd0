//! CNS ischemic response: sympathetic drive from severe hypoxia or
//! hypercapnia, silent in the normal range.
//!
//! Reference: Ursino & Magosso 2000

use crate::config::CnsIschemicParameters;
use crate::math::lag;

/// Target drives (O2, CO2) at the current arterial gases
pub fn targets(params: &CnsIschemicParameters, pao2_mmHg: f64, paco2_mmHg: f64) -> (f64, f64) {
    let o2 = if pao2_mmHg < params.o2_threshold_mmHg {
        params.o2_gain_per_mmHg * (params.o2_threshold_mmHg - pao2_mmHg)
    } else {
        0.0
    };
    let co2 = if paco2_mmHg > params.co2_threshold_mmHg {
        params.co2_gain_per_mmHg * (paco2_mmHg - params.co2_threshold_mmHg)
    } else {
        0.0
    };
    (o2, co2)
}

pub fn rates(params: &CnsIschemicParameters, o2_state: f64, co2_state: f64, pao2_mmHg: f64, paco2_mmHg: f64) -> (f64, f64) {
    let (o2, co2) = targets(params, pao2_mmHg, paco2_mmHg);
    (
        lag(o2, o2_state, params.time_constant_s),
        lag(co2, co2_state, params.time_constant_s),
    )
}
