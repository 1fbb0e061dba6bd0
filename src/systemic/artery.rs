//! Arterial compartments shared by the systemic and pulmonary circuits.

use crate::config::{ArterialModel, ArteryParameters};

/// Flow leaving the artery and the derivative of the stored flow.
///
/// `stored_flow` is the inertial flow state; the RC model ignores it and
/// returns the algebraic flow with a zero derivative.
pub fn arterial_outflow(
    params: &ArteryParameters,
    stored_flow: f64,
    p_artery: f64,
    p_downstream: f64,
) -> (f64, f64) {
    match params.model {
        ArterialModel::Rlc => {
            let rate = (p_artery - p_downstream - params.resistance_mmHg_s_per_mL * stored_flow)
                / params.inertance_mmHg_s2_per_mL;
            (stored_flow, rate)
        }
        ArterialModel::Rc => ((p_artery - p_downstream) / params.resistance_mmHg_s_per_mL, 0.0),
    }
}

/// Algebraic flow of the RC model; `None` when flow is an inertial state.
pub fn algebraic_flow(params: &ArteryParameters, p_artery: f64, p_downstream: f64) -> Option<f64> {
    match params.model {
        ArterialModel::Rlc => None,
        ArterialModel::Rc => Some((p_artery - p_downstream) / params.resistance_mmHg_s_per_mL),
    }
}
