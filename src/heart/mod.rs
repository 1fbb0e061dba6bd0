//! Four-chamber heart: elastance ventricles, compliant atria, diode valves,
//! septal interaction and the cardiac power filter.
//!
//! The cardiac phase is a fraction accumulator `du/dt = 1/Tc` wrapped
//! modulo 1, so a heart period that moves with the baroreflex never makes
//! the activation jump.
//!
//! References:
//! - Ursino M. Am J Physiol 1998;275:H1733-H1747
//! - Albanese A et al. Ann Biomed Eng 2016;44:3209-3229
//! - Magosso E, Ursino M. Am J Physiol 2002;283:H2123-H2137 (cardiac power)

pub mod activation;
pub mod septum;
pub mod valve;
pub mod ventricle;

use serde::{Deserialize, Serialize};

use crate::config::HeartParameters;
use crate::simulation::integrator::impl_integrate;

pub use activation::ActivationCurve;
pub use valve::diode_flow;
pub use ventricle::VentricleSolution;

/// Cardiac state variables
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HeartState {
    pub lv_volume_mL: f64,
    pub rv_volume_mL: f64,
    pub la_pressure_mmHg: f64,
    pub ra_pressure_mmHg: f64,
    /// Fraction of the current beat, in [0, 1)
    pub cardiac_phase: f64,
    /// Low-pass filtered external power (mmHg·mL/s)
    pub power_mmHg_mL_per_s: f64,
}

impl_integrate!(HeartState {
    lv_volume_mL,
    rv_volume_mL,
    la_pressure_mmHg,
    ra_pressure_mmHg,
    cardiac_phase,
    power_mmHg_mL_per_s,
});

/// Coupling variables the heart reads each step
#[derive(Debug, Clone, Copy)]
pub struct HeartInputs {
    pub aortic_pressure_mmHg: f64,
    pub pulmonary_arterial_pressure_mmHg: f64,
    /// Pulmonary venous outflow into the left atrium
    pub left_atrial_inflow_mL_per_s: f64,
    /// Thoracic venous return into the right atrium
    pub right_atrial_inflow_mL_per_s: f64,
    pub lv_elastance_mmHg_per_mL: f64,
    pub rv_elastance_mmHg_per_mL: f64,
    pub period_s: f64,
}

/// Algebraic heart outputs
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct HeartOutputs {
    pub activation: f64,
    pub lv_pressure_mmHg: f64,
    pub rv_pressure_mmHg: f64,
    pub mitral_flow_mL_per_s: f64,
    pub aortic_flow_mL_per_s: f64,
    pub tricuspid_flow_mL_per_s: f64,
    pub pulmonary_valve_flow_mL_per_s: f64,
    pub septal_volume_mL: f64,
    pub la_volume_mL: f64,
    pub ra_volume_mL: f64,
    /// Instantaneous external power before filtering
    pub power_mmHg_mL_per_s: f64,
    /// Filtered power relative to its nominal value; scales myocardial O2 use
    pub power_ratio: f64,
    pub heart_rate_bpm: f64,
}

impl HeartOutputs {
    /// Blood held in all four chambers (mL)
    pub fn total_volume_mL(&self, state: &HeartState) -> f64 {
        state.lv_volume_mL + state.rv_volume_mL + self.la_volume_mL + self.ra_volume_mL
    }
}

/// Heart model with its activation curve precomputed
#[derive(Debug, Clone)]
pub struct Heart {
    params: HeartParameters,
    activation: ActivationCurve,
}

impl Heart {
    pub fn new(params: &HeartParameters) -> Self {
        Self {
            params: params.clone(),
            activation: ActivationCurve::new(&params.activation),
        }
    }

    pub fn params(&self) -> &HeartParameters {
        &self.params
    }

    pub fn activation(&self) -> &ActivationCurve {
        &self.activation
    }

    pub fn la_volume_mL(&self, state: &HeartState) -> f64 {
        let la = &self.params.left_atrium;
        la.compliance_mL_per_mmHg * state.la_pressure_mmHg + la.unstressed_volume_mL
    }

    pub fn ra_volume_mL(&self, state: &HeartState) -> f64 {
        let ra = &self.params.right_atrium;
        ra.compliance_mL_per_mmHg * state.ra_pressure_mmHg + ra.unstressed_volume_mL
    }

    /// Derivatives of every heart state and the algebraic outputs.
    pub fn compute_derivatives(&self, state: &HeartState, inputs: &HeartInputs) -> (HeartState, HeartOutputs) {
        let p = &self.params;
        let phi = self.activation.value(state.cardiac_phase);
        let e_lv = inputs.lv_elastance_mmHg_per_mL;
        let e_rv = inputs.rv_elastance_mmHg_per_mL;

        let mut lv_volume = state.lv_volume_mL;
        let mut rv_volume = state.rv_volume_mL;
        let mut septal_volume = 0.0;
        if p.septum.enabled {
            let plv0 = ventricle::isovolumic_pressure(&p.left_ventricle, e_lv, phi, state.lv_volume_mL);
            let prv0 = ventricle::isovolumic_pressure(&p.right_ventricle, e_rv, phi, state.rv_volume_mL);
            septal_volume = septum::septal_volume(&p.septum, plv0 - prv0, phi);
            (lv_volume, rv_volume) = septum::effective_volumes(state.lv_volume_mL, state.rv_volume_mL, septal_volume);
        }

        let lv_pmax = ventricle::isovolumic_pressure(&p.left_ventricle, e_lv, phi, lv_volume);
        let rv_pmax = ventricle::isovolumic_pressure(&p.right_ventricle, e_rv, phi, rv_volume);
        let lv = ventricle::solve_ejection(
            &p.left_ventricle,
            p.viscous_solve,
            lv_pmax,
            inputs.aortic_pressure_mmHg,
            p.aortic_valve_resistance_mmHg_s_per_mL,
        );
        let rv = ventricle::solve_ejection(
            &p.right_ventricle,
            p.viscous_solve,
            rv_pmax,
            inputs.pulmonary_arterial_pressure_mmHg,
            p.pulmonary_valve_resistance_mmHg_s_per_mL,
        );

        let mitral = diode_flow(
            state.la_pressure_mmHg,
            lv.pressure_mmHg,
            p.left_atrium.outflow_resistance_mmHg_s_per_mL,
        );
        let tricuspid = diode_flow(
            state.ra_pressure_mmHg,
            rv.pressure_mmHg,
            p.right_atrium.outflow_resistance_mmHg_s_per_mL,
        );

        let d_lv = mitral - lv.outflow_mL_per_s;
        let d_rv = tricuspid - rv.outflow_mL_per_s;
        let power = (-lv.pressure_mmHg * d_lv - rv.pressure_mmHg * d_rv).max(0.0);

        let rates = HeartState {
            lv_volume_mL: d_lv,
            rv_volume_mL: d_rv,
            la_pressure_mmHg: (inputs.left_atrial_inflow_mL_per_s - mitral) / p.left_atrium.compliance_mL_per_mmHg,
            ra_pressure_mmHg: (inputs.right_atrial_inflow_mL_per_s - tricuspid) / p.right_atrium.compliance_mL_per_mmHg,
            cardiac_phase: 1.0 / inputs.period_s,
            power_mmHg_mL_per_s: (power - state.power_mmHg_mL_per_s) / p.power.filter_time_constant_s,
        };

        let outputs = HeartOutputs {
            activation: phi,
            lv_pressure_mmHg: lv.pressure_mmHg,
            rv_pressure_mmHg: rv.pressure_mmHg,
            mitral_flow_mL_per_s: mitral,
            aortic_flow_mL_per_s: lv.outflow_mL_per_s,
            tricuspid_flow_mL_per_s: tricuspid,
            pulmonary_valve_flow_mL_per_s: rv.outflow_mL_per_s,
            septal_volume_mL: septal_volume,
            la_volume_mL: self.la_volume_mL(state),
            ra_volume_mL: self.ra_volume_mL(state),
            power_mmHg_mL_per_s: power,
            power_ratio: state.power_mmHg_mL_per_s / p.power.nominal_power_mmHg_mL_per_s,
            heart_rate_bpm: 60.0 / inputs.period_s,
        };

        (rates, outputs)
    }
}
