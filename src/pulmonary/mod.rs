//! Pulmonary circulation: artery, a capillary node split between the
//! gas-exchanging path and a physiological shunt, and the pulmonary veins.
//!
//! Every compartment sits inside the chest, so its volume is
//! `C·(P − Pthor) + Vu` and each pressure derivative carries `dPthor/dt`.
//!
//! Reference: Albanese 2016, Table 1

use serde::{Deserialize, Serialize};

use crate::config::PulmonaryParameters;
use crate::simulation::integrator::impl_integrate;
use crate::systemic::artery;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PulmonaryState {
    pub arterial_pressure_mmHg: f64,
    pub arterial_flow_mL_per_s: f64,
    pub capillary_pressure_mmHg: f64,
    pub venous_pressure_mmHg: f64,
}

impl_integrate!(PulmonaryState {
    arterial_pressure_mmHg,
    arterial_flow_mL_per_s,
    capillary_pressure_mmHg,
    venous_pressure_mmHg,
});

#[derive(Debug, Clone, Copy)]
pub struct PulmonaryInputs {
    pub pulmonary_valve_flow_mL_per_s: f64,
    pub la_pressure_mmHg: f64,
    pub thoracic_pressure_mmHg: f64,
    pub thoracic_pressure_rate_mmHg_per_s: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PulmonaryVolumes {
    pub arterial_mL: f64,
    /// Exchanging and shunt capillaries together
    pub capillary_mL: f64,
    pub venous_mL: f64,
}

impl PulmonaryVolumes {
    pub fn total_mL(&self) -> f64 {
        self.arterial_mL + self.capillary_mL + self.venous_mL
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PulmonaryOutputs {
    pub arterial_flow_mL_per_s: f64,
    /// Flow through gas-exchanging capillaries
    pub capillary_flow_mL_per_s: f64,
    pub shunt_flow_mL_per_s: f64,
    /// Pulmonary venous outflow into the left atrium
    pub venous_flow_mL_per_s: f64,
    pub volumes: PulmonaryVolumes,
}

#[derive(Debug, Clone)]
pub struct PulmonaryCirculation {
    params: PulmonaryParameters,
    shunt_resistance_mmHg_s_per_mL: f64,
    capillary_compliance_mL_per_mmHg: f64,
    capillary_unstressed_mL: f64,
}

impl PulmonaryCirculation {
    pub fn new(params: &PulmonaryParameters) -> Self {
        let s = params.shunt_fraction;
        let cap = &params.capillaries;
        Self {
            params: params.clone(),
            // Parallel paths split flow s : (1 − s)
            shunt_resistance_mmHg_s_per_mL: cap.resistance_mmHg_s_per_mL * (1.0 - s) / s,
            capillary_compliance_mL_per_mmHg: cap.compliance_mL_per_mmHg * (1.0 + s),
            capillary_unstressed_mL: cap.unstressed_volume_mL * (1.0 + s),
        }
    }

    pub fn params(&self) -> &PulmonaryParameters {
        &self.params
    }

    pub fn volumes(&self, state: &PulmonaryState, thoracic_pressure_mmHg: f64) -> PulmonaryVolumes {
        let p = &self.params;
        let pth = thoracic_pressure_mmHg;
        PulmonaryVolumes {
            arterial_mL: p.artery.compliance_mL_per_mmHg * (state.arterial_pressure_mmHg - pth)
                + p.artery.unstressed_volume_mL,
            capillary_mL: self.capillary_compliance_mL_per_mmHg * (state.capillary_pressure_mmHg - pth)
                + self.capillary_unstressed_mL,
            venous_mL: p.veins.compliance_mL_per_mmHg * (state.venous_pressure_mmHg - pth) + p.veins.unstressed_volume_mL,
        }
    }

    /// Pulmonary venous outflow into the left atrium.
    pub fn venous_outflow(&self, state: &PulmonaryState, la_pressure_mmHg: f64) -> f64 {
        (state.venous_pressure_mmHg - la_pressure_mmHg) / self.params.veins.resistance_mmHg_s_per_mL
    }

    pub fn compute_derivatives(&self, state: &PulmonaryState, inputs: &PulmonaryInputs) -> (PulmonaryState, PulmonaryOutputs) {
        let p = &self.params;
        let d_thor = inputs.thoracic_pressure_rate_mmHg_per_s;

        let (arterial_flow, arterial_flow_rate) = artery::arterial_outflow(
            &p.artery,
            state.arterial_flow_mL_per_s,
            state.arterial_pressure_mmHg,
            state.capillary_pressure_mmHg,
        );
        let gradient = state.capillary_pressure_mmHg - state.venous_pressure_mmHg;
        let capillary_flow = gradient / p.capillaries.resistance_mmHg_s_per_mL;
        let shunt_flow = gradient / self.shunt_resistance_mmHg_s_per_mL;
        let venous_flow = self.venous_outflow(state, inputs.la_pressure_mmHg);

        let rates = PulmonaryState {
            arterial_pressure_mmHg: (inputs.pulmonary_valve_flow_mL_per_s - arterial_flow)
                / p.artery.compliance_mL_per_mmHg
                + d_thor,
            arterial_flow_mL_per_s: arterial_flow_rate,
            capillary_pressure_mmHg: (arterial_flow - capillary_flow - shunt_flow) / self.capillary_compliance_mL_per_mmHg
                + d_thor,
            venous_pressure_mmHg: (capillary_flow + shunt_flow - venous_flow) / p.veins.compliance_mL_per_mmHg + d_thor,
        };

        let outputs = PulmonaryOutputs {
            arterial_flow_mL_per_s: arterial_flow,
            capillary_flow_mL_per_s: capillary_flow,
            shunt_flow_mL_per_s: shunt_flow,
            venous_flow_mL_per_s: venous_flow,
            volumes: self.volumes(state, inputs.thoracic_pressure_mmHg),
        };

        (rates, outputs)
    }

    /// Pin the arterial flow state to its algebraic value in the RC model.
    pub fn hold_algebraic(&self, state: &mut PulmonaryState) {
        if let Some(flow) = artery::algebraic_flow(
            &self.params.artery,
            state.arterial_pressure_mmHg,
            state.capillary_pressure_mmHg,
        ) {
            state.arterial_flow_mL_per_s = flow;
        }
    }
}
