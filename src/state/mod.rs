//! State management for the cardiopulmonary simulation.
//!
//! [`SimulationState`] aggregates one explicit state struct per component.
//! Flows and other algebraic quantities are never stored here; they are
//! recomputed from the state every step.

mod beds;
mod metrics;

pub use beds::{Bed, BedSet};
pub use metrics::{PhysiologicalMode, VitalSigns, VitalStatus};

use serde::{Deserialize, Serialize};

use crate::config::Parameters;
use crate::control::{ControlState, ControlSystem};
use crate::gas::{TissueGasState, VenousGasState};
use crate::heart::HeartState;
use crate::lungs::{LungGasState, LungState};
use crate::pulmonary::PulmonaryState;
use crate::simulation::integrator::impl_integrate;
use crate::systemic::SystemicState;

/// Complete model state
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SimulationState {
    pub heart: HeartState,
    pub systemic: SystemicState,
    pub pulmonary: PulmonaryState,
    pub lungs: LungState,
    pub lung_gas: LungGasState,
    pub tissue_gas: TissueGasState,
    pub venous_gas: VenousGasState,
    pub control: ControlState,
}

impl_integrate!(SimulationState {
    heart,
    systemic,
    pulmonary,
    lungs,
    lung_gas,
    tissue_gas,
    venous_gas,
    control,
});

impl SimulationState {
    /// Resting steady state of the default parameter set at 75 bpm, taken
    /// at end-diastole and end-expiration after 30 s of settling.
    pub fn rest(params: &Parameters) -> Self {
        let tissue_o2 = BedSet {
            splanchnic: 0.123,
            extrasplanchnic: 0.185,
            active_muscle: 0.149,
            resting_muscle: 0.149,
            brain: 0.133,
            coronary: 0.100,
        };
        let tissue_co2 = BedSet {
            splanchnic: 0.540,
            extrasplanchnic: 0.489,
            active_muscle: 0.518,
            resting_muscle: 0.518,
            brain: 0.532,
            coronary: 0.559,
        };
        // Heart rate only affects the control nominal period, not its rest state
        let control = ControlSystem::new(params, 75.0).rest_state();

        Self {
            heart: HeartState {
                lv_volume_mL: 113.0,
                rv_volume_mL: 122.8,
                la_pressure_mmHg: 6.23,
                ra_pressure_mmHg: 4.12,
                cardiac_phase: 0.0,
                power_mmHg_mL_per_s: 11_453.0,
            },
            systemic: SystemicState {
                arterial_pressure_mmHg: 90.2,
                arterial_flow_mL_per_s: 5.75,
                peripheral_pressure_mmHg: 89.87,
                splanchnic_venous_pressure_mmHg: 7.51,
                active_muscle_venous_volume_mL: 275.3,
                resting_muscle_venous_pressure_mmHg: 7.44,
                brain_venous_pressure_mmHg: 7.53,
                coronary_venous_pressure_mmHg: 7.35,
                thoracic_vein_volume_mL: 204.8,
            },
            pulmonary: PulmonaryState {
                arterial_pressure_mmHg: 10.84,
                arterial_flow_mL_per_s: 5.87,
                capillary_pressure_mmHg: 10.71,
                venous_pressure_mmHg: 6.33,
            },
            lungs: LungState::end_expiration(&params.lung_mechanics),
            lung_gas: LungGasState {
                dead_space_o2_fraction: 0.2008,
                dead_space_co2_fraction: 0.0119,
                alveolar_o2_fraction: 0.1441,
                alveolar_co2_fraction: 0.0569,
            },
            tissue_gas: TissueGasState {
                o2: tissue_o2,
                co2: tissue_co2,
            },
            venous_gas: VenousGasState {
                o2: tissue_o2,
                co2: tissue_co2,
                mixed_o2: 0.147,
                mixed_co2: 0.5195,
            },
            control,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::integrator::Integrate;

    #[test]
    fn test_rest_state_is_finite() {
        let state = SimulationState::rest(&Parameters::default());
        assert!(state.is_finite());
    }

    #[test]
    fn test_non_finite_component_is_named() {
        let mut state = SimulationState::rest(&Parameters::default());
        state.pulmonary.venous_pressure_mmHg = f64::NAN;
        assert_eq!(state.first_non_finite().as_deref(), Some("pulmonary.venous_pressure_mmHg"));
    }
}
