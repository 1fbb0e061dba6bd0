//! Venous gas transport: each bed's venous pool mixes with the blood
//! leaving its tissue, and the thoracic veins mix all beds into the
//! mixed-venous pool that returns to the lungs.

use serde::{Deserialize, Serialize};

use super::tissue::TissueGasState;
use crate::gas::GasPair;
use crate::simulation::integrator::impl_integrate;
use crate::state::BedSet;

/// Smallest mixing volume (mL)
const MIN_MIXING_VOLUME: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VenousGasState {
    pub o2: BedSet<f64>,
    pub co2: BedSet<f64>,
    pub mixed_o2: f64,
    pub mixed_co2: f64,
}

impl_integrate!(VenousGasState { o2, co2, mixed_o2, mixed_co2 });

impl VenousGasState {
    pub fn mixed_venous(&self) -> GasPair {
        GasPair {
            o2: self.mixed_o2,
            co2: self.mixed_co2,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct VenousGasInputs {
    pub tissue: TissueGasState,
    pub peripheral_flow_mL_per_s: BedSet<f64>,
    pub venous_flow_mL_per_s: BedSet<f64>,
    pub venous_volume_mL: BedSet<f64>,
    pub thoracic_vein_volume_mL: f64,
}

#[derive(Debug, Clone, Default)]
pub struct VenousGas;

impl VenousGas {
    pub fn compute_derivatives(&self, state: &VenousGasState, inputs: &VenousGasInputs) -> VenousGasState {
        let inflow = inputs.peripheral_flow_mL_per_s.map(|_, q| q.max(0.0));
        let outflow = inputs.venous_flow_mL_per_s.map(|_, q| q.max(0.0));
        let volume = inputs.venous_volume_mL.map(|_, v| v.max(MIN_MIXING_VOLUME));
        let thoracic = inputs.thoracic_vein_volume_mL.max(MIN_MIXING_VOLUME);

        let mut mixed_o2 = 0.0;
        let mut mixed_co2 = 0.0;
        for (bed, q) in outflow.iter() {
            mixed_o2 += q * (state.o2[bed] - state.mixed_o2);
            mixed_co2 += q * (state.co2[bed] - state.mixed_co2);
        }

        VenousGasState {
            o2: BedSet::from_fn(|bed| inflow[bed] * (inputs.tissue.o2[bed] - state.o2[bed]) / volume[bed]),
            co2: BedSet::from_fn(|bed| inflow[bed] * (inputs.tissue.co2[bed] - state.co2[bed]) / volume[bed]),
            mixed_o2: mixed_o2 / thoracic,
            mixed_co2: mixed_co2 / thoracic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(tissue: TissueGasState) -> VenousGasInputs {
        VenousGasInputs {
            tissue,
            peripheral_flow_mL_per_s: BedSet::from_fn(|_| 10.0),
            venous_flow_mL_per_s: BedSet::from_fn(|_| 10.0),
            venous_volume_mL: BedSet::from_fn(|_| 200.0),
            thoracic_vein_volume_mL: 200.0,
        }
    }

    #[test]
    fn test_uniform_contents_are_steady() {
        let tissue = TissueGasState {
            o2: BedSet::from_fn(|_| 0.15),
            co2: BedSet::from_fn(|_| 0.52),
        };
        let state = VenousGasState {
            o2: tissue.o2,
            co2: tissue.co2,
            mixed_o2: 0.15,
            mixed_co2: 0.52,
        };
        let rates = VenousGas.compute_derivatives(&state, &inputs(tissue));
        assert!(rates.o2.sum().abs() < 1e-15);
        assert!(rates.mixed_o2.abs() < 1e-15);
        assert!(rates.mixed_co2.abs() < 1e-15);
    }

    #[test]
    fn test_mixed_pool_moves_toward_flow_weighted_mean() {
        let tissue = TissueGasState {
            o2: BedSet::from_fn(|_| 0.10),
            co2: BedSet::from_fn(|_| 0.55),
        };
        let state = VenousGasState {
            o2: tissue.o2,
            co2: tissue.co2,
            mixed_o2: 0.15,
            mixed_co2: 0.50,
        };
        let rates = VenousGas.compute_derivatives(&state, &inputs(tissue));
        assert!(rates.mixed_o2 < 0.0);
        assert!(rates.mixed_co2 > 0.0);
    }

    #[test]
    fn test_reverse_flow_does_not_mix() {
        let tissue = TissueGasState {
            o2: BedSet::from_fn(|_| 0.10),
            co2: BedSet::from_fn(|_| 0.55),
        };
        let state = VenousGasState::default();
        let mut inp = inputs(tissue);
        inp.peripheral_flow_mL_per_s = BedSet::from_fn(|_| -5.0);
        inp.venous_flow_mL_per_s = BedSet::from_fn(|_| -5.0);
        let rates = VenousGas.compute_derivatives(&state, &inp);
        assert_eq!(rates.o2.sum(), 0.0);
        assert_eq!(rates.mixed_o2, 0.0);
    }
}
