//! Per-bed tissue O2/CO2 mass balance.
//!
//! Each bed's tissue and its capillary blood form one well-mixed pool that
//! exchanges with arterial inflow and consumes O2 / produces CO2.
//!
//! Reference: Magosso & Ursino 2002, Eq 20-21

use serde::{Deserialize, Serialize};

use crate::config::TissueGasParameters;
use crate::gas::GasPair;
use crate::simulation::integrator::impl_integrate;
use crate::state::{Bed, BedSet};

/// Tissue O2 and CO2 contents (mL/mL)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TissueGasState {
    pub o2: BedSet<f64>,
    pub co2: BedSet<f64>,
}

impl_integrate!(TissueGasState { o2, co2 });

/// Metabolic O2 use and CO2 production per bed (mL/s STPD)
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct MetabolicRates {
    pub o2_mL_per_s: BedSet<f64>,
    pub co2_mL_per_s: BedSet<f64>,
}

impl MetabolicRates {
    /// Whole-body O2 consumption (mL/min)
    pub fn total_o2_mL_per_min(&self) -> f64 {
        self.o2_mL_per_s.sum() * 60.0
    }

    pub fn total_co2_mL_per_min(&self) -> f64 {
        self.co2_mL_per_s.sum() * 60.0
    }
}

/// Current metabolic rates.
///
/// Active-muscle O2 use scales with `1 + muscle_demand`, coronary O2 use with
/// the filtered cardiac power ratio. CO2 follows through each bed's
/// respiratory quotient.
pub fn metabolic_rates(params: &TissueGasParameters, power_ratio: f64, muscle_demand: f64) -> MetabolicRates {
    let o2 = params.o2_consumption_mL_per_min.map(|bed, &rest| {
        let per_s = rest / 60.0;
        match bed {
            Bed::ActiveMuscle => per_s * (1.0 + muscle_demand),
            Bed::Coronary => per_s * power_ratio,
            _ => per_s,
        }
    });
    let co2 = o2.map(|bed, &m| m * params.respiratory_quotient(bed));
    MetabolicRates {
        o2_mL_per_s: o2,
        co2_mL_per_s: co2,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TissueGasInputs {
    pub arterial_content: GasPair,
    pub peripheral_flow_mL_per_s: BedSet<f64>,
    pub peripheral_volume_mL: BedSet<f64>,
    pub rates: MetabolicRates,
}

#[derive(Debug, Clone)]
pub struct TissueGas {
    params: TissueGasParameters,
}

impl TissueGas {
    pub fn new(params: &TissueGasParameters) -> Self {
        Self { params: params.clone() }
    }

    pub fn params(&self) -> &TissueGasParameters {
        &self.params
    }

    pub fn compute_derivatives(&self, state: &TissueGasState, inputs: &TissueGasInputs) -> TissueGasState {
        let ca = inputs.arterial_content;
        let pool = |bed: Bed| (self.params.tissue_volume_mL[bed] + inputs.peripheral_volume_mL[bed]).max(1.0);
        let flow = |bed: Bed| inputs.peripheral_flow_mL_per_s[bed].max(0.0);
        TissueGasState {
            o2: BedSet::from_fn(|bed| {
                (flow(bed) * (ca.o2 - state.o2[bed]) - inputs.rates.o2_mL_per_s[bed]) / pool(bed)
            }),
            co2: BedSet::from_fn(|bed| {
                (flow(bed) * (ca.co2 - state.co2[bed]) + inputs.rates.co2_mL_per_s[bed]) / pool(bed)
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rest_rates_total_about_250_mL_per_min() {
        let rates = metabolic_rates(&TissueGasParameters::default(), 1.0, 0.0);
        let vo2 = rates.total_o2_mL_per_min();
        assert!((vo2 - 246.2).abs() < 0.1, "VO2 {}", vo2);
        assert!(rates.total_co2_mL_per_min() < vo2);
    }

    #[test]
    fn test_muscle_demand_scales_active_muscle_only() {
        let params = TissueGasParameters::default();
        let rest = metabolic_rates(&params, 1.0, 0.0);
        let work = metabolic_rates(&params, 1.0, 3.0);
        assert!((work.o2_mL_per_s.active_muscle - 4.0 * rest.o2_mL_per_s.active_muscle).abs() < 1e-12);
        assert_eq!(work.o2_mL_per_s.brain, rest.o2_mL_per_s.brain);
        let rq = params.respiratory_quotient(Bed::ActiveMuscle);
        assert!((work.co2_mL_per_s.active_muscle - rq * work.o2_mL_per_s.active_muscle).abs() < 1e-12);
    }

    #[test]
    fn test_cardiac_power_scales_coronary_use() {
        let params = TissueGasParameters::default();
        let rates = metabolic_rates(&params, 1.5, 0.0);
        assert!((rates.o2_mL_per_s.coronary - 1.5 * 24.0 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn test_no_flow_tissue_depletes_o2_and_accumulates_co2() {
        let params = TissueGasParameters::default();
        let tissue = TissueGas::new(&params);
        let state = TissueGasState {
            o2: BedSet::from_fn(|_| 0.15),
            co2: BedSet::from_fn(|_| 0.52),
        };
        let inputs = TissueGasInputs {
            arterial_content: GasPair { o2: 0.195, co2: 0.48 },
            peripheral_flow_mL_per_s: BedSet::from_fn(|_| -1.0),
            peripheral_volume_mL: BedSet::from_fn(|_| 100.0),
            rates: metabolic_rates(&params, 1.0, 0.0),
        };
        let rates = tissue.compute_derivatives(&state, &inputs);
        for (bed, d) in rates.o2.iter() {
            assert!(*d < 0.0, "{:?} should consume O2", bed);
            assert!(rates.co2[bed] > 0.0);
        }
    }
}
