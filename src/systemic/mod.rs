//! Systemic circulation: RLC artery, six parallel peripheral beds on one
//! pressure node, six venous beds, and the thoracic veins returning blood
//! to the right atrium.
//!
//! The extrasplanchnic venous volume is never integrated. It closes the
//! blood-volume balance: `Vev = TBV − Σ(all other compartment volumes)`.
//!
//! References:
//! - Ursino M. Am J Physiol 1998;275:H1733-H1747
//! - Magosso E, Ursino M. Am J Physiol 2002;283:H2123-H2137
//! - Albanese A et al. Ann Biomed Eng 2016;44:3209-3229

pub mod artery;
pub mod muscle_pump;
pub mod thoracic_veins;

use serde::{Deserialize, Serialize};

use crate::config::{ArteryParameters, MuscleVeinResistance, SystemicParameters};
use crate::simulation::integrator::impl_integrate;
use crate::state::{Bed, BedSet};

pub use muscle_pump::intramuscular_pressure;

/// Systemic state variables
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SystemicState {
    pub arterial_pressure_mmHg: f64,
    /// Inertial arterial outflow (RLC model)
    pub arterial_flow_mL_per_s: f64,
    /// Shared peripheral node pressure
    pub peripheral_pressure_mmHg: f64,
    pub splanchnic_venous_pressure_mmHg: f64,
    pub active_muscle_venous_volume_mL: f64,
    pub resting_muscle_venous_pressure_mmHg: f64,
    pub brain_venous_pressure_mmHg: f64,
    pub coronary_venous_pressure_mmHg: f64,
    pub thoracic_vein_volume_mL: f64,
}

impl_integrate!(SystemicState {
    arterial_pressure_mmHg,
    arterial_flow_mL_per_s,
    peripheral_pressure_mmHg,
    splanchnic_venous_pressure_mmHg,
    active_muscle_venous_volume_mL,
    resting_muscle_venous_pressure_mmHg,
    brain_venous_pressure_mmHg,
    coronary_venous_pressure_mmHg,
    thoracic_vein_volume_mL,
});

#[derive(Debug, Clone, Copy)]
pub struct SystemicInputs {
    pub aortic_flow_mL_per_s: f64,
    pub ra_pressure_mmHg: f64,
    pub thoracic_pressure_mmHg: f64,
    pub abdominal_pressure_mmHg: f64,
    pub intramuscular_pressure_mmHg: f64,
    /// Peripheral resistances after neural and local control
    pub peripheral_resistance: BedSet<f64>,
    /// Venous unstressed volumes after neural control
    pub venous_unstressed_mL: BedSet<f64>,
    /// dVu/dt of the pressure-integrated venous beds
    pub venous_unstressed_rate_mL_per_s: BedSet<f64>,
    /// Blood outside the systemic circuit (heart chambers, lungs)
    pub external_volume_mL: f64,
}

/// Compartment volumes, including the closure volume
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SystemicVolumes {
    pub arterial_mL: f64,
    pub peripheral_mL: BedSet<f64>,
    pub venous_mL: BedSet<f64>,
    pub thoracic_vein_mL: f64,
}

impl SystemicVolumes {
    pub fn total_mL(&self) -> f64 {
        self.arterial_mL + self.peripheral_mL.sum() + self.venous_mL.sum() + self.thoracic_vein_mL
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SystemicOutputs {
    pub arterial_flow_mL_per_s: f64,
    pub peripheral_flow_mL_per_s: BedSet<f64>,
    pub venous_flow_mL_per_s: BedSet<f64>,
    pub venous_pressure_mmHg: BedSet<f64>,
    pub thoracic_vein_pressure_mmHg: f64,
    /// Thoracic vein outflow into the right atrium
    pub venous_return_mL_per_s: f64,
    pub volumes: SystemicVolumes,
}

#[derive(Debug, Clone)]
pub struct SystemicCirculation {
    params: SystemicParameters,
    peripheral_compliance_mL_per_mmHg: f64,
}

impl SystemicCirculation {
    pub fn new(params: &SystemicParameters) -> Self {
        Self {
            params: params.clone(),
            peripheral_compliance_mL_per_mmHg: params.peripheral.map(|_, c| c.compliance_mL_per_mmHg).sum(),
        }
    }

    pub fn params(&self) -> &SystemicParameters {
        &self.params
    }

    pub fn artery(&self) -> &ArteryParameters {
        &self.params.artery
    }

    /// Nominal peripheral resistances, before any control
    pub fn nominal_resistance(&self) -> BedSet<f64> {
        self.params.peripheral.map(|_, c| c.resistance_mmHg_s_per_mL)
    }

    /// Nominal venous unstressed volumes, before any control
    pub fn nominal_unstressed_volume(&self) -> BedSet<f64> {
        self.params.venous.map(|_, c| c.unstressed_volume_mL)
    }

    /// Every systemic volume; the extrasplanchnic vein takes whatever blood
    /// the rest of the circulation does not hold.
    pub fn volumes(&self, state: &SystemicState, venous_unstressed: &BedSet<f64>, external_mL: f64) -> SystemicVolumes {
        let p = &self.params;
        let arterial = p.artery.compliance_mL_per_mmHg * state.arterial_pressure_mmHg + p.artery.unstressed_volume_mL;
        let peripheral = p
            .peripheral
            .map(|_, c| c.compliance_mL_per_mmHg * state.peripheral_pressure_mmHg + c.unstressed_volume_mL);
        let linear = |bed: Bed, pressure: f64| p.venous[bed].compliance_mL_per_mmHg * pressure + venous_unstressed[bed];

        let mut venous = BedSet {
            splanchnic: linear(Bed::Splanchnic, state.splanchnic_venous_pressure_mmHg),
            extrasplanchnic: 0.0,
            active_muscle: state.active_muscle_venous_volume_mL,
            resting_muscle: linear(Bed::RestingMuscle, state.resting_muscle_venous_pressure_mmHg),
            brain: linear(Bed::Brain, state.brain_venous_pressure_mmHg),
            coronary: linear(Bed::Coronary, state.coronary_venous_pressure_mmHg),
        };
        let held = arterial + peripheral.sum() + venous.sum() + state.thoracic_vein_volume_mL + external_mL;
        venous.extrasplanchnic = p.total_blood_volume_mL - held;

        SystemicVolumes {
            arterial_mL: arterial,
            peripheral_mL: peripheral,
            venous_mL: venous,
            thoracic_vein_mL: state.thoracic_vein_volume_mL,
        }
    }

    /// Active-muscle venous pressure with the collapsing branch below Vu.
    pub fn active_muscle_venous_pressure(&self, volume_mL: f64, unstressed_mL: f64, intramuscular_mmHg: f64) -> f64 {
        let p = &self.params;
        let compliance = p.venous.active_muscle.compliance_mL_per_mmHg;
        if volume_mL >= unstressed_mL {
            intramuscular_mmHg + (volume_mL - unstressed_mL) / compliance
        } else {
            let v = volume_mL.max(0.1 * unstressed_mL);
            intramuscular_mmHg + p.active_muscle_vein.collapse_pressure_mmHg * (1.0 - (v / unstressed_mL).powf(-1.5))
        }
    }

    fn venous_resistance(&self, bed: Bed, state: &SystemicState, unstressed: &BedSet<f64>) -> f64 {
        let p = &self.params;
        match (bed, p.active_muscle_vein.resistance_model) {
            (Bed::ActiveMuscle, MuscleVeinResistance::VolumeDependent) => {
                p.active_muscle_vein.volume_resistance_coefficient_mmHg_s
                    / state.active_muscle_venous_volume_mL.max(0.1 * unstressed[Bed::ActiveMuscle])
            }
            _ => p.venous[bed].resistance_mmHg_s_per_mL,
        }
    }

    pub fn thoracic_vein_pressure(&self, state: &SystemicState, thoracic_pressure_mmHg: f64) -> f64 {
        thoracic_pressure_mmHg
            + thoracic_veins::transmural_pressure(&self.params.thoracic_veins, state.thoracic_vein_volume_mL)
    }

    /// Thoracic vein outflow into the right atrium.
    pub fn venous_return(&self, state: &SystemicState, thoracic_pressure_mmHg: f64, ra_pressure_mmHg: f64) -> f64 {
        let ptv = self.thoracic_vein_pressure(state, thoracic_pressure_mmHg);
        (ptv - ra_pressure_mmHg) / thoracic_veins::resistance(&self.params.thoracic_veins, state.thoracic_vein_volume_mL)
    }

    pub fn compute_derivatives(&self, state: &SystemicState, inputs: &SystemicInputs) -> (SystemicState, SystemicOutputs) {
        let p = &self.params;
        let vu = &inputs.venous_unstressed_mL;
        let volumes = self.volumes(state, vu, inputs.external_volume_mL);

        let ev = &p.venous.extrasplanchnic;
        let venous_pressure = BedSet {
            splanchnic: state.splanchnic_venous_pressure_mmHg,
            extrasplanchnic: (volumes.venous_mL.extrasplanchnic - vu.extrasplanchnic) / ev.compliance_mL_per_mmHg,
            active_muscle: self.active_muscle_venous_pressure(
                state.active_muscle_venous_volume_mL,
                vu.active_muscle,
                inputs.intramuscular_pressure_mmHg,
            ),
            resting_muscle: state.resting_muscle_venous_pressure_mmHg,
            brain: state.brain_venous_pressure_mmHg,
            coronary: state.coronary_venous_pressure_mmHg,
        };

        let ptv = self.thoracic_vein_pressure(state, inputs.thoracic_pressure_mmHg);
        let venous_return = self.venous_return(state, inputs.thoracic_pressure_mmHg, inputs.ra_pressure_mmHg);

        let (arterial_flow, arterial_flow_rate) = artery::arterial_outflow(
            &p.artery,
            state.arterial_flow_mL_per_s,
            state.arterial_pressure_mmHg,
            state.peripheral_pressure_mmHg,
        );

        let peripheral_flow = BedSet::from_fn(|bed| {
            (state.peripheral_pressure_mmHg - venous_pressure[bed]) / inputs.peripheral_resistance[bed]
        });

        // Starling resistor: veins drain against the larger of the thoracic
        // vein pressure and their surrounding pressure.
        let venous_flow = BedSet::from_fn(|bed| {
            let surrounding = if bed == Bed::Splanchnic {
                inputs.abdominal_pressure_mmHg
            } else {
                0.0
            };
            (venous_pressure[bed] - ptv.max(surrounding)) / self.venous_resistance(bed, state, vu)
        });

        let pressure_rate = |bed: Bed| {
            (peripheral_flow[bed] - venous_flow[bed] - inputs.venous_unstressed_rate_mL_per_s[bed])
                / p.venous[bed].compliance_mL_per_mmHg
        };

        let rates = SystemicState {
            arterial_pressure_mmHg: (inputs.aortic_flow_mL_per_s - arterial_flow) / p.artery.compliance_mL_per_mmHg,
            arterial_flow_mL_per_s: arterial_flow_rate,
            peripheral_pressure_mmHg: (arterial_flow - peripheral_flow.sum()) / self.peripheral_compliance_mL_per_mmHg,
            splanchnic_venous_pressure_mmHg: pressure_rate(Bed::Splanchnic),
            active_muscle_venous_volume_mL: peripheral_flow.active_muscle - venous_flow.active_muscle,
            resting_muscle_venous_pressure_mmHg: pressure_rate(Bed::RestingMuscle),
            brain_venous_pressure_mmHg: pressure_rate(Bed::Brain),
            coronary_venous_pressure_mmHg: pressure_rate(Bed::Coronary),
            thoracic_vein_volume_mL: venous_flow.sum() - venous_return,
        };

        let outputs = SystemicOutputs {
            arterial_flow_mL_per_s: arterial_flow,
            peripheral_flow_mL_per_s: peripheral_flow,
            venous_flow_mL_per_s: venous_flow,
            venous_pressure_mmHg: venous_pressure,
            thoracic_vein_pressure_mmHg: ptv,
            venous_return_mL_per_s: venous_return,
            volumes,
        };

        (rates, outputs)
    }

    /// Pin the arterial flow state to its algebraic value in the RC model.
    pub fn hold_algebraic(&self, state: &mut SystemicState) {
        if let Some(flow) = artery::algebraic_flow(
            &self.params.artery,
            state.arterial_pressure_mmHg,
            state.peripheral_pressure_mmHg,
        ) {
            state.arterial_flow_mL_per_s = flow;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rest_state() -> SystemicState {
        SystemicState {
            arterial_pressure_mmHg: 90.2,
            arterial_flow_mL_per_s: 5.75,
            peripheral_pressure_mmHg: 89.87,
            splanchnic_venous_pressure_mmHg: 7.51,
            active_muscle_venous_volume_mL: 275.3,
            resting_muscle_venous_pressure_mmHg: 7.44,
            brain_venous_pressure_mmHg: 7.53,
            coronary_venous_pressure_mmHg: 7.35,
            thoracic_vein_volume_mL: 204.8,
        }
    }

    fn inputs(sys: &SystemicCirculation) -> SystemicInputs {
        SystemicInputs {
            aortic_flow_mL_per_s: 0.0,
            ra_pressure_mmHg: 4.1,
            thoracic_pressure_mmHg: -3.68,
            abdominal_pressure_mmHg: 0.0,
            intramuscular_pressure_mmHg: 0.0,
            peripheral_resistance: sys.nominal_resistance(),
            venous_unstressed_mL: sys.nominal_unstressed_volume(),
            venous_unstressed_rate_mL_per_s: BedSet::default(),
            external_volume_mL: 1100.0,
        }
    }

    #[test]
    fn test_closure_conserves_total_volume() {
        let sys = SystemicCirculation::new(&SystemicParameters::default());
        let state = rest_state();
        let v = sys.volumes(&state, &sys.nominal_unstressed_volume(), 700.0);
        let total = v.total_mL() + 700.0;
        assert!((total - 5000.0).abs() < 1e-9, "total {}", total);
        assert!(v.venous_mL.extrasplanchnic > 0.0);
    }

    #[test]
    fn test_linear_compartment_round_trip() {
        let params = SystemicParameters::default();
        for (bed, c) in params.venous.iter() {
            let p = 7.5;
            let v = c.compliance_mL_per_mmHg * p + c.unstressed_volume_mL;
            let back = (v - c.unstressed_volume_mL) / c.compliance_mL_per_mmHg;
            assert!((back - p).abs() < 1e-12, "{:?}", bed);
        }
    }

    #[test]
    fn test_flows_run_downhill() {
        let sys = SystemicCirculation::new(&SystemicParameters::default());
        let (_, out) = sys.compute_derivatives(&rest_state(), &inputs(&sys));
        for (bed, q) in out.peripheral_flow_mL_per_s.iter() {
            assert!(*q > 0.0, "{:?} peripheral flow {}", bed, q);
        }
        assert!(out.venous_return_mL_per_s > 0.0);
        let total = out.peripheral_flow_mL_per_s.sum();
        assert!(total > 60.0 && total < 120.0, "peripheral flow {:.1} mL/s", total);
    }

    #[test]
    fn test_abdominal_pressure_limits_splanchnic_drainage() {
        let sys = SystemicCirculation::new(&SystemicParameters::default());
        let mut inp = inputs(&sys);
        let (_, free) = sys.compute_derivatives(&rest_state(), &inp);
        inp.abdominal_pressure_mmHg = 9.0;
        let (_, squeezed) = sys.compute_derivatives(&rest_state(), &inp);
        assert!(squeezed.venous_flow_mL_per_s.splanchnic < free.venous_flow_mL_per_s.splanchnic);
        assert_eq!(squeezed.venous_flow_mL_per_s.brain, free.venous_flow_mL_per_s.brain);
    }

    #[test]
    fn test_muscle_vein_collapse_branch_continuous() {
        let sys = SystemicCirculation::new(&SystemicParameters::default());
        let vu = 228.17;
        let below = sys.active_muscle_venous_pressure(vu - 1e-6, vu, 0.0);
        let above = sys.active_muscle_venous_pressure(vu + 1e-6, vu, 0.0);
        assert!((below - above).abs() < 1e-4);
        assert!(sys.active_muscle_venous_pressure(0.5 * vu, vu, 0.0) < 0.0);
    }

    #[test]
    fn test_muscle_pump_squeezes_active_vein() {
        let sys = SystemicCirculation::new(&SystemicParameters::default());
        let mut inp = inputs(&sys);
        let (_, relaxed) = sys.compute_derivatives(&rest_state(), &inp);
        inp.intramuscular_pressure_mmHg = 40.0;
        let (rates, squeezed) = sys.compute_derivatives(&rest_state(), &inp);
        assert!(squeezed.venous_flow_mL_per_s.active_muscle > relaxed.venous_flow_mL_per_s.active_muscle);
        assert!(rates.active_muscle_venous_volume_mL < 0.0);
    }
}
