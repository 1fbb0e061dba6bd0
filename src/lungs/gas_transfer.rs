//! Dead-space and alveolar gas balance, capillary equilibration and
//! arterial mixing with the shunt.
//!
//! Fractions are dry-gas fractions; blood contents are mL gas (STPD) per
//! mL blood. Airflows arrive in L/s and blood flows in mL/s.
//!
//! Reference: Albanese 2016, Eq 11-17

use serde::{Deserialize, Serialize};

use super::dissociation::Dissociation;
use crate::config::LungGasParameters;
use crate::gas::GasPair;
use crate::simulation::integrator::impl_integrate;

/// Combined pulmonary flow below which the arterial blood is taken as
/// end-capillary blood (mL/s)
const MIN_MIXING_FLOW: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LungGasState {
    pub dead_space_o2_fraction: f64,
    pub dead_space_co2_fraction: f64,
    pub alveolar_o2_fraction: f64,
    pub alveolar_co2_fraction: f64,
}

impl_integrate!(LungGasState {
    dead_space_o2_fraction,
    dead_space_co2_fraction,
    alveolar_o2_fraction,
    alveolar_co2_fraction,
});

impl LungGasState {
    /// Clamp every fraction into [0, 1]; true if any value moved.
    pub fn clamp_fractions(&mut self) -> bool {
        let mut clamped = false;
        for f in [
            &mut self.dead_space_o2_fraction,
            &mut self.dead_space_co2_fraction,
            &mut self.alveolar_o2_fraction,
            &mut self.alveolar_co2_fraction,
        ] {
            let bounded = f.clamp(0.0, 1.0);
            clamped |= bounded != *f;
            *f = bounded;
        }
        clamped
    }

    fn dead_space(&self) -> GasPair {
        GasPair {
            o2: self.dead_space_o2_fraction,
            co2: self.dead_space_co2_fraction,
        }
    }

    fn alveolar(&self) -> GasPair {
        GasPair {
            o2: self.alveolar_o2_fraction,
            co2: self.alveolar_co2_fraction,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GasTransferInputs {
    pub mouth_flow_L_per_s: f64,
    pub alveolar_flow_L_per_s: f64,
    pub dead_space_volume_L: f64,
    pub alveolar_volume_L: f64,
    pub capillary_flow_mL_per_s: f64,
    pub shunt_flow_mL_per_s: f64,
    /// Mixed-venous content entering the lungs
    pub mixed_venous: GasPair,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct GasTransferOutputs {
    /// Alveolar partial pressures (mmHg)
    pub alveolar_pressure: GasPair,
    /// End-capillary content, equilibrated with alveolar gas
    pub end_capillary: GasPair,
    pub arterial_content: GasPair,
    /// Arterial partial pressures (mmHg)
    pub arterial_pressure: GasPair,
    pub sao2_percent: f64,
    /// O2 uptake and CO2 release across the membrane (mL/s STPD)
    pub exchange_mL_per_s: GasPair,
}

#[derive(Debug, Clone)]
pub struct GasTransfer {
    params: LungGasParameters,
    dissociation: Dissociation,
}

impl GasTransfer {
    pub fn new(params: &LungGasParameters) -> Self {
        Self {
            params: params.clone(),
            dissociation: Dissociation::new(params),
        }
    }

    pub fn dissociation(&self) -> &Dissociation {
        &self.dissociation
    }

    /// Dry-gas pressure available to the alveolar fractions (mmHg)
    pub fn dry_pressure_mmHg(&self) -> f64 {
        self.params.atmospheric_pressure_mmHg - self.params.water_vapour_pressure_mmHg
    }

    pub fn compute_derivatives(&self, state: &LungGasState, inputs: &GasTransferInputs) -> (LungGasState, GasTransferOutputs) {
        let p = &self.params;
        let dry = self.dry_pressure_mmHg();
        let alveolar_pressure = state.alveolar().map(|f| f * dry);
        let end_capillary = self.dissociation.content(alveolar_pressure);
        let cv = inputs.mixed_venous;

        let qpp = inputs.capillary_flow_mL_per_s;
        let qps = inputs.shunt_flow_mL_per_s;
        let total = qpp + qps;
        let arterial_content = if total > MIN_MIXING_FLOW {
            end_capillary.zip(cv, |cpp, cv| (qpp * cpp + qps * cv) / total)
        } else {
            end_capillary
        };
        let arterial_pressure = self.dissociation.partial_pressures(arterial_content);

        // Gas crossing the membrane, converted to BTPS litres per second
        let exchange = end_capillary.zip(cv, |cpp, cv| qpp * (cpp - cv));
        let exchange_btps = exchange.map(|e| p.btps_factor * e / 1000.0);

        let inspired = GasPair {
            o2: p.inspired_o2_fraction,
            co2: p.inspired_co2_fraction,
        };
        let fd = state.dead_space();
        let fa = state.alveolar();
        let vd = inputs.dead_space_volume_L;
        let va = inputs.alveolar_volume_L;
        let v_mouth = inputs.mouth_flow_L_per_s;
        let v_alv = inputs.alveolar_flow_L_per_s;

        let rate = |fi: f64, fd: f64, fa: f64, uptake: f64| -> (f64, f64) {
            if v_mouth >= 0.0 {
                (v_mouth * (fi - fd) / vd, (v_alv.max(0.0) * (fd - fa) - uptake) / va)
            } else {
                (v_alv.min(0.0) * (fd - fa) / vd, -uptake / va)
            }
        };
        let (d_fd_o2, d_fa_o2) = rate(inspired.o2, fd.o2, fa.o2, exchange_btps.o2);
        let (d_fd_co2, d_fa_co2) = rate(inspired.co2, fd.co2, fa.co2, exchange_btps.co2);

        let rates = LungGasState {
            dead_space_o2_fraction: d_fd_o2,
            dead_space_co2_fraction: d_fd_co2,
            alveolar_o2_fraction: d_fa_o2,
            alveolar_co2_fraction: d_fa_co2,
        };

        let outputs = GasTransferOutputs {
            alveolar_pressure,
            end_capillary,
            arterial_content,
            arterial_pressure,
            sao2_percent: self.dissociation.saturation_percent(arterial_content.o2, arterial_pressure.o2),
            exchange_mL_per_s: GasPair {
                o2: exchange.o2,
                co2: -exchange.co2,
            },
        };

        (rates, outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rest_state() -> LungGasState {
        LungGasState {
            dead_space_o2_fraction: 0.2008,
            dead_space_co2_fraction: 0.0119,
            alveolar_o2_fraction: 0.1441,
            alveolar_co2_fraction: 0.0569,
        }
    }

    fn inputs(mouth_flow: f64) -> GasTransferInputs {
        GasTransferInputs {
            mouth_flow_L_per_s: mouth_flow,
            alveolar_flow_L_per_s: mouth_flow,
            dead_space_volume_L: 0.15,
            alveolar_volume_L: 2.25,
            capillary_flow_mL_per_s: 96.0,
            shunt_flow_mL_per_s: 1.66,
            mixed_venous: GasPair { o2: 0.147, co2: 0.5195 },
        }
    }

    #[test]
    fn test_rest_blood_gases_physiological() {
        let gt = GasTransfer::new(&LungGasParameters::default());
        let (_, out) = gt.compute_derivatives(&rest_state(), &inputs(0.3));
        assert!(out.arterial_pressure.o2 > 85.0 && out.arterial_pressure.o2 < 110.0, "PaO2 {}", out.arterial_pressure.o2);
        assert!(out.arterial_pressure.co2 > 35.0 && out.arterial_pressure.co2 < 45.0, "PaCO2 {}", out.arterial_pressure.co2);
        assert!(out.exchange_mL_per_s.o2 > 0.0, "lungs should take up O2");
        assert!(out.exchange_mL_per_s.co2 > 0.0, "lungs should release CO2");
    }

    #[test]
    fn test_shunt_lowers_arterial_o2() {
        let gt = GasTransfer::new(&LungGasParameters::default());
        let (_, out) = gt.compute_derivatives(&rest_state(), &inputs(0.3));
        assert!(out.arterial_content.o2 < out.end_capillary.o2);
    }

    #[test]
    fn test_inspiration_freshens_dead_space() {
        let gt = GasTransfer::new(&LungGasParameters::default());
        let (rates, _) = gt.compute_derivatives(&rest_state(), &inputs(0.3));
        assert!(rates.dead_space_o2_fraction > 0.0);
        assert!(rates.dead_space_co2_fraction < 0.0);
    }

    #[test]
    fn test_expiration_washes_dead_space_with_alveolar_gas() {
        let gt = GasTransfer::new(&LungGasParameters::default());
        let (rates, _) = gt.compute_derivatives(&rest_state(), &inputs(-0.3));
        assert!(rates.dead_space_o2_fraction < 0.0);
        assert!(rates.dead_space_co2_fraction > 0.0);
    }

    #[test]
    fn test_clamp_keeps_fractions_in_unit_interval() {
        let mut state = rest_state();
        state.alveolar_o2_fraction = 1.2;
        state.dead_space_co2_fraction = -0.01;
        state.clamp_fractions();
        assert_eq!(state.alveolar_o2_fraction, 1.0);
        assert_eq!(state.dead_space_co2_fraction, 0.0);
    }
}
