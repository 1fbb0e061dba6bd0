//! Closed-loop neural, local and respiratory control.
//!
//! One step runs in two halves so the derivative function stays pure:
//! [`ControlSystem::reflex`] turns the current pressures and gases into
//! afferent and efferent firing, the driver pushes those through the
//! [`DelayBank`], and [`ControlSystem::compute_derivatives`] consumes the
//! delayed signals. [`ControlSystem::effectors`] maps the control state to
//! the parameter values the other components read.

pub mod afferent;
pub mod autoregulation;
pub mod cns;
pub mod delay;
pub mod effectors;
pub mod efferent;
pub mod exercise;
pub mod respiratory;

use serde::{Deserialize, Serialize};

use crate::config::{ControlParameters, ExerciseParameters, Parameters};
use crate::math::lag;
use crate::simulation::integrator::impl_integrate;
use crate::state::{Bed, BedSet};

pub use delay::{DelayBank, DelayLine, DelayedSignals};
pub use effectors::{parallel_resistance, Effector, EffectorSet, Effectors, Pathway};
pub use efferent::{AfferentRates, Efferent, EfferentRates};
pub use exercise::ExerciseProfile;
pub use respiratory::RespiratoryDrive;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ControlState {
    /// Baroreceptor filter y = P̃ − (τz/τp)·Psa (mmHg)
    pub baroreceptor_filter_mmHg: f64,
    pub chemoreceptor_o2: f64,
    pub chemoreceptor_co2: f64,
    pub lung_stretch_hz: f64,
    pub cns_o2_hz: f64,
    pub cns_co2_hz: f64,
    pub effectors: EffectorSet<f64>,
    pub autoregulation_o2: BedSet<f64>,
    pub autoregulation_co2: BedSet<f64>,
    pub metabolic_vasodilation: f64,
    pub muscle_demand: f64,
    /// Slow share of exercise hyperpnoea (L/min)
    pub ventilation_slow_L_per_min: f64,
    pub respiratory: RespiratoryDrive,
}

impl_integrate!(ControlState {
    baroreceptor_filter_mmHg,
    chemoreceptor_o2,
    chemoreceptor_co2,
    lung_stretch_hz,
    cns_o2_hz,
    cns_co2_hz,
    effectors,
    autoregulation_o2,
    autoregulation_co2,
    metabolic_vasodilation,
    muscle_demand,
    ventilation_slow_L_per_min,
    respiratory,
});

impl_integrate!(RespiratoryDrive {
    peripheral_amplitude_cmH2O,
    peripheral_rate_bpm,
    central_amplitude_cmH2O,
    central_rate_bpm,
});

/// Signals control reads from the rest of the model
#[derive(Debug, Clone, Copy)]
pub struct ControlInputs {
    pub arterial_pressure_mmHg: f64,
    pub pao2_mmHg: f64,
    pub paco2_mmHg: f64,
    pub lung_volume_L: f64,
    /// Per-bed venous O2 content (mL/mL)
    pub venous_o2: BedSet<f64>,
    pub intensity: f64,
}

/// Afferent and efferent firing for the current step
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ReflexOutputs {
    pub filtered_pressure_mmHg: f64,
    pub afferent: AfferentRates,
    pub efferent: EfferentRates,
}

/// Efferent firing and effector responses at nominal afferent input
#[derive(Debug, Clone, Copy)]
pub struct RestReference {
    pub efferent: EfferentRates,
    pub responses: EffectorSet<f64>,
}

/// Nominal values the effectors shift
#[derive(Debug, Clone)]
struct Nominal {
    resistance: BedSet<f64>,
    unstressed_mL: BedSet<f64>,
    lv_elastance: f64,
    rv_elastance: f64,
    heart_period_s: f64,
    respiratory_rate_bpm: f64,
    muscle_pressure_min_cmH2O: f64,
    frc_L: f64,
}

#[derive(Debug, Clone)]
pub struct ControlSystem {
    params: ControlParameters,
    exercise: ExerciseParameters,
    efferent: Efferent,
    nominal: Nominal,
    rest: RestReference,
}

impl ControlSystem {
    pub fn new(params: &Parameters, heart_rate_bpm: f64) -> Self {
        let control = &params.control;
        let efferent = Efferent::new(control);
        let rest_afferent = AfferentRates {
            baroreceptor_hz: afferent::baroreceptor_rate(&control.baroreceptor, control.baroreceptor.setpoint_mmHg),
            chemoreceptor_hz: control.chemoreceptor.nominal_rate_hz,
            lung_stretch_hz: control.lung_stretch.nominal_rate_hz,
            cns_hz: 0.0,
        };
        let rest_efferent = efferent.rates(&rest_afferent, 0.0);
        let threshold = control.sympathetic.effector_threshold_hz;
        let responses = EffectorSet::from_fn(|e| {
            e.static_response(e.dynamics(&control.effectors).gain, rest_efferent.rate(e.pathway()), threshold)
        });

        let nominal = Nominal {
            resistance: params.systemic.peripheral.map(|_, c| c.resistance_mmHg_s_per_mL),
            unstressed_mL: params.systemic.venous.map(|_, c| c.unstressed_volume_mL),
            lv_elastance: params.heart.left_ventricle.end_systolic_elastance_mmHg_per_mL,
            rv_elastance: params.heart.right_ventricle.end_systolic_elastance_mmHg_per_mL,
            heart_period_s: 60.0 / heart_rate_bpm,
            respiratory_rate_bpm: params.lung_mechanics.respiratory_rate_bpm,
            muscle_pressure_min_cmH2O: params.lung_mechanics.muscle_pressure_min_cmH2O,
            frc_L: params.lung_mechanics.functional_residual_capacity_L,
        };

        Self {
            params: control.clone(),
            exercise: params.exercise.clone(),
            efferent,
            nominal,
            rest: RestReference {
                efferent: rest_efferent,
                responses,
            },
        }
    }

    pub fn params(&self) -> &ControlParameters {
        &self.params
    }

    pub fn rest_reference(&self) -> &RestReference {
        &self.rest
    }

    /// Control state at rest: receptors at their nominal operating point and
    /// every effector at its rest response.
    pub fn rest_state(&self) -> ControlState {
        let p = &self.params;
        ControlState {
            baroreceptor_filter_mmHg: afferent::steady_filter_state(&p.baroreceptor, p.baroreceptor.setpoint_mmHg),
            chemoreceptor_o2: 1.0,
            chemoreceptor_co2: 1.0,
            lung_stretch_hz: p.lung_stretch.nominal_rate_hz,
            effectors: self.rest.responses,
            ..ControlState::default()
        }
    }

    /// Shift of one effector away from its rest value
    fn offset(&self, state: &ControlState, effector: Effector) -> f64 {
        state.effectors[effector] - self.rest.responses[effector]
    }

    /// Effector values with control switched off
    pub fn nominal_effectors(&self) -> Effectors {
        let n = &self.nominal;
        Effectors {
            peripheral_resistance: n.resistance,
            venous_unstressed_mL: n.unstressed_mL,
            lv_elastance_mmHg_per_mL: n.lv_elastance,
            rv_elastance_mmHg_per_mL: n.rv_elastance,
            heart_period_s: n.heart_period_s,
            respiratory_rate_bpm: n.respiratory_rate_bpm,
            muscle_pressure_min_cmH2O: n.muscle_pressure_min_cmH2O,
            ventilation_ratio: 1.0,
            minute_ventilation_L_per_min: self.params.respiratory.nominal_tidal_volume_L * n.respiratory_rate_bpm,
            resistance_multiplier: 1.0,
        }
    }

    /// Final effector values from the control state.
    ///
    /// Resistances combine the neural shift with local regulation and are
    /// floored at 1 % of nominal. Unstressed volumes and elastances are
    /// floored at 10 % of nominal.
    pub fn effectors(&self, state: &ControlState, delayed_ventilation_target: f64) -> Effectors {
        let n = &self.nominal;
        let p = &self.params;

        let peripheral_resistance = BedSet::from_fn(|bed| {
            let neural = n.resistance[bed] + Effector::resistance(bed).map_or(0.0, |e| self.offset(state, e));
            let factor = autoregulation::conductance_factor(
                bed,
                &state.autoregulation_o2,
                &state.autoregulation_co2,
                state.metabolic_vasodilation,
            );
            (neural / factor).max(0.01 * n.resistance[bed])
        });
        let venous_unstressed_mL = BedSet::from_fn(|bed| {
            let shift = Effector::unstressed_volume(bed).map_or(0.0, |e| self.offset(state, e));
            (n.unstressed_mL[bed] + shift).max(0.1 * n.unstressed_mL[bed])
        });

        let heart_period_s = (n.heart_period_s
            + self.offset(state, Effector::SympatheticPeriod)
            + self.offset(state, Effector::VagalPeriod))
        .clamp(p.effectors.heart_period_min_s, p.effectors.heart_period_max_s);

        let ventilation_ratio = exercise::ventilation_ratio(
            &self.exercise.ventilation,
            delayed_ventilation_target,
            state.ventilation_slow_L_per_min,
        );
        let (respiratory_rate_bpm, muscle_pressure_min_cmH2O) = respiratory::breathing(
            &p.respiratory,
            &state.respiratory,
            n.respiratory_rate_bpm,
            n.muscle_pressure_min_cmH2O,
            ventilation_ratio,
        );

        Effectors {
            resistance_multiplier: parallel_resistance(&peripheral_resistance) / parallel_resistance(&n.resistance),
            peripheral_resistance,
            venous_unstressed_mL,
            lv_elastance_mmHg_per_mL: (n.lv_elastance + self.offset(state, Effector::LeftElastance))
                .max(0.1 * n.lv_elastance),
            rv_elastance_mmHg_per_mL: (n.rv_elastance + self.offset(state, Effector::RightElastance))
                .max(0.1 * n.rv_elastance),
            heart_period_s,
            respiratory_rate_bpm,
            muscle_pressure_min_cmH2O,
            ventilation_ratio,
            minute_ventilation_L_per_min: respiratory_rate_bpm
                * p.respiratory.nominal_tidal_volume_L
                * muscle_pressure_min_cmH2O
                / n.muscle_pressure_min_cmH2O,
        }
    }

    /// Afferent and efferent firing at the current inputs.
    pub fn reflex(&self, state: &ControlState, inputs: &ControlInputs) -> ReflexOutputs {
        let p = &self.params;
        let filtered = afferent::filtered_pressure(&p.baroreceptor, state.baroreceptor_filter_mmHg, inputs.arterial_pressure_mmHg);
        let afferent = AfferentRates {
            baroreceptor_hz: afferent::baroreceptor_rate(&p.baroreceptor, filtered),
            chemoreceptor_hz: afferent::chemoreceptor_rate(&p.chemoreceptor, state.chemoreceptor_o2, state.chemoreceptor_co2),
            lung_stretch_hz: state.lung_stretch_hz,
            cns_hz: state.cns_o2_hz + state.cns_co2_hz,
        };
        ReflexOutputs {
            filtered_pressure_mmHg: filtered,
            afferent,
            efferent: self.efferent.rates(&afferent, inputs.intensity),
        }
    }

    /// Derivatives of every control state.
    pub fn compute_derivatives(&self, state: &ControlState, inputs: &ControlInputs, delayed: &DelayedSignals) -> ControlState {
        let p = &self.params;
        let ex = &self.exercise;
        let (chemo_o2, chemo_co2) = afferent::chemoreceptor_rates(
            &p.chemoreceptor,
            state.chemoreceptor_o2,
            state.chemoreceptor_co2,
            inputs.pao2_mmHg,
            inputs.paco2_mmHg,
        );
        let (cns_o2, cns_co2) = cns::rates(&p.cns, state.cns_o2_hz, state.cns_co2_hz, inputs.pao2_mmHg, inputs.paco2_mmHg);

        let threshold = p.sympathetic.effector_threshold_hz;
        let effectors = EffectorSet::from_fn(|e| {
            let dynamics = e.dynamics(&p.effectors);
            let target = e.static_response(dynamics.gain, delayed.effector_rates_hz[e], threshold);
            lag(target, state.effectors[e], dynamics.time_constant_s)
        });

        let (autoregulation_o2, autoregulation_co2) = autoregulation::rates(
            &p.autoregulation,
            &state.autoregulation_o2,
            &state.autoregulation_co2,
            &inputs.venous_o2,
            inputs.paco2_mmHg,
            p.chemoreceptor.normal_paco2_mmHg,
        );

        let vent = &ex.ventilation;
        ControlState {
            baroreceptor_filter_mmHg: afferent::filter_rate(&p.baroreceptor, state.baroreceptor_filter_mmHg, inputs.arterial_pressure_mmHg),
            chemoreceptor_o2: chemo_o2,
            chemoreceptor_co2: chemo_co2,
            lung_stretch_hz: afferent::lung_stretch_rate(&p.lung_stretch, state.lung_stretch_hz, inputs.lung_volume_L, self.nominal.frc_L),
            cns_o2_hz: cns_o2,
            cns_co2_hz: cns_co2,
            effectors,
            autoregulation_o2,
            autoregulation_co2,
            metabolic_vasodilation: lag(
                exercise::metabolic_vasodilation_target(&ex.metabolic_vasodilation, delayed.metabolic_intensity),
                state.metabolic_vasodilation,
                ex.metabolic_vasodilation.time_constant_s,
            ),
            muscle_demand: lag(ex.muscle_demand.gain * inputs.intensity, state.muscle_demand, ex.muscle_demand.time_constant_s),
            ventilation_slow_L_per_min: lag(
                (1.0 - vent.fast_fraction) * delayed.ventilation_target_L_per_min,
                state.ventilation_slow_L_per_min,
                vent.slow_time_constant_s,
            ),
            respiratory: respiratory::rates(
                &p.respiratory,
                &state.respiratory,
                delayed.chemoreceptor_hz,
                p.chemoreceptor.nominal_rate_hz,
                delayed.paco2_mmHg,
                p.chemoreceptor.normal_paco2_mmHg,
            ),
        }
    }

    /// Rate of change of each venous unstressed volume.
    ///
    /// Only the pressure-integrated veins under reflex control (splanchnic
    /// and resting muscle) need it, and only while the value is above its
    /// floor. The active-muscle vein integrates volume and the
    /// extrasplanchnic vein is the volume closure.
    pub fn unstressed_volume_rates(&self, state: &ControlState, rates: &ControlState) -> BedSet<f64> {
        BedSet::from_fn(|bed| match bed {
            Bed::Splanchnic | Bed::RestingMuscle => {
                let Some(effector) = Effector::unstressed_volume(bed) else {
                    return 0.0;
                };
                let nominal = self.nominal.unstressed_mL[bed];
                if nominal + self.offset(state, effector) > 0.1 * nominal {
                    rates.effectors[effector]
                } else {
                    0.0
                }
            }
            _ => 0.0,
        })
    }

    /// Target of the exercise ventilation delay line at intensity I
    pub fn ventilation_target(&self, intensity: f64) -> f64 {
        exercise::ventilation_target(&self.exercise.ventilation, intensity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system() -> ControlSystem {
        ControlSystem::new(&Parameters::default(), 75.0)
    }

    fn rest_inputs(params: &Parameters) -> ControlInputs {
        ControlInputs {
            arterial_pressure_mmHg: params.control.baroreceptor.setpoint_mmHg,
            pao2_mmHg: params.control.chemoreceptor.normal_pao2_mmHg,
            paco2_mmHg: params.control.chemoreceptor.normal_paco2_mmHg,
            lung_volume_L: params.lung_mechanics.functional_residual_capacity_L,
            venous_o2: BedSet::from_fn(|bed| params.control.autoregulation.bed(bed).map_or(0.15, |l| l.normal_venous_o2)),
            intensity: 0.0,
        }
    }

    #[test]
    fn test_rest_state_reproduces_nominal_effectors() {
        let sys = system();
        let nominal = sys.nominal_effectors();
        let eff = sys.effectors(&sys.rest_state(), 0.0);
        for bed in Bed::ALL {
            assert!((eff.peripheral_resistance[bed] - nominal.peripheral_resistance[bed]).abs() < 1e-12);
            assert!((eff.venous_unstressed_mL[bed] - nominal.venous_unstressed_mL[bed]).abs() < 1e-9);
        }
        assert!((eff.heart_period_s - 0.8).abs() < 1e-12);
        assert!((eff.resistance_multiplier - 1.0).abs() < 1e-12);
        assert!((eff.minute_ventilation_L_per_min - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_effectors_hold_at_rest_operating_point() {
        let params = Parameters::default();
        let sys = system();
        let state = sys.rest_state();
        let inputs = rest_inputs(&params);
        let reflex = sys.reflex(&state, &inputs);
        let delayed = DelayedSignals {
            effector_rates_hz: EffectorSet::from_fn(|e| reflex.efferent.rate(e.pathway())),
            metabolic_intensity: 0.0,
            chemoreceptor_hz: reflex.afferent.chemoreceptor_hz,
            paco2_mmHg: inputs.paco2_mmHg,
            ventilation_target_L_per_min: 0.0,
        };
        let rates = sys.compute_derivatives(&state, &inputs, &delayed);
        for (e, r) in rates.effectors.iter() {
            assert!(r.abs() < 1e-9, "{:?} drifts at rest: {}", e, r);
        }
        assert!(rates.baroreceptor_filter_mmHg.abs() < 1e-12);
        assert!(rates.respiratory.central_rate_bpm.abs() < 1e-12);
    }

    #[test]
    fn test_sympathetic_shift_raises_resistance_and_lowers_unstressed_volume() {
        let sys = system();
        let mut state = sys.rest_state();
        for e in Effector::ALL {
            if e.pathway() != Pathway::Vagal {
                let gain = e.dynamics(&sys.params().effectors).gain;
                state.effectors[e] = e.static_response(gain, 20.0, sys.params().sympathetic.effector_threshold_hz);
            }
        }
        let eff = sys.effectors(&state, 0.0);
        let nominal = sys.nominal_effectors();
        assert!(eff.resistance_multiplier > 1.0);
        assert!(eff.venous_unstressed_mL.splanchnic < nominal.venous_unstressed_mL.splanchnic);
        assert!(eff.lv_elastance_mmHg_per_mL > nominal.lv_elastance_mmHg_per_mL);
        assert!(eff.heart_period_s < nominal.heart_period_s);
    }

    #[test]
    fn test_unstressed_rates_only_for_pressure_integrated_veins() {
        let sys = system();
        let state = sys.rest_state();
        let mut rates = ControlState::default();
        rates.effectors = EffectorSet::from_fn(|_| -1.0);
        let d_vu = sys.unstressed_volume_rates(&state, &rates);
        assert_eq!(d_vu.splanchnic, -1.0);
        assert_eq!(d_vu.resting_muscle, -1.0);
        assert_eq!(d_vu.extrasplanchnic, 0.0);
        assert_eq!(d_vu.active_muscle, 0.0);
        assert_eq!(d_vu.brain, 0.0);
    }
}
