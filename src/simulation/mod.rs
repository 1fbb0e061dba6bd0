//! Integration driver.
//!
//! [`Simulation`] owns every component model, the delay lines and the
//! [`SimulationState`]. Each step evaluates all derivatives from the
//! pre-step state, then applies one explicit Euler update to everything.
//!
//! Evaluation order within a step:
//! 1. exercise intensity and the delayed ventilation drive
//! 2. effector values from the control state
//! 3. lung mechanics (intrathoracic and abdominal pressure)
//! 4. heart, fed by pulmonary venous outflow and thoracic venous return
//! 5. pulmonary circulation and lung gas transfer
//! 6. control reflexes, delay lines and control derivatives
//! 7. systemic circulation, with the unstressed-volume rates from control
//! 8. tissue and venous gas

pub mod config;
pub mod diagnostics;
pub mod integrator;
pub mod series;

pub use config::{ControlConfig, SimulationConfig, MAX_STABLE_DT_S};
pub use diagnostics::{BeatSummary, CycleTracker, SimulationDiagnostics};
pub use integrator::{wrap_phase, Integrate};
pub use series::{TimeSeries, TimeSeriesRecord};

use crate::config::Parameters;
use crate::control::{ControlInputs, ControlSystem, DelayBank, Pathway};
use crate::error::{Result, SimError};
use crate::gas::{metabolic_rates, TissueGas, TissueGasInputs, VenousGas, VenousGasInputs};
use crate::heart::{Heart, HeartInputs};
use crate::lungs::{GasTransfer, GasTransferInputs, LungInputs, LungMechanics};
use crate::pulmonary::{PulmonaryCirculation, PulmonaryInputs};
use crate::state::{BedSet, SimulationState};
use crate::systemic::{intramuscular_pressure, SystemicCirculation, SystemicInputs};

/// Stepper for one run
#[derive(Debug, Clone)]
pub struct Simulation {
    params: Parameters,
    config: SimulationConfig,

    heart: Heart,
    systemic: SystemicCirculation,
    pulmonary: PulmonaryCirculation,
    lungs: LungMechanics,
    gas_transfer: GasTransfer,
    tissue: TissueGas,
    venous: VenousGas,
    control: ControlSystem,
    delays: DelayBank,

    state: SimulationState,
    time_s: f64,
    steps: u64,
    rest_vo2_mL_per_min: f64,
    cycles: CycleTracker,
    last_sample: Option<TimeSeriesRecord>,
    clamp_events: u64,
}

impl Simulation {
    /// Start from the documented rest state.
    pub fn new(params: Parameters, config: SimulationConfig) -> Result<Self> {
        let state = SimulationState::rest(&params);
        Self::with_state(params, config, state)
    }

    /// Start from a caller-supplied state. Parameters and configuration are
    /// validated before anything else is built.
    pub fn with_state(params: Parameters, config: SimulationConfig, state: SimulationState) -> Result<Self> {
        params.validate()?;
        config.validate()?;
        if let Some(variable) = state.first_non_finite() {
            return Err(SimError::NonFinite { variable, time_s: 0.0 });
        }

        let rest_vo2_mL_per_min = metabolic_rates(&params.tissue, 1.0, 0.0).total_o2_mL_per_min();
        Ok(Self {
            heart: Heart::new(&params.heart),
            systemic: SystemicCirculation::new(&params.systemic),
            pulmonary: PulmonaryCirculation::new(&params.pulmonary),
            lungs: LungMechanics::new(&params.lung_mechanics),
            gas_transfer: GasTransfer::new(&params.lung_gas),
            tissue: TissueGas::new(&params.tissue),
            venous: VenousGas,
            control: ControlSystem::new(&params, config.heart_rate_bpm),
            delays: DelayBank::new(&params, config.dt_s),
            state,
            time_s: 0.0,
            steps: 0,
            rest_vo2_mL_per_min,
            cycles: CycleTracker::new(),
            last_sample: None,
            clamp_events: 0,
            params,
            config,
        })
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn time_s(&self) -> f64 {
        self.time_s
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Observables of the most recent step, taken at its start
    pub fn last_sample(&self) -> Option<&TimeSeriesRecord> {
        self.last_sample.as_ref()
    }

    /// Advance one step and return the observables at the pre-step state.
    pub fn step(&mut self) -> Result<TimeSeriesRecord> {
        let dt = self.config.dt_s;
        let (rates, sample) = self.evaluate();

        let phase_before = self.state.heart.cardiac_phase;
        self.state.integrate(&rates, dt);

        let s = &mut self.state;
        s.heart.cardiac_phase = wrap_phase(s.heart.cardiac_phase);
        s.lungs.respiratory_phase = wrap_phase(s.lungs.respiratory_phase);
        self.systemic.hold_algebraic(&mut s.systemic);
        self.pulmonary.hold_algebraic(&mut s.pulmonary);
        if s.lung_gas.clamp_fractions() {
            self.clamp_events += 1;
        }

        if let Some(variable) = self.state.first_non_finite() {
            return Err(SimError::NonFinite {
                variable,
                time_s: self.time_s + dt,
            });
        }

        let wrapped = self.state.heart.cardiac_phase < phase_before;
        self.cycles.record(
            self.time_s,
            dt,
            sample.aortic_pressure_mmHg,
            sample.aortic_flow_mL_per_s,
            wrapped,
        );

        self.steps += 1;
        self.time_s = self.steps as f64 * dt;
        self.last_sample = Some(sample);
        Ok(sample)
    }

    /// Run for the configured duration, sampling every `sample_interval_s`.
    pub fn run(&mut self) -> Result<TimeSeries> {
        let total = self.config.total_steps();
        let every = self.config.sample_every();
        let steps_per_second = (1.0 / self.config.dt_s).round().max(1.0) as u64;

        log::info!(
            "Starting run: {:.1} s at dt = {} s, HR {:.0} bpm, control {}",
            self.config.duration_s,
            self.config.dt_s,
            self.config.heart_rate_bpm,
            if self.config.control.enabled { "on" } else { "off" }
        );

        let mut series = TimeSeries::with_capacity((total / every + 1) as usize);
        for i in 0..total {
            let sample = self.step()?;
            if i % every == 0 {
                series.push(sample);
            }
            if (i + 1) % steps_per_second == 0 {
                log::debug!(
                    "t = {:.1} s: Psa {:.1} mmHg, HR {:.1} bpm, PaO2 {:.1} mmHg",
                    self.time_s,
                    sample.aortic_pressure_mmHg,
                    sample.heart_rate_bpm,
                    sample.pao2_mmHg
                );
            }
        }

        log::info!("Run complete: {} steps, {} samples, {} beats", total, series.len(), self.cycles.beats());
        if self.clamp_events > 0 {
            log::warn!("Gas fractions were clamped into [0, 1] on {} steps", self.clamp_events);
        }
        Ok(series)
    }

    /// Derivatives of the full state and the observables, without
    /// advancing time. Delay lines still take this step's samples.
    pub fn evaluate(&mut self) -> (SimulationState, TimeSeriesRecord) {
        let s = self.state;
        let t = self.time_s;
        let enabled = self.config.control.enabled;
        let intensity = self.config.exercise.intensity(t);

        // Effectors
        let delayed_ventilation = self.delays.push_ventilation(self.control.ventilation_target(intensity));
        let effectors = if enabled {
            self.control.effectors(&s.control, delayed_ventilation)
        } else {
            self.control.nominal_effectors()
        };

        // Lung mechanics
        let (lung_rates, lung) = self.lungs.compute_derivatives(
            &s.lungs,
            &LungInputs {
                respiratory_rate_bpm: effectors.respiratory_rate_bpm,
                muscle_pressure_min_cmH2O: effectors.muscle_pressure_min_cmH2O,
                intensity,
                thoracic_coupling: self.config.thoracic_coupling,
            },
        );
        let pthor = lung.thoracic_pressure_mmHg;

        // Heart
        let pulmonary_venous_outflow = self.pulmonary.venous_outflow(&s.pulmonary, s.heart.la_pressure_mmHg);
        let venous_return = self.systemic.venous_return(&s.systemic, pthor, s.heart.ra_pressure_mmHg);
        let (heart_rates, heart) = self.heart.compute_derivatives(
            &s.heart,
            &HeartInputs {
                aortic_pressure_mmHg: s.systemic.arterial_pressure_mmHg,
                pulmonary_arterial_pressure_mmHg: s.pulmonary.arterial_pressure_mmHg,
                left_atrial_inflow_mL_per_s: pulmonary_venous_outflow,
                right_atrial_inflow_mL_per_s: venous_return,
                lv_elastance_mmHg_per_mL: effectors.lv_elastance_mmHg_per_mL,
                rv_elastance_mmHg_per_mL: effectors.rv_elastance_mmHg_per_mL,
                period_s: effectors.heart_period_s,
            },
        );

        // Pulmonary circulation and gas transfer
        let (pulmonary_rates, pulmonary) = self.pulmonary.compute_derivatives(
            &s.pulmonary,
            &PulmonaryInputs {
                pulmonary_valve_flow_mL_per_s: heart.pulmonary_valve_flow_mL_per_s,
                la_pressure_mmHg: s.heart.la_pressure_mmHg,
                thoracic_pressure_mmHg: pthor,
                thoracic_pressure_rate_mmHg_per_s: lung.thoracic_pressure_rate_mmHg_per_s,
            },
        );
        let (lung_gas_rates, gas) = self.gas_transfer.compute_derivatives(
            &s.lung_gas,
            &GasTransferInputs {
                mouth_flow_L_per_s: lung.mouth_flow_L_per_s,
                alveolar_flow_L_per_s: lung.alveolar_flow_L_per_s,
                dead_space_volume_L: lung.volumes.dead_space_L(),
                alveolar_volume_L: lung.volumes.alveolar_L,
                capillary_flow_mL_per_s: pulmonary.capillary_flow_mL_per_s,
                shunt_flow_mL_per_s: pulmonary.shunt_flow_mL_per_s,
                mixed_venous: s.venous_gas.mixed_venous(),
            },
        );

        // Control
        let control_inputs = ControlInputs {
            arterial_pressure_mmHg: s.systemic.arterial_pressure_mmHg,
            pao2_mmHg: gas.arterial_pressure.o2,
            paco2_mmHg: gas.arterial_pressure.co2,
            lung_volume_L: lung.volumes.total_L(),
            venous_o2: s.venous_gas.o2,
            intensity,
        };
        let reflex = self.control.reflex(&s.control, &control_inputs);
        let (control_rates, unstressed_rates) = if enabled {
            let delayed = self.delays.push_reflex(
                &reflex.efferent,
                intensity,
                reflex.afferent.chemoreceptor_hz,
                gas.arterial_pressure.co2,
            );
            let rates = self.control.compute_derivatives(&s.control, &control_inputs, &delayed);
            let unstressed = self.control.unstressed_volume_rates(&s.control, &rates);
            (rates, unstressed)
        } else {
            (Default::default(), BedSet::default())
        };

        // Systemic circulation
        let external_volume_mL = heart.total_volume_mL(&s.heart) + self.pulmonary.volumes(&s.pulmonary, pthor).total_mL();
        let (systemic_rates, systemic) = self.systemic.compute_derivatives(
            &s.systemic,
            &SystemicInputs {
                aortic_flow_mL_per_s: heart.aortic_flow_mL_per_s,
                ra_pressure_mmHg: s.heart.ra_pressure_mmHg,
                thoracic_pressure_mmHg: pthor,
                abdominal_pressure_mmHg: lung.abdominal_pressure_mmHg,
                intramuscular_pressure_mmHg: intramuscular_pressure(&self.params.systemic.muscle_pump, intensity, t),
                peripheral_resistance: effectors.peripheral_resistance,
                venous_unstressed_mL: effectors.venous_unstressed_mL,
                venous_unstressed_rate_mL_per_s: unstressed_rates,
                external_volume_mL,
            },
        );

        // Tissue and venous gas
        let rates = metabolic_rates(&self.params.tissue, heart.power_ratio, s.control.muscle_demand);
        let tissue_rates = self.tissue.compute_derivatives(
            &s.tissue_gas,
            &TissueGasInputs {
                arterial_content: gas.arterial_content,
                peripheral_flow_mL_per_s: systemic.peripheral_flow_mL_per_s,
                peripheral_volume_mL: systemic.volumes.peripheral_mL,
                rates,
            },
        );
        let venous_rates = self.venous.compute_derivatives(
            &s.venous_gas,
            &VenousGasInputs {
                tissue: s.tissue_gas,
                peripheral_flow_mL_per_s: systemic.peripheral_flow_mL_per_s,
                venous_flow_mL_per_s: systemic.venous_flow_mL_per_s,
                venous_volume_mL: systemic.volumes.venous_mL,
                thoracic_vein_volume_mL: s.systemic.thoracic_vein_volume_mL,
            },
        );

        let derivatives = SimulationState {
            heart: heart_rates,
            systemic: systemic_rates,
            pulmonary: pulmonary_rates,
            lungs: lung_rates,
            lung_gas: lung_gas_rates,
            tissue_gas: tissue_rates,
            venous_gas: venous_rates,
            control: control_rates,
        };

        let dry = self.gas_transfer.dry_pressure_mmHg();
        let sample = TimeSeriesRecord {
            time_s: t,
            lv_pressure_mmHg: heart.lv_pressure_mmHg,
            rv_pressure_mmHg: heart.rv_pressure_mmHg,
            lv_volume_mL: s.heart.lv_volume_mL,
            rv_volume_mL: s.heart.rv_volume_mL,
            la_pressure_mmHg: s.heart.la_pressure_mmHg,
            ra_pressure_mmHg: s.heart.ra_pressure_mmHg,
            mitral_flow_mL_per_s: heart.mitral_flow_mL_per_s,
            aortic_flow_mL_per_s: heart.aortic_flow_mL_per_s,
            tricuspid_flow_mL_per_s: heart.tricuspid_flow_mL_per_s,
            pulmonary_valve_flow_mL_per_s: heart.pulmonary_valve_flow_mL_per_s,
            heart_rate_bpm: heart.heart_rate_bpm,
            aortic_pressure_mmHg: s.systemic.arterial_pressure_mmHg,
            systemic_arterial_flow_mL_per_s: systemic.arterial_flow_mL_per_s,
            peripheral_pressure_mmHg: s.systemic.peripheral_pressure_mmHg,
            thoracic_vein_pressure_mmHg: systemic.thoracic_vein_pressure_mmHg,
            venous_return_mL_per_s: systemic.venous_return_mL_per_s,
            pulmonary_arterial_pressure_mmHg: s.pulmonary.arterial_pressure_mmHg,
            pulmonary_venous_pressure_mmHg: s.pulmonary.venous_pressure_mmHg,
            extrasplanchnic_peripheral_flow_mL_per_s: systemic.peripheral_flow_mL_per_s.extrasplanchnic,
            extrasplanchnic_venous_flow_mL_per_s: systemic.venous_flow_mL_per_s.extrasplanchnic,
            extrasplanchnic_venous_volume_mL: systemic.volumes.venous_mL.extrasplanchnic,
            total_blood_volume_mL: systemic.volumes.total_mL() + external_volume_mL,
            pleural_pressure_cmH2O: s.lungs.pleural_pressure_cmH2O,
            alveolar_pressure_cmH2O: s.lungs.alveolar_pressure_cmH2O,
            muscle_pressure_cmH2O: lung.muscle_pressure_cmH2O,
            thoracic_pressure_mmHg: pthor,
            mouth_flow_L_per_s: lung.mouth_flow_L_per_s,
            lung_volume_L: lung.volumes.total_L(),
            respiratory_rate_bpm: effectors.respiratory_rate_bpm,
            minute_ventilation_L_per_min: effectors.minute_ventilation_L_per_min,
            alveolar_po2_mmHg: s.lung_gas.alveolar_o2_fraction * dry,
            alveolar_pco2_mmHg: s.lung_gas.alveolar_co2_fraction * dry,
            pao2_mmHg: gas.arterial_pressure.o2,
            paco2_mmHg: gas.arterial_pressure.co2,
            sao2_percent: gas.sao2_percent,
            mixed_venous_o2: s.venous_gas.mixed_o2,
            mixed_venous_co2: s.venous_gas.mixed_co2,
            metabolic_vo2_mL_per_min: rates.total_o2_mL_per_min(),
            rest_vo2_mL_per_min: self.rest_vo2_mL_per_min,
            lung_o2_uptake_mL_per_min: gas.exchange_mL_per_s.o2 * 60.0,
            intensity,
            baroreceptor_hz: reflex.afferent.baroreceptor_hz,
            chemoreceptor_hz: reflex.afferent.chemoreceptor_hz,
            lung_stretch_hz: reflex.afferent.lung_stretch_hz,
            sympathetic_hz: reflex.efferent.rate(Pathway::Resistance),
            vagal_hz: reflex.efferent.rate(Pathway::Vagal),
            lv_elastance_mmHg_per_mL: effectors.lv_elastance_mmHg_per_mL,
            resistance_multiplier: effectors.resistance_multiplier,
        };

        (derivatives, sample)
    }

    /// Beat-level diagnostics of the run so far
    pub fn diagnostics(&self) -> Option<SimulationDiagnostics> {
        self.last_sample.as_ref().map(|sample| {
            SimulationDiagnostics::from_sample(
                sample,
                &self.cycles,
                self.steps,
                self.params.systemic.total_blood_volume_mL,
                self.clamp_events,
            )
        })
    }

    /// Warnings about the current state: vital signs outside their ranges,
    /// blood-volume drift and clamp activations.
    pub fn validate_state(&self) -> Vec<String> {
        let Some(diag) = self.diagnostics() else {
            return Vec::new();
        };
        let mut warnings = diag.vitals().warnings();

        let tbv = self.params.systemic.total_blood_volume_mL;
        if diag.blood_volume_error_mL.abs() > 1e-9 * tbv {
            warnings.push(format!(
                "Blood volume drift: {:.3e} mL against {:.0} mL",
                diag.blood_volume_error_mL, tbv
            ));
        }
        if diag.clamp_events > 0 {
            warnings.push(format!("Gas fractions clamped on {} steps", diag.clamp_events));
        }
        if self.config.thoracic_coupling && self.state.lungs.pleural_pressure_cmH2O > 0.0 {
            warnings.push(format!(
                "Positive pleural pressure: {:.2} cmH2O",
                self.state.lungs.pleural_pressure_cmH2O
            ));
        }
        warnings
    }
}

/// Run the model from `initial_state` for `duration_s` with control enabled
/// and thoracic coupling on, returning the sampled time series.
pub fn simulate(
    parameters: &Parameters,
    initial_state: &SimulationState,
    heart_rate_bpm: f64,
    duration_s: f64,
    dt_s: f64,
) -> Result<TimeSeries> {
    let config = SimulationConfig {
        dt_s,
        duration_s,
        heart_rate_bpm,
        ..SimulationConfig::default()
    };
    let mut sim = Simulation::with_state(parameters.clone(), config, *initial_state)?;
    sim.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    fn short_config() -> SimulationConfig {
        SimulationConfig {
            duration_s: 0.1,
            ..Default::default()
        }
    }

    #[test]
    fn test_rest_derivatives_are_finite() {
        let mut sim = Simulation::new(Parameters::default(), short_config()).expect("valid setup");
        let (rates, sample) = sim.evaluate();
        assert!(rates.is_finite(), "non-finite derivative in {:?}", rates.first_non_finite());
        assert!(sample.pao2_mmHg > 80.0 && sample.pao2_mmHg < 110.0, "PaO2 {}", sample.pao2_mmHg);
    }

    #[test]
    fn test_step_advances_time() {
        let mut sim = Simulation::new(Parameters::default(), short_config()).expect("valid setup");
        sim.step().expect("step");
        sim.step().expect("step");
        assert_eq!(sim.steps(), 2);
        assert!((sim.time_s() - 0.0004).abs() < 1e-12);
    }

    #[test]
    fn test_blood_volume_closes_exactly() {
        let params = Parameters::default();
        let tbv = params.systemic.total_blood_volume_mL;
        let mut sim = Simulation::new(params, short_config()).expect("valid setup");
        for _ in 0..200 {
            let sample = sim.step().expect("step");
            assert!((sample.total_blood_volume_mL - tbv).abs() < 1e-9 * tbv);
        }
    }

    #[test]
    fn test_bad_step_fails_before_running() {
        let config = SimulationConfig {
            dt_s: 0.01,
            ..Default::default()
        };
        let err = Simulation::new(Parameters::default(), config).expect_err("dt too large");
        assert!(matches!(err, SimError::Config(ConfigError::InvalidTimeStep { .. })));
    }

    #[test]
    fn test_non_finite_initial_state_rejected() {
        let params = Parameters::default();
        let mut state = SimulationState::rest(&params);
        state.heart.lv_volume_mL = f64::INFINITY;
        let err = Simulation::with_state(params, short_config(), state).expect_err("non-finite state");
        match err {
            SimError::NonFinite { variable, time_s } => {
                assert_eq!(variable, "heart.lv_volume_mL", "the full field path should be reported");
                assert_eq!(time_s, 0.0);
            }
            other => panic!("expected NonFinite, got {:?}", other),
        }
    }

    #[test]
    fn test_disabled_control_holds_control_state() {
        let config = SimulationConfig {
            control: ControlConfig { enabled: false },
            ..short_config()
        };
        let mut sim = Simulation::new(Parameters::default(), config).expect("valid setup");
        let before = sim.state().control;
        for _ in 0..100 {
            sim.step().expect("step");
        }
        assert_eq!(sim.state().control, before);
    }
}
