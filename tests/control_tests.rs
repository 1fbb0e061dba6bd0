//! Integration tests for the reflex control loops, driven open-loop
//!
//! Each test holds the controlled variables fixed and integrates only the
//! control state, so the response can be read without hemodynamic feedback.
//!
//! Validation targets:
//! - At the operating point every effector holds its nominal value
//! - Hypotension: baroreceptor firing falls, sympathetic firing rises,
//!   resistance and heart rate rise after the effector delays
//! - Hypertension produces the mirror response
//! - Hypercapnia raises minute ventilation through the chemoreflexes
//! - Effector static responses never reverse direction

use approx::assert_relative_eq;
use cardiopulmonary_sim::control::{ControlInputs, ControlState, DelayBank, Effector, ReflexOutputs};
use cardiopulmonary_sim::simulation::Integrate;
use cardiopulmonary_sim::state::{Bed, BedSet};
use cardiopulmonary_sim::{ControlSystem, Parameters};

const DT: f64 = 0.0002;

fn rest_inputs(params: &Parameters) -> ControlInputs {
    ControlInputs {
        arterial_pressure_mmHg: params.control.baroreceptor.setpoint_mmHg,
        pao2_mmHg: params.control.chemoreceptor.normal_pao2_mmHg,
        paco2_mmHg: params.control.chemoreceptor.normal_paco2_mmHg,
        // Mean inflation that keeps lung stretch firing at its nominal rate
        lung_volume_L: params.lung_mechanics.functional_residual_capacity_L
            + params.control.lung_stretch.nominal_rate_hz / params.control.lung_stretch.gain_hz_per_L,
        venous_o2: BedSet::from_fn(|bed| params.control.autoregulation.bed(bed).map_or(0.15, |l| l.normal_venous_o2)),
        intensity: 0.0,
    }
}

struct OpenLoop {
    system: ControlSystem,
    delays: DelayBank,
    state: ControlState,
    ventilation_target: f64,
}

impl OpenLoop {
    fn new(params: &Parameters) -> Self {
        let system = ControlSystem::new(params, 75.0);
        let state = system.rest_state();
        Self {
            system,
            delays: DelayBank::new(params, DT),
            state,
            ventilation_target: 0.0,
        }
    }

    /// Integrate the control state for `seconds` at fixed inputs and return
    /// the reflex firing of the final step.
    fn hold(&mut self, inputs: &ControlInputs, seconds: f64) -> ReflexOutputs {
        let mut reflex = ReflexOutputs::default();
        for _ in 0..(seconds / DT).round() as usize {
            self.ventilation_target = self.delays.push_ventilation(self.system.ventilation_target(inputs.intensity));
            reflex = self.system.reflex(&self.state, inputs);
            let delayed = self.delays.push_reflex(
                &reflex.efferent,
                inputs.intensity,
                reflex.afferent.chemoreceptor_hz,
                inputs.paco2_mmHg,
            );
            let rates = self.system.compute_derivatives(&self.state, inputs, &delayed);
            self.state.integrate(&rates, DT);
        }
        reflex
    }
}

// ============================================================================
// Operating point
// ============================================================================

#[test]
fn test_operating_point_is_steady() {
    let params = Parameters::default();
    let mut lp = OpenLoop::new(&params);
    let nominal = lp.system.nominal_effectors();
    lp.hold(&rest_inputs(&params), 10.0);
    let eff = lp.system.effectors(&lp.state, lp.ventilation_target);

    for bed in Bed::ALL {
        assert_relative_eq!(eff.peripheral_resistance[bed], nominal.peripheral_resistance[bed], max_relative = 0.02);
    }
    assert_relative_eq!(eff.heart_period_s, nominal.heart_period_s, max_relative = 0.02);
    assert_relative_eq!(eff.resistance_multiplier, 1.0, max_relative = 0.02);
}

// ============================================================================
// Baroreflex
// ============================================================================

#[test]
fn test_hypotension_raises_sympathetic_drive() {
    let params = Parameters::default();
    let mut lp = OpenLoop::new(&params);
    let rest = lp.hold(&rest_inputs(&params), 0.01);

    let low = ControlInputs {
        arterial_pressure_mmHg: params.control.baroreceptor.setpoint_mmHg - 30.0,
        ..rest_inputs(&params)
    };
    // Resistance delay plus one time constant
    let reflex = lp.hold(&low, 8.0);

    assert!(
        reflex.afferent.baroreceptor_hz < rest.afferent.baroreceptor_hz,
        "baroreceptor firing should fall: {:.2} -> {:.2} Hz",
        rest.afferent.baroreceptor_hz,
        reflex.afferent.baroreceptor_hz
    );
    assert!(
        reflex.efferent.resistance_hz > rest.efferent.resistance_hz,
        "sympathetic firing should rise: {:.2} -> {:.2} Hz",
        rest.efferent.resistance_hz,
        reflex.efferent.resistance_hz
    );
    assert!(reflex.efferent.vagal_hz < rest.efferent.vagal_hz, "vagal firing should fall");

    let eff = lp.system.effectors(&lp.state, lp.ventilation_target);
    let nominal = lp.system.nominal_effectors();
    assert!(eff.resistance_multiplier > 1.0, "R_mult {:.3} should exceed 1", eff.resistance_multiplier);
    assert!(
        eff.heart_rate_bpm() > nominal.heart_rate_bpm(),
        "HR {:.1} should exceed {:.1} bpm",
        eff.heart_rate_bpm(),
        nominal.heart_rate_bpm()
    );
    assert!(
        eff.venous_unstressed_mL[Bed::Splanchnic] < nominal.venous_unstressed_mL[Bed::Splanchnic],
        "venoconstriction should lower unstressed volume"
    );
}

#[test]
fn test_hypertension_withdraws_sympathetic_drive() {
    let params = Parameters::default();
    let mut lp = OpenLoop::new(&params);
    let high = ControlInputs {
        arterial_pressure_mmHg: params.control.baroreceptor.setpoint_mmHg + 30.0,
        ..rest_inputs(&params)
    };
    lp.hold(&high, 8.0);

    let eff = lp.system.effectors(&lp.state, lp.ventilation_target);
    let nominal = lp.system.nominal_effectors();
    assert!(eff.resistance_multiplier < 1.0, "R_mult {:.3} should fall below 1", eff.resistance_multiplier);
    assert!(eff.heart_rate_bpm() < nominal.heart_rate_bpm(), "HR should fall");
}

// ============================================================================
// Chemoreflex
// ============================================================================

#[test]
fn test_hypercapnia_raises_ventilation() {
    let params = Parameters::default();
    let mut lp = OpenLoop::new(&params);
    let nominal = lp.system.nominal_effectors();
    let hypercapnic = ControlInputs {
        paco2_mmHg: params.control.chemoreceptor.normal_paco2_mmHg + 10.0,
        ..rest_inputs(&params)
    };
    lp.hold(&hypercapnic, 40.0);

    let eff = lp.system.effectors(&lp.state, lp.ventilation_target);
    assert!(
        eff.minute_ventilation_L_per_min > 1.2 * nominal.minute_ventilation_L_per_min,
        "VE {:.2} L/min should rise well above {:.2}",
        eff.minute_ventilation_L_per_min,
        nominal.minute_ventilation_L_per_min
    );
}

// ============================================================================
// Static responses
// ============================================================================

#[test]
fn test_static_responses_are_monotone() {
    let params = Parameters::default();
    let threshold = params.control.sympathetic.effector_threshold_hz;
    for effector in Effector::ALL {
        let gain = effector.dynamics(&params.control.effectors).gain;
        let responses: Vec<f64> = (0..200)
            .map(|i| effector.static_response(gain, i as f64 * 0.05, threshold))
            .collect();
        let direction = gain.signum();
        for w in responses.windows(2) {
            assert!(
                direction * (w[1] - w[0]) >= 0.0,
                "{:?} reverses direction with firing",
                effector
            );
        }
    }
}
