//! Integration tests for lung mechanics and gas exchange
//!
//! Validation targets:
//! - Quiet breathing moves a physiological tidal volume (0.35-0.8 L)
//! - Lung volume returns to FRC at the end of every breath
//! - O2 and CO2 content rise with their own partial pressure
//! - A resting run settles at normal arterial blood gases
//!   (PaO2 80-110 mmHg, PaCO2 35-45 mmHg, SaO2 > 94 %)

use approx::assert_relative_eq;
use cardiopulmonary_sim::lungs::{Dissociation, LungInputs, LungMechanics, LungState};
use cardiopulmonary_sim::simulation::wrap_phase;
use cardiopulmonary_sim::{GasPair, Parameters, Simulation, SimulationConfig};

const DT: f64 = 0.0002;

fn quiet_breathing(params: &Parameters) -> LungInputs {
    LungInputs {
        respiratory_rate_bpm: params.lung_mechanics.respiratory_rate_bpm,
        muscle_pressure_min_cmH2O: params.lung_mechanics.muscle_pressure_min_cmH2O,
        intensity: 0.0,
        thoracic_coupling: true,
    }
}

/// Integrate the isolated lungs and return the total lung volume per step.
fn breathe(params: &Parameters, duration_s: f64) -> Vec<f64> {
    let lungs = LungMechanics::new(&params.lung_mechanics);
    let inputs = quiet_breathing(params);
    let mut state = LungState::end_expiration(&params.lung_mechanics);
    let steps = (duration_s / DT).round() as usize;
    let mut volumes = Vec::with_capacity(steps);
    for _ in 0..steps {
        let (rates, out) = lungs.compute_derivatives(&state, &inputs);
        volumes.push(out.volumes.total_L());
        state.larynx_pressure_cmH2O += rates.larynx_pressure_cmH2O * DT;
        state.trachea_pressure_cmH2O += rates.trachea_pressure_cmH2O * DT;
        state.bronchi_pressure_cmH2O += rates.bronchi_pressure_cmH2O * DT;
        state.alveolar_pressure_cmH2O += rates.alveolar_pressure_cmH2O * DT;
        state.pleural_pressure_cmH2O += rates.pleural_pressure_cmH2O * DT;
        state.respiratory_phase = wrap_phase(state.respiratory_phase + rates.respiratory_phase * DT);
    }
    volumes
}

// ============================================================================
// Mechanics
// ============================================================================

#[test]
fn test_quiet_breathing_tidal_volume() {
    let params = Parameters::default();
    let breath_s = 60.0 / params.lung_mechanics.respiratory_rate_bpm;
    let volumes = breathe(&params, 3.0 * breath_s);

    let per_breath = (breath_s / DT).round() as usize;
    let last = &volumes[2 * per_breath..];
    let max = last.iter().cloned().fold(f64::MIN, f64::max);
    let min = last.iter().cloned().fold(f64::MAX, f64::min);
    let tidal = max - min;
    assert!(
        (0.35..0.8).contains(&tidal),
        "tidal volume {:.3} L outside 0.35-0.8 L",
        tidal
    );
}

#[test]
fn test_lung_volume_returns_each_breath() {
    let params = Parameters::default();
    let breath_s = 60.0 / params.lung_mechanics.respiratory_rate_bpm;
    let volumes = breathe(&params, 3.0 * breath_s);
    let per_breath = (breath_s / DT).round() as usize;

    let second = volumes[per_breath];
    let third = volumes[2 * per_breath];
    assert_relative_eq!(second, third, max_relative = 0.01);
}

// ============================================================================
// Dissociation
// ============================================================================

#[test]
fn test_content_rises_with_own_pressure() {
    let params = Parameters::default();
    let curves = Dissociation::new(&params.lung_gas);

    let mut last = curves.content(GasPair { o2: 1.0, co2: 40.0 });
    for po2 in (10..=150).step_by(10) {
        let next = curves.content(GasPair { o2: po2 as f64, co2: 40.0 });
        assert!(next.o2 > last.o2, "O2 content should rise with PO2 at {} mmHg", po2);
        last = next;
    }

    let mut last = curves.content(GasPair { o2: 95.0, co2: 1.0 });
    for pco2 in (10..=80).step_by(10) {
        let next = curves.content(GasPair { o2: 95.0, co2: pco2 as f64 });
        assert!(next.co2 > last.co2, "CO2 content should rise with PCO2 at {} mmHg", pco2);
        last = next;
    }
}

#[test]
fn test_haldane_effect_lowers_co2_content() {
    let curves = Dissociation::new(&Parameters::default().lung_gas);
    let venous = curves.content(GasPair { o2: 40.0, co2: 46.0 });
    let oxygenated = curves.content(GasPair { o2: 100.0, co2: 46.0 });
    assert!(
        oxygenated.co2 < venous.co2,
        "oxygenation should release CO2: {:.4} vs {:.4} mL/mL",
        oxygenated.co2,
        venous.co2
    );
}

// ============================================================================
// Whole-body gas exchange
// ============================================================================

#[test]
fn test_resting_blood_gases() {
    let config = SimulationConfig {
        duration_s: 20.0,
        ..SimulationConfig::default()
    };
    let mut sim = Simulation::new(Parameters::default(), config).expect("valid configuration");
    let series = sim.run().expect("run should succeed");

    let pao2 = series.window_mean("PaO2", 15.0, 20.0).expect("PaO2 column");
    let paco2 = series.window_mean("PaCO2", 15.0, 20.0).expect("PaCO2 column");
    let sao2 = series.window_mean("SaO2", 15.0, 20.0).expect("SaO2 column");
    assert!((80.0..=110.0).contains(&pao2), "PaO2 {:.1} mmHg", pao2);
    assert!((35.0..=45.0).contains(&paco2), "PaCO2 {:.1} mmHg", paco2);
    assert!(sao2 > 94.0 && sao2 <= 100.0, "SaO2 {:.1} %", sao2);

    let ve = series.window_mean("minute_ventilation", 15.0, 20.0).expect("VE column");
    assert!((4.0..=9.0).contains(&ve), "resting VE {:.2} L/min", ve);
}
