//! End-to-end scenarios with every loop closed
//!
//! Validation targets:
//! - Rest: systolic 100-140 mmHg, diastolic 60-90 mmHg, HR near 75 bpm,
//!   cardiac output 4-8 L/min, VO2 near 250 mL/min
//! - Exercise ramp: heart rate, O2 consumption and ventilation all rise;
//!   active-muscle vasodilation lowers the resistance multiplier
//! - `simulate` exposes every documented column by name
//! - Steps beyond the stable bound are refused before running
//! - Diagnostics report beats and normal vitals at rest

use approx::assert_abs_diff_eq;
use cardiopulmonary_sim::{
    simulate, ExerciseProfile, Parameters, SimError, Simulation, SimulationConfig, SimulationState, TimeSeriesRecord,
    VitalStatus,
};
use cardiopulmonary_sim::simulation::MAX_STABLE_DT_S;

fn window_extremes(values: &[f64]) -> (f64, f64) {
    let max = values.iter().cloned().fold(f64::MIN, f64::max);
    let min = values.iter().cloned().fold(f64::MAX, f64::min);
    (min, max)
}

// ============================================================================
// Rest
// ============================================================================

#[test]
fn test_rest_hemodynamics() {
    let config = SimulationConfig {
        duration_s: 30.0,
        ..SimulationConfig::default()
    };
    let mut sim = Simulation::new(Parameters::default(), config).expect("valid configuration");
    let series = sim.run().expect("run should succeed");

    // Last 4 s: five beats at 75 bpm
    let psa: Vec<f64> = series
        .records()
        .iter()
        .filter(|r| r.time_s >= 26.0)
        .map(|r| r.aortic_pressure_mmHg)
        .collect();
    let (diastolic, systolic) = window_extremes(&psa);
    assert!((100.0..=140.0).contains(&systolic), "systolic {:.1} mmHg", systolic);
    assert!((60.0..=90.0).contains(&diastolic), "diastolic {:.1} mmHg", diastolic);

    let hr = series.window_mean("HR", 26.0, 30.0).expect("HR column");
    assert_abs_diff_eq!(hr, 75.0, epsilon = 4.0);

    let vo2 = series.window_mean("metabolic.VO2", 26.0, 30.0).expect("VO2 column");
    assert!((200.0..=300.0).contains(&vo2), "resting VO2 {:.0} mL/min", vo2);

    let diagnostics = sim.diagnostics().expect("beats were recorded");
    assert!(diagnostics.beats >= 30, "only {} beats in 30 s", diagnostics.beats);
    let beat = diagnostics.last_beat.expect("a complete beat");
    let co = beat.cardiac_output_L_per_min();
    assert!((4.0..=8.0).contains(&co), "cardiac output {:.2} L/min", co);

    let vitals = diagnostics.vitals();
    assert_eq!(vitals.heart_rate_status, VitalStatus::Normal, "HR {:.1}", vitals.heart_rate_bpm);
    assert_ne!(vitals.sao2_status, VitalStatus::Critical);
}

// ============================================================================
// Exercise
// ============================================================================

#[test]
fn test_exercise_ramp_raises_demand_and_delivery() {
    let config = SimulationConfig {
        duration_s: 30.0,
        exercise: ExerciseProfile::Ramp {
            start_s: 0.0,
            duration_s: 30.0,
            from: 0.0,
            to: 0.5,
        },
        ..SimulationConfig::default()
    };
    let mut sim = Simulation::new(Parameters::default(), config).expect("valid configuration");
    let series = sim.run().expect("run should succeed");

    let early = |name: &str| series.window_mean(name, 0.0, 5.0).expect("known column");
    let late = |name: &str| series.window_mean(name, 25.0, 30.0).expect("known column");

    assert!(
        late("HR") > early("HR") + 10.0,
        "HR should rise: {:.1} -> {:.1} bpm",
        early("HR"),
        late("HR")
    );
    assert!(
        late("metabolic.VO2") > 1.3 * early("metabolic.VO2"),
        "VO2 should rise: {:.0} -> {:.0} mL/min",
        early("metabolic.VO2"),
        late("metabolic.VO2")
    );
    assert!(
        late("minute_ventilation") > 1.5 * early("minute_ventilation"),
        "VE should rise: {:.1} -> {:.1} L/min",
        early("minute_ventilation"),
        late("minute_ventilation")
    );
    let vo2_windows: Vec<f64> = (0..6)
        .map(|k| series.window_mean("metabolic.VO2", 5.0 * k as f64, 5.0 * (k + 1) as f64).expect("known column"))
        .collect();
    assert!(
        vo2_windows.windows(2).all(|w| w[1] > w[0]),
        "VO2 should climb with intensity: {:?}",
        vo2_windows
    );
    assert!(late("metabolic.VO2") > late("VO2_rest"), "exercise VO2 should exceed the resting reference");
    assert!(late("R_mult") < early("R_mult"), "muscle vasodilation should lower R_mult");
    assert!(late("I") > 0.4, "intensity at the end of the ramp {:.2}", late("I"));
}

// ============================================================================
// Public entry points
// ============================================================================

#[test]
fn test_simulate_exposes_every_column() {
    let params = Parameters::default();
    let state = SimulationState::rest(&params);
    let series = simulate(&params, &state, 75.0, 1.0, 0.0002).expect("one second should run");

    assert!(!series.is_empty());
    for name in TimeSeriesRecord::COLUMNS {
        let column = series.column(name).unwrap_or_else(|e| panic!("column {}: {}", name, e));
        assert_eq!(column.len(), series.len());
        assert!(column.iter().all(|v| v.is_finite()), "column {} has non-finite values", name);
    }
    assert!(matches!(series.column("nonsense"), Err(SimError::UnknownColumn(_))));
}

#[test]
fn test_simulate_rejects_unstable_step() {
    let params = Parameters::default();
    let state = SimulationState::rest(&params);
    assert!(simulate(&params, &state, 75.0, 1.0, 0.01).is_err());
    // Just past the stable bound, where the ventricles would diverge
    let err = simulate(&params, &state, 75.0, 1.0, 0.0005).expect_err("0.5 ms is beyond the stable step");
    assert!(matches!(err, SimError::Config(_)), "expected a configuration error, got {:?}", err);
    assert!(simulate(&params, &state, 75.0, 0.1, MAX_STABLE_DT_S).is_ok(), "the bound itself should run");
}
