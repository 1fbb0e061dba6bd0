//! Beat-level diagnostics for run summaries and state validation.

use serde::Serialize;

use super::series::TimeSeriesRecord;
use crate::state::VitalSigns;

/// Hemodynamics of one completed heartbeat
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BeatSummary {
    pub end_time_s: f64,
    pub period_s: f64,
    pub systolic_mmHg: f64,
    pub diastolic_mmHg: f64,
    pub mean_arterial_mmHg: f64,
    pub stroke_volume_mL: f64,
}

impl BeatSummary {
    pub fn heart_rate_bpm(&self) -> f64 {
        60.0 / self.period_s
    }

    pub fn cardiac_output_L_per_min(&self) -> f64 {
        self.stroke_volume_mL * self.heart_rate_bpm() / 1000.0
    }
}

/// Accumulates aortic pressure and flow across a beat; a beat ends when
/// the cardiac phase wraps.
#[derive(Debug, Clone)]
pub struct CycleTracker {
    start_s: Option<f64>,
    max_pressure: f64,
    min_pressure: f64,
    pressure_integral: f64,
    ejected_mL: f64,
    beats: u64,
    last: Option<BeatSummary>,
}

impl Default for CycleTracker {
    fn default() -> Self {
        Self {
            start_s: None,
            max_pressure: f64::NEG_INFINITY,
            min_pressure: f64::INFINITY,
            pressure_integral: 0.0,
            ejected_mL: 0.0,
            beats: 0,
            last: None,
        }
    }
}

impl CycleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one step. `wrapped` is true when the step crossed a beat boundary.
    ///
    /// The partial beat before the first wrap is discarded.
    pub fn record(&mut self, time_s: f64, dt_s: f64, aortic_pressure_mmHg: f64, aortic_flow_mL_per_s: f64, wrapped: bool) {
        self.max_pressure = self.max_pressure.max(aortic_pressure_mmHg);
        self.min_pressure = self.min_pressure.min(aortic_pressure_mmHg);
        self.pressure_integral += aortic_pressure_mmHg * dt_s;
        self.ejected_mL += aortic_flow_mL_per_s * dt_s;

        if !wrapped {
            return;
        }
        let end = time_s + dt_s;
        if let Some(start) = self.start_s {
            let period = end - start;
            self.last = Some(BeatSummary {
                end_time_s: end,
                period_s: period,
                systolic_mmHg: self.max_pressure,
                diastolic_mmHg: self.min_pressure,
                mean_arterial_mmHg: self.pressure_integral / period,
                stroke_volume_mL: self.ejected_mL,
            });
            self.beats += 1;
        }
        self.start_s = Some(end);
        self.max_pressure = f64::NEG_INFINITY;
        self.min_pressure = f64::INFINITY;
        self.pressure_integral = 0.0;
        self.ejected_mL = 0.0;
    }

    pub fn beats(&self) -> u64 {
        self.beats
    }

    pub fn last_beat(&self) -> Option<&BeatSummary> {
        self.last.as_ref()
    }
}

/// Snapshot of the run for summaries
#[derive(Debug, Clone, Serialize)]
pub struct SimulationDiagnostics {
    pub time_s: f64,
    pub steps: u64,
    pub beats: u64,
    /// Last complete beat, absent until two beat boundaries have passed
    pub last_beat: Option<BeatSummary>,
    /// Instantaneous heart rate from the current period effector
    pub heart_rate_bpm: f64,
    pub pao2_mmHg: f64,
    pub paco2_mmHg: f64,
    pub sao2_percent: f64,
    pub vo2_mL_per_min: f64,
    pub minute_ventilation_L_per_min: f64,
    pub respiratory_rate_bpm: f64,
    pub intensity: f64,
    pub resistance_multiplier: f64,
    pub blood_volume_error_mL: f64,
    /// Steps at which a gas fraction had to be clamped into [0, 1]
    pub clamp_events: u64,
}

impl SimulationDiagnostics {
    pub(crate) fn from_sample(
        sample: &TimeSeriesRecord,
        tracker: &CycleTracker,
        steps: u64,
        total_blood_volume_mL: f64,
        clamp_events: u64,
    ) -> Self {
        Self {
            time_s: sample.time_s,
            steps,
            beats: tracker.beats(),
            last_beat: tracker.last_beat().copied(),
            heart_rate_bpm: sample.heart_rate_bpm,
            pao2_mmHg: sample.pao2_mmHg,
            paco2_mmHg: sample.paco2_mmHg,
            sao2_percent: sample.sao2_percent,
            vo2_mL_per_min: sample.metabolic_vo2_mL_per_min,
            minute_ventilation_L_per_min: sample.minute_ventilation_L_per_min,
            respiratory_rate_bpm: sample.respiratory_rate_bpm,
            intensity: sample.intensity,
            resistance_multiplier: sample.resistance_multiplier,
            blood_volume_error_mL: sample.total_blood_volume_mL - total_blood_volume_mL,
            clamp_events,
        }
    }

    /// Vital signs with status flags
    pub fn vitals(&self) -> VitalSigns {
        let mut vitals = VitalSigns {
            simulation_time_s: self.time_s,
            total_steps: self.steps,
            cardiac_cycles: self.beats,
            exercise_intensity: self.intensity,
            heart_rate_bpm: self.heart_rate_bpm,
            resistance_multiplier: self.resistance_multiplier,
            pao2_mmHg: self.pao2_mmHg,
            paco2_mmHg: self.paco2_mmHg,
            sao2_percent: self.sao2_percent,
            vo2_mL_per_min: self.vo2_mL_per_min,
            respiratory_rate_bpm: self.respiratory_rate_bpm,
            minute_ventilation_L_per_min: self.minute_ventilation_L_per_min,
            blood_volume_error_mL: self.blood_volume_error_mL,
            ..VitalSigns::default()
        };
        if let Some(beat) = &self.last_beat {
            vitals.systolic_mmHg = beat.systolic_mmHg;
            vitals.diastolic_mmHg = beat.diastolic_mmHg;
            vitals.mean_arterial_mmHg = beat.mean_arterial_mmHg;
            vitals.heart_rate_bpm = beat.heart_rate_bpm();
            vitals.stroke_volume_mL = beat.stroke_volume_mL;
            vitals.cardiac_output_L_per_min = beat.cardiac_output_L_per_min();
        }
        vitals.update_status();
        vitals
    }

    /// Print a formatted summary
    pub fn print_summary(&self) {
        println!("=== Cardiopulmonary State (t = {:.3} s, {} beats) ===", self.time_s, self.beats);
        println!();
        println!("Hemodynamics:");
        match &self.last_beat {
            Some(beat) => {
                println!(
                    "  Blood pressure:  {:.0}/{:.0} mmHg (target: 100-140 / 60-90)",
                    beat.systolic_mmHg, beat.diastolic_mmHg
                );
                println!("  MAP:             {:.1} mmHg", beat.mean_arterial_mmHg);
                println!("  Heart rate:      {:.1} bpm", beat.heart_rate_bpm());
                println!("  Stroke volume:   {:.1} mL", beat.stroke_volume_mL);
                println!("  Cardiac output:  {:.2} L/min (target: 4-8 at rest)", beat.cardiac_output_L_per_min());
            }
            None => println!("  (no complete beat yet)"),
        }
        println!("  R multiplier:    {:.2}", self.resistance_multiplier);
        println!();
        println!("Gas exchange:");
        println!("  PaO2:            {:.1} mmHg (target: 80-105)", self.pao2_mmHg);
        println!("  PaCO2:           {:.1} mmHg (target: 35-45)", self.paco2_mmHg);
        println!("  SaO2:            {:.1}%", self.sao2_percent);
        println!("  VO2:             {:.0} mL/min", self.vo2_mL_per_min);
        println!();
        println!("Breathing:");
        println!("  Rate:            {:.1} breaths/min", self.respiratory_rate_bpm);
        println!("  Ventilation:     {:.2} L/min", self.minute_ventilation_L_per_min);
        println!();
        println!("Exercise intensity: {:.2}", self.intensity);
        println!("Blood volume error: {:.2e} mL", self.blood_volume_error_mL);
    }

    pub fn print_row_header() {
        println!(
            "{:>8} {:>9} {:>7} {:>7} {:>7} {:>7} {:>7} {:>6}",
            "Time(s)", "BP", "HR", "CO", "PaO2", "PaCO2", "VE", "I"
        );
    }

    pub fn print_row(&self) {
        let (bp, co) = match &self.last_beat {
            Some(b) => (
                format!("{:.0}/{:.0}", b.systolic_mmHg, b.diastolic_mmHg),
                b.cardiac_output_L_per_min(),
            ),
            None => ("-".to_string(), f64::NAN),
        };
        println!(
            "{:8.2} {:>9} {:7.1} {:7.2} {:7.1} {:7.1} {:7.2} {:6.2}",
            self.time_s,
            bp,
            self.heart_rate_bpm,
            co,
            self.pao2_mmHg,
            self.paco2_mmHg,
            self.minute_ventilation_L_per_min,
            self.intensity
        );
    }
}
