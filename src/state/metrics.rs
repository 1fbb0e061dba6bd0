//! Vital signs for the run summary and export.
//!
//! Aggregates the cycle-level diagnostics into one structure with a
//! status flag per vital sign, suitable for printing or serialising to JSON.

use serde::{Deserialize, Serialize};

/// Status indicator for a vital sign relative to its physiological range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VitalStatus {
    /// Within the normal range
    #[default]
    Normal,
    /// Outside the range but within a 20 % margin of its width
    Warning,
    /// Beyond the warning margin
    Critical,
}

impl VitalStatus {
    pub fn from_value(value: f64, normal_min: f64, normal_max: f64) -> Self {
        let margin = (normal_max - normal_min) * 0.2;

        if !value.is_finite() || value < normal_min - margin || value > normal_max + margin {
            VitalStatus::Critical
        } else if value < normal_min || value > normal_max {
            VitalStatus::Warning
        } else {
            VitalStatus::Normal
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            VitalStatus::Normal => "✓",
            VitalStatus::Warning => "⚠️",
            VitalStatus::Critical => "✗",
        }
    }
}

/// Overall physiological regime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PhysiologicalMode {
    #[default]
    Rest,
    Exercise,
    /// At least one vital sign is critical
    Distressed,
}

/// Cycle-averaged vital signs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VitalSigns {
    // === Timing ===
    pub simulation_time_s: f64,
    pub total_steps: u64,
    pub cardiac_cycles: u64,
    pub mode: PhysiologicalMode,
    pub exercise_intensity: f64,

    // === Hemodynamics ===
    /// Peak aortic pressure of the last beat - target 100-140 mmHg
    pub systolic_mmHg: f64,
    pub systolic_status: VitalStatus,
    /// Trough aortic pressure of the last beat - target 60-90 mmHg
    pub diastolic_mmHg: f64,
    pub diastolic_status: VitalStatus,
    pub mean_arterial_mmHg: f64,
    /// Target 60-100 bpm at rest
    pub heart_rate_bpm: f64,
    pub heart_rate_status: VitalStatus,
    pub stroke_volume_mL: f64,
    /// Target 4-8 L/min at rest
    pub cardiac_output_L_per_min: f64,
    pub cardiac_output_status: VitalStatus,
    pub resistance_multiplier: f64,

    // === Gas exchange ===
    /// Target 80-105 mmHg
    pub pao2_mmHg: f64,
    pub pao2_status: VitalStatus,
    /// Target 35-45 mmHg
    pub paco2_mmHg: f64,
    pub paco2_status: VitalStatus,
    /// Target 94-100 %
    pub sao2_percent: f64,
    pub sao2_status: VitalStatus,
    pub vo2_mL_per_min: f64,

    // === Breathing ===
    pub respiratory_rate_bpm: f64,
    pub minute_ventilation_L_per_min: f64,

    // === Conservation ===
    /// Sum of compartment volumes minus total blood volume
    pub blood_volume_error_mL: f64,
}

impl Default for VitalSigns {
    fn default() -> Self {
        Self {
            simulation_time_s: 0.0,
            total_steps: 0,
            cardiac_cycles: 0,
            mode: PhysiologicalMode::Rest,
            exercise_intensity: 0.0,

            // Resting adult
            systolic_mmHg: 120.0,
            systolic_status: VitalStatus::Normal,
            diastolic_mmHg: 80.0,
            diastolic_status: VitalStatus::Normal,
            mean_arterial_mmHg: 93.0,
            heart_rate_bpm: 75.0,
            heart_rate_status: VitalStatus::Normal,
            stroke_volume_mL: 70.0,
            cardiac_output_L_per_min: 5.25,
            cardiac_output_status: VitalStatus::Normal,
            resistance_multiplier: 1.0,

            pao2_mmHg: 95.0,
            pao2_status: VitalStatus::Normal,
            paco2_mmHg: 40.0,
            paco2_status: VitalStatus::Normal,
            sao2_percent: 97.0,
            sao2_status: VitalStatus::Normal,
            vo2_mL_per_min: 250.0,

            respiratory_rate_bpm: 12.0,
            minute_ventilation_L_per_min: 6.0,

            blood_volume_error_mL: 0.0,
        }
    }
}

impl VitalSigns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update status indicators and mode from the current values
    pub fn update_status(&mut self) {
        self.systolic_status = VitalStatus::from_value(self.systolic_mmHg, 100.0, 140.0);
        self.diastolic_status = VitalStatus::from_value(self.diastolic_mmHg, 60.0, 90.0);

        // Exercise tachycardia and high output are expected, not alarming
        let (hr_max, co_max) = if self.exercise_intensity > 0.0 {
            (190.0, 25.0)
        } else {
            (100.0, 8.0)
        };
        self.heart_rate_status = VitalStatus::from_value(self.heart_rate_bpm, 60.0, hr_max);
        self.cardiac_output_status = VitalStatus::from_value(self.cardiac_output_L_per_min, 4.0, co_max);

        self.pao2_status = VitalStatus::from_value(self.pao2_mmHg, 80.0, 105.0);
        self.paco2_status = VitalStatus::from_value(self.paco2_mmHg, 35.0, 45.0);
        self.sao2_status = VitalStatus::from_value(self.sao2_percent, 94.0, 100.0);

        let statuses = [
            self.systolic_status,
            self.diastolic_status,
            self.heart_rate_status,
            self.cardiac_output_status,
            self.pao2_status,
            self.paco2_status,
            self.sao2_status,
        ];
        self.mode = if statuses.contains(&VitalStatus::Critical) {
            PhysiologicalMode::Distressed
        } else if self.exercise_intensity > 0.0 {
            PhysiologicalMode::Exercise
        } else {
            PhysiologicalMode::Rest
        };
    }

    /// Warnings for every vital sign outside its normal range
    pub fn warnings(&self) -> Vec<String> {
        let checks = [
            ("systolic pressure", self.systolic_mmHg, "mmHg", self.systolic_status),
            ("diastolic pressure", self.diastolic_mmHg, "mmHg", self.diastolic_status),
            ("heart rate", self.heart_rate_bpm, "bpm", self.heart_rate_status),
            ("cardiac output", self.cardiac_output_L_per_min, "L/min", self.cardiac_output_status),
            ("PaO2", self.pao2_mmHg, "mmHg", self.pao2_status),
            ("PaCO2", self.paco2_mmHg, "mmHg", self.paco2_status),
            ("SaO2", self.sao2_percent, "%", self.sao2_status),
        ];
        checks
            .iter()
            .filter(|(_, _, _, status)| *status != VitalStatus::Normal)
            .map(|(name, value, unit, status)| format!("{:?}: {} = {:.1} {}", status, name, value, unit))
            .collect()
    }
}
