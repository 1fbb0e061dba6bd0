//! Run configuration: step size, duration, heart rate, sampling and the
//! scenario switches.

use serde::{Deserialize, Serialize};

use crate::control::ExerciseProfile;
use crate::error::ConfigError;

/// Largest step the explicit Euler scheme is stable at with the default
/// parameter set (s). Found by running the full model at increasing steps;
/// the ventricular state diverges first, within a tenth of a second at 0.5 ms.
pub const MAX_STABLE_DT_S: f64 = 0.0004;

/// Control loop switches
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlConfig {
    /// When false every control state and effector stays at rest
    pub enabled: bool,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Configuration of one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Integration step (s)
    pub dt_s: f64,
    /// Run length (s)
    pub duration_s: f64,
    /// Resting heart rate the cardiac period effector is centred on (bpm)
    pub heart_rate_bpm: f64,
    /// Interval between time-series samples (s)
    pub sample_interval_s: f64,
    pub exercise: ExerciseProfile,
    pub control: ControlConfig,
    /// Feed pleural pressure into the circulation as intrathoracic pressure
    pub thoracic_coupling: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            dt_s: 0.0002,
            duration_s: 30.0,
            heart_rate_bpm: 75.0,
            sample_interval_s: 0.001,
            exercise: ExerciseProfile::Rest,
            control: ControlConfig::default(),
            thoracic_coupling: true,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.dt_s.is_finite() && self.dt_s > 0.0 && self.dt_s <= MAX_STABLE_DT_S) {
            return Err(ConfigError::InvalidTimeStep {
                dt_s: self.dt_s,
                max_s: MAX_STABLE_DT_S,
            });
        }
        if !(self.duration_s.is_finite() && self.duration_s > 0.0) {
            return Err(ConfigError::InvalidDuration(self.duration_s));
        }
        if !(self.heart_rate_bpm.is_finite() && self.heart_rate_bpm >= 30.0 && self.heart_rate_bpm <= 250.0) {
            return Err(ConfigError::InvalidParameter {
                name: "heart_rate_bpm".into(),
                value: self.heart_rate_bpm,
                reason: "must lie in [30, 250] bpm",
            });
        }
        if !(self.sample_interval_s.is_finite() && self.sample_interval_s > 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "sample_interval_s".into(),
                value: self.sample_interval_s,
                reason: "must be positive",
            });
        }
        Ok(())
    }

    /// Number of steps covering the duration
    pub fn total_steps(&self) -> u64 {
        (self.duration_s / self.dt_s).round() as u64
    }

    /// Steps between samples, at least one
    pub fn sample_every(&self) -> u64 {
        ((self.sample_interval_s / self.dt_s).round() as u64).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_step_above_stability_limit_rejected() {
        let config = SimulationConfig {
            dt_s: 0.001,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTimeStep { .. })));
    }

    #[test]
    fn test_non_positive_step_and_duration_rejected() {
        let zero_dt = SimulationConfig {
            dt_s: 0.0,
            ..Default::default()
        };
        assert!(matches!(zero_dt.validate(), Err(ConfigError::InvalidTimeStep { .. })));

        let negative = SimulationConfig {
            duration_s: -1.0,
            ..Default::default()
        };
        assert!(matches!(negative.validate(), Err(ConfigError::InvalidDuration(_))));
    }

    #[test]
    fn test_sampling_counts() {
        let config = SimulationConfig::default();
        assert_eq!(config.total_steps(), 150_000);
        assert_eq!(config.sample_every(), 5);
    }
}
