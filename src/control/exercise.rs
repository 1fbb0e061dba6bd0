//! Exercise intensity profiles and the exercise drives: metabolic
//! vasodilation, muscle O2 demand and exercise hyperpnoea.
//!
//! Reference: Magosso & Ursino 2002

use serde::{Deserialize, Serialize};

use crate::config::{ExerciseVentilationParameters, MetabolicVasodilationParameters};
use crate::math::sigmoid;

/// Exercise intensity over time, normalised to [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExerciseProfile {
    #[default]
    Rest,
    Constant { intensity: f64 },
    /// Linear change from `from` to `to` over `duration_s` starting at `start_s`
    Ramp { start_s: f64, duration_s: f64, from: f64, to: f64 },
    /// Jump to `intensity` at `at_s`
    Step { at_s: f64, intensity: f64 },
}

impl ExerciseProfile {
    pub fn intensity(&self, t_s: f64) -> f64 {
        let raw = match *self {
            ExerciseProfile::Rest => 0.0,
            ExerciseProfile::Constant { intensity } => intensity,
            ExerciseProfile::Ramp { start_s, duration_s, from, to } => {
                if t_s <= start_s {
                    from
                } else if duration_s <= 0.0 || t_s >= start_s + duration_s {
                    to
                } else {
                    from + (to - from) * (t_s - start_s) / duration_s
                }
            }
            ExerciseProfile::Step { at_s, intensity } => {
                if t_s >= at_s {
                    intensity
                } else {
                    0.0
                }
            }
        };
        raw.clamp(0.0, 1.0)
    }
}

/// Target of the metabolic vasodilation state at (delayed) intensity
pub fn metabolic_vasodilation_target(params: &MetabolicVasodilationParameters, intensity: f64) -> f64 {
    sigmoid(
        intensity,
        params.response_min,
        params.response_max,
        params.intensity_centre,
        params.intensity_slope,
    )
}

/// Extra ventilation demanded by exercise, ΔV̇ = A·I + B·I² (L/min)
pub fn ventilation_target(params: &ExerciseVentilationParameters, intensity: f64) -> f64 {
    params.linear_L_per_min * intensity + params.quadratic_L_per_min * intensity * intensity
}

/// Hyperpnoea ratio r = 1 + (fast·ΔV̇ + slow)/V̇n
pub fn ventilation_ratio(params: &ExerciseVentilationParameters, delayed_target: f64, slow_state: f64) -> f64 {
    1.0 + (params.fast_fraction * delayed_target + slow_state) / params.nominal_ventilation_L_per_min
}
