//! Chemoreflex control of breathing rate and respiratory muscle drive.
//!
//! Peripheral chemoreceptor firing and arterial PCO2, each after its own
//! transport delay, drive first-order amplitude and rate states. Exercise
//! hyperpnoea scales both outputs by √r.
//!
//! Reference: Albanese 2016, Eq 28-33

use serde::{Deserialize, Serialize};

use crate::config::RespiratoryControlParameters;
use crate::math::lag;

/// Floor on the hyperpnoea ratio under the square root
const MIN_VENTILATION_RATIO: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RespiratoryDrive {
    pub peripheral_amplitude_cmH2O: f64,
    pub peripheral_rate_bpm: f64,
    pub central_amplitude_cmH2O: f64,
    pub central_rate_bpm: f64,
}

/// Derivatives of the four respiratory states
pub fn rates(
    params: &RespiratoryControlParameters,
    drive: &RespiratoryDrive,
    delayed_chemoreceptor_hz: f64,
    nominal_chemoreceptor_hz: f64,
    delayed_paco2_mmHg: f64,
    normal_paco2_mmHg: f64,
) -> RespiratoryDrive {
    let peripheral = delayed_chemoreceptor_hz - nominal_chemoreceptor_hz;
    let central = delayed_paco2_mmHg - normal_paco2_mmHg;
    RespiratoryDrive {
        peripheral_amplitude_cmH2O: lag(
            params.peripheral_amplitude.gain * peripheral,
            drive.peripheral_amplitude_cmH2O,
            params.peripheral_amplitude.time_constant_s,
        ),
        peripheral_rate_bpm: lag(
            params.peripheral_rate.gain * peripheral,
            drive.peripheral_rate_bpm,
            params.peripheral_rate.time_constant_s,
        ),
        central_amplitude_cmH2O: lag(
            params.central_amplitude.gain * central,
            drive.central_amplitude_cmH2O,
            params.central_amplitude.time_constant_s,
        ),
        central_rate_bpm: lag(
            params.central_rate.gain * central,
            drive.central_rate_bpm,
            params.central_rate.time_constant_s,
        ),
    }
}

/// Breathing rate (breaths/min) and peak muscle pressure (cmH2O)
pub fn breathing(
    params: &RespiratoryControlParameters,
    drive: &RespiratoryDrive,
    rest_rate_bpm: f64,
    rest_muscle_pressure_cmH2O: f64,
    ventilation_ratio: f64,
) -> (f64, f64) {
    let scale = ventilation_ratio.max(MIN_VENTILATION_RATIO).sqrt();
    let rate = ((rest_rate_bpm + drive.peripheral_rate_bpm + drive.central_rate_bpm) * scale)
        .clamp(params.rate_min_bpm, params.rate_max_bpm);
    let pmin = ((rest_muscle_pressure_cmH2O - drive.peripheral_amplitude_cmH2O - drive.central_amplitude_cmH2O)
        * scale)
        .min(params.muscle_pressure_ceiling_cmH2O);
    (rate, pmin)
}
