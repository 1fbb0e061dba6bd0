//! Airway and alveolar mechanics driven by the respiratory muscles.
//!
//! Four compliant compartments in series (larynx, trachea, bronchi,
//! alveoli) joined by resistances, with the chest wall between pleural
//! space and atmosphere. Pressures are in cmH2O, volumes in L, flows in L/s.
//!
//! Reference: Albanese 2016, Eq 1-10

use serde::{Deserialize, Serialize};

use crate::config::LungMechanicsParameters;
use crate::simulation::integrator::impl_integrate;

/// cmH2O → mmHg
pub const CMH2O_TO_MMHG: f64 = 0.73556;

/// Intensity above which inspiration and expiration shorten together
const TIMING_INTENSITY_BREAK: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LungState {
    pub larynx_pressure_cmH2O: f64,
    pub trachea_pressure_cmH2O: f64,
    pub bronchi_pressure_cmH2O: f64,
    pub alveolar_pressure_cmH2O: f64,
    pub pleural_pressure_cmH2O: f64,
    /// Fraction of the current breath, in [0, 1)
    pub respiratory_phase: f64,
}

impl_integrate!(LungState {
    larynx_pressure_cmH2O,
    trachea_pressure_cmH2O,
    bronchi_pressure_cmH2O,
    alveolar_pressure_cmH2O,
    pleural_pressure_cmH2O,
    respiratory_phase,
});

impl LungState {
    /// Relaxed lungs at end-expiration
    pub fn end_expiration(params: &LungMechanicsParameters) -> Self {
        Self {
            pleural_pressure_cmH2O: params.end_expiratory_pleural_pressure_cmH2O,
            ..Self::default()
        }
    }
}

/// Muscle-driven phase of the breath. The expiratory pause counts as
/// expiration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum RespiratoryPhase {
    Inspiration,
    #[default]
    Expiration,
}

/// Breath period split into inspiratory and expiratory muscle activity
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BreathTiming {
    pub period_s: f64,
    pub inspiration_s: f64,
    pub expiration_s: f64,
}

impl BreathTiming {
    pub fn new(respiratory_rate_bpm: f64, intensity: f64) -> Self {
        let period_s = 60.0 / respiratory_rate_bpm;
        let (ti, te) = if intensity <= TIMING_INTENSITY_BREAK {
            (0.4 + 0.1 * intensity, 0.35 + 1.15 * intensity)
        } else {
            let share = 0.6 - 0.1 * intensity;
            (share, share)
        };
        let te = te.min(1.0 - ti);
        Self {
            period_s,
            inspiration_s: ti * period_s,
            expiration_s: te * period_s,
        }
    }

    /// Seconds of muscle activity per breath
    pub fn active_s(&self) -> f64 {
        self.inspiration_s + self.expiration_s
    }
}

/// Respiratory muscle pressure, its time derivative and the phase.
///
/// Parabolic during inspiration, exponential decay during expiration
/// and zero in the pause that follows.
pub fn muscle_pressure(
    timing: &BreathTiming,
    time_in_breath_s: f64,
    pmin_cmH2O: f64,
    tau_ratio: f64,
) -> (f64, f64, RespiratoryPhase) {
    let b = time_in_breath_s;
    let ti = timing.inspiration_s;
    let te = timing.expiration_s;
    if b <= ti {
        let p = pmin_cmH2O * b * (ti + te - b) / (ti * te);
        let dp = pmin_cmH2O * (ti + te - 2.0 * b) / (ti * te);
        return (p, dp, RespiratoryPhase::Inspiration);
    }
    if b <= ti + te {
        let tau = te / tau_ratio;
        let tail = (-te / tau).exp();
        let denom = 1.0 - tail;
        let decay = (-(b - ti) / tau).exp();
        let p = pmin_cmH2O * (decay - tail) / denom;
        let dp = -pmin_cmH2O * decay / (tau * denom);
        return (p, dp, RespiratoryPhase::Expiration);
    }
    (0.0, 0.0, RespiratoryPhase::Expiration)
}

#[derive(Debug, Clone, Copy)]
pub struct LungInputs {
    pub respiratory_rate_bpm: f64,
    pub muscle_pressure_min_cmH2O: f64,
    pub intensity: f64,
    /// When false the circulation sees a constant end-expiratory Pthor
    pub thoracic_coupling: bool,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct LungVolumes {
    pub larynx_L: f64,
    pub trachea_L: f64,
    pub bronchi_L: f64,
    pub alveolar_L: f64,
}

impl LungVolumes {
    /// Anatomical dead space
    pub fn dead_space_L(&self) -> f64 {
        self.larynx_L + self.trachea_L + self.bronchi_L
    }

    pub fn total_L(&self) -> f64 {
        self.dead_space_L() + self.alveolar_L
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct LungOutputs {
    pub phase: RespiratoryPhase,
    pub timing: BreathTiming,
    pub muscle_pressure_cmH2O: f64,
    /// Airflow at the mouth, positive inward
    pub mouth_flow_L_per_s: f64,
    /// Airflow from bronchi into the alveoli
    pub alveolar_flow_L_per_s: f64,
    pub volumes: LungVolumes,
    pub thoracic_pressure_mmHg: f64,
    pub thoracic_pressure_rate_mmHg_per_s: f64,
    pub abdominal_pressure_mmHg: f64,
}

#[derive(Debug, Clone)]
pub struct LungMechanics {
    params: LungMechanicsParameters,
    alveolar_unstressed_volume_L: f64,
}

impl LungMechanics {
    pub fn new(params: &LungMechanicsParameters) -> Self {
        let p = params;
        let ppl = p.end_expiratory_pleural_pressure_cmH2O;
        // Dead space at end-expiration, when every airway pressure is zero
        let dead_space_ee = p.larynx_unstressed_volume_L
            + p.trachea_compliance_L_per_cmH2O * -ppl
            + p.trachea_unstressed_volume_L
            + p.bronchi_compliance_L_per_cmH2O * -ppl
            + p.bronchi_unstressed_volume_L;
        Self {
            params: params.clone(),
            alveolar_unstressed_volume_L: p.functional_residual_capacity_L
                + p.alveolar_compliance_L_per_cmH2O * ppl
                - dead_space_ee,
        }
    }

    pub fn params(&self) -> &LungMechanicsParameters {
        &self.params
    }

    pub fn volumes(&self, state: &LungState) -> LungVolumes {
        let p = &self.params;
        let ppl = state.pleural_pressure_cmH2O;
        LungVolumes {
            larynx_L: p.larynx_compliance_L_per_cmH2O * state.larynx_pressure_cmH2O + p.larynx_unstressed_volume_L,
            trachea_L: p.trachea_compliance_L_per_cmH2O * (state.trachea_pressure_cmH2O - ppl)
                + p.trachea_unstressed_volume_L,
            bronchi_L: p.bronchi_compliance_L_per_cmH2O * (state.bronchi_pressure_cmH2O - ppl)
                + p.bronchi_unstressed_volume_L,
            alveolar_L: p.alveolar_compliance_L_per_cmH2O * (state.alveolar_pressure_cmH2O - ppl)
                + self.alveolar_unstressed_volume_L,
        }
    }

    /// Thoracic pressure seen by the circulation when coupling is off (mmHg)
    pub fn resting_thoracic_pressure_mmHg(&self) -> f64 {
        self.params.end_expiratory_pleural_pressure_cmH2O * CMH2O_TO_MMHG
    }

    pub fn compute_derivatives(&self, state: &LungState, inputs: &LungInputs) -> (LungState, LungOutputs) {
        let p = &self.params;
        let timing = BreathTiming::new(inputs.respiratory_rate_bpm, inputs.intensity);
        let (pmus, dpmus, phase) = muscle_pressure(
            &timing,
            state.respiratory_phase * timing.period_s,
            inputs.muscle_pressure_min_cmH2O,
            p.expiratory_time_constant_ratio,
        );

        let q_ml = -state.larynx_pressure_cmH2O / p.mouth_larynx_resistance_cmH2O_s_per_L;
        let q_lt = (state.larynx_pressure_cmH2O - state.trachea_pressure_cmH2O) / p.larynx_trachea_resistance_cmH2O_s_per_L;
        let q_tb = (state.trachea_pressure_cmH2O - state.bronchi_pressure_cmH2O) / p.trachea_bronchi_resistance_cmH2O_s_per_L;
        let q_ba = (state.bronchi_pressure_cmH2O - state.alveolar_pressure_cmH2O) / p.bronchi_alveoli_resistance_cmH2O_s_per_L;

        let d_ppl = dpmus + q_lt / p.chest_wall_compliance_L_per_cmH2O;
        let rates = LungState {
            larynx_pressure_cmH2O: (q_ml - q_lt) / p.larynx_compliance_L_per_cmH2O,
            trachea_pressure_cmH2O: d_ppl + (q_lt - q_tb) / p.trachea_compliance_L_per_cmH2O,
            bronchi_pressure_cmH2O: d_ppl + (q_tb - q_ba) / p.bronchi_compliance_L_per_cmH2O,
            alveolar_pressure_cmH2O: d_ppl + q_ba / p.alveolar_compliance_L_per_cmH2O,
            pleural_pressure_cmH2O: d_ppl,
            respiratory_phase: 1.0 / timing.period_s,
        };

        let (pthor, d_pthor, pabd) = if inputs.thoracic_coupling {
            let drive = (pmus / inputs.muscle_pressure_min_cmH2O).clamp(0.0, 1.0);
            (
                state.pleural_pressure_cmH2O * CMH2O_TO_MMHG,
                d_ppl * CMH2O_TO_MMHG,
                p.abdominal_pressure_max_mmHg - (p.abdominal_pressure_max_mmHg - p.abdominal_pressure_min_mmHg) * drive,
            )
        } else {
            (self.resting_thoracic_pressure_mmHg(), 0.0, p.abdominal_pressure_max_mmHg)
        };

        let outputs = LungOutputs {
            phase,
            timing,
            muscle_pressure_cmH2O: pmus,
            mouth_flow_L_per_s: q_ml,
            alveolar_flow_L_per_s: q_ba,
            volumes: self.volumes(state),
            thoracic_pressure_mmHg: pthor,
            thoracic_pressure_rate_mmHg_per_s: d_pthor,
            abdominal_pressure_mmHg: pabd,
        };

        (rates, outputs)
    }
}
