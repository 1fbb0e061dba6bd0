//! Sampled time series of a run, addressable by column name.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// One sample of the observable quantities.
///
/// Serialised column names are the short physiological symbols used
/// throughout the literature (LVP, Psa, PaO2...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesRecord {
    #[serde(rename = "time")]
    pub time_s: f64,

    // Heart
    #[serde(rename = "LVP")]
    pub lv_pressure_mmHg: f64,
    #[serde(rename = "RVP")]
    pub rv_pressure_mmHg: f64,
    #[serde(rename = "LVV")]
    pub lv_volume_mL: f64,
    #[serde(rename = "RVV")]
    pub rv_volume_mL: f64,
    #[serde(rename = "LAP")]
    pub la_pressure_mmHg: f64,
    #[serde(rename = "RAP")]
    pub ra_pressure_mmHg: f64,
    #[serde(rename = "Qmv")]
    pub mitral_flow_mL_per_s: f64,
    #[serde(rename = "Qaov")]
    pub aortic_flow_mL_per_s: f64,
    #[serde(rename = "Qtv")]
    pub tricuspid_flow_mL_per_s: f64,
    #[serde(rename = "Qpulv")]
    pub pulmonary_valve_flow_mL_per_s: f64,
    #[serde(rename = "HR")]
    pub heart_rate_bpm: f64,

    // Circulation
    #[serde(rename = "Psa")]
    pub aortic_pressure_mmHg: f64,
    #[serde(rename = "Qsa")]
    pub systemic_arterial_flow_mL_per_s: f64,
    #[serde(rename = "Pp")]
    pub peripheral_pressure_mmHg: f64,
    #[serde(rename = "Ptv")]
    pub thoracic_vein_pressure_mmHg: f64,
    #[serde(rename = "Qvr")]
    pub venous_return_mL_per_s: f64,
    #[serde(rename = "Ppa")]
    pub pulmonary_arterial_pressure_mmHg: f64,
    #[serde(rename = "Ppv")]
    pub pulmonary_venous_pressure_mmHg: f64,
    /// Extrasplanchnic peripheral outflow into its vein
    #[serde(rename = "Qep")]
    pub extrasplanchnic_peripheral_flow_mL_per_s: f64,
    #[serde(rename = "Qev")]
    pub extrasplanchnic_venous_flow_mL_per_s: f64,
    /// Closure volume
    #[serde(rename = "Vev")]
    pub extrasplanchnic_venous_volume_mL: f64,
    #[serde(rename = "TBV")]
    pub total_blood_volume_mL: f64,

    // Lungs
    #[serde(rename = "Ppl")]
    pub pleural_pressure_cmH2O: f64,
    #[serde(rename = "PA")]
    pub alveolar_pressure_cmH2O: f64,
    #[serde(rename = "Pmus")]
    pub muscle_pressure_cmH2O: f64,
    #[serde(rename = "Pthor")]
    pub thoracic_pressure_mmHg: f64,
    #[serde(rename = "Vdot")]
    pub mouth_flow_L_per_s: f64,
    #[serde(rename = "VL")]
    pub lung_volume_L: f64,
    #[serde(rename = "RR")]
    pub respiratory_rate_bpm: f64,
    #[serde(rename = "minute_ventilation")]
    pub minute_ventilation_L_per_min: f64,

    // Gases
    #[serde(rename = "PAO2")]
    pub alveolar_po2_mmHg: f64,
    #[serde(rename = "PACO2")]
    pub alveolar_pco2_mmHg: f64,
    #[serde(rename = "PaO2")]
    pub pao2_mmHg: f64,
    #[serde(rename = "PaCO2")]
    pub paco2_mmHg: f64,
    #[serde(rename = "SaO2")]
    pub sao2_percent: f64,
    #[serde(rename = "CvO2")]
    pub mixed_venous_o2: f64,
    #[serde(rename = "CvCO2")]
    pub mixed_venous_co2: f64,
    #[serde(rename = "metabolic.VO2")]
    pub metabolic_vo2_mL_per_min: f64,
    #[serde(rename = "VO2_rest")]
    pub rest_vo2_mL_per_min: f64,
    #[serde(rename = "VO2_lung")]
    pub lung_o2_uptake_mL_per_min: f64,

    // Control
    #[serde(rename = "I")]
    pub intensity: f64,
    #[serde(rename = "f_ab")]
    pub baroreceptor_hz: f64,
    #[serde(rename = "f_ac")]
    pub chemoreceptor_hz: f64,
    #[serde(rename = "f_ap")]
    pub lung_stretch_hz: f64,
    #[serde(rename = "f_es")]
    pub sympathetic_hz: f64,
    #[serde(rename = "f_ev")]
    pub vagal_hz: f64,
    #[serde(rename = "Emax_lv")]
    pub lv_elastance_mmHg_per_mL: f64,
    #[serde(rename = "R_mult")]
    pub resistance_multiplier: f64,
}

impl TimeSeriesRecord {
    /// Every column name, in serialisation order
    pub const COLUMNS: &'static [&'static str] = &[
        "time", "LVP", "RVP", "LVV", "RVV", "LAP", "RAP", "Qmv", "Qaov", "Qtv", "Qpulv", "HR",
        "Psa", "Qsa", "Pp", "Ptv", "Qvr", "Ppa", "Ppv", "Qep", "Qev", "Vev", "TBV",
        "Ppl", "PA", "Pmus", "Pthor", "Vdot", "VL", "RR", "minute_ventilation",
        "PAO2", "PACO2", "PaO2", "PaCO2", "SaO2", "CvO2", "CvCO2", "metabolic.VO2", "VO2_rest", "VO2_lung",
        "I", "f_ab", "f_ac", "f_ap", "f_es", "f_ev", "Emax_lv", "R_mult",
    ];

    /// Value of a column by its serialised name
    pub fn value(&self, column: &str) -> Option<f64> {
        let v = match column {
            "time" => self.time_s,
            "LVP" => self.lv_pressure_mmHg,
            "RVP" => self.rv_pressure_mmHg,
            "LVV" => self.lv_volume_mL,
            "RVV" => self.rv_volume_mL,
            "LAP" => self.la_pressure_mmHg,
            "RAP" => self.ra_pressure_mmHg,
            "Qmv" => self.mitral_flow_mL_per_s,
            "Qaov" => self.aortic_flow_mL_per_s,
            "Qtv" => self.tricuspid_flow_mL_per_s,
            "Qpulv" => self.pulmonary_valve_flow_mL_per_s,
            "HR" => self.heart_rate_bpm,
            "Psa" => self.aortic_pressure_mmHg,
            "Qsa" => self.systemic_arterial_flow_mL_per_s,
            "Pp" => self.peripheral_pressure_mmHg,
            "Ptv" => self.thoracic_vein_pressure_mmHg,
            "Qvr" => self.venous_return_mL_per_s,
            "Ppa" => self.pulmonary_arterial_pressure_mmHg,
            "Ppv" => self.pulmonary_venous_pressure_mmHg,
            "Qep" => self.extrasplanchnic_peripheral_flow_mL_per_s,
            "Qev" => self.extrasplanchnic_venous_flow_mL_per_s,
            "Vev" => self.extrasplanchnic_venous_volume_mL,
            "TBV" => self.total_blood_volume_mL,
            "Ppl" => self.pleural_pressure_cmH2O,
            "PA" => self.alveolar_pressure_cmH2O,
            "Pmus" => self.muscle_pressure_cmH2O,
            "Pthor" => self.thoracic_pressure_mmHg,
            "Vdot" => self.mouth_flow_L_per_s,
            "VL" => self.lung_volume_L,
            "RR" => self.respiratory_rate_bpm,
            "minute_ventilation" => self.minute_ventilation_L_per_min,
            "PAO2" => self.alveolar_po2_mmHg,
            "PACO2" => self.alveolar_pco2_mmHg,
            "PaO2" => self.pao2_mmHg,
            "PaCO2" => self.paco2_mmHg,
            "SaO2" => self.sao2_percent,
            "CvO2" => self.mixed_venous_o2,
            "CvCO2" => self.mixed_venous_co2,
            "metabolic.VO2" => self.metabolic_vo2_mL_per_min,
            "VO2_rest" => self.rest_vo2_mL_per_min,
            "VO2_lung" => self.lung_o2_uptake_mL_per_min,
            "I" => self.intensity,
            "f_ab" => self.baroreceptor_hz,
            "f_ac" => self.chemoreceptor_hz,
            "f_ap" => self.lung_stretch_hz,
            "f_es" => self.sympathetic_hz,
            "f_ev" => self.vagal_hz,
            "Emax_lv" => self.lv_elastance_mmHg_per_mL,
            "R_mult" => self.resistance_multiplier,
            _ => return None,
        };
        Some(v)
    }
}

/// Samples of one run in time order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeSeries {
    records: Vec<TimeSeriesRecord>,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, record: TimeSeriesRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[TimeSeriesRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&TimeSeriesRecord> {
        self.records.last()
    }

    /// All samples of one column.
    pub fn column(&self, name: &str) -> Result<Vec<f64>> {
        if !TimeSeriesRecord::COLUMNS.contains(&name) {
            return Err(SimError::UnknownColumn(name.to_string()));
        }
        Ok(self.records.iter().filter_map(|r| r.value(name)).collect())
    }

    /// Mean of a column over samples with `from_s <= time < to_s`
    pub fn window_mean(&self, name: &str, from_s: f64, to_s: f64) -> Result<f64> {
        if !TimeSeriesRecord::COLUMNS.contains(&name) {
            return Err(SimError::UnknownColumn(name.to_string()));
        }
        let (sum, n) = self
            .records
            .iter()
            .filter(|r| r.time_s >= from_s && r.time_s < to_s)
            .filter_map(|r| r.value(name))
            .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
        Ok(if n > 0 { sum / n as f64 } else { f64::NAN })
    }
}
