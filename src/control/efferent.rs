//! Sympathetic and vagal efferent firing, with the exercise central
//! command added as a feed-forward term.
//!
//! References:
//! - Magosso & Ursino 2001, Eq 7-9
//! - Magosso & Ursino 2002, Eq 1 (central command)

use serde::Serialize;

use super::effectors::Pathway;
use crate::config::{CentralCommandCurve, ControlParameters, SympatheticWeights};
use crate::math::{clipped_exp, sigmoid};

/// Afferent firing rates (spikes/s) plus the summed CNS ischemic drive
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct AfferentRates {
    pub baroreceptor_hz: f64,
    pub chemoreceptor_hz: f64,
    pub lung_stretch_hz: f64,
    pub cns_hz: f64,
}

/// Efferent firing per pathway (spikes/s)
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct EfferentRates {
    pub resistance_hz: f64,
    pub venous_hz: f64,
    pub heart_hz: f64,
    pub vagal_hz: f64,
}

impl EfferentRates {
    pub fn rate(&self, pathway: Pathway) -> f64 {
        match pathway {
            Pathway::Resistance => self.resistance_hz,
            Pathway::Venous => self.venous_hz,
            Pathway::Heart => self.heart_hz,
            Pathway::Vagal => self.vagal_hz,
        }
    }
}

/// Central command γ(I), near zero at rest
pub fn central_command(curve: &CentralCommandCurve, intensity: f64) -> f64 {
    sigmoid(
        intensity,
        curve.gain_min_hz,
        curve.gain_max_hz,
        curve.intensity_centre,
        curve.intensity_slope,
    )
}

/// Efferent model with its offsets fixed so chemoreceptor and stretch
/// input cancel at their nominal rates
#[derive(Debug, Clone)]
pub struct Efferent {
    params: ControlParameters,
    resistance_offset: f64,
    venous_offset: f64,
    heart_offset: f64,
    vagal_offset: f64,
}

impl Efferent {
    pub fn new(params: &ControlParameters) -> Self {
        let fac_n = params.chemoreceptor.nominal_rate_hz;
        let fap_n = params.lung_stretch.nominal_rate_hz;
        let offset = |w: &SympatheticWeights| w.chemoreceptor * fac_n - w.lung_stretch * fap_n;
        let s = &params.sympathetic;
        Self {
            params: params.clone(),
            resistance_offset: offset(&s.resistance_weights),
            venous_offset: offset(&s.venous_weights),
            heart_offset: offset(&s.heart_weights),
            vagal_offset: params.vagal.chemoreceptor_weight * fac_n - params.vagal.lung_stretch_weight * fap_n,
        }
    }

    fn sympathetic(&self, weights: &SympatheticWeights, offset: f64, curve: &CentralCommandCurve, a: &AfferentRates, intensity: f64) -> f64 {
        let s = &self.params.sympathetic;
        let drive = -weights.baroreceptor * a.baroreceptor_hz + weights.chemoreceptor * a.chemoreceptor_hz
            - weights.lung_stretch * a.lung_stretch_hz
            + a.cns_hz
            - offset;
        let rate = s.rate_asymptote_hz
            + (s.rate_zero_input_hz - s.rate_asymptote_hz) * clipped_exp(s.exponent_gain * drive)
            + central_command(curve, intensity);
        rate.min(s.rate_max_hz)
    }

    fn vagal(&self, a: &AfferentRates, intensity: f64) -> f64 {
        let v = &self.params.vagal;
        let baro = sigmoid(
            a.baroreceptor_hz,
            v.rate_zero_input_hz,
            v.rate_asymptote_hz,
            v.baroreceptor_centre_hz,
            v.slope_hz,
        );
        let rate = baro + v.chemoreceptor_weight * a.chemoreceptor_hz - v.lung_stretch_weight * a.lung_stretch_hz
            - self.vagal_offset
            - central_command(&self.params.central_command.vagal, intensity);
        rate.max(0.0)
    }

    pub fn rates(&self, afferent: &AfferentRates, intensity: f64) -> EfferentRates {
        let s = &self.params.sympathetic;
        let cc = &self.params.central_command;
        EfferentRates {
            resistance_hz: self.sympathetic(&s.resistance_weights, self.resistance_offset, &cc.resistance, afferent, intensity),
            venous_hz: self.sympathetic(&s.venous_weights, self.venous_offset, &cc.venous, afferent, intensity),
            heart_hz: self.sympathetic(&s.heart_weights, self.heart_offset, &cc.heart, afferent, intensity),
            vagal_hz: self.vagal(afferent, intensity),
        }
    }
}
