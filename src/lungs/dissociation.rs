//! Coupled O2/CO2 blood dissociation curves (Spencer et al. 1979).
//!
//! Each gas's effective pressure is scaled by the other gas (Bohr and
//! Haldane effects), and content follows a Hill-type saturation law.

use crate::config::{DissociationParameters, LungGasParameters};
use crate::gas::GasPair;

/// mmol/L → mL gas (STPD) per mL blood
pub const MMOL_PER_L_TO_ML_PER_ML: f64 = 0.0224;

/// Fixed-point sweeps used by the inverse; converges to machine precision
/// well before this for physiological contents.
const INVERSE_ITERATIONS: usize = 30;

/// Relative margin keeping an inverted content inside (0, Csat)
const SATURATION_MARGIN: f64 = 1e-9;

/// O2 bound per gram of hemoglobin (mL/g)
const HUFNER_ML_PER_G: f64 = 1.34;
/// Plasma O2 solubility (mL/dL/mmHg)
const O2_SOLUBILITY: f64 = 0.003;

#[derive(Debug, Clone)]
pub struct Dissociation {
    o2: DissociationParameters,
    co2: DissociationParameters,
    hemoglobin_g_per_dL: f64,
}

impl Dissociation {
    pub fn new(params: &LungGasParameters) -> Self {
        Self {
            o2: params.o2,
            co2: params.co2,
            hemoglobin_g_per_dL: params.hemoglobin_g_per_dL,
        }
    }

    fn saturation_content(d: &DissociationParameters) -> f64 {
        d.saturation_mmol_per_L * MMOL_PER_L_TO_ML_PER_ML
    }

    /// Blood content (mL/mL) at the given partial pressures (mmHg).
    pub fn content(&self, pressure: GasPair) -> GasPair {
        let po2 = pressure.o2.max(0.0);
        let pco2 = pressure.co2.max(0.0);
        let (o, c) = (&self.o2, &self.co2);
        let xo = po2 * (1.0 + o.beta_per_mmHg * pco2) / (o.half_saturation_mmHg * (1.0 + o.alpha_per_mmHg * pco2));
        let xc = pco2 * (1.0 + c.beta_per_mmHg * po2) / (c.half_saturation_mmHg * (1.0 + c.alpha_per_mmHg * po2));
        let yo = xo.powf(1.0 / o.hill_exponent);
        let yc = xc.powf(1.0 / c.hill_exponent);
        GasPair {
            o2: Self::saturation_content(o) * yo / (1.0 + yo),
            co2: Self::saturation_content(c) * yc / (1.0 + yc),
        }
    }

    /// Partial pressures (mmHg) that produce the given content.
    ///
    /// Contents are clamped into (0, Csat) before inversion, then the two
    /// coupled equations are solved by alternating fixed-point sweeps.
    pub fn partial_pressures(&self, content: GasPair) -> GasPair {
        let (o, c) = (&self.o2, &self.co2);
        let so = Self::saturation_content(o);
        let sc = Self::saturation_content(c);
        let co = content.o2.clamp(so * SATURATION_MARGIN, so * (1.0 - SATURATION_MARGIN));
        let cc = content.co2.clamp(sc * SATURATION_MARGIN, sc * (1.0 - SATURATION_MARGIN));
        let xo = (co / (so - co)).powf(o.hill_exponent);
        let xc = (cc / (sc - cc)).powf(c.hill_exponent);

        let mut po2 = 100.0;
        let mut pco2 = 40.0;
        for _ in 0..INVERSE_ITERATIONS {
            po2 = xo * o.half_saturation_mmHg * (1.0 + o.alpha_per_mmHg * pco2) / (1.0 + o.beta_per_mmHg * pco2);
            pco2 = xc * c.half_saturation_mmHg * (1.0 + c.alpha_per_mmHg * po2) / (1.0 + c.beta_per_mmHg * po2);
        }
        GasPair { o2: po2, co2: pco2 }
    }

    /// Hemoglobin O2 saturation (%) from arterial O2 content and PO2.
    pub fn saturation_percent(&self, o2_content_mL_per_mL: f64, po2_mmHg: f64) -> f64 {
        let bound = o2_content_mL_per_mL * 100.0 - O2_SOLUBILITY * po2_mmHg;
        (bound / (HUFNER_ML_PER_G * self.hemoglobin_g_per_dL) * 100.0).clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn curves() -> Dissociation {
        Dissociation::new(&LungGasParameters::default())
    }

    #[test]
    fn test_normal_arterial_content() {
        let ca = curves().content(GasPair { o2: 100.0, co2: 40.0 });
        assert!(ca.o2 > 0.18 && ca.o2 < 0.21, "CaO2 {}", ca.o2);
        assert!(ca.co2 > 0.45 && ca.co2 < 0.52, "CaCO2 {}", ca.co2);
    }

    #[test]
    fn test_inverse_recovers_pressures() {
        let d = curves();
        for (po2, pco2) in [(100.0, 40.0), (40.0, 46.0), (60.0, 30.0)] {
            let back = d.partial_pressures(d.content(GasPair { o2: po2, co2: pco2 }));
            assert_relative_eq!(back.o2, po2, max_relative = 1e-6);
            assert_relative_eq!(back.co2, pco2, max_relative = 1e-6);
        }
    }

    #[test]
    fn test_bohr_effect_lowers_o2_content() {
        let d = curves();
        let low = d.content(GasPair { o2: 40.0, co2: 30.0 });
        let high = d.content(GasPair { o2: 40.0, co2: 60.0 });
        assert!(high.o2 < low.o2);
    }

    #[test]
    fn test_inverse_survives_out_of_range_content() {
        let d = curves();
        let p = d.partial_pressures(GasPair { o2: -0.1, co2: 5.0 });
        assert!(p.o2.is_finite() && p.co2.is_finite());
    }

    #[test]
    fn test_arterial_saturation_near_full() {
        let d = curves();
        let ca = d.content(GasPair { o2: 100.0, co2: 40.0 });
        let sa = d.saturation_percent(ca.o2, 100.0);
        assert!(sa > 90.0 && sa <= 100.0, "SaO2 {}", sa);
    }
}
