//! Interventricular septum displacement.
//!
//! Reference: Albanese 2016 (septal extension of the Ursino heart)

use crate::config::SeptumParameters;

/// Septal volume for a transseptal pressure `pspt = Plv − Prv` evaluated at
/// zero outflow.
pub fn septal_volume(params: &SeptumParameters, pspt: f64, phi: f64) -> f64 {
    let systolic = pspt / params.systolic_elastance_mmHg_per_mL + params.systolic_offset_mL;
    let diastolic = pspt.signum()
        * (pspt.abs() / params.diastolic_pressure_scale_mmHg + 1.0).ln()
        / params.diastolic_stiffness_per_mL
        + params.diastolic_offset_mL;
    phi * systolic + (1.0 - phi) * diastolic
}

/// Volumes seen by the left and right chambers after septal shift.
pub fn effective_volumes(lv_mL: f64, rv_mL: f64, septal_mL: f64) -> (f64, f64) {
    (lv_mL + septal_mL, (rv_mL - septal_mL).max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HeartParameters;

    #[test]
    fn test_diastolic_branch_is_odd_about_offset() {
        let p = HeartParameters::default().septum;
        let up = septal_volume(&p, 5.0, 0.0) - p.diastolic_offset_mL;
        let down = septal_volume(&p, -5.0, 0.0) - p.diastolic_offset_mL;
        assert!((up + down).abs() < 1e-12);
        assert!(up > 0.0);
    }

    #[test]
    fn test_septal_volume_grows_with_pressure() {
        let p = HeartParameters::default().septum;
        for phi in [0.0, 0.5, 1.0] {
            assert!(septal_volume(&p, 20.0, phi) > septal_volume(&p, 10.0, phi));
        }
    }

    #[test]
    fn test_effective_right_volume_floored() {
        let (lv, rv) = effective_volumes(100.0, 3.0, 5.0);
        assert_eq!(lv, 105.0);
        assert_eq!(rv, 0.0);
    }
}
