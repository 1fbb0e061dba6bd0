//! Time-varying elastance ventricle with pressure-dependent viscous loss.
//!
//! Pmax = φ·ESP(V) + (1 − φ)·EDP(V), EDP = P0·(exp(kE·V) − 1),
//! P = Pmax − kR·Pmax·Fout.
//!
//! Reference: Ursino 1998 (Eq 1-6)

use crate::config::{Espvr, VentricleParameters, ViscousSolve};

use super::valve::diode_flow;

/// Slope difference below which the unimodal ESPVR has no falling segment
const UNIMODAL_EPSILON: f64 = 1e-9;

/// Ventricular pressure and outflow for one evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VentricleSolution {
    pub pressure_mmHg: f64,
    pub outflow_mL_per_s: f64,
    /// Pressure at zero outflow
    pub isovolumic_pressure_mmHg: f64,
}

/// End-systolic pressure at volume `v` with end-systolic elastance `emax`.
pub fn end_systolic_pressure(espvr: &Espvr, emax: f64, unstressed_mL: f64, v: f64) -> f64 {
    match *espvr {
        Espvr::Conventional => emax * (v - unstressed_mL),
        Espvr::Unimodal {
            falling_elastance_mmHg_per_mL,
            intercept_pressure_mmHg,
        } => {
            if v < unstressed_mL {
                return 0.0;
            }
            let rising = emax * (v - unstressed_mL);
            let slope_gap = emax - falling_elastance_mmHg_per_mL;
            if slope_gap <= UNIMODAL_EPSILON {
                return rising;
            }
            let breakpoint = (emax * unstressed_mL + intercept_pressure_mmHg) / slope_gap;
            if v <= breakpoint {
                rising
            } else {
                falling_elastance_mmHg_per_mL * v + intercept_pressure_mmHg
            }
        }
    }
}

pub fn end_diastolic_pressure(params: &VentricleParameters, v: f64) -> f64 {
    params.diastolic_pressure_scale_mmHg * ((params.diastolic_stiffness_per_mL * v).exp() - 1.0)
}

/// Pressure the ventricle would develop with its outflow valve shut.
pub fn isovolumic_pressure(params: &VentricleParameters, emax: f64, phi: f64, v: f64) -> f64 {
    let esp = end_systolic_pressure(&params.espvr, emax, params.unstressed_volume_mL, v);
    let edp = end_diastolic_pressure(params, v);
    phi * esp + (1.0 - phi) * edp
}

/// Resolve outflow against downstream pressure `p_out` through a valve of
/// resistance `r_valve`.
pub fn solve_ejection(
    params: &VentricleParameters,
    solve: ViscousSolve,
    pmax: f64,
    p_out: f64,
    r_valve: f64,
) -> VentricleSolution {
    let k_r = params.viscous_coefficient_s_per_mL;
    let outflow = match solve {
        ViscousSolve::TwoPass => diode_flow(pmax, p_out, r_valve),
        ViscousSolve::Exact => {
            if pmax > p_out {
                (pmax - p_out) / (r_valve + k_r * pmax.max(0.0))
            } else {
                0.0
            }
        }
    };
    VentricleSolution {
        pressure_mmHg: (pmax - k_r * pmax * outflow).max(0.0),
        outflow_mL_per_s: outflow,
        isovolumic_pressure_mmHg: pmax,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HeartParameters;

    fn lv() -> VentricleParameters {
        HeartParameters::default().left_ventricle
    }

    #[test]
    fn test_exact_solution_satisfies_valve_equation() {
        let p = lv();
        let r = 2.5e-3;
        let pmax = 150.0;
        let p_out = 90.0;
        let s = solve_ejection(&p, ViscousSolve::Exact, pmax, p_out, r);
        // F = (P − Pout)/R with P = Pmax − kR·Pmax·F
        let residual = s.outflow_mL_per_s - (s.pressure_mmHg - p_out) / r;
        assert!(residual.abs() < 1e-6, "valve residual {}", residual);
        assert!(s.pressure_mmHg > p_out);
    }

    #[test]
    fn test_two_pass_overestimates_flow() {
        let p = lv();
        let exact = solve_ejection(&p, ViscousSolve::Exact, 150.0, 90.0, 2.5e-3);
        let two_pass = solve_ejection(&p, ViscousSolve::TwoPass, 150.0, 90.0, 2.5e-3);
        assert!(two_pass.outflow_mL_per_s > exact.outflow_mL_per_s);
    }

    #[test]
    fn test_closed_valve_keeps_isovolumic_pressure() {
        let p = lv();
        let s = solve_ejection(&p, ViscousSolve::Exact, 40.0, 90.0, 2.5e-3);
        assert_eq!(s.outflow_mL_per_s, 0.0);
        assert_eq!(s.pressure_mmHg, 40.0);
    }

    #[test]
    fn test_pressure_never_negative() {
        let p = lv();
        let pmax = isovolumic_pressure(&p, 2.95, 1.0, 5.0);
        assert!(pmax < 0.0);
        let s = solve_ejection(&p, ViscousSolve::Exact, pmax, 0.0, 2.5e-3);
        assert_eq!(s.pressure_mmHg, 0.0);
    }

    #[test]
    fn test_unimodal_espvr_is_continuous_at_breakpoint() {
        let espvr = Espvr::Unimodal {
            falling_elastance_mmHg_per_mL: -0.5,
            intercept_pressure_mmHg: 200.0,
        };
        let (emax, vu) = (2.95, 16.77);
        let vb = (emax * vu + 200.0) / (emax + 0.5);
        let below = end_systolic_pressure(&espvr, emax, vu, vb - 1e-7);
        let above = end_systolic_pressure(&espvr, emax, vu, vb + 1e-7);
        assert!((below - above).abs() < 1e-5, "{} vs {}", below, above);
        assert!(end_systolic_pressure(&espvr, emax, vu, vb + 50.0) < below);
        assert_eq!(end_systolic_pressure(&espvr, emax, vu, vu - 1.0), 0.0);
    }

    #[test]
    fn test_unimodal_without_falling_segment() {
        let espvr = Espvr::Unimodal {
            falling_elastance_mmHg_per_mL: 3.0,
            intercept_pressure_mmHg: 0.0,
        };
        let p = end_systolic_pressure(&espvr, 2.95, 16.77, 200.0);
        assert!((p - 2.95 * (200.0 - 16.77)).abs() < 1e-9);
    }

    #[test]
    fn test_elastance_monotone_in_contractility() {
        let p = lv();
        let weak = isovolumic_pressure(&p, 2.0, 1.0, 120.0);
        let strong = isovolumic_pressure(&p, 3.5, 1.0, 120.0);
        assert!(strong > weak);
    }
}
