//! Ideal diode valves.

/// Forward flow through a valve of resistance `r`; zero when closed.
#[inline]
pub fn diode_flow(p_in: f64, p_out: f64, r: f64) -> f64 {
    if p_in > p_out {
        (p_in - p_out) / r
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_valve_passes_nothing() {
        assert_eq!(diode_flow(5.0, 10.0, 0.01), 0.0);
        assert_eq!(diode_flow(10.0, 10.0, 0.01), 0.0);
    }

    #[test]
    fn test_open_valve_is_continuous_at_equality() {
        let r = 2.5e-3;
        let just_open = diode_flow(10.0 + 1e-9, 10.0, r);
        assert!(just_open > 0.0 && just_open < 1e-5);
        assert!((diode_flow(12.0, 10.0, r) - 800.0).abs() < 1e-9);
    }
}
