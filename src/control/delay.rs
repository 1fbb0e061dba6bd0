//! Pure transport delays for the control loops.

use std::collections::VecDeque;

use super::effectors::{Effector, EffectorSet};
use super::efferent::EfferentRates;
use crate::config::Parameters;

/// Fixed-capacity ring buffer delaying a signal by `ceil(D/dt)` steps.
///
/// Until the buffer has filled, the earliest stored sample stands in for
/// the missing history.
#[derive(Debug, Clone)]
pub struct DelayLine {
    buffer: VecDeque<f64>,
    capacity: usize,
}

impl DelayLine {
    pub fn new(delay_s: f64, dt_s: f64) -> Self {
        // Guard against D/dt landing a hair above an integer
        let capacity = ((delay_s / dt_s - 1e-9).ceil() as usize).max(1);
        Self {
            buffer: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Push the newest sample and return the delayed one.
    pub fn push(&mut self, sample: f64) -> f64 {
        self.buffer.push_back(sample);
        if self.buffer.len() > self.capacity {
            self.buffer.pop_front().unwrap_or(sample)
        } else {
            self.buffer.front().copied().unwrap_or(sample)
        }
    }
}

/// Delayed inputs to the control derivatives for one step
#[derive(Debug, Clone, Copy, Default)]
pub struct DelayedSignals {
    /// Efferent firing seen by each effector (spikes/s)
    pub effector_rates_hz: EffectorSet<f64>,
    pub metabolic_intensity: f64,
    pub chemoreceptor_hz: f64,
    pub paco2_mmHg: f64,
    /// Exercise ventilation drive ΔV̇ (L/min)
    pub ventilation_target_L_per_min: f64,
}

/// Every delay line of the model, owned by the driver
#[derive(Debug, Clone)]
pub struct DelayBank {
    effectors: EffectorSet<DelayLine>,
    metabolic: DelayLine,
    ventilation: DelayLine,
    chemoreceptor: DelayLine,
    paco2: DelayLine,
    ventilation_target: f64,
}

impl DelayBank {
    pub fn new(params: &Parameters, dt_s: f64) -> Self {
        let control = &params.control;
        Self {
            effectors: EffectorSet::from_fn(|e| DelayLine::new(e.dynamics(&control.effectors).delay_s, dt_s)),
            metabolic: DelayLine::new(params.exercise.metabolic_vasodilation.delay_s, dt_s),
            ventilation: DelayLine::new(params.exercise.ventilation.delay_s, dt_s),
            chemoreceptor: DelayLine::new(control.respiratory.peripheral_delay_s, dt_s),
            paco2: DelayLine::new(control.respiratory.central_delay_s, dt_s),
            ventilation_target: 0.0,
        }
    }

    /// Delay the exercise ventilation drive; pushed first in each step
    /// because breathing effectors read it.
    pub fn push_ventilation(&mut self, target_L_per_min: f64) -> f64 {
        self.ventilation_target = self.ventilation.push(target_L_per_min);
        self.ventilation_target
    }

    /// Delay the reflex signals produced later in the step.
    pub fn push_reflex(&mut self, efferent: &EfferentRates, intensity: f64, chemoreceptor_hz: f64, paco2_mmHg: f64) -> DelayedSignals {
        let mut effector_rates_hz = EffectorSet::default();
        for effector in Effector::ALL {
            effector_rates_hz[effector] = self.effectors[effector].push(efferent.rate(effector.pathway()));
        }
        DelayedSignals {
            effector_rates_hz,
            metabolic_intensity: self.metabolic.push(intensity),
            chemoreceptor_hz: self.chemoreceptor.push(chemoreceptor_hz),
            paco2_mmHg: self.paco2.push(paco2_mmHg),
            ventilation_target_L_per_min: self.ventilation_target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_rounds_up() {
        assert_eq!(DelayLine::new(2.0, 0.0002).capacity(), 10_000);
        assert_eq!(DelayLine::new(0.25, 0.1).capacity(), 3);
        assert_eq!(DelayLine::new(0.0, 0.1).capacity(), 1);
    }

    #[test]
    fn test_delays_by_capacity_steps() {
        let mut line = DelayLine::new(0.3, 0.1);
        let out: Vec<f64> = (0..6).map(|i| line.push(i as f64)).collect();
        // Startup returns the earliest sample, then the true history
        assert_eq!(out, vec![0.0, 0.0, 0.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_step_input_arrives_after_delay() {
        let dt = 0.01;
        let mut line = DelayLine::new(1.0, dt);
        let mut arrival = None;
        for i in 0..300 {
            let input = if i >= 50 { 1.0 } else { 0.0 };
            if line.push(input) > 0.5 && arrival.is_none() {
                arrival = Some(i);
            }
        }
        assert_eq!(arrival, Some(150));
    }
}
