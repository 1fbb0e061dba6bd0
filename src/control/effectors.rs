//! The twelve delayed neural effectors and the values they set.
//!
//! Each effector follows `dΔθ/dt = (σ(f(t − D)) − Δθ)/τ`, where σ is a
//! static response to the firing rate of its efferent pathway. The applied
//! value is the nominal parameter shifted by `Δθ − σ(f_rest)`, so the
//! nominal tables hold exactly at rest.
//!
//! Reference: Ursino 1998, Eq 21-26

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

use crate::config::{EffectorDynamics, EffectorParameters};
use crate::simulation::integrator::{field_path, Integrate};
use crate::state::{Bed, BedSet};

/// Efferent pathway driving an effector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Pathway {
    /// Sympathetic fibres to arterioles
    Resistance,
    /// Sympathetic fibres to venous capacitance
    Venous,
    /// Sympathetic fibres to the heart
    Heart,
    Vagal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Effector {
    SplanchnicResistance,
    ExtrasplanchnicResistance,
    ActiveMuscleResistance,
    RestingMuscleResistance,
    SplanchnicUnstressed,
    ExtrasplanchnicUnstressed,
    ActiveMuscleUnstressed,
    RestingMuscleUnstressed,
    LeftElastance,
    RightElastance,
    SympatheticPeriod,
    VagalPeriod,
}

impl Effector {
    pub const ALL: [Effector; 12] = [
        Effector::SplanchnicResistance,
        Effector::ExtrasplanchnicResistance,
        Effector::ActiveMuscleResistance,
        Effector::RestingMuscleResistance,
        Effector::SplanchnicUnstressed,
        Effector::ExtrasplanchnicUnstressed,
        Effector::ActiveMuscleUnstressed,
        Effector::RestingMuscleUnstressed,
        Effector::LeftElastance,
        Effector::RightElastance,
        Effector::SympatheticPeriod,
        Effector::VagalPeriod,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Snake-case name used in diagnostics
    pub fn key(self) -> &'static str {
        match self {
            Effector::SplanchnicResistance => "splanchnic_resistance",
            Effector::ExtrasplanchnicResistance => "extrasplanchnic_resistance",
            Effector::ActiveMuscleResistance => "active_muscle_resistance",
            Effector::RestingMuscleResistance => "resting_muscle_resistance",
            Effector::SplanchnicUnstressed => "splanchnic_unstressed",
            Effector::ExtrasplanchnicUnstressed => "extrasplanchnic_unstressed",
            Effector::ActiveMuscleUnstressed => "active_muscle_unstressed",
            Effector::RestingMuscleUnstressed => "resting_muscle_unstressed",
            Effector::LeftElastance => "left_elastance",
            Effector::RightElastance => "right_elastance",
            Effector::SympatheticPeriod => "sympathetic_period",
            Effector::VagalPeriod => "vagal_period",
        }
    }

    pub fn pathway(self) -> Pathway {
        match self {
            Effector::SplanchnicResistance
            | Effector::ExtrasplanchnicResistance
            | Effector::ActiveMuscleResistance
            | Effector::RestingMuscleResistance => Pathway::Resistance,
            Effector::SplanchnicUnstressed
            | Effector::ExtrasplanchnicUnstressed
            | Effector::ActiveMuscleUnstressed
            | Effector::RestingMuscleUnstressed => Pathway::Venous,
            Effector::LeftElastance | Effector::RightElastance | Effector::SympatheticPeriod => Pathway::Heart,
            Effector::VagalPeriod => Pathway::Vagal,
        }
    }

    /// Resistance effector acting on a peripheral bed
    pub fn resistance(bed: Bed) -> Option<Effector> {
        match bed {
            Bed::Splanchnic => Some(Effector::SplanchnicResistance),
            Bed::Extrasplanchnic => Some(Effector::ExtrasplanchnicResistance),
            Bed::ActiveMuscle => Some(Effector::ActiveMuscleResistance),
            Bed::RestingMuscle => Some(Effector::RestingMuscleResistance),
            Bed::Brain | Bed::Coronary => None,
        }
    }

    /// Unstressed-volume effector acting on a venous bed
    pub fn unstressed_volume(bed: Bed) -> Option<Effector> {
        match bed {
            Bed::Splanchnic => Some(Effector::SplanchnicUnstressed),
            Bed::Extrasplanchnic => Some(Effector::ExtrasplanchnicUnstressed),
            Bed::ActiveMuscle => Some(Effector::ActiveMuscleUnstressed),
            Bed::RestingMuscle => Some(Effector::RestingMuscleUnstressed),
            Bed::Brain | Bed::Coronary => None,
        }
    }

    pub fn dynamics(self, params: &EffectorParameters) -> &EffectorDynamics {
        match self {
            Effector::SplanchnicResistance => &params.resistance_splanchnic,
            Effector::ExtrasplanchnicResistance => &params.resistance_extrasplanchnic,
            Effector::ActiveMuscleResistance => &params.resistance_active_muscle,
            Effector::RestingMuscleResistance => &params.resistance_resting_muscle,
            Effector::SplanchnicUnstressed => &params.unstressed_splanchnic,
            Effector::ExtrasplanchnicUnstressed => &params.unstressed_extrasplanchnic,
            Effector::ActiveMuscleUnstressed => &params.unstressed_active_muscle,
            Effector::RestingMuscleUnstressed => &params.unstressed_resting_muscle,
            Effector::LeftElastance => &params.elastance_left,
            Effector::RightElastance => &params.elastance_right,
            Effector::SympatheticPeriod => &params.period_sympathetic,
            Effector::VagalPeriod => &params.period_vagal,
        }
    }

    /// Static response σ(f).
    ///
    /// Sympathetic effectors respond to `ln(f − threshold + 1)` above the
    /// threshold and not at all below it; the vagal period effector is linear.
    pub fn static_response(self, gain: f64, rate_hz: f64, threshold_hz: f64) -> f64 {
        match self.pathway() {
            Pathway::Vagal => gain * rate_hz,
            _ if rate_hz >= threshold_hz => gain * (rate_hz - threshold_hz + 1.0).ln(),
            _ => 0.0,
        }
    }
}

/// One value per effector
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EffectorSet<T>([T; 12]);

impl<T> EffectorSet<T> {
    pub fn from_fn(mut f: impl FnMut(Effector) -> T) -> Self {
        Self(Effector::ALL.map(&mut f))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Effector, &T)> {
        Effector::ALL.into_iter().zip(self.0.iter())
    }
}

impl<T> Index<Effector> for EffectorSet<T> {
    type Output = T;

    fn index(&self, effector: Effector) -> &T {
        &self.0[effector.index()]
    }
}

impl<T> IndexMut<Effector> for EffectorSet<T> {
    fn index_mut(&mut self, effector: Effector) -> &mut T {
        &mut self.0[effector.index()]
    }
}

impl<T: Integrate> Integrate for EffectorSet<T> {
    fn integrate(&mut self, rate: &Self, dt: f64) {
        for (value, r) in self.0.iter_mut().zip(rate.0.iter()) {
            value.integrate(r, dt);
        }
    }

    fn first_non_finite(&self) -> Option<String> {
        Effector::ALL
            .iter()
            .zip(self.0.iter())
            .find_map(|(effector, v)| v.first_non_finite().map(|inner| field_path(effector.key(), inner)))
    }
}

/// Parameter values applied to the circulation and the respiratory muscles
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Effectors {
    pub peripheral_resistance: BedSet<f64>,
    pub venous_unstressed_mL: BedSet<f64>,
    pub lv_elastance_mmHg_per_mL: f64,
    pub rv_elastance_mmHg_per_mL: f64,
    pub heart_period_s: f64,
    pub respiratory_rate_bpm: f64,
    pub muscle_pressure_min_cmH2O: f64,
    /// Exercise hyperpnoea factor r; breathing scales with √r
    pub ventilation_ratio: f64,
    /// Reported minute ventilation (L/min)
    pub minute_ventilation_L_per_min: f64,
    /// Parallel peripheral resistance over its nominal value
    pub resistance_multiplier: f64,
}

impl Effectors {
    pub fn heart_rate_bpm(&self) -> f64 {
        60.0 / self.heart_period_s
    }
}

/// Resistance of all peripheral beds in parallel
pub fn parallel_resistance(resistance: &BedSet<f64>) -> f64 {
    let conductance: f64 = resistance.iter().map(|(_, r)| 1.0 / r).sum();
    1.0 / conductance
}
