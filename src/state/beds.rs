//! The six parallel systemic vascular beds and a per-bed container.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Systemic vascular bed.
///
/// Every bed has a peripheral (arteriolar/capillary) compartment and a
/// venous compartment. The extrasplanchnic venous compartment closes the
/// blood-volume balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bed {
    Splanchnic,
    Extrasplanchnic,
    ActiveMuscle,
    RestingMuscle,
    Brain,
    Coronary,
}

impl Bed {
    pub const ALL: [Bed; 6] = [
        Bed::Splanchnic,
        Bed::Extrasplanchnic,
        Bed::ActiveMuscle,
        Bed::RestingMuscle,
        Bed::Brain,
        Bed::Coronary,
    ];

    /// Key used in parameter files
    pub fn key(self) -> &'static str {
        match self {
            Bed::Splanchnic => "splanchnic",
            Bed::Extrasplanchnic => "extrasplanchnic",
            Bed::ActiveMuscle => "active_muscle",
            Bed::RestingMuscle => "resting_muscle",
            Bed::Brain => "brain",
            Bed::Coronary => "coronary",
        }
    }

    /// Short label used in time-series column names
    pub fn label(self) -> &'static str {
        match self {
            Bed::Splanchnic => "sp",
            Bed::Extrasplanchnic => "ep",
            Bed::ActiveMuscle => "am",
            Bed::RestingMuscle => "rm",
            Bed::Brain => "b",
            Bed::Coronary => "h",
        }
    }
}

/// One value per systemic bed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BedSet<T> {
    pub splanchnic: T,
    pub extrasplanchnic: T,
    pub active_muscle: T,
    pub resting_muscle: T,
    pub brain: T,
    pub coronary: T,
}

impl<T> BedSet<T> {
    pub fn from_fn(mut f: impl FnMut(Bed) -> T) -> Self {
        Self {
            splanchnic: f(Bed::Splanchnic),
            extrasplanchnic: f(Bed::Extrasplanchnic),
            active_muscle: f(Bed::ActiveMuscle),
            resting_muscle: f(Bed::RestingMuscle),
            brain: f(Bed::Brain),
            coronary: f(Bed::Coronary),
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(Bed, &T) -> U) -> BedSet<U> {
        BedSet::from_fn(|bed| f(bed, &self[bed]))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Bed, &T)> {
        Bed::ALL.into_iter().map(move |bed| (bed, &self[bed]))
    }
}

impl BedSet<f64> {
    pub fn sum(&self) -> f64 {
        self.iter().map(|(_, v)| *v).sum()
    }
}

impl<T> Index<Bed> for BedSet<T> {
    type Output = T;

    fn index(&self, bed: Bed) -> &T {
        match bed {
            Bed::Splanchnic => &self.splanchnic,
            Bed::Extrasplanchnic => &self.extrasplanchnic,
            Bed::ActiveMuscle => &self.active_muscle,
            Bed::RestingMuscle => &self.resting_muscle,
            Bed::Brain => &self.brain,
            Bed::Coronary => &self.coronary,
        }
    }
}

impl<T> IndexMut<Bed> for BedSet<T> {
    fn index_mut(&mut self, bed: Bed) -> &mut T {
        match bed {
            Bed::Splanchnic => &mut self.splanchnic,
            Bed::Extrasplanchnic => &mut self.extrasplanchnic,
            Bed::ActiveMuscle => &mut self.active_muscle,
            Bed::RestingMuscle => &mut self.resting_muscle,
            Bed::Brain => &mut self.brain,
            Bed::Coronary => &mut self.coronary,
        }
    }
}
