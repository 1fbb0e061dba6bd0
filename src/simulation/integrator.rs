//! Fixed-step explicit Euler integration.
//!
//! Every component state implements [`Integrate`], usually through
//! [`impl_integrate!`]. A derivative is a value of the same type as the
//! state, so one step is `x += dx·dt` field by field, applied only after
//! every derivative of the step has been evaluated from the pre-step state.

use crate::state::BedSet;

pub trait Integrate {
    /// x ← x + rate·dt
    fn integrate(&mut self, rate: &Self, dt: f64);

    /// Dotted path of the first non-finite field, if any. A non-finite
    /// scalar reports an empty path.
    fn first_non_finite(&self) -> Option<String>;

    fn is_finite(&self) -> bool {
        self.first_non_finite().is_none()
    }
}

impl Integrate for f64 {
    #[inline]
    fn integrate(&mut self, rate: &Self, dt: f64) {
        *self += rate * dt;
    }

    fn first_non_finite(&self) -> Option<String> {
        if f64::is_finite(*self) {
            None
        } else {
            Some(String::new())
        }
    }
}

impl<T: Integrate> Integrate for BedSet<T> {
    fn integrate(&mut self, rate: &Self, dt: f64) {
        for bed in crate::state::Bed::ALL {
            self[bed].integrate(&rate[bed], dt);
        }
    }

    fn first_non_finite(&self) -> Option<String> {
        self.iter()
            .find_map(|(bed, v)| v.first_non_finite().map(|inner| field_path(bed.key(), inner)))
    }
}

/// Prefix a nested path with the name of the field that holds it.
pub fn field_path(field: &str, inner: String) -> String {
    if inner.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", field, inner)
    }
}

/// Implements [`Integrate`] for a struct by integrating the listed fields.
macro_rules! impl_integrate {
    ($ty:ty { $($field:ident),+ $(,)? }) => {
        impl $crate::simulation::integrator::Integrate for $ty {
            fn integrate(&mut self, rate: &Self, dt: f64) {
                $( $crate::simulation::integrator::Integrate::integrate(&mut self.$field, &rate.$field, dt); )+
            }

            fn first_non_finite(&self) -> Option<String> {
                $(
                    if let Some(inner) = $crate::simulation::integrator::Integrate::first_non_finite(&self.$field) {
                        return Some($crate::simulation::integrator::field_path(stringify!($field), inner));
                    }
                )+
                None
            }
        }
    };
}

pub(crate) use impl_integrate;

/// Wrap a phase accumulator into [0, 1).
#[inline]
pub fn wrap_phase(phase: f64) -> f64 {
    phase.rem_euclid(1.0)
}
