//! Gas transport through the systemic tissues and veins.

pub mod tissue;
pub mod venous;

use serde::{Deserialize, Serialize};

pub use tissue::{metabolic_rates, MetabolicRates, TissueGas, TissueGasInputs, TissueGasState};
pub use venous::{VenousGas, VenousGasInputs, VenousGasState};

/// One value for O2 and one for CO2 (fraction, content or pressure)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GasPair {
    pub o2: f64,
    pub co2: f64,
}

impl GasPair {
    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            o2: f(self.o2),
            co2: f(self.co2),
        }
    }

    pub fn zip(self, other: Self, f: impl Fn(f64, f64) -> f64) -> Self {
        Self {
            o2: f(self.o2, other.o2),
            co2: f(self.co2, other.co2),
        }
    }
}
