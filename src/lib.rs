//! Cardiopulmonary simulator - lumped-parameter model of the human heart,
//! circulation, lungs and their reflex control.
//!
//! The model couples a four-chamber elastance heart, systemic and pulmonary
//! circulation, airway mechanics, O2/CO2 transport and neural, local and
//! respiratory control, advanced together by a fixed-step explicit Euler
//! integrator.

// Allow non-snake-case for unit suffixes in field names (mmHg, mL, cmH2O, etc.)
// This follows the project convention of including units in names.
#![allow(non_snake_case)]

pub mod config;
pub mod control;
pub mod error;
pub mod export;
pub mod gas;
pub mod heart;
pub mod lungs;
pub mod math;
pub mod pulmonary;
pub mod simulation;
pub mod state;
pub mod systemic;

pub use config::Parameters;
pub use control::{ControlSystem, ExerciseProfile};
pub use error::{ConfigError, SimError};
pub use gas::GasPair;
pub use simulation::{
    simulate, ControlConfig, Simulation, SimulationConfig, SimulationDiagnostics, TimeSeries, TimeSeriesRecord,
};
pub use state::{Bed, BedSet, SimulationState, VitalSigns, VitalStatus};
