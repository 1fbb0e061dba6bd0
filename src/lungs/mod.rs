//! Respiratory system: airway mechanics, blood-gas dissociation and
//! alveolar gas transfer.

pub mod dissociation;
pub mod gas_transfer;
pub mod mechanics;

pub use dissociation::Dissociation;
pub use gas_transfer::{GasTransfer, GasTransferInputs, GasTransferOutputs, LungGasState};
pub use mechanics::{
    muscle_pressure, BreathTiming, LungInputs, LungMechanics, LungOutputs, LungState, LungVolumes,
    RespiratoryPhase, CMH2O_TO_MMHG,
};
