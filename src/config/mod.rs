//! Configuration module for loading simulation parameters.
//!
//! All physiological parameters include citations to their source publications.

mod control_parameters;
mod parameters;
mod validation;

pub use control_parameters::{
    AutoregulationParameters, BaroreceptorParameters, CentralCommandCurve, CentralCommandParameters,
    ChemoreceptorParameters, CnsIschemicParameters, ControlParameters, EffectorDynamics,
    EffectorParameters, ExerciseParameters, ExerciseVentilationParameters, LocalRegulation,
    LungStretchParameters, MetabolicVasodilationParameters, MuscleDemandParameters,
    RespiratoryBranch, RespiratoryControlParameters, SympatheticParameters, SympatheticWeights,
    VagalParameters,
};
pub use parameters::{
    ActivationParameters, ActiveMuscleVeinParameters, ArterialModel, ArteryParameters,
    AtriumParameters, CardiacPowerParameters, CompartmentParameters, DissociationParameters,
    Espvr, HeartParameters, LungGasParameters, LungMechanicsParameters, MusclePumpParameters,
    MuscleVeinResistance, Parameters, PulmonaryParameters, SeptumParameters, SystemicParameters,
    ThoracicVeinParameters, TissueGasParameters, VentricleParameters, ViscousSolve,
};
pub use validation::Validator;
