//! Parameter structures with citation metadata.
//!
//! All physiological parameters carry their source. Units follow the
//! field suffix: mmHg, mL, s for the circulation; cmH2O, L, s for the
//! airways.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::control_parameters::{ControlParameters, ExerciseParameters};
use super::validation::Validator;
use crate::error::ConfigError;
use crate::state::BedSet;

/// Top-level parameters container
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Parameters {
    pub heart: HeartParameters,
    pub systemic: SystemicParameters,
    pub pulmonary: PulmonaryParameters,
    pub lung_mechanics: LungMechanicsParameters,
    pub lung_gas: LungGasParameters,
    pub tissue: TissueGasParameters,
    pub control: ControlParameters,
    pub exercise: ExerciseParameters,
}

impl Parameters {
    /// Parse a complete parameter document. Every key is required and
    /// unknown keys are rejected.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let params: Parameters = serde_json::from_str(json).map_err(classify_parse_error)?;
        params.validate()?;
        Ok(params)
    }

    /// Load and validate a parameter file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let params = Self::from_json_str(&contents)?;
        log::info!("Loaded parameters from {:?}", path);
        Ok(params)
    }

    /// Load from a JSON file, or use defaults if the file doesn't exist.
    ///
    /// A file that exists but fails to parse or validate is an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            log::info!("Parameter file {:?} not found, using defaults", path);
            Ok(Self::default())
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every physical constant; the first offending key is reported.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut v = Validator::default();
        self.heart.validate(&mut v);
        self.systemic.validate(&mut v);
        self.pulmonary.validate(&mut v);
        self.lung_mechanics.validate(&mut v);
        self.lung_gas.validate(&mut v);
        self.tissue.validate(&mut v);
        self.control.validate(&mut v);
        self.exercise.validate(&mut v);
        v.finish()
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            heart: HeartParameters::default(),
            systemic: SystemicParameters::default(),
            pulmonary: PulmonaryParameters::default(),
            lung_mechanics: LungMechanicsParameters::default(),
            lung_gas: LungGasParameters::default(),
            tissue: TissueGasParameters::default(),
            control: ControlParameters::default(),
            exercise: ExerciseParameters::default(),
        }
    }
}

/// serde reports absent keys as "missing field `name`"; surface those as
/// a dedicated configuration error.
fn classify_parse_error(err: serde_json::Error) -> ConfigError {
    let message = err.to_string();
    match message.strip_prefix("missing field `") {
        Some(rest) => {
            let key = rest.split('`').next().unwrap_or(rest);
            ConfigError::MissingParameter(format!("{} (line {})", key, err.line()))
        }
        None => ConfigError::Parse(err),
    }
}

// ============================================================================
// HEART
// ============================================================================

/// Four-chamber heart with time-varying elastance.
///
/// Reference: Ursino M. Am J Physiol 1998; Albanese A et al. Ann Biomed Eng 2016
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeartParameters {
    /// Double-Hill activation shape
    pub activation: ActivationParameters,
    pub left_ventricle: VentricleParameters,
    pub right_ventricle: VentricleParameters,
    pub left_atrium: AtriumParameters,
    pub right_atrium: AtriumParameters,
    /// Aortic valve resistance (mmHg·s/mL)
    /// Source: Albanese 2016
    pub aortic_valve_resistance_mmHg_s_per_mL: f64,
    /// Pulmonary valve resistance (mmHg·s/mL)
    /// Source: Albanese 2016
    pub pulmonary_valve_resistance_mmHg_s_per_mL: f64,
    pub septum: SeptumParameters,
    /// Resolution of the viscous pressure loss within one step
    pub viscous_solve: ViscousSolve,
    pub power: CardiacPowerParameters,
}

/// Shape of the normalized activation curve φ(x), x ∈ [0,1)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActivationParameters {
    /// Half-activation phases of the rising and falling Hill terms
    /// Source: Albanese 2016 (elastance shape fitted to Ursino 1998)
    pub alpha: [f64; 2],
    /// Hill exponents of the rising and falling terms
    pub exponent: [f64; 2],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VentricleParameters {
    /// EDPVR scale P0 (mmHg)
    pub diastolic_pressure_scale_mmHg: f64,
    /// EDPVR exponential stiffness kE (1/mL)
    pub diastolic_stiffness_per_mL: f64,
    /// Unstressed volume (mL)
    pub unstressed_volume_mL: f64,
    /// End-systolic elastance at rest (mmHg/mL)
    pub end_systolic_elastance_mmHg_per_mL: f64,
    /// Viscous loss coefficient kR (s/mL); R = kR·Pmax
    pub viscous_coefficient_s_per_mL: f64,
    /// End-systolic pressure-volume relation
    pub espvr: Espvr,
}

/// End-systolic pressure-volume relation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Espvr {
    /// ESP = Emax·(V − Vu)
    Conventional,
    /// Rising segment with slope Emax up to a breakpoint, then a falling
    /// segment ESP = E−·V + intercept
    Unimodal {
        falling_elastance_mmHg_per_mL: f64,
        intercept_pressure_mmHg: f64,
    },
}

/// How the pressure-dependent viscous loss R = kR·Pmax is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViscousSolve {
    /// Pressure at zero outflow, then valve flow, then pressure again
    TwoPass,
    /// Closed-form solution of F = (Pmax − kR·Pmax·F − Pout)/Rvalve
    Exact,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AtriumParameters {
    pub compliance_mL_per_mmHg: f64,
    pub unstressed_volume_mL: f64,
    /// Resistance of the atrioventricular valve fed by this atrium
    pub outflow_resistance_mmHg_s_per_mL: f64,
}

/// Interventricular septum displacement
///
/// Source: Albanese 2016 (septal extension)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeptumParameters {
    pub enabled: bool,
    /// End-systolic septal elastance (mmHg/mL)
    pub systolic_elastance_mmHg_per_mL: f64,
    /// End-systolic septal offset volume (mL)
    pub systolic_offset_mL: f64,
    /// End-diastolic pressure scale (mmHg)
    pub diastolic_pressure_scale_mmHg: f64,
    /// End-diastolic stiffness λ (1/mL)
    pub diastolic_stiffness_per_mL: f64,
    /// End-diastolic offset volume (mL)
    pub diastolic_offset_mL: f64,
}

/// Cardiac power filter feeding myocardial O2 consumption
///
/// Source: Magosso & Ursino, Am J Physiol 2002
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CardiacPowerParameters {
    /// Filter time constant τw (s)
    pub filter_time_constant_s: f64,
    /// Filtered power at rest (mmHg·mL/s); coronary O2 use equals its
    /// nominal value at this power
    pub nominal_power_mmHg_mL_per_s: f64,
}

impl HeartParameters {
    fn validate(&self, v: &mut Validator) {
        v.positive("heart.activation.alpha[0]", self.activation.alpha[0]);
        v.positive("heart.activation.alpha[1]", self.activation.alpha[1]);
        v.positive("heart.activation.exponent[0]", self.activation.exponent[0]);
        v.positive("heart.activation.exponent[1]", self.activation.exponent[1]);
        self.left_ventricle.validate(v, "heart.left_ventricle");
        self.right_ventricle.validate(v, "heart.right_ventricle");
        self.left_atrium.validate(v, "heart.left_atrium");
        self.right_atrium.validate(v, "heart.right_atrium");
        v.positive("heart.aortic_valve_resistance_mmHg_s_per_mL", self.aortic_valve_resistance_mmHg_s_per_mL);
        v.positive("heart.pulmonary_valve_resistance_mmHg_s_per_mL", self.pulmonary_valve_resistance_mmHg_s_per_mL);
        let s = &self.septum;
        v.positive("heart.septum.systolic_elastance_mmHg_per_mL", s.systolic_elastance_mmHg_per_mL);
        v.finite("heart.septum.systolic_offset_mL", s.systolic_offset_mL);
        v.positive("heart.septum.diastolic_pressure_scale_mmHg", s.diastolic_pressure_scale_mmHg);
        v.positive("heart.septum.diastolic_stiffness_per_mL", s.diastolic_stiffness_per_mL);
        v.finite("heart.septum.diastolic_offset_mL", s.diastolic_offset_mL);
        v.positive("heart.power.filter_time_constant_s", self.power.filter_time_constant_s);
        v.positive("heart.power.nominal_power_mmHg_mL_per_s", self.power.nominal_power_mmHg_mL_per_s);
    }
}

impl VentricleParameters {
    fn validate(&self, v: &mut Validator, prefix: &str) {
        v.positive(&format!("{prefix}.diastolic_pressure_scale_mmHg"), self.diastolic_pressure_scale_mmHg);
        v.positive(&format!("{prefix}.diastolic_stiffness_per_mL"), self.diastolic_stiffness_per_mL);
        v.non_negative(&format!("{prefix}.unstressed_volume_mL"), self.unstressed_volume_mL);
        v.positive(&format!("{prefix}.end_systolic_elastance_mmHg_per_mL"), self.end_systolic_elastance_mmHg_per_mL);
        v.non_negative(&format!("{prefix}.viscous_coefficient_s_per_mL"), self.viscous_coefficient_s_per_mL);
        if let Espvr::Unimodal {
            falling_elastance_mmHg_per_mL,
            intercept_pressure_mmHg,
        } = self.espvr
        {
            v.finite(&format!("{prefix}.espvr.falling_elastance_mmHg_per_mL"), falling_elastance_mmHg_per_mL);
            v.finite(&format!("{prefix}.espvr.intercept_pressure_mmHg"), intercept_pressure_mmHg);
        }
    }
}

impl AtriumParameters {
    fn validate(&self, v: &mut Validator, prefix: &str) {
        v.positive(&format!("{prefix}.compliance_mL_per_mmHg"), self.compliance_mL_per_mmHg);
        v.non_negative(&format!("{prefix}.unstressed_volume_mL"), self.unstressed_volume_mL);
        v.positive(&format!("{prefix}.outflow_resistance_mmHg_s_per_mL"), self.outflow_resistance_mmHg_s_per_mL);
    }
}

impl Default for HeartParameters {
    fn default() -> Self {
        Self {
            // Albanese 2016
            activation: ActivationParameters {
                alpha: [0.103, 0.408],
                exponent: [1.9, 21.9],
            },
            // Ursino 1998, Table 1
            left_ventricle: VentricleParameters {
                diastolic_pressure_scale_mmHg: 1.5,
                diastolic_stiffness_per_mL: 0.014,
                unstressed_volume_mL: 16.77,
                end_systolic_elastance_mmHg_per_mL: 2.95,
                viscous_coefficient_s_per_mL: 3.75e-4,
                espvr: Espvr::Conventional,
            },
            right_ventricle: VentricleParameters {
                diastolic_pressure_scale_mmHg: 1.5,
                diastolic_stiffness_per_mL: 0.011,
                unstressed_volume_mL: 40.8,
                end_systolic_elastance_mmHg_per_mL: 1.75,
                viscous_coefficient_s_per_mL: 1.4e-3,
                espvr: Espvr::Conventional,
            },
            left_atrium: AtriumParameters {
                compliance_mL_per_mmHg: 19.23,
                unstressed_volume_mL: 25.0,
                outflow_resistance_mmHg_s_per_mL: 2.5e-3,
            },
            right_atrium: AtriumParameters {
                compliance_mL_per_mmHg: 31.25,
                unstressed_volume_mL: 25.0,
                outflow_resistance_mmHg_s_per_mL: 2.5e-3,
            },
            aortic_valve_resistance_mmHg_s_per_mL: 2.5e-3,
            pulmonary_valve_resistance_mmHg_s_per_mL: 2.5e-3,
            // Albanese 2016 septal extension
            septum: SeptumParameters {
                enabled: true,
                systolic_elastance_mmHg_per_mL: 48.75,
                systolic_offset_mL: 2.0,
                diastolic_pressure_scale_mmHg: 1.11,
                diastolic_stiffness_per_mL: 0.435,
                diastolic_offset_mL: 2.0,
            },
            viscous_solve: ViscousSolve::Exact,
            // Magosso & Ursino 2002; nominal power calibrated to the rest state
            power: CardiacPowerParameters {
                filter_time_constant_s: 5.0,
                nominal_power_mmHg_mL_per_s: 11_500.0,
            },
        }
    }
}

// ============================================================================
// SYSTEMIC CIRCULATION
// ============================================================================

/// Systemic circulation.
///
/// Reference: Albanese 2016, Table 1; Ursino 1998; Magosso & Ursino 2002
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SystemicParameters {
    /// Total blood volume (mL)
    /// Calibrated so the rest state meets normal arterial pressure at HR 75
    pub total_blood_volume_mL: f64,
    pub artery: ArteryParameters,
    /// Peripheral (arteriolar) compartments sharing one pressure node
    pub peripheral: BedSet<CompartmentParameters>,
    /// Venous compartments draining into the thoracic veins
    pub venous: BedSet<CompartmentParameters>,
    pub active_muscle_vein: ActiveMuscleVeinParameters,
    pub thoracic_veins: ThoracicVeinParameters,
    pub muscle_pump: MusclePumpParameters,
}

/// Arterial compartment with optional inertance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArteryParameters {
    pub compliance_mL_per_mmHg: f64,
    pub unstressed_volume_mL: f64,
    pub resistance_mmHg_s_per_mL: f64,
    /// Inertance (mmHg·s²/mL), used by the RLC model only
    pub inertance_mmHg_s2_per_mL: f64,
    pub model: ArterialModel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArterialModel {
    /// Resistance, inertance, compliance: arterial outflow is a state
    Rlc,
    /// Resistance, compliance: arterial outflow is algebraic
    Rc,
}

/// Linear compartment: V = C·P + Vu, outflow through R
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompartmentParameters {
    pub compliance_mL_per_mmHg: f64,
    pub unstressed_volume_mL: f64,
    pub resistance_mmHg_s_per_mL: f64,
}

impl CompartmentParameters {
    const fn new(compliance: f64, unstressed: f64, resistance: f64) -> Self {
        Self {
            compliance_mL_per_mmHg: compliance,
            unstressed_volume_mL: unstressed,
            resistance_mmHg_s_per_mL: resistance,
        }
    }

    fn validate(&self, v: &mut Validator, prefix: &str) {
        v.positive(&format!("{prefix}.compliance_mL_per_mmHg"), self.compliance_mL_per_mmHg);
        v.non_negative(&format!("{prefix}.unstressed_volume_mL"), self.unstressed_volume_mL);
        v.positive(&format!("{prefix}.resistance_mmHg_s_per_mL"), self.resistance_mmHg_s_per_mL);
    }
}

/// Nonlinear active-muscle venous compartment
///
/// Source: Magosso & Ursino 2002 (Eq 1, Eq 12)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActiveMuscleVeinParameters {
    /// Collapse stiffness P0 below unstressed volume (mmHg)
    pub collapse_pressure_mmHg: f64,
    /// Volume-dependent resistance coefficient kr,am (mmHg·s)
    pub volume_resistance_coefficient_mmHg_s: f64,
    pub resistance_model: MuscleVeinResistance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MuscleVeinResistance {
    /// Use the bed's tabulated venous resistance
    Fixed,
    /// R = kr,am / max(V, 0.1·Vu)
    VolumeDependent,
}

/// Thoracic veins: nonlinear pressure-volume law and collapsible resistance
///
/// Source: Albanese 2016 (Eq 5-8)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThoracicVeinParameters {
    /// Open-branch offset D1 (mmHg)
    pub open_offset_mmHg: f64,
    /// Open-branch elastance K1 (mmHg/mL)
    pub open_elastance_mmHg_per_mL: f64,
    /// Unstressed volume separating the branches (mL)
    pub unstressed_volume_mL: f64,
    /// Collapsed-branch offset D2 (mmHg); −5 makes the branches meet at Vu
    pub collapsed_offset_mmHg: f64,
    /// Collapsed-branch gain K2 (mmHg)
    pub collapsed_gain_mmHg: f64,
    /// Collapsed-branch volume scale Vmin (mL)
    pub collapsed_volume_scale_mL: f64,
    /// Wall correction amplitude Kxp (mmHg)
    pub correction_pressure_mmHg: f64,
    /// Wall correction volume scale Kxv (mL)
    pub correction_volume_mL: f64,
    /// Collapsible resistance gain KR (mmHg·s/mL)
    pub resistance_gain_mmHg_s_per_mL: f64,
    /// Reference volume Vmax of the collapsible resistance (mL)
    pub resistance_reference_volume_mL: f64,
    /// Resistance floor R0 (mmHg·s/mL)
    pub base_resistance_mmHg_s_per_mL: f64,
}

/// Rhythmic intramuscular pressure during exercise
///
/// Source: Magosso & Ursino 2002 (Eq 2-3)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MusclePumpParameters {
    /// Peak intramuscular pressure at full intensity (mmHg)
    pub amplitude_mmHg: f64,
    /// Contraction cycle period (s)
    pub cycle_period_s: f64,
    /// Contraction time within one cycle (s)
    pub contraction_time_s: f64,
}

impl SystemicParameters {
    fn validate(&self, v: &mut Validator) {
        v.positive("systemic.total_blood_volume_mL", self.total_blood_volume_mL);
        self.artery.validate(v, "systemic.artery");
        for (bed, p) in self.peripheral.iter() {
            p.validate(v, &format!("systemic.peripheral.{}", bed.key()));
        }
        for (bed, p) in self.venous.iter() {
            p.validate(v, &format!("systemic.venous.{}", bed.key()));
        }
        let am = &self.active_muscle_vein;
        v.non_negative("systemic.active_muscle_vein.collapse_pressure_mmHg", am.collapse_pressure_mmHg);
        v.positive(
            "systemic.active_muscle_vein.volume_resistance_coefficient_mmHg_s",
            am.volume_resistance_coefficient_mmHg_s,
        );
        let tv = &self.thoracic_veins;
        v.finite("systemic.thoracic_veins.open_offset_mmHg", tv.open_offset_mmHg);
        v.positive("systemic.thoracic_veins.open_elastance_mmHg_per_mL", tv.open_elastance_mmHg_per_mL);
        v.positive("systemic.thoracic_veins.unstressed_volume_mL", tv.unstressed_volume_mL);
        v.finite("systemic.thoracic_veins.collapsed_offset_mmHg", tv.collapsed_offset_mmHg);
        v.non_negative("systemic.thoracic_veins.collapsed_gain_mmHg", tv.collapsed_gain_mmHg);
        v.positive("systemic.thoracic_veins.collapsed_volume_scale_mL", tv.collapsed_volume_scale_mL);
        v.non_negative("systemic.thoracic_veins.correction_pressure_mmHg", tv.correction_pressure_mmHg);
        v.positive("systemic.thoracic_veins.correction_volume_mL", tv.correction_volume_mL);
        v.non_negative("systemic.thoracic_veins.resistance_gain_mmHg_s_per_mL", tv.resistance_gain_mmHg_s_per_mL);
        v.positive("systemic.thoracic_veins.resistance_reference_volume_mL", tv.resistance_reference_volume_mL);
        v.positive("systemic.thoracic_veins.base_resistance_mmHg_s_per_mL", tv.base_resistance_mmHg_s_per_mL);
        let mp = &self.muscle_pump;
        v.non_negative("systemic.muscle_pump.amplitude_mmHg", mp.amplitude_mmHg);
        v.positive("systemic.muscle_pump.cycle_period_s", mp.cycle_period_s);
        v.positive("systemic.muscle_pump.contraction_time_s", mp.contraction_time_s);
        if mp.contraction_time_s > mp.cycle_period_s {
            v.reject(
                "systemic.muscle_pump.contraction_time_s",
                mp.contraction_time_s,
                "contraction time exceeds the pump cycle",
            );
        }
    }
}

impl ArteryParameters {
    fn validate(&self, v: &mut Validator, prefix: &str) {
        v.positive(&format!("{prefix}.compliance_mL_per_mmHg"), self.compliance_mL_per_mmHg);
        v.non_negative(&format!("{prefix}.unstressed_volume_mL"), self.unstressed_volume_mL);
        v.positive(&format!("{prefix}.resistance_mmHg_s_per_mL"), self.resistance_mmHg_s_per_mL);
        if self.model == ArterialModel::Rlc {
            v.positive(&format!("{prefix}.inertance_mmHg_s2_per_mL"), self.inertance_mmHg_s2_per_mL);
        }
    }
}

impl Default for SystemicParameters {
    fn default() -> Self {
        Self {
            total_blood_volume_mL: 5000.0,
            // Albanese 2016, Table 1
            artery: ArteryParameters {
                compliance_mL_per_mmHg: 0.28,
                unstressed_volume_mL: 0.0,
                resistance_mmHg_s_per_mL: 0.06,
                inertance_mmHg_s2_per_mL: 0.22e-3,
                model: ArterialModel::Rlc,
            },
            peripheral: BedSet {
                splanchnic: CompartmentParameters::new(2.05, 241.47, 3.307),
                extrasplanchnic: CompartmentParameters::new(0.668, 118.48, 3.52),
                active_muscle: CompartmentParameters::new(0.315, 55.86, 7.46),
                resting_muscle: CompartmentParameters::new(0.21, 37.24, 11.2),
                brain: CompartmentParameters::new(0.358, 63.47, 6.57),
                coronary: CompartmentParameters::new(0.119, 21.12, 19.71),
            },
            venous: BedSet {
                splanchnic: CompartmentParameters::new(43.11, 986.48, 0.038),
                extrasplanchnic: CompartmentParameters::new(14.0, 484.0, 0.04),
                active_muscle: CompartmentParameters::new(6.6, 228.17, 0.0833),
                resting_muscle: CompartmentParameters::new(4.4, 152.11, 0.125),
                brain: CompartmentParameters::new(7.5, 259.28, 0.075),
                coronary: CompartmentParameters::new(2.5, 86.42, 0.224),
            },
            // Magosso & Ursino 2002 footnotes
            active_muscle_vein: ActiveMuscleVeinParameters {
                collapse_pressure_mmHg: 3.93,
                volume_resistance_coefficient_mmHg_s: 24.17,
                resistance_model: MuscleVeinResistance::VolumeDependent,
            },
            // Albanese 2016 (Eq 5-8)
            thoracic_veins: ThoracicVeinParameters {
                open_offset_mmHg: 0.3855,
                open_elastance_mmHg_per_mL: 0.15,
                unstressed_volume_mL: 130.0,
                collapsed_offset_mmHg: -5.0,
                collapsed_gain_mmHg: 0.4,
                collapsed_volume_scale_mL: 50.0,
                correction_pressure_mmHg: 2.0,
                correction_volume_mL: 8.0,
                resistance_gain_mmHg_s_per_mL: 0.001,
                resistance_reference_volume_mL: 350.0,
                base_resistance_mmHg_s_per_mL: 0.025,
            },
            muscle_pump: MusclePumpParameters {
                amplitude_mmHg: 50.0,
                cycle_period_s: 0.75,
                contraction_time_s: 0.3,
            },
        }
    }
}

// ============================================================================
// PULMONARY CIRCULATION
// ============================================================================

/// Pulmonary circulation
///
/// Reference: Albanese 2016, Table 1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PulmonaryParameters {
    pub artery: ArteryParameters,
    /// Gas-exchanging capillary path
    pub capillaries: CompartmentParameters,
    pub veins: CompartmentParameters,
    /// Fraction of pulmonary flow bypassing gas exchange
    /// Source: Albanese 2016 (sh = 1.7 %)
    pub shunt_fraction: f64,
}

impl PulmonaryParameters {
    fn validate(&self, v: &mut Validator) {
        self.artery.validate(v, "pulmonary.artery");
        self.capillaries.validate(v, "pulmonary.capillaries");
        self.veins.validate(v, "pulmonary.veins");
        v.in_range("pulmonary.shunt_fraction", self.shunt_fraction, 1e-6, 0.5);
    }
}

impl Default for PulmonaryParameters {
    fn default() -> Self {
        Self {
            artery: ArteryParameters {
                compliance_mL_per_mmHg: 0.76,
                unstressed_volume_mL: 0.0,
                resistance_mmHg_s_per_mL: 0.023,
                inertance_mmHg_s2_per_mL: 0.18e-3,
                model: ArterialModel::Rlc,
            },
            capillaries: CompartmentParameters::new(5.8, 108.2, 0.0894),
            veins: CompartmentParameters::new(25.37, 105.6, 0.0056),
            shunt_fraction: 0.017,
        }
    }
}

// ============================================================================
// LUNG MECHANICS
// ============================================================================

/// Airway resistance-compliance ladder and respiratory muscle drive
///
/// Reference: Albanese 2016, Table 2
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LungMechanicsParameters {
    pub larynx_compliance_L_per_cmH2O: f64,
    pub trachea_compliance_L_per_cmH2O: f64,
    pub bronchi_compliance_L_per_cmH2O: f64,
    pub alveolar_compliance_L_per_cmH2O: f64,
    pub chest_wall_compliance_L_per_cmH2O: f64,
    pub larynx_unstressed_volume_L: f64,
    pub trachea_unstressed_volume_L: f64,
    pub bronchi_unstressed_volume_L: f64,
    /// Mouth to larynx
    pub mouth_larynx_resistance_cmH2O_s_per_L: f64,
    pub larynx_trachea_resistance_cmH2O_s_per_L: f64,
    pub trachea_bronchi_resistance_cmH2O_s_per_L: f64,
    pub bronchi_alveoli_resistance_cmH2O_s_per_L: f64,
    /// Functional residual capacity (L)
    pub functional_residual_capacity_L: f64,
    /// End-expiratory pleural pressure (cmH2O)
    pub end_expiratory_pleural_pressure_cmH2O: f64,
    /// Breathing rate at rest (breaths/min)
    pub respiratory_rate_bpm: f64,
    /// Most negative muscle pressure at rest (cmH2O)
    pub muscle_pressure_min_cmH2O: f64,
    /// Expiratory decay: τ = Te / this ratio
    pub expiratory_time_constant_ratio: f64,
    /// Abdominal pressure at end expiration (mmHg)
    pub abdominal_pressure_max_mmHg: f64,
    /// Abdominal pressure at peak inspiration (mmHg)
    pub abdominal_pressure_min_mmHg: f64,
}

impl LungMechanicsParameters {
    fn validate(&self, v: &mut Validator) {
        let p = "lung_mechanics";
        v.positive(&format!("{p}.larynx_compliance_L_per_cmH2O"), self.larynx_compliance_L_per_cmH2O);
        v.positive(&format!("{p}.trachea_compliance_L_per_cmH2O"), self.trachea_compliance_L_per_cmH2O);
        v.positive(&format!("{p}.bronchi_compliance_L_per_cmH2O"), self.bronchi_compliance_L_per_cmH2O);
        v.positive(&format!("{p}.alveolar_compliance_L_per_cmH2O"), self.alveolar_compliance_L_per_cmH2O);
        v.positive(&format!("{p}.chest_wall_compliance_L_per_cmH2O"), self.chest_wall_compliance_L_per_cmH2O);
        v.non_negative(&format!("{p}.larynx_unstressed_volume_L"), self.larynx_unstressed_volume_L);
        v.non_negative(&format!("{p}.trachea_unstressed_volume_L"), self.trachea_unstressed_volume_L);
        v.non_negative(&format!("{p}.bronchi_unstressed_volume_L"), self.bronchi_unstressed_volume_L);
        v.positive(&format!("{p}.mouth_larynx_resistance_cmH2O_s_per_L"), self.mouth_larynx_resistance_cmH2O_s_per_L);
        v.positive(&format!("{p}.larynx_trachea_resistance_cmH2O_s_per_L"), self.larynx_trachea_resistance_cmH2O_s_per_L);
        v.positive(&format!("{p}.trachea_bronchi_resistance_cmH2O_s_per_L"), self.trachea_bronchi_resistance_cmH2O_s_per_L);
        v.positive(&format!("{p}.bronchi_alveoli_resistance_cmH2O_s_per_L"), self.bronchi_alveoli_resistance_cmH2O_s_per_L);
        v.positive(&format!("{p}.functional_residual_capacity_L"), self.functional_residual_capacity_L);
        v.finite(&format!("{p}.end_expiratory_pleural_pressure_cmH2O"), self.end_expiratory_pleural_pressure_cmH2O);
        v.positive(&format!("{p}.respiratory_rate_bpm"), self.respiratory_rate_bpm);
        v.in_range(&format!("{p}.muscle_pressure_min_cmH2O"), self.muscle_pressure_min_cmH2O, -100.0, -1e-3);
        v.positive(&format!("{p}.expiratory_time_constant_ratio"), self.expiratory_time_constant_ratio);
        v.finite(&format!("{p}.abdominal_pressure_max_mmHg"), self.abdominal_pressure_max_mmHg);
        v.finite(&format!("{p}.abdominal_pressure_min_mmHg"), self.abdominal_pressure_min_mmHg);
    }
}

impl Default for LungMechanicsParameters {
    fn default() -> Self {
        Self {
            // Albanese 2016, Table 2
            larynx_compliance_L_per_cmH2O: 0.00127,
            trachea_compliance_L_per_cmH2O: 0.00238,
            bronchi_compliance_L_per_cmH2O: 0.0131,
            alveolar_compliance_L_per_cmH2O: 0.2,
            chest_wall_compliance_L_per_cmH2O: 0.2445,
            larynx_unstressed_volume_L: 0.0344,
            trachea_unstressed_volume_L: 0.00663,
            bronchi_unstressed_volume_L: 0.0187,
            mouth_larynx_resistance_cmH2O_s_per_L: 1.021,
            larynx_trachea_resistance_cmH2O_s_per_L: 0.3369,
            trachea_bronchi_resistance_cmH2O_s_per_L: 0.3063,
            bronchi_alveoli_resistance_cmH2O_s_per_L: 0.0817,
            functional_residual_capacity_L: 2.4,
            end_expiratory_pleural_pressure_cmH2O: -5.0,
            respiratory_rate_bpm: 12.0,
            muscle_pressure_min_cmH2O: -5.0,
            expiratory_time_constant_ratio: 5.0,
            // Albanese 2016 respiratory pump (Eq 9-10)
            abdominal_pressure_max_mmHg: 0.0,
            abdominal_pressure_min_mmHg: -2.5,
        }
    }
}

// ============================================================================
// LUNG GAS EXCHANGE
// ============================================================================

/// Dead-space and alveolar gas balance plus blood-gas dissociation
///
/// Reference: Albanese 2016, Table 3; Spencer JL et al. J Appl Physiol 1979
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LungGasParameters {
    pub inspired_o2_fraction: f64,
    pub inspired_co2_fraction: f64,
    /// STPD → BTPS conversion factor K
    pub btps_factor: f64,
    pub atmospheric_pressure_mmHg: f64,
    pub water_vapour_pressure_mmHg: f64,
    pub o2: DissociationParameters,
    pub co2: DissociationParameters,
    /// Blood hemoglobin (g/dL)
    pub hemoglobin_g_per_dL: f64,
}

/// One branch of the coupled Spencer dissociation curves
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DissociationParameters {
    /// Saturation concentration Csat (mmol/L)
    pub saturation_mmol_per_L: f64,
    /// Hill exponent h
    pub hill_exponent: f64,
    /// Cross-gas α (1/mmHg)
    pub alpha_per_mmHg: f64,
    /// Cross-gas β (1/mmHg)
    pub beta_per_mmHg: f64,
    /// Half-saturation pressure K (mmHg)
    pub half_saturation_mmHg: f64,
}

impl LungGasParameters {
    fn validate(&self, v: &mut Validator) {
        v.in_range("lung_gas.inspired_o2_fraction", self.inspired_o2_fraction, 0.0, 1.0);
        v.in_range("lung_gas.inspired_co2_fraction", self.inspired_co2_fraction, 0.0, 1.0);
        v.positive("lung_gas.btps_factor", self.btps_factor);
        v.positive("lung_gas.atmospheric_pressure_mmHg", self.atmospheric_pressure_mmHg);
        v.non_negative("lung_gas.water_vapour_pressure_mmHg", self.water_vapour_pressure_mmHg);
        if self.water_vapour_pressure_mmHg >= self.atmospheric_pressure_mmHg {
            v.reject(
                "lung_gas.water_vapour_pressure_mmHg",
                self.water_vapour_pressure_mmHg,
                "must be below atmospheric pressure",
            );
        }
        for (name, d) in [("o2", &self.o2), ("co2", &self.co2)] {
            v.positive(&format!("lung_gas.{name}.saturation_mmol_per_L"), d.saturation_mmol_per_L);
            v.positive(&format!("lung_gas.{name}.hill_exponent"), d.hill_exponent);
            v.non_negative(&format!("lung_gas.{name}.alpha_per_mmHg"), d.alpha_per_mmHg);
            v.non_negative(&format!("lung_gas.{name}.beta_per_mmHg"), d.beta_per_mmHg);
            v.positive(&format!("lung_gas.{name}.half_saturation_mmHg"), d.half_saturation_mmHg);
        }
        v.positive("lung_gas.hemoglobin_g_per_dL", self.hemoglobin_g_per_dL);
    }
}

impl Default for LungGasParameters {
    fn default() -> Self {
        Self {
            // Albanese 2016, Table 3
            inspired_o2_fraction: 0.21037,
            inspired_co2_fraction: 0.00421,
            btps_factor: 1.2103,
            atmospheric_pressure_mmHg: 760.0,
            water_vapour_pressure_mmHg: 47.0,
            // Spencer et al. 1979
            o2: DissociationParameters {
                saturation_mmol_per_L: 9.0,
                hill_exponent: 0.3836,
                alpha_per_mmHg: 0.03198,
                beta_per_mmHg: 0.008275,
                half_saturation_mmHg: 14.99,
            },
            co2: DissociationParameters {
                saturation_mmol_per_L: 86.11,
                hill_exponent: 1.819,
                alpha_per_mmHg: 0.05591,
                beta_per_mmHg: 0.03255,
                half_saturation_mmHg: 194.4,
            },
            hemoglobin_g_per_dL: 15.0,
        }
    }
}

// ============================================================================
// TISSUE GAS EXCHANGE
// ============================================================================

/// Per-bed tissue volumes and metabolic rates
///
/// Reference: Magosso & Ursino 2002, Table 2; Albanese 2016, Table 4
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TissueGasParameters {
    /// Tissue volume (mL)
    pub tissue_volume_mL: BedSet<f64>,
    /// O2 consumption at rest (mL/min STPD)
    pub o2_consumption_mL_per_min: BedSet<f64>,
    /// CO2 production at rest (mL/min STPD)
    pub co2_production_mL_per_min: BedSet<f64>,
}

impl TissueGasParameters {
    fn validate(&self, v: &mut Validator) {
        for (bed, value) in self.tissue_volume_mL.iter() {
            v.positive(&format!("tissue.tissue_volume_mL.{}", bed.key()), *value);
        }
        for (bed, value) in self.o2_consumption_mL_per_min.iter() {
            v.non_negative(&format!("tissue.o2_consumption_mL_per_min.{}", bed.key()), *value);
        }
        for (bed, value) in self.co2_production_mL_per_min.iter() {
            v.non_negative(&format!("tissue.co2_production_mL_per_min.{}", bed.key()), *value);
        }
    }

    /// CO2 produced per O2 consumed in one bed
    pub fn respiratory_quotient(&self, bed: crate::state::Bed) -> f64 {
        let o2 = self.o2_consumption_mL_per_min[bed];
        if o2 > 0.0 {
            self.co2_production_mL_per_min[bed] / o2
        } else {
            0.0
        }
    }
}

impl Default for TissueGasParameters {
    fn default() -> Self {
        Self {
            // Muscle tissue (31200 mL) split 60/40 between active and
            // resting groups, matching their peripheral compliances
            tissue_volume_mL: BedSet {
                splanchnic: 2673.0,
                extrasplanchnic: 262.0,
                active_muscle: 18_720.0,
                resting_muscle: 12_480.0,
                brain: 1300.0,
                coronary: 284.0,
            },
            o2_consumption_mL_per_min: BedSet {
                splanchnic: 108.419,
                extrasplanchnic: 14.683,
                active_muscle: 30.96,
                resting_muscle: 20.64,
                brain: 47.502,
                coronary: 24.0,
            },
            co2_production_mL_per_min: BedSet {
                splanchnic: 91.072,
                extrasplanchnic: 12.337,
                active_muscle: 26.006,
                resting_muscle: 17.338,
                brain: 39.961,
                coronary: 20.16,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_parameters_validate() {
        assert!(Parameters::default().validate().is_ok());
    }

    #[test]
    fn test_json_round_trip_preserves_values() {
        let params = Parameters::default();
        let json = params.to_json_pretty().unwrap();
        let parsed = Parameters::from_json_str(&json).unwrap();
        assert_eq!(
            parsed.systemic.peripheral.brain.resistance_mmHg_s_per_mL,
            params.systemic.peripheral.brain.resistance_mmHg_s_per_mL
        );
    }

    #[test]
    fn test_missing_key_fails_fast() {
        let mut value = serde_json::to_value(Parameters::default()).unwrap();
        value["systemic"]["artery"]
            .as_object_mut()
            .unwrap()
            .remove("compliance_mL_per_mmHg");
        let err = Parameters::from_json_str(&value.to_string()).unwrap_err();
        match err {
            ConfigError::MissingParameter(key) => {
                assert!(key.contains("compliance_mL_per_mmHg"), "got {key}")
            }
            other => panic!("expected MissingParameter, got {other}"),
        }
    }

    #[test]
    fn test_unknown_key_rejected() {
        let mut value = serde_json::to_value(Parameters::default()).unwrap();
        value["heart"]["bogus"] = serde_json::json!(1.0);
        assert!(Parameters::from_json_str(&value.to_string()).is_err());
    }

    #[test]
    fn test_negative_compliance_rejected() {
        let mut params = Parameters::default();
        params.pulmonary.veins.compliance_mL_per_mmHg = -1.0;
        let err = params.validate().unwrap_err();
        assert!(err.to_string().contains("pulmonary.veins.compliance_mL_per_mmHg"));
    }

    #[test]
    fn test_thoracic_vein_branches_meet_at_unstressed_volume() {
        let tv = SystemicParameters::default().thoracic_veins;
        let open = tv.open_offset_mmHg;
        let collapsed = tv.collapsed_offset_mmHg
            + tv.collapsed_gain_mmHg * (tv.unstressed_volume_mL / tv.collapsed_volume_scale_mL).exp();
        assert!((open - collapsed).abs() < 1e-3, "open {open} vs collapsed {collapsed}");
    }
}
