//! Neural, local and respiratory control parameters, plus the exercise
//! drive that feeds them.
//!
//! References:
//! - Ursino M. Am J Physiol 1998;275:H1733-H1747 (baroreflex, effectors)
//! - Magosso E, Ursino M. Am J Physiol 2001;281:H2036-H2052 (chemoreflex, lung stretch)
//! - Magosso E, Ursino M. Am J Physiol 2002;283:H2123-H2137 (exercise, autoregulation)
//! - Ursino M, Magosso E. Am J Physiol 2000;279:H149-H165 (CNS ischemic response)
//! - Albanese A et al. Ann Biomed Eng 2016;44:3209-3229 (respiratory control)

use serde::{Deserialize, Serialize};

use super::validation::Validator;
use crate::state::Bed;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ControlParameters {
    pub baroreceptor: BaroreceptorParameters,
    pub chemoreceptor: ChemoreceptorParameters,
    pub lung_stretch: LungStretchParameters,
    pub cns: CnsIschemicParameters,
    pub sympathetic: SympatheticParameters,
    pub vagal: VagalParameters,
    pub central_command: CentralCommandParameters,
    pub effectors: EffectorParameters,
    pub autoregulation: AutoregulationParameters,
    pub respiratory: RespiratoryControlParameters,
}

// ============================================================================
// AFFERENT PATHWAYS
// ============================================================================

/// Carotid sinus baroreceptors
///
/// Source: Ursino 1998, Table 2
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BaroreceptorParameters {
    /// Zero time constant τz (s)
    pub zero_time_constant_s: f64,
    /// Pole time constant τp (s)
    pub pole_time_constant_s: f64,
    /// Central pressure of the sigmoid Pn (mmHg)
    pub setpoint_mmHg: f64,
    /// Sigmoid slope ka (mmHg)
    pub slope_mmHg: f64,
    pub rate_min_hz: f64,
    pub rate_max_hz: f64,
}

/// Peripheral chemoreceptors
///
/// Source: Magosso & Ursino 2001
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChemoreceptorParameters {
    /// Firing rate at normal blood gases (spikes/s)
    pub nominal_rate_hz: f64,
    pub rate_min_hz: f64,
    pub rate_max_hz: f64,
    /// Asymptote of the hyperbolic O2 response (mmHg)
    pub o2_asymptote_mmHg: f64,
    /// Linear CO2 gain (1/mmHg)
    pub co2_gain_per_mmHg: f64,
    pub o2_time_constant_s: f64,
    pub co2_time_constant_s: f64,
    /// Normal arterial PO2 (mmHg)
    pub normal_pao2_mmHg: f64,
    /// Normal arterial PCO2 (mmHg)
    pub normal_paco2_mmHg: f64,
}

/// Pulmonary stretch receptors
///
/// Source: Magosso & Ursino 2001
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LungStretchParameters {
    /// Gain on lung volume above FRC (spikes/s/L)
    pub gain_hz_per_L: f64,
    pub time_constant_s: f64,
    /// Mean firing over a quiet breath (spikes/s)
    pub nominal_rate_hz: f64,
}

/// CNS ischemic response to hypoxia and hypercapnia
///
/// Source: Ursino & Magosso 2000
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CnsIschemicParameters {
    pub o2_threshold_mmHg: f64,
    pub co2_threshold_mmHg: f64,
    pub o2_gain_per_mmHg: f64,
    pub co2_gain_per_mmHg: f64,
    pub time_constant_s: f64,
}

// ============================================================================
// EFFERENT PATHWAYS
// ============================================================================

/// Afferent weights for one sympathetic pathway
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SympatheticWeights {
    pub baroreceptor: f64,
    pub chemoreceptor: f64,
    pub lung_stretch: f64,
}

/// Sympathetic efferent fibres
///
/// Source: Magosso & Ursino 2001, Table 1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SympatheticParameters {
    pub rate_asymptote_hz: f64,
    pub rate_zero_input_hz: f64,
    pub exponent_gain: f64,
    pub rate_max_hz: f64,
    /// Firing threshold of the logarithmic effector response (spikes/s)
    pub effector_threshold_hz: f64,
    /// Arterioles
    pub resistance_weights: SympatheticWeights,
    /// Venous capacitance
    pub venous_weights: SympatheticWeights,
    /// Heart (contractility, period)
    pub heart_weights: SympatheticWeights,
}

/// Vagal efferent fibres to the sinus node
///
/// Source: Magosso & Ursino 2001
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VagalParameters {
    pub rate_zero_input_hz: f64,
    pub rate_asymptote_hz: f64,
    /// Baroreceptor rate at the sigmoid centre (spikes/s)
    pub baroreceptor_centre_hz: f64,
    pub slope_hz: f64,
    pub chemoreceptor_weight: f64,
    pub lung_stretch_weight: f64,
}

/// γ(I) = (γmin + γmax·e)/(1 + e), e = exp((I − I0)/k)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CentralCommandCurve {
    pub gain_max_hz: f64,
    pub intensity_centre: f64,
    pub intensity_slope: f64,
    pub gain_min_hz: f64,
}

/// Feed-forward exercise command to the efferent pathways
///
/// Source: Magosso & Ursino 2002, Table 1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CentralCommandParameters {
    pub resistance: CentralCommandCurve,
    pub venous: CentralCommandCurve,
    pub heart: CentralCommandCurve,
    pub vagal: CentralCommandCurve,
}

/// Static gain and first-order dynamics of one effector
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EffectorDynamics {
    pub gain: f64,
    pub time_constant_s: f64,
    pub delay_s: f64,
}

/// Effector gains (units follow the controlled quantity per ln(spikes/s))
///
/// Source: Ursino 1998, Table 3; Magosso & Ursino 2002
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EffectorParameters {
    pub resistance_splanchnic: EffectorDynamics,
    pub resistance_extrasplanchnic: EffectorDynamics,
    pub resistance_active_muscle: EffectorDynamics,
    pub resistance_resting_muscle: EffectorDynamics,
    pub unstressed_splanchnic: EffectorDynamics,
    pub unstressed_extrasplanchnic: EffectorDynamics,
    pub unstressed_active_muscle: EffectorDynamics,
    pub unstressed_resting_muscle: EffectorDynamics,
    pub elastance_left: EffectorDynamics,
    pub elastance_right: EffectorDynamics,
    pub period_sympathetic: EffectorDynamics,
    /// Linear in vagal firing
    pub period_vagal: EffectorDynamics,
    pub heart_period_min_s: f64,
    pub heart_period_max_s: f64,
}

// ============================================================================
// LOCAL AUTOREGULATION
// ============================================================================

/// Local O2 and CO2 regulation of one vascular bed
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocalRegulation {
    /// Gain on venous O2 deviation (per mL/mL)
    pub o2_gain: f64,
    /// Gain on arterial PCO2 deviation (1/mmHg)
    pub co2_gain_per_mmHg: f64,
    /// Venous O2 content at rest (mL/mL)
    pub normal_venous_o2: f64,
}

/// Source: Ursino & Magosso 2000; Magosso & Ursino 2002
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AutoregulationParameters {
    pub o2_time_constant_s: f64,
    pub co2_time_constant_s: f64,
    pub brain: LocalRegulation,
    pub coronary: LocalRegulation,
    pub active_muscle: LocalRegulation,
    pub resting_muscle: LocalRegulation,
}

impl AutoregulationParameters {
    /// Beds with local regulation, in a fixed order
    pub const REGULATED: [Bed; 4] = [Bed::Brain, Bed::Coronary, Bed::ActiveMuscle, Bed::RestingMuscle];

    pub fn bed(&self, bed: Bed) -> Option<&LocalRegulation> {
        match bed {
            Bed::Brain => Some(&self.brain),
            Bed::Coronary => Some(&self.coronary),
            Bed::ActiveMuscle => Some(&self.active_muscle),
            Bed::RestingMuscle => Some(&self.resting_muscle),
            Bed::Splanchnic | Bed::Extrasplanchnic => None,
        }
    }
}

// ============================================================================
// RESPIRATORY CONTROL
// ============================================================================

/// One first-order chemoreflex branch acting on breathing
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RespiratoryBranch {
    pub gain: f64,
    pub time_constant_s: f64,
}

/// Chemoreflex control of breathing rate and drive amplitude
///
/// Source: Albanese 2016 (Eq 28-33)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RespiratoryControlParameters {
    /// Peripheral branch on amplitude (cmH2O per spike/s)
    pub peripheral_amplitude: RespiratoryBranch,
    /// Peripheral branch on rate (breaths/min per spike/s)
    pub peripheral_rate: RespiratoryBranch,
    pub peripheral_delay_s: f64,
    /// Central branch on amplitude (cmH2O/mmHg)
    pub central_amplitude: RespiratoryBranch,
    /// Central branch on rate (breaths/min/mmHg)
    pub central_rate: RespiratoryBranch,
    pub central_delay_s: f64,
    pub rate_min_bpm: f64,
    pub rate_max_bpm: f64,
    /// Least negative muscle pressure allowed (cmH2O)
    pub muscle_pressure_ceiling_cmH2O: f64,
    /// Tidal volume at the nominal drive, used for reported ventilation (L)
    pub nominal_tidal_volume_L: f64,
}

// ============================================================================
// EXERCISE
// ============================================================================

/// Exercise drives: metabolic vasodilation, muscle O2 demand and
/// exercise hyperpnoea
///
/// Source: Magosso & Ursino 2002
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExerciseParameters {
    pub metabolic_vasodilation: MetabolicVasodilationParameters,
    pub muscle_demand: MuscleDemandParameters,
    pub ventilation: ExerciseVentilationParameters,
}

/// φmet(I) = (qmin + qmax·e)/(1 + e), e = exp((I − I0)/k)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetabolicVasodilationParameters {
    pub response_min: f64,
    pub response_max: f64,
    pub intensity_centre: f64,
    pub intensity_slope: f64,
    pub delay_s: f64,
    pub time_constant_s: f64,
}

/// Active-muscle O2 demand xM, with M = Mn·(1 + xM)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MuscleDemandParameters {
    pub gain: f64,
    pub time_constant_s: f64,
}

/// ΔV̇ = A·I + B·I² split into a fast share and a slow first-order share
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExerciseVentilationParameters {
    pub linear_L_per_min: f64,
    pub quadratic_L_per_min: f64,
    pub nominal_ventilation_L_per_min: f64,
    pub fast_fraction: f64,
    pub slow_time_constant_s: f64,
    pub delay_s: f64,
}

// ============================================================================
// VALIDATION
// ============================================================================

impl ControlParameters {
    pub(super) fn validate(&self, v: &mut Validator) {
        let b = &self.baroreceptor;
        v.positive("control.baroreceptor.zero_time_constant_s", b.zero_time_constant_s);
        v.positive("control.baroreceptor.pole_time_constant_s", b.pole_time_constant_s);
        v.positive("control.baroreceptor.setpoint_mmHg", b.setpoint_mmHg);
        v.positive("control.baroreceptor.slope_mmHg", b.slope_mmHg);
        v.non_negative("control.baroreceptor.rate_min_hz", b.rate_min_hz);
        v.positive("control.baroreceptor.rate_max_hz", b.rate_max_hz);

        let c = &self.chemoreceptor;
        v.positive("control.chemoreceptor.nominal_rate_hz", c.nominal_rate_hz);
        v.non_negative("control.chemoreceptor.rate_min_hz", c.rate_min_hz);
        v.positive("control.chemoreceptor.rate_max_hz", c.rate_max_hz);
        if c.rate_min_hz > c.rate_max_hz {
            v.reject("control.chemoreceptor.rate_min_hz", c.rate_min_hz, "exceeds rate_max_hz");
        }
        v.non_negative("control.chemoreceptor.o2_asymptote_mmHg", c.o2_asymptote_mmHg);
        v.finite("control.chemoreceptor.co2_gain_per_mmHg", c.co2_gain_per_mmHg);
        v.positive("control.chemoreceptor.o2_time_constant_s", c.o2_time_constant_s);
        v.positive("control.chemoreceptor.co2_time_constant_s", c.co2_time_constant_s);
        v.positive("control.chemoreceptor.normal_pao2_mmHg", c.normal_pao2_mmHg);
        v.positive("control.chemoreceptor.normal_paco2_mmHg", c.normal_paco2_mmHg);

        v.non_negative("control.lung_stretch.gain_hz_per_L", self.lung_stretch.gain_hz_per_L);
        v.positive("control.lung_stretch.time_constant_s", self.lung_stretch.time_constant_s);
        v.non_negative("control.lung_stretch.nominal_rate_hz", self.lung_stretch.nominal_rate_hz);

        let n = &self.cns;
        v.positive("control.cns.o2_threshold_mmHg", n.o2_threshold_mmHg);
        v.positive("control.cns.co2_threshold_mmHg", n.co2_threshold_mmHg);
        v.non_negative("control.cns.o2_gain_per_mmHg", n.o2_gain_per_mmHg);
        v.non_negative("control.cns.co2_gain_per_mmHg", n.co2_gain_per_mmHg);
        v.positive("control.cns.time_constant_s", n.time_constant_s);

        let s = &self.sympathetic;
        v.non_negative("control.sympathetic.rate_asymptote_hz", s.rate_asymptote_hz);
        v.positive("control.sympathetic.rate_zero_input_hz", s.rate_zero_input_hz);
        v.positive("control.sympathetic.exponent_gain", s.exponent_gain);
        v.positive("control.sympathetic.rate_max_hz", s.rate_max_hz);
        v.non_negative("control.sympathetic.effector_threshold_hz", s.effector_threshold_hz);
        for (name, w) in [
            ("resistance_weights", &s.resistance_weights),
            ("venous_weights", &s.venous_weights),
            ("heart_weights", &s.heart_weights),
        ] {
            v.finite(&format!("control.sympathetic.{name}.baroreceptor"), w.baroreceptor);
            v.finite(&format!("control.sympathetic.{name}.chemoreceptor"), w.chemoreceptor);
            v.finite(&format!("control.sympathetic.{name}.lung_stretch"), w.lung_stretch);
        }

        let g = &self.vagal;
        v.non_negative("control.vagal.rate_zero_input_hz", g.rate_zero_input_hz);
        v.non_negative("control.vagal.rate_asymptote_hz", g.rate_asymptote_hz);
        v.finite("control.vagal.baroreceptor_centre_hz", g.baroreceptor_centre_hz);
        v.positive("control.vagal.slope_hz", g.slope_hz);
        v.finite("control.vagal.chemoreceptor_weight", g.chemoreceptor_weight);
        v.finite("control.vagal.lung_stretch_weight", g.lung_stretch_weight);

        for (name, curve) in [
            ("resistance", &self.central_command.resistance),
            ("venous", &self.central_command.venous),
            ("heart", &self.central_command.heart),
            ("vagal", &self.central_command.vagal),
        ] {
            v.finite(&format!("control.central_command.{name}.gain_max_hz"), curve.gain_max_hz);
            v.finite(&format!("control.central_command.{name}.intensity_centre"), curve.intensity_centre);
            v.positive(&format!("control.central_command.{name}.intensity_slope"), curve.intensity_slope);
            v.finite(&format!("control.central_command.{name}.gain_min_hz"), curve.gain_min_hz);
        }

        let e = &self.effectors;
        for (name, dynamics) in e.named() {
            v.finite(&format!("control.effectors.{name}.gain"), dynamics.gain);
            v.positive(&format!("control.effectors.{name}.time_constant_s"), dynamics.time_constant_s);
            v.non_negative(&format!("control.effectors.{name}.delay_s"), dynamics.delay_s);
        }
        v.positive("control.effectors.heart_period_min_s", e.heart_period_min_s);
        v.positive("control.effectors.heart_period_max_s", e.heart_period_max_s);
        if e.heart_period_min_s >= e.heart_period_max_s {
            v.reject("control.effectors.heart_period_min_s", e.heart_period_min_s, "must be below heart_period_max_s");
        }

        let a = &self.autoregulation;
        v.positive("control.autoregulation.o2_time_constant_s", a.o2_time_constant_s);
        v.positive("control.autoregulation.co2_time_constant_s", a.co2_time_constant_s);
        for bed in AutoregulationParameters::REGULATED {
            if let Some(local) = a.bed(bed) {
                v.non_negative(&format!("control.autoregulation.{}.o2_gain", bed.key()), local.o2_gain);
                v.finite(&format!("control.autoregulation.{}.co2_gain_per_mmHg", bed.key()), local.co2_gain_per_mmHg);
                v.positive(&format!("control.autoregulation.{}.normal_venous_o2", bed.key()), local.normal_venous_o2);
            }
        }

        let r = &self.respiratory;
        for (name, branch) in [
            ("peripheral_amplitude", &r.peripheral_amplitude),
            ("peripheral_rate", &r.peripheral_rate),
            ("central_amplitude", &r.central_amplitude),
            ("central_rate", &r.central_rate),
        ] {
            v.finite(&format!("control.respiratory.{name}.gain"), branch.gain);
            v.positive(&format!("control.respiratory.{name}.time_constant_s"), branch.time_constant_s);
        }
        v.non_negative("control.respiratory.peripheral_delay_s", r.peripheral_delay_s);
        v.non_negative("control.respiratory.central_delay_s", r.central_delay_s);
        v.positive("control.respiratory.rate_min_bpm", r.rate_min_bpm);
        v.positive("control.respiratory.rate_max_bpm", r.rate_max_bpm);
        if r.rate_min_bpm >= r.rate_max_bpm {
            v.reject("control.respiratory.rate_min_bpm", r.rate_min_bpm, "must be below rate_max_bpm");
        }
        v.in_range(
            "control.respiratory.muscle_pressure_ceiling_cmH2O",
            r.muscle_pressure_ceiling_cmH2O,
            -100.0,
            -1e-3,
        );
        v.positive("control.respiratory.nominal_tidal_volume_L", r.nominal_tidal_volume_L);
    }
}

impl EffectorParameters {
    fn named(&self) -> [(&'static str, &EffectorDynamics); 12] {
        [
            ("resistance_splanchnic", &self.resistance_splanchnic),
            ("resistance_extrasplanchnic", &self.resistance_extrasplanchnic),
            ("resistance_active_muscle", &self.resistance_active_muscle),
            ("resistance_resting_muscle", &self.resistance_resting_muscle),
            ("unstressed_splanchnic", &self.unstressed_splanchnic),
            ("unstressed_extrasplanchnic", &self.unstressed_extrasplanchnic),
            ("unstressed_active_muscle", &self.unstressed_active_muscle),
            ("unstressed_resting_muscle", &self.unstressed_resting_muscle),
            ("elastance_left", &self.elastance_left),
            ("elastance_right", &self.elastance_right),
            ("period_sympathetic", &self.period_sympathetic),
            ("period_vagal", &self.period_vagal),
        ]
    }
}

impl ExerciseParameters {
    pub(super) fn validate(&self, v: &mut Validator) {
        let m = &self.metabolic_vasodilation;
        v.finite("exercise.metabolic_vasodilation.response_min", m.response_min);
        v.finite("exercise.metabolic_vasodilation.response_max", m.response_max);
        v.finite("exercise.metabolic_vasodilation.intensity_centre", m.intensity_centre);
        v.positive("exercise.metabolic_vasodilation.intensity_slope", m.intensity_slope);
        v.non_negative("exercise.metabolic_vasodilation.delay_s", m.delay_s);
        v.positive("exercise.metabolic_vasodilation.time_constant_s", m.time_constant_s);
        v.non_negative("exercise.muscle_demand.gain", self.muscle_demand.gain);
        v.positive("exercise.muscle_demand.time_constant_s", self.muscle_demand.time_constant_s);
        let w = &self.ventilation;
        v.finite("exercise.ventilation.linear_L_per_min", w.linear_L_per_min);
        v.finite("exercise.ventilation.quadratic_L_per_min", w.quadratic_L_per_min);
        v.positive("exercise.ventilation.nominal_ventilation_L_per_min", w.nominal_ventilation_L_per_min);
        v.in_range("exercise.ventilation.fast_fraction", w.fast_fraction, 0.0, 1.0);
        v.positive("exercise.ventilation.slow_time_constant_s", w.slow_time_constant_s);
        v.non_negative("exercise.ventilation.delay_s", w.delay_s);
    }
}

// ============================================================================
// DEFAULTS
// ============================================================================

impl Default for ControlParameters {
    fn default() -> Self {
        // Sympathetic pathway weights: Magosso & Ursino 2001, Table 1
        let vascular = SympatheticWeights {
            baroreceptor: 1.0,
            chemoreceptor: 1.716,
            lung_stretch: 0.34,
        };
        Self {
            // Ursino 1998
            baroreceptor: BaroreceptorParameters {
                zero_time_constant_s: 6.37,
                pole_time_constant_s: 2.076,
                setpoint_mmHg: 92.0,
                slope_mmHg: 11.758,
                rate_min_hz: 2.52,
                rate_max_hz: 47.78,
            },
            chemoreceptor: ChemoreceptorParameters {
                nominal_rate_hz: 3.7,
                rate_min_hz: 0.835,
                rate_max_hz: 12.3,
                o2_asymptote_mmHg: 30.0,
                co2_gain_per_mmHg: 0.1,
                o2_time_constant_s: 2.0,
                co2_time_constant_s: 2.0,
                normal_pao2_mmHg: 100.0,
                normal_paco2_mmHg: 40.0,
            },
            lung_stretch: LungStretchParameters {
                gain_hz_per_L: 11.76,
                time_constant_s: 2.0,
                nominal_rate_hz: 2.3,
            },
            // Ursino & Magosso 2000
            cns: CnsIschemicParameters {
                o2_threshold_mmHg: 40.0,
                co2_threshold_mmHg: 55.0,
                o2_gain_per_mmHg: 0.5,
                co2_gain_per_mmHg: 0.4,
                time_constant_s: 20.0,
            },
            sympathetic: SympatheticParameters {
                rate_asymptote_hz: 2.1,
                rate_zero_input_hz: 16.11,
                exponent_gain: 0.0675,
                rate_max_hz: 60.0,
                effector_threshold_hz: 2.66,
                resistance_weights: vascular,
                venous_weights: vascular,
                heart_weights: SympatheticWeights {
                    baroreceptor: 1.0,
                    chemoreceptor: 1.0,
                    lung_stretch: 0.0,
                },
            },
            vagal: VagalParameters {
                rate_zero_input_hz: 3.2,
                rate_asymptote_hz: 6.3,
                baroreceptor_centre_hz: 25.0,
                slope_hz: 7.06,
                chemoreceptor_weight: 0.2,
                lung_stretch_weight: 0.103,
            },
            // Magosso & Ursino 2002, Table 1
            central_command: CentralCommandParameters {
                resistance: CentralCommandCurve {
                    gain_max_hz: 5.5,
                    intensity_centre: 0.65,
                    intensity_slope: 0.13,
                    gain_min_hz: -0.037,
                },
                venous: CentralCommandCurve {
                    gain_max_hz: 64.9,
                    intensity_centre: 0.45,
                    intensity_slope: 0.09,
                    gain_min_hz: -0.437,
                },
                heart: CentralCommandCurve {
                    gain_max_hz: 9.0,
                    intensity_centre: 0.658,
                    intensity_slope: 0.114,
                    gain_min_hz: -0.0283,
                },
                vagal: CentralCommandCurve {
                    gain_max_hz: 1.9,
                    intensity_centre: 0.126,
                    intensity_slope: 0.0162,
                    gain_min_hz: -0.0008,
                },
            },
            // Ursino 1998, Table 3; muscle beds from Magosso & Ursino 2002
            effectors: EffectorParameters {
                resistance_splanchnic: dynamics(0.695, 6.0, 2.0),
                resistance_extrasplanchnic: dynamics(0.53, 6.0, 2.0),
                resistance_active_muscle: dynamics(2.24, 6.0, 2.0),
                resistance_resting_muscle: dynamics(3.36, 6.0, 2.0),
                unstressed_splanchnic: dynamics(-265.4, 20.0, 5.0),
                unstressed_extrasplanchnic: dynamics(-132.5, 20.0, 5.0),
                unstressed_active_muscle: dynamics(-35.0, 20.0, 5.0),
                unstressed_resting_muscle: dynamics(-23.3, 20.0, 5.0),
                elastance_left: dynamics(0.475, 8.0, 2.0),
                elastance_right: dynamics(0.282, 8.0, 2.0),
                period_sympathetic: dynamics(-0.13, 2.0, 2.0),
                period_vagal: dynamics(0.09, 1.5, 0.2),
                heart_period_min_s: 0.24,
                heart_period_max_s: 2.0,
            },
            autoregulation: AutoregulationParameters {
                o2_time_constant_s: 10.0,
                co2_time_constant_s: 20.0,
                brain: LocalRegulation {
                    o2_gain: 140.0,
                    co2_gain_per_mmHg: 0.04,
                    normal_venous_o2: 0.133,
                },
                coronary: LocalRegulation {
                    o2_gain: 420.0,
                    co2_gain_per_mmHg: 0.02,
                    normal_venous_o2: 0.100,
                },
                active_muscle: LocalRegulation {
                    o2_gain: 490.0,
                    co2_gain_per_mmHg: 0.02,
                    normal_venous_o2: 0.149,
                },
                resting_muscle: LocalRegulation {
                    o2_gain: 490.0,
                    co2_gain_per_mmHg: 0.02,
                    normal_venous_o2: 0.149,
                },
            },
            // Albanese 2016
            respiratory: RespiratoryControlParameters {
                peripheral_amplitude: RespiratoryBranch { gain: 1.31, time_constant_s: 83.0 },
                peripheral_rate: RespiratoryBranch { gain: 0.8735, time_constant_s: 147.78 },
                peripheral_delay_s: 7.0,
                central_amplitude: RespiratoryBranch { gain: 0.85, time_constant_s: 105.0 },
                central_rate: RespiratoryBranch { gain: 0.9, time_constant_s: 400.0 },
                central_delay_s: 8.0,
                rate_min_bpm: 4.0,
                rate_max_bpm: 60.0,
                muscle_pressure_ceiling_cmH2O: -0.5,
                nominal_tidal_volume_L: 0.5,
            },
        }
    }
}

const fn dynamics(gain: f64, time_constant_s: f64, delay_s: f64) -> EffectorDynamics {
    EffectorDynamics {
        gain,
        time_constant_s,
        delay_s,
    }
}

impl Default for ExerciseParameters {
    fn default() -> Self {
        // Magosso & Ursino 2002
        Self {
            metabolic_vasodilation: MetabolicVasodilationParameters {
                response_min: -1.87,
                response_max: 20.0,
                intensity_centre: 0.4266,
                intensity_slope: 0.18,
                delay_s: 4.0,
                time_constant_s: 10.0,
            },
            muscle_demand: MuscleDemandParameters {
                gain: 40.0,
                time_constant_s: 40.0,
            },
            ventilation: ExerciseVentilationParameters {
                linear_L_per_min: 33.0,
                quadratic_L_per_min: 61.0,
                nominal_ventilation_L_per_min: 6.0,
                fast_fraction: 0.45,
                slow_time_constant_s: 60.0,
                delay_s: 2.5,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let mut v = Validator::default();
        ControlParameters::default().validate(&mut v);
        ExerciseParameters::default().validate(&mut v);
        assert!(v.finish().is_ok());
    }

    #[test]
    fn test_only_four_beds_autoregulate() {
        let a = ControlParameters::default().autoregulation;
        assert!(a.bed(Bed::Splanchnic).is_none());
        assert!(a.bed(Bed::Extrasplanchnic).is_none());
        assert_eq!(AutoregulationParameters::REGULATED.len(), 4);
        for bed in AutoregulationParameters::REGULATED {
            assert!(a.bed(bed).is_some(), "{:?} should be regulated", bed);
        }
    }

    #[test]
    fn test_inverted_heart_period_bounds_rejected() {
        let mut params = ControlParameters::default();
        params.effectors.heart_period_min_s = 3.0;
        let mut v = Validator::default();
        params.validate(&mut v);
        assert!(v.finish().is_err());
    }
}
