//! Error types for configuration loading and simulation runs.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating parameters.
///
/// All of these surface before any simulation state is created.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read parameter file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed JSON, unknown keys, or a missing required key
    /// (serde reports the latter as "missing field `name`").
    #[error("invalid parameter document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("missing required parameter: {0}")]
    MissingParameter(String),

    #[error("parameter {name} = {value} is invalid: {reason}")]
    InvalidParameter {
        name: String,
        value: f64,
        reason: &'static str,
    },

    #[error("time step {dt_s} s is outside the supported range (0, {max_s}]")]
    InvalidTimeStep { dt_s: f64, max_s: f64 },

    #[error("duration {0} s must be positive and finite")]
    InvalidDuration(f64),
}

/// Errors raised by a simulation run.
#[derive(Error, Debug)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("state variable {variable} became non-finite at t = {time_s:.4} s")]
    NonFinite { variable: String, time_s: f64 },

    #[error("unknown time-series column: {0}")]
    UnknownColumn(String),
}

pub type Result<T> = std::result::Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_parameter_message_names_key() {
        let err = ConfigError::MissingParameter("systemic.artery.compliance_mL_per_mmHg".into());
        assert!(err.to_string().contains("systemic.artery.compliance_mL_per_mmHg"));
    }

    #[test]
    fn test_config_error_converts_into_sim_error() {
        let err: SimError = ConfigError::InvalidDuration(-1.0).into();
        assert!(matches!(err, SimError::Config(ConfigError::InvalidDuration(_))));
    }
}
