//! Range checks shared by every parameter group.

use crate::error::ConfigError;

/// Records the first invalid parameter encountered.
#[derive(Debug, Default)]
pub struct Validator {
    first_error: Option<ConfigError>,
}

impl Validator {
    pub fn reject(&mut self, name: &str, value: f64, reason: &'static str) {
        if self.first_error.is_none() {
            self.first_error = Some(ConfigError::InvalidParameter {
                name: name.to_string(),
                value,
                reason,
            });
        }
    }

    pub fn finite(&mut self, name: &str, value: f64) {
        if !value.is_finite() {
            self.reject(name, value, "must be finite");
        }
    }

    pub fn positive(&mut self, name: &str, value: f64) {
        if !(value.is_finite() && value > 0.0) {
            self.reject(name, value, "must be positive and finite");
        }
    }

    pub fn non_negative(&mut self, name: &str, value: f64) {
        if !(value.is_finite() && value >= 0.0) {
            self.reject(name, value, "must be non-negative and finite");
        }
    }

    pub fn in_range(&mut self, name: &str, value: f64, min: f64, max: f64) {
        if !(value.is_finite() && value >= min && value <= max) {
            self.reject(name, value, "out of range");
        }
    }

    pub fn finish(self) -> Result<(), ConfigError> {
        match self.first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_error_is_kept() {
        let mut v = Validator::default();
        v.positive("a", 1.0);
        v.positive("b", 0.0);
        v.finite("c", f64::NAN);
        let err = v.finish().unwrap_err();
        assert!(err.to_string().contains("parameter b"));
    }

    #[test]
    fn test_nan_is_never_positive() {
        let mut v = Validator::default();
        v.positive("x", f64::NAN);
        assert!(v.finish().is_err());
    }
}
