// src/error.rs
use std::fmt;

/// Broad class of a [`SdeError`], for callers that only care about the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected before anything was allocated or simulated.
    Configuration,
    /// A table of the requested shape could not be allocated.
    Resource,
    /// A simulated value left the domain of valid prices.
    NumericAnomaly,
}

/// Error type for the gbm-mc library
#[derive(Debug, Clone)]
pub enum SdeError {
    /// Invalid parameter values
    InvalidParameters {
        parameter: String,
        value: f64,
        constraint: String,
    },

    /// Invalid configuration (counts, shapes, engine knobs)
    InvalidConfiguration { field: String, reason: String },

    /// Allocation of a `rows x cols` table failed or its size overflows
    ResourceExhausted {
        what: String,
        rows: usize,
        cols: usize,
    },

    /// A price became non-positive or non-finite during the simulation
    NumericalAnomaly {
        stage: String,
        path: usize,
        step: usize,
        value: f64,
    },
}

impl SdeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SdeError::InvalidParameters { .. } | SdeError::InvalidConfiguration { .. } => {
                ErrorKind::Configuration
            }
            SdeError::ResourceExhausted { .. } => ErrorKind::Resource,
            SdeError::NumericalAnomaly { .. } => ErrorKind::NumericAnomaly,
        }
    }

    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }
}

impl fmt::Display for SdeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SdeError::InvalidParameters {
                parameter,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid parameter '{}' = {}: {}",
                    parameter, value, constraint
                )
            }
            SdeError::InvalidConfiguration { field, reason } => {
                write!(f, "Invalid configuration for '{}': {}", field, reason)
            }
            SdeError::ResourceExhausted { what, rows, cols } => {
                write!(
                    f,
                    "Cannot allocate {} of shape {} x {}",
                    what, rows, cols
                )
            }
            SdeError::NumericalAnomaly {
                stage,
                path,
                step,
                value,
            } => {
                write!(
                    f,
                    "Numerical anomaly in {} at path {}, step {}: value {} is not a positive finite price",
                    stage, path, step, value
                )
            }
        }
    }
}

impl std::error::Error for SdeError {}

/// Result type alias for gbm-mc operations
pub type SdeResult<T> = Result<T, SdeError>;

/// Validation utilities
pub mod validation {
    use super::{SdeError, SdeResult};

    /// Largest accepted path count.
    pub const MAX_PATHS: usize = 1_000_000_000;

    /// Largest accepted step count.
    pub const MAX_STEPS: usize = 100_000;

    /// Validate that a parameter is finite and positive
    pub fn validate_positive(name: &str, value: f64) -> SdeResult<()> {
        validate_finite(name, value)?;
        if value <= 0.0 {
            Err(SdeError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be positive (> 0)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a parameter is finite and non-negative
    pub fn validate_non_negative(name: &str, value: f64) -> SdeResult<()> {
        validate_finite(name, value)?;
        if value < 0.0 {
            Err(SdeError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be non-negative (≥ 0)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a value is finite and not NaN
    pub fn validate_finite(name: &str, value: f64) -> SdeResult<()> {
        if !value.is_finite() {
            Err(SdeError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be finite (not NaN or infinite)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate paths count
    pub fn validate_paths(paths: usize) -> SdeResult<()> {
        if paths == 0 {
            Err(SdeError::InvalidConfiguration {
                field: "paths".to_string(),
                reason: "must be greater than 0".to_string(),
            })
        } else if paths > MAX_PATHS {
            Err(SdeError::InvalidConfiguration {
                field: "paths".to_string(),
                reason: "exceeds maximum allowed (1 billion)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate steps count
    pub fn validate_steps(steps: usize) -> SdeResult<()> {
        if steps == 0 {
            Err(SdeError::InvalidConfiguration {
                field: "steps".to_string(),
                reason: "must be greater than 0".to_string(),
            })
        } else if steps > MAX_STEPS {
            Err(SdeError::InvalidConfiguration {
                field: "steps".to_string(),
                reason: "exceeds maximum allowed (100,000)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate a count that only has to be non-zero
    pub fn validate_non_zero(field: &str, value: usize) -> SdeResult<()> {
        if value == 0 {
            Err(SdeError::InvalidConfiguration {
                field: field.to_string(),
                reason: "must be greater than 0".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a table has the expected shape
    pub fn validate_shape(
        field: &str,
        actual: (usize, usize),
        expected: (usize, usize),
    ) -> SdeResult<()> {
        if actual != expected {
            Err(SdeError::InvalidConfiguration {
                field: field.to_string(),
                reason: format!(
                    "shape {} x {} does not match expected {} x {}",
                    actual.0, actual.1, expected.0, expected.1
                ),
            })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::validation::*;
    use super::*;

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive("s0", 100.0).is_ok());
        assert!(validate_positive("s0", 0.0).is_err());
        assert!(validate_positive("s0", -0.1).is_err());
        assert!(validate_positive("s0", f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_non_negative() {
        assert!(validate_non_negative("sigma", 0.0).is_ok());
        assert!(validate_non_negative("sigma", 0.2).is_ok());
        assert!(validate_non_negative("sigma", -1e-12).is_err());
        assert!(validate_non_negative("sigma", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_finite() {
        assert!(validate_finite("value", 1.0).is_ok());
        assert!(validate_finite("value", f64::NAN).is_err());
        assert!(validate_finite("value", f64::INFINITY).is_err());
        assert!(validate_finite("value", f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_validate_counts() {
        assert!(validate_paths(1).is_ok());
        assert!(validate_paths(0).is_err());
        assert!(validate_paths(MAX_PATHS + 1).is_err());
        assert!(validate_steps(252).is_ok());
        assert!(validate_steps(0).is_err());
        assert!(validate_steps(MAX_STEPS + 1).is_err());
    }

    #[test]
    fn test_validate_shape() {
        assert!(validate_shape("innovations", (10, 5), (10, 5)).is_ok());
        let err = validate_shape("innovations", (10, 4), (10, 5)).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("10 x 4"));
    }

    #[test]
    fn test_error_display() {
        let error = SdeError::InvalidParameters {
            parameter: "sigma".to_string(),
            value: -0.1,
            constraint: "must be non-negative".to_string(),
        };

        let display = format!("{}", error);
        assert!(display.contains("sigma"));
        assert!(display.contains("-0.1"));
        assert!(display.contains("non-negative"));
    }

    #[test]
    fn test_error_kinds() {
        let resource = SdeError::ResourceExhausted {
            what: "path tensor".to_string(),
            rows: usize::MAX,
            cols: 2,
        };
        assert_eq!(resource.kind(), ErrorKind::Resource);
        assert!(resource.to_string().contains("path tensor"));

        let anomaly = SdeError::NumericalAnomaly {
            stage: "path propagation".to_string(),
            path: 3,
            step: 7,
            value: f64::INFINITY,
        };
        assert_eq!(anomaly.kind(), ErrorKind::NumericAnomaly);
        assert!(anomaly.to_string().contains("path 3, step 7"));
        assert!(!anomaly.is_configuration());
    }
}
