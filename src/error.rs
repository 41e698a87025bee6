//! Error module for the Rusty Neuron library.
use std::error::Error;
use std::fmt;

/// Error types for the library.
/// Every error is raised before the first integration step, so a failed call never yields a partial trajectory.
#[derive(Debug, PartialEq, Clone)]
pub enum SimError {
    /// Error for invalid parameters, e.g., non-positive step size, empty simulation interval or empty stimulus window.
    InvalidParameter(String),
    /// Error for parameters outside the domain of a model, e.g., a non-positive time constant.
    DomainError(String),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SimError::InvalidParameter(e) => write!(f, "Invalid parameter: {}", e),
            SimError::DomainError(e) => write!(f, "Domain error: {}", e),
        }
    }
}

impl Error for SimError {}

/// Check that a time constant is strictly positive and finite.
pub(crate) fn check_time_constant(name: &str, tau: f64) -> Result<(), SimError> {
    if !(tau.is_finite() && tau > 0.0) {
        return Err(SimError::DomainError(format!(
            "the time constant {} must be strictly positive and finite, got {}",
            name, tau
        )));
    }
    Ok(())
}

/// Check that a parameter is finite.
pub(crate) fn check_finite(name: &str, value: f64) -> Result<(), SimError> {
    if !value.is_finite() {
        return Err(SimError::InvalidParameter(format!(
            "{} must be finite, got {}",
            name, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_time_constant() {
        assert_eq!(check_time_constant("tau", 10.0), Ok(()));
        assert!(matches!(
            check_time_constant("tau", 0.0),
            Err(SimError::DomainError(_))
        ));
        assert!(matches!(
            check_time_constant("tau", -1.0),
            Err(SimError::DomainError(_))
        ));
        assert!(matches!(
            check_time_constant("tau", f64::NAN),
            Err(SimError::DomainError(_))
        ));
    }

    #[test]
    fn test_display() {
        let e = SimError::InvalidParameter("dt must be positive".to_string());
        assert_eq!(e.to_string(), "Invalid parameter: dt must be positive");
        let e = SimError::DomainError("tau".to_string());
        assert_eq!(e.to_string(), "Domain error: tau");
    }
}
