//! Error types and handling
//!
//! This module contains the error type shared by every simulation operation.
//! Faults are surfaced to the caller; nothing is retried.

use crate::types::ConfigValidationError;
use thiserror::Error;

/// Errors that can occur during simulation
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ConfigurationError(String),

    /// An internal consistency check failed; the run cannot continue
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// A random distribution could not be built or sampled
    #[error("Sampling error: {0}")]
    SamplingError(String),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<ConfigValidationError> for SimulationError {
    fn from(error: ConfigValidationError) -> Self {
        SimulationError::ConfigurationError(error.to_string())
    }
}

impl SimulationError {
    /// Create a configuration error
    pub fn configuration_error(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    /// Create an invariant violation error
    pub fn invariant_violation(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    /// Create a sampling error
    pub fn sampling_error(msg: impl Into<String>) -> Self {
        Self::SamplingError(msg.into())
    }

    /// Check if this is a recoverable error
    ///
    /// Only output errors are recoverable: the simulation result itself is intact.
    pub fn is_recoverable(&self) -> bool {
        match self {
            SimulationError::ConfigurationError(_) => false,
            SimulationError::InvariantViolation(_) => false,
            SimulationError::SamplingError(_) => false,
            SimulationError::IoError(_) => true,
            SimulationError::SerializationError(_) => true,
        }
    }

    /// Get the error category
    pub fn category(&self) -> &'static str {
        match self {
            SimulationError::ConfigurationError(_) => "Configuration",
            SimulationError::InvariantViolation(_) => "Invariant",
            SimulationError::SamplingError(_) => "Sampling",
            SimulationError::IoError(_) => "IO",
            SimulationError::SerializationError(_) => "Serialization",
        }
    }
}

/// Result type for simulation operations
pub type SimulationResult<T> = Result<T, SimulationError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_creation() {
        let config_error = SimulationError::configuration_error("Invalid config");
        assert!(matches!(config_error, SimulationError::ConfigurationError(_)));
        assert_eq!(config_error.to_string(), "Configuration validation failed: Invalid config");

        let invariant = SimulationError::invariant_violation("double release");
        assert_eq!(invariant.to_string(), "Invariant violation: double release");
    }

    #[test]
    fn test_error_from_validation_error() {
        let error: SimulationError = ConfigValidationError::InvalidMaxPatients(0).into();
        assert!(matches!(error, SimulationError::ConfigurationError(_)));
        assert!(error.to_string().contains("Maximum patients"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let sim_error: SimulationError = io_error.into();
        assert!(matches!(sim_error, SimulationError::IoError(_)));
        assert!(sim_error.is_recoverable());
    }

    #[test]
    fn test_error_recoverability() {
        assert!(!SimulationError::configuration_error("x").is_recoverable());
        assert!(!SimulationError::invariant_violation("x").is_recoverable());
        assert!(!SimulationError::sampling_error("x").is_recoverable());
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(SimulationError::configuration_error("x").category(), "Configuration");
        assert_eq!(SimulationError::invariant_violation("x").category(), "Invariant");
        assert_eq!(SimulationError::sampling_error("x").category(), "Sampling");
    }
}
