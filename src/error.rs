//! Error handling for Solidarity
//!
//! Errors are narrow: bad parameters, signals too short for an operation,
//! mismatched buffer lengths, and configuration I/O.

use thiserror::Error;

/// Result type alias for Solidarity operations
pub type Result<T> = std::result::Result<T, SolidarityError>;

/// Main error type for Solidarity operations
#[derive(Error, Debug)]
pub enum SolidarityError {
    // Parameter Errors
    #[error("Invalid parameter: {param} = {value} (expected {expected})")]
    InvalidParameter {
        param: String,
        value: String,
        expected: String,
    },

    // Signal Shape Errors
    #[error("Signal contains no samples")]
    EmptySignal,

    #[error("Signal too short for {operation}: {len} samples (minimum {min})")]
    SignalTooShort {
        operation: &'static str,
        len: usize,
        min: usize,
    },

    #[error("Signal length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    // Dispatch Errors
    #[error("Unknown ZIP phrase: {name}")]
    UnknownPhrase { name: String },

    // Configuration Errors
    #[error("Configuration error: {details}")]
    ConfigError { details: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SolidarityError {
    /// Shorthand for building an `InvalidParameter` error
    pub fn invalid_param(
        param: impl Into<String>,
        value: impl ToString,
        expected: impl Into<String>,
    ) -> Self {
        SolidarityError::InvalidParameter {
            param: param.into(),
            value: value.to_string(),
            expected: expected.into(),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            SolidarityError::InvalidParameter { .. } => "INVALID_PARAMETER",
            SolidarityError::EmptySignal => "EMPTY_SIGNAL",
            SolidarityError::SignalTooShort { .. } => "SIGNAL_TOO_SHORT",
            SolidarityError::LengthMismatch { .. } => "LENGTH_MISMATCH",
            SolidarityError::UnknownPhrase { .. } => "UNKNOWN_PHRASE",
            SolidarityError::ConfigError { .. } => "CONFIG_ERROR",
            SolidarityError::Io(_) => "IO_ERROR",
            SolidarityError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if this error is recoverable
    ///
    /// Configuration problems can fall back to defaults; shape errors
    /// mean the caller handed in the wrong buffers.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SolidarityError::ConfigError { .. }
                | SolidarityError::Io(_)
                | SolidarityError::Serialization(_)
                | SolidarityError::UnknownPhrase { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = SolidarityError::SignalTooShort {
            operation: "harmonic analysis",
            len: 2,
            min: 4,
        };
        assert_eq!(err.error_code(), "SIGNAL_TOO_SHORT");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_invalid_param_message() {
        let err = SolidarityError::invalid_param("ratio", 0.5, "> 0");
        assert_eq!(
            err.to_string(),
            "Invalid parameter: ratio = 0.5 (expected > 0)"
        );
    }

    #[test]
    fn test_config_errors_are_recoverable() {
        let err = SolidarityError::ConfigError {
            details: "missing file".to_string(),
        };
        assert!(err.is_recoverable());
    }
}
