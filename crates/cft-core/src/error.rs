//! Unified error types for the cft ecosystem
//!
//! This module provides a common error type [`CftError`] that can represent
//! errors from any part of the system. Domain-specific failures are converted
//! to `CftError` at API boundaries so callers handle them uniformly.

use thiserror::Error;

/// Unified error type for all cft operations.
///
/// Scenario parsing, validation, the MILP back-end and the CLI all report
/// through this enum. Per-coalition infeasibility is *not* an error (it is
/// recorded in the coalition table); only failures that terminate a run
/// surface here.
#[derive(Error, Debug)]
pub enum CftError {
    /// I/O errors (file access, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Scenario-file parsing errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Scenario/data validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Optimization back-end errors
    #[error("Solver error: {0}")]
    Solver(String),

    /// Configuration errors (CLI flags, option values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Results using CftError.
pub type CftResult<T> = Result<T, CftError>;

// Conversion from anyhow::Error
impl From<anyhow::Error> for CftError {
    fn from(err: anyhow::Error) -> Self {
        CftError::Other(err.to_string())
    }
}

impl From<String> for CftError {
    fn from(s: String) -> Self {
        CftError::Other(s)
    }
}

impl From<&str> for CftError {
    fn from(s: &str) -> Self {
        CftError::Other(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CftError::Solver("back-end rejected the model".into());
        assert!(err.to_string().contains("Solver error"));
        assert!(err.to_string().contains("back-end rejected the model"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: CftError = io_err.into();
        assert!(matches!(err, CftError::Io(_)));
    }

    #[test]
    fn test_question_mark_operator() {
        fn inner() -> CftResult<()> {
            Err(CftError::Validation("test".into()))
        }

        fn outer() -> CftResult<()> {
            inner()?;
            Ok(())
        }

        assert!(outer().is_err());
    }
}
