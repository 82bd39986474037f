//! Rule-registry error types.

use dw_foundation::FoundationError;
use thiserror::Error;

/// Errors that can occur while loading restriction data.
#[derive(Error, Debug)]
pub enum RulesError {
    /// Restriction file could not be parsed
    #[error("Malformed restrictions file {path}: {message}")]
    MalformedFile { path: String, message: String },

    /// Unknown operator in a rule definition
    #[error("Unknown rule operator: {operator}")]
    UnknownOperator { operator: String },

    /// Foundation error (covers IO, JSON, etc.)
    #[error(transparent)]
    Foundation(#[from] FoundationError),
}

impl From<std::io::Error> for RulesError {
    fn from(err: std::io::Error) -> Self {
        RulesError::Foundation(FoundationError::Io(err))
    }
}

impl From<serde_json::Error> for RulesError {
    fn from(err: serde_json::Error) -> Self {
        RulesError::Foundation(FoundationError::Serialization(err))
    }
}

/// Result type for rule operations
pub type Result<T> = std::result::Result<T, RulesError>;
