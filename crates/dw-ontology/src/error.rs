//! Ontology error types.

use dw_foundation::FoundationError;
use thiserror::Error;

/// Errors that can occur while loading or persisting ontology data.
#[derive(Error, Debug)]
pub enum OntologyError {
    /// Ontology file could not be parsed
    #[error("Malformed ontology file {path}: {message}")]
    MalformedFile { path: String, message: String },

    /// Duplicate ingredient id across static and dynamic corpus
    #[error("Duplicate ingredient id: {id}")]
    DuplicateId { id: String },

    /// Foundation error (covers IO, JSON, etc.)
    #[error(transparent)]
    Foundation(#[from] FoundationError),
}

impl From<std::io::Error> for OntologyError {
    fn from(err: std::io::Error) -> Self {
        OntologyError::Foundation(FoundationError::Io(err))
    }
}

impl From<serde_json::Error> for OntologyError {
    fn from(err: serde_json::Error) -> Self {
        OntologyError::Foundation(FoundationError::Serialization(err))
    }
}

/// Result type for ontology operations
pub type Result<T> = std::result::Result<T, OntologyError>;
