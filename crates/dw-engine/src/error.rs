//! Engine error types.
//!
//! These surface only at init (loading data files); `evaluate` itself
//! never fails, partial failures are encoded in the verdict.

use dw_foundation::FoundationError;
use thiserror::Error;

/// Errors that can occur while assembling the engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Ontology load error
    #[error(transparent)]
    Ontology(#[from] dw_ontology::OntologyError),

    /// Restriction load error
    #[error(transparent)]
    Rules(#[from] dw_rules::RulesError),

    /// Foundation error (covers IO, JSON, etc.)
    #[error(transparent)]
    Foundation(#[from] FoundationError),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
