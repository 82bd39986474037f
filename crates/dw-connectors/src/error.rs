//! Connector error types.

use thiserror::Error;

/// Errors from external food-database lookups.
///
/// These never escape the fetcher boundary as failures; they are folded
/// into a low-confidence [`crate::EnrichmentResult`].
#[derive(Error, Debug)]
pub enum ConnectorError {
    /// Transport-level failure after all retries
    #[error("HTTP request failed after {attempts} attempts: {message}")]
    Transport { attempts: u32, message: String },

    /// Server returned a non-success status
    #[error("Server returned status {status}")]
    Status { status: u16 },

    /// Response body could not be parsed
    #[error("Unparsable response: {0}")]
    Parse(String),
}

/// Result type for connector operations
pub type Result<T> = std::result::Result<T, ConnectorError>;
