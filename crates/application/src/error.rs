//! Application-level errors

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Missing or inconsistent wiring, e.g. a required collaborator was not set
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The telemetry store could not be reached or rejected a write
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// The surrounding call was cancelled
    #[error("Operation cancelled")]
    Cancelled,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
