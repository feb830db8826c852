//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Service URI is malformed or has blank segments
    #[error("Invalid service uri: {0}")]
    InvalidServiceUri(String),

    /// Header filter configuration is contradictory
    #[error("Invalid header filter: {0}")]
    InvalidHeaderFilter(String),

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_service_uri_message() {
        let err = DomainError::InvalidServiceUri("fabric://".to_string());
        assert_eq!(err.to_string(), "Invalid service uri: fabric://");
    }

    #[test]
    fn invalid_header_filter_message() {
        let err = DomainError::InvalidHeaderFilter("both lists set".to_string());
        assert_eq!(err.to_string(), "Invalid header filter: both lists set");
    }

    #[test]
    fn validation_error_message() {
        let err = DomainError::ValidationError("field is required".to_string());
        assert_eq!(err.to_string(), "Validation failed: field is required");
    }
}
