//! Port for telemetry record persistence
//!
//! The store is an append-only sink. Each write reports whether the record
//! landed; connectivity problems surface as `Err` and are absorbed by the
//! capture pipeline.

use async_trait::async_trait;
use domain::{ErrorRecord, RequestRecord, ResponseRecord};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for telemetry record storage
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TelemetryStorePort: Send + Sync {
    /// Append an error record
    ///
    /// # Returns
    /// Rows written; `1` on success
    async fn add_error(&self, record: &ErrorRecord) -> Result<u64, ApplicationError>;

    /// Append a request record
    async fn add_request(&self, record: &RequestRecord) -> Result<bool, ApplicationError>;

    /// Append a response record
    async fn add_response(&self, record: &ResponseRecord) -> Result<bool, ApplicationError>;
}
