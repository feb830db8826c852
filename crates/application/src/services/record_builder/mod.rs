//! Fluent enrichment of telemetry records
//!
//! Each builder owns the record it is filling in and borrows the call it is
//! describing. Every `with_*` method takes an `Option`: `Some` sets the value
//! verbatim, `None` derives it from the call context, the captured fault or
//! the claim resolver. Builders are consumed by [`build`](ErrorRecordBuilder::build).

mod error;
mod request;
mod response;

pub use error::{ErrorRecordBuilder, FULL_TRACE_SEPARATOR, status_name};
pub use request::RequestRecordBuilder;
pub use response::ResponseRecordBuilder;

use crate::error::ApplicationError;

fn missing_claim_resolver() -> ApplicationError {
    ApplicationError::Configuration("claim resolver must be set".to_string())
}
