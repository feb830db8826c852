//! Application layer - Use cases and orchestration
//!
//! Fault classification, record enrichment and the capture pipeline, plus the
//! ports they use to reach the store, the identity layer and endpoint
//! resolution. Adapters live in the infrastructure crate.

pub mod application_info;
pub mod call_context;
pub mod error;
pub mod ports;
pub mod services;

pub use application_info::ApplicationInfo;
pub use call_context::{CallContext, RequestBody};
pub use error::ApplicationError;
pub use ports::*;
pub use services::*;
