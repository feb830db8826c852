//! HTTP plumbing for remote calls
//!
//! Maps reqwest failures onto [`TransportFault`](domain::TransportFault) and
//! provides a client that calls resolved endpoints with request correlation.

mod fault_mapping;
mod service_client;

pub use fault_mapping::{FaultSource, fault_from_reqwest, fault_from_status};
pub use service_client::{ServiceCallError, ServiceClient, ServiceClientConfig, X_REQUEST_ID};
