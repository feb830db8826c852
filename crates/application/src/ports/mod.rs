//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod claim_resolver;
mod endpoint_resolver;
mod telemetry_store;

pub use claim_resolver::ClaimResolver;
#[cfg(test)]
pub use claim_resolver::MockClaimResolver;
pub use endpoint_resolver::{EndpointResolverPort, ResolvedEndpoint};
pub use telemetry_store::TelemetryStorePort;
#[cfg(test)]
pub use telemetry_store::MockTelemetryStorePort;
