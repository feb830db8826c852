//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod jwt_claim_resolver;
mod static_endpoint_resolver;

pub use jwt_claim_resolver::JwtClaimResolver;
pub use static_endpoint_resolver::StaticEndpointResolver;
