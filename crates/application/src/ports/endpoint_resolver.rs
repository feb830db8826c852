//! Port for resolving a logical service address to a concrete endpoint

use async_trait::async_trait;
use domain::ServiceUri;
use serde::{Deserialize, Serialize};

use crate::error::ApplicationError;

/// A concrete endpoint for a service, as handed out by a resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedEndpoint {
    /// Logical service this endpoint belongs to
    pub service: ServiceUri,
    /// Base address, e.g. `http://10.0.0.4:8080`
    pub address: String,
    /// Incremented on each re-resolution of the same service
    pub generation: u64,
}

/// Port for endpoint resolution
///
/// Passing the endpoint that just failed as `previous` asks the resolver
/// for a different one where it can offer one.
#[async_trait]
pub trait EndpointResolverPort: Send + Sync {
    async fn resolve(
        &self,
        service: &ServiceUri,
        previous: Option<&ResolvedEndpoint>,
    ) -> Result<ResolvedEndpoint, ApplicationError>;
}
