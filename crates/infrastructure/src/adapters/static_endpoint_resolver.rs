//! Endpoint resolver backed by a fixed address table

use std::collections::HashMap;

use application::{
    error::ApplicationError,
    ports::{EndpointResolverPort, ResolvedEndpoint},
};
use async_trait::async_trait;
use domain::{DomainError, ServiceUri};
use parking_lot::Mutex;
use tracing::{debug, instrument};

use crate::config::EndpointConfig;

/// Resolves services to configured addresses, rotating on re-resolution
///
/// The first resolution of a service hands out its current address. When
/// the caller passes back the endpoint that just failed, the resolver moves
/// on to the next address, wrapping around at the end of the list.
#[derive(Debug, Default)]
pub struct StaticEndpointResolver {
    services: HashMap<ServiceUri, Vec<String>>,
    cursors: Mutex<HashMap<ServiceUri, usize>>,
}

impl StaticEndpointResolver {
    /// Create an empty resolver
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the addresses of a service
    #[must_use]
    pub fn with_service<I, S>(mut self, service: ServiceUri, addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.services
            .insert(service, addresses.into_iter().map(Into::into).collect());
        self
    }

    /// Build from the `[[endpoints]]` configuration table
    pub fn from_config(endpoints: &[EndpointConfig]) -> Result<Self, DomainError> {
        endpoints.iter().try_fold(Self::new(), |resolver, endpoint| {
            Ok(resolver.with_service(endpoint.service_uri()?, endpoint.addresses.iter().cloned()))
        })
    }

    /// Number of registered services
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Whether no service is registered
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

#[async_trait]
impl EndpointResolverPort for StaticEndpointResolver {
    #[instrument(skip(self, previous), fields(service = %service))]
    async fn resolve(
        &self,
        service: &ServiceUri,
        previous: Option<&ResolvedEndpoint>,
    ) -> Result<ResolvedEndpoint, ApplicationError> {
        let addresses = self
            .services
            .get(service)
            .filter(|addresses| !addresses.is_empty())
            .ok_or_else(|| {
                ApplicationError::Configuration(format!("no endpoints configured for {service}"))
            })?;

        let mut cursors = self.cursors.lock();
        let cursor = cursors.entry(service.clone()).or_insert(0);

        // A stale failure report does not rotate again
        if let Some(previous) = previous.filter(|p| &p.service == service)
            && addresses.get(*cursor) == Some(&previous.address)
        {
            *cursor = (*cursor + 1) % addresses.len();
        }

        let address = addresses.get(*cursor).cloned().ok_or_else(|| {
            ApplicationError::Internal(format!("endpoint cursor out of range for {service}"))
        })?;
        let generation = previous.map_or(0, |p| p.generation + 1);

        debug!(address = %address, generation, "Resolved endpoint");
        Ok(ResolvedEndpoint {
            service: service.clone(),
            address,
            generation,
        })
    }
}
