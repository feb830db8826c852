//! Static endpoint table for service resolution.

use domain::{DomainError, ServiceUri};
use serde::{Deserialize, Serialize};

/// Concrete addresses behind one service
///
/// ```toml
/// [[endpoints]]
/// service = "fabric://Billing/InvoiceService"
/// addresses = ["http://10.0.0.1:8080", "http://10.0.0.2:8080"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// `fabric://{application}/{service}` address
    pub service: String,

    /// Base URLs, tried in order
    #[serde(default)]
    pub addresses: Vec<String>,
}

impl EndpointConfig {
    /// Parsed service address
    pub fn service_uri(&self) -> Result<ServiceUri, DomainError> {
        ServiceUri::parse(&self.service)
    }
}
