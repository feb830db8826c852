//! Logical address of a remote service
//!
//! # Examples
//!
//! ```
//! use domain::ServiceUri;
//!
//! let uri = ServiceUri::new("Billing", "InvoiceService").unwrap();
//! assert_eq!(uri.to_string(), "fabric://Billing/InvoiceService");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

const SCHEME: &str = "fabric://";

/// `fabric://{application}/{service}` address resolved to concrete endpoints
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServiceUri {
    application: String,
    service: String,
}

impl ServiceUri {
    /// Create a service address from its application and service names
    pub fn new(
        application: impl Into<String>,
        service: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let application = application.into();
        let service = service.into();

        for part in [&application, &service] {
            if part.trim().is_empty() || part.contains('/') {
                return Err(DomainError::InvalidServiceUri(format!(
                    "'{part}' is not a valid path segment"
                )));
            }
        }

        Ok(Self {
            application,
            service,
        })
    }

    /// Parse `fabric://{application}/{service}`
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let rest = s
            .strip_prefix(SCHEME)
            .ok_or_else(|| DomainError::InvalidServiceUri(format!("missing scheme: {s}")))?;
        let (application, service) = rest
            .split_once('/')
            .ok_or_else(|| DomainError::InvalidServiceUri(format!("missing service: {s}")))?;
        Self::new(application, service)
    }

    /// Application name
    pub fn application(&self) -> &str {
        &self.application
    }

    /// Service name
    pub fn service(&self) -> &str {
        &self.service
    }
}

impl fmt::Display for ServiceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SCHEME}{}/{}", self.application, self.service)
    }
}

impl TryFrom<String> for ServiceUri {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ServiceUri> for String {
    fn from(uri: ServiceUri) -> Self {
        uri.to_string()
    }
}
