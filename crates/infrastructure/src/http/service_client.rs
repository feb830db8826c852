//! HTTP client for calls to resolved service endpoints
//!
//! Wraps `reqwest::Client`: joins paths onto a [`ResolvedEndpoint`],
//! propagates the captured request's id as `X-Request-Id`, and turns error
//! statuses into a [`ServiceCallError`] carrying any error payload the
//! remote sent back.
//!
//! # Examples
//!
//! ```ignore
//! use infrastructure::http::ServiceClient;
//!
//! let client = ServiceClient::new()?;
//! let response = client
//!     .send(client.get(&endpoint, "/invoices/42"), Some(request_id))
//!     .await?;
//! ```

use std::time::Duration;

use application::ports::ResolvedEndpoint;
use domain::{RecordId, RemoteErrorPayload, TransportFault};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use tracing::{debug, instrument};

use super::fault_mapping::{FaultSource, fault_from_reqwest};

/// Header name for request correlation ID
pub const X_REQUEST_ID: &str = "x-request-id";

/// Configuration for the service client
#[derive(Debug, Clone)]
pub struct ServiceClientConfig {
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Default for ServiceClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(30),
            user_agent: format!("faultline/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ServiceClientConfig {
    /// Create a new configuration with custom timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Create a new configuration with custom connect timeout
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

/// Failure of a call made through [`ServiceClient`]
#[derive(Debug, thiserror::Error)]
pub enum ServiceCallError {
    /// The request never produced a response
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The remote answered with an error status
    #[error("remote returned HTTP {status}")]
    Status {
        status: StatusCode,
        remote: Option<RemoteErrorPayload>,
    },
}

impl ServiceCallError {
    /// Status code of the remote's answer, if there was one
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Transport(err) => err.status(),
            Self::Status { status, .. } => Some(*status),
        }
    }

    /// Error payload the remote sent, if it could be parsed
    pub const fn remote_error(&self) -> Option<&RemoteErrorPayload> {
        match self {
            Self::Transport(_) => None,
            Self::Status { remote, .. } => remote.as_ref(),
        }
    }
}

impl FaultSource for ServiceCallError {
    fn transport_fault(&self) -> TransportFault {
        match self {
            Self::Transport(err) => fault_from_reqwest(err),
            Self::Status { status, .. } => TransportFault::RemoteProtocolError {
                status_code: status.as_u16(),
            },
        }
    }
}

/// HTTP client for resolved service endpoints
#[derive(Debug, Clone)]
pub struct ServiceClient {
    inner: Client,
    config: ServiceClientConfig,
}

impl ServiceClient {
    /// Create a new client with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client cannot be built.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_config(ServiceClientConfig::default())
    }

    /// Create a new client with custom configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client cannot be built.
    pub fn with_config(config: ServiceClientConfig) -> Result<Self, reqwest::Error> {
        let inner = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self { inner, config })
    }

    /// Get the configuration
    #[must_use]
    pub const fn config(&self) -> &ServiceClientConfig {
        &self.config
    }

    /// Start a request against a path on the endpoint
    pub fn request(
        &self,
        method: Method,
        endpoint: &ResolvedEndpoint,
        path: &str,
    ) -> RequestBuilder {
        self.inner.request(method, join(&endpoint.address, path))
    }

    /// Start a GET request
    pub fn get(&self, endpoint: &ResolvedEndpoint, path: &str) -> RequestBuilder {
        self.request(Method::GET, endpoint, path)
    }

    /// Start a POST request
    pub fn post(&self, endpoint: &ResolvedEndpoint, path: &str) -> RequestBuilder {
        self.request(Method::POST, endpoint, path)
    }

    /// Send a request, treating 4xx and 5xx answers as failures
    ///
    /// A non-empty `request_id` is sent as `X-Request-Id`.
    #[instrument(skip(self, builder), fields(request_id = ?request_id))]
    pub async fn send(
        &self,
        builder: RequestBuilder,
        request_id: Option<RecordId>,
    ) -> Result<Response, ServiceCallError> {
        let builder = match request_id.and_then(RecordId::non_empty) {
            Some(id) => builder.header(X_REQUEST_ID, id.to_string()),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status();
        if !(status.is_client_error() || status.is_server_error()) {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let remote = RemoteErrorPayload::parse(&body);
        debug!(status = %status, has_payload = remote.is_some(), "Remote returned error status");
        Err(ServiceCallError::Status { status, remote })
    }
}

fn join(address: &str, path: &str) -> String {
    format!(
        "{}/{}",
        address.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_handles_slashes() {
        assert_eq!(join("http://a:80/", "/x"), "http://a:80/x");
        assert_eq!(join("http://a:80", "x/y"), "http://a:80/x/y");
        assert_eq!(join("http://a:80", ""), "http://a:80/");
    }

    #[test]
    fn default_config() {
        let config = ServiceClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("faultline/"));
    }

    #[test]
    fn status_error_maps_to_remote_protocol_error() {
        let err = ServiceCallError::Status {
            status: StatusCode::NOT_FOUND,
            remote: None,
        };
        assert_eq!(
            err.transport_fault(),
            TransportFault::RemoteProtocolError { status_code: 404 }
        );
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert!(err.remote_error().is_none());
    }
}
