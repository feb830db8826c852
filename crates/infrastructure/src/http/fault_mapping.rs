//! Mapping of HTTP client failures onto the transport fault taxonomy

use std::{error::Error as StdError, io};

use domain::{RemoteFailureStatus, TransportFault};
use reqwest::StatusCode;

/// An error that can describe itself as a [`TransportFault`]
///
/// Implemented for the error types remote calls commonly fail with, so the
/// retry loop can classify them.
pub trait FaultSource {
    fn transport_fault(&self) -> TransportFault;
}

impl FaultSource for TransportFault {
    fn transport_fault(&self) -> TransportFault {
        self.clone()
    }
}

impl FaultSource for io::Error {
    fn transport_fault(&self) -> TransportFault {
        TransportFault::from(self)
    }
}

impl FaultSource for reqwest::Error {
    fn transport_fault(&self) -> TransportFault {
        fault_from_reqwest(self)
    }
}

/// `RemoteProtocolError` for 4xx and 5xx statuses, `None` otherwise
pub fn fault_from_status(status: StatusCode) -> Option<TransportFault> {
    if status.is_client_error() || status.is_server_error() {
        Some(TransportFault::RemoteProtocolError {
            status_code: status.as_u16(),
        })
    } else {
        None
    }
}

/// Classify a reqwest failure
///
/// Checked in order: timeout, error status, connect failure, an I/O error
/// anywhere in the source chain, body or decode failure, request failure.
pub fn fault_from_reqwest(err: &reqwest::Error) -> TransportFault {
    if err.is_timeout() {
        return TransportFault::LocalTimeout;
    }

    if let Some(fault) = err.status().and_then(fault_from_status) {
        return fault;
    }

    if err.is_connect() {
        return TransportFault::remote(RemoteFailureStatus::ConnectFailure);
    }

    if let Some(io_err) = io_source(err) {
        return TransportFault::from(io_err);
    }

    if err.is_decode() || err.is_body() {
        return TransportFault::protocol_violation(err.to_string());
    }

    if err.is_request() {
        return TransportFault::remote(RemoteFailureStatus::SendFailure);
    }

    TransportFault::Other {
        message: err.to_string(),
    }
}

fn io_source<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a io::Error> {
    let mut source = err.source();
    while let Some(inner) = source {
        if let Some(io_err) = inner.downcast_ref::<io::Error>() {
            return Some(io_err);
        }
        source = inner.source();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_statuses_map_to_remote_protocol_error() {
        assert_eq!(
            fault_from_status(StatusCode::INTERNAL_SERVER_ERROR),
            Some(TransportFault::RemoteProtocolError { status_code: 500 })
        );
        assert_eq!(
            fault_from_status(StatusCode::NOT_FOUND),
            Some(TransportFault::RemoteProtocolError { status_code: 404 })
        );
    }

    #[test]
    fn success_statuses_are_not_faults() {
        assert_eq!(fault_from_status(StatusCode::OK), None);
        assert_eq!(fault_from_status(StatusCode::NO_CONTENT), None);
        assert_eq!(fault_from_status(StatusCode::MOVED_PERMANENTLY), None);
    }

    #[test]
    fn io_errors_are_fault_sources() {
        let err = io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer");
        assert!(matches!(err.transport_fault(), TransportFault::Socket { .. }));
    }

    #[test]
    fn transport_fault_is_its_own_source() {
        let fault = TransportFault::RemoteProtocolError { status_code: 503 };
        assert_eq!(fault.transport_fault(), fault);
    }

    #[derive(Debug, thiserror::Error)]
    #[error("request failed")]
    struct Wrapped(#[source] io::Error);

    #[test]
    fn io_error_is_found_in_source_chain() {
        let err = Wrapped(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
        let found = io_source(&err).map(io::Error::kind);
        assert_eq!(found, Some(io::ErrorKind::ConnectionReset));
    }

    #[test]
    fn error_without_source_yields_none() {
        assert!(io_source(&io::Error::other("x")).is_none());
    }

    #[tokio::test]
    async fn refused_connection_maps_to_connect_failure() {
        let err = reqwest::get("http://127.0.0.1:1/").await.unwrap_err();
        assert_eq!(
            fault_from_reqwest(&err),
            TransportFault::remote(RemoteFailureStatus::ConnectFailure)
        );
    }

    #[tokio::test]
    async fn invalid_json_maps_to_protocol_violation() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::any())
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = reqwest::get(server.uri())
            .await
            .unwrap()
            .json::<serde_json::Value>()
            .await
            .unwrap_err();

        assert!(matches!(
            fault_from_reqwest(&err),
            TransportFault::ProtocolViolation { .. }
        ));
    }
}
