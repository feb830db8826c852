//! Tagged transport-level failure observed by a remote call

use std::{fmt, io};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse status reported by the transport for a failed remote call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteFailureStatus {
    /// The remote answered with an error status
    ProtocolError,
    /// The remote did not answer in time
    Timeout,
    /// The request was cancelled before completion
    RequestCanceled,
    /// The connection was closed prematurely
    ConnectionClosed,
    /// No connection could be established
    ConnectFailure,
    /// The host name could not be resolved
    NameResolutionFailure,
    /// The request could not be sent
    SendFailure,
}

impl fmt::Display for RemoteFailureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ProtocolError => "protocol_error",
            Self::Timeout => "timeout",
            Self::RequestCanceled => "request_canceled",
            Self::ConnectionClosed => "connection_closed",
            Self::ConnectFailure => "connect_failure",
            Self::NameResolutionFailure => "name_resolution_failure",
            Self::SendFailure => "send_failure",
        };
        write!(f, "{s}")
    }
}

/// Failure of a remote call, as seen by the caller
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "fault", rename_all = "snake_case")]
pub enum TransportFault {
    /// The operation timed out locally
    #[error("operation timed out")]
    LocalTimeout,

    /// Low-level socket or connection failure
    #[error("socket error: {kind}")]
    Socket { kind: String },

    /// Malformed response framing
    #[error("protocol violation: {reason}")]
    ProtocolViolation { reason: String },

    /// The remote answered with an error status code
    #[error("remote returned HTTP {status_code}")]
    RemoteProtocolError { status_code: u16 },

    /// The remote call failed with a transport status
    #[error("remote call failed: {status}")]
    Remote {
        status: RemoteFailureStatus,
        status_code: Option<u16>,
    },

    /// Failure outside the known taxonomy
    #[error("{message}")]
    Other { message: String },
}

impl TransportFault {
    /// Socket failure with the given kind
    pub fn socket(kind: impl Into<String>) -> Self {
        Self::Socket { kind: kind.into() }
    }

    /// Protocol violation with the given reason
    pub fn protocol_violation(reason: impl Into<String>) -> Self {
        Self::ProtocolViolation {
            reason: reason.into(),
        }
    }

    /// Remote failure with a transport status and no HTTP status
    pub const fn remote(status: RemoteFailureStatus) -> Self {
        Self::Remote {
            status,
            status_code: None,
        }
    }

    /// HTTP status code carried by the fault, if any
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::RemoteProtocolError { status_code } => Some(*status_code),
            Self::Remote { status_code, .. } => *status_code,
            _ => None,
        }
    }
}

impl From<&io::Error> for TransportFault {
    fn from(err: &io::Error) -> Self {
        use io::ErrorKind;

        match err.kind() {
            ErrorKind::TimedOut => Self::LocalTimeout,
            kind @ (ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::NotConnected
            | ErrorKind::AddrInUse
            | ErrorKind::AddrNotAvailable
            | ErrorKind::BrokenPipe
            | ErrorKind::HostUnreachable
            | ErrorKind::NetworkUnreachable
            | ErrorKind::NetworkDown) => Self::socket(kind.to_string()),
            ErrorKind::InvalidData => Self::protocol_violation(err.to_string()),
            _ => Self::Other {
                message: err.to_string(),
            },
        }
    }
}

impl From<io::Error> for TransportFault {
    fn from(err: io::Error) -> Self {
        Self::from(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_timeout_maps_to_local_timeout() {
        let err = io::Error::new(io::ErrorKind::TimedOut, "deadline");
        assert_eq!(TransportFault::from(&err), TransportFault::LocalTimeout);
    }

    #[test]
    fn io_connection_errors_map_to_socket() {
        for kind in [
            io::ErrorKind::ConnectionRefused,
            io::ErrorKind::ConnectionReset,
            io::ErrorKind::BrokenPipe,
        ] {
            let fault = TransportFault::from(io::Error::from(kind));
            assert!(matches!(fault, TransportFault::Socket { .. }), "{kind:?}");
        }
    }

    #[test]
    fn io_invalid_data_maps_to_protocol_violation() {
        let err = io::Error::new(io::ErrorKind::InvalidData, "bad chunk header");
        assert_eq!(
            TransportFault::from(&err),
            TransportFault::protocol_violation("bad chunk header")
        );
    }

    #[test]
    fn io_other_maps_to_other() {
        let err = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        assert!(matches!(TransportFault::from(&err), TransportFault::Other { .. }));
    }

    #[test]
    fn status_code_is_exposed() {
        assert_eq!(
            TransportFault::RemoteProtocolError { status_code: 503 }.status_code(),
            Some(503)
        );
        assert_eq!(
            TransportFault::remote(RemoteFailureStatus::Timeout).status_code(),
            None
        );
        assert_eq!(TransportFault::LocalTimeout.status_code(), None);
    }

    #[test]
    fn display_messages() {
        assert_eq!(TransportFault::LocalTimeout.to_string(), "operation timed out");
        assert_eq!(
            TransportFault::RemoteProtocolError { status_code: 404 }.to_string(),
            "remote returned HTTP 404"
        );
        assert_eq!(
            TransportFault::remote(RemoteFailureStatus::ConnectFailure).to_string(),
            "remote call failed: connect_failure"
        );
    }

    #[test]
    fn serializes_with_fault_tag() {
        let json = serde_json::to_string(&TransportFault::RemoteProtocolError { status_code: 500 })
            .unwrap();
        assert_eq!(json, r#"{"fault":"remote_protocol_error","status_code":500}"#);
    }

    #[test]
    fn socket_kind_survives_serialization() {
        let fault = TransportFault::socket("connection reset");
        let json = serde_json::to_string(&fault).unwrap();
        assert_eq!(json, r#"{"fault":"socket","kind":"connection reset"}"#);
        assert_eq!(serde_json::from_str::<TransportFault>(&json).unwrap(), fault);
    }

    #[test]
    fn statuses_without_a_mapping_are_rejected() {
        for name in [r#""receive_failure""#, r#""unknown""#] {
            assert!(serde_json::from_str::<RemoteFailureStatus>(name).is_err(), "{name}");
        }
        assert_eq!(
            serde_json::from_str::<RemoteFailureStatus>(r#""send_failure""#).unwrap(),
            RemoteFailureStatus::SendFailure
        );
    }
}
