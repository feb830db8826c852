//! Fault classification - turns a failed remote call into a retry decision
//!
//! # Examples
//!
//! ```
//! use application::FaultClassifier;
//! use domain::{RetryBudget, RetryDecision, TransportFault};
//!
//! let decision = FaultClassifier::classify(
//!     &TransportFault::RemoteProtocolError { status_code: 500 },
//!     &RetryBudget::with_max_retries(3),
//! );
//! assert_eq!(
//!     decision,
//!     RetryDecision::Retry { is_transient_endpoint_fault: true, max_retry_count: 3 }
//! );
//! ```

use std::{fmt, sync::Arc};

use domain::{RemoteFailureStatus, RetryBudget, RetryDecision, TransportFault};
use tracing::trace;

/// A pluggable classification rule
///
/// Returning `None` (or `Some(RetryDecision::Unhandled)`) passes the fault on
/// to the next handler.
pub trait ExceptionHandler: Send + Sync {
    fn try_handle(&self, fault: &TransportFault, budget: &RetryBudget) -> Option<RetryDecision>;
}

/// Built-in transport fault rules
#[derive(Debug, Clone, Copy, Default)]
pub struct FaultClassifier;

impl FaultClassifier {
    /// Classify a fault; first matching rule wins
    pub fn classify(fault: &TransportFault, budget: &RetryBudget) -> RetryDecision {
        match fault {
            TransportFault::LocalTimeout | TransportFault::Socket { .. } => {
                RetryDecision::retry_same_endpoint(budget)
            },
            TransportFault::ProtocolViolation { .. } => RetryDecision::Throw,
            TransportFault::RemoteProtocolError { status_code }
            | TransportFault::Remote {
                status: RemoteFailureStatus::ProtocolError,
                status_code: Some(status_code),
            } => match status_code {
                404 => RetryDecision::retry_same_endpoint(budget),
                500 => RetryDecision::retry_resolved_endpoint(budget),
                _ => RetryDecision::Unhandled,
            },
            TransportFault::Remote {
                status:
                    RemoteFailureStatus::Timeout
                    | RemoteFailureStatus::RequestCanceled
                    | RemoteFailureStatus::ConnectionClosed
                    | RemoteFailureStatus::ConnectFailure,
                ..
            } => RetryDecision::retry_same_endpoint(budget),
            _ => RetryDecision::Unhandled,
        }
    }
}

impl ExceptionHandler for FaultClassifier {
    fn try_handle(&self, fault: &TransportFault, budget: &RetryBudget) -> Option<RetryDecision> {
        Some(Self::classify(fault, budget)).filter(|decision| *decision != RetryDecision::Unhandled)
    }
}

/// The built-in rules followed by caller-supplied handlers, in order
#[derive(Clone)]
pub struct ClassifierChain {
    handlers: Vec<Arc<dyn ExceptionHandler>>,
}

impl ClassifierChain {
    /// A chain holding only the built-in rules
    pub fn new() -> Self {
        Self {
            handlers: vec![Arc::new(FaultClassifier)],
        }
    }

    /// Append a handler, consulted after everything registered before it
    #[must_use]
    pub fn with_handler(mut self, handler: Arc<dyn ExceptionHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Number of handlers, built-in rules included
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Always `false`; the built-in rules are never removed
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// First decision other than `Unhandled`, or `Unhandled`
    pub fn classify(&self, fault: &TransportFault, budget: &RetryBudget) -> RetryDecision {
        let decision = self
            .handlers
            .iter()
            .filter_map(|handler| handler.try_handle(fault, budget))
            .find(|decision| *decision != RetryDecision::Unhandled)
            .unwrap_or(RetryDecision::Unhandled);
        trace!(%fault, action = ?decision.action(), "Classified transport fault");
        decision
    }
}

impl Default for ClassifierChain {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ClassifierChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifierChain")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
