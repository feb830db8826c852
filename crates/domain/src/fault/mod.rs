//! Failure taxonomy for remote calls and the retry decisions derived from it

mod decision;
mod info;
mod remote_error;
mod transport;

pub use decision::{RetryAction, RetryBudget, RetryDecision};
pub use info::FaultInfo;
pub use remote_error::RemoteErrorPayload;
pub use transport::{RemoteFailureStatus, TransportFault};
