//! Port for reading identity claims off a call

#[cfg(test)]
use mockall::automock;

use domain::Claim;

use crate::call_context::CallContext;

/// Resolves the caller's identity claims from the call context
///
/// Implementations read whatever the authentication layer left on the call
/// (a bearer token, a session) and never fail: an anonymous call has no
/// claims.
#[cfg_attr(test, automock)]
pub trait ClaimResolver: Send + Sync {
    /// Claims of the caller, in the order the identity layer produced them
    fn claims(&self, ctx: &CallContext) -> Vec<Claim>;
}
