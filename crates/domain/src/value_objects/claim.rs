//! Identity claim attached to a captured request

use serde::{Deserialize, Serialize};

/// Claim type holding the caller's username
pub const USERNAME_CLAIM: &str = "username";

/// A single `(type, value)` identity claim
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Claim {
    /// Claim type, e.g. `username` or `sub`
    #[serde(rename = "type")]
    pub claim_type: String,
    /// Claim value
    pub value: String,
}

impl Claim {
    /// Create a claim
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }

    /// Value of the first claim of the given type
    pub fn find<'a>(claims: &'a [Self], claim_type: &str) -> Option<&'a str> {
        claims
            .iter()
            .find(|claim| claim.claim_type == claim_type)
            .map(|claim| claim.value.as_str())
    }
}
