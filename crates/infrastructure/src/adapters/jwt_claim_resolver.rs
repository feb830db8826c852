//! Claim resolver reading the bearer token of the inbound call
//!
//! The token's signature is not checked here: by the time a call is
//! captured, the authentication layer has already accepted it. Only the
//! payload segment is decoded.

use application::{CallContext, ports::ClaimResolver};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use domain::{Claim, USERNAME_CLAIM};
use serde_json::{Map, Value};
use tracing::debug;

const BEARER_PREFIX: &str = "bearer ";

/// Resolves claims from the `Authorization: Bearer <jwt>` header
///
/// String, number and boolean payload members become one claim each; array
/// members become one claim per element. A missing or unreadable token
/// yields no claims.
#[derive(Debug, Clone, Default)]
pub struct JwtClaimResolver {
    username_claim: Option<String>,
}

impl JwtClaimResolver {
    /// Create a resolver
    pub fn new() -> Self {
        Self::default()
    }

    /// Also report the given token claim as the `username` claim
    ///
    /// Applies only when the token carries no `username` claim itself.
    #[must_use]
    pub fn with_username_claim(mut self, claim_type: impl Into<String>) -> Self {
        self.username_claim = Some(claim_type.into());
        self
    }

    fn decode(token: &str) -> Result<Map<String, Value>, String> {
        let mut segments = token.split('.');
        let (Some(_header), Some(payload), Some(_signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err("token is not a three-segment JWT".to_string());
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| format!("payload is not base64url: {e}"))?;
        serde_json::from_slice(&bytes).map_err(|e| format!("payload is not a JSON object: {e}"))
    }
}

fn bearer_token(ctx: &CallContext) -> Option<&str> {
    let value = ctx.request_headers().get("authorization")?.trim();
    let prefix = value.get(..BEARER_PREFIX.len())?;
    prefix
        .eq_ignore_ascii_case(BEARER_PREFIX)
        .then(|| value[BEARER_PREFIX.len()..].trim())
        .filter(|token| !token.is_empty())
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

impl ClaimResolver for JwtClaimResolver {
    fn claims(&self, ctx: &CallContext) -> Vec<Claim> {
        let Some(token) = bearer_token(ctx) else {
            return Vec::new();
        };

        let payload = match Self::decode(token) {
            Ok(payload) => payload,
            Err(reason) => {
                debug!(%reason, "Ignoring unreadable bearer token");
                return Vec::new();
            },
        };

        let mut claims: Vec<Claim> = payload
            .iter()
            .flat_map(|(claim_type, value)| {
                let values: Vec<String> = match value {
                    Value::Array(items) => items.iter().filter_map(scalar).collect(),
                    other => scalar(other).into_iter().collect(),
                };
                values
                    .into_iter()
                    .map(move |value| Claim::new(claim_type.clone(), value))
            })
            .collect();

        if let Some(source) = &self.username_claim
            && Claim::find(&claims, USERNAME_CLAIM).is_none()
            && let Some(username) = Claim::find(&claims, source).map(str::to_string)
        {
            claims.push(Claim::new(USERNAME_CLAIM, username));
        }

        claims
    }
}
