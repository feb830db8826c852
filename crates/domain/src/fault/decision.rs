//! Retry decisions produced by fault classification

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What the caller should do with a failed remote call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryAction {
    /// Issue the call again
    Retry,
    /// Propagate the failure immediately
    Throw,
    /// No rule matched; the caller's default policy applies
    Unhandled,
}

/// Outcome of classifying a failed remote call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RetryDecision {
    /// Retry the call
    Retry {
        /// `true` when the endpoint should be re-resolved before retrying
        is_transient_endpoint_fault: bool,
        /// Upper bound on retries, taken from the caller's budget
        max_retry_count: u32,
    },
    /// Do not retry; propagate the failure
    Throw,
    /// No rule matched
    Unhandled,
}

impl RetryDecision {
    /// Retry against the same endpoint
    pub const fn retry_same_endpoint(budget: &RetryBudget) -> Self {
        Self::Retry {
            is_transient_endpoint_fault: false,
            max_retry_count: budget.default_max_retry_count,
        }
    }

    /// Retry after re-resolving the endpoint
    pub const fn retry_resolved_endpoint(budget: &RetryBudget) -> Self {
        Self::Retry {
            is_transient_endpoint_fault: true,
            max_retry_count: budget.default_max_retry_count,
        }
    }

    /// The action part of the decision
    pub const fn action(&self) -> RetryAction {
        match self {
            Self::Retry { .. } => RetryAction::Retry,
            Self::Throw => RetryAction::Throw,
            Self::Unhandled => RetryAction::Unhandled,
        }
    }

    /// Whether the endpoint should be re-resolved; `false` unless retrying
    pub const fn is_transient_endpoint_fault(&self) -> bool {
        matches!(
            self,
            Self::Retry {
                is_transient_endpoint_fault: true,
                ..
            }
        )
    }

    /// Retry bound; `None` unless retrying
    pub const fn max_retry_count(&self) -> Option<u32> {
        match self {
            Self::Retry {
                max_retry_count, ..
            } => Some(*max_retry_count),
            _ => None,
        }
    }

    /// Whether this decision asks for a retry
    pub const fn is_retry(&self) -> bool {
        matches!(self, Self::Retry { .. })
    }
}

/// Caller-supplied limits for retrying a failed call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryBudget {
    /// Retries allowed for a retryable fault (default: 10)
    #[serde(default = "default_max_retry_count")]
    pub default_max_retry_count: u32,

    /// Backoff ceiling when the endpoint must be re-resolved (default: 2000ms)
    #[serde(default = "default_max_backoff_transient")]
    pub max_backoff_on_transient_ms: u64,

    /// Backoff ceiling when retrying the same endpoint (default: 5000ms)
    #[serde(default = "default_max_backoff_non_transient")]
    pub max_backoff_on_non_transient_ms: u64,
}

const fn default_max_retry_count() -> u32 {
    10
}

const fn default_max_backoff_transient() -> u64 {
    2_000
}

const fn default_max_backoff_non_transient() -> u64 {
    5_000
}

impl Default for RetryBudget {
    fn default() -> Self {
        Self {
            default_max_retry_count: default_max_retry_count(),
            max_backoff_on_transient_ms: default_max_backoff_transient(),
            max_backoff_on_non_transient_ms: default_max_backoff_non_transient(),
        }
    }
}

impl RetryBudget {
    /// Budget with the given retry count and default backoff ceilings
    pub const fn with_max_retries(default_max_retry_count: u32) -> Self {
        Self {
            default_max_retry_count,
            max_backoff_on_transient_ms: default_max_backoff_transient(),
            max_backoff_on_non_transient_ms: default_max_backoff_non_transient(),
        }
    }

    /// Backoff ceiling for a retry decision
    pub const fn max_backoff_for(&self, is_transient_endpoint_fault: bool) -> Duration {
        if is_transient_endpoint_fault {
            Duration::from_millis(self.max_backoff_on_transient_ms)
        } else {
            Duration::from_millis(self.max_backoff_on_non_transient_ms)
        }
    }
}
