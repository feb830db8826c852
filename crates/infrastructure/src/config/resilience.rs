//! Retry configuration: classifier budget and backoff schedule.

use domain::RetryBudget;
use serde::{Deserialize, Serialize};

use super::default_true;
use crate::retry::BackoffConfig;

/// Retry configuration for calls to remote services
///
/// The first three fields feed the [`RetryBudget`] handed to the fault
/// classifier; the rest shape the delay between attempts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryAppConfig {
    /// Retries granted by every retryable decision (default: 10)
    #[serde(default = "default_max_retry_count")]
    pub max_retry_count: u32,

    /// Delay cap when the endpoint is re-resolved between attempts (default: 2000ms)
    #[serde(default = "default_max_backoff_transient")]
    pub max_backoff_on_transient_ms: u64,

    /// Delay cap when the same endpoint is retried (default: 5000ms)
    #[serde(default = "default_max_backoff_non_transient")]
    pub max_backoff_on_non_transient_ms: u64,

    /// Initial delay before first retry in milliseconds (default: 100ms)
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Randomize delays to avoid thundering herd (default: true)
    #[serde(default = "default_true")]
    pub jitter_enabled: bool,
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

const fn default_initial_delay() -> u64 {
    100
}

const fn default_multiplier() -> f64 {
    2.0
}

impl Default for RetryAppConfig {
    fn default() -> Self {
        Self {
            max_retry_count: default_max_retry_count(),
            max_backoff_on_transient_ms: default_max_backoff_transient(),
            max_backoff_on_non_transient_ms: default_max_backoff_non_transient(),
            initial_delay_ms: default_initial_delay(),
            multiplier: default_multiplier(),
            jitter_enabled: true,
        }
    }
}

impl RetryAppConfig {
    /// Budget consulted by the fault classifier
    #[must_use]
    pub const fn retry_budget(&self) -> RetryBudget {
        RetryBudget {
            default_max_retry_count: self.max_retry_count,
            max_backoff_on_transient_ms: self.max_backoff_on_transient_ms,
            max_backoff_on_non_transient_ms: self.max_backoff_on_non_transient_ms,
        }
    }

    /// Delay schedule between attempts
    #[must_use]
    pub fn backoff_config(&self) -> BackoffConfig {
        BackoffConfig {
            initial_delay_ms: self.initial_delay_ms,
            multiplier: self.multiplier,
            jitter_enabled: self.jitter_enabled,
            ..BackoffConfig::default()
        }
    }
}
