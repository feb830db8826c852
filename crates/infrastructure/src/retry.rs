//! Classified retry with endpoint re-resolution
//!
//! Runs a remote call against a resolved endpoint. Each failure is mapped to
//! a [`TransportFault`](domain::TransportFault), classified through a
//! [`ClassifierChain`], and either retried after an exponential backoff or
//! returned to the caller. Transient endpoint faults re-resolve the service
//! before the next attempt.
//!
//! # Example
//!
//! ```rust,ignore
//! use infrastructure::retry::{BackoffConfig, with_classified_retry};
//!
//! let outcome = with_classified_retry(
//!     &resolver,
//!     &service,
//!     &ClassifierChain::new(),
//!     &RetryBudget::default(),
//!     &BackoffConfig::default(),
//!     |endpoint| async move { client.get(&endpoint.address).send().await },
//! )
//! .await;
//! ```

use std::{
    fmt,
    future::Future,
    time::{Duration, Instant},
};

use application::{
    error::ApplicationError,
    ports::{EndpointResolverPort, ResolvedEndpoint},
    services::ClassifierChain,
};
use domain::{RetryBudget, RetryDecision, ServiceUri};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::http::FaultSource;

/// Delay schedule between attempts
///
/// The cap comes from the [`RetryBudget`] and depends on whether the
/// endpoint was re-resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Delay before the first retry in milliseconds
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,

    /// Multiplier for exponential backoff
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Add jitter to prevent thundering herd
    #[serde(default = "default_true")]
    pub jitter_enabled: bool,

    /// Jitter factor (0.0 - 1.0), percentage of delay to randomize
    #[serde(default = "default_jitter_factor")]
    pub jitter_factor: f64,
}

const fn default_initial_delay() -> u64 {
    100
}

const fn default_multiplier() -> f64 {
    2.0
}

const fn default_true() -> bool {
    true
}

const fn default_jitter_factor() -> f64 {
    0.25
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay(),
            multiplier: default_multiplier(),
            jitter_enabled: true,
            jitter_factor: default_jitter_factor(),
        }
    }
}

impl BackoffConfig {
    /// Disable jitter (useful for testing)
    #[must_use]
    pub const fn without_jitter(mut self) -> Self {
        self.jitter_enabled = false;
        self
    }

    /// Calculate delay for a given retry attempt (0-indexed)
    ///
    /// delay = initial_delay * multiplier^attempt, capped at `max`, then
    /// jittered.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_sign_loss,
        clippy::cast_possible_truncation
    )]
    pub fn delay_for_attempt(&self, attempt: u32, max: Duration) -> Duration {
        let max_ms = max.as_millis() as f64;
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let base_delay = (self.initial_delay_ms as f64) * self.multiplier.powi(exponent);
        let capped_delay = base_delay.min(max_ms);

        let final_delay = if self.jitter_enabled && capped_delay > 0.0 {
            let jitter_range = capped_delay * self.jitter_factor;
            let jitter = rand::rng().random_range(-jitter_range..=jitter_range);
            (capped_delay + jitter).clamp(0.0, max_ms)
        } else {
            capped_delay
        };

        Duration::from_millis(final_delay as u64)
    }
}

/// Why a classified retry gave up
#[derive(Debug, thiserror::Error)]
pub enum ClassifiedRetryError<E> {
    /// The service could not be resolved to an endpoint
    #[error("endpoint resolution failed: {0}")]
    Resolution(ApplicationError),

    /// The call failed and was not retried further
    #[error("{error}")]
    Call {
        error: E,
        decision: RetryDecision,
    },
}

impl<E> ClassifiedRetryError<E> {
    /// Decision taken on the final failure, if the call was attempted
    pub const fn decision(&self) -> Option<&RetryDecision> {
        match self {
            Self::Resolution(_) => None,
            Self::Call { decision, .. } => Some(decision),
        }
    }

    /// The call error, if the call was attempted
    pub fn into_call_error(self) -> Option<E> {
        match self {
            Self::Resolution(_) => None,
            Self::Call { error, .. } => Some(error),
        }
    }
}

/// Result of a classified retry operation with metadata
#[derive(Debug)]
pub struct RetryResult<T, E> {
    /// The final result
    pub result: Result<T, ClassifiedRetryError<E>>,
    /// Number of attempts made
    pub attempts: u32,
    /// Number of times the endpoint was re-resolved
    pub re_resolutions: u32,
    /// Total time spent including delays
    pub total_duration: Duration,
}

impl<T, E> RetryResult<T, E> {
    /// Check if the operation succeeded
    pub const fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Convert to a standard Result
    pub fn into_result(self) -> Result<T, ClassifiedRetryError<E>> {
        self.result
    }
}

/// Execute a remote call, retrying as the classifier decides
///
/// Stops on the first success, on a `Throw` or `Unhandled` decision, or once
/// the decision's `max_retry_count` retries have been spent.
pub async fn with_classified_retry<F, Fut, T, E>(
    resolver: &dyn EndpointResolverPort,
    service: &ServiceUri,
    chain: &ClassifierChain,
    budget: &RetryBudget,
    backoff: &BackoffConfig,
    mut operation: F,
) -> RetryResult<T, E>
where
    F: FnMut(ResolvedEndpoint) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: FaultSource + fmt::Display,
{
    let start = Instant::now();
    let mut attempts = 0u32;
    let mut re_resolutions = 0u32;

    let finish = |result: Result<T, ClassifiedRetryError<E>>, attempts: u32, re_resolutions: u32| {
        RetryResult {
            result,
            attempts,
            re_resolutions,
            total_duration: start.elapsed(),
        }
    };

    let mut endpoint = match resolver.resolve(service, None).await {
        Ok(endpoint) => endpoint,
        Err(e) => {
            warn!(service = %service, error = %e, "Endpoint resolution failed");
            return finish(Err(ClassifiedRetryError::Resolution(e)), 0, 0);
        },
    };

    loop {
        attempts += 1;

        let err = match operation(endpoint.clone()).await {
            Ok(value) => {
                if attempts > 1 {
                    debug!(
                        service = %service,
                        attempts,
                        re_resolutions,
                        "Call succeeded after retries"
                    );
                }
                return finish(Ok(value), attempts, re_resolutions);
            },
            Err(err) => err,
        };

        let fault = err.transport_fault();
        let decision = chain.classify(&fault, budget);
        let retries_done = attempts - 1;

        let RetryDecision::Retry {
            is_transient_endpoint_fault,
            max_retry_count,
        } = decision
        else {
            debug!(
                service = %service,
                attempts,
                action = ?decision.action(),
                error = %err,
                "Call failed with non-retryable fault"
            );
            return finish(
                Err(ClassifiedRetryError::Call {
                    error: err,
                    decision,
                }),
                attempts,
                re_resolutions,
            );
        };

        if retries_done >= max_retry_count {
            warn!(
                service = %service,
                attempts,
                max_retry_count,
                error = %err,
                "Call failed after max retries"
            );
            return finish(
                Err(ClassifiedRetryError::Call {
                    error: err,
                    decision,
                }),
                attempts,
                re_resolutions,
            );
        }

        let delay = backoff.delay_for_attempt(
            retries_done,
            budget.max_backoff_for(is_transient_endpoint_fault),
        );
        warn!(
            service = %service,
            endpoint = %endpoint.address,
            attempt = attempts,
            max_retry_count,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            transient = is_transient_endpoint_fault,
            error = %err,
            "Call failed, retrying"
        );

        tokio::time::sleep(delay).await;

        if is_transient_endpoint_fault {
            endpoint = match resolver.resolve(service, Some(&endpoint)).await {
                Ok(next) => next,
                Err(e) => {
                    warn!(service = %service, error = %e, "Endpoint re-resolution failed");
                    return finish(
                        Err(ClassifiedRetryError::Resolution(e)),
                        attempts,
                        re_resolutions,
                    );
                },
            };
            re_resolutions += 1;
        }
    }
}
