//! Retry with exponential backoff for optimistic-concurrency conflicts.
//!
//! A conditional write that loses a race is re-run from a fresh read.
//! Only `StoreError::Conflict` is retried; every other error ends the call.
//! When the budget is spent the caller sees `LedgerError::Conflict`.
//!
//! # Example
//!
//! ```rust,ignore
//! use brokerage_engine::application::services::{ConflictRetryPolicy, retry_on_conflict};
//!
//! let policy = ConflictRetryPolicy::default();
//! let order = retry_on_conflict(&policy, "cancel_order", move || async move {
//!     // read, mutate, conditional commit
//! })
//! .await?;
//! ```

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::application::errors::LedgerError;
use crate::observability;

/// Retry policy for conflicting ledger writes.
#[derive(Debug, Clone, PartialEq)]
pub struct ConflictRetryPolicy {
    /// Total attempts including the first one (default: 5).
    pub max_attempts: u32,
    /// Backoff before the first retry (default: 5ms).
    pub initial_backoff: Duration,
    /// Upper bound on a single backoff (default: 200ms).
    pub max_backoff: Duration,
    /// Backoff multiplier for exponential growth (default: 2.0).
    pub backoff_multiplier: f64,
    /// Jitter factor for randomization (default: 0.5 = ±50%).
    pub jitter_factor: f64,
}

impl Default for ConflictRetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(5),
            max_backoff: Duration::from_millis(200),
            backoff_multiplier: 2.0,
            jitter_factor: 0.5,
        }
    }
}

impl ConflictRetryPolicy {
    /// Create a new retry policy with custom settings.
    #[must_use]
    pub const fn new(
        max_attempts: u32,
        initial_backoff: Duration,
        max_backoff: Duration,
        backoff_multiplier: f64,
        jitter_factor: f64,
    ) -> Self {
        Self {
            max_attempts,
            initial_backoff,
            max_backoff,
            backoff_multiplier,
            jitter_factor,
        }
    }

    /// A policy with no retries: the first conflict is surfaced.
    #[must_use]
    pub const fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            backoff_multiplier: 1.0,
            jitter_factor: 0.0,
        }
    }
}

/// Calculator for exponential backoff with jitter.
///
/// Arithmetic stays in `Duration`, so sub-millisecond policies keep their
/// resolution.
#[derive(Debug)]
pub struct ExponentialBackoffCalculator {
    current_retry: u32,
    max_retries: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
    backoff_multiplier: f64,
    jitter_factor: f64,
}

impl ExponentialBackoffCalculator {
    /// Create a new backoff calculator from a retry policy.
    #[must_use]
    pub const fn new(policy: &ConflictRetryPolicy) -> Self {
        Self {
            current_retry: 0,
            max_retries: policy.max_attempts.saturating_sub(1),
            initial_backoff: policy.initial_backoff,
            max_backoff: policy.max_backoff,
            backoff_multiplier: policy.backoff_multiplier,
            jitter_factor: policy.jitter_factor,
        }
    }

    /// Get the next backoff duration with jitter.
    ///
    /// Returns `None` once every retry has been handed out.
    pub fn next_backoff(&mut self) -> Option<Duration> {
        if self.current_retry >= self.max_retries {
            return None;
        }

        let base = self.calculate_base_backoff();
        let jittered = self.apply_jitter(base);

        self.current_retry += 1;

        Some(jittered.min(self.max_backoff))
    }

    fn calculate_base_backoff(&self) -> Duration {
        let multiplier = self.backoff_multiplier.powi(self.current_retry as i32);
        self.scale(self.initial_backoff, multiplier)
    }

    /// Random value in `[backoff * (1 - jitter), backoff * (1 + jitter)]`.
    fn apply_jitter(&self, backoff: Duration) -> Duration {
        if backoff.is_zero() || self.jitter_factor <= 0.0 {
            return backoff;
        }
        let min = (1.0 - self.jitter_factor).max(0.0);
        let max = 1.0 + self.jitter_factor;
        let factor = rand::rng().random_range(min..=max);
        self.scale(backoff, factor)
    }

    /// `duration * factor`, saturating at `max_backoff`.
    fn scale(&self, duration: Duration, factor: f64) -> Duration {
        Duration::try_from_secs_f64(duration.as_secs_f64() * factor)
            .map_or(self.max_backoff, |d| d.min(self.max_backoff))
    }

    /// Retries handed out so far.
    #[must_use]
    pub const fn retries_used(&self) -> u32 {
        self.current_retry
    }
}

/// Run `attempt` until it stops failing with a store conflict.
///
/// Each attempt must re-read everything it writes; the closure is called
/// afresh after every conflict.
///
/// # Errors
///
/// Returns the first non-conflict error, or `LedgerError::Conflict` once
/// `policy.max_attempts` attempts have all conflicted.
pub async fn retry_on_conflict<T, F, Fut>(
    policy: &ConflictRetryPolicy,
    operation: &'static str,
    mut attempt: F,
) -> Result<T, LedgerError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LedgerError>>,
{
    let mut backoff = ExponentialBackoffCalculator::new(policy);
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        match attempt().await {
            Err(e) if e.is_retryable() => {
                observability::record_conflict_retry(operation);
                let Some(delay) = backoff.next_backoff() else {
                    tracing::warn!(operation, attempts, error = %e, "Conflict retries exhausted");
                    return Err(LedgerError::Conflict {
                        operation: operation.to_string(),
                        attempts,
                    });
                };
                tracing::debug!(
                    operation,
                    attempt = attempts,
                    delay_us = delay.as_micros() as u64,
                    error = %e,
                    "Ledger write conflicted, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            other => return other,
        }
    }
}
