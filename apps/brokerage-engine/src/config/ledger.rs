//! Ledger configuration: base currency and conflict retry policy.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::application::services::ConflictRetryPolicy;

/// Ledger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Asset that BUY orders pay with and SELL orders are paid in.
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
    /// Retry policy for conflicting writes.
    #[serde(default)]
    pub retry: RetrySettings,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            base_currency: default_base_currency(),
            retry: RetrySettings::default(),
        }
    }
}

/// Optimistic-concurrency retry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Total attempts including the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Backoff before the first retry in milliseconds.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Upper bound on a single backoff in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Backoff multiplier.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    /// Jitter factor in [0, 1].
    #[serde(default = "default_jitter_factor")]
    pub jitter_factor: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter_factor: default_jitter_factor(),
        }
    }
}

impl RetrySettings {
    /// Convert to the policy consumed by the reservation engine.
    #[must_use]
    pub const fn to_policy(&self) -> ConflictRetryPolicy {
        ConflictRetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.initial_backoff_ms),
            Duration::from_millis(self.max_backoff_ms),
            self.backoff_multiplier,
            self.jitter_factor,
        )
    }
}

fn default_base_currency() -> String {
    "TRY".to_string()
}

const fn default_max_attempts() -> u32 {
    5
}

const fn default_initial_backoff_ms() -> u64 {
    5
}

const fn default_max_backoff_ms() -> u64 {
    200
}

const fn default_backoff_multiplier() -> f64 {
    2.0
}

const fn default_jitter_factor() -> f64 {
    0.5
}
