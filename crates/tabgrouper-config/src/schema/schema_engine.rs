//! Batching, rate limit and retry configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How pending batches are keyed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchScope {
    /// One batch per browser window.
    #[default]
    Window,
    /// A single batch shared by every window.
    Process,
}

/// Debounce configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchingConfig {
    /// Quiet period after the last scheduled tab before a batch flushes.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    #[serde(default)]
    pub scope: BatchScope,
}

impl BatchingConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for BatchingConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            scope: BatchScope::default(),
        }
    }
}

fn default_delay_ms() -> u64 {
    2000
}

/// Outbound call budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSettings {
    #[serde(default = "default_max_calls_per_minute")]
    pub max_calls_per_minute: u32,

    /// Minimum spacing between consecutive calls.
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_calls_per_minute: default_max_calls_per_minute(),
            min_delay_ms: default_min_delay_ms(),
        }
    }
}

fn default_max_calls_per_minute() -> u32 {
    10
}

fn default_min_delay_ms() -> u64 {
    1000
}

/// Retry policy for outbound calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}
