//! Reconciliation configuration (stale sweep and status-poll retry)

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct ReconciliationConfig {
    /// Run the background sweep at all
    #[serde(default = "default_sweep_enabled")]
    pub sweep_enabled: bool,

    /// An awaiting transaction untouched this long gets polled
    #[serde(default = "default_stale_after")]
    pub stale_after_secs: u64,

    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    #[serde(default = "default_sweep_batch_size")]
    pub sweep_batch_size: u32,

    /// Attempts per status inquiry, including the first
    #[serde(default = "default_poll_retry_attempts")]
    pub poll_retry_attempts: u32,

    /// Linear backoff step between inquiry attempts
    #[serde(default = "default_poll_retry_backoff")]
    pub poll_retry_backoff_ms: u64,
}

impl ReconciliationConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn poll_retry_backoff(&self) -> Duration {
        Duration::from_millis(self.poll_retry_backoff_ms)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.sweep_interval_secs == 0 {
            return Err(ValidationError::InvalidReconciliation("sweep_interval_secs"));
        }
        if self.sweep_batch_size == 0 || self.sweep_batch_size > 500 {
            return Err(ValidationError::InvalidReconciliation("sweep_batch_size"));
        }
        if self.poll_retry_attempts == 0 || self.poll_retry_attempts > 10 {
            return Err(ValidationError::InvalidReconciliation("poll_retry_attempts"));
        }
        Ok(())
    }
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            sweep_enabled: default_sweep_enabled(),
            stale_after_secs: default_stale_after(),
            sweep_interval_secs: default_sweep_interval(),
            sweep_batch_size: default_sweep_batch_size(),
            poll_retry_attempts: default_poll_retry_attempts(),
            poll_retry_backoff_ms: default_poll_retry_backoff(),
        }
    }
}

fn default_sweep_enabled() -> bool {
    true
}

fn default_stale_after() -> u64 {
    900
}

fn default_sweep_interval() -> u64 {
    60
}

fn default_sweep_batch_size() -> u32 {
    25
}

fn default_poll_retry_attempts() -> u32 {
    3
}

fn default_poll_retry_backoff() -> u64 {
    500
}
