use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How often a failed task is tried, and how long to wait between tries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, first try included. `1` disables retries.
    pub max_attempts: u32,

    /// Fixed pause between attempts, in milliseconds
    pub delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            delay_ms: 5_000,
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no retries
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_attempts: 1,
            delay_ms: 0,
        }
    }

    #[must_use]
    pub const fn fixed(max_attempts: u32, delay: Duration) -> Self {
        let millis = delay.as_millis();
        Self {
            max_attempts,
            delay_ms: if millis > u64::MAX as u128 {
                u64::MAX
            } else {
                millis as u64
            },
        }
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("max_attempts must be > 0".to_string());
        }
        Ok(())
    }
}
