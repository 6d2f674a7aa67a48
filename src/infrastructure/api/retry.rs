//! Exponential backoff around availability fetches

use chrono::NaiveDate;
use std::time::Duration;
use tracing::warn;

use super::AvailabilitySource;
use crate::config::ApiCfg;
use crate::domain::availability::AvailabilityPayload;
use crate::shared::errors::FetchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn from_config(cfg: &ApiCfg) -> Self {
        Self::new(cfg.max_attempts, Duration::from_millis(cfg.backoff_base_ms))
    }

    /// Delay after the zero-based `attempt` failed: `base * 2^attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&ApiCfg::default())
    }
}

/// Fetch with retries on timeout. Any other error is returned immediately.
pub async fn fetch_with_retry(
    source: &dyn AvailabilitySource,
    start: NaiveDate,
    limit: u32,
    policy: RetryPolicy,
) -> Result<AvailabilityPayload, FetchError> {
    for attempt in 0..policy.max_attempts {
        match source.fetch(start, limit).await {
            Ok(payload) => return Ok(payload),
            Err(e) if e.is_retryable() => {
                if attempt + 1 < policy.max_attempts {
                    let delay = policy.delay_for(attempt);
                    warn!(
                        attempt = attempt + 1,
                        max_attempts = policy.max_attempts,
                        "⏳ {}; retrying in {:?}",
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                } else {
                    warn!(attempt = attempt + 1, max_attempts = policy.max_attempts, "⏳ {}", e);
                }
            }
            Err(e) => return Err(e),
        }
    }

    Err(FetchError::RetriesExhausted {
        attempts: policy.max_attempts,
    })
}
