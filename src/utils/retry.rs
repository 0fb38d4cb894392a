// src/utils/retry.rs

//! Retry and pacing policies.

use std::future::Future;
use std::time::Duration;

use crate::error::{AppError, Result};
use crate::models::CrawlerConfig;

/// Fixed-delay retry on transient network failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.retry_delay_ms),
        )
    }

    /// Run `op` until it succeeds, fails permanently, or runs out of attempts.
    ///
    /// Only errors for which [`AppError::is_transient`] holds are retried.
    /// `op` receives the 1-based attempt number.
    pub async fn run<T, F, Fut>(&self, uri: &str, mut op: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() => {
                    if attempt >= self.max_attempts {
                        log::error!("Giving up on {uri} after {attempt} attempts: {e}");
                        return Err(AppError::RetryExhausted {
                            uri: uri.to_string(),
                            attempts: attempt,
                            message: e.to_string(),
                        });
                    }
                    log::warn!(
                        "Attempt {attempt}/{} for {uri} failed: {e}. Retrying in {:?}",
                        self.max_attempts,
                        self.delay
                    );
                    if !self.delay.is_zero() {
                        tokio::time::sleep(self.delay).await;
                    }
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Fixed pause between consecutive calls to a rate-limited service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pacer {
    pub delay: Duration,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}
