//! Bounded retry for calls to the remote host.
//!
//! Only errors reporting [`RepositorySourceError::is_retryable`] are retried.
//! Each retry is logged, and the last error is returned once attempts run out.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::warn;

use super::ports::RepositorySourceError;

/// Async sleep used between attempts.
#[async_trait]
pub trait RetrySleeper: Send + Sync {
    /// Suspend for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Tokio-backed sleeper.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl RetrySleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Spread applied to the exponential base delay.
pub trait BackoffJitter: Send + Sync {
    /// Delay to wait given the un-jittered base.
    fn jittered_delay(&self, base: Duration) -> Duration;
}

/// Adds up to a quarter of the base delay, uniformly at random.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomJitter;

impl BackoffJitter for RandomJitter {
    fn jittered_delay(&self, base: Duration) -> Duration {
        let base_ms = u64::try_from(base.as_millis()).unwrap_or(u64::MAX);
        let extra = rand::thread_rng().gen_range(0..=(base_ms >> 2));
        Duration::from_millis(base_ms.saturating_add(extra))
    }
}

/// Retry limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts, including the first. Clamped to at least one.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_backoff: Duration,
    /// Ceiling for the exponential delay.
    pub max_backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
        }
    }
}

/// Retry executor shared by the sync services.
#[derive(Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
    sleeper: Arc<dyn RetrySleeper>,
    jitter: Arc<dyn BackoffJitter>,
}

impl RetryPolicy {
    /// Policy sleeping on tokio with random jitter.
    #[must_use]
    pub fn new(config: RetryConfig) -> Self {
        Self::with_runtime(config, Arc::new(TokioSleeper), Arc::new(RandomJitter))
    }

    /// Policy with explicit sleep and jitter strategies.
    #[must_use]
    pub fn with_runtime(
        config: RetryConfig,
        sleeper: Arc<dyn RetrySleeper>,
        jitter: Arc<dyn BackoffJitter>,
    ) -> Self {
        Self {
            config: RetryConfig {
                max_attempts: config.max_attempts.max(1),
                ..config
            },
            sleeper,
            jitter,
        }
    }

    /// Exponential base delay after `attempt` failed attempts.
    fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let base = self
            .config
            .initial_backoff
            .saturating_mul(1_u32 << exponent)
            .min(self.config.max_backoff);
        self.jitter.jittered_delay(base)
    }

    /// Run `call` until it succeeds, fails terminally, or attempts run out.
    ///
    /// # Errors
    /// Returns the last error from `call`.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T, RepositorySourceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RepositorySourceError>>,
    {
        let mut attempt = 1;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(error) if error.is_retryable() && attempt < self.config.max_attempts => {
                    let delay = self.backoff_for(attempt);
                    warn!(
                        operation,
                        attempt,
                        max_attempts = self.config.max_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        %error,
                        "retrying repository host call"
                    );
                    self.sleeper.sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}
