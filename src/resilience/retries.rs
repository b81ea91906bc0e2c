//! Bounded retry with exponential backoff.
//!
//! # Responsibilities
//! - Run an operation until it succeeds or the retry budget is spent
//! - Double the delay between attempts
//! - Propagate the last failure unchanged
//!
//! The operation is responsible for turning a bad HTTP status into an error;
//! anything it returns as `Ok` ends the loop.

use std::future::Future;
use std::time::Duration;

use crate::config::RetryConfig;
use crate::resilience::backoff::next_delay;

/// Retry parameters for one top-level fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; total attempts is `max_retries + 1`.
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Option<Duration>,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
            max_delay: None,
        }
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = Some(max_delay);
        self
    }

    /// Run `operation` with this policy.
    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        execute_with_retry(operation, *self).await
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_delay: config.max_delay_ms.map(Duration::from_millis),
        }
    }
}

/// Per-call retry state. Created for each top-level fetch and dropped once
/// it succeeds or runs out of attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryContext {
    pub attempts_remaining: u32,
    pub current_delay: Duration,
    max_delay: Option<Duration>,
}

impl RetryContext {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            attempts_remaining: policy.max_retries,
            current_delay: policy.initial_delay,
            max_delay: policy.max_delay,
        }
    }

    /// Consume one retry, returning the delay to wait first.
    /// `None` means the budget is spent.
    pub fn next_backoff(&mut self) -> Option<Duration> {
        if self.attempts_remaining == 0 {
            return None;
        }
        let delay = self.current_delay;
        self.attempts_remaining -= 1;
        self.current_delay = next_delay(delay, self.max_delay);
        Some(delay)
    }
}

/// Invoke `operation`, retrying failures with exponential backoff.
///
/// The wait is a tokio sleep, so only the calling task is suspended.
pub async fn execute_with_retry<F, Fut, T, E>(mut operation: F, policy: RetryPolicy) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut ctx = RetryContext::new(policy);
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        let Some(delay) = ctx.next_backoff() else {
            tracing::debug!(attempt, error = %err, "Retry budget exhausted");
            return Err(err);
        };

        tracing::warn!(
            attempt,
            attempts_remaining = ctx.attempts_remaining + 1,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "Attempt failed, retrying"
        );
        tokio::time::sleep(delay).await;
    }
}
