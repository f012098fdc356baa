//! Retry logic with backoff for transient process failures.
//!
//! Only attempts that end with a non-zero exit status are repeated. A domain
//! error reported with a zero exit is final, and so is any error raised
//! before a process could run (bad configuration, unwritable script file).

use crate::error::Result;
use crate::types::ExecutionOutcome;
use std::thread;
use std::time::Duration;

/// How many times to run a command and how long to wait in between.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first (values below 1 act as 1)
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub backoff: Duration,
    /// Multiplier applied to the delay for each further attempt
    pub backoff_factor: f64,
    /// Upper bound for any single delay
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::once()
    }
}

impl RetryPolicy {
    /// Run exactly once.
    pub fn once() -> Self {
        Self {
            max_attempts: 1,
            backoff: Duration::ZERO,
            backoff_factor: 1.0,
            max_backoff: Duration::from_secs(300),
        }
    }

    /// Fixed delay between attempts.
    pub fn fixed(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
            backoff_factor: 1.0,
            max_backoff: backoff.max(Duration::from_secs(300)),
        }
    }

    /// Policy used for restores: 3 attempts, 10 seconds apart.
    pub fn restore_default() -> Self {
        Self::fixed(3, Duration::from_secs(10))
    }

    /// Attempts to make, never less than one.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Calculate the delay after a failed attempt (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self.backoff.as_secs_f64() * self.backoff_factor.powi(attempt as i32);
        let capped = delay.min(self.max_backoff.as_secs_f64());
        Duration::from_secs_f64(capped.max(0.0))
    }
}

/// Callback trait for retry progress notifications.
pub trait RetryCallback: Send + Sync {
    /// Called after a failed attempt, before sleeping.
    ///
    /// # Arguments
    /// * `attempt` - Attempt that just failed (1-indexed)
    /// * `max_attempts` - Total attempts allowed
    /// * `outcome` - The failed attempt
    /// * `delay` - Time until the next attempt
    fn on_retry(&self, attempt: u32, max_attempts: u32, outcome: &ExecutionOutcome, delay: Duration);
}

/// No-op callback that does nothing.
pub struct NoCallback;

impl RetryCallback for NoCallback {
    fn on_retry(&self, _: u32, _: u32, _: &ExecutionOutcome, _: Duration) {}
}

/// Callback that reports retries through the `log` facade.
pub struct LogCallback;

impl RetryCallback for LogCallback {
    fn on_retry(&self, attempt: u32, max_attempts: u32, outcome: &ExecutionOutcome, delay: Duration) {
        log::warn!(
            "{} attempt {}/{} failed (status {:?}); retrying in {:?}",
            outcome.program,
            attempt,
            max_attempts,
            outcome.status,
            delay
        );
    }
}

/// Run `attempt` until it produces something other than a tool error or the
/// policy is exhausted.
///
/// The closure receives the 1-indexed attempt number. The last outcome is
/// returned with its `attempts` field set; errors from the closure end the
/// loop immediately.
pub fn with_retry<F>(
    policy: &RetryPolicy,
    callback: &dyn RetryCallback,
    mut attempt: F,
) -> Result<ExecutionOutcome>
where
    F: FnMut(u32) -> Result<ExecutionOutcome>,
{
    let max = policy.attempts();
    let mut number = 1;
    loop {
        let mut outcome = attempt(number)?;
        outcome.attempts = number;

        if !outcome.result.is_tool_error() || number >= max {
            return Ok(outcome);
        }

        let delay = policy.delay_for_attempt(number - 1);
        callback.on_retry(number, max, &outcome, delay);
        thread::sleep(delay);
        number += 1;
    }
}
