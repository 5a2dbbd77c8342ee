//! Bounded retry with a configurable backoff between attempts.
//!
//! The server wraps dispatch in a fixed 3 x 1 s policy. Dispatch is pure, so
//! a rejected input fails the same way on every attempt and the caller sees
//! the error roughly two seconds later than it could. That added latency is
//! part of the observable contract and is kept as is.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

/// Delay schedule between consecutive attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// The same delay after every failed attempt.
    Fixed(Duration),
    /// `base * 2^(attempt - 1)` after failed attempt number `attempt`.
    Exponential { base: Duration },
}

impl Backoff {
    /// Returns the delay to wait after failed attempt number `attempt` (1-based).
    #[must_use]
    pub fn delay_after(self, attempt: u32) -> Duration {
        match self {
            Backoff::Fixed(delay) => delay,
            Backoff::Exponential { base } => {
                let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
                base.saturating_mul(factor)
            }
        }
    }
}

/// Runs an async operation up to `max_attempts` times.
///
/// Attempting -> Succeeded on the first `Ok`; after a failure the policy
/// sleeps for the backoff delay and tries again, until the attempt counter
/// reaches `max_attempts` (ExhaustedFailed), at which point the last error is
/// returned unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Backoff,
}

impl RetryPolicy {
    /// Policy with a fixed delay. `max_attempts` is clamped to at least 1.
    #[must_use]
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff: Backoff::Fixed(delay),
        }
    }

    /// Policy with exponentially growing delays. `max_attempts` is clamped to at least 1.
    #[must_use]
    pub fn exponential(max_attempts: u32, base: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff: Backoff::Exponential { base },
        }
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub fn backoff(&self) -> Backoff {
        self.backoff
    }

    /// Calls `attempt_fn` with the 1-based attempt number until it succeeds
    /// or the attempts are used up.
    ///
    /// The delay is a `tokio::time::sleep`, so it only suspends the calling
    /// task.
    ///
    /// # Errors
    ///
    /// Returns the error of the last attempt once all attempts have failed.
    pub async fn run<T, E, F, Fut>(&self, mut attempt_fn: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let mut attempt = 1;
        loop {
            match attempt_fn(attempt).await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(attempt, "attempt succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) if attempt < self.max_attempts => {
                    let delay = self.backoff.delay_after(attempt);
                    #[allow(clippy::cast_possible_truncation)]
                    let delay_ms = delay.as_millis() as u64;
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms,
                        error = %err,
                        "attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    warn!(attempts = attempt, error = %err, "retry attempts exhausted");
                    return Err(err);
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(3, Duration::from_secs(1))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use tokio::time::Instant;

    use super::*;

    #[test]
    fn fixed_backoff_is_constant() {
        let backoff = Backoff::Fixed(Duration::from_millis(1000));
        assert_eq!(backoff.delay_after(1), Duration::from_millis(1000));
        assert_eq!(backoff.delay_after(2), Duration::from_millis(1000));
    }

    #[test]
    fn exponential_backoff_doubles() {
        let backoff = Backoff::Exponential {
            base: Duration::from_secs(1),
        };
        assert_eq!(backoff.delay_after(1), Duration::from_secs(1));
        assert_eq!(backoff.delay_after(2), Duration::from_secs(2));
        assert_eq!(backoff.delay_after(3), Duration::from_secs(4));
    }

    #[test]
    fn default_is_three_attempts_one_second_apart() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.backoff(), Backoff::Fixed(Duration::from_secs(1)));
    }

    #[test]
    fn zero_attempts_clamped_to_one() {
        assert_eq!(RetryPolicy::fixed(0, Duration::ZERO).max_attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn success_returns_without_delay() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result: Result<u32, String> = RetryPolicy::default()
            .run(|attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { Ok(attempt) }
            })
            .await;

        assert_eq!(result, Ok(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn persistent_failure_tries_three_times_and_waits_two_seconds() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result: Result<(), String> = RetryPolicy::default()
            .run(|attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { Err(format!("failure {attempt}")) }
            })
            .await;

        // The last error surfaces unchanged.
        assert_eq!(result, Err("failure 3".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(start.elapsed() >= Duration::from_millis(2000));
        assert!(start.elapsed() < Duration::from_millis(2100));
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_on_later_attempt() {
        let start = Instant::now();

        let result: Result<u32, String> = RetryPolicy::default()
            .run(|attempt| async move {
                if attempt < 2 {
                    Err("transient".to_string())
                } else {
                    Ok(attempt)
                }
            })
            .await;

        assert_eq!(result, Ok(2));
        assert!(start.elapsed() >= Duration::from_millis(1000));
        assert!(start.elapsed() < Duration::from_millis(1100));
    }

    #[tokio::test(start_paused = true)]
    async fn exponential_policy_waits_one_then_two_seconds() {
        let start = Instant::now();

        let result: Result<(), &str> = RetryPolicy::exponential(3, Duration::from_secs(1))
            .run(|_| async { Err("down") })
            .await;

        assert_eq!(result, Err("down"));
        assert!(start.elapsed() >= Duration::from_secs(3));
        assert!(start.elapsed() < Duration::from_millis(3100));
    }
}
