//! Bounded retries for fallible async work.

use std::{fmt::Display, future::Future, time::Duration};

use tracing::warn;

/// How many times to attempt an operation and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    retry_delay: Duration,
    exponential_backoff: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(1000), true)
    }
}

impl RetryPolicy {
    /// `max_retries` is the total attempt count and is clamped to at least 1.
    pub fn new(max_retries: u32, retry_delay: Duration, exponential_backoff: bool) -> Self {
        Self {
            max_retries: max_retries.max(1),
            retry_delay,
            exponential_backoff,
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Sleep before the attempt following failed attempt `attempt` (1-based).
    ///
    /// Exponential: `retry_delay * 2^(attempt-1)`; otherwise flat `retry_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if !self.exponential_backoff {
            return self.retry_delay;
        }
        let factor = 1u32
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.retry_delay.saturating_mul(factor)
    }

    /// Runs `op(attempt)` until it succeeds or `max_retries` attempts failed.
    ///
    /// The error of the last attempt is returned unchanged.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(v) => return Ok(v),
                Err(e) if attempt < self.max_retries => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        attempt,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    };
    use tokio::time::Instant;

    #[test]
    fn exponential_and_flat_delays() {
        let exp = RetryPolicy::new(5, Duration::from_millis(100), true);
        assert_eq!(exp.delay_for(1), Duration::from_millis(100));
        assert_eq!(exp.delay_for(2), Duration::from_millis(200));
        assert_eq!(exp.delay_for(4), Duration::from_millis(800));

        let flat = RetryPolicy::new(5, Duration::from_millis(100), false);
        assert_eq!(flat.delay_for(4), Duration::from_millis(100));
    }

    #[test]
    fn zero_retries_means_one_attempt() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO, false).max_retries(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let policy = RetryPolicy::new(3, Duration::from_millis(100), true);
        let started = Instant::now();

        let out = policy
            .run(|attempt| async move {
                if attempt < 3 {
                    Err(format!("boom {attempt}"))
                } else {
                    Ok(attempt)
                }
            })
            .await;

        assert_eq!(out, Ok(3));
        // 100ms after the first failure, 200ms after the second.
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(300), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(400), "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn last_error_propagates_after_exhaustion() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(4, Duration::from_millis(10), false);

        let out: Result<(), String> = policy
            .run(|attempt| {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(format!("fail {attempt}"))
                }
            })
            .await;

        assert_eq!(out, Err("fail 4".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn large_retry_counts_do_not_grow_the_stack() {
        let policy = RetryPolicy::new(10_000, Duration::ZERO, false);
        let out: Result<(), u32> = policy.run(|attempt| async move { Err(attempt) }).await;
        assert_eq!(out, Err(10_000));
    }
}
