// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::{CollaboratorError, LifecycleError};
use crate::observability::messages::lifecycle::RetryAttemptFailed;
use crate::observability::messages::StructuredLog;
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct RetryOptions {
    /// Total attempts, including the first.
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub backoff_factor: f64,
}

impl RetryOptions {
    /// Sleep before each retry: `initial_delay`, then multiplied by `backoff_factor` each time.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        std::iter::successors(Some(self.initial_delay), move |delay| {
            Some(self.next_delay(*delay))
        })
        .take(self.max_retries.saturating_sub(1) as usize)
    }

    /// `delay` scaled by `backoff_factor`. A negative or NaN factor, or a
    /// product too large for a `Duration`, keeps `delay` unchanged.
    fn next_delay(&self, delay: Duration) -> Duration {
        Duration::try_from_secs_f64(delay.as_secs_f64() * self.backoff_factor).unwrap_or(delay)
    }
}

/// Run `operation` until it succeeds or `max_retries` attempts have failed.
///
/// Only the last error is returned. A `max_retries` of zero still makes one attempt.
pub async fn retry_with_backoff<T, F, Fut>(
    options: &RetryOptions,
    mut operation: F,
) -> Result<T, LifecycleError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CollaboratorError>>,
{
    let attempts = options.max_retries.max(1);
    let mut delay = options.initial_delay;
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(last_error) if attempt >= attempts => {
                return Err(LifecycleError::RetryExhausted {
                    attempts,
                    last_error,
                });
            }
            Err(error) => {
                RetryAttemptFailed {
                    attempt,
                    max_retries: attempts,
                    delay,
                    error: &error.to_string(),
                }
                .log();
                tokio::time::sleep(delay).await;
                delay = options.next_delay(delay);
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn options(max_retries: u32) -> RetryOptions {
        RetryOptions {
            max_retries,
            initial_delay: Duration::from_millis(100),
            backoff_factor: 2.0,
        }
    }

    #[test]
    fn test_delay_schedule() {
        let delays: Vec<Duration> = options(4).delays().collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(400)
            ]
        );
        assert_eq!(options(1).delays().count(), 0);
    }

    #[test]
    fn test_unusable_backoff_factor_keeps_delay() {
        for backoff_factor in [-1.0, f64::NAN, f64::INFINITY] {
            let options = RetryOptions {
                backoff_factor,
                ..options(4)
            };
            let delays: Vec<Duration> = options.delays().collect();
            assert_eq!(delays, vec![Duration::from_millis(100); 3], "{backoff_factor}");
        }

        let huge = RetryOptions {
            max_retries: 3,
            initial_delay: Duration::MAX,
            backoff_factor: 2.0,
        };
        assert_eq!(huge.delays().last(), Some(Duration::MAX));
    }

    #[tokio::test(start_paused = true)]
    async fn test_negative_and_nan_factors_still_retry() {
        for backoff_factor in [-1.0, f64::NAN] {
            let calls = AtomicU32::new(0);
            let counter = &calls;
            let options = RetryOptions {
                max_retries: 3,
                initial_delay: Duration::from_millis(1),
                backoff_factor,
            };

            let result: Result<(), _> = retry_with_backoff(&options, || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(CollaboratorError::new("down"))
            })
            .await;

            assert_eq!(calls.load(Ordering::SeqCst), 3);
            assert!(matches!(result, Err(LifecycleError::RetryExhausted { attempts: 3, .. })));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_two_failures() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let started = Instant::now();

        let result = retry_with_backoff(&options(3), || async move {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            if n < 3 {
                Err(CollaboratorError::new(format!("attempt {n} failed")))
            } else {
                Ok(n)
            }
        })
        .await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 100ms then 200ms of backoff
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(300), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(310), "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_returns_last_error() {
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result: Result<(), _> = retry_with_backoff(&options(3), || async move {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            Err(CollaboratorError::new(format!("failure {n}")))
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            result,
            Err(LifecycleError::RetryExhausted {
                attempts: 3,
                last_error: CollaboratorError::new("failure 3"),
            })
        );
    }

    #[tokio::test]
    async fn test_zero_retries_still_attempts_once() {
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result = retry_with_backoff(&options(0), || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, CollaboratorError>("done")
        })
        .await;

        assert_eq!(result, Ok("done"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
