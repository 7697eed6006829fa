//! Bounded retry policy for transport attempts

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// How often and how patiently a failed request is retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,

    /// Pause between a failed attempt and the next one
    pub delay: Duration,
}

/// Final result of running an operation under a [`RetryPolicy`]
#[derive(Debug)]
pub enum RetryOutcome<T, E> {
    /// An attempt succeeded
    Success { value: T, attempts: u32 },

    /// Attempts were exhausted or a permanent error occurred
    Failed { error: E, attempts: u32 },

    /// The crawl was cancelled while waiting to retry
    Cancelled { attempts: u32 },
}

impl<T, E> RetryOutcome<T, E> {
    /// Number of attempts that were actually made
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Success { attempts, .. }
            | Self::Failed { attempts, .. }
            | Self::Cancelled { attempts } => *attempts,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// Total attempts allowed, the first one included
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Runs `operation` until it succeeds, fails permanently, or runs out of attempts
    ///
    /// `operation` receives the 1-based attempt number. An error is retried
    /// only while `is_retryable` accepts it. Cancellation is observed while
    /// sleeping between attempts; an attempt already running is never
    /// interrupted.
    pub async fn execute<T, E, F, Fut, R>(
        &self,
        cancel: &CancellationToken,
        is_retryable: R,
        mut operation: F,
    ) -> RetryOutcome<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        R: Fn(&E) -> bool,
        E: Display,
    {
        let max_attempts = self.max_attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;

            let error = match operation(attempt).await {
                Ok(value) => {
                    return RetryOutcome::Success {
                        value,
                        attempts: attempt,
                    }
                }
                Err(error) => error,
            };

            if attempt >= max_attempts || !is_retryable(&error) {
                return RetryOutcome::Failed {
                    error,
                    attempts: attempt,
                };
            }

            tracing::warn!(
                "Attempt {}/{} failed: {}, retrying in {:?}",
                attempt,
                max_attempts,
                error,
                self.delay
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return RetryOutcome::Cancelled { attempts: attempt },
                _ = tokio::time::sleep(self.delay) => {}
            }
        }
    }
}
