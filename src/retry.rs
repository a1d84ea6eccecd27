//! Retry policy for the dispatcher.
//!
//! Backends report a failure once; the dispatcher decides whether to try
//! again and how long to back off between attempts. The calling thread
//! sleeps through the backoff, so this is only used from blocking code.

use std::iter;
use std::thread::sleep;
use std::time::Duration;
use tracing::{debug, warn};

/// How often, and how patiently, a failed translation is retried.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Attempts in total, the first one included
    pub max_attempts: u32,
    /// Pause before the second attempt
    pub initial_delay: Duration,
    /// Upper bound for any single pause
    pub max_delay: Duration,
    /// Growth factor applied to the pause after every failed retry
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
        }
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// One attempt, no retry.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Policy used by the binary: 200ms, 400ms, ... capped at 2s.
    /// Zero attempts is read as one.
    pub fn backend(max_attempts: u32) -> Self {
        Self::new(max_attempts.max(1), Duration::from_millis(200))
            .with_max_delay(Duration::from_secs(2))
    }

    /// Pauses between consecutive attempts (`max_attempts - 1` of them).
    pub fn backoff(&self) -> impl Iterator<Item = Duration> + '_ {
        let retries = self.max_attempts.saturating_sub(1) as usize;
        iter::successors(Some(self.initial_delay.min(self.max_delay)), move |prev| {
            let next = prev.as_secs_f64() * self.backoff_multiplier;
            Some(
                Duration::try_from_secs_f64(next)
                    .unwrap_or(self.max_delay)
                    .min(self.max_delay),
            )
        })
        .take(retries)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::none()
    }
}

/// Run `operation` until it succeeds, fails with an error `should_retry`
/// rejects, or the attempts run out. The last error is returned.
///
/// # Panics
/// Panics if `config.max_attempts` is 0
pub fn with_retry_if<T, E, F, P>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
    should_retry: P,
) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    assert!(
        config.max_attempts >= 1,
        "RetryConfig.max_attempts must be >= 1, got {}",
        config.max_attempts
    );

    let mut pauses = config.backoff();
    let mut attempt = 1;
    loop {
        let error = match operation() {
            Ok(result) => {
                if attempt > 1 {
                    debug!("{}: succeeded on attempt {}", operation_name, attempt);
                }
                return Ok(result);
            }
            Err(e) => e,
        };

        if !should_retry(&error) {
            debug!("{}: not retrying: {}", operation_name, error);
            return Err(error);
        }

        let Some(pause) = pauses.next() else {
            if config.max_attempts > 1 {
                warn!(
                    "{}: giving up after {} attempts: {}",
                    operation_name, config.max_attempts, error
                );
            }
            return Err(error);
        };

        warn!(
            "{}: attempt {}/{} failed ({}), retrying in {:?}",
            operation_name, attempt, config.max_attempts, error, pause
        );
        sleep(pause);
        attempt += 1;
    }
}
