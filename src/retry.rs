//! Retry policy for remote calls.
//!
//! Every listing fetch, chart fetch and title translation is wrapped in the
//! build's `RetryStrategy`. The CLI uses `FixedDelay`; `NoRetry` makes a
//! single attempt.

use std::time::Duration;

use tracing::warn;

/// Trait for defining retry strategies.
pub trait RetryStrategy {
    /// Maximum number of attempts, including the first one.
    fn max_attempts(&self) -> u32;

    /// Delay after the given failed attempt (0-indexed).
    fn delay_for_attempt(&self, attempt: u32) -> Option<Duration>;

    /// Calls `f` up to `max_attempts()` times, sleeping `delay_for_attempt()`
    /// between failed attempts. Returns the last error once attempts run out.
    fn execute<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Result<T, E>,
        E: std::fmt::Display,
    {
        self.execute_if(f, |_| true)
    }

    /// Like `execute`, but an error for which `should_retry` is false is
    /// returned immediately.
    fn execute_if<T, E, F, P>(&self, mut f: F, should_retry: P) -> Result<T, E>
    where
        F: FnMut(u32) -> Result<T, E>,
        P: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        let max = self.max_attempts().max(1);
        let mut attempt = 0;

        loop {
            match f(attempt) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    if attempt + 1 >= max || !should_retry(&e) {
                        return Err(e);
                    }
                    warn!(attempt = attempt + 1, max, "attempt failed: {}", e);
                    if let Some(delay) = self.delay_for_attempt(attempt) {
                        std::thread::sleep(delay);
                    }
                    attempt += 1;
                }
            }
        }
    }
}

/// Fixed delay retry strategy: a constant wait between attempts, no backoff, no jitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedDelay {
    max_attempts: u32,
    delay: Duration,
}

impl FixedDelay {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl RetryStrategy for FixedDelay {
    fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    fn delay_for_attempt(&self, _attempt: u32) -> Option<Duration> {
        if self.delay.is_zero() {
            None
        } else {
            Some(self.delay)
        }
    }
}

/// Attempt once and return the result.
#[derive(Debug, Clone, Default)]
pub struct NoRetry;

impl NoRetry {
    pub fn new() -> Self {
        Self
    }
}

impl RetryStrategy for NoRetry {
    fn max_attempts(&self) -> u32 {
        1
    }

    fn delay_for_attempt(&self, _attempt: u32) -> Option<Duration> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_delay() {
        let strategy = FixedDelay::new(7, Duration::from_millis(500));

        assert_eq!(strategy.max_attempts(), 7);
        assert_eq!(
            strategy.delay_for_attempt(0),
            Some(Duration::from_millis(500))
        );
        assert_eq!(
            strategy.delay_for_attempt(5),
            Some(Duration::from_millis(500))
        );
    }

    #[test]
    fn test_zero_delay_skips_sleep() {
        let strategy = FixedDelay::new(3, Duration::ZERO);
        assert_eq!(strategy.delay_for_attempt(0), None);
    }

    #[test]
    fn test_execute_success_after_retry() {
        let strategy = FixedDelay::new(3, Duration::from_millis(1));
        let mut attempts = 0;
        let result: Result<i32, &str> = strategy.execute(|_| {
            attempts += 1;
            if attempts < 3 { Err("not yet") } else { Ok(42) }
        });
        assert_eq!(result, Ok(42));
        assert_eq!(attempts, 3);
    }

    #[test]
    fn test_execute_all_failures() {
        let strategy = FixedDelay::new(3, Duration::from_millis(1));
        let mut attempts = 0;
        let result: Result<i32, &str> = strategy.execute(|_| {
            attempts += 1;
            Err("always fails")
        });
        assert_eq!(result, Err("always fails"));
        assert_eq!(attempts, 3);
    }

    #[test]
    fn test_execute_passes_attempt_index() {
        let strategy = FixedDelay::new(4, Duration::ZERO);
        let mut seen = Vec::new();
        let _: Result<(), &str> = strategy.execute(|attempt| {
            seen.push(attempt);
            Err("fail")
        });
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_execute_if_stops_on_permanent_error() {
        let strategy = FixedDelay::new(5, Duration::ZERO);
        let mut attempts = 0;
        let result: Result<i32, &str> = strategy.execute_if(
            |_| {
                attempts += 1;
                if attempts == 1 { Err("transient") } else { Err("permanent") }
            },
            |e| *e == "transient",
        );
        assert_eq!(result, Err("permanent"));
        assert_eq!(attempts, 2);
    }

    #[test]
    fn test_no_retry_execute() {
        let strategy = NoRetry::new();
        let mut attempts = 0;
        let result: Result<i32, &str> = strategy.execute(|_| {
            attempts += 1;
            Err("failed")
        });
        assert_eq!(result, Err("failed"));
        assert_eq!(attempts, 1);
    }
}
