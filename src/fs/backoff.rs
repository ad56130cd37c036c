//! Bounded exponential backoff for transient I/O errors

use crate::error::Result;
use std::time::Duration;
use tracing::debug;

/// Upper bound for a single delay
const MAX_DELAY: Duration = Duration::from_secs(5);

/// Doubling delay sequence with a fixed number of attempts
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    next: Duration,
    remaining: u32,
}

impl ExponentialBackoff {
    /// Create a backoff yielding at most `max_retries` delays, starting at `base_delay_ms`
    pub fn new(base_delay_ms: u64, max_retries: u32) -> Self {
        ExponentialBackoff {
            next: Duration::from_millis(base_delay_ms).min(MAX_DELAY),
            remaining: max_retries,
        }
    }

    /// Delay before the next attempt, or `None` once retries are exhausted
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let delay = self.next;
        self.next = (self.next * 2).min(MAX_DELAY);
        Some(delay)
    }
}

/// Run `op`, retrying while it fails with a transient error
pub fn retry<T, F>(what: &str, mut backoff: ExponentialBackoff, mut op: F) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    loop {
        match op() {
            Err(e) if e.is_transient() => match backoff.next_delay() {
                Some(delay) => {
                    debug!("{} failed, retrying in {:?}: {}", what, delay, e);
                    std::thread::sleep(delay);
                }
                None => return Err(e),
            },
            result => return result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::io;

    #[test]
    fn test_delays_double_and_stop() {
        let mut backoff = ExponentialBackoff::new(10, 3);

        assert_eq!(backoff.next_delay(), Some(Duration::from_millis(10)));
        assert_eq!(backoff.next_delay(), Some(Duration::from_millis(20)));
        assert_eq!(backoff.next_delay(), Some(Duration::from_millis(40)));
        assert_eq!(backoff.next_delay(), None);
    }

    #[test]
    fn test_delay_capped() {
        let mut backoff = ExponentialBackoff::new(4_000, 3);

        assert_eq!(backoff.next_delay(), Some(Duration::from_millis(4_000)));
        assert_eq!(backoff.next_delay(), Some(MAX_DELAY));
        assert_eq!(backoff.next_delay(), Some(MAX_DELAY));
    }

    #[test]
    fn test_zero_retries() {
        let mut backoff = ExponentialBackoff::new(10, 0);
        assert_eq!(backoff.next_delay(), None);
    }

    #[test]
    fn test_retry_recovers_from_transient() {
        let mut calls = 0;
        let result = retry("read", ExponentialBackoff::new(1, 3), || {
            calls += 1;
            if calls < 3 {
                Err(Error::Io(io::Error::new(io::ErrorKind::Interrupted, "signal")))
            } else {
                Ok(calls)
            }
        });

        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn test_retry_gives_up() {
        let mut calls = 0;
        let result: Result<()> = retry("read", ExponentialBackoff::new(1, 2), || {
            calls += 1;
            Err(Error::Io(io::Error::new(io::ErrorKind::TimedOut, "slow")))
        });

        assert!(result.is_err());
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_retry_skips_permanent_errors() {
        let mut calls = 0;
        let result: Result<()> = retry("read", ExponentialBackoff::new(1, 5), || {
            calls += 1;
            Err(Error::Io(io::Error::new(io::ErrorKind::NotFound, "gone")))
        });

        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}
