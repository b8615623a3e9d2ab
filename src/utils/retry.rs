use std::fmt::Display;
use std::time::Duration;
use tracing::warn;

/// Errors that can report whether a retry might succeed.
///
/// Transient conditions (file in use, disk I/O, timeout) are retry-eligible;
/// everything else, including cancellation, surfaces on the first failure.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// Run `op` up to `attempts` times with a fixed delay between attempts.
///
/// Only errors classified as retryable are retried; the last error is
/// returned once attempts are exhausted.
pub fn with_retry<T, E, F>(attempts: u32, backoff: Duration, mut op: F) -> Result<T, E>
where
    E: Retryable + Display,
    F: FnMut() -> Result<T, E>,
{
    let attempts = attempts.max(1);

    for attempt in 1..=attempts {
        match op() {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < attempts => {
                warn!("attempt {attempt}/{attempts} failed, retrying: {e}");
                std::thread::sleep(backoff);
            }
            Err(e) => return Err(e),
        }
    }

    unreachable!("retry loop always returns")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct TestError {
        transient: bool,
    }

    impl Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "test error")
        }
    }

    impl Retryable for TestError {
        fn is_retryable(&self) -> bool {
            self.transient
        }
    }

    #[test]
    fn test_succeeds_first_try() {
        let mut calls = 0;
        let result: Result<u32, TestError> = with_retry(3, Duration::ZERO, || {
            calls += 1;
            Ok(7)
        });
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_retries_transient_until_success() {
        let mut calls = 0;
        let result: Result<u32, TestError> = with_retry(3, Duration::ZERO, || {
            calls += 1;
            if calls < 3 {
                Err(TestError { transient: true })
            } else {
                Ok(42)
            }
        });
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_permanent_error_fails_fast() {
        let mut calls = 0;
        let result: Result<u32, TestError> = with_retry(3, Duration::ZERO, || {
            calls += 1;
            Err(TestError { transient: false })
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_exhausts_attempts() {
        let mut calls = 0;
        let result: Result<u32, TestError> = with_retry(3, Duration::ZERO, || {
            calls += 1;
            Err(TestError { transient: true })
        });
        assert!(result.is_err());
        assert_eq!(calls, 3);
    }
}
