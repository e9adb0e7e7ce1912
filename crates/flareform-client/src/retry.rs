//! Retry policy with bounded exponential backoff

use std::time::Duration;

/// Retry configuration for API calls.
///
/// Only transport failures and transient statuses are retried; an API
/// response reporting `success: false` is a final answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Smallest delay between attempts.
    pub min_backoff: Duration,
    /// Largest delay between attempts.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            min_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, min_backoff_secs: u32, max_backoff_secs: u32) -> Self {
        Self {
            max_retries,
            min_backoff: Duration::from_secs(min_backoff_secs as u64),
            max_backoff: Duration::from_secs(max_backoff_secs as u64),
        }
    }

    /// Delay before retry number `attempt` (0-based): `min * 2^attempt`,
    /// clamped to `[min, max]`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        let delay = self.min_backoff.saturating_mul(factor);
        delay.min(self.max_backoff).max(self.min_backoff.min(self.max_backoff))
    }

    /// Whether an HTTP status is worth retrying.
    pub fn is_retryable_status(status: reqwest::StatusCode) -> bool {
        status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
    }

    /// Whether a transport-level failure is worth retrying, including a
    /// response body cut off mid-read.
    pub fn is_retryable_error(err: &reqwest::Error) -> bool {
        err.is_timeout() || err.is_connect() || err.is_request() || err.is_body() || err.is_decode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_delay_grows_exponentially() {
        let policy = RetryPolicy::new(5, 1, 30);
        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for(4), Duration::from_secs(16));
    }

    #[test]
    fn test_delay_is_capped() {
        let policy = RetryPolicy::new(10, 1, 30);
        assert_eq!(policy.delay_for(5), Duration::from_secs(30));
        assert_eq!(policy.delay_for(63), Duration::from_secs(30));
        assert_eq!(policy.delay_for(u32::MAX), Duration::from_secs(30));
    }

    #[test]
    fn test_inverted_bounds_never_exceed_max() {
        let policy = RetryPolicy::new(3, 10, 5);
        assert_eq!(policy.delay_for(0), Duration::from_secs(5));
        assert_eq!(policy.delay_for(3), Duration::from_secs(5));
    }

    #[test]
    fn test_zero_backoff() {
        let policy = RetryPolicy::new(3, 0, 0);
        assert_eq!(policy.delay_for(2), Duration::ZERO);
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(RetryPolicy::is_retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(RetryPolicy::is_retryable_status(StatusCode::BAD_GATEWAY));
        assert!(RetryPolicy::is_retryable_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!RetryPolicy::is_retryable_status(StatusCode::BAD_REQUEST));
        assert!(!RetryPolicy::is_retryable_status(StatusCode::FORBIDDEN));
        assert!(!RetryPolicy::is_retryable_status(StatusCode::NOT_FOUND));
    }
}
