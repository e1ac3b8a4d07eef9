//! Retry/backoff policy for API requests

use rand::Rng;
use std::time::Duration;

use crate::error::ApiError;

/// Exponential backoff policy wrapped around each request
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total tries for transport and 5xx failures, including the first
    pub max_attempts: u32,
    /// Delay unit multiplied by `factor^n`
    pub base_delay: Duration,
    pub factor: u32,
    /// Upper bound on consecutive 429 sleeps for a single request
    pub max_rate_limit_waits: u32,
    /// Draw each delay uniformly from `[0, delay]`
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            factor: 2,
            max_rate_limit_waits: 10,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Policy that retries immediately; used where waiting is pointless
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            jitter: false,
            ..Self::default()
        }
    }

    /// Whether a failed attempt (1-based) should be followed by another one
    pub fn should_retry(&self, error: &ApiError, attempt: u32) -> bool {
        attempt < self.max_attempts && error.is_retryable()
    }

    /// Upper bound of the wait after failed attempt `attempt` (1-based): 2s, 4s, 8s, ...
    pub fn max_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(16);
        self.base_delay
            .saturating_mul(self.factor.saturating_pow(exponent))
    }

    /// Wait to apply after failed attempt `attempt`
    pub fn delay(&self, attempt: u32) -> Duration {
        let max = self.max_delay(attempt);
        if !self.jitter || max.is_zero() {
            return max;
        }
        let millis = max.as_millis().min(u64::MAX as u128) as u64;
        Duration::from_millis(rand::thread_rng().gen_range(0..=millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server_error() -> ApiError {
        ApiError::Server {
            url: "http://localhost/lead/".into(),
            status: 503,
            body: String::new(),
        }
    }

    #[test]
    fn test_backoff_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_delay(1), Duration::from_secs(2));
        assert_eq!(policy.max_delay(2), Duration::from_secs(4));
        assert_eq!(policy.max_delay(3), Duration::from_secs(8));
        assert_eq!(policy.max_delay(4), Duration::from_secs(16));
    }

    #[test]
    fn test_jitter_stays_within_bound() {
        let policy = RetryPolicy::default();
        for attempt in 1..5 {
            assert!(policy.delay(attempt) <= policy.max_delay(attempt));
        }
    }

    #[test]
    fn test_gives_up_after_max_attempts() {
        let policy = RetryPolicy::default();
        let err = server_error();
        assert!(policy.should_retry(&err, 1));
        assert!(policy.should_retry(&err, 4));
        assert!(!policy.should_retry(&err, 5));
    }

    #[test]
    fn test_never_retries_client_errors() {
        let policy = RetryPolicy::default();
        let err = ApiError::Client {
            url: "http://localhost/lead/".into(),
            status: 400,
            body: String::new(),
        };
        assert!(!policy.should_retry(&err, 1));
    }

    #[test]
    fn test_immediate_policy_has_no_delay() {
        let policy = RetryPolicy::immediate(3);
        assert_eq!(policy.delay(2), Duration::ZERO);
    }
}
