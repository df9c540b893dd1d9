use std::time::Duration;

/// Classification of a single attempt's outcome for retry purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Response with status below 429 (success, 409 and other client errors).
    Terminal,
    /// 429 Too Many Requests.
    Throttled,
    /// Any other status at or above 429 (5xx and the rest).
    Retryable(u16),
    /// Transport error of the timeout class.
    Timeout,
    /// Any other transport error (refused, DNS, malformed request).
    Fatal,
}

impl ErrorKind {
    /// True for the kinds the engine absorbs by retrying.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            ErrorKind::Throttled | ErrorKind::Retryable(_) | ErrorKind::Timeout
        )
    }
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Stop and hand the current outcome to the caller.
    NoRetry,
    /// Retry after the given backoff (jitter not included).
    RetryAfter(Duration),
}

/// Exponential backoff policy: `base_delay * exponential_base^attempt`.
///
/// Immutable for the lifetime of a client. `max_retries` counts retries, so
/// a call makes at most `max_retries + 1` attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub exponential_base: f64,
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            exponential_base: 1.5,
            max_jitter: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Backoff before attempt number `attempt` (0-based), without jitter.
    /// Non-decreasing in `attempt`; bases below 1.0 are treated as 1.0.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let base = if self.exponential_base.is_finite() {
            self.exponential_base.max(1.0)
        } else {
            1.0
        };
        let exp = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = self.base_delay.as_secs_f64() * base.powi(exp);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }

    /// Decide what to do after attempt number `attempt` (0-based) ended as `kind`.
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if !kind.is_retryable() || attempt >= self.max_retries {
            return RetryDecision::NoRetry;
        }
        RetryDecision::RetryAfter(self.backoff(attempt + 1))
    }
}
