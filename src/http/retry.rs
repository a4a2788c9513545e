//! Retry decisions for the transport: which responses are retried and how
//! long to back off before the next attempt.

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use std::time::Duration;

/// Longest wait a `Retry-After` header can impose.
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(120);

/// Retry budget and backoff base, shared by every failure cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            max_retries,
            retry_delay,
        }
    }

    /// Whether another try is allowed after attempt `attempt` (0-based) failed.
    pub fn attempts_remain(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }

    /// Total number of tries this policy allows.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// `retry_delay * 2^attempt`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.retry_delay.saturating_mul(factor)
    }
}

/// What the transport should do with a response it just received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Hand the response to the caller as-is.
    Return,
    /// Wait, then try again.
    Retry(Duration),
    /// Rate limited with no budget left.
    RateLimited,
}

/// Decides the fate of a response received on attempt `attempt`.
pub fn decide(
    status: StatusCode,
    headers: &HeaderMap,
    attempt: u32,
    policy: &RetryPolicy,
) -> RetryDecision {
    if status == StatusCode::TOO_MANY_REQUESTS {
        if !policy.attempts_remain(attempt) {
            return RetryDecision::RateLimited;
        }
        let delay = parse_retry_after(headers).unwrap_or_else(|| policy.backoff(attempt));
        return RetryDecision::Retry(delay);
    }

    // 5xx responses are returned untouched once the budget is spent
    if status.is_server_error() && policy.attempts_remain(attempt) {
        return RetryDecision::Retry(policy.backoff(attempt));
    }

    RetryDecision::Return
}

/// Delay before retrying a transport failure, or `None` when exhausted.
pub fn network_retry_delay(attempt: u32, policy: &RetryPolicy) -> Option<Duration> {
    policy
        .attempts_remain(attempt)
        .then(|| policy.backoff(attempt))
}

/// Reads a `Retry-After` header expressed in seconds.
///
/// HTTP-date values are not supported and yield `None`. Values above
/// [`MAX_RETRY_AFTER`] are clamped to it.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let raw = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    let secs = raw.parse::<f64>().ok()?;
    if !secs.is_finite() || secs < 0.0 {
        return None;
    }
    let secs = secs.min(MAX_RETRY_AFTER.as_secs_f64());
    Some(Duration::from_millis((secs * 1000.0).round() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(max_retries, Duration::from_millis(100))
    }

    fn retry_after(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_backoff_doubles_per_attempt() {
        let p = policy(5);
        assert_eq!(p.backoff(0), Duration::from_millis(100));
        assert_eq!(p.backoff(1), Duration::from_millis(200));
        assert_eq!(p.backoff(2), Duration::from_millis(400));
        assert_eq!(p.backoff(3), Duration::from_millis(800));
    }

    #[test]
    fn test_backoff_saturates() {
        let p = RetryPolicy::new(100, Duration::from_secs(1));
        assert!(p.backoff(64) >= p.backoff(31));
    }

    #[test]
    fn test_attempt_budget() {
        let p = policy(2);
        assert_eq!(p.max_attempts(), 3);
        assert!(p.attempts_remain(0));
        assert!(p.attempts_remain(1));
        assert!(!p.attempts_remain(2));

        assert!(!policy(0).attempts_remain(0));
    }

    #[test]
    fn test_rate_limited_uses_backoff_without_header() {
        let p = policy(3);
        let decision = decide(StatusCode::TOO_MANY_REQUESTS, &HeaderMap::new(), 1, &p);
        assert_eq!(decision, RetryDecision::Retry(Duration::from_millis(200)));
    }

    #[test]
    fn test_rate_limited_honors_retry_after() {
        let p = policy(3);
        let decision = decide(StatusCode::TOO_MANY_REQUESTS, &retry_after("2"), 0, &p);
        assert_eq!(decision, RetryDecision::Retry(Duration::from_secs(2)));
    }

    #[test]
    fn test_rate_limited_exhausted() {
        let p = policy(2);
        let decision = decide(StatusCode::TOO_MANY_REQUESTS, &retry_after("1"), 2, &p);
        assert_eq!(decision, RetryDecision::RateLimited);
    }

    #[test]
    fn test_server_error_retried_then_returned() {
        let p = policy(1);
        assert_eq!(
            decide(StatusCode::BAD_GATEWAY, &HeaderMap::new(), 0, &p),
            RetryDecision::Retry(Duration::from_millis(100))
        );
        assert_eq!(
            decide(StatusCode::BAD_GATEWAY, &HeaderMap::new(), 1, &p),
            RetryDecision::Return
        );
    }

    #[test]
    fn test_server_error_ignores_retry_after() {
        let p = policy(3);
        assert_eq!(
            decide(StatusCode::SERVICE_UNAVAILABLE, &retry_after("30"), 2, &p),
            RetryDecision::Retry(Duration::from_millis(400))
        );
    }

    #[test]
    fn test_client_errors_and_success_returned() {
        let p = policy(3);
        for status in [
            StatusCode::OK,
            StatusCode::NOT_FOUND,
            StatusCode::BAD_REQUEST,
            StatusCode::FORBIDDEN,
        ] {
            assert_eq!(
                decide(status, &HeaderMap::new(), 0, &p),
                RetryDecision::Return
            );
        }
    }

    #[test]
    fn test_network_retry_delay() {
        let p = policy(2);
        assert_eq!(network_retry_delay(0, &p), Some(Duration::from_millis(100)));
        assert_eq!(network_retry_delay(1, &p), Some(Duration::from_millis(200)));
        assert_eq!(network_retry_delay(2, &p), None);
    }

    #[test]
    fn test_parse_retry_after() {
        assert_eq!(parse_retry_after(&retry_after("3")), Some(Duration::from_secs(3)));
        assert_eq!(parse_retry_after(&retry_after(" 0 ")), Some(Duration::ZERO));
        assert_eq!(
            parse_retry_after(&retry_after("1.5")),
            Some(Duration::from_millis(1500))
        );
        assert_eq!(parse_retry_after(&retry_after("-1")), None);
        assert_eq!(
            parse_retry_after(&retry_after("Wed, 21 Oct 2015 07:28:00 GMT")),
            None
        );
        assert_eq!(parse_retry_after(&HeaderMap::new()), None);
    }

    #[test]
    fn test_parse_retry_after_is_capped() {
        assert_eq!(parse_retry_after(&retry_after("1e20")), Some(MAX_RETRY_AFTER));
        assert_eq!(parse_retry_after(&retry_after("86400")), Some(MAX_RETRY_AFTER));
        assert_eq!(parse_retry_after(&retry_after("inf")), None);

        let p = policy(3);
        assert_eq!(
            decide(StatusCode::TOO_MANY_REQUESTS, &retry_after("99999999"), 0, &p),
            RetryDecision::Retry(MAX_RETRY_AFTER)
        );
    }
}
