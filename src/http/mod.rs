//! HTTP transport: request pacing, per-attempt timeout and retry logic.

mod client;
mod pacing;
mod retry;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;

pub use client::HttpClient;
pub use pacing::PacingGate;
pub use retry::{
    MAX_RETRY_AFTER, RetryDecision, RetryPolicy, decide, network_retry_delay, parse_retry_after,
};

/// A fully read HTTP response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }
}

/// Executes a GET request and yields the raw response.
///
/// Implementations own pacing and retries; 404 and exhausted 5xx come back
/// as responses, rate limiting past the retry budget as an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, url: &str, query: &[(String, String)]) -> Result<RawResponse>;
}
