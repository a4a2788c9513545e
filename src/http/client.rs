//! Paced HTTP transport with timeout and retry handling.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{Level, log, warn};
use reqwest::Client;
use reqwest::header::ACCEPT;
use std::time::Duration;

use super::pacing::PacingGate;
use super::retry::{RetryDecision, RetryPolicy, decide, network_retry_delay};
use super::{RawResponse, Transport};
use crate::config::ClientConfig;
use crate::error::JobMarketError;

/// HTTP client that paces, times out, and retries every request.
pub struct HttpClient {
    client: Client,
    pacing: PacingGate,
    policy: RetryPolicy,
    timeout: Duration,
    debug: bool,
}

impl HttpClient {
    /// Builds a reqwest client carrying the configured identification header.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::with_client(client, config))
    }

    /// Wraps an existing reqwest client.
    pub fn with_client(client: Client, config: &ClientConfig) -> Self {
        Self {
            client,
            pacing: PacingGate::new(config.min_request_delay),
            policy: RetryPolicy::new(config.max_retries, config.retry_delay),
            timeout: config.timeout,
            debug: config.debug,
        }
    }

    fn trace_level(&self) -> Level {
        if self.debug { Level::Info } else { Level::Debug }
    }

    /// Single attempt: one GET under the per-request deadline.
    async fn send_once(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> Result<RawResponse, JobMarketError> {
        let request = self
            .client
            .get(url)
            .query(query)
            .header(ACCEPT, "application/json");

        let attempt = async {
            let response = request.send().await?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>(RawResponse {
                status,
                headers,
                body,
            })
        };

        match tokio::time::timeout(self.timeout, attempt).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(JobMarketError::network(e)),
            Err(_) => Err(JobMarketError::timeout()),
        }
    }
}

#[async_trait]
impl Transport for HttpClient {
    #[tracing::instrument(skip(self, query))]
    async fn execute(&self, url: &str, query: &[(String, String)]) -> Result<RawResponse> {
        let level = self.trace_level();
        let max_attempts = self.policy.max_attempts();
        let mut attempt: u32 = 0;

        loop {
            self.pacing.acquire().await;
            log!(
                level,
                "GET {} {:?} (attempt {}/{})",
                url,
                query,
                attempt + 1,
                max_attempts
            );

            let delay = match self.send_once(url, query).await {
                Ok(response) => {
                    log!(level, "GET {} -> {}", url, response.status);
                    match decide(response.status, &response.headers, attempt, &self.policy) {
                        RetryDecision::Return => return Ok(response),
                        RetryDecision::RateLimited => {
                            return Err(JobMarketError::api(
                                response.status.as_u16(),
                                response.body,
                            )
                            .into());
                        }
                        RetryDecision::Retry(delay) => {
                            warn!(
                                "GET {}: HTTP {} on attempt {}/{}, retrying in {}ms...",
                                url,
                                response.status.as_u16(),
                                attempt + 1,
                                max_attempts,
                                delay.as_millis()
                            );
                            delay
                        }
                    }
                }
                Err(e) => match network_retry_delay(attempt, &self.policy) {
                    Some(delay) => {
                        warn!(
                            "GET {}: attempt {}/{} failed ({}), retrying in {}ms...",
                            url,
                            attempt + 1,
                            max_attempts,
                            e,
                            delay.as_millis()
                        );
                        delay
                    }
                    None => {
                        log!(level, "GET {}: giving up after {} attempts", url, attempt + 1);
                        return Err(e.into());
                    }
                },
            };

            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
