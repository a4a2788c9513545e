//! Client configuration.

use anyhow::{Context, Result};
use log::debug;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.jobmarket.dev";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;
pub const DEFAULT_MIN_REQUEST_DELAY_MS: u64 = 100;

/// Identification string sent as `User-Agent` unless overridden.
pub fn default_user_agent() -> String {
    format!("jobmarket-rs/{}", env!("JOBMARKET_VERSION"))
}

/// Settings fixed at client construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub user_agent: String,
    /// Deadline for a single attempt, body included.
    pub timeout: Duration,
    /// Retries after the first attempt; total tries = `max_retries + 1`.
    pub max_retries: u32,
    /// Base of the exponential backoff.
    pub retry_delay: Duration,
    /// Minimum gap between two outbound requests.
    pub min_request_delay: Duration,
    pub debug: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: default_user_agent(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            min_request_delay: Duration::from_millis(DEFAULT_MIN_REQUEST_DELAY_MS),
            debug: false,
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn with_min_request_delay(mut self, min_request_delay: Duration) -> Self {
        self.min_request_delay = min_request_delay;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Defaults overlaid with `JOBMARKET_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("JOBMARKET_BASE_URL") {
            config = config.with_base_url(url);
        }
        if let Some(ua) = lookup("JOBMARKET_USER_AGENT") {
            config.user_agent = ua;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "JOBMARKET_TIMEOUT_MS")? {
            config.timeout = Duration::from_millis(ms);
        }
        if let Some(n) = parse_var::<u32>(&lookup, "JOBMARKET_MAX_RETRIES")? {
            config.max_retries = n;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "JOBMARKET_RETRY_DELAY_MS")? {
            config.retry_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "JOBMARKET_MIN_REQUEST_DELAY_MS")? {
            config.min_request_delay = Duration::from_millis(ms);
        }
        if let Some(flag) = lookup("JOBMARKET_DEBUG") {
            config.debug = matches!(flag.to_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }

        debug!("Client configuration: {:?}", config);
        Ok(config)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("Invalid value for {}: {:?}", key, raw))
        })
        .transpose()
}
