//! Error taxonomy for the job marketplace client.
//!
//! Every public operation returns `anyhow::Result`; failures originating in
//! this crate carry a [`JobMarketError`] that callers recover with
//! `downcast_ref` (or [`JobMarketError::kind_of`]) to decide whether to retry,
//! report, or abort.

use std::fmt;

/// Coarse classification of a [`JobMarketError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Api,
    Network,
}

/// Errors raised by the client.
#[derive(Debug)]
pub enum JobMarketError {
    /// Caller input or a decoded response has the wrong shape. Never retried.
    Validation(String),
    /// The service answered with a non-2xx status after any applicable retries.
    Api { status: u16, body: String },
    /// Transport-level failure (timeout, DNS, connection) after retries.
    Network {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl JobMarketError {
    pub fn validation(msg: impl Into<String>) -> Self {
        JobMarketError::Validation(msg.into())
    }

    pub fn api(status: u16, body: impl Into<String>) -> Self {
        JobMarketError::Api {
            status,
            body: body.into(),
        }
    }

    /// The per-attempt deadline elapsed before the response was read.
    pub fn timeout() -> Self {
        JobMarketError::Network {
            message: "timeout".to_string(),
            source: None,
        }
    }

    pub fn network(err: reqwest::Error) -> Self {
        JobMarketError::Network {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            JobMarketError::Validation(_) => ErrorKind::Validation,
            JobMarketError::Api { .. } => ErrorKind::Api,
            JobMarketError::Network { .. } => ErrorKind::Network,
        }
    }

    /// Returns the kind of the first `JobMarketError` in the chain, if any.
    pub fn kind_of(err: &anyhow::Error) -> Option<ErrorKind> {
        err.chain()
            .find_map(|e| e.downcast_ref::<JobMarketError>())
            .map(JobMarketError::kind)
    }

    /// HTTP status carried by an `Api` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            JobMarketError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for JobMarketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobMarketError::Validation(msg) => write!(f, "Validation error: {}", msg),
            JobMarketError::Api { status, body } => {
                if body.is_empty() {
                    write!(f, "API error: HTTP {}", status)
                } else {
                    write!(f, "API error: HTTP {}: {}", status, body)
                }
            }
            JobMarketError::Network { message, .. } => write!(f, "Network error: {}", message),
        }
    }
}

impl std::error::Error for JobMarketError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            JobMarketError::Network {
                source: Some(source),
                ..
            } => Some(source.as_ref() as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}
