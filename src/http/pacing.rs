//! Minimum-interval gate shared by every request a client sends.

use log::debug;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};

/// Enforces a minimum gap between consecutive outbound requests.
///
/// The lock is held across the wait, so callers sharing one gate are
/// released one at a time, each at least `min_delay` after the previous.
#[derive(Debug)]
pub struct PacingGate {
    min_delay: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl PacingGate {
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            last_request: Mutex::new(None),
        }
    }

    /// Waits until the next request may be sent and records it as sent.
    /// Returns how long the caller was held back.
    pub async fn acquire(&self) -> Duration {
        let mut last = self.last_request.lock().await;

        let wait = match *last {
            Some(prev) => self.min_delay.saturating_sub(prev.elapsed()),
            None => Duration::ZERO,
        };

        if !wait.is_zero() {
            debug!("Pacing: waiting {}ms before next request", wait.as_millis());
            sleep(wait).await;
        }

        *last = Some(Instant::now());
        wait
    }
}
