//! Outbound request throttle
//!
//! Spaces backend requests at least [`MIN_REQUEST_INTERVAL`] apart across
//! every operation of a data access context.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Minimum spacing between two backend requests
pub const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(100);

/// Request spacing gate
///
/// Callers queue on the mutex, so concurrent acquirers are granted one after
/// another, each at least `min_interval` after the previous grant.
#[derive(Debug)]
pub struct RequestThrottle {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RequestThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval,
        }
    }

    /// Wait until a request may be sent, then record the grant
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let ready_at = last_time + self.min_interval;
            if Instant::now() < ready_at {
                tracing::debug!(
                    "Throttling backend request for {:?}",
                    ready_at - Instant::now()
                );
                tokio::time::sleep_until(ready_at).await;
            }
        }

        *last = Some(Instant::now());
    }
}

impl Default for RequestThrottle {
    fn default() -> Self {
        Self::new(MIN_REQUEST_INTERVAL)
    }
}
