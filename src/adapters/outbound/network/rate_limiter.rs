use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Enforces a minimum interval between consecutive requests.
///
/// Callers queue on the lock, so concurrent scans sharing one client are
/// spaced out rather than bursting.
#[derive(Debug)]
pub struct MinIntervalLimiter {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl MinIntervalLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Waits until the next request may be sent
    pub async fn acquire(&self) {
        let mut last_request = self.last_request.lock().await;
        if let Some(last) = *last_request {
            let ready_at = last + self.min_interval;
            if Instant::now() < ready_at {
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last_request = Some(Instant::now());
    }
}
