//! Async request pacing shared by every call made through one client.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

/// Enforces a minimum gap between consecutive requests to the same YouTrack instance.
///
/// Clones share one schedule, so clients built for several services behind
/// the same Hub are paced together.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    cooldown: Duration,
    next_slot: Arc<Mutex<Option<Instant>>>,
}

impl RateLimiter {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            next_slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Limiter that never waits. Used when the server side already throttles.
    pub fn unlimited() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Waits for the next free slot and reserves the one after it.
    pub async fn hit(&self) {
        if self.cooldown.is_zero() {
            return;
        }
        let mut slot = self.next_slot.lock().await;
        if let Some(at) = *slot {
            sleep_until(at).await;
        }
        *slot = Some(Instant::now() + self.cooldown);
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }
}
