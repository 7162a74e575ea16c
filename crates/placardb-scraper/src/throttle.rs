//! Adaptive politeness delay shared across concurrent pipelines.
//!
//! The wait after each fetch is proportional to the observed response time
//! (slow responses mean a struggling server, so we back off harder), clamped
//! to a configured `[min, max]` window.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

const HISTORY_SIZE: usize = 10;

/// Cheap to clone; all clones share one delay history.
#[derive(Clone)]
pub struct AdaptiveThrottle {
    min_delay_ms: u64,
    max_delay_ms: u64,
    history: Arc<Mutex<VecDeque<u64>>>,
}

impl AdaptiveThrottle {
    #[must_use]
    pub fn new(min_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            min_delay_ms,
            max_delay_ms,
            history: Arc::new(Mutex::new(VecDeque::with_capacity(HISTORY_SIZE))),
        }
    }

    /// A throttle that never sleeps; for tests and mock transports.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(0, 0)
    }

    /// Sleeps for 1.5× the last response time, clamped to the window, and
    /// records the delay.
    pub async fn pause_after(&self, response_ms: u64) {
        let target = (response_ms.saturating_mul(3) / 2)
            .clamp(self.min_delay_ms, self.max_delay_ms);

        {
            let mut history = self.history.lock().await;
            if history.len() == HISTORY_SIZE {
                history.pop_front();
            }
            history.push_back(target);
        }

        if target > 0 {
            tracing::debug!(response_ms, delay_ms = target, "politeness pause");
            tokio::time::sleep(Duration::from_millis(target)).await;
        }
    }

    /// Mean delay over the recent history, for batch summary logging.
    pub async fn average_delay_ms(&self) -> u64 {
        let history = self.history.lock().await;
        if history.is_empty() {
            return 0;
        }
        history.iter().sum::<u64>() / history.len() as u64
    }
}
