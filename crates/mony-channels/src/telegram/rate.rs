//! Minimum spacing between Bot API calls.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Blocks callers so that consecutive permitted calls are at least
/// `min_interval` apart.
///
/// One gate guards one bot credential. Engines that share a token should
/// share the gate through an `Arc`; callers then pass through it one at a
/// time in lock order.
#[derive(Debug)]
pub struct RateGate {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait out the rest of the floor since the last permitted call, then
    /// record this call.
    pub async fn wait(&self) {
        let mut last = self.last_call.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_first_call_passes_immediately() {
        let gate = RateGate::new(Duration::from_millis(100));
        let start = Instant::now();
        gate.wait().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_to_back_calls_are_spaced() {
        let gate = RateGate::new(Duration::from_millis(100));
        let start = Instant::now();
        gate.wait().await;
        gate.wait().await;
        gate.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_remainder_is_waited() {
        let gate = RateGate::new(Duration::from_millis(100));
        gate.wait().await;
        tokio::time::sleep(Duration::from_millis(70)).await;
        let before = Instant::now();
        gate.wait().await;
        let waited = before.elapsed();
        assert!(waited >= Duration::from_millis(30));
        assert!(waited < Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_wait_after_floor_elapsed() {
        let gate = RateGate::new(Duration::from_millis(100));
        gate.wait().await;
        tokio::time::sleep(Duration::from_millis(250)).await;
        let before = Instant::now();
        gate.wait().await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shared_gate_serializes_tasks() {
        let gate = Arc::new(RateGate::new(Duration::from_millis(100)));
        let start = Instant::now();
        let mut handles = Vec::new();
        for _ in 0..4 {
            let g = gate.clone();
            handles.push(tokio::spawn(async move { g.wait().await }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert!(start.elapsed() >= Duration::from_millis(300));
    }
}
