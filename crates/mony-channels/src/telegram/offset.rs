//! Delivery cursor for one interaction.

use super::fetch::{FetchOutcome, UpdateFetcher};
use mony_core::message::IncomingEvent;
use tracing::{debug, warn};

/// Server hold for the priming poll.
const PRIME_TIMEOUT_SECS: u64 = 1;

/// The lowest `update_id` not yet consumed. Never moves backwards.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OffsetTracker {
    next: Option<i64>,
}

impl OffsetTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a known cursor.
    pub fn starting_at(next: i64) -> Self {
        Self { next: Some(next) }
    }

    /// Cursor to send as `offset`; `None` until anything has been seen.
    pub fn next(&self) -> Option<i64> {
        self.next
    }

    /// Establish a baseline past everything already queued on the server.
    ///
    /// Anything sent before the prompt is discarded here, including a reply
    /// typed in the instant before the prompt rendered.
    pub async fn prime(fetcher: &UpdateFetcher) -> Self {
        let mut tracker = Self::new();
        match fetcher.fetch(None, PRIME_TIMEOUT_SECS).await {
            FetchOutcome::Batch(batch) => {
                let skipped = tracker.admit(batch).len();
                debug!(
                    "telegram offset primed at {:?}, skipped {skipped} stale update(s)",
                    tracker.next
                );
            }
            FetchOutcome::Failed(e) => {
                warn!("telegram offset priming failed, starting unprimed: {e}");
            }
        }
        tracker
    }

    /// Consume a fetched batch.
    ///
    /// Advances past the highest `update_id` in the whole batch and returns
    /// only the events at or above the previous cursor, in ascending order.
    pub fn admit(&mut self, mut batch: Vec<IncomingEvent>) -> Vec<IncomingEvent> {
        batch.sort_by_key(|e| e.update_id);
        if let Some(max) = batch.last().map(|e| e.update_id) {
            let floor = self.next;
            self.next = Some(floor.map_or(max + 1, |n| n.max(max + 1)));
            if let Some(floor) = floor {
                batch.retain(|e| e.update_id >= floor);
            }
        }
        batch
    }
}
