//! One long-poll fetch, with transient failures folded into a soft signal.

use super::error::ChatApiError;
use super::rate::RateGate;
use super::BotApi;
use mony_core::message::IncomingEvent;
use std::sync::Arc;
use tracing::{debug, warn};

/// Maximum updates requested per poll.
pub const UPDATE_BATCH_LIMIT: u32 = 100;

/// What one poll produced.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Events in ascending `update_id` order; empty when nothing arrived.
    Batch(Vec<IncomingEvent>),
    /// The poll failed. The caller should back off before polling again.
    Failed(ChatApiError),
}

/// Pulls update batches through the rate gate.
pub struct UpdateFetcher {
    api: Arc<dyn BotApi>,
    gate: Arc<RateGate>,
}

impl UpdateFetcher {
    pub fn new(api: Arc<dyn BotApi>, gate: Arc<RateGate>) -> Self {
        Self { api, gate }
    }

    /// Poll once. Never returns an error: a client-side timeout is an empty
    /// batch, anything else is [`FetchOutcome::Failed`].
    pub async fn fetch(&self, offset: Option<i64>, timeout_secs: u64) -> FetchOutcome {
        self.gate.wait().await;
        match self
            .api
            .get_updates(offset, timeout_secs, UPDATE_BATCH_LIMIT)
            .await
        {
            Ok(mut events) => {
                events.sort_by_key(|e| e.update_id);
                FetchOutcome::Batch(events)
            }
            Err(ChatApiError::Timeout) => {
                debug!("telegram poll timed out client-side, treating as empty");
                FetchOutcome::Batch(Vec::new())
            }
            Err(e) => {
                warn!("telegram poll failed: {e}");
                FetchOutcome::Failed(e)
            }
        }
    }
}
