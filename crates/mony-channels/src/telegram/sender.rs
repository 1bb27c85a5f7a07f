//! Outbound messages through the rate gate.

use super::error::ChatApiError;
use super::rate::RateGate;
use super::BotApi;
use mony_core::message::{OutgoingMessage, ParseMode};
use std::sync::Arc;
use tracing::warn;

/// Sends one message per call, waiting on the shared gate first.
///
/// Failures are logged and returned; callers decide whether they matter.
pub struct MessageSender {
    api: Arc<dyn BotApi>,
    gate: Arc<RateGate>,
}

impl MessageSender {
    pub fn new(api: Arc<dyn BotApi>, gate: Arc<RateGate>) -> Self {
        Self { api, gate }
    }

    pub async fn send(&self, message: OutgoingMessage) -> Result<(), ChatApiError> {
        self.gate.wait().await;
        let err = match self.api.send_message(&message).await {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };

        if message.format != ParseMode::None && err.is_entity_parse_failure() {
            warn!("telegram markup parse failed, retrying as plain text: {err}");
            let plain = OutgoingMessage {
                format: ParseMode::None,
                ..message
            };
            self.gate.wait().await;
            return self.api.send_message(&plain).await.map_err(|e| {
                warn!("telegram send (plain fallback) failed: {e}");
                e
            });
        }

        warn!("telegram send to {} failed: {err}", message.chat_id);
        Err(err)
    }
}
