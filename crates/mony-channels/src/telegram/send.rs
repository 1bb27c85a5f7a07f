//! `sendMessage` over HTTP.

use super::error::ChatApiError;
use super::types::{TgResponse, TgSendMessage};
use super::TelegramClient;
use mony_core::message::OutgoingMessage;
use std::time::Duration;

const SEND_TIMEOUT_SECS: u64 = 10;

impl TelegramClient {
    pub(crate) async fn post_message(&self, message: &OutgoingMessage) -> Result<(), ChatApiError> {
        let url = format!("{}/sendMessage", self.base_url);
        let body = TgSendMessage::from(message);

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .timeout(Duration::from_secs(SEND_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChatApiError::Timeout
                } else {
                    ChatApiError::Transport(e.to_string())
                }
            })?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(ChatApiError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: TgResponse<serde_json::Value> = serde_json::from_str(&text)
            .map_err(|e| ChatApiError::MalformedResponse(e.to_string()))?;
        if !parsed.ok {
            return Err(ChatApiError::Rejected(
                parsed.description.unwrap_or_default(),
            ));
        }

        Ok(())
    }
}
