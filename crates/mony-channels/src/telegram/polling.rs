//! `getUpdates` over HTTP.

use super::error::ChatApiError;
use super::types::{TgGetUpdates, TgResponse, TgUpdate};
use super::TelegramClient;
use mony_core::message::IncomingEvent;
use std::time::Duration;
use tracing::debug;

/// Slack on top of the server-side hold before the client gives up.
const CLIENT_TIMEOUT_SLACK_SECS: u64 = 5;

impl TelegramClient {
    pub(crate) async fn poll_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
        limit: u32,
    ) -> Result<Vec<IncomingEvent>, ChatApiError> {
        let url = format!("{}/getUpdates", self.base_url);
        let body = TgGetUpdates {
            offset,
            timeout: timeout_secs,
            limit,
        };

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .timeout(Duration::from_secs(timeout_secs + CLIENT_TIMEOUT_SLACK_SECS))
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
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ChatApiError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let text = resp.text().await.map_err(|e| {
            if e.is_timeout() {
                ChatApiError::Timeout
            } else {
                ChatApiError::Transport(e.to_string())
            }
        })?;

        let events = parse_updates(&text)?;
        debug!(
            "telegram getUpdates offset={offset:?} -> {} update(s)",
            events.len()
        );
        Ok(events)
    }
}

/// Decode a `getUpdates` response body into events in delivery order.
pub(crate) fn parse_updates(body: &str) -> Result<Vec<IncomingEvent>, ChatApiError> {
    let parsed: TgResponse<Vec<TgUpdate>> = serde_json::from_str(body)
        .map_err(|e| ChatApiError::MalformedResponse(e.to_string()))?;

    if !parsed.ok {
        return Err(ChatApiError::Rejected(
            parsed.description.unwrap_or_default(),
        ));
    }

    let updates = parsed
        .result
        .ok_or_else(|| ChatApiError::MalformedResponse("ok response without result".into()))?;

    Ok(updates.into_iter().map(IncomingEvent::from).collect())
}
