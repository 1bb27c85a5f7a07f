//! Telegram Bot API channel.
//!
//! Uses long polling via `getUpdates` and `sendMessage` for prompts, and
//! builds the interactive "pick a button or type your own" engine on top.
//! Docs: <https://core.telegram.org/bots/api>

mod engine;
mod error;
mod fetch;
mod offset;
mod polling;
mod rate;
mod selection;
mod send;
mod sender;
pub(crate) mod types;


pub use engine::{EngineSettings, InteractiveSelectionEngine};
pub use error::{ChatApiError, SelectionError};
pub use fetch::{FetchOutcome, UpdateFetcher, UPDATE_BATCH_LIMIT};
pub use offset::OffsetTracker;
pub use rate::RateGate;
pub use selection::{Mode, PollState, Reply, SelectionStateMachine, Step};
pub use sender::MessageSender;

use async_trait::async_trait;
use mony_core::config::TelegramConfig;
use mony_core::message::{IncomingEvent, OutgoingMessage};

/// The two Bot API calls the engine needs.
///
/// [`TelegramClient`] talks HTTP; tests substitute a scripted fake.
#[async_trait]
pub trait BotApi: Send + Sync {
    /// One `getUpdates` long poll. The server holds the request up to
    /// `timeout_secs` waiting for new updates.
    async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
        limit: u32,
    ) -> Result<Vec<IncomingEvent>, ChatApiError>;

    /// One `sendMessage` call.
    async fn send_message(&self, message: &OutgoingMessage) -> Result<(), ChatApiError>;
}

/// HTTP client for the Telegram Bot API.
pub struct TelegramClient {
    client: reqwest::Client,
    base_url: String,
}

impl TelegramClient {
    /// Create a client from config.
    pub fn new(config: &TelegramConfig) -> Self {
        let base_url = format!(
            "{}/bot{}",
            config.api_base.trim_end_matches('/'),
            config.bot_token
        );
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }
}

#[async_trait]
impl BotApi for TelegramClient {
    async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
        limit: u32,
    ) -> Result<Vec<IncomingEvent>, ChatApiError> {
        self.poll_updates(offset, timeout_secs, limit).await
    }

    async fn send_message(&self, message: &OutgoingMessage) -> Result<(), ChatApiError> {
        self.post_message(message).await
    }
}
