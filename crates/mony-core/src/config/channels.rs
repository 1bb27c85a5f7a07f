use serde::{Deserialize, Serialize};

use super::defaults::*;
use crate::message::ParseMode;

/// Telegram bot config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
    /// Bot API root, without the `/bot<token>` suffix.
    #[serde(default = "default_telegram_api_base")]
    pub api_base: String,
    /// Server-side hold time for each `getUpdates` long poll.
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
    /// Minimum spacing between any two Bot API calls from this process.
    #[serde(default = "default_min_request_interval_ms")]
    pub min_request_interval_ms: u64,
    /// Pause after a failed poll before trying again.
    #[serde(default = "default_fetch_backoff_ms")]
    pub fetch_backoff_ms: u64,
    /// How long a category prompt waits for an answer.
    #[serde(default = "default_selection_timeout_minutes")]
    pub selection_timeout_minutes: u64,
    #[serde(default = "default_buttons_per_row")]
    pub buttons_per_row: usize,
    #[serde(default = "default_parse_mode")]
    pub parse_mode: ParseMode,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            api_base: default_telegram_api_base(),
            poll_timeout_secs: default_poll_timeout_secs(),
            min_request_interval_ms: default_min_request_interval_ms(),
            fetch_backoff_ms: default_fetch_backoff_ms(),
            selection_timeout_minutes: default_selection_timeout_minutes(),
            buttons_per_row: default_buttons_per_row(),
            parse_mode: default_parse_mode(),
        }
    }
}

/// Gmail access config.
///
/// Per-user access/refresh tokens live in the store; only the OAuth client
/// credentials shared by every user are configured here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GmailConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_gmail_api_base")]
    pub api_base: String,
    #[serde(default = "default_google_token_url")]
    pub token_url: String,
    /// Search query; `after:<epoch>` is appended per run.
    #[serde(default = "default_mail_query")]
    pub query: String,
    /// Look-back window for users with no previous run.
    #[serde(default = "default_fallback_lookback_hours")]
    pub fallback_lookback_hours: i64,
}

impl Default for GmailConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            api_base: default_gmail_api_base(),
            token_url: default_google_token_url(),
            query: default_mail_query(),
            fallback_lookback_hours: default_fallback_lookback_hours(),
        }
    }
}
