//! Serde default functions for config fields.

use crate::message::ParseMode;

pub(super) fn default_log_level() -> String {
    "info".to_string()
}
pub(super) fn default_data_dir() -> String {
    "~/.mony".to_string()
}
pub(super) fn default_db_path() -> String {
    "~/.mony/data/mony.db".to_string()
}
pub(super) fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}
pub(super) fn default_poll_timeout_secs() -> u64 {
    2
}
pub(super) fn default_min_request_interval_ms() -> u64 {
    100
}
pub(super) fn default_fetch_backoff_ms() -> u64 {
    1000
}
pub(super) fn default_selection_timeout_minutes() -> u64 {
    1
}
pub(super) fn default_buttons_per_row() -> usize {
    3
}
pub(super) fn default_parse_mode() -> ParseMode {
    ParseMode::Markdown
}
pub(super) fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
pub(super) fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}
pub(super) fn default_gmail_api_base() -> String {
    "https://gmail.googleapis.com/gmail/v1".to_string()
}
pub(super) fn default_google_token_url() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}
pub(super) fn default_mail_query() -> String {
    "in:inbox category:primary".to_string()
}
pub(super) fn default_fallback_lookback_hours() -> i64 {
    10
}
pub(super) fn default_watch_interval_secs() -> u64 {
    60
}
