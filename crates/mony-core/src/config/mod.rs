mod channels;
mod defaults;
mod providers;

#[cfg(test)]
mod tests;

pub use channels::*;
pub use providers::*;

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::error::MonyError;
use defaults::*;

/// Top-level Mony configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub mony: MonyConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub gmail: GmailConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub watch: WatchConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonyConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for MonyConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Store config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// SQLite file path, or `:memory:`.
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

/// `mony watch` loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default = "default_watch_interval_secs")]
    pub interval_secs: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_watch_interval_secs(),
        }
    }
}

impl TelegramConfig {
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }

    pub fn min_request_interval(&self) -> Duration {
        Duration::from_millis(self.min_request_interval_ms)
    }

    pub fn fetch_backoff(&self) -> Duration {
        Duration::from_millis(self.fetch_backoff_ms)
    }

    pub fn selection_timeout(&self) -> Duration {
        Duration::from_secs(self.selection_timeout_minutes * 60)
    }
}

impl Config {
    /// Override secrets from environment variables.
    ///
    /// `lookup` is `std::env::var` in production; tests pass a map.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |target: &mut String, key: &str| {
            if let Some(v) = lookup(key).filter(|v| !v.is_empty()) {
                *target = v;
            }
        };
        set(&mut self.telegram.bot_token, "TELEGRAM_BOT_TOKEN");
        set(&mut self.openai.api_key, "OPENAI_API_KEY");
        set(&mut self.gmail.client_id, "GOOGLE_CLIENT_ID");
        set(&mut self.gmail.client_secret, "GOOGLE_CLIENT_SECRET");
        set(&mut self.memory.db_path, "MONY_DB_PATH");
    }

    /// Fail unless a bot token is configured.
    pub fn require_telegram(&self) -> Result<(), MonyError> {
        if self.telegram.bot_token.is_empty() {
            return Err(MonyError::Config(
                "telegram.bot_token is empty. Set it in config.toml or TELEGRAM_BOT_TOKEN env var."
                    .into(),
            ));
        }
        Ok(())
    }

    /// Fail unless everything a pipeline run needs is configured.
    pub fn require_pipeline(&self) -> Result<(), MonyError> {
        if self.openai.api_key.is_empty() {
            return Err(MonyError::Config(
                "openai.api_key is empty. Set it in config.toml or OPENAI_API_KEY env var.".into(),
            ));
        }
        if self.gmail.client_id.is_empty() || self.gmail.client_secret.is_empty() {
            return Err(MonyError::Config(
                "gmail.client_id and gmail.client_secret are required to refresh mail tokens."
                    .into(),
            ));
        }
        Ok(())
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Load configuration from a TOML file, then apply environment overrides.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, MonyError> {
    let mut config = load_file(path)?;
    config.apply_env(|key| std::env::var(key).ok());
    Ok(config)
}

fn load_file(path: &str) -> Result<Config, MonyError> {
    let path = Path::new(path);
    if !path.exists() {
        info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| MonyError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| MonyError::Config(format!("failed to parse config: {}", e)))?;

    Ok(config)
}
