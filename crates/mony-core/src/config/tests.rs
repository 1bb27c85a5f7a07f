use super::*;
use crate::message::ParseMode;
use std::collections::HashMap;

#[test]
fn test_defaults() {
    let cfg = Config::default();
    assert_eq!(cfg.telegram.api_base, "https://api.telegram.org");
    assert_eq!(cfg.telegram.poll_timeout_secs, 2);
    assert_eq!(cfg.telegram.min_request_interval_ms, 100);
    assert_eq!(cfg.telegram.buttons_per_row, 3);
    assert_eq!(cfg.telegram.parse_mode, ParseMode::Markdown);
    assert_eq!(cfg.openai.model, "gpt-4o-mini");
    assert_eq!(cfg.gmail.fallback_lookback_hours, 10);
    assert_eq!(cfg.watch.interval_secs, 60);
}

#[test]
fn test_partial_toml_fills_defaults() {
    let toml_str = r#"
        [telegram]
        bot_token = "123:abc"
        buttons_per_row = 2
        parse_mode = "html"

        [openai]
        model = "gpt-4o"
    "#;
    let cfg: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(cfg.telegram.bot_token, "123:abc");
    assert_eq!(cfg.telegram.buttons_per_row, 2);
    assert_eq!(cfg.telegram.parse_mode, ParseMode::Html);
    assert_eq!(cfg.telegram.selection_timeout_minutes, 1);
    assert_eq!(cfg.openai.model, "gpt-4o");
    assert_eq!(cfg.openai.base_url, "https://api.openai.com/v1");
    assert_eq!(cfg.memory.db_path, "~/.mony/data/mony.db");
}

#[test]
fn test_durations() {
    let tg = TelegramConfig {
        selection_timeout_minutes: 5,
        ..Default::default()
    };
    assert_eq!(tg.selection_timeout(), Duration::from_secs(300));
    assert_eq!(tg.min_request_interval(), Duration::from_millis(100));
    assert_eq!(tg.fetch_backoff(), Duration::from_secs(1));
    assert_eq!(tg.poll_timeout(), Duration::from_secs(2));
}

#[test]
fn test_env_overrides_only_non_empty() {
    let env: HashMap<&str, &str> = [
        ("TELEGRAM_BOT_TOKEN", "from-env"),
        ("OPENAI_API_KEY", ""),
        ("MONY_DB_PATH", ":memory:"),
    ]
    .into_iter()
    .collect();

    let mut cfg = Config::default();
    cfg.openai.api_key = "from-file".into();
    cfg.apply_env(|k| env.get(k).map(|v| v.to_string()));

    assert_eq!(cfg.telegram.bot_token, "from-env");
    assert_eq!(cfg.openai.api_key, "from-file");
    assert_eq!(cfg.memory.db_path, ":memory:");
}

#[test]
fn test_require_telegram() {
    let mut cfg = Config::default();
    assert!(cfg.require_telegram().is_err());
    cfg.telegram.bot_token = "t".into();
    assert!(cfg.require_telegram().is_ok());
}

#[test]
fn test_require_pipeline() {
    let mut cfg = Config::default();
    assert!(cfg.require_pipeline().is_err());
    cfg.openai.api_key = "sk".into();
    assert!(cfg.require_pipeline().is_err());
    cfg.gmail.client_id = "id".into();
    cfg.gmail.client_secret = "secret".into();
    assert!(cfg.require_pipeline().is_ok());
}

#[test]
fn test_load_file_missing_uses_defaults() {
    let cfg = load_file("/nonexistent/mony/config.toml").unwrap();
    assert_eq!(cfg.telegram.poll_timeout_secs, 2);
}

#[test]
fn test_load_file_reads_toml() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("config.toml");
    std::fs::write(&path, "[watch]\ninterval_secs = 15\n").unwrap();
    let cfg = load_file(path.to_str().unwrap()).unwrap();
    assert_eq!(cfg.watch.interval_secs, 15);
}

#[test]
fn test_load_file_rejects_bad_toml() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("config.toml");
    std::fs::write(&path, "[telegram\nbot_token = 1").unwrap();
    let err = load_file(path.to_str().unwrap()).unwrap_err();
    assert!(err.to_string().contains("failed to parse config"));
}

#[test]
fn test_shellexpand_leaves_absolute_paths() {
    assert_eq!(shellexpand("/tmp/x.db"), "/tmp/x.db");
    assert_eq!(shellexpand(":memory:"), ":memory:");
}
