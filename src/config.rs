//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory,
//! then applies `DATA_DIR` and `LOG_LEVEL` env overrides. The Telegram bot
//! token is never read from TOML — it comes from `TELEGRAM_BOT_TOKEN` only.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::error::AppError;

/// Telegram channel configuration.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Whether the Telegram channel should start.
    pub enabled: bool,
    /// Seconds before bot replies are deleted from the chat.
    pub autodelete_seconds: u64,
    /// Shorter delay used for input-error hints.
    pub error_autodelete_seconds: u64,
}

/// Storage file names, resolved relative to `data_dir`.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub db_file: String,
    pub excel_file: String,
}

/// Fully-resolved bot configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub bot_name: String,
    /// Directory for all persistent data (already expanded, no `~`).
    pub data_dir: PathBuf,
    pub log_level: String,
    pub telegram: TelegramConfig,
    pub storage: StorageConfig,
}

impl Config {
    /// Path of the SQLite database file under `data_dir`.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.storage.db_file)
    }

    /// Path of the Excel mirror workbook under `data_dir`.
    pub fn excel_path(&self) -> PathBuf {
        self.data_dir.join(&self.storage.excel_file)
    }
}

/// Raw TOML shape — `serde` target before resolution.
#[derive(Deserialize)]
struct RawConfig {
    bot: RawBot,
    #[serde(default)]
    telegram: RawTelegram,
    #[serde(default)]
    storage: RawStorage,
}

#[derive(Deserialize)]
struct RawBot {
    name: String,
    #[serde(default = "default_data_dir")]
    data_dir: String,
    #[serde(default = "default_log_level")]
    log_level: String,
}

#[derive(Deserialize)]
struct RawTelegram {
    /// Defaults to `true`: the bot is useless without its one channel.
    #[serde(default = "default_true")]
    enabled: bool,
    #[serde(default = "default_autodelete")]
    autodelete_seconds: u64,
    #[serde(default = "default_error_autodelete")]
    error_autodelete_seconds: u64,
}

impl Default for RawTelegram {
    fn default() -> Self {
        Self {
            enabled: true,
            autodelete_seconds: default_autodelete(),
            error_autodelete_seconds: default_error_autodelete(),
        }
    }
}

#[derive(Deserialize)]
struct RawStorage {
    #[serde(default = "default_db_file")]
    db_file: String,
    #[serde(default = "default_excel_file")]
    excel_file: String,
}

impl Default for RawStorage {
    fn default() -> Self {
        Self {
            db_file: default_db_file(),
            excel_file: default_excel_file(),
        }
    }
}

fn default_data_dir() -> String { "/data".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_db_file() -> String { "expenses.db".to_string() }
fn default_excel_file() -> String { "expenses.xlsx".to_string() }
fn default_autodelete() -> u64 { 60 }
fn default_error_autodelete() -> u64 { 30 }

fn default_true() -> bool {
    true
}

/// Load config from `config/default.toml`, then apply env-var overrides.
pub fn load() -> Result<Config, AppError> {
    let data_dir_override = env::var("DATA_DIR").ok();
    let log_level_override = env::var("LOG_LEVEL").ok();
    load_from(
        Path::new("config/default.toml"),
        data_dir_override.as_deref(),
        log_level_override.as_deref(),
    )
}

/// Internal loader — accepts an explicit path and optional overrides.
/// Tests pass overrides directly instead of mutating env vars.
pub fn load_from(
    path: &Path,
    data_dir_override: Option<&str>,
    log_level_override: Option<&str>,
) -> Result<Config, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let parsed: RawConfig = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    let data_dir_str = data_dir_override.unwrap_or(&parsed.bot.data_dir).to_string();
    let data_dir = expand_home(&data_dir_str);
    let log_level = log_level_override.unwrap_or(&parsed.bot.log_level).to_string();

    Ok(Config {
        bot_name: parsed.bot.name,
        data_dir,
        log_level,
        telegram: TelegramConfig {
            enabled: parsed.telegram.enabled,
            autodelete_seconds: parsed.telegram.autodelete_seconds,
            error_autodelete_seconds: parsed.telegram.error_autodelete_seconds,
        },
        storage: StorageConfig {
            db_file: parsed.storage.db_file,
            excel_file: parsed.storage.excel_file,
        },
    })
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

// ── test helpers ──────────────────────────────────────────────────────────────

/// Safe `Config` for unit tests — data dir under a caller-owned tempdir.
#[cfg(test)]
impl Config {
    pub fn test_default(data_dir: &Path) -> Self {
        Self {
            bot_name: "test".into(),
            data_dir: data_dir.to_path_buf(),
            log_level: "info".into(),
            telegram: TelegramConfig {
                enabled: false,
                autodelete_seconds: 60,
                error_autodelete_seconds: 30,
            },
            storage: StorageConfig {
                db_file: default_db_file(),
                excel_file: default_excel_file(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL_TOML: &str = r#"
[bot]
name = "test-bot"
"#;

    fn write_toml(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn parse_minimal_config_applies_defaults() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), None, None).unwrap();
        assert_eq!(cfg.bot_name, "test-bot");
        assert_eq!(cfg.data_dir, PathBuf::from("/data"));
        assert_eq!(cfg.log_level, "info");
        assert!(cfg.telegram.enabled);
        assert_eq!(cfg.telegram.autodelete_seconds, 60);
        assert_eq!(cfg.storage.db_file, "expenses.db");
        assert_eq!(cfg.storage.excel_file, "expenses.xlsx");
    }

    #[test]
    fn full_config_parses() {
        let f = write_toml(
            r#"
[bot]
name = "ledger"
data_dir = "/srv/ledger"
log_level = "debug"

[telegram]
enabled = false
autodelete_seconds = 120
error_autodelete_seconds = 15

[storage]
db_file = "book.db"
excel_file = "book.xlsx"
"#,
        );
        let cfg = load_from(f.path(), None, None).unwrap();
        assert_eq!(cfg.data_dir, PathBuf::from("/srv/ledger"));
        assert_eq!(cfg.log_level, "debug");
        assert!(!cfg.telegram.enabled);
        assert_eq!(cfg.telegram.autodelete_seconds, 120);
        assert_eq!(cfg.telegram.error_autodelete_seconds, 15);
        assert_eq!(cfg.db_path(), PathBuf::from("/srv/ledger/book.db"));
        assert_eq!(cfg.excel_path(), PathBuf::from("/srv/ledger/book.xlsx"));
    }

    #[test]
    fn env_data_dir_override() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), Some("/tmp/test-override"), None).unwrap();
        assert_eq!(cfg.data_dir, PathBuf::from("/tmp/test-override"));
    }

    #[test]
    fn env_log_level_override() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), None, Some("debug")).unwrap();
        assert_eq!(cfg.log_level, "debug");
    }

    #[test]
    fn missing_file_errors() {
        let result = load_from(Path::new("/nonexistent/config.toml"), None, None);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("config error"));
    }

    #[test]
    fn tilde_expands_to_home() {
        let home = dirs::home_dir().expect("home dir must exist in test env");
        let expanded = expand_home("~/.expense-bot");
        assert!(expanded.starts_with(&home));
        assert!(expanded.ends_with(".expense-bot"));
    }

    #[test]
    fn absolute_path_unchanged() {
        assert_eq!(expand_home("/absolute/path"), PathBuf::from("/absolute/path"));
    }
}
