// SPDX-License-Identifier: MIT
//! Bot configuration.
//!
//! Priority (highest to lowest):
//!   1. CLI / env — passed as `Some(value)` from clap
//!   2. TOML file at `{data_dir}/config.toml`
//!   3. Built-in defaults

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::error;

const DEFAULT_LOG: &str = "info";
const DEFAULT_LOG_FORMAT: &str = "pretty";
const DEFAULT_BOT_NAME: &str = "grocer";
const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

/// Shape of `config.toml`. Every field optional; omitted fields fall through
/// to the defaults above.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
struct TomlConfig {
    log: Option<String>,
    log_format: Option<String>,
    bot_name: Option<String>,
    /// Threshold in ms for slow-query warnings; 0 disables.
    slow_query_ms: Option<u64>,
    /// Store retry attempts per command (including the first try).
    retry_attempts: Option<u32>,
}

fn load_toml(data_dir: &Path) -> Option<TomlConfig> {
    let path = data_dir.join("config.toml");
    let contents = std::fs::read_to_string(&path).ok()?;
    match toml::from_str::<TomlConfig>(&contents) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            error!(path = %path.display(), err = %e, "failed to parse config.toml — using defaults");
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub data_dir: PathBuf,
    /// Log level filter (trace, debug, info, warn, error).
    pub log: String,
    /// "pretty" or "json".
    pub log_format: String,
    pub bot_name: String,
    pub slow_query_ms: u64,
    pub retry_attempts: u32,
}

impl BotConfig {
    /// Build config from CLI/env args + optional TOML file.
    pub fn new(data_dir: Option<PathBuf>, log: Option<String>) -> Self {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);
        let toml = load_toml(&data_dir).unwrap_or_default();

        let log = log
            .or(toml.log)
            .unwrap_or_else(|| DEFAULT_LOG.to_string());

        let log_format = std::env::var("GROCERD_LOG_FORMAT")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.log_format)
            .unwrap_or_else(|| DEFAULT_LOG_FORMAT.to_string());

        let bot_name = std::env::var("GROCERD_BOT_NAME")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.bot_name)
            .unwrap_or_else(|| DEFAULT_BOT_NAME.to_string());

        let slow_query_ms = toml.slow_query_ms.unwrap_or(0);
        let retry_attempts = toml.retry_attempts.unwrap_or(DEFAULT_RETRY_ATTEMPTS).max(1);

        BotConfig {
            data_dir,
            log,
            log_format,
            bot_name,
            slow_query_ms,
            retry_attempts,
        }
    }
}

fn default_data_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        // ~/Library/Application Support/grocerd
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("grocerd");
        }
    }
    #[cfg(target_os = "linux")]
    {
        // $XDG_DATA_HOME/grocerd or ~/.local/share/grocerd
        if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
            return PathBuf::from(xdg).join("grocerd");
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("grocerd");
        }
    }
    #[cfg(target_os = "windows")]
    {
        // %APPDATA%\grocerd
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata).join("grocerd");
        }
    }
    // Fallback
    PathBuf::from(".grocerd")
}
