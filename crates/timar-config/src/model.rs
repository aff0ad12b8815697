// SPDX-FileCopyrightText: 2026 Timar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so unrecognized keys are
//! rejected at startup with an actionable diagnostic.

use serde::{Deserialize, Serialize};

/// Top-level timar configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with `TIMAR_*`
/// environment variable overrides. All sections default to sensible values;
/// only `telegram.bot_token` is required to actually serve.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TimarConfig {
    /// Bot identity and logging settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Telegram transport settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Timer refresh job settings.
    #[serde(default)]
    pub job: JobConfig,
}

/// Bot identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the bot.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging filter directive (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "timar".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telegram transport configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. `None` means the bot cannot serve.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Bot API base URL override, for self-hosted API servers. `None` uses
    /// the public endpoint.
    #[serde(default)]
    pub api_url: Option<String>,

    /// Chat id of the privileged operator allowed to issue `/shutdown`.
    /// `None` disables the command entirely.
    #[serde(default)]
    pub admin_chat_id: Option<i64>,
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("timar").join("timar.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("timar.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Timer refresh job configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    /// Cadence of the running-timer display refresh, in milliseconds.
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: default_refresh_interval_ms(),
        }
    }
}

fn default_refresh_interval_ms() -> u64 {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = TimarConfig::default();
        assert_eq!(config.agent.name, "timar");
        assert_eq!(config.agent.log_level, "info");
        assert!(config.telegram.bot_token.is_none());
        assert!(config.telegram.admin_chat_id.is_none());
        assert!(config.storage.wal_mode);
        assert_eq!(config.job.refresh_interval_ms, 1000);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: TimarConfig = toml::from_str(
            r#"
[telegram]
bot_token = "123:abc"
admin_chat_id = 42
"#,
        )
        .unwrap();
        assert_eq!(config.telegram.bot_token.as_deref(), Some("123:abc"));
        assert_eq!(config.telegram.admin_chat_id, Some(42));
        assert_eq!(config.job.refresh_interval_ms, 1000);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = toml::from_str::<TimarConfig>(
            r#"
[agent]
naem = "typo"
"#,
        );
        assert!(result.is_err());
    }
}
