// SPDX-FileCopyrightText: 2026 Timar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy: `./timar.toml` > `~/.config/timar/timar.toml`
//! > `/etc/timar/timar.toml`, with environment variable overrides via the
//! `TIMAR_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::TimarConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/timar/timar.toml` (system-wide)
/// 3. `~/.config/timar/timar.toml` (user XDG config)
/// 4. `./timar.toml` (local directory)
/// 5. `TIMAR_*` environment variables
pub fn load_config() -> Result<TimarConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TimarConfig::default()))
        .merge(Toml::file("/etc/timar/timar.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("timar/timar.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("timar.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
pub fn load_config_from_str(toml_content: &str) -> Result<TimarConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TimarConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<TimarConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TimarConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `TIMAR_TELEGRAM_BOT_TOKEN` must map to
/// `telegram.bot_token`, not `telegram.bot.token`.
fn env_provider() -> Env {
    Env::prefixed("TIMAR_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("telegram_", "telegram.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("job_", "job.", 1);
        mapped.into()
    })
}
