// SPDX-FileCopyrightText: 2026 Timar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-empty paths and usable job intervals.

use crate::diagnostic::ConfigError;
use crate::model::TimarConfig;

/// The refresh job races user-triggered stops on the same rows; anything
/// tighter than this just burns Bot API quota editing unchanged text.
const MIN_REFRESH_INTERVAL_MS: u64 = 100;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects all validation errors rather than failing fast.
pub fn validate_config(config: &TimarConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if let Some(ref token) = config.telegram.bot_token {
        if token.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: "telegram.bot_token must not be empty when set".to_string(),
            });
        }
    }

    if let Some(ref url) = config.telegram.api_url {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            errors.push(ConfigError::Validation {
                message: format!("telegram.api_url `{url}` must be an http(s) URL"),
            });
        }
    }

    if config.job.refresh_interval_ms < MIN_REFRESH_INTERVAL_MS {
        errors.push(ConfigError::Validation {
            message: format!(
                "job.refresh_interval_ms must be at least {MIN_REFRESH_INTERVAL_MS}, got {}",
                config.job.refresh_interval_ms
            ),
        });
    }

    // Accept either a bare level or a full EnvFilter directive containing one.
    let level = config.agent.log_level.trim();
    if level.is_empty()
        || !(LOG_LEVELS.contains(&level)
            || LOG_LEVELS.iter().any(|l| level.contains(l))
            || level.contains('='))
    {
        errors.push(ConfigError::Validation {
            message: format!(
                "agent.log_level `{level}` is not a log level or filter directive"
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
