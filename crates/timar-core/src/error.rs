// SPDX-FileCopyrightText: 2026 Timar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the timar task tracker.

use thiserror::Error;

/// The primary error type used across all timar crates.
///
/// The first four variants form the domain taxonomy (a referenced entity is
/// absent, an ownership check failed, a button token did not decode, an input
/// was rejected before reaching storage). The rest cover infrastructure.
#[derive(Debug, Error)]
pub enum TimarError {
    /// A referenced epic/task/timelog does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// An ownership check failed. Logged with actor and target; never
    /// surfaced to the requester in detail.
    #[error("chat {actor} is not permitted to act on {entity} {id}")]
    Unauthorized {
        actor: i64,
        entity: &'static str,
        id: i64,
    },

    /// An inline-button token could not be decoded.
    #[error("malformed action token: {0}")]
    MalformedAction(String),

    /// Input rejected before reaching storage (bad column, oversized token).
    #[error("validation error: {0}")]
    Validation(String),

    /// Storage backend errors (database connection, query failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Messaging gateway errors (send/edit failure, connection loss).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration errors (missing token, invalid interval).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
