// SPDX-FileCopyrightText: 2026 Timar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for timar.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, and typed operations for epics,
//! tasks, timelogs, and per-chat conversation state.
//!
//! All writes are serialized through one background thread: the timer refresh
//! job and the dispatcher race on the same timelog rows, and the single
//! writer plus one-statement conditional updates are what keep that race
//! harmless.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use database::Database;
pub use models::*;
