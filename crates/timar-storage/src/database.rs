// SPDX-FileCopyrightText: 2026 Timar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use std::path::Path;

use timar_core::TimarError;
use tokio_rusqlite::Connection;

use crate::migrations;

/// Handle to the SQLite database.
///
/// Wraps a single `tokio_rusqlite::Connection`; cloning shares the same
/// background writer thread. Query modules accept `&Database` and go through
/// [`Database::connection`].
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (creating if needed) the database at `path` with WAL mode and
    /// runs all pending migrations.
    pub async fn open(path: &str) -> Result<Self, TimarError> {
        Self::open_with(path, true).await
    }

    /// Opens the database, optionally without WAL (used for read-only media
    /// that cannot take the extra sidecar files).
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, TimarError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| TimarError::Storage {
                    source: Box::new(e),
                })?;
            }
        }

        let conn = Connection::open(path)
            .await
            .map_err(|e| TimarError::Storage {
                source: Box::new(e),
            })?;

        conn.call(move |conn| {
            if wal_mode {
                conn.pragma_update(None, "journal_mode", "WAL")?;
            }
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.pragma_update(None, "busy_timeout", 5000)?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(migrations::run_migrations)
            .await
            .map_err(|e| TimarError::Storage {
                source: Box::new(e),
            })?;

        Ok(Self { conn })
    }

    /// The underlying tokio-rusqlite connection (the single writer).
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Closes the connection, flushing the WAL.
    pub async fn close(self) -> Result<(), TimarError> {
        self.conn.close().await.map_err(map_tr_err)
    }
}

/// Map a tokio-rusqlite error into the workspace error type.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> TimarError {
    TimarError::Storage {
        source: Box::new(e),
    }
}
