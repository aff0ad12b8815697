// SPDX-FileCopyrightText: 2026 Timar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Timelog operations.
//!
//! The stop path is a single conditional UPDATE guarded on
//! `status = 'in_progress'`, so two racing stop requests (user button and
//! refresh job, or a double tap) resolve to exactly one winner without a
//! read-modify-write window.

use chrono::{DateTime, Utc};
use rusqlite::params;
use timar_core::TimarError;

use crate::database::Database;
use crate::models::{Timelog, TimelogStatus};
use crate::queries::{enum_from_sql, ts_from_sql, ts_to_sql};

fn timelog_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Timelog> {
    let start: String = row.get(2)?;
    let end: Option<String> = row.get(3)?;
    let status: String = row.get(4)?;
    Ok(Timelog {
        id: row.get(0)?,
        task_id: row.get(1)?,
        start: ts_from_sql(2, start)?,
        end: end.map(|s| ts_from_sql(3, s)).transpose()?,
        status: enum_from_sql(4, status)?,
        display_metadata: row.get(5)?,
    })
}

const SELECT_COLUMNS: &str = r#"id, task_id, start, "end", status, display_metadata"#;

/// Start a new timelog for a task. Display metadata is attached separately
/// once the live message exists.
pub async fn create_timelog(
    db: &Database,
    task_id: i64,
    start: DateTime<Utc>,
) -> Result<Timelog, TimarError> {
    let start_sql = ts_to_sql(start);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO timelogs (task_id, start) VALUES (?1, ?2)",
                params![task_id, start_sql],
            )?;
            Ok(Timelog {
                id: conn.last_insert_rowid(),
                task_id,
                start,
                end: None,
                status: TimelogStatus::InProgress,
                display_metadata: None,
            })
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a timelog by ID.
pub async fn get_timelog(db: &Database, id: i64) -> Result<Option<Timelog>, TimarError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM timelogs WHERE id = ?1"
            ))?;
            match stmt.query_row(params![id], timelog_from_row) {
                Ok(log) => Ok(Some(log)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Attach the live-message metadata to a timelog, replacing any previous
/// value. A retry after a resend points the refresh job at the new message.
pub async fn attach_display_metadata(
    db: &Database,
    id: i64,
    metadata: &str,
) -> Result<(), TimarError> {
    let metadata = metadata.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE timelogs SET display_metadata = ?1 WHERE id = ?2",
                params![metadata, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Finish a running timelog: set its end and terminal status, but only if
/// it is still in progress. Returns whether this caller won the transition.
pub async fn complete_if_running(
    db: &Database,
    id: i64,
    end: DateTime<Utc>,
    status: TimelogStatus,
) -> Result<bool, TimarError> {
    let end_sql = ts_to_sql(end);
    let status_sql = status.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                r#"UPDATE timelogs SET "end" = ?1, status = ?2
                   WHERE id = ?3 AND status = 'in_progress'"#,
                params![end_sql, status_sql, id],
            )?;
            Ok(changed == 1)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All timelogs still in progress, oldest first. The refresh job walks this.
pub async fn list_running(db: &Database) -> Result<Vec<Timelog>, TimarError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM timelogs
                 WHERE status = 'in_progress' ORDER BY id"
            ))?;
            let rows = stmt.query_map([], timelog_from_row)?;
            let mut logs = Vec::new();
            for row in rows {
                logs.push(row?);
            }
            Ok(logs)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Hard-delete a timelog, whatever its status.
pub async fn delete_timelog(db: &Database, id: i64) -> Result<(), TimarError> {
    db.connection()
        .call(move |conn| {
            conn.execute("DELETE FROM timelogs WHERE id = ?1", params![id])?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::epics::create_epic;
    use crate::queries::tasks::create_task;
    use tempfile::tempdir;

    async fn setup_task() -> (Database, tempfile::TempDir, i64) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        let epic = create_epic(&db, 1, "e", "").await.unwrap();
        let task = create_task(&db, epic.id, "t", "").await.unwrap();
        (db, dir, task.id)
    }

    #[tokio::test]
    async fn create_and_get_timelog_roundtrips() {
        let (db, _dir, task_id) = setup_task().await;
        let start = Utc::now();

        let log = create_timelog(&db, task_id, start).await.unwrap();
        let fetched = get_timelog(&db, log.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, TimelogStatus::InProgress);
        assert!(fetched.end.is_none());
        assert!(fetched.display_metadata.is_none());
        // Millisecond storage granularity.
        assert_eq!(fetched.start.timestamp_millis(), start.timestamp_millis());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn attach_display_metadata_overwrites_previous_value() {
        let (db, _dir, task_id) = setup_task().await;
        let log = create_timelog(&db, task_id, Utc::now()).await.unwrap();

        attach_display_metadata(&db, log.id, r#"{"message":{"chat_id":1,"message_id":2}}"#)
            .await
            .unwrap();
        attach_display_metadata(&db, log.id, r#"{"message":{"chat_id":1,"message_id":3}}"#)
            .await
            .unwrap();

        let fetched = get_timelog(&db, log.id).await.unwrap().unwrap();
        assert_eq!(
            fetched.display_metadata.as_deref(),
            Some(r#"{"message":{"chat_id":1,"message_id":3}}"#)
        );

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn complete_if_running_is_single_winner() {
        let (db, _dir, task_id) = setup_task().await;
        let log = create_timelog(&db, task_id, Utc::now()).await.unwrap();

        let first_end = Utc::now();
        let won = complete_if_running(&db, log.id, first_end, TimelogStatus::Done)
            .await
            .unwrap();
        assert!(won);

        // Second stop loses and must not move the recorded end.
        let lost = complete_if_running(
            &db,
            log.id,
            first_end + chrono::Duration::seconds(30),
            TimelogStatus::Cancelled,
        )
        .await
        .unwrap();
        assert!(!lost);

        let fetched = get_timelog(&db, log.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, TimelogStatus::Done);
        assert_eq!(
            fetched.end.unwrap().timestamp_millis(),
            first_end.timestamp_millis()
        );

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_stops_produce_exactly_one_winner() {
        let (db, _dir, task_id) = setup_task().await;
        let log = create_timelog(&db, task_id, Utc::now()).await.unwrap();
        let end = Utc::now();

        let (a, b) = tokio::join!(
            complete_if_running(&db, log.id, end, TimelogStatus::Done),
            complete_if_running(&db, log.id, end, TimelogStatus::Done),
        );
        let wins = [a.unwrap(), b.unwrap()].iter().filter(|w| **w).count();
        assert_eq!(wins, 1);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_running_excludes_finished_logs() {
        let (db, _dir, task_id) = setup_task().await;

        let running = create_timelog(&db, task_id, Utc::now()).await.unwrap();
        let done = create_timelog(&db, task_id, Utc::now()).await.unwrap();
        complete_if_running(&db, done.id, Utc::now(), TimelogStatus::Done)
            .await
            .unwrap();

        let logs = list_running(&db).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].id, running.id);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn delete_timelog_removes_the_row() {
        let (db, _dir, task_id) = setup_task().await;
        let log = create_timelog(&db, task_id, Utc::now()).await.unwrap();

        delete_timelog(&db, log.id).await.unwrap();
        assert!(get_timelog(&db, log.id).await.unwrap().is_none());

        db.close().await.unwrap();
    }
}
