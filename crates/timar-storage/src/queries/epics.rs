// SPDX-FileCopyrightText: 2026 Timar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Epic CRUD operations.
//!
//! Deletion is soft (sets `deleted_at`): listings skip deleted rows, but
//! `get_epic` still resolves them so ownership checks against a deleted
//! epic keep working.

use chrono::Utc;
use rusqlite::params;
use timar_core::TimarError;

use crate::database::Database;
use crate::models::{EditColumn, Epic};
use crate::queries::{ts_from_sql, ts_to_sql};

fn epic_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Epic> {
    let deleted_at: Option<String> = row.get(4)?;
    Ok(Epic {
        id: row.get(0)?,
        chat_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        deleted_at: deleted_at.map(|s| ts_from_sql(4, s)).transpose()?,
    })
}

/// Create a new epic owned by `chat_id`.
pub async fn create_epic(
    db: &Database,
    chat_id: i64,
    name: &str,
    description: &str,
) -> Result<Epic, TimarError> {
    let name = name.to_string();
    let description = description.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO epics (chat_id, name, description) VALUES (?1, ?2, ?3)",
                params![chat_id, name, description],
            )?;
            Ok(Epic {
                id: conn.last_insert_rowid(),
                chat_id,
                name,
                description,
                deleted_at: None,
            })
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get an epic by ID. Resolves soft-deleted epics too.
pub async fn get_epic(db: &Database, id: i64) -> Result<Option<Epic>, TimarError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, chat_id, name, description, deleted_at FROM epics WHERE id = ?1",
            )?;
            match stmt.query_row(params![id], epic_from_row) {
                Ok(epic) => Ok(Some(epic)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List a chat's live (non-deleted) epics, oldest first.
pub async fn list_epics(db: &Database, chat_id: i64) -> Result<Vec<Epic>, TimarError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, chat_id, name, description, deleted_at
                 FROM epics WHERE chat_id = ?1 AND deleted_at IS NULL ORDER BY id",
            )?;
            let rows = stmt.query_map(params![chat_id], epic_from_row)?;
            let mut epics = Vec::new();
            for row in rows {
                epics.push(row?);
            }
            Ok(epics)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Overwrite a single editable column of an epic.
pub async fn edit_epic(
    db: &Database,
    id: i64,
    column: EditColumn,
    value: &str,
) -> Result<(), TimarError> {
    let value = value.to_string();
    // Column names come from a closed enum, never from user input.
    let sql = match column {
        EditColumn::Name => "UPDATE epics SET name = ?1 WHERE id = ?2",
        EditColumn::Description => "UPDATE epics SET description = ?1 WHERE id = ?2",
    };
    db.connection()
        .call(move |conn| {
            conn.execute(sql, params![value, id])?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Soft-delete an epic by stamping `deleted_at`.
pub async fn soft_delete_epic(db: &Database, id: i64) -> Result<(), TimarError> {
    let now = ts_to_sql(Utc::now());
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE epics SET deleted_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
                params![now, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn create_and_get_epic_roundtrips() {
        let (db, _dir) = setup_db().await;

        let epic = create_epic(&db, 42, "Release", "ship it").await.unwrap();
        assert_eq!(epic.chat_id, 42);

        let fetched = get_epic(&db, epic.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Release");
        assert_eq!(fetched.description, "ship it");
        assert!(fetched.deleted_at.is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn get_nonexistent_epic_returns_none() {
        let (db, _dir) = setup_db().await;
        assert!(get_epic(&db, 999).await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_epics_scopes_to_chat_and_skips_deleted() {
        let (db, _dir) = setup_db().await;

        let mine = create_epic(&db, 1, "mine", "").await.unwrap();
        let gone = create_epic(&db, 1, "gone", "").await.unwrap();
        create_epic(&db, 2, "other chat", "").await.unwrap();

        soft_delete_epic(&db, gone.id).await.unwrap();

        let listed = list_epics(&db, 1).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, mine.id);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn soft_deleted_epic_still_resolves_by_id() {
        let (db, _dir) = setup_db().await;

        let epic = create_epic(&db, 7, "doomed", "").await.unwrap();
        soft_delete_epic(&db, epic.id).await.unwrap();

        let fetched = get_epic(&db, epic.id).await.unwrap().unwrap();
        assert_eq!(fetched.chat_id, 7);
        assert!(fetched.deleted_at.is_some());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn edit_epic_touches_only_the_named_column() {
        let (db, _dir) = setup_db().await;

        let epic = create_epic(&db, 1, "old name", "old desc").await.unwrap();
        edit_epic(&db, epic.id, EditColumn::Name, "new name")
            .await
            .unwrap();

        let fetched = get_epic(&db, epic.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "new name");
        assert_eq!(fetched.description, "old desc");

        edit_epic(&db, epic.id, EditColumn::Description, "new desc")
            .await
            .unwrap();
        let fetched = get_epic(&db, epic.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "new name");
        assert_eq!(fetched.description, "new desc");

        db.close().await.unwrap();
    }
}
