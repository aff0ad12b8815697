// SPDX-FileCopyrightText: 2026 Timar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Task CRUD operations.
//!
//! Tasks hard-delete. Ownership is transitive: a task belongs to whichever
//! chat owns its epic, which is what [`task_owner_chat`] resolves.

use rusqlite::params;
use timar_core::TimarError;

use crate::database::Database;
use crate::models::{EditColumn, Task};

fn task_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        epic_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
    })
}

/// Create a new task under an epic.
pub async fn create_task(
    db: &Database,
    epic_id: i64,
    name: &str,
    description: &str,
) -> Result<Task, TimarError> {
    let name = name.to_string();
    let description = description.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO tasks (epic_id, name, description) VALUES (?1, ?2, ?3)",
                params![epic_id, name, description],
            )?;
            Ok(Task {
                id: conn.last_insert_rowid(),
                epic_id,
                name,
                description,
            })
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a task by ID.
pub async fn get_task(db: &Database, id: i64) -> Result<Option<Task>, TimarError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn
                .prepare("SELECT id, epic_id, name, description FROM tasks WHERE id = ?1")?;
            match stmt.query_row(params![id], task_from_row) {
                Ok(task) => Ok(Some(task)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List all tasks a chat can see, oldest first. Tasks under soft-deleted
/// epics are excluded.
pub async fn list_tasks(db: &Database, chat_id: i64) -> Result<Vec<Task>, TimarError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT t.id, t.epic_id, t.name, t.description
                 FROM tasks t JOIN epics e ON e.id = t.epic_id
                 WHERE e.chat_id = ?1 AND e.deleted_at IS NULL
                 ORDER BY t.id",
            )?;
            let rows = stmt.query_map(params![chat_id], task_from_row)?;
            let mut tasks = Vec::new();
            for row in rows {
                tasks.push(row?);
            }
            Ok(tasks)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Overwrite a single editable column of a task.
pub async fn edit_task(
    db: &Database,
    id: i64,
    column: EditColumn,
    value: &str,
) -> Result<(), TimarError> {
    let value = value.to_string();
    // Column names come from a closed enum, never from user input.
    let sql = match column {
        EditColumn::Name => "UPDATE tasks SET name = ?1 WHERE id = ?2",
        EditColumn::Description => "UPDATE tasks SET description = ?1 WHERE id = ?2",
    };
    db.connection()
        .call(move |conn| {
            conn.execute(sql, params![value, id])?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Hard-delete a task.
pub async fn delete_task(db: &Database, id: i64) -> Result<(), TimarError> {
    db.connection()
        .call(move |conn| {
            conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Resolve the chat that owns a task, through its epic. Soft-deleted epics
/// still count: a task's owner does not change when the epic is deleted.
pub async fn task_owner_chat(db: &Database, task_id: i64) -> Result<Option<i64>, TimarError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT e.chat_id FROM tasks t JOIN epics e ON e.id = t.epic_id
                 WHERE t.id = ?1",
            )?;
            match stmt.query_row(params![task_id], |row| row.get(0)) {
                Ok(chat_id) => Ok(Some(chat_id)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}
