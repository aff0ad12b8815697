// SPDX-FileCopyrightText: 2026 Timar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-chat conversation state.
//!
//! One row per chat, upserted on every mode change. The params column is a
//! JSON object serialized as text; the store does not interpret it. An
//! absent row reads back as `Normal` with empty params.

use rusqlite::params;
use serde_json::{Map, Value};
use timar_core::TimarError;
use tracing::warn;

use crate::database::Database;
use crate::models::{ConversationMode, ConversationState};
use crate::queries::enum_from_sql;

/// Set a chat's mode and params, replacing whatever was there.
pub async fn set_state(
    db: &Database,
    chat_id: i64,
    mode: ConversationMode,
    state_params: &Map<String, Value>,
) -> Result<(), TimarError> {
    let mode_sql = mode.to_string();
    let params_sql = Value::Object(state_params.clone()).to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO conversation_state (chat_id, mode, params) VALUES (?1, ?2, ?3)
                 ON CONFLICT (chat_id) DO UPDATE SET mode = excluded.mode,
                                                     params = excluded.params",
                params![chat_id, mode_sql, params_sql],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Reset a chat back to normal mode with no stashed params.
pub async fn clear_state(db: &Database, chat_id: i64) -> Result<(), TimarError> {
    set_state(db, chat_id, ConversationMode::Normal, &Map::new()).await
}

/// A chat's current mode. Absent row means `Normal`.
pub async fn get_state(db: &Database, chat_id: i64) -> Result<ConversationMode, TimarError> {
    Ok(get_state_and_params(db, chat_id).await?.mode)
}

/// A chat's mode together with its stashed params. Absent row means
/// `Normal` with empty params. Unparseable params are treated as empty
/// rather than wedging the chat.
pub async fn get_state_and_params(
    db: &Database,
    chat_id: i64,
) -> Result<ConversationState, TimarError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn
                .prepare("SELECT mode, params FROM conversation_state WHERE chat_id = ?1")?;
            let row = stmt.query_row(params![chat_id], |row| {
                let mode: String = row.get(0)?;
                let raw: Option<String> = row.get(1)?;
                Ok((enum_from_sql::<ConversationMode>(0, mode)?, raw))
            });
            match row {
                Ok((mode, raw)) => {
                    let state_params = match raw {
                        None => Map::new(),
                        Some(s) => match serde_json::from_str::<Value>(&s) {
                            Ok(Value::Object(map)) => map,
                            _ => {
                                warn!(chat_id, "discarding unreadable conversation params");
                                Map::new()
                            }
                        },
                    };
                    Ok(ConversationState {
                        mode,
                        params: state_params,
                    })
                }
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(ConversationState::default()),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn params_of(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn absent_row_reads_as_normal_with_empty_params() {
        let (db, _dir) = setup_db().await;

        let state = get_state_and_params(&db, 123).await.unwrap();
        assert_eq!(state.mode, ConversationMode::Normal);
        assert!(state.params.is_empty());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn set_then_get_roundtrips_mode_and_params() {
        let (db, _dir) = setup_db().await;

        let p = params_of(&[("epic_id", json!(7))]);
        set_state(&db, 5, ConversationMode::CreateTask, &p)
            .await
            .unwrap();

        let state = get_state_and_params(&db, 5).await.unwrap();
        assert_eq!(state.mode, ConversationMode::CreateTask);
        assert_eq!(state.params.get("epic_id"), Some(&json!(7)));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn second_set_replaces_mode_and_params() {
        let (db, _dir) = setup_db().await;

        set_state(
            &db,
            5,
            ConversationMode::EditEpic,
            &params_of(&[("epic_id", json!(1)), ("column", json!("name"))]),
        )
        .await
        .unwrap();
        set_state(&db, 5, ConversationMode::CreateEpic, &Map::new())
            .await
            .unwrap();

        let state = get_state_and_params(&db, 5).await.unwrap();
        assert_eq!(state.mode, ConversationMode::CreateEpic);
        assert!(state.params.is_empty());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn clear_state_resets_to_normal() {
        let (db, _dir) = setup_db().await;

        set_state(
            &db,
            9,
            ConversationMode::EditTask,
            &params_of(&[("task_id", json!(3))]),
        )
        .await
        .unwrap();
        clear_state(&db, 9).await.unwrap();

        assert_eq!(get_state(&db, 9).await.unwrap(), ConversationMode::Normal);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn states_are_scoped_per_chat() {
        let (db, _dir) = setup_db().await;

        set_state(&db, 1, ConversationMode::CreateEpic, &Map::new())
            .await
            .unwrap();

        assert_eq!(get_state(&db, 1).await.unwrap(), ConversationMode::CreateEpic);
        assert_eq!(get_state(&db, 2).await.unwrap(), ConversationMode::Normal);

        db.close().await.unwrap();
    }
}
