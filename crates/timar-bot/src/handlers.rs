// SPDX-FileCopyrightText: 2026 Timar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-action and per-mode handlers.
//!
//! Every handler replies to the acting chat only, and every operation on a
//! stored entity first resolves ownership through the entity's chat (for
//! tasks, transitively through the epic). Failed ownership checks are logged
//! and the action is dropped; only task deletion replies with an explicit
//! refusal.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use timar_core::action::{self, Action, ActionButton, PARAM_EPIC, PARAM_TASK, PARAM_TIMELOG};
use timar_core::{Keyboard, MessageRef, MessagingGateway, TimarError};
use timar_storage::queries::{conversation, epics, tasks, timelogs};
use timar_storage::{ConversationMode, Database, EditColumn, Epic, Task, TimelogStatus};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::job::DisplayMetadata;
use crate::texts;

/// Keyboard layout bounds: rows wrap at this many display characters or
/// this many buttons, whichever comes first.
pub(crate) const ROW_WIDTH: usize = 32;
pub(crate) const ROW_CAPACITY: usize = 3;

/// Conversation-state param keys. These live server-side in the state row,
/// not in action tokens, so they can afford full names.
const STATE_EPIC_ID: &str = "epic_id";
const STATE_TASK_ID: &str = "task_id";
const STATE_COLUMN: &str = "column";

/// The bot: one instance per process, shared by the dispatcher loop and
/// nothing else. The refresh job talks to the gateway and database directly.
pub struct Bot<G> {
    gateway: Arc<G>,
    db: Database,
    admin_chat_id: Option<i64>,
    shutdown: CancellationToken,
}

/// Stop/discard keyboard attached to a live timer message. Rebuilt by the
/// refresh job on every tick, so it must be derivable from ids alone.
pub(crate) fn timer_keyboard(chat_id: i64, timelog_id: i64) -> Result<Keyboard, TimarError> {
    action::pack(
        &[
            ActionButton::new(Action::TimerStop)
                .with_label(texts::BTN_STOP_TIMER)
                .with_param(PARAM_TIMELOG, timelog_id),
            ActionButton::new(Action::TimerDelete)
                .with_label(texts::BTN_DELETE_TIMER)
                .with_param(PARAM_TIMELOG, timelog_id),
        ],
        chat_id,
        ROW_WIDTH,
        ROW_CAPACITY,
    )
}

/// Split a creation message into (title, description): first line is the
/// title, remaining lines joined are the description.
fn split_title_description(text: &str) -> (String, String) {
    match text.split_once('\n') {
        Some((title, rest)) => (title.trim().to_string(), rest.trim().to_string()),
        None => (text.trim().to_string(), String::new()),
    }
}

impl<G: MessagingGateway> Bot<G> {
    pub fn new(
        gateway: Arc<G>,
        db: Database,
        admin_chat_id: Option<i64>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            gateway,
            db,
            admin_chat_id,
            shutdown,
        }
    }

    /// Sends a reply; a missing keyboard falls back to a lone main-menu
    /// button so the user can always navigate somewhere.
    async fn send(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<MessageRef, TimarError> {
        let keyboard = match keyboard {
            Some(k) => k,
            None => action::pack(
                &[ActionButton::new(Action::MainMenu).with_label(texts::BTN_MAIN_MENU)],
                chat_id,
                ROW_WIDTH,
                ROW_CAPACITY,
            )?,
        };
        self.gateway.send_message(chat_id, text, Some(keyboard)).await
    }

    /// Resolves an epic the acting chat may operate on: it must exist, be
    /// live, and belong to that chat.
    async fn owned_epic(&self, chat_id: i64, epic_id: i64) -> Result<Option<Epic>, TimarError> {
        match epics::get_epic(&self.db, epic_id).await? {
            Some(epic) if epic.chat_id == chat_id && epic.deleted_at.is_none() => Ok(Some(epic)),
            Some(epic) => {
                warn!(
                    chat_id,
                    epic_id,
                    owner = epic.chat_id,
                    deleted = epic.deleted_at.is_some(),
                    "epic not operable by this chat"
                );
                Ok(None)
            }
            None => {
                warn!(chat_id, epic_id, "epic not found");
                Ok(None)
            }
        }
    }

    /// Resolves a task the acting chat may operate on, through its epic.
    async fn owned_task(&self, chat_id: i64, task_id: i64) -> Result<Option<Task>, TimarError> {
        match tasks::task_owner_chat(&self.db, task_id).await? {
            Some(owner) if owner == chat_id => tasks::get_task(&self.db, task_id).await,
            Some(owner) => {
                warn!(chat_id, task_id, owner, "task belongs to another chat");
                Ok(None)
            }
            None => {
                warn!(chat_id, task_id, "task not found");
                Ok(None)
            }
        }
    }

    pub async fn main_menu(&self, chat_id: i64) -> Result<(), TimarError> {
        let keyboard = action::pack(
            &[
                ActionButton::new(Action::TaskList).with_label(texts::BTN_MANAGE_TASKS),
                ActionButton::new(Action::EpicList).with_label(texts::BTN_MANAGE_EPICS),
            ],
            chat_id,
            ROW_WIDTH,
            ROW_CAPACITY,
        )?;
        self.send(chat_id, texts::WELCOME, Some(keyboard)).await?;
        Ok(())
    }

    pub async fn epic_list(&self, chat_id: i64) -> Result<(), TimarError> {
        let user_epics = epics::list_epics(&self.db, chat_id).await?;
        if user_epics.is_empty() {
            self.send(chat_id, texts::MANAGE_EPICS_EMPTY, None).await?;
            return Ok(());
        }

        let buttons: Vec<ActionButton> = user_epics
            .iter()
            .map(|epic| {
                ActionButton::new(Action::EpicMenu)
                    .with_label(&epic.name)
                    .with_param(PARAM_EPIC, epic.id)
            })
            .collect();
        let keyboard = action::pack(&buttons, chat_id, ROW_WIDTH, ROW_CAPACITY)?;
        self.send(chat_id, texts::MANAGE_EPICS, Some(keyboard)).await?;
        Ok(())
    }

    pub async fn task_list(&self, chat_id: i64) -> Result<(), TimarError> {
        let user_tasks = tasks::list_tasks(&self.db, chat_id).await?;
        if user_tasks.is_empty() {
            self.send(chat_id, texts::MANAGE_TASKS_EMPTY, None).await?;
            return Ok(());
        }

        let buttons: Vec<ActionButton> = user_tasks
            .iter()
            .map(|task| {
                ActionButton::new(Action::TaskMenu)
                    .with_label(&task.name)
                    .with_param(PARAM_TASK, task.id)
            })
            .collect();
        let keyboard = action::pack(&buttons, chat_id, ROW_WIDTH, ROW_CAPACITY)?;
        self.send(chat_id, texts::MANAGE_TASKS, Some(keyboard)).await?;
        Ok(())
    }

    pub async fn new_epic(&self, chat_id: i64) -> Result<(), TimarError> {
        conversation::set_state(&self.db, chat_id, ConversationMode::CreateEpic, &Map::new())
            .await?;
        self.send(chat_id, texts::NEW_EPIC_PROMPT, None).await?;
        Ok(())
    }

    pub async fn new_task(&self, chat_id: i64) -> Result<(), TimarError> {
        let user_epics = epics::list_epics(&self.db, chat_id).await?;
        if user_epics.is_empty() {
            self.send(chat_id, texts::NO_EPICS, None).await?;
            return Ok(());
        }

        let buttons: Vec<ActionButton> = user_epics
            .iter()
            .map(|epic| {
                ActionButton::new(Action::PickEpic)
                    .with_label(&epic.name)
                    .with_param(PARAM_EPIC, epic.id)
            })
            .collect();
        let keyboard = action::pack(&buttons, chat_id, ROW_WIDTH, ROW_CAPACITY)?;
        self.send(chat_id, texts::SELECT_EPIC_FOR_TASK, Some(keyboard))
            .await?;
        Ok(())
    }

    pub async fn pick_epic(&self, chat_id: i64, epic_id: i64) -> Result<(), TimarError> {
        if self.owned_epic(chat_id, epic_id).await?.is_none() {
            return Ok(());
        }
        let mut params = Map::new();
        params.insert(STATE_EPIC_ID.to_string(), Value::from(epic_id));
        conversation::set_state(&self.db, chat_id, ConversationMode::CreateTask, &params).await?;
        self.send(chat_id, texts::NEW_TASK_PROMPT, None).await?;
        Ok(())
    }

    pub async fn create_epic_input(&self, chat_id: i64, text: &str) -> Result<(), TimarError> {
        let (title, description) = split_title_description(text);
        epics::create_epic(&self.db, chat_id, &title, &description).await?;
        conversation::clear_state(&self.db, chat_id).await?;
        self.send(chat_id, &texts::epic_created(&title), None).await?;
        Ok(())
    }

    pub async fn create_task_input(
        &self,
        chat_id: i64,
        text: &str,
        state_params: &Map<String, Value>,
    ) -> Result<(), TimarError> {
        let Some(epic_id) = state_params.get(STATE_EPIC_ID).and_then(Value::as_i64) else {
            warn!(chat_id, "create-task state has no epic id, resetting");
            conversation::clear_state(&self.db, chat_id).await?;
            return Ok(());
        };
        // The epic may have been deleted or hijacked between pick and input.
        if self.owned_epic(chat_id, epic_id).await?.is_none() {
            conversation::clear_state(&self.db, chat_id).await?;
            return Ok(());
        }

        let (title, description) = split_title_description(text);
        tasks::create_task(&self.db, epic_id, &title, &description).await?;
        conversation::clear_state(&self.db, chat_id).await?;
        self.send(chat_id, &texts::task_created(&title), None).await?;
        Ok(())
    }

    pub async fn epic_menu(&self, chat_id: i64, epic_id: i64) -> Result<(), TimarError> {
        let Some(epic) = self.owned_epic(chat_id, epic_id).await? else {
            return Ok(());
        };
        let keyboard = action::pack(
            &[
                ActionButton::new(Action::EditEpicName)
                    .with_label(texts::BTN_EDIT_NAME)
                    .with_param(PARAM_EPIC, epic_id),
                ActionButton::new(Action::EditEpicDesc)
                    .with_label(texts::BTN_EDIT_DESCRIPTION)
                    .with_param(PARAM_EPIC, epic_id),
                ActionButton::new(Action::DeleteEpic)
                    .with_label(texts::BTN_DELETE_EPIC)
                    .with_param(PARAM_EPIC, epic_id),
            ],
            chat_id,
            ROW_WIDTH,
            ROW_CAPACITY,
        )?;
        self.send(
            chat_id,
            &texts::epic_overview(&epic.name, &epic.description),
            Some(keyboard),
        )
        .await?;
        Ok(())
    }

    pub async fn task_menu(&self, chat_id: i64, task_id: i64) -> Result<(), TimarError> {
        let Some(task) = self.owned_task(chat_id, task_id).await? else {
            return Ok(());
        };
        let keyboard = action::pack(
            &[
                ActionButton::new(Action::EditTaskName)
                    .with_label(texts::BTN_EDIT_NAME)
                    .with_param(PARAM_TASK, task_id),
                ActionButton::new(Action::EditTaskDesc)
                    .with_label(texts::BTN_EDIT_DESCRIPTION)
                    .with_param(PARAM_TASK, task_id),
                ActionButton::new(Action::DeleteTask)
                    .with_label(texts::BTN_DELETE_TASK)
                    .with_param(PARAM_TASK, task_id),
                ActionButton::new(Action::TimerStart)
                    .with_label(texts::BTN_START_TIMER)
                    .with_param(PARAM_TASK, task_id),
            ],
            chat_id,
            ROW_WIDTH,
            ROW_CAPACITY,
        )?;
        self.send(
            chat_id,
            &texts::task_overview(&task.name, &task.description),
            Some(keyboard),
        )
        .await?;
        Ok(())
    }

    pub async fn edit_epic_prompt(
        &self,
        chat_id: i64,
        epic_id: i64,
        column: EditColumn,
    ) -> Result<(), TimarError> {
        if self.owned_epic(chat_id, epic_id).await?.is_none() {
            return Ok(());
        }
        let mut params = Map::new();
        params.insert(STATE_EPIC_ID.to_string(), Value::from(epic_id));
        params.insert(STATE_COLUMN.to_string(), Value::from(column.to_string()));
        conversation::set_state(&self.db, chat_id, ConversationMode::EditEpic, &params).await?;
        self.send(chat_id, texts::EDIT_PROMPT, None).await?;
        Ok(())
    }

    pub async fn edit_task_prompt(
        &self,
        chat_id: i64,
        task_id: i64,
        column: EditColumn,
    ) -> Result<(), TimarError> {
        if self.owned_task(chat_id, task_id).await?.is_none() {
            return Ok(());
        }
        let mut params = Map::new();
        params.insert(STATE_TASK_ID.to_string(), Value::from(task_id));
        params.insert(STATE_COLUMN.to_string(), Value::from(column.to_string()));
        conversation::set_state(&self.db, chat_id, ConversationMode::EditTask, &params).await?;
        self.send(chat_id, texts::EDIT_PROMPT, None).await?;
        Ok(())
    }

    /// Shared tail of the two edit modes: pull the target id and column out
    /// of the stashed state params.
    fn edit_state_target(
        chat_id: i64,
        id_key: &str,
        state_params: &Map<String, Value>,
    ) -> Option<(i64, EditColumn)> {
        let id = state_params.get(id_key).and_then(Value::as_i64)?;
        let column = state_params
            .get(STATE_COLUMN)
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<EditColumn>().ok());
        match column {
            Some(column) => Some((id, column)),
            None => {
                warn!(chat_id, id_key, "edit state has no valid column");
                None
            }
        }
    }

    pub async fn edit_epic_input(
        &self,
        chat_id: i64,
        value: &str,
        state_params: &Map<String, Value>,
    ) -> Result<(), TimarError> {
        let Some((epic_id, column)) = Self::edit_state_target(chat_id, STATE_EPIC_ID, state_params)
        else {
            conversation::clear_state(&self.db, chat_id).await?;
            return Ok(());
        };
        if self.owned_epic(chat_id, epic_id).await?.is_none() {
            conversation::clear_state(&self.db, chat_id).await?;
            return Ok(());
        }
        epics::edit_epic(&self.db, epic_id, column, value).await?;
        conversation::clear_state(&self.db, chat_id).await?;
        self.send(chat_id, texts::EPIC_EDITED, None).await?;
        Ok(())
    }

    pub async fn edit_task_input(
        &self,
        chat_id: i64,
        value: &str,
        state_params: &Map<String, Value>,
    ) -> Result<(), TimarError> {
        let Some((task_id, column)) = Self::edit_state_target(chat_id, STATE_TASK_ID, state_params)
        else {
            conversation::clear_state(&self.db, chat_id).await?;
            return Ok(());
        };
        if self.owned_task(chat_id, task_id).await?.is_none() {
            conversation::clear_state(&self.db, chat_id).await?;
            return Ok(());
        }
        tasks::edit_task(&self.db, task_id, column, value).await?;
        conversation::clear_state(&self.db, chat_id).await?;
        self.send(chat_id, texts::TASK_EDITED, None).await?;
        Ok(())
    }

    pub async fn delete_epic(&self, chat_id: i64, epic_id: i64) -> Result<(), TimarError> {
        let Some(epic) = self.owned_epic(chat_id, epic_id).await? else {
            return Ok(());
        };
        epics::soft_delete_epic(&self.db, epic_id).await?;
        self.send(chat_id, &texts::epic_deleted(&epic.name), None)
            .await?;
        Ok(())
    }

    pub async fn delete_task(&self, chat_id: i64, task_id: i64) -> Result<(), TimarError> {
        match tasks::task_owner_chat(&self.db, task_id).await? {
            None => {
                warn!(chat_id, task_id, "task not found");
                Ok(())
            }
            // Same policy as epics: no reply, so a requester cannot tell a
            // foreign task from a missing one.
            Some(owner) if owner != chat_id => {
                warn!(chat_id, task_id, owner, "refusing cross-chat task deletion");
                Ok(())
            }
            Some(_) => {
                let Some(task) = tasks::get_task(&self.db, task_id).await? else {
                    return Ok(());
                };
                tasks::delete_task(&self.db, task_id).await?;
                self.send(chat_id, &texts::task_deleted(&task.name), None)
                    .await?;
                Ok(())
            }
        }
    }

    pub async fn timer_start(&self, chat_id: i64, task_id: i64) -> Result<(), TimarError> {
        let Some(task) = self.owned_task(chat_id, task_id).await? else {
            return Ok(());
        };

        let timelog = timelogs::create_timelog(&self.db, task_id, Utc::now()).await?;
        let keyboard = timer_keyboard(chat_id, timelog.id)?;
        let sent = self
            .send(
                chat_id,
                &texts::timer_running(&task.name, "0 seconds"),
                Some(keyboard),
            )
            .await?;

        let metadata = DisplayMetadata { message: sent };
        let metadata = serde_json::to_string(&metadata)
            .map_err(|e| TimarError::Internal(format!("metadata serialization failed: {e}")))?;
        timelogs::attach_display_metadata(&self.db, timelog.id, &metadata).await?;
        Ok(())
    }

    pub async fn timer_stop(&self, chat_id: i64, timelog_id: i64) -> Result<(), TimarError> {
        let now = Utc::now();
        let won =
            timelogs::complete_if_running(&self.db, timelog_id, now, TimelogStatus::Done).await?;
        if !won {
            // Double tap or a race with another stop; first writer already
            // answered.
            debug!(chat_id, timelog_id, "ignoring stop of a non-running timer");
            return Ok(());
        }

        let timelog = timelogs::get_timelog(&self.db, timelog_id)
            .await?
            .ok_or(TimarError::NotFound {
                entity: "timelog",
                id: timelog_id,
            })?;
        let name = tasks::get_task(&self.db, timelog.task_id)
            .await?
            .map(|t| t.name)
            .unwrap_or_else(|| "task".to_string());
        let elapsed = texts::elapsed_or_zero(timelog.elapsed_text(now));
        self.send(chat_id, &texts::timer_stopped(&name, &elapsed), None)
            .await?;
        Ok(())
    }

    pub async fn timer_delete(&self, chat_id: i64, timelog_id: i64) -> Result<(), TimarError> {
        timelogs::delete_timelog(&self.db, timelog_id).await?;
        self.send(chat_id, texts::TIMER_DELETED, None).await?;
        Ok(())
    }

    pub async fn shutdown(&self, chat_id: i64) -> Result<(), TimarError> {
        if self.admin_chat_id != Some(chat_id) {
            warn!(chat_id, "unauthorized shutdown request");
            return Ok(());
        }
        self.send(chat_id, texts::SHUTTING_DOWN, None).await?;
        self.shutdown.cancel();
        Ok(())
    }

    pub(crate) fn db(&self) -> &Database {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_takes_first_line_as_title() {
        let (title, description) = split_title_description("Release\nship it\nsoon");
        assert_eq!(title, "Release");
        assert_eq!(description, "ship it\nsoon");
    }

    #[test]
    fn split_without_newline_has_empty_description() {
        let (title, description) = split_title_description("  Release  ");
        assert_eq!(title, "Release");
        assert_eq!(description, "");
    }

    #[test]
    fn timer_keyboard_is_one_row_of_two() {
        let keyboard = timer_keyboard(1, 5).unwrap();
        assert_eq!(keyboard.len(), 1);
        assert_eq!(keyboard[0].len(), 2);
        assert_eq!(keyboard[0][0].text, texts::BTN_STOP_TIMER);
        assert_eq!(keyboard[0][1].text, texts::BTN_DELETE_TIMER);
    }
}
