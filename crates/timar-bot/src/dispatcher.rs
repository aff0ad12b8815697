// SPDX-FileCopyrightText: 2026 Timar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event dispatch: commands first, then conversation mode for free text,
//! and a compile-time exhaustive match over decoded actions.
//!
//! Handler failures never escape the dispatcher; they are logged with the
//! chat id and the event is dropped, so one poisoned update cannot take the
//! loop down.

use timar_core::action::{self, Action, PARAM_EPIC, PARAM_TASK, PARAM_TIMELOG};
use timar_core::{InboundEvent, MessagingGateway, TimarError};
use timar_storage::queries::conversation;
use timar_storage::{ConversationMode, EditColumn};
use tracing::{debug, warn};

use crate::handlers::Bot;
use crate::texts;

impl<G: MessagingGateway> Bot<G> {
    /// Entry point for one inbound event. Infallible by design.
    pub async fn handle_event(&self, event: InboundEvent) {
        let chat_id = event.chat_id();
        let result = match event {
            InboundEvent::Text { chat_id, text } => self.handle_text(chat_id, &text).await,
            InboundEvent::Action { chat_id, token } => self.handle_action(chat_id, &token).await,
        };
        if let Err(e) = result {
            warn!(chat_id, error = %e, "event handling failed");
        }
    }

    async fn handle_text(&self, chat_id: i64, text: &str) -> Result<(), TimarError> {
        match text.trim() {
            "/start" | texts::MAIN_MENU_ALIAS => self.main_menu(chat_id).await,
            "/new_epic" => self.new_epic(chat_id).await,
            "/new_task" => self.new_task(chat_id).await,
            "/shutdown" => self.shutdown(chat_id).await,
            _ => self.handle_mode_text(chat_id, text).await,
        }
    }

    /// Free text that is not a command is interpreted through the chat's
    /// conversation mode.
    async fn handle_mode_text(&self, chat_id: i64, text: &str) -> Result<(), TimarError> {
        let state = conversation::get_state_and_params(self.db(), chat_id).await?;
        match state.mode {
            ConversationMode::CreateEpic => self.create_epic_input(chat_id, text).await,
            ConversationMode::CreateTask => {
                self.create_task_input(chat_id, text, &state.params).await
            }
            ConversationMode::EditEpic => self.edit_epic_input(chat_id, text, &state.params).await,
            ConversationMode::EditTask => self.edit_task_input(chat_id, text, &state.params).await,
            ConversationMode::Normal | ConversationMode::ReportDuration => {
                warn!(chat_id, mode = ?state.mode, text, "unmatched message, ignoring");
                Ok(())
            }
        }
    }

    async fn handle_action(&self, chat_id: i64, token: &str) -> Result<(), TimarError> {
        let decoded = match action::decode(token) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!(chat_id, error = %e, "dropping undecodable action token");
                return Ok(());
            }
        };
        debug!(chat_id, action = %decoded.action, "dispatching action");

        match decoded.action {
            Action::MainMenu => self.main_menu(chat_id).await,
            Action::EpicList => self.epic_list(chat_id).await,
            Action::TaskList => self.task_list(chat_id).await,
            Action::PickEpic => {
                self.pick_epic(chat_id, decoded.param_i64(PARAM_EPIC)?).await
            }
            Action::EpicMenu => {
                self.epic_menu(chat_id, decoded.param_i64(PARAM_EPIC)?).await
            }
            Action::TaskMenu => {
                self.task_menu(chat_id, decoded.param_i64(PARAM_TASK)?).await
            }
            Action::EditEpicName => {
                self.edit_epic_prompt(chat_id, decoded.param_i64(PARAM_EPIC)?, EditColumn::Name)
                    .await
            }
            Action::EditEpicDesc => {
                self.edit_epic_prompt(
                    chat_id,
                    decoded.param_i64(PARAM_EPIC)?,
                    EditColumn::Description,
                )
                .await
            }
            Action::EditTaskName => {
                self.edit_task_prompt(chat_id, decoded.param_i64(PARAM_TASK)?, EditColumn::Name)
                    .await
            }
            Action::EditTaskDesc => {
                self.edit_task_prompt(
                    chat_id,
                    decoded.param_i64(PARAM_TASK)?,
                    EditColumn::Description,
                )
                .await
            }
            Action::DeleteEpic => {
                self.delete_epic(chat_id, decoded.param_i64(PARAM_EPIC)?).await
            }
            Action::DeleteTask => {
                self.delete_task(chat_id, decoded.param_i64(PARAM_TASK)?).await
            }
            Action::TimerStart => {
                self.timer_start(chat_id, decoded.param_i64(PARAM_TASK)?).await
            }
            Action::TimerStop => {
                self.timer_stop(chat_id, decoded.param_i64(PARAM_TIMELOG)?)
                    .await
            }
            Action::TimerDelete => {
                self.timer_delete(chat_id, decoded.param_i64(PARAM_TIMELOG)?)
                    .await
            }
        }
    }
}
