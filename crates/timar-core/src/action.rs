// SPDX-FileCopyrightText: 2026 Timar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inline action-button codec.
//!
//! Every inline button carries an opaque JSON token with the routing action,
//! the originating `chat_id`, and a small bag of handler parameters. The token
//! is the only channel through which parameters travel between building a
//! reply and the button's activation, so it must round-trip losslessly and
//! stay inside the transport's payload limit.
//!
//! Token parameter sub-schema (all integer-valued):
//! - [`PARAM_EPIC`] is an epic id
//! - [`PARAM_TASK`] is a task id
//! - [`PARAM_TIMELOG`] is a timelog id
//!
//! Keys are deliberately short: Telegram caps callback data at 64 bytes and a
//! 10-digit chat id plus a snake_case action name already consume most of it.

use serde_json::{Map, Value};
use strum::{Display, EnumString};

use crate::error::TimarError;
use crate::types::InlineButton;

/// Hard upper bound on an encoded token, from Telegram's callback-data limit.
/// Exceeding it is an encode error, never a silent truncation.
pub const MAX_TOKEN_BYTES: usize = 64;

/// Token parameter key for an epic id.
pub const PARAM_EPIC: &str = "epic";
/// Token parameter key for a task id.
pub const PARAM_TASK: &str = "task";
/// Token parameter key for a timelog id.
pub const PARAM_TIMELOG: &str = "timelog";

/// The closed set of routing actions an inline button can carry.
///
/// The dispatcher matches exhaustively over this enum, so adding a variant
/// without wiring a handler is a compile error. Edit-column selection is
/// expressed as distinct variants (`Edit*Name` / `Edit*Desc`) instead of a
/// `column` parameter to keep worst-case tokens inside [`MAX_TOKEN_BYTES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    MainMenu,
    EpicList,
    TaskList,
    PickEpic,
    EpicMenu,
    TaskMenu,
    EditEpicName,
    EditEpicDesc,
    EditTaskName,
    EditTaskDesc,
    DeleteEpic,
    DeleteTask,
    TimerStart,
    TimerStop,
    TimerDelete,
}

/// A button under construction: an action, a display label, and bound
/// parameters. Not persisted anywhere; encoded into the outbound keyboard and
/// decoded back by the dispatcher on activation.
///
/// Two buttons are equal when their actions are equal; the label and the
/// bound parameters are arguments, not identity.
#[derive(Debug, Clone)]
pub struct ActionButton {
    action: Action,
    label: String,
    params: Map<String, Value>,
}

impl PartialEq for ActionButton {
    fn eq(&self, other: &Self) -> bool {
        self.action == other.action
    }
}

impl Eq for ActionButton {}

impl ActionButton {
    /// Creates a button for `action` with the label defaulting to the
    /// action's wire name.
    pub fn new(action: Action) -> Self {
        Self {
            action,
            label: action.to_string(),
            params: Map::new(),
        }
    }

    /// Replaces the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Binds an integer parameter under `key`.
    pub fn with_param(mut self, key: &str, value: i64) -> Self {
        self.params.insert(key.to_string(), Value::from(value));
        self
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// A successfully decoded action token.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAction {
    pub action: Action,
    pub chat_id: i64,
    /// Every token key other than `action` and `chat_id`, untouched.
    pub params: Map<String, Value>,
}

impl DecodedAction {
    /// Reads an integer parameter, failing with `MalformedAction` when the
    /// key is absent or not an integer.
    pub fn param_i64(&self, key: &str) -> Result<i64, TimarError> {
        self.params
            .get(key)
            .and_then(Value::as_i64)
            .ok_or_else(|| TimarError::MalformedAction(format!("missing integer param `{key}`")))
    }
}

/// Encodes an action plus parameter bag into an opaque token.
///
/// The token is a compact JSON object carrying `action`, `chat_id`, and all
/// entries of `params`. Tokens longer than [`MAX_TOKEN_BYTES`] are rejected.
pub fn encode(
    action: Action,
    chat_id: i64,
    params: &Map<String, Value>,
) -> Result<String, TimarError> {
    let mut body = Map::new();
    body.insert("action".to_string(), Value::from(action.to_string()));
    body.insert("chat_id".to_string(), Value::from(chat_id));
    for (key, value) in params {
        body.insert(key.clone(), value.clone());
    }

    let token = serde_json::to_string(&Value::Object(body))
        .map_err(|e| TimarError::Internal(format!("token serialization failed: {e}")))?;

    if token.len() > MAX_TOKEN_BYTES {
        return Err(TimarError::Validation(format!(
            "action token is {} bytes, limit is {MAX_TOKEN_BYTES} (action {action})",
            token.len(),
        )));
    }
    Ok(token)
}

/// Decodes a token back into its action, chat id, and parameter bag.
///
/// Tolerant of extra keys (they land in `params`); fails closed with
/// `MalformedAction` on unparseable JSON, a missing/unknown `action`, or a
/// missing/non-integer `chat_id`.
pub fn decode(token: &str) -> Result<DecodedAction, TimarError> {
    let mut body: Map<String, Value> = serde_json::from_str(token)
        .map_err(|e| TimarError::MalformedAction(format!("not a JSON object: {e}")))?;

    let action = match body.remove("action") {
        Some(Value::String(name)) => name
            .parse::<Action>()
            .map_err(|_| TimarError::MalformedAction(format!("unknown action `{name}`")))?,
        _ => return Err(TimarError::MalformedAction("missing `action` key".into())),
    };

    let chat_id = body
        .remove("chat_id")
        .as_ref()
        .and_then(Value::as_i64)
        .ok_or_else(|| TimarError::MalformedAction("missing integer `chat_id`".into()))?;

    Ok(DecodedAction {
        action,
        chat_id,
        params: body,
    })
}

/// Packs buttons into display rows with a first-fit greedy heuristic.
///
/// A button joins the current row while the running sum of display-text
/// character counts stays at or under `row_width` and the row holds fewer
/// than `row_capacity` entries; otherwise a new row starts. A single button
/// wider than `row_width` still gets a row of its own.
pub fn pack(
    buttons: &[ActionButton],
    chat_id: i64,
    row_width: usize,
    row_capacity: usize,
) -> Result<Vec<Vec<InlineButton>>, TimarError> {
    let mut rows: Vec<Vec<InlineButton>> = Vec::new();
    let mut row: Vec<InlineButton> = Vec::new();
    let mut used = 0usize;

    for button in buttons {
        let width = button.label.chars().count();
        if !row.is_empty() && (used + width > row_width || row.len() >= row_capacity) {
            rows.push(std::mem::take(&mut row));
            used = 0;
        }
        row.push(InlineButton {
            text: button.label.clone(),
            token: encode(button.action, chat_id, &button.params)?,
        });
        used += width;
    }
    if !row.is_empty() {
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(entries: &[(&str, i64)]) -> Map<String, Value> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), Value::from(*v)))
            .collect()
    }

    #[test]
    fn encode_decode_roundtrips() {
        let params = params(&[(PARAM_EPIC, 42)]);
        let token = encode(Action::PickEpic, 1234567890, &params).unwrap();
        let decoded = decode(&token).unwrap();
        assert_eq!(decoded.action, Action::PickEpic);
        assert_eq!(decoded.chat_id, 1234567890);
        assert_eq!(decoded.params, params);
    }

    #[test]
    fn encode_decode_roundtrips_empty_params() {
        let token = encode(Action::MainMenu, 7, &Map::new()).unwrap();
        let decoded = decode(&token).unwrap();
        assert_eq!(decoded.action, Action::MainMenu);
        assert_eq!(decoded.chat_id, 7);
        assert!(decoded.params.is_empty());
    }

    #[test]
    fn worst_case_tokens_fit_the_limit() {
        // 10-digit chat id, 4-digit entity ids: the widest tokens any
        // handler builds. Each must encode, i.e. stay within 64 bytes.
        let cases: Vec<(Action, Map<String, Value>)> = vec![
            (Action::EditTaskDesc, params(&[(PARAM_TASK, 9999)])),
            (Action::EditEpicDesc, params(&[(PARAM_EPIC, 9999)])),
            (Action::PickEpic, params(&[(PARAM_EPIC, 9999)])),
            (Action::TimerStart, params(&[(PARAM_TASK, 9999)])),
            (Action::TimerStop, params(&[(PARAM_TIMELOG, 9999)])),
            (Action::TimerDelete, params(&[(PARAM_TIMELOG, 9999)])),
        ];
        for (action, params) in cases {
            let token = encode(action, 9_999_999_999, &params).unwrap();
            assert!(token.len() <= MAX_TOKEN_BYTES, "{action}: {}", token.len());
        }
    }

    #[test]
    fn oversized_token_is_an_error() {
        let mut params = Map::new();
        params.insert("note".to_string(), Value::from("x".repeat(80)));
        let err = encode(Action::TaskMenu, 1, &params).unwrap_err();
        assert!(matches!(err, TimarError::Validation(_)));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            decode("not json at all"),
            Err(TimarError::MalformedAction(_))
        ));
    }

    #[test]
    fn decode_rejects_unknown_action() {
        assert!(matches!(
            decode(r#"{"action":"frobnicate","chat_id":1}"#),
            Err(TimarError::MalformedAction(_))
        ));
    }

    #[test]
    fn decode_rejects_missing_chat_id() {
        assert!(matches!(
            decode(r#"{"action":"main_menu"}"#),
            Err(TimarError::MalformedAction(_))
        ));
    }

    #[test]
    fn decode_tolerates_extra_keys() {
        let decoded = decode(r#"{"action":"main_menu","chat_id":1,"extra":5}"#).unwrap();
        assert_eq!(decoded.action, Action::MainMenu);
        assert_eq!(decoded.params.get("extra"), Some(&Value::from(5)));
    }

    #[test]
    fn buttons_compare_by_action_only() {
        let a = ActionButton::new(Action::EpicMenu).with_label("Sprint 1");
        let b = ActionButton::new(Action::EpicMenu)
            .with_label("Sprint 2")
            .with_param(PARAM_EPIC, 2);
        assert_eq!(a, b);
        assert_ne!(a, ActionButton::new(Action::TaskMenu));
    }

    #[test]
    fn pack_width_bound_splits_rows() {
        // Two 10-char labels with row width 15: the second no longer fits.
        let buttons = vec![
            ActionButton::new(Action::EpicMenu).with_label("aaaaaaaaaa"),
            ActionButton::new(Action::EpicMenu).with_label("bbbbbbbbbb"),
        ];
        let rows = pack(&buttons, 1, 15, 2).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 1);
        assert_eq!(rows[1].len(), 1);
        assert_eq!(rows[0][0].text, "aaaaaaaaaa");
        assert_eq!(rows[1][0].text, "bbbbbbbbbb");
    }

    #[test]
    fn pack_capacity_bound_splits_rows() {
        // Three 5-char labels, width 15 capacity 2: capacity wins first.
        let buttons = vec![
            ActionButton::new(Action::EpicMenu).with_label("aaaaa"),
            ActionButton::new(Action::EpicMenu).with_label("bbbbb"),
            ActionButton::new(Action::EpicMenu).with_label("ccccc"),
        ];
        let rows = pack(&buttons, 1, 15, 2).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[1].len(), 1);
    }

    #[test]
    fn pack_oversized_label_gets_own_row() {
        let buttons = vec![
            ActionButton::new(Action::EpicMenu).with_label("wider than the row"),
            ActionButton::new(Action::EpicMenu).with_label("x"),
        ];
        let rows = pack(&buttons, 1, 10, 4).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 1);
    }

    #[test]
    fn pack_empty_input_yields_no_rows() {
        let rows = pack(&[], 1, 10, 2).unwrap();
        assert!(rows.is_empty());
    }
}
