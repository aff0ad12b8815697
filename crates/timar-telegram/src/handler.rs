// SPDX-FileCopyrightText: 2026 Timar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversion between Telegram updates and the channel-agnostic event and
//! keyboard types.

use teloxide::types::{CallbackQuery, InlineKeyboardButton, InlineKeyboardMarkup, Message};
use timar_core::{InboundEvent, Keyboard};

/// Build an inline keyboard markup from gateway-level rows.
pub fn keyboard_markup(keyboard: &Keyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(keyboard.iter().map(|row| {
        row.iter()
            .map(|b| InlineKeyboardButton::callback(b.text.clone(), b.token.clone()))
            .collect::<Vec<_>>()
    }))
}

/// Convert a Telegram message into a text event. Non-text messages
/// (stickers, photos, joins) yield `None` and are dropped upstream.
pub fn text_event(msg: &Message) -> Option<InboundEvent> {
    msg.text().map(|text| InboundEvent::Text {
        chat_id: msg.chat.id.0,
        text: text.to_string(),
    })
}

/// Convert a callback query into an action event carrying the raw token.
/// Queries without data or without an originating message yield `None`.
pub fn callback_event(query: &CallbackQuery) -> Option<InboundEvent> {
    let token = query.data.as_ref()?;
    let message = query.message.as_ref()?;
    Some(InboundEvent::Action {
        chat_id: message.chat().id.0,
        token: token.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use timar_core::InlineButton;

    fn mock_message(chat_id: i64, text: Option<&str>) -> Message {
        let mut value = json!({
            "message_id": 100,
            "date": 1_700_000_000,
            "chat": {"id": chat_id, "type": "private", "first_name": "Test"},
            "from": {"id": chat_id, "is_bot": false, "first_name": "Test"},
        });
        if let Some(text) = text {
            value["text"] = json!(text);
        }
        serde_json::from_value(value).unwrap()
    }

    fn mock_callback(chat_id: i64, data: Option<&str>) -> CallbackQuery {
        let mut value = json!({
            "id": "cb-1",
            "from": {"id": chat_id, "is_bot": false, "first_name": "Test"},
            "chat_instance": "ci-1",
            "message": {
                "message_id": 100,
                "date": 1_700_000_000,
                "chat": {"id": chat_id, "type": "private", "first_name": "Test"},
                "text": "menu",
            },
        });
        if let Some(data) = data {
            value["data"] = json!(data);
        }
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn text_message_becomes_text_event() {
        let msg = mock_message(42, Some("/start"));
        match text_event(&msg) {
            Some(InboundEvent::Text { chat_id, text }) => {
                assert_eq!(chat_id, 42);
                assert_eq!(text, "/start");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn non_text_message_is_dropped() {
        let msg = mock_message(42, None);
        assert!(text_event(&msg).is_none());
    }

    #[test]
    fn callback_with_data_becomes_action_event() {
        let query = mock_callback(7, Some(r#"{"action":"main_menu","chat_id":7}"#));
        match callback_event(&query) {
            Some(InboundEvent::Action { chat_id, token }) => {
                assert_eq!(chat_id, 7);
                assert_eq!(token, r#"{"action":"main_menu","chat_id":7}"#);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn callback_without_data_is_dropped() {
        let query = mock_callback(7, None);
        assert!(callback_event(&query).is_none());
    }

    #[test]
    fn keyboard_markup_preserves_rows_and_labels() {
        let keyboard: Keyboard = vec![
            vec![
                InlineButton {
                    text: "Stop".into(),
                    token: "t1".into(),
                },
                InlineButton {
                    text: "Delete".into(),
                    token: "t2".into(),
                },
            ],
            vec![InlineButton {
                text: "Main menu".into(),
                token: "t3".into(),
            }],
        ];
        let markup = keyboard_markup(&keyboard);
        assert_eq!(markup.inline_keyboard.len(), 2);
        assert_eq!(markup.inline_keyboard[0].len(), 2);
        assert_eq!(markup.inline_keyboard[0][0].text, "Stop");
        assert_eq!(markup.inline_keyboard[1][0].text, "Main menu");
    }
}
