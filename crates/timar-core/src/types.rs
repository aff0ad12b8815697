// SPDX-FileCopyrightText: 2026 Timar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel-agnostic event and message types shared across the workspace.

use serde::{Deserialize, Serialize};

/// A handle to a delivered message, sufficient to edit it later.
///
/// Serialized into a timelog's display metadata so the refresh job can find
/// the live timer message again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    pub chat_id: i64,
    pub message_id: i32,
}

/// One inline button as delivered to the transport: a label plus the encoded
/// action token it carries back on activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineButton {
    pub text: String,
    pub token: String,
}

/// Rows of inline buttons attached to an outbound message.
pub type Keyboard = Vec<Vec<InlineButton>>;

/// An inbound event from the messaging transport.
///
/// The transport is stateless per callback: an action activation carries only
/// the opaque token that was placed on the button when the reply was built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// A free-text message typed into the chat.
    Text { chat_id: i64, text: String },
    /// An inline-button activation.
    Action { chat_id: i64, token: String },
}

impl InboundEvent {
    /// The chat the event originated from.
    pub fn chat_id(&self) -> i64 {
        match self {
            InboundEvent::Text { chat_id, .. } | InboundEvent::Action { chat_id, .. } => *chat_id,
        }
    }
}
