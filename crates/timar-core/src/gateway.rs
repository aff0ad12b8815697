// SPDX-FileCopyrightText: 2026 Timar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Messaging gateway trait, the seam between the core and the chat transport.

use async_trait::async_trait;

use crate::error::TimarError;
use crate::types::{Keyboard, MessageRef};

/// Outbound side of the messaging transport.
///
/// The dispatcher and the timer refresh job are generic over this trait so
/// they can be exercised in tests against an in-memory implementation.
/// Implementations must apply their own bounded timeouts; a failed call must
/// leave no partial local state behind.
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    /// Sends a new message, returning a handle that can edit it later.
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<MessageRef, TimarError>;

    /// Edits a previously sent message in place.
    async fn edit_message(
        &self,
        target: &MessageRef,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<(), TimarError>;
}
