// SPDX-FileCopyrightText: 2026 Timar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the timar task tracker.
//!
//! This crate provides the error taxonomy, the channel-agnostic event and
//! message types, the inline action-button codec, and the [`MessagingGateway`]
//! trait that the Telegram adapter implements and the dispatcher consumes.

pub mod action;
pub mod error;
pub mod gateway;
pub mod types;

pub use action::{Action, ActionButton, DecodedAction};
pub use error::TimarError;
pub use gateway::MessagingGateway;
pub use types::{InboundEvent, InlineButton, Keyboard, MessageRef};
