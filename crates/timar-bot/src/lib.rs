// SPDX-FileCopyrightText: 2026 Timar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation-driven task and epic tracking over a messaging gateway.
//!
//! The [`Bot`] dispatches inbound events (commands, mode-interpreted free
//! text, inline-button actions) to handlers, and [`job`] keeps live timer
//! messages ticking. Both speak to the channel through the
//! [`timar_core::MessagingGateway`] trait, so everything here is testable
//! against an in-memory gateway.

pub mod dispatcher;
pub mod handlers;
pub mod job;
pub mod texts;

pub use handlers::Bot;
