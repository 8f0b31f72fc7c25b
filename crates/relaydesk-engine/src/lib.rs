// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Handoff coordination engine for Relaydesk.
//!
//! The [`Coordinator`] consumes classified inbound turns and drives the
//! support-case state machine: it opens cases and queues requests for
//! users, lets agents claim the oldest request with a transcript replay,
//! and relays messages between the two sessions until the agent ends the
//! case. Every collaborator is an injected `relaydesk-core` trait object.

pub mod coordinator;
pub mod replay;

pub use coordinator::{Coordinator, TurnEvent, TurnOutcome};
pub use replay::{ConversationIdEncoder, render_event};
