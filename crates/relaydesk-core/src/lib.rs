// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Relaydesk handoff engine.
//!
//! This crate provides the foundational trait definitions, error types, and
//! domain types used throughout the Relaydesk workspace. Store backends and
//! transport-side collaborators implement traits defined here; the
//! coordinator in `relaydesk-engine` consumes them.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::HandoffError;
pub use types::{
    CaseStatus, ConversationReference, ParticipantKind, PendingRequest, SupportCase,
    TranscriptEvent, TranscriptEventKind, TranscriptSegment,
};

// Re-export all trait seams at crate root.
pub use traits::{
    CaseStore, ProactiveMessenger, ReferenceDirectory, RequestQueue, TranscriptSource,
};
