// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types are defined in `relaydesk-core::types` for use across
//! the trait seams. This module re-exports them for convenience within the
//! storage crate.

pub use relaydesk_core::types::{ConversationReference, PendingRequest, SupportCase};
