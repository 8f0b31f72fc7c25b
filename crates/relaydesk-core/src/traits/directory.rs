// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable directory of conversation references.

use async_trait::async_trait;

use crate::error::HandoffError;
use crate::types::ConversationReference;

/// Store of how to reach a participant's live session later.
///
/// Writes are append-only; lookups always return the most recent entry
/// (last write wins, ordered by write time). The coordinator treats a
/// missing or stale reference as "cannot reach that party right now", not
/// as a fatal error.
#[async_trait]
pub trait ReferenceDirectory: Send + Sync {
    /// Stores a reference. Called whenever a participant's session
    /// (re)starts; entries are never explicitly deleted.
    async fn put(&self, reference: &ConversationReference) -> Result<(), HandoffError>;

    /// Most recent reference for the participant across all their
    /// conversations.
    async fn get_by_participant(
        &self,
        participant_id: &str,
    ) -> Result<Option<ConversationReference>, HandoffError>;

    /// Most recent reference scoped to one conversation.
    async fn get_by_participant_and_conversation(
        &self,
        participant_id: &str,
        conversation_id: &str,
    ) -> Result<Option<ConversationReference>, HandoffError>;
}
