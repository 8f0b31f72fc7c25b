// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read access to stored conversation history.

use async_trait::async_trait;

use crate::error::HandoffError;
use crate::types::{TranscriptEvent, TranscriptSegment};

/// Ordered read access to the historical activities of one conversation.
///
/// `encoded_conversation_id` is the channel-encoded form produced by the
/// engine's encoding table -- some channels require character substitution
/// before the stored path resolves.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Lists the segments of a conversation's history, oldest first.
    async fn list_segments(
        &self,
        channel_id: &str,
        encoded_conversation_id: &str,
    ) -> Result<Vec<TranscriptSegment>, HandoffError>;

    /// Fetches one segment's activity.
    async fn fetch_segment(&self, uri: &str) -> Result<TranscriptEvent, HandoffError>;
}
