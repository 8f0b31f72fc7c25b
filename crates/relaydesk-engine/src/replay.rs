// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transcript replay rendering and channel-specific conversation-id
//! encoding.
//!
//! When an agent claims a case, the user's stored history is re-presented
//! into the agent's own turn. Rendering strips timestamps and adds a
//! provenance prefix so the agent can tell who originally said what.

use relaydesk_config::model::{ChannelEncoding, TranscriptConfig};
use relaydesk_core::types::{ParticipantRole, TranscriptEvent, TranscriptEventKind};

/// Fallback when a user-authored transcript event carries no sender name.
const UNKNOWN_SENDER: &str = "unknown";

/// Table-driven conversation-id encoding.
///
/// Some channels store history under an escaped form of the conversation
/// id; the substitution is a pure function of the channel id. Channels
/// without a rule pass the id through unchanged. The table comes from
/// configuration, so new channels are an entry away.
pub struct ConversationIdEncoder {
    rules: Vec<ChannelEncoding>,
}

impl ConversationIdEncoder {
    /// Build the encoder from the configured substitution table.
    pub fn new(config: &TranscriptConfig) -> Self {
        Self {
            rules: config.encodings.clone(),
        }
    }

    /// Encode a conversation id for transcript lookup on the given channel.
    pub fn encode(&self, channel_id: &str, conversation_id: &str) -> String {
        match self.rules.iter().find(|r| r.channel_id == channel_id) {
            Some(rule) => conversation_id.replace(&rule.from, &rule.to),
            None => conversation_id.to_string(),
        }
    }
}

/// Render one historical event as a replay line, or `None` when the event
/// must not be replayed.
///
/// Session-update events are never replayed. Message events get a
/// provenance prefix: `**BOT:** ` for the automated side, `USER:<name> `
/// otherwise. Other event kinds that carry text replay unprefixed.
/// Timestamps are dropped so the replay renders as new messages.
pub fn render_event(event: &TranscriptEvent) -> Option<String> {
    if event.kind == TranscriptEventKind::SessionUpdate {
        return None;
    }
    let text = event.text.as_deref()?;

    match event.kind {
        TranscriptEventKind::Message => match event.from.role {
            ParticipantRole::Bot => Some(format!("**BOT:** {text}")),
            _ => {
                let name = event.from.name.as_deref().unwrap_or(UNKNOWN_SENDER);
                Some(format!("USER:{name} {text}"))
            }
        },
        _ => Some(text.to_string()),
    }
}
