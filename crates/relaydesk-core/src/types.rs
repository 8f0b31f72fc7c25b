// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the store traits and the coordinator.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Lifecycle status of a support case.
///
/// `Pending -> Active -> ClosedByAgent -> Closed`. `Closed` is terminal for
/// the case instance; the same user may open a new case (new `case_id`)
/// afterwards.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum CaseStatus {
    /// Request enqueued, no agent assigned yet.
    Pending,
    /// An agent has claimed the case and the relay is live.
    Active,
    /// The agent ended the session; awaiting the user's acknowledgement.
    ClosedByAgent,
    /// The user acknowledged; terminal.
    Closed,
}

impl CaseStatus {
    /// Whether the case still counts against the one-open-case-per-user
    /// invariant.
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            CaseStatus::Pending | CaseStatus::Active | CaseStatus::ClosedByAgent
        )
    }
}

/// One end-to-end help request lifecycle for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportCase {
    /// Storage identity. Regenerated when the record is recreated during
    /// agent assignment; use `case_id` to follow a case across that.
    pub id: String,
    /// Stable logical identity of the case.
    pub case_id: String,
    /// The requesting participant.
    pub user_id: String,
    /// The user-side session the request originated from.
    pub user_conversation_id: String,
    /// Assigned agent; `None` while the case is unassigned.
    pub agent_id: Option<String>,
    pub status: CaseStatus,
    /// RFC3339, assigned by the store at insert time.
    pub created_at: String,
    /// RFC3339, rewritten by the store on every transition.
    pub updated_at: String,
}

/// Everything needed to resume and address a participant's conversation
/// session later (proactive messaging).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationReference {
    /// Identifies the transport/channel the session lives on.
    pub channel_id: String,
    /// Stable identity of the user or agent on that channel.
    pub participant_id: String,
    /// Channel-specific session identifier.
    pub conversation_id: String,
    /// Channel-specific blob sufficient to re-enter the session (service
    /// URL, channel account ids, ...). Opaque to the engine.
    pub resume_token: serde_json::Value,
    /// RFC3339 write time, assigned by the directory. Lookups return the
    /// most recent entry (last write wins).
    #[serde(default)]
    pub stored_at: String,
}

/// A handoff request waiting in the FIFO queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRequest {
    pub user_id: String,
    pub user_conversation_id: String,
}

/// Who a turn or a stored reference belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticipantKind {
    User,
    Agent,
}

// --- Transcript types (consumed from the transcript source for replay) ---

/// A single addressable unit of stored history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub uri: String,
}

/// Activity kind recorded in a transcript segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TranscriptEventKind {
    Message,
    SessionUpdate,
    /// Upstream activity types the engine does not interpret.
    Other(String),
}

impl From<String> for TranscriptEventKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "message" => TranscriptEventKind::Message,
            "sessionUpdate" | "conversationUpdate" => TranscriptEventKind::SessionUpdate,
            _ => TranscriptEventKind::Other(s),
        }
    }
}

impl From<TranscriptEventKind> for String {
    fn from(kind: TranscriptEventKind) -> Self {
        match kind {
            TranscriptEventKind::Message => "message".to_string(),
            TranscriptEventKind::SessionUpdate => "sessionUpdate".to_string(),
            TranscriptEventKind::Other(s) => s,
        }
    }
}

/// Role of the original sender of a transcript event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ParticipantRole {
    Bot,
    User,
    Other(String),
}

impl From<String> for ParticipantRole {
    fn from(s: String) -> Self {
        match s.as_str() {
            "bot" => ParticipantRole::Bot,
            "user" => ParticipantRole::User,
            _ => ParticipantRole::Other(s),
        }
    }
}

impl From<ParticipantRole> for String {
    fn from(role: ParticipantRole) -> Self {
        match role {
            ParticipantRole::Bot => "bot".to_string(),
            ParticipantRole::User => "user".to_string(),
            ParticipantRole::Other(s) => s,
        }
    }
}

/// Original sender of a transcript event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptParticipant {
    pub role: ParticipantRole,
    #[serde(default)]
    pub name: Option<String>,
}

/// One historical activity fetched from the transcript source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEvent {
    #[serde(rename = "type")]
    pub kind: TranscriptEventKind,
    pub from: TranscriptParticipant,
    #[serde(default)]
    pub text: Option<String>,
    /// Present in storage; never rendered during replay.
    #[serde(default)]
    pub timestamp: Option<String>,
}
