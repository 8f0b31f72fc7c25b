// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end coordinator testing.
//!
//! `TestHarness` assembles a complete coordinator over in-memory fakes and
//! exposes turn-driving helpers, so a scenario test reads as the sequence
//! of events it exercises.

use std::sync::Arc;

use relaydesk_config::RelaydeskConfig;
use relaydesk_core::HandoffError;
use relaydesk_core::types::{ConversationReference, ParticipantKind};
use relaydesk_engine::{Coordinator, TurnEvent, TurnOutcome};

use crate::memory_store::{MemoryCaseStore, MemoryDirectory, MemoryQueue};
use crate::recording_messenger::RecordingMessenger;
use crate::scripted_transcripts::ScriptedTranscripts;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    config: RelaydeskConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            config: RelaydeskConfig::default(),
        }
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: RelaydeskConfig) -> Self {
        self.config = config;
        self
    }

    /// Override just the end-of-session keyword.
    pub fn with_end_keyword(mut self, keyword: &str) -> Self {
        self.config.engine.end_keyword = keyword.to_string();
        self
    }

    /// Build the harness, wiring a coordinator over fresh fakes.
    pub fn build(self) -> TestHarness {
        let cases = Arc::new(MemoryCaseStore::new());
        let directory = Arc::new(MemoryDirectory::new());
        let queue = Arc::new(MemoryQueue::new());
        let messenger = Arc::new(RecordingMessenger::new());
        let transcripts = Arc::new(ScriptedTranscripts::new());

        let coordinator = Coordinator::new(
            cases.clone(),
            directory.clone(),
            queue.clone(),
            messenger.clone(),
            transcripts.clone(),
            &self.config,
        );

        TestHarness {
            cases,
            directory,
            queue,
            messenger,
            transcripts,
            coordinator,
            config: self.config,
        }
    }
}

/// A fully wired coordinator over in-memory fakes.
pub struct TestHarness {
    pub cases: Arc<MemoryCaseStore>,
    pub directory: Arc<MemoryDirectory>,
    pub queue: Arc<MemoryQueue>,
    pub messenger: Arc<RecordingMessenger>,
    pub transcripts: Arc<ScriptedTranscripts>,
    pub coordinator: Coordinator,
    pub config: RelaydeskConfig,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// A reference on the default test channel.
    pub fn reference(participant_id: &str, conversation_id: &str) -> ConversationReference {
        Self::reference_on("webchat", participant_id, conversation_id)
    }

    /// A reference on an explicit channel.
    pub fn reference_on(
        channel_id: &str,
        participant_id: &str,
        conversation_id: &str,
    ) -> ConversationReference {
        ConversationReference {
            channel_id: channel_id.to_string(),
            participant_id: participant_id.to_string(),
            conversation_id: conversation_id.to_string(),
            resume_token: serde_json::json!({
                "serviceUrl": "https://example.test",
                "participant": participant_id,
            }),
            stored_at: String::new(),
        }
    }

    /// Drive a session-start turn for a user, storing their reference.
    pub async fn user_session_started(
        &self,
        reference: ConversationReference,
    ) -> Result<TurnOutcome, HandoffError> {
        self.coordinator
            .handle_turn(TurnEvent::SessionStarted {
                reference,
                participant: ParticipantKind::User,
            })
            .await
    }

    /// Drive a session-start turn for an agent, storing their reference.
    pub async fn agent_session_started(
        &self,
        reference: ConversationReference,
    ) -> Result<TurnOutcome, HandoffError> {
        self.coordinator
            .handle_turn(TurnEvent::SessionStarted {
                reference,
                participant: ParticipantKind::Agent,
            })
            .await
    }

    /// Drive one user-message turn.
    pub async fn user_says(
        &self,
        user_id: &str,
        conversation_id: &str,
        text: &str,
    ) -> Result<TurnOutcome, HandoffError> {
        self.coordinator
            .handle_turn(TurnEvent::UserMessage {
                user_id: user_id.to_string(),
                conversation_id: conversation_id.to_string(),
                text: text.to_string(),
            })
            .await
    }

    /// Drive one agent-claim turn.
    pub async fn agent_claims(&self, agent_id: &str) -> Result<TurnOutcome, HandoffError> {
        self.coordinator
            .handle_turn(TurnEvent::AgentClaim {
                agent_id: agent_id.to_string(),
            })
            .await
    }

    /// Drive one agent-message turn.
    pub async fn agent_says(
        &self,
        agent_id: &str,
        text: &str,
    ) -> Result<TurnOutcome, HandoffError> {
        self.coordinator
            .handle_turn(TurnEvent::AgentMessage {
                agent_id: agent_id.to_string(),
                text: text.to_string(),
            })
            .await
    }
}
