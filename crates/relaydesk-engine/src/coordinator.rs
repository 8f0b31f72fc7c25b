// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The handoff coordinator state machine.
//!
//! One inbound turn -- a user message, an agent claim, or an agent message --
//! enters [`Coordinator::handle_turn`], which consults the case store and
//! the reference directory, may move a request through the queue, may
//! deliver into the counterpart's session via the proactive messenger, and
//! returns the messages to render into the sender's own session.
//!
//! Case lifecycle: `Pending -> Active -> ClosedByAgent -> Closed`.
//!
//! Turns are independent units of work: the coordinator holds no state of
//! its own beyond injected handles and configuration, so any number of
//! turns for different users/agents may run concurrently. A branch that
//! resolves a conversation reference and finds none drops the message
//! without surfacing an error to the sender -- the counterpart simply does
//! not hear it.

use std::sync::Arc;

use relaydesk_config::model::{ReplyConfig, RelaydeskConfig};
use relaydesk_core::types::{
    CaseStatus, ConversationReference, ParticipantKind, PendingRequest, SupportCase,
};
use relaydesk_core::{
    CaseStore, HandoffError, ProactiveMessenger, ReferenceDirectory, RequestQueue,
    TranscriptSource,
};
use tracing::{debug, info, warn};

use crate::replay::{self, ConversationIdEncoder};

/// One inbound turn, already classified by the transport layer.
#[derive(Debug, Clone)]
pub enum TurnEvent {
    /// A participant's session (re)started; their conversation reference
    /// must be stored for later proactive delivery.
    SessionStarted {
        reference: ConversationReference,
        participant: ParticipantKind,
    },
    /// The end user sent a message in their own session.
    UserMessage {
        user_id: String,
        conversation_id: String,
        text: String,
    },
    /// An agent asked to claim the oldest pending request.
    AgentClaim { agent_id: String },
    /// An agent sent a message in their own session.
    AgentMessage { agent_id: String, text: String },
}

/// The messages to render into the sender's own session this turn, in
/// order. Proactive deliveries to the counterpart are not part of the
/// outcome -- they go through the injected messenger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnOutcome {
    pub messages: Vec<String>,
}

impl TurnOutcome {
    /// A turn with nothing to render to the sender.
    pub fn none() -> Self {
        Self::default()
    }

    fn reply(text: &str) -> Self {
        Self {
            messages: vec![text.to_string()],
        }
    }
}

/// Drives the support-case state machine over injected store, queue, and
/// delivery handles.
pub struct Coordinator {
    cases: Arc<dyn CaseStore>,
    directory: Arc<dyn ReferenceDirectory>,
    queue: Arc<dyn RequestQueue>,
    messenger: Arc<dyn ProactiveMessenger>,
    transcripts: Arc<dyn TranscriptSource>,
    replies: ReplyConfig,
    end_keyword: String,
    encoder: ConversationIdEncoder,
}

impl Coordinator {
    /// Assemble a coordinator from its injected collaborators and
    /// configuration. Lifecycle of the handles is owned by the process
    /// bootstrap.
    pub fn new(
        cases: Arc<dyn CaseStore>,
        directory: Arc<dyn ReferenceDirectory>,
        queue: Arc<dyn RequestQueue>,
        messenger: Arc<dyn ProactiveMessenger>,
        transcripts: Arc<dyn TranscriptSource>,
        config: &RelaydeskConfig,
    ) -> Self {
        Self {
            cases,
            directory,
            queue,
            messenger,
            transcripts,
            replies: config.replies.clone(),
            end_keyword: config.engine.end_keyword.clone(),
            encoder: ConversationIdEncoder::new(&config.transcripts),
        }
    }

    /// Handle one inbound turn and return the sender-side messages.
    ///
    /// Store and queue failures propagate unaltered; the caller's policy is
    /// to apologize generically without mutating persisted state.
    pub async fn handle_turn(&self, event: TurnEvent) -> Result<TurnOutcome, HandoffError> {
        match event {
            TurnEvent::SessionStarted {
                reference,
                participant,
            } => self.on_session_started(reference, participant).await,
            TurnEvent::UserMessage {
                user_id,
                conversation_id,
                text,
            } => self.on_user_message(&user_id, &conversation_id, &text).await,
            TurnEvent::AgentClaim { agent_id } => self.on_agent_claim(&agent_id).await,
            TurnEvent::AgentMessage { agent_id, text } => {
                self.on_agent_message(&agent_id, &text).await
            }
        }
    }

    async fn on_session_started(
        &self,
        reference: ConversationReference,
        participant: ParticipantKind,
    ) -> Result<TurnOutcome, HandoffError> {
        self.directory.put(&reference).await?;
        debug!(
            participant_id = %reference.participant_id,
            channel_id = %reference.channel_id,
            "conversation reference stored"
        );
        match participant {
            ParticipantKind::User => Ok(TurnOutcome::reply(&self.replies.welcome)),
            ParticipantKind::Agent => Ok(TurnOutcome::none()),
        }
    }

    async fn on_user_message(
        &self,
        user_id: &str,
        conversation_id: &str,
        text: &str,
    ) -> Result<TurnOutcome, HandoffError> {
        let case = self
            .cases
            .find_by_user_and_conversation(user_id, conversation_id)
            .await?;

        match case {
            // No case yet, or the previous one finished its lifecycle: this
            // message is a fresh handoff request.
            None => self.open_case(user_id, conversation_id).await,
            Some(case) if case.status == CaseStatus::Closed => {
                self.open_case(user_id, conversation_id).await
            }

            Some(case) if case.status == CaseStatus::Pending => {
                debug!(case_id = %case.case_id, "user nudged a pending request");
                Ok(TurnOutcome::reply(&self.replies.still_waiting))
            }

            Some(case) if case.status == CaseStatus::Active => {
                self.relay_to_agent(&case, text).await?;
                Ok(TurnOutcome::none())
            }

            // ClosedByAgent: this message is the user's acknowledgement.
            Some(case) => {
                match self.cases.set_status(&case, CaseStatus::Closed).await {
                    Ok(closed) => {
                        info!(case_id = %closed.case_id, "support case closed");
                    }
                    Err(HandoffError::CaseNotFound { case_id }) => {
                        debug!(%case_id, "case already gone, treating as closed");
                    }
                    Err(e) => return Err(e),
                }
                Ok(TurnOutcome::reply(&self.replies.feedback_thanks))
            }
        }
    }

    /// Create a Pending case, then enqueue the request. The case store's
    /// `AlreadyOpen` check runs first so a duplicate request never reaches
    /// the queue.
    async fn open_case(
        &self,
        user_id: &str,
        conversation_id: &str,
    ) -> Result<TurnOutcome, HandoffError> {
        match self.cases.create(user_id, conversation_id).await {
            Ok(case) => {
                self.queue
                    .enqueue(&PendingRequest {
                        user_id: user_id.to_string(),
                        user_conversation_id: conversation_id.to_string(),
                    })
                    .await?;
                info!(
                    case_id = %case.case_id,
                    user_id,
                    "handoff request enqueued"
                );
                Ok(TurnOutcome::reply(&self.replies.waiting))
            }
            Err(HandoffError::AlreadyOpen { .. }) => {
                // Another session of the same user already holds the open
                // case; the request is being handled.
                debug!(user_id, "open case exists elsewhere, not enqueueing");
                Ok(TurnOutcome::reply(&self.replies.still_waiting))
            }
            Err(e) => Err(e),
        }
    }

    /// Forward a user message into the assigned agent's session, verbatim.
    async fn relay_to_agent(&self, case: &SupportCase, text: &str) -> Result<(), HandoffError> {
        let Some(agent_id) = case.agent_id.as_deref() else {
            warn!(case_id = %case.case_id, "active case has no agent, dropping message");
            return Ok(());
        };
        match self.directory.get_by_participant(agent_id).await? {
            Some(reference) => self.messenger.resume_and_send(&reference, text).await,
            None => {
                warn!(
                    case_id = %case.case_id,
                    agent_id,
                    "agent reference missing, dropping user message"
                );
                Ok(())
            }
        }
    }

    async fn on_agent_claim(&self, agent_id: &str) -> Result<TurnOutcome, HandoffError> {
        let Some(request) = self.queue.dequeue().await? else {
            debug!(agent_id, "claim with empty queue");
            return Ok(TurnOutcome::reply(&self.replies.no_work));
        };

        let Some(user_ref) = self
            .directory
            .get_by_participant_and_conversation(&request.user_id, &request.user_conversation_id)
            .await?
        else {
            warn!(
                user_id = %request.user_id,
                "user reference missing, abandoning claim"
            );
            return Ok(TurnOutcome::none());
        };

        let Some(pending) = self
            .cases
            .find_oldest_pending_for_user(&request.user_id)
            .await?
        else {
            warn!(
                user_id = %request.user_id,
                "no pending case for dequeued request, abandoning claim"
            );
            return Ok(TurnOutcome::none());
        };

        let active = match self.cases.assign(&pending, agent_id).await {
            Ok(active) => active,
            Err(HandoffError::CaseNotFound { case_id }) => {
                warn!(%case_id, "pending case vanished during claim, abandoning");
                return Ok(TurnOutcome::none());
            }
            Err(e) => return Err(e),
        };
        info!(
            case_id = %active.case_id,
            agent_id,
            user_id = %active.user_id,
            "support case claimed"
        );

        let messages = self.replay_history(&user_ref).await?;

        self.messenger
            .resume_and_send(&user_ref, &self.replies.greeting)
            .await?;

        Ok(TurnOutcome { messages })
    }

    /// Fetch the user's stored history and render it into replay lines.
    async fn replay_history(
        &self,
        user_ref: &ConversationReference,
    ) -> Result<Vec<String>, HandoffError> {
        let encoded = self
            .encoder
            .encode(&user_ref.channel_id, &user_ref.conversation_id);
        let segments = self
            .transcripts
            .list_segments(&user_ref.channel_id, &encoded)
            .await?;

        let mut lines = Vec::new();
        for segment in &segments {
            let event = self.transcripts.fetch_segment(&segment.uri).await?;
            if let Some(line) = replay::render_event(&event) {
                lines.push(line);
            }
        }
        debug!(
            conversation_id = %user_ref.conversation_id,
            segments = segments.len(),
            rendered = lines.len(),
            "transcript replayed"
        );
        Ok(lines)
    }

    async fn on_agent_message(
        &self,
        agent_id: &str,
        text: &str,
    ) -> Result<TurnOutcome, HandoffError> {
        let Some(case) = self.cases.find_active_for_agent(agent_id).await? else {
            debug!(agent_id, "agent message without an active case, ignoring");
            return Ok(TurnOutcome::none());
        };

        let Some(user_ref) = self
            .directory
            .get_by_participant_and_conversation(&case.user_id, &case.user_conversation_id)
            .await?
        else {
            warn!(
                case_id = %case.case_id,
                "user reference missing, dropping agent message"
            );
            return Ok(TurnOutcome::none());
        };

        if text == self.end_keyword {
            match self.cases.set_status(&case, CaseStatus::ClosedByAgent).await {
                Ok(closed) => {
                    info!(case_id = %closed.case_id, agent_id, "support case closed by agent");
                    self.messenger
                        .resume_and_send(&user_ref, &self.replies.feedback_prompt)
                        .await?;
                }
                Err(HandoffError::CaseNotFound { case_id }) => {
                    debug!(%case_id, "case already gone, skipping feedback prompt");
                }
                Err(e) => return Err(e),
            }
            Ok(TurnOutcome::reply(&self.replies.case_closed))
        } else {
            self.messenger.resume_and_send(&user_ref, text).await?;
            Ok(TurnOutcome::none())
        }
    }
}
