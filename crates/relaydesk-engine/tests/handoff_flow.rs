// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end coordinator scenarios over in-memory fakes.
//!
//! Each test drives classified turns through a full [`Coordinator`] and
//! asserts on case state, queue depth, sender-side replies, and proactive
//! deliveries.

use relaydesk_core::HandoffError;
use relaydesk_core::types::{
    CaseStatus, ParticipantRole, TranscriptEvent, TranscriptEventKind, TranscriptParticipant,
};
use relaydesk_test_utils::TestHarness;

const USER: &str = "U1";
const CONV: &str = "conv1";
const AGENT: &str = "agentX";
const AGENT_CONV: &str = "agent-conv";

fn message_event(role: ParticipantRole, name: Option<&str>, text: &str) -> TranscriptEvent {
    TranscriptEvent {
        kind: TranscriptEventKind::Message,
        from: TranscriptParticipant {
            role,
            name: name.map(|n| n.to_string()),
        },
        text: Some(text.to_string()),
        timestamp: Some("2026-01-01T00:00:00.000Z".to_string()),
    }
}

fn session_update_event() -> TranscriptEvent {
    TranscriptEvent {
        kind: TranscriptEventKind::SessionUpdate,
        from: TranscriptParticipant {
            role: ParticipantRole::Other("service".to_string()),
            name: None,
        },
        text: None,
        timestamp: None,
    }
}

/// Wire up a harness with the user's session registered.
async fn harness_with_user() -> TestHarness {
    let harness = TestHarness::builder().build();
    harness
        .user_session_started(TestHarness::reference(USER, CONV))
        .await
        .unwrap();
    harness
}

#[tokio::test]
async fn session_start_welcomes_user_and_stores_reference() {
    let harness = TestHarness::builder().build();

    let outcome = harness
        .user_session_started(TestHarness::reference(USER, CONV))
        .await
        .unwrap();
    assert_eq!(outcome.messages, vec![harness.config.replies.welcome.clone()]);
    assert_eq!(harness.directory.entry_count().await, 1);

    // Agents get no welcome, but their reference is stored.
    let outcome = harness
        .agent_session_started(TestHarness::reference(AGENT, AGENT_CONV))
        .await
        .unwrap();
    assert!(outcome.messages.is_empty());
    assert_eq!(harness.directory.entry_count().await, 2);
}

#[tokio::test]
async fn first_user_message_opens_pending_case_and_queues_request() {
    let harness = harness_with_user().await;

    let outcome = harness.user_says(USER, CONV, "hi").await.unwrap();
    assert_eq!(outcome.messages, vec![harness.config.replies.waiting.clone()]);

    assert_eq!(harness.queue.len().await, 1);
    let cases = harness.cases.all_cases().await;
    assert_eq!(cases.len(), 1);
    assert_eq!(cases[0].status, CaseStatus::Pending);
    assert_eq!(cases[0].user_id, USER);
    assert_eq!(cases[0].user_conversation_id, CONV);
    assert!(cases[0].agent_id.is_none());
}

#[tokio::test]
async fn repeated_user_message_while_pending_does_not_requeue() {
    let harness = harness_with_user().await;

    harness.user_says(USER, CONV, "hi").await.unwrap();
    let outcome = harness.user_says(USER, CONV, "anyone there?").await.unwrap();
    assert_eq!(
        outcome.messages,
        vec![harness.config.replies.still_waiting.clone()]
    );
    assert_eq!(harness.queue.len().await, 1);
    assert_eq!(harness.cases.open_case_count(USER).await, 1);
}

#[tokio::test]
async fn claim_assigns_case_replays_history_and_greets_user() {
    let harness = harness_with_user().await;
    harness.user_says(USER, CONV, "hi").await.unwrap();

    harness
        .transcripts
        .script(
            "webchat",
            CONV,
            vec![
                session_update_event(),
                message_event(ParticipantRole::Bot, None, "hi"),
                message_event(ParticipantRole::User, Some("Sam"), "hi"),
            ],
        )
        .await;

    let outcome = harness.agent_claims(AGENT).await.unwrap();

    // Replay enters the agent's own turn: prefixed, session update skipped.
    assert_eq!(
        outcome.messages,
        vec!["**BOT:** hi".to_string(), "USER:Sam hi".to_string()]
    );

    // Queue drained, case assigned.
    assert!(harness.queue.is_empty().await);
    let cases = harness.cases.all_cases().await;
    assert_eq!(cases.len(), 1);
    assert_eq!(cases[0].status, CaseStatus::Active);
    assert_eq!(cases[0].agent_id.as_deref(), Some(AGENT));

    // The user hears the greeting proactively.
    assert_eq!(
        harness.messenger.texts_to(USER).await,
        vec![harness.config.replies.greeting.clone()]
    );
}

#[tokio::test]
async fn claim_with_empty_queue_mutates_nothing() {
    let harness = TestHarness::builder().build();

    let outcome = harness.agent_claims(AGENT).await.unwrap();
    assert_eq!(outcome.messages, vec![harness.config.replies.no_work.clone()]);
    assert!(harness.cases.all_cases().await.is_empty());
    assert_eq!(harness.messenger.delivery_count().await, 0);
}

#[tokio::test]
async fn active_case_relays_user_messages_to_agent_verbatim() {
    let harness = harness_with_user().await;
    harness
        .agent_session_started(TestHarness::reference(AGENT, AGENT_CONV))
        .await
        .unwrap();
    harness.user_says(USER, CONV, "hi").await.unwrap();
    harness.agent_claims(AGENT).await.unwrap();

    let outcome = harness
        .user_says(USER, CONV, "my printer is on fire")
        .await
        .unwrap();
    assert!(outcome.messages.is_empty());
    assert_eq!(
        harness.messenger.texts_to(AGENT).await,
        vec!["my printer is on fire".to_string()]
    );
}

#[tokio::test]
async fn active_case_relays_agent_messages_to_user_verbatim() {
    let harness = harness_with_user().await;
    harness.user_says(USER, CONV, "hi").await.unwrap();
    harness.agent_claims(AGENT).await.unwrap();

    let outcome = harness.agent_says(AGENT, "try turning it off").await.unwrap();
    assert!(outcome.messages.is_empty());
    let texts = harness.messenger.texts_to(USER).await;
    assert!(texts.contains(&"try turning it off".to_string()));
}

#[tokio::test]
async fn end_keyword_closes_by_agent_and_prompts_for_feedback() {
    let harness = harness_with_user().await;
    harness.user_says(USER, CONV, "hi").await.unwrap();
    harness.agent_claims(AGENT).await.unwrap();

    let outcome = harness.agent_says(AGENT, "end").await.unwrap();
    assert_eq!(
        outcome.messages,
        vec![harness.config.replies.case_closed.clone()]
    );

    let cases = harness.cases.all_cases().await;
    assert_eq!(cases[0].status, CaseStatus::ClosedByAgent);

    let texts = harness.messenger.texts_to(USER).await;
    assert!(texts.contains(&harness.config.replies.feedback_prompt.clone()));
}

#[tokio::test]
async fn end_keyword_never_skips_straight_to_closed() {
    let harness = harness_with_user().await;
    harness.user_says(USER, CONV, "hi").await.unwrap();
    harness.agent_claims(AGENT).await.unwrap();
    harness.agent_says(AGENT, "end").await.unwrap();

    // ClosedByAgent until the user acknowledges, never Closed directly.
    let cases = harness.cases.all_cases().await;
    assert_eq!(cases[0].status, CaseStatus::ClosedByAgent);

    harness.user_says(USER, CONV, "thanks, 10/10").await.unwrap();
    let cases = harness.cases.all_cases().await;
    assert_eq!(cases[0].status, CaseStatus::Closed);
}

#[tokio::test]
async fn user_message_on_closed_by_agent_case_thanks_and_closes() {
    let harness = harness_with_user().await;
    harness.user_says(USER, CONV, "hi").await.unwrap();
    harness.agent_claims(AGENT).await.unwrap();
    harness.agent_says(AGENT, "end").await.unwrap();

    let outcome = harness.user_says(USER, CONV, "8").await.unwrap();
    assert_eq!(
        outcome.messages,
        vec![harness.config.replies.feedback_thanks.clone()]
    );
    assert_eq!(harness.cases.all_cases().await[0].status, CaseStatus::Closed);
}

#[tokio::test]
async fn new_message_after_closed_case_opens_a_fresh_one() {
    let harness = harness_with_user().await;
    harness.user_says(USER, CONV, "hi").await.unwrap();
    harness.agent_claims(AGENT).await.unwrap();
    harness.agent_says(AGENT, "end").await.unwrap();
    harness.user_says(USER, CONV, "8").await.unwrap();

    let first_case_id = harness.cases.all_cases().await[0].case_id.clone();

    let outcome = harness.user_says(USER, CONV, "hi again").await.unwrap();
    assert_eq!(outcome.messages, vec![harness.config.replies.waiting.clone()]);

    let cases = harness.cases.all_cases().await;
    assert_eq!(cases.len(), 2);
    let fresh = cases.iter().find(|c| c.status == CaseStatus::Pending).unwrap();
    assert_ne!(fresh.case_id, first_case_id);
    assert_eq!(harness.queue.len().await, 1);
}

#[tokio::test]
async fn one_open_case_invariant_holds_across_the_lifecycle() {
    let harness = harness_with_user().await;

    harness.user_says(USER, CONV, "hi").await.unwrap();
    assert_eq!(harness.cases.open_case_count(USER).await, 1);

    harness.user_says(USER, CONV, "hello?").await.unwrap();
    assert_eq!(harness.cases.open_case_count(USER).await, 1);

    harness.agent_claims(AGENT).await.unwrap();
    assert_eq!(harness.cases.open_case_count(USER).await, 1);

    harness.agent_says(AGENT, "end").await.unwrap();
    assert_eq!(harness.cases.open_case_count(USER).await, 1);

    harness.user_says(USER, CONV, "ok").await.unwrap();
    assert_eq!(harness.cases.open_case_count(USER).await, 0);

    harness.user_says(USER, CONV, "hi again").await.unwrap();
    assert_eq!(harness.cases.open_case_count(USER).await, 1);
}

#[tokio::test]
async fn claim_applies_channel_encoding_before_transcript_lookup() {
    let harness = TestHarness::builder().build();
    harness
        .user_session_started(TestHarness::reference_on("emulator", USER, "abc|123"))
        .await
        .unwrap();
    harness.user_says(USER, "abc|123", "hi").await.unwrap();

    harness
        .transcripts
        .script(
            "emulator",
            "abc%7C123",
            vec![message_event(ParticipantRole::User, Some("Sam"), "hi")],
        )
        .await;

    let outcome = harness.agent_claims(AGENT).await.unwrap();
    assert_eq!(outcome.messages, vec!["USER:Sam hi".to_string()]);
    assert_eq!(
        harness.transcripts.listed_requests().await,
        vec![("emulator".to_string(), "abc%7C123".to_string())]
    );
}

#[tokio::test]
async fn claim_without_user_reference_aborts_silently() {
    // No session-start turn: the directory has no reference for the user.
    let harness = TestHarness::builder().build();
    harness.user_says(USER, CONV, "hi").await.unwrap();

    let outcome = harness.agent_claims(AGENT).await.unwrap();
    assert!(outcome.messages.is_empty());

    // The request is consumed (at-most-once dequeue) but the case stays
    // Pending, re-discoverable for reconciliation.
    assert!(harness.queue.is_empty().await);
    assert_eq!(harness.cases.all_cases().await[0].status, CaseStatus::Pending);
    assert_eq!(harness.messenger.delivery_count().await, 0);
}

#[tokio::test]
async fn missing_agent_reference_drops_user_message_silently() {
    // The agent never registered a session, so relay has nowhere to go.
    let harness = harness_with_user().await;
    harness.user_says(USER, CONV, "hi").await.unwrap();
    harness.agent_claims(AGENT).await.unwrap();
    let greetings = harness.messenger.delivery_count().await;

    let outcome = harness.user_says(USER, CONV, "are you there?").await.unwrap();
    assert!(outcome.messages.is_empty());
    assert_eq!(harness.messenger.delivery_count().await, greetings);
}

#[tokio::test]
async fn agent_message_without_active_case_is_ignored() {
    let harness = TestHarness::builder().build();
    let outcome = harness.agent_says(AGENT, "hello?").await.unwrap();
    assert!(outcome.messages.is_empty());
    assert_eq!(harness.messenger.delivery_count().await, 0);
}

#[tokio::test]
async fn assignment_crash_window_loses_the_request_recoverably() {
    let harness = harness_with_user().await;
    harness.user_says(USER, CONV, "hi").await.unwrap();

    harness.cases.fail_between_assign_steps();
    let err = harness.agent_claims(AGENT).await.unwrap_err();
    assert!(matches!(err, HandoffError::StoreUnavailable { .. }));

    // Accepted-loss window: the case is absent, not duplicated, and the
    // user's next message simply opens a fresh request.
    assert!(harness.cases.all_cases().await.is_empty());
    let outcome = harness.user_says(USER, CONV, "hi again").await.unwrap();
    assert_eq!(outcome.messages, vec![harness.config.replies.waiting.clone()]);
    assert_eq!(harness.cases.open_case_count(USER).await, 1);
}

#[tokio::test]
async fn delivery_failure_propagates_to_the_turn() {
    let harness = harness_with_user().await;
    harness.user_says(USER, CONV, "hi").await.unwrap();
    harness.agent_claims(AGENT).await.unwrap();

    harness.messenger.fail_deliveries(true);
    let err = harness.agent_says(AGENT, "hello").await.unwrap_err();
    assert!(matches!(err, HandoffError::Delivery { .. }));
}

#[tokio::test]
async fn custom_end_keyword_is_honored() {
    let harness = TestHarness::builder().with_end_keyword("/done").build();
    harness
        .user_session_started(TestHarness::reference(USER, CONV))
        .await
        .unwrap();
    harness.user_says(USER, CONV, "hi").await.unwrap();
    harness.agent_claims(AGENT).await.unwrap();

    // The default keyword is now an ordinary relay message.
    harness.agent_says(AGENT, "end").await.unwrap();
    assert_eq!(harness.cases.all_cases().await[0].status, CaseStatus::Active);
    assert!(
        harness
            .messenger
            .texts_to(USER)
            .await
            .contains(&"end".to_string())
    );

    harness.agent_says(AGENT, "/done").await.unwrap();
    assert_eq!(
        harness.cases.all_cases().await[0].status,
        CaseStatus::ClosedByAgent
    );
}

#[tokio::test]
async fn claim_with_no_stored_transcript_replays_nothing() {
    let harness = harness_with_user().await;
    harness.user_says(USER, CONV, "hi").await.unwrap();

    let outcome = harness.agent_claims(AGENT).await.unwrap();
    assert!(outcome.messages.is_empty());
    // The greeting still goes out.
    assert_eq!(
        harness.messenger.texts_to(USER).await,
        vec![harness.config.replies.greeting.clone()]
    );
}
