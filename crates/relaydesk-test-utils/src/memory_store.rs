// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory store fakes for deterministic testing.
//!
//! `MemoryCaseStore` mirrors the SQLite case store's contract, including
//! the delete-and-recreate assignment, and exposes a failpoint between the
//! two assignment steps so tests can exercise the accepted-loss window.
//! Write-time ordering uses a monotonic counter instead of wall-clock
//! timestamps, which keeps ordering assertions exact.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use relaydesk_core::types::{
    CaseStatus, ConversationReference, PendingRequest, SupportCase,
};
use relaydesk_core::{CaseStore, HandoffError, ReferenceDirectory, RequestQueue};

/// In-memory [`CaseStore`] with an injectable assignment failpoint.
#[derive(Default)]
pub struct MemoryCaseStore {
    cases: Mutex<Vec<SupportCase>>,
    seq: AtomicU64,
    fail_between_assign_steps: AtomicBool,
}

impl MemoryCaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the failpoint: the next `assign` deletes the unassigned record
    /// and then fails before the recreate, leaving the case absent. The
    /// failpoint disarms after firing once.
    pub fn fail_between_assign_steps(&self) {
        self.fail_between_assign_steps.store(true, Ordering::SeqCst);
    }

    /// Snapshot of every stored record, for invariant assertions.
    pub async fn all_cases(&self) -> Vec<SupportCase> {
        self.cases.lock().await.clone()
    }

    /// Number of open (Pending/Active/ClosedByAgent) cases for a user.
    pub async fn open_case_count(&self, user_id: &str) -> usize {
        self.cases
            .lock()
            .await
            .iter()
            .filter(|c| c.user_id == user_id && c.status.is_open())
            .count()
    }

    fn next_stamp(&self) -> String {
        // Zero-padded so lexicographic order equals write order.
        format!("{:08}", self.seq.fetch_add(1, Ordering::SeqCst))
    }
}

#[async_trait]
impl CaseStore for MemoryCaseStore {
    async fn create(
        &self,
        user_id: &str,
        user_conversation_id: &str,
    ) -> Result<SupportCase, HandoffError> {
        let mut cases = self.cases.lock().await;
        if cases
            .iter()
            .any(|c| c.user_id == user_id && c.status.is_open())
        {
            return Err(HandoffError::AlreadyOpen {
                user_id: user_id.to_string(),
            });
        }
        let stamp = self.next_stamp();
        let case = SupportCase {
            id: Uuid::new_v4().to_string(),
            case_id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            user_conversation_id: user_conversation_id.to_string(),
            agent_id: None,
            status: CaseStatus::Pending,
            created_at: stamp.clone(),
            updated_at: stamp,
        };
        cases.push(case.clone());
        Ok(case)
    }

    async fn find_oldest_pending_for_user(
        &self,
        user_id: &str,
    ) -> Result<Option<SupportCase>, HandoffError> {
        // Insertion order is creation order.
        Ok(self
            .cases
            .lock()
            .await
            .iter()
            .find(|c| c.user_id == user_id && c.status == CaseStatus::Pending)
            .cloned())
    }

    async fn find_active_for_agent(
        &self,
        agent_id: &str,
    ) -> Result<Option<SupportCase>, HandoffError> {
        Ok(self
            .cases
            .lock()
            .await
            .iter()
            .rev()
            .find(|c| c.agent_id.as_deref() == Some(agent_id) && c.status == CaseStatus::Active)
            .cloned())
    }

    async fn find_by_user_and_conversation(
        &self,
        user_id: &str,
        conversation_id: &str,
    ) -> Result<Option<SupportCase>, HandoffError> {
        Ok(self
            .cases
            .lock()
            .await
            .iter()
            .rev()
            .find(|c| c.user_id == user_id && c.user_conversation_id == conversation_id)
            .cloned())
    }

    async fn assign(
        &self,
        case: &SupportCase,
        agent_id: &str,
    ) -> Result<SupportCase, HandoffError> {
        let mut cases = self.cases.lock().await;

        // Step one: remove the unassigned record.
        let position = cases
            .iter()
            .position(|c| c.id == case.id && c.agent_id.is_none());
        let Some(position) = position else {
            return Err(HandoffError::CaseNotFound {
                case_id: case.case_id.clone(),
            });
        };
        let removed = cases.remove(position);

        // Failpoint: simulate a crash after the delete committed but
        // before the recreate. The case is now absent.
        if self.fail_between_assign_steps.swap(false, Ordering::SeqCst) {
            return Err(HandoffError::StoreUnavailable {
                source: "injected failure between delete and recreate".into(),
            });
        }

        // Step two: recreate under the agent's key.
        let recreated = SupportCase {
            id: Uuid::new_v4().to_string(),
            agent_id: Some(agent_id.to_string()),
            status: CaseStatus::Active,
            updated_at: self.next_stamp(),
            ..removed
        };
        cases.push(recreated.clone());
        Ok(recreated)
    }

    async fn set_status(
        &self,
        case: &SupportCase,
        status: CaseStatus,
    ) -> Result<SupportCase, HandoffError> {
        let mut cases = self.cases.lock().await;
        let stamp = self.next_stamp();
        let record = cases
            .iter_mut()
            .find(|c| c.id == case.id && c.agent_id == case.agent_id);
        match record {
            Some(record) => {
                record.status = status;
                record.updated_at = stamp;
                Ok(record.clone())
            }
            None => Err(HandoffError::CaseNotFound {
                case_id: case.case_id.clone(),
            }),
        }
    }
}

/// In-memory append-only [`ReferenceDirectory`].
#[derive(Default)]
pub struct MemoryDirectory {
    references: Mutex<Vec<ConversationReference>>,
    seq: AtomicU64,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries (the directory never deletes).
    pub async fn entry_count(&self) -> usize {
        self.references.lock().await.len()
    }
}

#[async_trait]
impl ReferenceDirectory for MemoryDirectory {
    async fn put(&self, reference: &ConversationReference) -> Result<(), HandoffError> {
        let mut stored = reference.clone();
        stored.stored_at = format!("{:08}", self.seq.fetch_add(1, Ordering::SeqCst));
        self.references.lock().await.push(stored);
        Ok(())
    }

    async fn get_by_participant(
        &self,
        participant_id: &str,
    ) -> Result<Option<ConversationReference>, HandoffError> {
        Ok(self
            .references
            .lock()
            .await
            .iter()
            .rev()
            .find(|r| r.participant_id == participant_id)
            .cloned())
    }

    async fn get_by_participant_and_conversation(
        &self,
        participant_id: &str,
        conversation_id: &str,
    ) -> Result<Option<ConversationReference>, HandoffError> {
        Ok(self
            .references
            .lock()
            .await
            .iter()
            .rev()
            .find(|r| r.participant_id == participant_id && r.conversation_id == conversation_id)
            .cloned())
    }
}

/// In-memory FIFO [`RequestQueue`].
#[derive(Default)]
pub struct MemoryQueue {
    items: Mutex<VecDeque<PendingRequest>>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current queue depth.
    pub async fn len(&self) -> usize {
        self.items.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.lock().await.is_empty()
    }
}

#[async_trait]
impl RequestQueue for MemoryQueue {
    async fn enqueue(&self, request: &PendingRequest) -> Result<(), HandoffError> {
        self.items.lock().await.push_back(request.clone());
        Ok(())
    }

    async fn dequeue(&self) -> Result<Option<PendingRequest>, HandoffError> {
        Ok(self.items.lock().await.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_case_store_enforces_one_open_case() {
        let store = MemoryCaseStore::new();
        store.create("user-1", "conv-1").await.unwrap();
        let err = store.create("user-1", "conv-2").await.unwrap_err();
        assert!(matches!(err, HandoffError::AlreadyOpen { .. }));
    }

    #[tokio::test]
    async fn failpoint_leaves_case_absent_not_duplicated() {
        let store = MemoryCaseStore::new();
        let pending = store.create("user-1", "conv-1").await.unwrap();

        store.fail_between_assign_steps();
        let err = store.assign(&pending, "agent-1").await.unwrap_err();
        assert!(matches!(err, HandoffError::StoreUnavailable { .. }));

        // The record is gone entirely; the user must re-submit.
        assert!(store.all_cases().await.is_empty());
        assert_eq!(
            store.find_oldest_pending_for_user("user-1").await.unwrap(),
            None
        );

        // The failpoint disarms: a fresh request assigns normally.
        let pending = store.create("user-1", "conv-1").await.unwrap();
        let active = store.assign(&pending, "agent-1").await.unwrap();
        assert_eq!(active.status, CaseStatus::Active);
    }

    #[tokio::test]
    async fn memory_queue_is_fifo() {
        let queue = MemoryQueue::new();
        for n in 1..=3 {
            queue
                .enqueue(&PendingRequest {
                    user_id: format!("user-{n}"),
                    user_conversation_id: format!("conv-{n}"),
                })
                .await
                .unwrap();
        }
        assert_eq!(queue.dequeue().await.unwrap().unwrap().user_id, "user-1");
        assert_eq!(queue.dequeue().await.unwrap().unwrap().user_id, "user-2");
        assert_eq!(queue.dequeue().await.unwrap().unwrap().user_id, "user-3");
        assert_eq!(queue.dequeue().await.unwrap(), None);
    }

    #[tokio::test]
    async fn memory_directory_returns_most_recent() {
        let directory = MemoryDirectory::new();
        for conversation in ["conv-1", "conv-2"] {
            directory
                .put(&ConversationReference {
                    channel_id: "webchat".to_string(),
                    participant_id: "user-1".to_string(),
                    conversation_id: conversation.to_string(),
                    resume_token: serde_json::json!({}),
                    stored_at: String::new(),
                })
                .await
                .unwrap();
        }
        let latest = directory.get_by_participant("user-1").await.unwrap().unwrap();
        assert_eq!(latest.conversation_id, "conv-2");
        assert_eq!(directory.entry_count().await, 2);
    }
}
