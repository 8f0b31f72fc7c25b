// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable store of support cases.

use async_trait::async_trait;

use crate::error::HandoffError;
use crate::types::{CaseStatus, SupportCase};

/// Durable store of [`SupportCase`] records with status-driven queries.
///
/// Implementations must keep write-time ordering derivable: the `find_*`
/// queries resolve ties by creation/write order, oldest-first for pending
/// lookups and newest-first everywhere else.
#[async_trait]
pub trait CaseStore: Send + Sync {
    /// Inserts a fresh `Pending` case with a newly generated `case_id`.
    ///
    /// Fails with [`HandoffError::AlreadyOpen`] if an open case
    /// (Pending/Active/ClosedByAgent) already exists for `user_id` -- the
    /// one-open-case-per-user invariant is enforced here, before any
    /// request is enqueued.
    async fn create(
        &self,
        user_id: &str,
        user_conversation_id: &str,
    ) -> Result<SupportCase, HandoffError>;

    /// Oldest `Pending` case for the user, ties broken by creation order.
    async fn find_oldest_pending_for_user(
        &self,
        user_id: &str,
    ) -> Result<Option<SupportCase>, HandoffError>;

    /// The case currently `Active` and assigned to the agent.
    async fn find_active_for_agent(
        &self,
        agent_id: &str,
    ) -> Result<Option<SupportCase>, HandoffError>;

    /// Most recent case for the user+conversation pair, any status.
    async fn find_by_user_and_conversation(
        &self,
        user_id: &str,
        conversation_id: &str,
    ) -> Result<Option<SupportCase>, HandoffError>;

    /// Transitions a `Pending` case to `Active` with the given agent.
    ///
    /// The storage partition key of a case is its agent id and cannot be
    /// mutated in place, so this is a delete-and-recreate: the unassigned
    /// record is removed, then a record with the same `case_id` (but a new
    /// `id`), status `Active`, and the new agent is inserted. The delete
    /// must be durably sequenced before the insert -- a crash between the
    /// two leaves the case absent, never duplicated. Returns
    /// [`HandoffError::CaseNotFound`] if the unassigned record is already
    /// gone.
    async fn assign(
        &self,
        case: &SupportCase,
        agent_id: &str,
    ) -> Result<SupportCase, HandoffError>;

    /// Rewrites the record with `status`, preserving all other fields.
    ///
    /// Agent-keyed records are located via both `id` and `agent_id`; that
    /// pair forms the storage key. Returns [`HandoffError::CaseNotFound`]
    /// when no such record exists.
    async fn set_status(
        &self,
        case: &SupportCase,
        status: CaseStatus,
    ) -> Result<SupportCase, HandoffError>;
}
