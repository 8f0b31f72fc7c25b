// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Support case operations.
//!
//! The storage partition key of a case is its agent id. An unassigned
//! record's key cannot be mutated in place, so [`assign`] is a
//! delete-and-recreate across two separately committed writes -- see the
//! function docs for the crash-window contract.

use std::str::FromStr;

use relaydesk_core::HandoffError;
use relaydesk_core::types::{CaseStatus, SupportCase};
use rusqlite::params;
use uuid::Uuid;

use crate::database::{Database, map_tr_err};

const CASE_COLUMNS: &str =
    "id, case_id, user_id, user_conversation_id, agent_id, status, created_at, updated_at";

fn case_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SupportCase> {
    let status_str: String = row.get(5)?;
    let status = CaseStatus::from_str(&status_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(SupportCase {
        id: row.get(0)?,
        case_id: row.get(1)?,
        user_id: row.get(2)?,
        user_conversation_id: row.get(3)?,
        agent_id: row.get(4)?,
        status,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

/// Insert a fresh `Pending` case for the user.
///
/// Enforces the one-open-case-per-user invariant: fails with
/// [`HandoffError::AlreadyOpen`] when a Pending/Active/ClosedByAgent case
/// already exists. The existence check and the insert share one
/// transaction.
pub async fn create(
    db: &Database,
    user_id: &str,
    user_conversation_id: &str,
) -> Result<SupportCase, HandoffError> {
    let user = user_id.to_string();
    let conversation = user_conversation_id.to_string();
    let id = Uuid::new_v4().to_string();
    let case_id = Uuid::new_v4().to_string();

    let created = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let open_count: i64 = tx.query_row(
                "SELECT COUNT(*) FROM support_cases
                 WHERE user_id = ?1 AND status IN ('Pending', 'Active', 'ClosedByAgent')",
                params![user],
                |row| row.get(0),
            )?;
            if open_count > 0 {
                tx.commit()?;
                return Ok(None);
            }

            tx.execute(
                "INSERT INTO support_cases (id, case_id, user_id, user_conversation_id, agent_id, status)
                 VALUES (?1, ?2, ?3, ?4, NULL, 'Pending')",
                params![id, case_id, user, conversation],
            )?;
            let case = tx.query_row(
                &format!("SELECT {CASE_COLUMNS} FROM support_cases WHERE id = ?1"),
                params![id],
                case_from_row,
            )?;
            tx.commit()?;
            Ok(Some(case))
        })
        .await
        .map_err(map_tr_err)?;

    created.ok_or_else(|| HandoffError::AlreadyOpen {
        user_id: user_id.to_string(),
    })
}

/// Oldest `Pending` case for the user, ties broken by insertion order.
pub async fn find_oldest_pending_for_user(
    db: &Database,
    user_id: &str,
) -> Result<Option<SupportCase>, HandoffError> {
    let user = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!(
                    "SELECT {CASE_COLUMNS} FROM support_cases
                     WHERE user_id = ?1 AND status = 'Pending'
                     ORDER BY created_at ASC, rowid ASC LIMIT 1"
                ),
                params![user],
                case_from_row,
            );
            match result {
                Ok(case) => Ok(Some(case)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// The case currently `Active` and assigned to the agent.
///
/// More than one match should not happen under the one-open-case
/// invariant; the most recently written record wins, defensively.
pub async fn find_active_for_agent(
    db: &Database,
    agent_id: &str,
) -> Result<Option<SupportCase>, HandoffError> {
    let agent = agent_id.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!(
                    "SELECT {CASE_COLUMNS} FROM support_cases
                     WHERE agent_id = ?1 AND status = 'Active'
                     ORDER BY updated_at DESC, rowid DESC LIMIT 1"
                ),
                params![agent],
                case_from_row,
            );
            match result {
                Ok(case) => Ok(Some(case)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Most recent case for the user+conversation pair, any status.
pub async fn find_by_user_and_conversation(
    db: &Database,
    user_id: &str,
    conversation_id: &str,
) -> Result<Option<SupportCase>, HandoffError> {
    let user = user_id.to_string();
    let conversation = conversation_id.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!(
                    "SELECT {CASE_COLUMNS} FROM support_cases
                     WHERE user_id = ?1 AND user_conversation_id = ?2
                     ORDER BY created_at DESC, rowid DESC LIMIT 1"
                ),
                params![user, conversation],
                case_from_row,
            );
            match result {
                Ok(case) => Ok(Some(case)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Transition a `Pending` case to `Active` with the given agent.
///
/// Delete-and-recreate: the unassigned record is removed in its own
/// committed write, then a record with the same `case_id` (fresh `id`),
/// status `Active`, and the new agent is inserted in a second write. The
/// two writes are deliberately NOT one transaction -- a crash between them
/// must leave the case absent, never duplicated; the user re-submitting is
/// the accepted recovery path for that window.
pub async fn assign(
    db: &Database,
    case: &SupportCase,
    agent_id: &str,
) -> Result<SupportCase, HandoffError> {
    let old_id = case.id.clone();
    let deleted = db
        .connection()
        .call(move |conn| {
            let n = conn.execute(
                "DELETE FROM support_cases WHERE id = ?1 AND agent_id IS NULL",
                params![old_id],
            )?;
            Ok(n)
        })
        .await
        .map_err(map_tr_err)?;

    if deleted == 0 {
        return Err(HandoffError::CaseNotFound {
            case_id: case.case_id.clone(),
        });
    }

    let new_id = Uuid::new_v4().to_string();
    let case_id = case.case_id.clone();
    let user = case.user_id.clone();
    let conversation = case.user_conversation_id.clone();
    let created_at = case.created_at.clone();
    let agent = agent_id.to_string();

    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO support_cases (id, case_id, user_id, user_conversation_id, agent_id, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, 'Active', ?6)",
                params![new_id, case_id, user, conversation, agent, created_at],
            )?;
            let case = conn.query_row(
                &format!("SELECT {CASE_COLUMNS} FROM support_cases WHERE id = ?1"),
                params![new_id],
                case_from_row,
            )?;
            Ok(case)
        })
        .await
        .map_err(map_tr_err)
}

/// Rewrite the record with `status`, preserving all other fields.
///
/// The record is located by `(id, agent_id)` -- that pair forms the storage
/// key for agent-keyed records.
pub async fn set_status(
    db: &Database,
    case: &SupportCase,
    status: CaseStatus,
) -> Result<SupportCase, HandoffError> {
    let id = case.id.clone();
    let agent = case.agent_id.clone();
    let status_str = status.to_string();

    let updated = db
        .connection()
        .call(move |conn| {
            let n = conn.execute(
                "UPDATE support_cases
                 SET status = ?1, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?2 AND agent_id IS ?3",
                params![status_str, id, agent],
            )?;
            if n == 0 {
                return Ok(None);
            }
            let case = conn.query_row(
                &format!("SELECT {CASE_COLUMNS} FROM support_cases WHERE id = ?1"),
                params![id],
                case_from_row,
            )?;
            Ok(Some(case))
        })
        .await
        .map_err(map_tr_err)?;

    updated.ok_or_else(|| HandoffError::CaseNotFound {
        case_id: case.case_id.clone(),
    })
}
