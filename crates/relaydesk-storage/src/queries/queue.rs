// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! FIFO queue operations for pending handoff requests.

use relaydesk_core::HandoffError;
use relaydesk_core::types::PendingRequest;
use rusqlite::params;

use crate::database::{Database, map_queue_err};

/// Append a request to the tail. Returns the auto-generated row id.
///
/// No deduplication happens here: the case store's `AlreadyOpen` check runs
/// before any enqueue.
pub async fn enqueue(db: &Database, request: &PendingRequest) -> Result<i64, HandoffError> {
    let payload = serde_json::to_string(request)
        .map_err(|e| HandoffError::Internal(format!("request not serializable: {e}")))?;
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO handoff_queue (payload) VALUES (?1)",
                params![payload],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_queue_err)
}

/// Remove and return the head of the queue, or `None` when empty.
///
/// Select-oldest and delete share one transaction, so the removal is
/// destructive and at-most-once: no two dequeues can observe the same row.
pub async fn dequeue(db: &Database) -> Result<Option<PendingRequest>, HandoffError> {
    let payload = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let result = tx.query_row(
                "SELECT id, payload FROM handoff_queue ORDER BY id ASC LIMIT 1",
                [],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
            );

            match result {
                Ok((id, payload)) => {
                    tx.execute("DELETE FROM handoff_queue WHERE id = ?1", params![id])?;
                    tx.commit()?;
                    Ok(Some(payload))
                }
                Err(rusqlite::Error::QueryReturnedNoRows) => {
                    tx.commit()?;
                    Ok(None)
                }
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_queue_err)?;

    match payload {
        Some(payload) => {
            let request = serde_json::from_str(&payload)
                .map_err(|e| HandoffError::Internal(format!("malformed queue payload: {e}")))?;
            Ok(Some(request))
        }
        None => Ok(None),
    }
}
