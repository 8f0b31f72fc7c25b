// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation reference directory operations.
//!
//! Writes append; reads take the most recent row. Last write wins purely
//! through sort order, so eventual staleness degrades to "reference not
//! found yet", never to a hard failure.

use relaydesk_core::HandoffError;
use relaydesk_core::types::ConversationReference;
use rusqlite::params;

use crate::database::{Database, map_tr_err};

fn reference_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ConversationReference> {
    let token_str: String = row.get(3)?;
    let resume_token = serde_json::from_str(&token_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(ConversationReference {
        channel_id: row.get(0)?,
        participant_id: row.get(1)?,
        conversation_id: row.get(2)?,
        resume_token,
        stored_at: row.get(4)?,
    })
}

/// Store a reference. Called whenever a participant's session (re)starts.
pub async fn put(db: &Database, reference: &ConversationReference) -> Result<(), HandoffError> {
    let reference = reference.clone();
    let token = serde_json::to_string(&reference.resume_token)
        .map_err(|e| HandoffError::Internal(format!("resume token not serializable: {e}")))?;
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO conversation_refs (channel_id, participant_id, conversation_id, resume_token)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    reference.channel_id,
                    reference.participant_id,
                    reference.conversation_id,
                    token,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Most recent reference for the participant across all conversations.
pub async fn get_by_participant(
    db: &Database,
    participant_id: &str,
) -> Result<Option<ConversationReference>, HandoffError> {
    let participant = participant_id.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT channel_id, participant_id, conversation_id, resume_token, stored_at
                 FROM conversation_refs WHERE participant_id = ?1
                 ORDER BY stored_at DESC, rowid DESC LIMIT 1",
                params![participant],
                reference_from_row,
            );
            match result {
                Ok(reference) => Ok(Some(reference)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Most recent reference scoped to one conversation.
pub async fn get_by_participant_and_conversation(
    db: &Database,
    participant_id: &str,
    conversation_id: &str,
) -> Result<Option<ConversationReference>, HandoffError> {
    let participant = participant_id.to_string();
    let conversation = conversation_id.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT channel_id, participant_id, conversation_id, resume_token, stored_at
                 FROM conversation_refs
                 WHERE participant_id = ?1 AND conversation_id = ?2
                 ORDER BY stored_at DESC, rowid DESC LIMIT 1",
                params![participant, conversation],
                reference_from_row,
            );
            match result {
                Ok(reference) => Ok(Some(reference)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn make_reference(participant: &str, conversation: &str) -> ConversationReference {
        ConversationReference {
            channel_id: "webchat".to_string(),
            participant_id: participant.to_string(),
            conversation_id: conversation.to_string(),
            resume_token: serde_json::json!({ "serviceUrl": "https://example.org" }),
            stored_at: String::new(),
        }
    }

    #[tokio::test]
    async fn put_and_get_round_trips_opaque_token() {
        let (db, _dir) = setup_db().await;

        let reference = make_reference("user-1", "conv-1");
        put(&db, &reference).await.unwrap();

        let found = get_by_participant(&db, "user-1").await.unwrap().unwrap();
        assert_eq!(found.channel_id, "webchat");
        assert_eq!(found.conversation_id, "conv-1");
        assert_eq!(found.resume_token, reference.resume_token);
        assert!(!found.stored_at.is_empty());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn get_unknown_participant_returns_none() {
        let (db, _dir) = setup_db().await;
        assert_eq!(get_by_participant(&db, "nobody").await.unwrap(), None);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn most_recent_reference_wins() {
        let (db, _dir) = setup_db().await;

        let mut old = make_reference("user-1", "conv-1");
        old.resume_token = serde_json::json!({ "generation": 1 });
        put(&db, &old).await.unwrap();

        let mut new = make_reference("user-1", "conv-2");
        new.resume_token = serde_json::json!({ "generation": 2 });
        put(&db, &new).await.unwrap();

        let found = get_by_participant(&db, "user-1").await.unwrap().unwrap();
        assert_eq!(found.conversation_id, "conv-2");
        assert_eq!(found.resume_token, new.resume_token);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn conversation_scoped_lookup_ignores_other_sessions() {
        let (db, _dir) = setup_db().await;

        put(&db, &make_reference("user-1", "conv-1")).await.unwrap();
        put(&db, &make_reference("user-1", "conv-2")).await.unwrap();

        let found = get_by_participant_and_conversation(&db, "user-1", "conv-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.conversation_id, "conv-1");

        assert_eq!(
            get_by_participant_and_conversation(&db, "user-1", "conv-9")
                .await
                .unwrap(),
            None
        );

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn session_restart_overrides_earlier_reference() {
        let (db, _dir) = setup_db().await;

        let mut first = make_reference("user-1", "conv-1");
        first.resume_token = serde_json::json!({ "generation": 1 });
        put(&db, &first).await.unwrap();

        let mut restarted = make_reference("user-1", "conv-1");
        restarted.resume_token = serde_json::json!({ "generation": 2 });
        put(&db, &restarted).await.unwrap();

        let found = get_by_participant_and_conversation(&db, "user-1", "conv-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.resume_token, restarted.resume_token);

        db.close().await.unwrap();
    }
}
