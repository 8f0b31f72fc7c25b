// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the store trait seams.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use relaydesk_config::model::StorageConfig;
use relaydesk_core::types::{
    CaseStatus, ConversationReference, PendingRequest, SupportCase,
};
use relaydesk_core::{CaseStore, HandoffError, ReferenceDirectory, RequestQueue};

use crate::database::Database;
use crate::queries;

/// SQLite-backed implementation of [`CaseStore`], [`ReferenceDirectory`],
/// and [`RequestQueue`].
///
/// Wraps a [`Database`] handle and delegates all operations to the typed
/// query modules. The database is lazily opened on the first call to
/// [`initialize`](SqliteHandoffStorage::initialize); share one instance
/// behind an `Arc` and hand it to the coordinator as each of the three
/// trait objects.
pub struct SqliteHandoffStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteHandoffStorage {
    /// Create a new storage handle with the given configuration.
    ///
    /// The database connection is not opened until [`initialize`] is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Open the database, apply PRAGMAs, and run migrations.
    pub async fn initialize(&self) -> Result<(), HandoffError> {
        let db = Database::open(&self.config.database_path).await?;
        if !self.config.wal_mode {
            db.connection()
                .call(|conn| {
                    conn.execute_batch("PRAGMA journal_mode = DELETE;")?;
                    Ok(())
                })
                .await
                .map_err(crate::database::map_tr_err)?;
        }
        self.db.set(db).map_err(|_| {
            HandoffError::Internal("storage already initialized".to_string())
        })?;
        debug!(path = %self.config.database_path, "SQLite handoff storage initialized");
        Ok(())
    }

    /// Checkpoint the WAL and flush pending writes.
    pub async fn close(&self) -> Result<(), HandoffError> {
        self.db()?.close().await
    }

    fn db(&self) -> Result<&Database, HandoffError> {
        self.db.get().ok_or_else(|| {
            HandoffError::Internal("storage not initialized -- call initialize() first".to_string())
        })
    }
}

#[async_trait]
impl CaseStore for SqliteHandoffStorage {
    async fn create(
        &self,
        user_id: &str,
        user_conversation_id: &str,
    ) -> Result<SupportCase, HandoffError> {
        queries::cases::create(self.db()?, user_id, user_conversation_id).await
    }

    async fn find_oldest_pending_for_user(
        &self,
        user_id: &str,
    ) -> Result<Option<SupportCase>, HandoffError> {
        queries::cases::find_oldest_pending_for_user(self.db()?, user_id).await
    }

    async fn find_active_for_agent(
        &self,
        agent_id: &str,
    ) -> Result<Option<SupportCase>, HandoffError> {
        queries::cases::find_active_for_agent(self.db()?, agent_id).await
    }

    async fn find_by_user_and_conversation(
        &self,
        user_id: &str,
        conversation_id: &str,
    ) -> Result<Option<SupportCase>, HandoffError> {
        queries::cases::find_by_user_and_conversation(self.db()?, user_id, conversation_id).await
    }

    async fn assign(
        &self,
        case: &SupportCase,
        agent_id: &str,
    ) -> Result<SupportCase, HandoffError> {
        queries::cases::assign(self.db()?, case, agent_id).await
    }

    async fn set_status(
        &self,
        case: &SupportCase,
        status: CaseStatus,
    ) -> Result<SupportCase, HandoffError> {
        queries::cases::set_status(self.db()?, case, status).await
    }
}

#[async_trait]
impl ReferenceDirectory for SqliteHandoffStorage {
    async fn put(&self, reference: &ConversationReference) -> Result<(), HandoffError> {
        queries::directory::put(self.db()?, reference).await
    }

    async fn get_by_participant(
        &self,
        participant_id: &str,
    ) -> Result<Option<ConversationReference>, HandoffError> {
        queries::directory::get_by_participant(self.db()?, participant_id).await
    }

    async fn get_by_participant_and_conversation(
        &self,
        participant_id: &str,
        conversation_id: &str,
    ) -> Result<Option<ConversationReference>, HandoffError> {
        queries::directory::get_by_participant_and_conversation(
            self.db()?,
            participant_id,
            conversation_id,
        )
        .await
    }
}

#[async_trait]
impl RequestQueue for SqliteHandoffStorage {
    async fn enqueue(&self, request: &PendingRequest) -> Result<(), HandoffError> {
        queries::queue::enqueue(self.db()?, request).await?;
        Ok(())
    }

    async fn dequeue(&self) -> Result<Option<PendingRequest>, HandoffError> {
        queries::queue::dequeue(self.db()?).await
    }
}
