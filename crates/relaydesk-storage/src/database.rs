// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread: `Database` wraps a single `tokio_rusqlite::Connection`, query
//! modules accept `&Database` and go through `connection().call()`. Do NOT
//! create additional Connection instances for writes -- the single-writer
//! model is what keeps SQLITE_BUSY out of the picture.

use relaydesk_core::HandoffError;
use tokio_rusqlite::Connection;
use tracing::debug;

use crate::migrations;

/// Handle to the SQLite database backing the case store, the conversation
/// reference directory, and the handoff queue.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Open (or create) the database at `path`, apply PRAGMAs, and run all
    /// pending migrations.
    pub async fn open(path: &str) -> Result<Self, HandoffError> {
        let connection = Connection::open(path)
            .await
            .map_err(|e| HandoffError::StoreUnavailable { source: e.into() })?;

        connection
            .call(|conn| {
                conn.execute_batch(
                    "PRAGMA journal_mode = WAL;
                     PRAGMA synchronous = NORMAL;
                     PRAGMA foreign_keys = ON;
                     PRAGMA busy_timeout = 5000;",
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;

        connection
            .call(|conn| migrations::run_migrations(conn))
            .await
            .map_err(|e| match e {
                tokio_rusqlite::Error::Error(inner) => inner,
                other => HandoffError::StoreUnavailable {
                    source: Box::new(other),
                },
            })?;

        debug!(path, "database opened");
        Ok(Self { connection })
    }

    /// The underlying tokio-rusqlite connection (the single writer).
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Checkpoint the WAL and close the background connection.
    pub async fn close(&self) -> Result<(), HandoffError> {
        self.connection
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

/// Map a tokio-rusqlite error onto the store-unavailable variant.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error) -> HandoffError {
    HandoffError::StoreUnavailable { source: e.into() }
}

/// Map a tokio-rusqlite error onto the queue-unavailable variant.
pub(crate) fn map_queue_err(e: tokio_rusqlite::Error) -> HandoffError {
    HandoffError::QueueUnavailable { source: e.into() }
}
