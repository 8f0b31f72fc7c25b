// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Relaydesk handoff engine.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a
//! single-writer concurrency model via `tokio-rusqlite`, and typed
//! operations for support cases, the conversation reference directory, and
//! the FIFO handoff queue. [`SqliteHandoffStorage`] implements all three
//! store trait seams from `relaydesk-core`.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use adapter::SqliteHandoffStorage;
pub use database::Database;
pub use models::*;
