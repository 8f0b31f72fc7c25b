// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Relaydesk handoff engine.

use thiserror::Error;

/// The primary error type used across the store traits and the coordinator.
#[derive(Debug, Error)]
pub enum HandoffError {
    /// An open support case (Pending/Active/ClosedByAgent) already exists for
    /// the user. Informational for the coordinator: the request is already
    /// being handled.
    #[error("an open support case already exists for user {user_id}")]
    AlreadyOpen { user_id: String },

    /// A case transition targeted a record that no longer exists. Treated as
    /// already-handled where the coordinator can do so safely.
    #[error("support case not found: {case_id}")]
    CaseNotFound { case_id: String },

    /// The case store or directory backend is unreachable or failed a
    /// read/write.
    #[error("store unavailable: {source}")]
    StoreUnavailable {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The pending-request queue backend is unreachable or failed.
    #[error("request queue unavailable: {source}")]
    QueueUnavailable {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Proactive delivery into a resumed session failed.
    #[error("proactive delivery failed: {message}")]
    Delivery {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Transcript listing or segment fetch failed.
    #[error("transcript source error: {message}")]
    Transcript {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration errors (invalid TOML, missing required fields).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
