// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Proactive cross-session delivery capability.

use async_trait::async_trait;

use crate::error::HandoffError;
use crate::types::ConversationReference;

/// Resumes a stored session and delivers a message into it.
///
/// This is a capability the coordinator depends on, never implements: the
/// transport adapter owns session resumption. Delivery is awaited only for
/// error propagation -- it does not gate the current turn's own reply.
#[async_trait]
pub trait ProactiveMessenger: Send + Sync {
    async fn resume_and_send(
        &self,
        reference: &ConversationReference,
        text: &str,
    ) -> Result<(), HandoffError>;
}
