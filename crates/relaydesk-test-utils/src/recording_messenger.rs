// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recording proactive messenger for deterministic testing.
//!
//! Captures every delivery for assertion instead of resuming a real
//! session. Deliveries can be forced to fail to exercise error
//! propagation.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use relaydesk_core::types::ConversationReference;
use relaydesk_core::{HandoffError, ProactiveMessenger};

/// One captured proactive delivery.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub reference: ConversationReference,
    pub text: String,
}

/// A [`ProactiveMessenger`] that records instead of sending.
#[derive(Default)]
pub struct RecordingMessenger {
    deliveries: Mutex<Vec<Delivery>>,
    fail_deliveries: AtomicBool,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent delivery fail with a `Delivery` error.
    pub fn fail_deliveries(&self, fail: bool) {
        self.fail_deliveries.store(fail, Ordering::SeqCst);
    }

    /// All captured deliveries, in order.
    pub async fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().await.clone()
    }

    /// Texts delivered to one participant, in order.
    pub async fn texts_to(&self, participant_id: &str) -> Vec<String> {
        self.deliveries
            .lock()
            .await
            .iter()
            .filter(|d| d.reference.participant_id == participant_id)
            .map(|d| d.text.clone())
            .collect()
    }

    pub async fn delivery_count(&self) -> usize {
        self.deliveries.lock().await.len()
    }
}

#[async_trait]
impl ProactiveMessenger for RecordingMessenger {
    async fn resume_and_send(
        &self,
        reference: &ConversationReference,
        text: &str,
    ) -> Result<(), HandoffError> {
        if self.fail_deliveries.load(Ordering::SeqCst) {
            return Err(HandoffError::Delivery {
                message: format!(
                    "injected delivery failure for {}",
                    reference.participant_id
                ),
                source: None,
            });
        }
        self.deliveries.lock().await.push(Delivery {
            reference: reference.clone(),
            text: text.to_string(),
        });
        Ok(())
    }
}
