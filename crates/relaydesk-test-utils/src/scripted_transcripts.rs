// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted transcript source for deterministic replay testing.
//!
//! Histories are registered per `(channel, encoded conversation id)` pair --
//! the same encoded form the engine produces -- so tests assert both the
//! encoding and the rendering. Lookups for unknown conversations return an
//! empty history, matching a user with no stored transcript.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use relaydesk_core::types::{TranscriptEvent, TranscriptSegment};
use relaydesk_core::{HandoffError, TranscriptSource};

/// A [`TranscriptSource`] backed by pre-registered histories.
#[derive(Default)]
pub struct ScriptedTranscripts {
    histories: Mutex<HashMap<String, Vec<TranscriptEvent>>>,
    requests: Mutex<Vec<(String, String)>>,
}

impl ScriptedTranscripts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the history served for one channel + encoded conversation.
    pub async fn script(
        &self,
        channel_id: &str,
        encoded_conversation_id: &str,
        events: Vec<TranscriptEvent>,
    ) {
        self.histories
            .lock()
            .await
            .insert(key(channel_id, encoded_conversation_id), events);
    }

    /// Every `(channel, encoded conversation id)` pair that was listed,
    /// for asserting the engine applied the encoding table.
    pub async fn listed_requests(&self) -> Vec<(String, String)> {
        self.requests.lock().await.clone()
    }
}

fn key(channel_id: &str, encoded_conversation_id: &str) -> String {
    format!("{channel_id}/{encoded_conversation_id}")
}

#[async_trait]
impl TranscriptSource for ScriptedTranscripts {
    async fn list_segments(
        &self,
        channel_id: &str,
        encoded_conversation_id: &str,
    ) -> Result<Vec<TranscriptSegment>, HandoffError> {
        self.requests.lock().await.push((
            channel_id.to_string(),
            encoded_conversation_id.to_string(),
        ));
        let key = key(channel_id, encoded_conversation_id);
        let count = self
            .histories
            .lock()
            .await
            .get(&key)
            .map(|events| events.len())
            .unwrap_or(0);
        Ok((0..count)
            .map(|i| TranscriptSegment {
                uri: format!("mem://{key}/{i}"),
            })
            .collect())
    }

    async fn fetch_segment(&self, uri: &str) -> Result<TranscriptEvent, HandoffError> {
        let trimmed = uri.strip_prefix("mem://").ok_or_else(|| {
            HandoffError::Transcript {
                message: format!("unknown segment uri {uri}"),
                source: None,
            }
        })?;
        let (key, index) = trimmed.rsplit_once('/').ok_or_else(|| {
            HandoffError::Transcript {
                message: format!("malformed segment uri {uri}"),
                source: None,
            }
        })?;
        let index: usize = index.parse().map_err(|_| HandoffError::Transcript {
            message: format!("malformed segment index in {uri}"),
            source: None,
        })?;
        self.histories
            .lock()
            .await
            .get(key)
            .and_then(|events| events.get(index))
            .cloned()
            .ok_or_else(|| HandoffError::Transcript {
                message: format!("no event behind {uri}"),
                source: None,
            })
    }
}
