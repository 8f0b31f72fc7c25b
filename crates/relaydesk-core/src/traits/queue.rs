// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! FIFO queue of pending handoff requests.

use async_trait::async_trait;

use crate::error::HandoffError;
use crate::types::PendingRequest;

/// FIFO queue of [`PendingRequest`]s.
///
/// The queue performs no deduplication -- that is the case store's
/// `AlreadyOpen` responsibility, enforced before enqueue.
#[async_trait]
pub trait RequestQueue: Send + Sync {
    /// Appends a request to the tail.
    async fn enqueue(&self, request: &PendingRequest) -> Result<(), HandoffError>;

    /// Removes and returns the head, or `None` when the queue is empty.
    ///
    /// Destructive and at-most-once: a crash after dequeue but before the
    /// claiming agent is connected loses the request from the queue. The
    /// surviving Pending case record is the recovery anchor.
    async fn dequeue(&self) -> Result<Option<PendingRequest>, HandoffError>;
}
