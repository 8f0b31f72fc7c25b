// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams the coordinator depends on.
//!
//! Every collaborator -- the two durable stores, the queue, and the two
//! external capabilities (proactive delivery, transcript read) -- is consumed
//! through one of these `#[async_trait]` interfaces so it can be injected,
//! and faked in tests.

pub mod cases;
pub mod directory;
pub mod messenger;
pub mod queue;
pub mod transcript;

// Re-export all traits at the traits module level for convenience.
pub use cases::CaseStore;
pub use directory::ReferenceDirectory;
pub use messenger::ProactiveMessenger;
pub use queue::RequestQueue;
pub use transcript::TranscriptSource;
