// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Relaydesk integration tests.
//!
//! Provides in-memory fakes and harness infrastructure for fast,
//! deterministic, CI-runnable tests without a database or a live channel.
//!
//! # Components
//!
//! - [`MemoryCaseStore`] / [`MemoryDirectory`] / [`MemoryQueue`] - in-memory
//!   store fakes, including an assignment failpoint
//! - [`RecordingMessenger`] - captures proactive deliveries for assertion
//! - [`ScriptedTranscripts`] - serves pre-registered conversation histories
//! - [`TestHarness`] - a fully wired coordinator over the fakes

pub mod harness;
pub mod memory_store;
pub mod recording_messenger;
pub mod scripted_transcripts;

pub use harness::TestHarness;
pub use memory_store::{MemoryCaseStore, MemoryDirectory, MemoryQueue};
pub use recording_messenger::{Delivery, RecordingMessenger};
pub use scripted_transcripts::ScriptedTranscripts;
