// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for leadrelay integration tests.
//!
//! Provides mock adapters and a harness for fast, deterministic tests
//! without WhatsApp, OpenAI, or Trello.
//!
//! # Components
//!
//! - [`MockChannel`] - records sends, assigns message ids, fails chosen recipients
//! - [`MockGenerator`] - returns queued replies and records the history it saw
//! - [`MockBoard`] - in-memory cards with list placement
//! - [`TestHarness`] - a wired campaign over a temp lead file and ledger

pub mod harness;
pub mod mock_board;
pub mod mock_channel;
pub mod mock_generator;

pub use harness::TestHarness;
pub use mock_board::MockBoard;
pub use mock_channel::{MockChannel, SentMessage};
pub use mock_generator::MockGenerator;
