// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! Remote collaborators extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod board;
pub mod channel;
pub mod generator;
pub mod ledger;

pub use adapter::PluginAdapter;
pub use board::BoardAdapter;
pub use channel::MessagingChannel;
pub use generator::ResponseGenerator;
pub use ledger::StatusLedger;
