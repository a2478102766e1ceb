// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Campaign engine for leadrelay.
//!
//! - [`leads`] imports the working set and filters contacted phones
//! - [`ledger`] persists contact status as a JSON document
//! - [`driver`] sends openers in capped, paced batches
//! - [`tracker`] reconciles delivery callbacks
//! - [`inbound`] answers replies and mirrors them to the board
//! - [`dispatcher`] orders inbound events per phone
//! - [`scheduler`] repeats the campaign on an interval

pub mod classifier;
pub mod conversation;
pub mod counters;
pub mod dispatcher;
pub mod driver;
pub mod inbound;
pub mod leads;
pub mod ledger;
pub mod scheduler;
pub mod shutdown;
pub mod state;
pub mod tracker;

pub use classifier::{is_lead_interested, TRIGGER_WORDS};
pub use conversation::{ConversationSession, ConversationStore, MAX_TURNS};
pub use counters::{plan_batch, CampaignCaps};
pub use dispatcher::EventDispatcher;
pub use driver::{CampaignDriver, DriverSettings};
pub use inbound::{InboundHandler, InboundOutcome};
pub use leads::{load_leads, Delimiter, LeadDirectory, LeadImport, LeadSource};
pub use ledger::JsonFileLedger;
pub use scheduler::CampaignScheduler;
pub use state::CampaignState;
pub use tracker::{DeliveryTracker, TrackOutcome};
