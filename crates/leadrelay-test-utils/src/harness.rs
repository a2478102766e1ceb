// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end campaign testing.
//!
//! `TestHarness` writes a lead file into a temp directory, opens a real JSON
//! ledger next to it, and wires the driver, tracker, inbound handler, and
//! dispatcher to mock adapters.

use std::sync::Arc;
use std::time::Duration;

use leadrelay_campaign::{
    load_leads, CampaignCaps, CampaignDriver, CampaignState, Delimiter, DeliveryTracker,
    DriverSettings, EventDispatcher, InboundHandler, InboundOutcome, JsonFileLedger,
    LeadDirectory, LeadImport, LeadSource, TrackOutcome,
};
use leadrelay_core::types::{
    CampaignStats, DeliveryReport, MessageId, StatusEvent,
};
use leadrelay_core::{LeadRelayError, StatusLedger};
use tokio_util::sync::CancellationToken;

use crate::mock_board::MockBoard;
use crate::mock_channel::MockChannel;
use crate::mock_generator::MockGenerator;

/// Persona passed to the generator by harness-built handlers.
pub const TEST_PERSONA: &str = "You are a friendly test assistant.";

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    rows: Vec<String>,
    caps: CampaignCaps,
    responses: Vec<String>,
    with_board: bool,
    settle_timeout: Duration,
    unwritable_ledger: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            rows: Vec::new(),
            caps: CampaignCaps {
                max_initiated: 950,
                max_delivered: 950,
            },
            responses: Vec::new(),
            with_board: true,
            settle_timeout: Duration::from_millis(50),
            unwritable_ledger: false,
        }
    }

    /// Adds a `name;phone` row to the lead file.
    pub fn with_lead(mut self, name: &str, phone: &str) -> Self {
        self.rows.push(format!("{name};{phone}"));
        self
    }

    /// Adds a raw line to the lead file.
    pub fn with_raw_row(mut self, row: &str) -> Self {
        self.rows.push(row.to_string());
        self
    }

    pub fn with_caps(mut self, max_initiated: u64, max_delivered: u64) -> Self {
        self.caps = CampaignCaps {
            max_initiated,
            max_delivered,
        };
        self
    }

    pub fn with_mock_responses(mut self, responses: Vec<String>) -> Self {
        self.responses = responses;
        self
    }

    pub fn without_board(mut self) -> Self {
        self.with_board = false;
        self
    }

    pub fn with_settle_timeout(mut self, timeout: Duration) -> Self {
        self.settle_timeout = timeout;
        self
    }

    /// Places the ledger inside a directory that does not exist, so every
    /// write fails.
    pub fn with_unwritable_ledger(mut self) -> Self {
        self.unwritable_ledger = true;
        self
    }

    /// Build the harness, creating the temp lead file and ledger.
    pub async fn build(self) -> Result<TestHarness, LeadRelayError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| LeadRelayError::Storage { source: e.into() })?;
        let csv_path = temp_dir.path().join("leads.csv");
        let mut contents = self.rows.join("\n");
        contents.push('\n');
        std::fs::write(&csv_path, contents).map_err(|source| LeadRelayError::FileAccess {
            path: csv_path.clone(),
            source,
        })?;

        let ledger_dir = if self.unwritable_ledger {
            temp_dir.path().join("missing")
        } else {
            temp_dir.path().to_path_buf()
        };
        let ledger = Arc::new(JsonFileLedger::open(ledger_dir.join("lead_status.json")).await);
        let channel = Arc::new(MockChannel::new());
        let generator = Arc::new(MockGenerator::with_responses(self.responses));
        let board = Arc::new(MockBoard::new());
        let directory = Arc::new(LeadDirectory::new());
        let state = Arc::new(CampaignState::new());

        let settings = DriverSettings {
            caps: self.caps,
            batch_interval: Duration::from_millis(1),
            settle_timeout: self.settle_timeout,
            template_name: "opener2".to_string(),
            template_language: "en".to_string(),
            header_image_url: None,
        };
        let driver = Arc::new(CampaignDriver::new(
            state.clone(),
            channel.clone(),
            ledger.clone(),
            settings,
        ));
        let tracker = Arc::new(DeliveryTracker::new(state.clone(), ledger.clone()));

        let mut inbound = InboundHandler::new(
            channel.clone(),
            generator.clone(),
            ledger.clone(),
            TEST_PERSONA.to_string(),
            "49".to_string(),
        )
        .with_directory(directory.clone());
        if self.with_board {
            inbound = inbound.with_board(board.clone());
        }
        let inbound = Arc::new(inbound);
        let dispatcher = Arc::new(EventDispatcher::new(inbound.clone(), tracker.clone()));

        let source = LeadSource {
            path: csv_path,
            delimiter: Delimiter::Fixed(b';'),
            country_code: "49".to_string(),
        };

        Ok(TestHarness {
            channel,
            generator,
            board,
            ledger,
            state,
            driver,
            tracker,
            inbound,
            dispatcher,
            directory,
            source,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete campaign environment with mock adapters and temp storage.
pub struct TestHarness {
    pub channel: Arc<MockChannel>,
    pub generator: Arc<MockGenerator>,
    pub board: Arc<MockBoard>,
    pub ledger: Arc<JsonFileLedger>,
    pub state: Arc<CampaignState>,
    pub driver: Arc<CampaignDriver>,
    pub tracker: Arc<DeliveryTracker>,
    pub inbound: Arc<InboundHandler>,
    pub dispatcher: Arc<EventDispatcher>,
    pub directory: Arc<LeadDirectory>,
    pub source: LeadSource,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Imports the lead file against the current ledger.
    pub async fn import_leads(&self) -> Result<LeadImport, LeadRelayError> {
        load_leads(&self.source, self.ledger.as_ref()).await
    }

    /// Imports leads, resets the state, and runs one driver cycle.
    pub async fn run_campaign(&self) -> Result<CampaignStats, LeadRelayError> {
        let import = self.import_leads().await?;
        self.directory.extend(import.known);
        self.state.begin_cycle(import.leads).await;
        Ok(self
            .driver
            .initiate_conversations(&CancellationToken::new())
            .await)
    }

    /// Feeds a status callback straight to the tracker.
    pub async fn report(&self, message_id: &MessageId, status: &str) -> TrackOutcome {
        self.tracker
            .on_status_callback(&StatusEvent {
                message_id: message_id.clone(),
                status: DeliveryReport::parse(status),
                recipient_id: None,
            })
            .await
    }

    /// Handles an inbound message directly, bypassing the dispatcher.
    pub async fn receive(&self, from: &str, text: &str) -> Result<InboundOutcome, LeadRelayError> {
        self.inbound.handle_inbound_message(from, text).await
    }

    /// Whether the ledger marks `phone` contacted.
    pub async fn is_contacted(&self, phone: &str) -> bool {
        self.ledger.is_contacted(phone).await
    }
}
