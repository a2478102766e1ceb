// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recurring campaign cycles.
//!
//! Each cycle reloads the lead file, resets the counters, and runs the
//! driver. Cycles are spaced by the configured interval and stop on
//! cancellation.

use std::sync::Arc;
use std::time::Duration;

use leadrelay_core::types::CampaignStats;
use leadrelay_core::StatusLedger;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::driver::CampaignDriver;
use crate::leads::{load_leads, LeadDirectory, LeadImport, LeadSource};

pub struct CampaignScheduler {
    driver: Arc<CampaignDriver>,
    source: LeadSource,
    ledger: Arc<dyn StatusLedger + Send + Sync>,
    directory: Arc<LeadDirectory>,
    cycle_interval: Duration,
    run_on_start: bool,
}

impl CampaignScheduler {
    pub fn new(
        driver: Arc<CampaignDriver>,
        source: LeadSource,
        ledger: Arc<dyn StatusLedger + Send + Sync>,
        directory: Arc<LeadDirectory>,
        cycle_interval: Duration,
        run_on_start: bool,
    ) -> Self {
        Self {
            driver,
            source,
            ledger,
            directory,
            cycle_interval,
            run_on_start,
        }
    }

    /// Runs cycles until `cancel` fires.
    ///
    /// `initial` is the import done at startup; it feeds the first cycle when
    /// `run_on_start` is set. Later cycles re-read the lead file, and a
    /// failed re-read skips that cycle.
    pub async fn run(&self, initial: LeadImport, cancel: CancellationToken) {
        if self.run_on_start {
            self.run_cycle(initial, &cancel).await;
        } else {
            self.directory.extend(initial.known);
        }

        loop {
            info!(interval_secs = self.cycle_interval.as_secs(), "next campaign cycle scheduled");
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.cycle_interval) => {}
            }

            match load_leads(&self.source, self.ledger.as_ref()).await {
                Ok(import) => {
                    self.run_cycle(import, &cancel).await;
                }
                Err(e) => error!(error = %e, "failed to reload leads, skipping cycle"),
            }
        }
        info!("campaign scheduler stopped");
    }

    /// Resets state to `import` and runs the driver once.
    pub async fn run_cycle(&self, import: LeadImport, cancel: &CancellationToken) -> CampaignStats {
        self.directory.extend(import.known);
        info!(leads = import.leads.len(), "starting campaign cycle");
        self.driver.state().begin_cycle(import.leads).await;
        self.driver.initiate_conversations(cancel).await
    }
}
