// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound campaign driver.
//!
//! Works through the current working set in batches under two caps:
//! `max_initiated` bounds how many openers are attempted and
//! `max_delivered` bounds how many confirmed deliveries the cycle aims for.
//! Sends inside a batch run concurrently and fail independently. Nothing is
//! retried; a failed lead stays failed for the cycle.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use leadrelay_config::model::CampaignConfig;
use leadrelay_core::types::{CampaignStats, ContactStatus, Lead, MarkOutcome, TemplateMessage};
use leadrelay_core::{MessagingChannel, StatusLedger};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::counters::CampaignCaps;
use crate::state::CampaignState;

/// Driver pacing, caps, and opener template.
#[derive(Debug, Clone)]
pub struct DriverSettings {
    pub caps: CampaignCaps,
    pub batch_interval: Duration,
    pub settle_timeout: Duration,
    pub template_name: String,
    pub template_language: String,
    pub header_image_url: Option<String>,
}

impl DriverSettings {
    pub fn from_config(config: &CampaignConfig) -> Self {
        Self {
            caps: CampaignCaps {
                max_initiated: config.max_initiated,
                max_delivered: config.max_delivered,
            },
            batch_interval: config.batch_interval(),
            settle_timeout: config.settle_timeout(),
            template_name: config.template_name.clone(),
            template_language: config.template_language.clone(),
            header_image_url: config.header_image_url.clone(),
        }
    }

    /// The opener for `lead`, personalised with the lead's name.
    pub fn template_for(&self, lead: &Lead) -> TemplateMessage {
        TemplateMessage {
            name: self.template_name.clone(),
            language: self.template_language.clone(),
            header_image_url: self.header_image_url.clone(),
            body_parameters: vec![lead.name.clone()],
        }
    }
}

/// Sends openers for the working set held in [`CampaignState`].
pub struct CampaignDriver {
    state: Arc<CampaignState>,
    channel: Arc<dyn MessagingChannel + Send + Sync>,
    ledger: Arc<dyn StatusLedger + Send + Sync>,
    settings: DriverSettings,
}

impl CampaignDriver {
    pub fn new(
        state: Arc<CampaignState>,
        channel: Arc<dyn MessagingChannel + Send + Sync>,
        ledger: Arc<dyn StatusLedger + Send + Sync>,
        settings: DriverSettings,
    ) -> Self {
        Self {
            state,
            channel,
            ledger,
            settings,
        }
    }

    pub fn state(&self) -> &Arc<CampaignState> {
        &self.state
    }

    pub fn settings(&self) -> &DriverSettings {
        &self.settings
    }

    /// Runs one cycle over the leads installed by [`CampaignState::begin_cycle`].
    ///
    /// Returns the counters after the settle wait. Cancelling `cancel` stops
    /// before the next batch and skips the settle wait.
    pub async fn initiate_conversations(&self, cancel: &CancellationToken) -> CampaignStats {
        let total = self.state.lead_count().await;
        if total == 0 {
            info!("no leads to process");
            return self.state.stats();
        }
        info!(
            leads = total,
            max_initiated = self.settings.caps.max_initiated,
            max_delivered = self.settings.caps.max_delivered,
            "starting campaign"
        );
        let started = std::time::Instant::now();

        loop {
            if cancel.is_cancelled() {
                info!("campaign cancelled");
                return self.state.stats();
            }

            let batch = self.state.claim_batch(&self.settings.caps).await;
            if batch.is_empty() {
                break;
            }
            let size = batch.len();
            join_all(batch.into_iter().map(|(index, lead)| self.contact_lead(index, lead))).await;

            let stats = self.state.stats();
            info!(
                batch = size,
                initiated = stats.initiated,
                delivered = stats.delivered,
                pending = stats.pending,
                failed = stats.failed,
                "batch complete"
            );

            if self.state.peek_batch_size(&self.settings.caps).await == 0 {
                break;
            }
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("campaign cancelled");
                    return self.state.stats();
                }
                _ = tokio::time::sleep(self.settings.batch_interval) => {}
            }
        }

        let settled = tokio::select! {
            _ = cancel.cancelled() => false,
            settled = self.state.wait_for_settle(self.settings.settle_timeout) => settled,
        };
        let stats = self.state.stats();
        if !settled {
            warn!(pending = stats.pending, "campaign finished with deliveries still pending");
        }
        info!(
            initiated = stats.initiated,
            delivered = stats.delivered,
            pending = stats.pending,
            failed = stats.failed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "campaign finished"
        );
        stats
    }

    /// Marks, sends, and records one lead. Errors are logged here.
    async fn contact_lead(&self, index: usize, lead: Lead) {
        match self
            .ledger
            .mark_contacted(&lead.phone, ContactStatus::Initiated)
            .await
        {
            Ok(MarkOutcome::Recorded) => {}
            Ok(MarkOutcome::AlreadyContacted) => {
                info!(name = %lead.name, phone = %lead.phone, "lead contacted since import, skipping send");
                return;
            }
            Err(e) => warn!(phone = %lead.phone, error = %e, "failed to persist initiated status"),
        }

        debug!(name = %lead.name, phone = %lead.phone, "sending opener");
        let template = self.settings.template_for(&lead);
        match self.channel.send_template(&lead.phone, &template).await {
            Ok(message_id) => {
                info!(
                    name = %lead.name,
                    phone = %lead.phone,
                    message_id = %message_id,
                    "initiated conversation"
                );
                self.state.record_sent(index, message_id).await;
                if let Err(e) = self.ledger.update_status(&lead.phone, ContactStatus::Sent).await {
                    warn!(phone = %lead.phone, error = %e, "failed to persist sent status");
                }
            }
            Err(e) => {
                warn!(name = %lead.name, phone = %lead.phone, error = %e, "failed to send opener");
                self.state.record_send_failed(index).await;
                if let Err(e) = self
                    .ledger
                    .update_status(&lead.phone, ContactStatus::Failed)
                    .await
                {
                    warn!(phone = %lead.phone, error = %e, "failed to persist failed status");
                }
            }
        }
    }
}
