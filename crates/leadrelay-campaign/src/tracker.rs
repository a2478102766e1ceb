// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery status tracking.
//!
//! Reacts to status callbacks pushed by the webhook. Never polls.

use std::sync::Arc;

use leadrelay_core::types::{ContactStatus, DeliveryReport, StatusEvent};
use leadrelay_core::StatusLedger;
use tracing::{debug, info, warn};

use crate::state::{CampaignState, DeliveryOutcome};

/// What a callback did, for callers that care.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackOutcome {
    Delivered,
    Failed,
    /// Duplicate or out-of-order callback for a lead no longer pending.
    Ignored,
    /// No lead in the current cycle carries this message id.
    Unknown,
    /// `sent`, `read`, or another status that does not move counters.
    Informational,
}

/// Reconciles delivery callbacks against the campaign state.
pub struct DeliveryTracker {
    state: Arc<CampaignState>,
    ledger: Arc<dyn StatusLedger + Send + Sync>,
}

impl DeliveryTracker {
    pub fn new(state: Arc<CampaignState>, ledger: Arc<dyn StatusLedger + Send + Sync>) -> Self {
        Self { state, ledger }
    }

    pub async fn on_status_callback(&self, event: &StatusEvent) -> TrackOutcome {
        let delivered = match &event.status {
            DeliveryReport::Delivered => true,
            DeliveryReport::Failed => false,
            other => {
                debug!(message_id = %event.message_id, status = %other, "status callback");
                return TrackOutcome::Informational;
            }
        };

        match self.state.apply_delivery(&event.message_id, delivered).await {
            DeliveryOutcome::Delivered(lead) => {
                let stats = self.state.stats();
                info!(
                    name = %lead.name,
                    phone = %lead.phone,
                    delivered = stats.delivered,
                    pending = stats.pending,
                    "message delivered"
                );
                if let Err(e) = self
                    .ledger
                    .update_status(&lead.phone, ContactStatus::Delivered)
                    .await
                {
                    warn!(phone = %lead.phone, error = %e, "failed to persist delivered status");
                }
                TrackOutcome::Delivered
            }
            DeliveryOutcome::Failed(lead) => {
                let stats = self.state.stats();
                warn!(
                    name = %lead.name,
                    phone = %lead.phone,
                    failed = stats.failed,
                    pending = stats.pending,
                    "message failed to deliver"
                );
                TrackOutcome::Failed
            }
            DeliveryOutcome::Stale(lead) => {
                debug!(
                    phone = %lead.phone,
                    message_id = %event.message_id,
                    status = %event.status,
                    current = %lead.delivery_status,
                    "ignoring callback for lead that already left pending"
                );
                TrackOutcome::Ignored
            }
            DeliveryOutcome::Unknown => {
                info!(
                    message_id = %event.message_id,
                    status = %event.status,
                    "status callback for unknown message id"
                );
                TrackOutcome::Unknown
            }
        }
    }
}
