// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Campaign state coordinator.
//!
//! Owns the working lead list, the message-id index, and the counters for
//! the current cycle. All mutation goes through methods that take the inner
//! lock, and every counter change is published on a `watch` channel. The
//! same channel lets the driver wait for pending deliveries to drain.

use std::collections::HashMap;
use std::time::Duration;

use leadrelay_core::types::{CampaignStats, DeliveryStatus, Lead, MessageId};
use tokio::sync::{watch, Mutex};
use tracing::debug;

use crate::counters::{plan_batch, CampaignCaps, CampaignCounters};

/// What a delivery callback did to the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// A pending lead moved to delivered.
    Delivered(Lead),
    /// A pending lead moved to failed.
    Failed(Lead),
    /// The lead had already left pending; the callback was a duplicate or out of order.
    Stale(Lead),
    /// No lead carries this message id.
    Unknown,
}

#[derive(Default)]
struct Inner {
    leads: Vec<Lead>,
    by_message_id: HashMap<MessageId, usize>,
    counters: CampaignCounters,
}

impl Inner {
    fn stats(&self) -> CampaignStats {
        self.counters.snapshot()
    }
}

/// Shared state for one running campaign, replaced wholesale each cycle.
pub struct CampaignState {
    inner: Mutex<Inner>,
    stats_tx: watch::Sender<CampaignStats>,
}

impl Default for CampaignState {
    fn default() -> Self {
        Self::new()
    }
}

impl CampaignState {
    pub fn new() -> Self {
        let (stats_tx, _) = watch::channel(CampaignStats::default());
        Self {
            inner: Mutex::new(Inner::default()),
            stats_tx,
        }
    }

    fn publish(&self, inner: &Inner) {
        self.stats_tx.send_replace(inner.stats());
    }

    /// Installs a new working set and zeroes the counters.
    pub async fn begin_cycle(&self, leads: Vec<Lead>) {
        let mut inner = self.inner.lock().await;
        inner.leads = leads;
        inner.by_message_id.clear();
        inner.counters.reset();
        debug!(leads = inner.leads.len(), "campaign cycle state reset");
        self.publish(&inner);
    }

    pub async fn lead_count(&self) -> usize {
        self.inner.lock().await.leads.len()
    }

    pub async fn leads(&self) -> Vec<Lead> {
        self.inner.lock().await.leads.clone()
    }

    /// Latest published counters.
    pub fn stats(&self) -> CampaignStats {
        *self.stats_tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<CampaignStats> {
        self.stats_tx.subscribe()
    }

    /// Size of the next batch without claiming it.
    pub async fn peek_batch_size(&self, caps: &CampaignCaps) -> usize {
        let inner = self.inner.lock().await;
        plan_batch(&inner.stats(), caps, inner.leads.len())
    }

    /// Claims the next batch and advances `initiated` by its size.
    ///
    /// Returns `(index, lead)` pairs in file order. Empty when the cycle is done.
    pub async fn claim_batch(&self, caps: &CampaignCaps) -> Vec<(usize, Lead)> {
        let mut inner = self.inner.lock().await;
        let start = usize::try_from(inner.counters.snapshot().initiated).unwrap_or(usize::MAX);
        let size = plan_batch(&inner.stats(), caps, inner.leads.len());
        if size == 0 {
            return Vec::new();
        }

        let batch: Vec<(usize, Lead)> = inner.leads[start..start + size]
            .iter()
            .cloned()
            .enumerate()
            .map(|(offset, lead)| (start + offset, lead))
            .collect();
        inner.counters.add_initiated(size as u64);
        self.publish(&inner);
        batch
    }

    /// Records the message id of an accepted send and marks the lead pending.
    pub async fn record_sent(&self, index: usize, message_id: MessageId) {
        let mut inner = self.inner.lock().await;
        let Some(lead) = inner.leads.get_mut(index) else {
            return;
        };
        lead.message_id = Some(message_id.clone());
        lead.delivery_status = DeliveryStatus::Pending;
        inner.by_message_id.insert(message_id, index);
        inner.counters.record_sent();
        self.publish(&inner);
    }

    /// Marks a lead whose send was rejected.
    pub async fn record_send_failed(&self, index: usize) {
        let mut inner = self.inner.lock().await;
        let Some(lead) = inner.leads.get_mut(index) else {
            return;
        };
        lead.delivery_status = DeliveryStatus::Failed;
        inner.counters.record_send_failed();
        self.publish(&inner);
    }

    /// Applies a delivered or failed callback.
    ///
    /// Only a lead currently pending transitions; anything else is reported
    /// back without touching the counters.
    pub async fn apply_delivery(&self, message_id: &MessageId, delivered: bool) -> DeliveryOutcome {
        let mut inner = self.inner.lock().await;
        let Some(&index) = inner.by_message_id.get(message_id) else {
            return DeliveryOutcome::Unknown;
        };
        let Some(lead) = inner.leads.get_mut(index) else {
            return DeliveryOutcome::Unknown;
        };
        if lead.delivery_status != DeliveryStatus::Pending {
            return DeliveryOutcome::Stale(lead.clone());
        }

        if delivered {
            lead.delivery_status = DeliveryStatus::Delivered;
            let lead = lead.clone();
            inner.counters.record_delivered();
            self.publish(&inner);
            DeliveryOutcome::Delivered(lead)
        } else {
            lead.delivery_status = DeliveryStatus::Failed;
            let lead = lead.clone();
            inner.counters.record_delivery_failed();
            self.publish(&inner);
            DeliveryOutcome::Failed(lead)
        }
    }

    /// Waits until no sends are pending, up to `timeout`.
    ///
    /// Returns `true` if pending reached zero in time.
    pub async fn wait_for_settle(&self, timeout: Duration) -> bool {
        let mut rx = self.subscribe();
        tokio::time::timeout(timeout, rx.wait_for(|stats| stats.pending == 0))
            .await
            .is_ok_and(|res| res.is_ok())
    }
}
