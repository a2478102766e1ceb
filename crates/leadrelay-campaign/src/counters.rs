// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-cycle campaign counters.

use leadrelay_core::types::CampaignStats;
use tracing::warn;

/// Caps applied to one campaign cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CampaignCaps {
    pub max_initiated: u64,
    pub max_delivered: u64,
}

/// The four campaign counters. All transitions saturate at zero and keep
/// `delivered <= initiated`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CampaignCounters {
    initiated: u64,
    delivered: u64,
    pending: u64,
    failed: u64,
}

impl CampaignCounters {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn add_initiated(&mut self, count: u64) {
        self.initiated = self.initiated.saturating_add(count);
    }

    /// The channel accepted a send.
    pub fn record_sent(&mut self) {
        self.pending += 1;
    }

    /// The channel rejected a send outright.
    pub fn record_send_failed(&mut self) {
        self.failed += 1;
    }

    /// A pending message was confirmed delivered.
    pub fn record_delivered(&mut self) {
        self.delivered += 1;
        self.pending = self.pending.saturating_sub(1);
        self.clamp();
    }

    /// A pending message was reported failed by the channel.
    pub fn record_delivery_failed(&mut self) {
        self.pending = self.pending.saturating_sub(1);
        self.failed += 1;
    }

    /// Pulls `delivered` back to `initiated`. Returns whether a clamp happened.
    pub fn clamp(&mut self) -> bool {
        if self.delivered > self.initiated {
            warn!(
                delivered = self.delivered,
                initiated = self.initiated,
                "delivered count exceeds initiated, clamping"
            );
            self.delivered = self.initiated;
            return true;
        }
        false
    }

    pub fn snapshot(&self) -> CampaignStats {
        CampaignStats {
            initiated: self.initiated,
            delivered: self.delivered,
            pending: self.pending,
            failed: self.failed,
        }
    }
}

/// Size of the next batch, or zero when the cycle is done.
///
/// The cycle ends once delivered reaches its cap, initiated reaches its cap,
/// or every lead has been initiated.
pub fn plan_batch(stats: &CampaignStats, caps: &CampaignCaps, total_leads: usize) -> usize {
    let total = total_leads as u64;
    if stats.delivered >= caps.max_delivered
        || stats.initiated >= caps.max_initiated
        || stats.initiated >= total
    {
        return 0;
    }
    let size = (caps.max_initiated - stats.initiated)
        .min(caps.max_delivered - stats.delivered)
        .min(total - stats.initiated);
    usize::try_from(size).unwrap_or(usize::MAX)
}
