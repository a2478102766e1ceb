// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Status ledger trait: the persisted phone -> contact status record.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::LeadRelayError;
use crate::types::{ContactStatus, LedgerEntry, MarkOutcome};

/// Persistent record of which phones were contacted.
///
/// Implementations must never regress `contacted` from `true` to `false`.
#[async_trait]
pub trait StatusLedger: Send + Sync {
    /// Reads the full mapping; this never fails. Missing or empty storage
    /// yields an empty map. Unreadable storage yields the last mapping known
    /// in memory, so phones marked contacted are never dropped.
    async fn load(&self) -> BTreeMap<String, LedgerEntry>;

    /// Whether `phone` is already marked contacted.
    async fn is_contacted(&self, phone: &str) -> bool;

    /// Marks `phone` contacted with `status`. A no-op for phones that are
    /// already contacted.
    async fn mark_contacted(
        &self,
        phone: &str,
        status: ContactStatus,
    ) -> Result<MarkOutcome, LeadRelayError>;

    /// Advances the status of a contacted phone, keeping the first-contact
    /// timestamp. Unknown phones are recorded as contacted.
    async fn update_status(&self, phone: &str, status: ContactStatus)
    -> Result<(), LeadRelayError>;
}
