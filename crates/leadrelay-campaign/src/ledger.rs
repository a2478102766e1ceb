// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON document implementation of the status ledger.
//!
//! The ledger owns a keyed in-memory map behind a single async mutex. Every
//! mutation upserts one key and rewrites the whole document through a
//! temporary file and an atomic rename, while still holding the lock, so
//! concurrent writers cannot lose each other's updates.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use leadrelay_core::types::{ContactStatus, LedgerEntry, MarkOutcome};
use leadrelay_core::{LeadRelayError, StatusLedger};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Status ledger persisted as a single JSON object mapping phone to entry.
pub struct JsonFileLedger {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, LedgerEntry>>,
}

impl JsonFileLedger {
    /// Opens the ledger at `path`, creating an empty document if none exists.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = read_document(&path).await.unwrap_or_default();
        info!(path = %path.display(), entries = entries.len(), "status ledger opened");
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns a copy of the in-memory map without touching disk.
    pub async fn snapshot(&self) -> BTreeMap<String, LedgerEntry> {
        self.entries.lock().await.clone()
    }

    async fn persist(&self, entries: &BTreeMap<String, LedgerEntry>) -> Result<(), LeadRelayError> {
        let document = serde_json::to_string_pretty(entries)
            .map_err(|e| LeadRelayError::Storage { source: e.into() })?;
        write_atomic(self.path.clone(), document).await
    }
}

/// Reads the document from disk.
///
/// Returns `None` when the document exists but cannot be parsed. A missing
/// file is created as `{}` and yields an empty map.
async fn read_document(path: &Path) -> Option<BTreeMap<String, LedgerEntry>> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) if content.trim().is_empty() => Some(BTreeMap::new()),
        Ok(content) => match serde_json::from_str(&content) {
            Ok(entries) => Some(entries),
            Err(e) => {
                error!(path = %path.display(), error = %e, "status document is not valid JSON, treating as empty");
                None
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "status document not found, creating an empty one");
            if let Err(e) = write_atomic(path.to_path_buf(), "{}".to_string()).await {
                warn!(path = %path.display(), error = %e, "failed to create status document");
            }
            Some(BTreeMap::new())
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "failed to read status document, treating as empty");
            None
        }
    }
}

/// Folds the on-disk document into the in-memory map.
///
/// Entries only known in memory (their write failed, or the file was
/// replaced) are kept, and a contacted entry is never overwritten by an
/// uncontacted one.
fn merge_from_disk(
    entries: &mut BTreeMap<String, LedgerEntry>,
    on_disk: BTreeMap<String, LedgerEntry>,
) {
    for (phone, entry) in on_disk {
        match entries.entry(phone) {
            Entry::Vacant(slot) => {
                slot.insert(entry);
            }
            Entry::Occupied(mut slot) => {
                if entry.contacted || !slot.get().contacted {
                    slot.insert(entry);
                }
            }
        }
    }
}

/// Writes `content` to a sibling temp file and renames it over `path`.
async fn write_atomic(path: PathBuf, content: String) -> Result<(), LeadRelayError> {
    tokio::task::spawn_blocking(move || -> std::io::Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| e.error)?;
        Ok(())
    })
    .await
    .map_err(|e| LeadRelayError::Internal(format!("ledger write task failed: {e}")))?
    .map_err(|e| LeadRelayError::Storage { source: e.into() })
}

#[async_trait]
impl StatusLedger for JsonFileLedger {
    async fn load(&self) -> BTreeMap<String, LedgerEntry> {
        let mut entries = self.entries.lock().await;
        // An unreadable document is rewritten on the next mutation.
        if let Some(on_disk) = read_document(&self.path).await {
            merge_from_disk(&mut entries, on_disk);
        }
        entries.clone()
    }

    async fn is_contacted(&self, phone: &str) -> bool {
        self.entries
            .lock()
            .await
            .get(phone)
            .is_some_and(|entry| entry.contacted)
    }

    async fn mark_contacted(
        &self,
        phone: &str,
        status: ContactStatus,
    ) -> Result<MarkOutcome, LeadRelayError> {
        let mut entries = self.entries.lock().await;
        if entries.get(phone).is_some_and(|entry| entry.contacted) {
            debug!(phone = %phone, status = %status, "phone already contacted, not marking again");
            return Ok(MarkOutcome::AlreadyContacted);
        }

        entries.insert(phone.to_string(), LedgerEntry::contacted_now(status));
        self.persist(&entries).await?;
        debug!(phone = %phone, status = %status, "marked phone as contacted");
        Ok(MarkOutcome::Recorded)
    }

    async fn update_status(
        &self,
        phone: &str,
        status: ContactStatus,
    ) -> Result<(), LeadRelayError> {
        let mut entries = self.entries.lock().await;
        let entry = entries
            .entry(phone.to_string())
            .or_insert_with(|| LedgerEntry::contacted_now(status));
        entry.contacted = true;
        entry.status = status;
        if entry.timestamp.is_none() {
            entry.timestamp = Some(Utc::now());
        }
        self.persist(&entries).await?;
        debug!(phone = %phone, status = %status, "updated contact status");
        Ok(())
    }
}
