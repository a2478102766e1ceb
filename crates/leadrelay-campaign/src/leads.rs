// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lead import from the delimited source file.
//!
//! Rows are `name;phone` with no header. Phones are normalized before they
//! are compared against the status ledger, so a number stored as
//! `+49 170 ...` in the file matches `49170...` in the ledger.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use dashmap::DashMap;
use leadrelay_config::model::LeadsConfig;
use leadrelay_core::types::Lead;
use leadrelay_core::{normalize_phone, LeadRelayError, StatusLedger};
use tracing::{debug, info, warn};

/// Name used for inbound senders that are not in the lead file.
pub const UNKNOWN_SENDER_NAME: &str = "WhatsApp User";

/// Field separator for the lead source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Fixed(u8),
    /// Picked from the first line of the file.
    Auto,
}

impl Delimiter {
    pub fn parse(value: &str) -> Result<Self, LeadRelayError> {
        match value.as_bytes() {
            b"auto" => Ok(Self::Auto),
            [byte] if byte.is_ascii() => Ok(Self::Fixed(*byte)),
            _ => Err(LeadRelayError::Config(format!(
                "lead delimiter `{value}` must be one ASCII character or `auto`"
            ))),
        }
    }

    fn resolve(self, content: &str) -> u8 {
        match self {
            Self::Fixed(byte) => byte,
            Self::Auto => detect_delimiter(content.lines().next().unwrap_or_default()),
        }
    }
}

/// Guesses the separator from a header or first data line.
///
/// Semicolon wins over comma, comma over tab; comma is the fallback.
pub fn detect_delimiter(first_line: &str) -> u8 {
    [b';', b',', b'\t']
        .into_iter()
        .find(|candidate| first_line.as_bytes().contains(candidate))
        .unwrap_or(b',')
}

/// Where and how to read leads.
#[derive(Debug, Clone)]
pub struct LeadSource {
    pub path: PathBuf,
    pub delimiter: Delimiter,
    pub country_code: String,
}

impl LeadSource {
    pub fn from_config(config: &LeadsConfig) -> Result<Self, LeadRelayError> {
        Ok(Self {
            path: PathBuf::from(&config.csv_path),
            delimiter: Delimiter::parse(&config.delimiter)?,
            country_code: config.default_country_code.clone(),
        })
    }
}

/// Result of one import pass.
#[derive(Debug, Clone, Default)]
pub struct LeadImport {
    /// Uncontacted leads in file order.
    pub leads: Vec<Lead>,
    /// Every valid row, contacted or not, as `(phone, name)`.
    pub known: Vec<(String, String)>,
    pub skipped_contacted: usize,
    pub skipped_malformed: usize,
    pub skipped_duplicate: usize,
}

/// Loads the uncontacted working set from `source`.
///
/// Fails only when the file cannot be read. Malformed rows are logged and
/// skipped, as are phones the ledger already marks contacted and phones that
/// repeat an earlier row.
pub async fn load_leads(
    source: &LeadSource,
    ledger: &dyn StatusLedger,
) -> Result<LeadImport, LeadRelayError> {
    let content = read_source(&source.path).await?;
    let delimiter = source.delimiter.resolve(&content);
    let contacted = ledger.load().await;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut import = LeadImport::default();
    let mut seen = HashSet::new();

    for (row, record) in reader.records().enumerate() {
        let line = row + 1;
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                warn!(line, error = %e, "skipping unreadable lead row");
                import.skipped_malformed += 1;
                continue;
            }
        };

        let name = record.get(0).unwrap_or_default();
        let raw_phone = record.get(1).unwrap_or_default();
        if name.is_empty() || raw_phone.is_empty() {
            warn!(line, name, phone = raw_phone, "skipping lead row missing name or phone");
            import.skipped_malformed += 1;
            continue;
        }

        let phone = normalize_phone(raw_phone, &source.country_code);
        if phone.is_empty() {
            warn!(line, name, phone = raw_phone, "skipping lead with invalid phone number");
            import.skipped_malformed += 1;
            continue;
        }

        if !seen.insert(phone.clone()) {
            debug!(line, phone = %phone, "skipping duplicate lead row");
            import.skipped_duplicate += 1;
            continue;
        }
        import.known.push((phone.clone(), name.to_string()));

        if contacted.get(&phone).is_some_and(|entry| entry.contacted) {
            debug!(name, phone = %phone, "skipping previously contacted lead");
            import.skipped_contacted += 1;
            continue;
        }

        import.leads.push(Lead::new(name, phone));
    }

    info!(
        path = %source.path.display(),
        leads = import.leads.len(),
        contacted = import.skipped_contacted,
        malformed = import.skipped_malformed,
        duplicate = import.skipped_duplicate,
        "leads loaded"
    );
    Ok(import)
}

async fn read_source(path: &Path) -> Result<String, LeadRelayError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LeadRelayError::FileAccess {
            path: path.to_path_buf(),
            source,
        })
}

/// Phone to display-name lookup for inbound senders.
#[derive(Debug, Default)]
pub struct LeadDirectory {
    names: DashMap<String, String>,
}

impl LeadDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend<I>(&self, entries: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (phone, name) in entries {
            self.names.insert(phone, name);
        }
    }

    /// Name for `phone`, or [`UNKNOWN_SENDER_NAME`].
    pub fn name_for(&self, phone: &str) -> String {
        self.names
            .get(phone)
            .map(|name| name.value().clone())
            .unwrap_or_else(|| UNKNOWN_SENDER_NAME.to_string())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
