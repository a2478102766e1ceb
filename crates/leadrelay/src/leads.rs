// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `leadrelay leads` command implementation.
//!
//! Imports the lead file against the status ledger exactly as a campaign
//! cycle would and prints the resulting working set.

use leadrelay_campaign::{load_leads, JsonFileLedger, LeadImport, LeadSource};
use leadrelay_config::model::LeadRelayConfig;
use leadrelay_core::LeadRelayError;
use serde::Serialize;

/// Structured output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct LeadsReport<'a> {
    pub source: String,
    pub uncontacted: &'a [leadrelay_core::types::Lead],
    pub skipped_contacted: usize,
    pub skipped_malformed: usize,
    pub skipped_duplicate: usize,
}

impl<'a> LeadsReport<'a> {
    fn new(source: &LeadSource, import: &'a LeadImport) -> Self {
        Self {
            source: source.path.display().to_string(),
            uncontacted: &import.leads,
            skipped_contacted: import.skipped_contacted,
            skipped_malformed: import.skipped_malformed,
            skipped_duplicate: import.skipped_duplicate,
        }
    }
}

/// Run the `leadrelay leads` command.
pub async fn run_leads(config: &LeadRelayConfig, json: bool) -> Result<(), LeadRelayError> {
    let source = LeadSource::from_config(&config.leads)?;
    let ledger = JsonFileLedger::open(&config.leads.status_path).await;
    let import = load_leads(&source, &ledger).await?;
    let report = LeadsReport::new(&source, &import);

    if json {
        let rendered = serde_json::to_string_pretty(&report)
            .map_err(|e| LeadRelayError::Internal(format!("failed to render leads: {e}")))?;
        println!("{rendered}");
        return Ok(());
    }

    println!();
    println!("  leadrelay leads ({})", report.source);
    println!("  {}", "-".repeat(35));
    for lead in report.uncontacted {
        println!("    {:<16} {}", lead.phone, lead.name);
    }
    println!("  {}", "-".repeat(35));
    println!(
        "    {} uncontacted, {} already contacted, {} malformed, {} duplicate",
        report.uncontacted.len(),
        report.skipped_contacted,
        report.skipped_malformed,
        report.skipped_duplicate
    );
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadrelay_core::types::Lead;

    #[test]
    fn report_serializes_counts() {
        let import = LeadImport {
            leads: vec![Lead::new("Anna", "491701234567")],
            known: vec![],
            skipped_contacted: 2,
            skipped_malformed: 1,
            skipped_duplicate: 0,
        };
        let source = LeadSource {
            path: "leads.csv".into(),
            delimiter: leadrelay_campaign::Delimiter::Fixed(b';'),
            country_code: "49".into(),
        };
        let json = serde_json::to_value(LeadsReport::new(&source, &import)).unwrap();
        assert_eq!(json["uncontacted"][0]["phone"], "491701234567");
        assert_eq!(json["skipped_contacted"], 2);
        assert_eq!(json["source"], "leads.csv");
    }
}
