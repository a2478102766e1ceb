// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `leadrelay status` command implementation.
//!
//! Summarizes the status ledger on disk and, when a bearer token is
//! configured, fetches the live campaign counters from the gateway. Falls
//! back gracefully when the relay is not running.

use std::collections::BTreeMap;
use std::io::IsTerminal;
use std::time::Duration;

use leadrelay_campaign::JsonFileLedger;
use leadrelay_config::model::LeadRelayConfig;
use leadrelay_core::types::{CampaignStats, LedgerEntry};
use leadrelay_core::{LeadRelayError, StatusLedger};
use serde::Serialize;

/// Ledger totals by status.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct LedgerSummary {
    pub total: usize,
    pub contacted: usize,
    pub by_status: BTreeMap<String, usize>,
}

impl LedgerSummary {
    pub fn from_entries(entries: &BTreeMap<String, LedgerEntry>) -> Self {
        let mut summary = Self {
            total: entries.len(),
            ..Self::default()
        };
        for entry in entries.values() {
            if entry.contacted {
                summary.contacted += 1;
            }
            *summary.by_status.entry(entry.status.to_string()).or_default() += 1;
        }
        summary
    }
}

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub ledger_path: String,
    pub ledger: LedgerSummary,
    pub running: bool,
    pub campaign: Option<CampaignStats>,
}

/// Run the `leadrelay status` command.
pub async fn run_status(
    config: &LeadRelayConfig,
    json: bool,
    plain: bool,
) -> Result<(), LeadRelayError> {
    let ledger = JsonFileLedger::open(&config.leads.status_path).await;
    let summary = LedgerSummary::from_entries(&ledger.load().await);
    let (running, campaign) = fetch_live_stats(config).await;

    let response = StatusResponse {
        ledger_path: config.leads.status_path.clone(),
        ledger: summary,
        running,
        campaign,
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&response).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        print_status(&response, config, use_color);
    }
    Ok(())
}

/// Checks `/health`, then `/v1/stats` if a bearer token is configured.
async fn fetch_live_stats(config: &LeadRelayConfig) -> (bool, Option<CampaignStats>) {
    let host = match config.gateway.host.as_str() {
        "0.0.0.0" => "127.0.0.1",
        other => other,
    };
    let base = format!("http://{host}:{}", config.gateway.port);

    let Ok(client) = reqwest::Client::builder()
        .timeout(Duration::from_secs(3))
        .build()
    else {
        return (false, None);
    };

    let running = matches!(
        client.get(format!("{base}/health")).send().await,
        Ok(resp) if resp.status().is_success()
    );
    if !running {
        return (false, None);
    }

    let Some(token) = config.gateway.bearer_token.as_deref() else {
        return (true, None);
    };
    let stats = match client
        .get(format!("{base}/v1/stats"))
        .bearer_auth(token)
        .send()
        .await
    {
        Ok(resp) if resp.status().is_success() => resp.json::<CampaignStats>().await.ok(),
        _ => None,
    };
    (true, stats)
}

fn print_status(response: &StatusResponse, config: &LeadRelayConfig, use_color: bool) {
    println!();
    println!("  leadrelay status");
    println!("  {}", "-".repeat(35));

    if use_color {
        use colored::Colorize;
        if response.running {
            println!("    State:     {} {}", "✓".green(), "running".green());
        } else {
            println!("    State:     {} {}", "✗".red(), "not running".red());
        }
    } else if response.running {
        println!("    State:     [OK] running");
    } else {
        println!("    State:     [FAIL] not running");
    }
    if !response.running {
        println!(
            "    Endpoint:  http://{}:{}/health",
            config.gateway.host, config.gateway.port
        );
    }

    if let Some(stats) = &response.campaign {
        println!(
            "    Campaign:  {} initiated, {} delivered, {} pending, {} failed",
            stats.initiated, stats.delivered, stats.pending, stats.failed
        );
    }

    println!(
        "    Ledger:    {} ({} phones, {} contacted)",
        response.ledger_path, response.ledger.total, response.ledger.contacted
    );
    for (status, count) in &response.ledger.by_status {
        println!("      {status:<10} {count}");
    }
    println!();
}
