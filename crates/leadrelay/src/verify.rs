// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `leadrelay verify` command implementation.
//!
//! Builds each remote adapter from config and runs its health check:
//! WhatsApp looks up the sending phone number, OpenAI lists models, and
//! Trello lists the token's boards.

use leadrelay_config::model::LeadRelayConfig;
use leadrelay_core::types::HealthStatus;
use leadrelay_core::{LeadRelayError, PluginAdapter};
use leadrelay_openai::OpenAiGenerator;
use leadrelay_trello::TrelloBoard;
use leadrelay_whatsapp::WhatsAppChannel;
use tracing::{info, warn};

/// Outcome of one adapter check.
#[derive(Debug)]
pub struct CheckResult {
    pub adapter: String,
    pub status: HealthStatus,
}

impl CheckResult {
    pub fn is_healthy(&self) -> bool {
        matches!(self.status, HealthStatus::Healthy)
    }
}

/// Runs the health check of `adapter`, folding errors into `Unhealthy`.
pub async fn check_adapter(adapter: &dyn PluginAdapter) -> CheckResult {
    let status = match adapter.health_check().await {
        Ok(status) => status,
        Err(e) => HealthStatus::Unhealthy(e.to_string()),
    };
    match &status {
        HealthStatus::Healthy => info!(adapter = adapter.name(), "adapter healthy"),
        HealthStatus::Degraded(reason) | HealthStatus::Unhealthy(reason) => {
            warn!(adapter = adapter.name(), reason = %reason, "adapter check failed")
        }
    }
    CheckResult {
        adapter: adapter.name().to_string(),
        status,
    }
}

fn unavailable(adapter: &str, error: &LeadRelayError) -> CheckResult {
    CheckResult {
        adapter: adapter.to_string(),
        status: HealthStatus::Unhealthy(error.to_string()),
    }
}

/// Checks every configured adapter. Trello is skipped when not configured.
pub async fn check_all(config: &LeadRelayConfig) -> Vec<CheckResult> {
    let mut results = Vec::new();

    results.push(match WhatsAppChannel::new(&config.whatsapp) {
        Ok(channel) => check_adapter(&channel).await,
        Err(e) => unavailable("whatsapp", &e),
    });
    results.push(match OpenAiGenerator::new(&config.openai) {
        Ok(generator) => check_adapter(&generator).await,
        Err(e) => unavailable("openai", &e),
    });
    match TrelloBoard::from_config(&config.trello) {
        Ok(Some(board)) => results.push(check_adapter(&board).await),
        Ok(None) => {}
        Err(e) => results.push(unavailable("trello", &e)),
    }
    results
}

/// Run the `leadrelay verify` command.
pub async fn run_verify(config: &LeadRelayConfig) -> Result<(), LeadRelayError> {
    let results = check_all(config).await;

    println!();
    println!("  leadrelay verify");
    println!("  {}", "-".repeat(35));
    for result in &results {
        println!("    {:<10} {}", result.adapter, describe(&result.status));
    }
    if results.iter().all(|r| r.adapter != "trello") {
        println!("    {:<10} [SKIP] board sync not configured", "trello");
    }
    println!();

    let failed = results.iter().filter(|r| !r.is_healthy()).count();
    if failed > 0 {
        return Err(LeadRelayError::Config(format!(
            "{failed} adapter check(s) failed"
        )));
    }
    Ok(())
}

fn describe(status: &HealthStatus) -> String {
    match status {
        HealthStatus::Healthy => "[OK]".to_string(),
        HealthStatus::Degraded(reason) => format!("[WARN] {reason}"),
        HealthStatus::Unhealthy(reason) => format!("[FAIL] {reason}"),
    }
}
