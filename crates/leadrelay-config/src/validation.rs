// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Covers constraints serde cannot express: non-zero caps, usable paths,
//! a parseable delimiter, and a bindable host.

use crate::diagnostic::ConfigError;
use crate::model::LeadRelayConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &LeadRelayConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        fail(format!(
            "agent.log_level `{}` must be one of {}",
            config.agent.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    if config.leads.csv_path.trim().is_empty() {
        fail("leads.csv_path must not be empty".to_string());
    }
    if config.leads.status_path.trim().is_empty() {
        fail("leads.status_path must not be empty".to_string());
    }

    let delimiter = config.leads.delimiter.as_str();
    if delimiter != "auto" && !(delimiter.len() == 1 && delimiter.is_ascii()) {
        fail(format!(
            "leads.delimiter `{delimiter}` must be a single ASCII character or `auto`"
        ));
    }

    let country = &config.leads.default_country_code;
    if !country.chars().all(|c| c.is_ascii_digit()) || country.starts_with('0') {
        fail(format!(
            "leads.default_country_code `{country}` must be digits without a leading zero"
        ));
    }

    if config.campaign.max_initiated == 0 {
        fail("campaign.max_initiated must be at least 1".to_string());
    }
    if config.campaign.max_delivered == 0 {
        fail("campaign.max_delivered must be at least 1".to_string());
    }
    if config.campaign.cycle_interval_secs == 0 {
        fail("campaign.cycle_interval_secs must be at least 1".to_string());
    }
    if config.campaign.template_name.trim().is_empty() {
        fail("campaign.template_name must not be empty".to_string());
    }

    if config.openai.max_tokens == 0 {
        fail("openai.max_tokens must be at least 1".to_string());
    }

    for (key, url) in [
        ("whatsapp.api_base_url", &config.whatsapp.api_base_url),
        ("openai.api_base_url", &config.openai.api_base_url),
        ("trello.api_base_url", &config.trello.api_base_url),
    ] {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            fail(format!("{key} `{url}` must start with http:// or https://"));
        }
    }

    let host = config.gateway.host.trim();
    if host.is_empty() {
        fail("gateway.host must not be empty".to_string());
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-');
        if !is_valid_ip && !is_valid_hostname {
            fail(format!(
                "gateway.host `{host}` is not a valid IP address or hostname"
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
