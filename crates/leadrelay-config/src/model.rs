// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for leadrelay.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level leadrelay configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LeadRelayConfig {
    /// Process identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Lead source file and status ledger locations.
    #[serde(default)]
    pub leads: LeadsConfig,

    /// Outbound campaign caps, pacing, and template.
    #[serde(default)]
    pub campaign: CampaignConfig,

    /// WhatsApp Cloud API settings.
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,

    /// OpenAI chat completion settings.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Trello board mirroring settings.
    #[serde(default)]
    pub trello: TrelloConfig,

    /// Webhook HTTP server settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Process identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name used in logs.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "leadrelay".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Lead import and status ledger configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LeadsConfig {
    /// Path to the `name;phone` lead source file.
    #[serde(default = "default_csv_path")]
    pub csv_path: String,

    /// Field delimiter: a single character, or `auto` to detect from the first line.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Path to the JSON status ledger document.
    #[serde(default = "default_status_path")]
    pub status_path: String,

    /// Country calling code prefixed to numbers that lack it. Empty disables prefixing.
    #[serde(default = "default_country_code")]
    pub default_country_code: String,
}

impl Default for LeadsConfig {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
            delimiter: default_delimiter(),
            status_path: default_status_path(),
            default_country_code: default_country_code(),
        }
    }
}

fn default_csv_path() -> String {
    "leads.csv".to_string()
}

fn default_delimiter() -> String {
    ";".to_string()
}

fn default_status_path() -> String {
    "lead_status.json".to_string()
}

fn default_country_code() -> String {
    "49".to_string()
}

/// Outbound campaign configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CampaignConfig {
    /// Maximum conversations initiated per cycle.
    #[serde(default = "default_max_conversations")]
    pub max_initiated: u64,

    /// Maximum confirmed deliveries per cycle.
    #[serde(default = "default_max_conversations")]
    pub max_delivered: u64,

    /// Pause between batches, in milliseconds.
    #[serde(default = "default_batch_interval_ms")]
    pub batch_interval_ms: u64,

    /// Upper bound on the wait for trailing delivery callbacks after the last batch.
    #[serde(default = "default_settle_timeout_secs")]
    pub settle_timeout_secs: u64,

    /// Time between campaign cycles.
    #[serde(default = "default_cycle_interval_secs")]
    pub cycle_interval_secs: u64,

    /// Run a cycle immediately when the server starts.
    #[serde(default = "default_true")]
    pub run_on_start: bool,

    /// Name of the opener template.
    #[serde(default = "default_template_name")]
    pub template_name: String,

    /// Language code of the opener template.
    #[serde(default = "default_template_language")]
    pub template_language: String,

    /// Image shown in the template header, if the template has one.
    #[serde(default)]
    pub header_image_url: Option<String>,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            max_initiated: default_max_conversations(),
            max_delivered: default_max_conversations(),
            batch_interval_ms: default_batch_interval_ms(),
            settle_timeout_secs: default_settle_timeout_secs(),
            cycle_interval_secs: default_cycle_interval_secs(),
            run_on_start: default_true(),
            template_name: default_template_name(),
            template_language: default_template_language(),
            header_image_url: None,
        }
    }
}

impl CampaignConfig {
    pub fn batch_interval(&self) -> Duration {
        Duration::from_millis(self.batch_interval_ms)
    }

    pub fn settle_timeout(&self) -> Duration {
        Duration::from_secs(self.settle_timeout_secs)
    }

    pub fn cycle_interval(&self) -> Duration {
        Duration::from_secs(self.cycle_interval_secs)
    }
}

fn default_max_conversations() -> u64 {
    950
}

fn default_batch_interval_ms() -> u64 {
    1000
}

fn default_settle_timeout_secs() -> u64 {
    10
}

fn default_cycle_interval_secs() -> u64 {
    24 * 60 * 60
}

fn default_true() -> bool {
    true
}

fn default_template_name() -> String {
    "opener2".to_string()
}

fn default_template_language() -> String {
    "en".to_string()
}

/// WhatsApp Cloud API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WhatsAppConfig {
    /// Bearer access token. Falls back to `WHATSAPP_TOKEN`.
    #[serde(default)]
    pub access_token: Option<String>,

    /// Sending phone number id. Falls back to `WHATSAPP_PHONE_NUMBER_ID`.
    #[serde(default)]
    pub phone_number_id: Option<String>,

    /// Shared token for the webhook handshake. Falls back to `WHATSAPP_VERIFY_TOKEN`.
    #[serde(default)]
    pub verify_token: Option<String>,

    /// App secret for `X-Hub-Signature-256` checks. `None` disables the check.
    #[serde(default)]
    pub app_secret: Option<String>,

    /// Graph API version segment.
    #[serde(default = "default_graph_version")]
    pub api_version: String,

    /// Graph API base URL.
    #[serde(default = "default_graph_base_url")]
    pub api_base_url: String,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            phone_number_id: None,
            verify_token: None,
            app_secret: None,
            api_version: default_graph_version(),
            api_base_url: default_graph_base_url(),
        }
    }
}

fn default_graph_version() -> String {
    "v20.0".to_string()
}

fn default_graph_base_url() -> String {
    "https://graph.facebook.com".to_string()
}

/// OpenAI chat completion configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    /// API key. Falls back to `OPENAI_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model used for replies.
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum tokens per reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Inline persona preamble. Overridden by `system_prompt_file` if both set.
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Path to a file holding the persona preamble.
    #[serde(default)]
    pub system_prompt_file: Option<String>,

    /// API base URL.
    #[serde(default = "default_openai_base_url")]
    pub api_base_url: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            system_prompt: None,
            system_prompt_file: None,
            api_base_url: default_openai_base_url(),
        }
    }
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_max_tokens() -> u32 {
    150
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

/// Trello board configuration. Board sync runs only when every field is set.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TrelloConfig {
    /// Falls back to `TRELLO_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Falls back to `TRELLO_TOKEN`.
    #[serde(default)]
    pub token: Option<String>,

    /// Falls back to `TRELLO_BOARD_ID`.
    #[serde(default)]
    pub board_id: Option<String>,

    /// List receiving new conversations. Falls back to `TRELLO_INCOMING_LIST_ID`.
    #[serde(default)]
    pub incoming_list_id: Option<String>,

    /// List receiving interested leads. Falls back to `TRELLO_LEADS_LIST_ID`.
    #[serde(default)]
    pub leads_list_id: Option<String>,

    /// REST API base URL.
    #[serde(default = "default_trello_base_url")]
    pub api_base_url: String,
}

impl Default for TrelloConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            token: None,
            board_id: None,
            incoming_list_id: None,
            leads_list_id: None,
            api_base_url: default_trello_base_url(),
        }
    }
}

fn default_trello_base_url() -> String {
    "https://api.trello.com/1".to_string()
}

/// Webhook HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_gateway_host")]
    pub host: String,

    /// Port to bind. Falls back to `PORT`.
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bearer token guarding `/v1/stats`. `None` rejects all stats requests.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
            bearer_token: None,
        }
    }
}

fn default_gateway_host() -> String {
    "0.0.0.0".to_string()
}

fn default_gateway_port() -> u16 {
    3000
}

/// Resolves a secret from config, falling back to a legacy environment variable.
///
/// Empty strings count as unset.
pub fn resolve_secret(configured: &Option<String>, legacy_env: &str) -> Option<String> {
    if let Some(value) = configured
        && !value.trim().is_empty()
    {
        return Some(value.clone());
    }
    std::env::var(legacy_env)
        .ok()
        .filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn campaign_durations() {
        let campaign = CampaignConfig::default();
        assert_eq!(campaign.batch_interval(), Duration::from_secs(1));
        assert_eq!(campaign.settle_timeout(), Duration::from_secs(10));
        assert_eq!(campaign.cycle_interval(), Duration::from_secs(86_400));
    }

    #[test]
    fn resolve_secret_prefers_config() {
        let configured = Some("from-config".to_string());
        assert_eq!(
            resolve_secret(&configured, "LEADRELAY_TEST_UNSET_SECRET").as_deref(),
            Some("from-config")
        );
    }

    #[test]
    fn resolve_secret_treats_blank_as_unset() {
        let configured = Some("   ".to_string());
        assert!(resolve_secret(&configured, "LEADRELAY_TEST_UNSET_SECRET").is_none());
    }
}
