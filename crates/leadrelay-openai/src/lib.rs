// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI response generator for leadrelay.
//!
//! This crate implements [`ResponseGenerator`] on top of the chat completions
//! API: the persona preamble goes first as a system message, followed by the
//! conversation turns oldest first.

pub mod client;
pub mod types;

use async_trait::async_trait;
use leadrelay_config::model::OpenAiConfig;
use leadrelay_config::resolve_secret;
use leadrelay_core::traits::{PluginAdapter, ResponseGenerator};
use leadrelay_core::types::{AdapterType, HealthStatus, Turn};
use leadrelay_core::LeadRelayError;
use tracing::{debug, info, warn};

use crate::client::OpenAiClient;
use crate::types::{ChatMessage, ChatRequest};

/// Legacy environment variable consulted when `openai.api_key` is unset.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Response generator backed by OpenAI chat completions.
///
/// API key resolution order: config -> `OPENAI_API_KEY` env var -> error.
pub struct OpenAiGenerator {
    client: OpenAiClient,
}

impl OpenAiGenerator {
    pub fn new(config: &OpenAiConfig) -> Result<Self, LeadRelayError> {
        let api_key = resolve_api_key(&config.api_key)?;
        let client = OpenAiClient::new(
            &api_key,
            config.model.clone(),
            config.max_tokens,
            &config.api_base_url,
        )?;
        info!(
            model = config.model,
            max_tokens = config.max_tokens,
            "OpenAI generator initialized"
        );
        Ok(Self { client })
    }

    /// Creates a generator with an existing client (for testing).
    #[cfg(test)]
    fn with_client(client: OpenAiClient) -> Self {
        Self { client }
    }

    fn to_chat_request(&self, persona: &str, history: &[Turn]) -> ChatRequest {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage::new("system", persona));
        messages.extend(
            history
                .iter()
                .map(|turn| ChatMessage::new(turn.role.to_string(), turn.content.clone())),
        );
        ChatRequest {
            model: self.client.model().to_string(),
            messages,
            max_tokens: self.client.max_tokens(),
        }
    }
}

#[async_trait]
impl PluginAdapter for OpenAiGenerator {
    fn name(&self) -> &str {
        "openai"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadRelayError> {
        match self.client.list_models().await {
            Ok(()) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }
}

#[async_trait]
impl ResponseGenerator for OpenAiGenerator {
    async fn generate(&self, persona: &str, history: &[Turn]) -> Result<String, LeadRelayError> {
        let request = self.to_chat_request(persona, history);
        let response = self.client.complete(&request).await?;

        if let Some(usage) = response.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "completion usage"
            );
        }

        let reply = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();
        if reply.is_empty() {
            return Err(LeadRelayError::provider("completion returned no text"));
        }
        Ok(reply)
    }
}

/// Resolves the API key from config, falling back to `OPENAI_API_KEY`.
pub fn resolve_api_key(config_key: &Option<String>) -> Result<String, LeadRelayError> {
    resolve_secret(config_key, API_KEY_ENV).ok_or_else(|| {
        LeadRelayError::Config(
            "OpenAI API key not found. Set openai.api_key in config or OPENAI_API_KEY environment variable.".into(),
        )
    })
}

/// Loads the persona preamble following priority: file > inline > default.
pub async fn load_system_prompt(agent_name: &str, config: &OpenAiConfig) -> String {
    if let Some(file_path) = &config.system_prompt_file {
        match tokio::fs::read_to_string(file_path).await {
            Ok(content) => {
                let trimmed = content.trim().to_string();
                if !trimmed.is_empty() {
                    info!(path = file_path, "loaded system prompt from file");
                    return trimmed;
                }
            }
            Err(e) => {
                warn!(
                    path = file_path,
                    error = %e,
                    "failed to read system prompt file, falling back"
                );
            }
        }
    }

    if let Some(prompt) = &config.system_prompt
        && !prompt.trim().is_empty()
    {
        return prompt.clone();
    }

    format!(
        "You are {agent_name}, replying to prospective clients on WhatsApp. \
         Keep answers brief and helpful, and offer to book a consultation when it fits."
    )
}
