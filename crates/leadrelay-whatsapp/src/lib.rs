// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WhatsApp Cloud API channel adapter for leadrelay.
//!
//! [`WhatsAppChannel`] implements [`MessagingChannel`] for outbound openers
//! and replies. The [`webhook`] module holds the inbound side: handshake,
//! signature verification, and payload extraction.

pub mod client;
pub mod types;
pub mod webhook;

use async_trait::async_trait;
use leadrelay_config::model::WhatsAppConfig;
use leadrelay_config::resolve_secret;
use leadrelay_core::traits::{MessagingChannel, PluginAdapter};
use leadrelay_core::types::{AdapterType, HealthStatus, MessageId, TemplateMessage};
use leadrelay_core::LeadRelayError;
use tracing::{debug, info};

use crate::client::GraphClient;
use crate::types::{
    MediaLink, MessagePayload, TemplateBody, TemplateComponent, TemplateLanguage,
    TemplateParameter, TextBody,
};

pub const TOKEN_ENV: &str = "WHATSAPP_TOKEN";
pub const PHONE_NUMBER_ID_ENV: &str = "WHATSAPP_PHONE_NUMBER_ID";
pub const VERIFY_TOKEN_ENV: &str = "WHATSAPP_VERIFY_TOKEN";

/// Resolves the webhook verify token from config or `WHATSAPP_VERIFY_TOKEN`.
pub fn resolve_verify_token(config: &WhatsAppConfig) -> Option<String> {
    resolve_secret(&config.verify_token, VERIFY_TOKEN_ENV)
}

/// Outbound WhatsApp channel.
pub struct WhatsAppChannel {
    client: GraphClient,
}

impl WhatsAppChannel {
    /// Creates the channel, resolving the access token and phone number id
    /// from config or the legacy environment variables.
    pub fn new(config: &WhatsAppConfig) -> Result<Self, LeadRelayError> {
        let token = resolve_secret(&config.access_token, TOKEN_ENV).ok_or_else(|| {
            LeadRelayError::Config(
                "WhatsApp access token not found. Set whatsapp.access_token in config or WHATSAPP_TOKEN environment variable.".into(),
            )
        })?;
        let phone_number_id = resolve_secret(&config.phone_number_id, PHONE_NUMBER_ID_ENV)
            .ok_or_else(|| {
                LeadRelayError::Config(
                    "WhatsApp phone number id not found. Set whatsapp.phone_number_id in config or WHATSAPP_PHONE_NUMBER_ID environment variable.".into(),
                )
            })?;

        let client = GraphClient::new(
            &token,
            phone_number_id,
            config.api_version.clone(),
            &config.api_base_url,
        )?;
        info!(api_version = config.api_version, "WhatsApp channel initialized");
        Ok(Self { client })
    }

    #[cfg(test)]
    fn with_client(client: GraphClient) -> Self {
        Self { client }
    }
}

/// Builds the Graph template body: optional image header, then body text
/// parameters in order.
pub fn template_body(template: &TemplateMessage) -> TemplateBody {
    let mut components = Vec::new();
    if let Some(link) = &template.header_image_url {
        components.push(TemplateComponent {
            type_: "header",
            parameters: vec![TemplateParameter::Image {
                image: MediaLink { link: link.clone() },
            }],
        });
    }
    if !template.body_parameters.is_empty() {
        components.push(TemplateComponent {
            type_: "body",
            parameters: template
                .body_parameters
                .iter()
                .map(|text| TemplateParameter::Text { text: text.clone() })
                .collect(),
        });
    }
    TemplateBody {
        name: template.name.clone(),
        language: TemplateLanguage {
            code: template.language.clone(),
        },
        components,
    }
}

#[async_trait]
impl PluginAdapter for WhatsAppChannel {
    fn name(&self) -> &str {
        "whatsapp"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadRelayError> {
        match self.client.phone_number_info().await {
            Ok(info) => {
                info!(
                    phone = info.display_phone_number.as_deref().unwrap_or("unknown"),
                    name = info.verified_name.as_deref().unwrap_or("unknown"),
                    "WhatsApp credentials verified"
                );
                Ok(HealthStatus::Healthy)
            }
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }
}

#[async_trait]
impl MessagingChannel for WhatsAppChannel {
    async fn send_template(
        &self,
        to: &str,
        template: &TemplateMessage,
    ) -> Result<MessageId, LeadRelayError> {
        debug!(to, template = %template.name, "sending template message");
        self.client
            .send(
                to,
                MessagePayload::Template {
                    template: template_body(template),
                },
            )
            .await
    }

    async fn send_text(&self, to: &str, body: &str) -> Result<MessageId, LeadRelayError> {
        debug!(to, "sending text message");
        self.client
            .send(
                to,
                MessagePayload::Text {
                    text: TextBody {
                        body: body.to_string(),
                    },
                },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn channel(server: &MockServer) -> WhatsAppChannel {
        let client = GraphClient::new("token", "1234".into(), "v20.0".into(), "https://unused.invalid")
            .unwrap()
            .with_base_url(server.uri());
        WhatsAppChannel::with_client(client)
    }

    fn opener(header: Option<&str>) -> TemplateMessage {
        TemplateMessage {
            name: "opener2".into(),
            language: "en".into(),
            header_image_url: header.map(str::to_string),
            body_parameters: vec!["Anna".into()],
        }
    }

    #[test]
    fn template_without_header_has_only_body() {
        let body = template_body(&opener(None));
        assert_eq!(body.components.len(), 1);
        assert_eq!(body.components[0].type_, "body");
    }

    #[test]
    fn template_with_header_puts_image_first() {
        let body = template_body(&opener(Some("https://example.com/hero.png")));
        assert_eq!(body.components.len(), 2);
        assert_eq!(body.components[0].type_, "header");
    }

    #[test]
    fn missing_token_is_config_error() {
        let config = WhatsAppConfig {
            access_token: Some("  ".into()),
            phone_number_id: Some("1234".into()),
            ..WhatsAppConfig::default()
        };
        // Only meaningful when the legacy variable is absent.
        if std::env::var(TOKEN_ENV).is_err() {
            assert!(matches!(
                WhatsAppChannel::new(&config),
                Err(LeadRelayError::Config(_))
            ));
        }
    }

    #[tokio::test]
    async fn send_template_posts_personalised_opener() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v20.0/1234/messages"))
            .and(body_partial_json(serde_json::json!({
                "to": "491701234567",
                "type": "template",
                "template": {
                    "name": "opener2",
                    "language": {"code": "en"},
                    "components": [
                        {"type": "header", "parameters": [{"type": "image", "image": {"link": "https://example.com/hero.png"}}]},
                        {"type": "body", "parameters": [{"type": "text", "text": "Anna"}]}
                    ]
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "messages": [{"id": "wamid.opener"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let id = channel(&server)
            .send_template("491701234567", &opener(Some("https://example.com/hero.png")))
            .await
            .unwrap();
        assert_eq!(id, MessageId("wamid.opener".into()));
    }

    #[tokio::test]
    async fn health_check_unhealthy_on_bad_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v20.0/1234"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"message": "Invalid OAuth access token", "code": 190}
            })))
            .mount(&server)
            .await;

        let status = channel(&server).health_check().await.unwrap();
        assert!(matches!(status, HealthStatus::Unhealthy(msg) if msg.contains("190")));
    }
}
