// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Graph API wire types: outbound message requests and webhook payloads.

use serde::{Deserialize, Serialize};

// --- Outbound ---

/// Body of `POST /{version}/{phone_number_id}/messages`.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest<'a> {
    pub messaging_product: &'static str,
    pub to: &'a str,
    #[serde(flatten)]
    pub payload: MessagePayload,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessagePayload {
    Text { text: TextBody },
    Template { template: TemplateBody },
}

#[derive(Debug, Clone, Serialize)]
pub struct TextBody {
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateBody {
    pub name: String,
    pub language: TemplateLanguage,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<TemplateComponent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateLanguage {
    pub code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateComponent {
    #[serde(rename = "type")]
    pub type_: &'static str,
    pub parameters: Vec<TemplateParameter>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TemplateParameter {
    Text { text: String },
    Image { image: MediaLink },
}

#[derive(Debug, Clone, Serialize)]
pub struct MediaLink {
    pub link: String,
}

/// Successful send response; only the message ids matter.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageResponse {
    #[serde(default)]
    pub messages: Vec<SentMessageRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SentMessageRef {
    pub id: String,
}

/// Graph API error envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphErrorResponse {
    pub error: GraphErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphErrorDetail {
    pub message: String,
    #[serde(default)]
    pub code: Option<i64>,
}

/// Phone number lookup used by the credential check.
#[derive(Debug, Clone, Deserialize)]
pub struct PhoneNumberInfo {
    #[serde(default)]
    pub display_phone_number: Option<String>,
    #[serde(default)]
    pub verified_name: Option<String>,
}

// --- Webhook ---

/// Top-level webhook delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    pub object: String,
    #[serde(default)]
    pub entry: Vec<WebhookEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEntry {
    #[serde(default)]
    pub changes: Vec<WebhookChange>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookChange {
    #[serde(default)]
    pub value: ChangeValue,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub messages: Vec<WireMessage>,
    #[serde(default)]
    pub statuses: Vec<WireStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireMessage {
    #[serde(default)]
    pub id: String,
    pub from: String,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default)]
    pub text: Option<WireText>,
    #[serde(default)]
    pub button: Option<WireButton>,
    #[serde(default)]
    pub interactive: Option<WireInteractive>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireText {
    pub body: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireButton {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireInteractive {
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default)]
    pub button_reply: Option<WireReply>,
    #[serde(default)]
    pub list_reply: Option<WireReply>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireReply {
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireStatus {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub recipient_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_request_shape() {
        let req = SendMessageRequest {
            messaging_product: "whatsapp",
            to: "491701234567",
            payload: MessagePayload::Template {
                template: TemplateBody {
                    name: "opener2".into(),
                    language: TemplateLanguage { code: "en".into() },
                    components: vec![
                        TemplateComponent {
                            type_: "header",
                            parameters: vec![TemplateParameter::Image {
                                image: MediaLink {
                                    link: "https://example.com/a.png".into(),
                                },
                            }],
                        },
                        TemplateComponent {
                            type_: "body",
                            parameters: vec![TemplateParameter::Text { text: "Anna".into() }],
                        },
                    ],
                },
            },
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["messaging_product"], "whatsapp");
        assert_eq!(json["type"], "template");
        assert_eq!(json["template"]["language"]["code"], "en");
        assert_eq!(json["template"]["components"][0]["type"], "header");
        assert_eq!(
            json["template"]["components"][0]["parameters"][0]["image"]["link"],
            "https://example.com/a.png"
        );
        assert_eq!(json["template"]["components"][1]["parameters"][0]["type"], "text");
        assert_eq!(json["template"]["components"][1]["parameters"][0]["text"], "Anna");
    }

    #[test]
    fn text_request_shape() {
        let req = SendMessageRequest {
            messaging_product: "whatsapp",
            to: "491701234567",
            payload: MessagePayload::Text {
                text: TextBody { body: "hello".into() },
            },
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["text"]["body"], "hello");
    }

    #[test]
    fn change_without_messages_or_statuses() {
        let payload: WebhookPayload = serde_json::from_str(
            r#"{"object":"whatsapp_business_account","entry":[{"changes":[{"value":{}}]}]}"#,
        )
        .unwrap();
        let value = &payload.entry[0].changes[0].value;
        assert!(value.messages.is_empty());
        assert!(value.statuses.is_empty());
    }
}
